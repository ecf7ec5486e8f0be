//! City-name comparison helpers.

const DISTRICT_SUFFIXES: [&str; 2] = [" kerület", " ker."];

/// Canonical comparison form: lowercased, district markers removed, trimmed.
///
/// The markers are removed wherever they occur, not only at the end.
/// Idempotent: trimming happens after removal.
pub fn normalize_city(city: Option<&str>) -> String {
    let Some(city) = city else {
        return String::new();
    };
    remove_district_markers(&city.to_lowercase())
}

/// Whether a dataset city `ours` refers to the registry city `theirs`.
///
/// A bare "Budapest" on our side matches any Budapest district in the
/// registry. The reverse is not checked: a district-qualified dataset city
/// only matches the same district.
pub fn cities_match(ours: &str, theirs: &str) -> bool {
    let ours = normalize_city(Some(ours));
    let theirs = normalize_city(Some(theirs));

    if ours == theirs {
        return true;
    }

    ours == "budapest" && theirs.starts_with("budapest")
}

/// Remove district markers but keep the original casing, e.g.
/// "Budapest III. kerület" → "Budapest III.".
pub fn strip_district_suffix(city: &str) -> String {
    remove_district_markers(city)
}

/// Removal runs to a fixpoint: dropping " ker." from "ker ker.ület"
/// leaves a new " kerület".
fn remove_district_markers(city: &str) -> String {
    let mut stripped = city.to_string();
    loop {
        let before = stripped.len();
        for suffix in DISTRICT_SUFFIXES {
            stripped = stripped.replace(suffix, "");
        }
        if stripped.len() == before {
            break;
        }
    }
    stripped.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_basic() {
        assert_eq!(normalize_city(Some("Budapest")), "budapest");
        assert_eq!(normalize_city(Some("  Debrecen  ")), "debrecen");
        assert_eq!(normalize_city(Some("")), "");
        assert_eq!(normalize_city(None), "");
    }

    #[test]
    fn normalize_strips_district_markers() {
        assert_eq!(normalize_city(Some("Budapest III. kerület")), "budapest iii.");
        assert_eq!(normalize_city(Some("Budapest XIV. ker.")), "budapest xiv.");
        // Substring semantics: a marker in the middle goes too
        assert_eq!(normalize_city(Some("Budapest XI. kerület Újbuda")), "budapest xi. újbuda");
    }

    #[test]
    fn normalize_is_idempotent() {
        for city in ["Budapest III. kerület", "  Pécs ", "Budapest XIV. ker.", "", "GYŐR"] {
            let once = normalize_city(Some(city));
            assert_eq!(normalize_city(Some(&once)), once, "not idempotent for {city:?}");
        }
    }

    #[test]
    fn normalize_is_idempotent_across_spacing_and_markers() {
        let bases = ["Budapest XI.", "Pécs", "", " ", "ker"];
        let joins = ["", " ", "  ", "\t", " \t "];
        let markers = [" kerület", " ker.", " ker ker.ület", " ker.  kerület", " ker. ker."];
        let tails = ["", " ", "  ", " Újbuda", " ker", ".ület"];
        for base in bases {
            for join in joins {
                for marker in markers {
                    for tail in tails {
                        let city = format!("{base}{join}{marker}{tail}");
                        let once = normalize_city(Some(&city));
                        let twice = normalize_city(Some(&once));
                        assert_eq!(twice, once, "not idempotent for {city:?}");
                        assert_eq!(once.trim(), once, "untrimmed result for {city:?}");
                    }
                }
            }
        }
    }

    #[test]
    fn double_space_before_marker_still_matches() {
        assert_eq!(normalize_city(Some("Budapest XI.  kerület")), "budapest xi.");
        assert!(cities_match("Budapest XI.", "Budapest XI.  kerület"));
    }

    #[test]
    fn rebuilt_marker_is_removed() {
        assert_eq!(normalize_city(Some("Pécs ker ker.ület")), "pécs");
        assert_eq!(strip_district_suffix("Pécs ker ker.ület"), "Pécs");
    }

    #[test]
    fn cities_match_exact() {
        assert!(cities_match("Budapest", "Budapest"));
        assert!(cities_match("Debrecen", " debrecen "));
    }

    #[test]
    fn cities_match_budapest_districts() {
        assert!(cities_match("Budapest", "Budapest III. kerület"));
        assert!(cities_match("Budapest", "Budapest XIV."));
    }

    #[test]
    fn cities_match_is_asymmetric() {
        assert!(!cities_match("Budapest III. kerület", "Budapest"));
    }

    #[test]
    fn cities_match_different() {
        assert!(!cities_match("Budapest", "Debrecen"));
        assert!(!cities_match("Szeged", "Pécs"));
    }

    #[test]
    fn strip_keeps_case() {
        assert_eq!(strip_district_suffix("Budapest III. kerület"), "Budapest III.");
        assert_eq!(strip_district_suffix("Budapest XIV. ker."), "Budapest XIV.");
        assert_eq!(strip_district_suffix("Pécs"), "Pécs");
        assert_eq!(strip_district_suffix("Budapest XI.  kerület"), "Budapest XI.");
    }
}
