use std::path::{Path, PathBuf};

use kir_recon::audit::{generate_audit, AUDIT_HEADER};
use kir_recon::city::{cities_match, normalize_city};
use kir_recon::city_mapping::{apply_city_mapping, load_city_mapping, parse_city_mapping};
use kir_recon::config::ReconConfig;
use kir_recon::dataset::{load_records, read_records, save_records};
use kir_recon::engine::{run, run_with_scorer, ReconInput};
use kir_recon::model::{CompetitionRecord, MatchMethod, MatchStatus, RegistryRecord};
use kir_recon::registry::{load_registry, Registry};
use kir_recon::school_mapping::{load_school_mapping, SchoolMapping};
use kir_recon::{ReconError, ReconResult};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn fixture_config() -> ReconConfig {
    let toml = std::fs::read_to_string(fixtures_dir().join("recon.toml")).unwrap();
    let mut config = ReconConfig::from_toml(&toml).unwrap();
    config.resolve_paths(&fixtures_dir());
    config
}

fn load_and_run() -> ReconResult {
    let config = fixture_config();
    let records = load_records(config.paths.dataset.as_deref().unwrap()).unwrap();
    let input = ReconInput::load(&config, records).unwrap();
    run(&config, &input)
}

fn result_for<'a>(result: &'a ReconResult, school: &str, city: &str) -> &'a kir_recon::MatchResult {
    result
        .matches
        .iter()
        .find(|m| m.our_school_name == school && m.our_city == city)
        .unwrap_or_else(|| panic!("no match result for ({school}, {city})"))
}

fn record(school: &str, city: &str) -> CompetitionRecord {
    CompetitionRecord {
        year: "2024-25".into(),
        subject: "Matematika".into(),
        grade: "8".into(),
        rank: "1".into(),
        school_name: school.into(),
        city: city.into(),
        county: None,
        region: None,
    }
}

fn mintavaros_input() -> ReconInput {
    ReconInput {
        records: vec![record("Mintaváros Ált. Isk.", "Mintaváros")],
        registry: Registry::from_records(vec![RegistryRecord {
            institution_name: "Mintaváros Általános Iskola".into(),
            facility_name: None,
            city: "Mintaváros".into(),
            county: "Minta".into(),
            region: "Alföld".into(),
        }]),
        city_mapping: Default::default(),
        school_mapping: SchoolMapping::new(),
    }
}

fn default_config() -> ReconConfig {
    ReconConfig::from_toml("[registry]\npath = \"kir.csv\"\n").unwrap()
}

// -------------------------------------------------------------------------
// Full pipeline over fixtures
// -------------------------------------------------------------------------

#[test]
fn fixture_pipeline_summary() {
    let result = load_and_run();
    let s = &result.summary;

    assert_eq!(s.input_rows, 13);
    assert_eq!(s.city_corrections.corrected, 1);
    assert_eq!(s.city_corrections.dropped, 2);
    assert_eq!(s.unique_pairs, 10);
    assert_eq!(s.applied_pairs, 5);
    assert_eq!(s.not_applied_pairs, 5);
    assert_eq!(s.missing_rows, 0);
    assert_eq!(s.output_rows, 6);
    assert_eq!(s.unique_schools, 4);
    assert_eq!(s.unmapped_city_variations, 1);

    assert_eq!(s.method_counts["MANUAL"], 1);
    assert_eq!(s.method_counts["MANUAL_DROP"], 1);
    assert_eq!(s.method_counts["AUTO_HIGH"], 3);
    assert_eq!(s.method_counts["AUTO_MEDIUM"], 1);
    assert_eq!(s.method_counts["DROPPED"], 1);
    assert_eq!(s.method_counts["NO_MATCH"], 3);

    assert_eq!(s.empty_counts["vármegye"], 0);
    assert_eq!(s.empty_counts["régió"], 0);
}

#[test]
fn fixture_pipeline_methods() {
    let result = load_and_run();

    let medium = result_for(&result, "Mintaváros Ált. Isk.", "Mintaváros");
    assert_eq!(medium.match_method, MatchMethod::AutoMedium);
    // Registry name was all caps in the file
    assert_eq!(medium.matched_school_name.as_deref(), Some("Mintaváros Általános Iskola"));

    let corrected = result_for(&result, "Debreceni Kollégium", "Debrecen");
    assert_eq!(corrected.match_method, MatchMethod::AutoHigh);

    let manual = result_for(&result, "Debreceni Ref. Koll.", "Debrecen");
    assert_eq!(manual.match_method, MatchMethod::Manual);
    assert_eq!(manual.confidence_score, None);
    assert_eq!(manual.comment, "abbreviation");

    let manual_drop = result_for(&result, "Külföldi Iskola", "Pécs");
    assert_eq!(manual_drop.match_method, MatchMethod::ManualDrop);
    assert_eq!(manual_drop.status, MatchStatus::NotApplied);

    let stale = result_for(&result, "Régi Iskola", "Pécs");
    assert_eq!(stale.match_method, MatchMethod::NoMatch);
    assert!(stale.comment.contains("Megszűnt Iskola"));

    let dropped = result_for(&result, "Zenei Alapfokú Művészeti", "Pécs");
    assert_eq!(dropped.match_method, MatchMethod::Dropped);
    assert_eq!(dropped.matched_school_name.as_deref(), Some("Pécsi Gimnázium"));
    assert!(dropped.confidence_score.unwrap() < 70.0);

    let no_city = result_for(&result, "Ismeretlen Iskola", "Szeged");
    assert_eq!(no_city.match_method, MatchMethod::NoMatch);
    assert!(no_city.matched_school_name.is_none());

    // Dropped by the city mapping before matching
    assert!(result.matches.iter().all(|m| m.our_school_name != "School X"));
}

#[test]
fn fixture_pipeline_records() {
    let result = load_and_run();
    let names: Vec<_> = result.records.iter().map(|r| r.school_name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "Mintaváros Általános Iskola",
            "Mintaváros Általános Iskola",
            "Budai Gimnázium",
            "Debreceni Kollégium",
            "Debreceni Kollégium",
            "Pécsi Gimnázium",
        ]
    );

    let budai = &result.records[2];
    assert_eq!(budai.city, "Budapest II.");
    assert_eq!(budai.county.as_deref(), Some("Budapest"));
    assert_eq!(budai.region.as_deref(), Some("Közép-Magyarország"));
    // Passthrough fields are untouched
    assert_eq!(budai.subject, "Matematika");
    assert_eq!(budai.rank, "2");
}

#[test]
fn fixture_city_variations() {
    let result = load_and_run();
    assert_eq!(result.city_variations.len(), 1);
    let v = &result.city_variations[0];
    assert_eq!(v.school_name, "Pécsi Gimnázium");
    assert!(v.has_unmapped());
}

#[test]
fn applied_rows_equal_rows_of_applied_pairs() {
    let result = load_and_run();
    let config = fixture_config();
    let records = load_records(config.paths.dataset.as_deref().unwrap()).unwrap();
    let city_mapping = load_city_mapping(config.overrides.city_mapping_file.as_deref());
    let (corrected, _) = apply_city_mapping(&records, &city_mapping);

    let expected = corrected
        .iter()
        .filter(|r| {
            result
                .matches
                .iter()
                .any(|m| {
                    m.is_applied() && m.our_school_name == r.school_name && m.our_city == r.city
                })
        })
        .count();
    assert_eq!(result.records.len(), expected);
}

#[test]
fn summary_serializes_to_json() {
    let result = load_and_run();
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["summary"]["unique_pairs"], 10);
    assert_eq!(json["meta"]["high_confidence_threshold"], 90.0);
    assert!(json.get("records").is_none());
}

// -------------------------------------------------------------------------
// Outputs
// -------------------------------------------------------------------------

#[test]
fn audit_and_dataset_files() {
    let result = load_and_run();
    let dir = tempfile::tempdir().unwrap();
    let audit_path = dir.path().join("out").join("school_matching_audit.csv");
    let dataset_path = dir.path().join("out").join("master_reconciled.csv");

    generate_audit(&result.matches, &audit_path).unwrap();
    save_records(&dataset_path, &result.records).unwrap();

    let audit = std::fs::read_to_string(&audit_path).unwrap();
    let lines: Vec<_> = audit.lines().collect();
    assert_eq!(lines[0], AUDIT_HEADER.join(";"));
    assert_eq!(lines.len(), 11);
    assert!(lines[1].starts_with("Debreceni Ref. Koll.;Debrecen;Debreceni Kollégium;"));
    assert!(lines[1].contains(";MANUAL;APPLIED;abbreviation"));
    assert!(lines[2].starts_with("Külföldi Iskola;Pécs;;;;;;MANUAL_DROP;NOT_APPLIED"));
    // Last group is NO_MATCH, alphabetical
    assert!(lines[8].starts_with("Ismeretlen Iskola;Szeged;"));
    assert!(lines[9].starts_with("Pécsi Gimnázium;Pecs;"));
    assert!(lines[10].starts_with("Régi Iskola;Pécs;"));

    let reread = load_records(&dataset_path).unwrap();
    assert_eq!(reread, result.records);
}

// -------------------------------------------------------------------------
// Scenarios with stipulated scores
// -------------------------------------------------------------------------

#[test]
fn high_score_rewrites_record() {
    let result = run_with_scorer(&default_config(), &mintavaros_input(), |_: &str, _: &str| 93.0);
    assert_eq!(result.matches[0].match_method, MatchMethod::AutoHigh);
    assert_eq!(result.records.len(), 1);
    assert_eq!(result.records[0].school_name, "Mintaváros Általános Iskola");
    assert_eq!(result.records[0].county.as_deref(), Some("Minta"));
}

#[test]
fn medium_score_keeps_record() {
    let result = run_with_scorer(&default_config(), &mintavaros_input(), |_: &str, _: &str| 75.0);
    assert_eq!(result.matches[0].match_method, MatchMethod::AutoMedium);
    assert_eq!(result.records.len(), 1);
    assert_eq!(result.records[0].region.as_deref(), Some("Alföld"));
}

#[test]
fn low_score_drops_record_but_audits_it() {
    let result = run_with_scorer(&default_config(), &mintavaros_input(), |_: &str, _: &str| 50.0);
    let m = &result.matches[0];
    assert_eq!(m.match_method, MatchMethod::Dropped);
    assert_eq!(m.matched_county.as_deref(), Some("Minta"));
    assert!(m.comment.contains("threshold"));
    assert!(result.records.is_empty());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("audit.csv");
    generate_audit(&result.matches, &path).unwrap();
    let audit = std::fs::read_to_string(&path).unwrap();
    assert!(audit.contains(
        "Mintaváros Ált. Isk.;Mintaváros;Mintaváros Általános Iskola;\
         Mintaváros;Minta;Alföld;50.0;DROPPED;NOT_APPLIED;"
    ));
}

#[test]
fn real_scorer_rates_abbreviations_medium() {
    let result = run(&default_config(), &mintavaros_input());
    assert_eq!(result.matches[0].match_method, MatchMethod::AutoMedium);
    assert_eq!(result.records.len(), 1);
}

// -------------------------------------------------------------------------
// Fatal and soft failures
// -------------------------------------------------------------------------

#[test]
fn missing_registry_is_fatal() {
    let mut config = fixture_config();
    config.registry.path = fixtures_dir().join("no_such_registry.xlsx");
    let err = ReconInput::load(&config, vec![]).unwrap_err();
    assert!(matches!(err, ReconError::RegistryNotFound(_)));
}

#[test]
fn registry_missing_columns_lists_expected_and_found() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kir.csv");
    std::fs::write(&path, "Intézmény megnevezése;Település\nA;Pécs\n").unwrap();

    let config = default_config();
    let err = load_registry(&path, &config.registry).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("A feladatellátási hely régiója"));
    assert!(message.contains("Település"));
}

#[test]
fn registry_from_xlsx() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kir.xlsx");
    write_registry_xlsx(&path);

    let config = default_config();
    let registry = load_registry(&path, &config.registry).unwrap();
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.records()[0].institution_name, "Budapest XII. Kerületi Iskola");
    assert_eq!(registry.records()[0].facility_name, None);
    assert_eq!(registry.records()[1].county, "Baranya");
}

fn write_registry_xlsx(path: &Path) {
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();
    let rows = [
        [
            "Intézmény megnevezése",
            "A feladatellátási hely települése",
            "A feladatellátási hely vármegyéje",
            "A feladatellátási hely régiója",
        ],
        [
            "BUDAPEST XII. KERÜLETI ISKOLA",
            "Budapest XII. kerület",
            "Budapest",
            "Közép-Magyarország",
        ],
        ["Pécsi Gimnázium", "Pécs", "Baranya", "Dél-Dunántúl"],
    ];
    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            sheet.write_string(r as u32, c as u16, *value).unwrap();
        }
    }
    workbook.save(path).unwrap();
}

#[test]
fn missing_overrides_run_without_them() {
    let mut config = fixture_config();
    config.overrides.city_mapping_file = Some(fixtures_dir().join("missing_city_mapping.csv"));
    config.overrides.school_mapping_file = None;

    let records = vec![record("School X", "CityTypo"), record("Pécsi Gimnázium", "Pécs")];
    let input = ReconInput::load(&config, records).unwrap();
    assert!(input.city_mapping.is_empty());
    assert!(input.school_mapping.is_empty());

    let result = run(&config, &input);
    assert_eq!(result.summary.city_corrections.dropped, 0);
    assert_eq!(result_for(&result, "School X", "CityTypo").match_method, MatchMethod::NoMatch);
}

#[test]
fn malformed_school_mapping_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("school_mapping.csv");
    std::fs::write(&path, "invalid;csv;structure\ndata;without;proper;columns\n").unwrap();
    assert!(load_school_mapping(Some(&path)).is_empty());
}

#[test]
fn padded_dataset_cells_meet_trimmed_overrides() {
    let records = read_records(
        "ev;targy;evfolyam;helyezes;iskola_nev;varos\n2024-25;Matematika;8;1; Vár Iskola ;Pecs \n",
    )
    .unwrap();
    assert_eq!(records[0].school_name, "Vár Iskola");

    let mapping = parse_city_mapping(
        "school_name;original_city;corrected_city;comment\n Vár Iskola ; Pecs ;Pécs;accent\n",
    )
    .unwrap();
    let (corrected, stats) = apply_city_mapping(&records, &mapping);
    assert_eq!(corrected[0].city, "Pécs");
    assert_eq!(stats.corrected, 1);
}

#[test]
fn fixture_school_mapping_skips_blank_rows() {
    let mapping = load_school_mapping(Some(&fixtures_dir().join("school_mapping.csv")));
    assert_eq!(mapping.len(), 3);
    assert!(mapping.get("Vár Iskola", "Pécs").is_none());
}

// -------------------------------------------------------------------------
// City helpers
// -------------------------------------------------------------------------

#[test]
fn city_normalization_properties() {
    for city in [
        "Budapest III. kerület",
        "Debrecen",
        "",
        "  Budapest XIV. ker. ",
        "Budapest XI.  kerület",
        "Pécs ker ker.ület",
        "Budapest ker. ker.  Újbuda",
    ] {
        let once = normalize_city(Some(city));
        assert_eq!(normalize_city(Some(&once)), once);
    }
    assert_eq!(normalize_city(Some("")), "");
    assert!(cities_match("Budapest", "Budapest III. kerület"));
    assert!(!cities_match("Budapest III. kerület", "Budapest"));
    assert!(cities_match("Budapest XI.", "Budapest XI.  kerület"));
}
