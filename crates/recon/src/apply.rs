//! Write match decisions back onto the competition records.

use std::collections::HashMap;

use tracing::{error, info};

use crate::city::strip_district_suffix;
use crate::model::{ApplyStats, CompetitionRecord, MatchResult, SchoolKey};

/// Rewrite records with their matched registry identity.
///
/// Applied pairs get the canonical name, the district-free registry city, and
/// county/region. Rows of not-applied pairs are dropped. A row whose pair has
/// no result means the matcher did not see the whole dataset: it is logged,
/// skipped, and counted in `missing_rows`.
pub fn apply_matches(
    records: &[CompetitionRecord],
    results: &[MatchResult],
) -> (Vec<CompetitionRecord>, ApplyStats) {
    let lookup: HashMap<SchoolKey, &MatchResult> = results.iter().map(|r| (r.key(), r)).collect();

    let mut stats = ApplyStats {
        applied_pairs: results.iter().filter(|r| r.is_applied()).count(),
        not_applied_pairs: results.iter().filter(|r| !r.is_applied()).count(),
        ..ApplyStats::default()
    };
    let mut output = Vec::with_capacity(records.len());

    for record in records {
        let Some(result) = lookup.get(&record.key()) else {
            error!(
                "no match result for {} in \"{}\"; matcher did not cover this record",
                record.school_name, record.city
            );
            stats.missing_rows += 1;
            continue;
        };

        if !result.is_applied() {
            stats.dropped_rows += 1;
            continue;
        }

        let mut reconciled = record.clone();
        if let Some(name) = &result.matched_school_name {
            reconciled.school_name = name.clone();
        }
        if let Some(city) = &result.matched_city {
            reconciled.city = strip_district_suffix(city);
        }
        reconciled.county = result.matched_county.clone();
        reconciled.region = result.matched_region.clone();
        output.push(reconciled);
        stats.kept_rows += 1;
    }

    info!(
        "applied {} matches, dropped {} unmatched pairs ({} rows kept, {} rows dropped)",
        stats.applied_pairs, stats.not_applied_pairs, stats.kept_rows, stats.dropped_rows
    );
    if stats.missing_rows > 0 {
        error!("{} records had no match result", stats.missing_rows);
    }

    (output, stats)
}
