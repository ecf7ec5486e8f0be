use std::collections::{BTreeMap, HashSet};

use crate::city_mapping::{CityVariation, VariationStatus};
use crate::model::{
    ApplyStats, CityCorrectionStats, CompetitionRecord, MatchMethod, MatchResult, ReconSummary,
};

/// Output column names, as written to the reconciled dataset.
const OUTPUT_COLUMNS: [&str; 8] = [
    "ev",
    "targy",
    "evfolyam",
    "helyezes",
    "iskola_nev",
    "varos",
    "vármegye",
    "régió",
];

/// Everything the summary is computed from.
pub struct SummaryInput<'a> {
    pub input_rows: usize,
    pub city_corrections: CityCorrectionStats,
    pub matches: &'a [MatchResult],
    pub apply: ApplyStats,
    pub output: &'a [CompetitionRecord],
    pub city_variations: &'a [CityVariation],
}

/// Compute summary statistics for one run.
pub fn compute_summary(input: &SummaryInput<'_>) -> ReconSummary {
    // Every method is listed, zero or not
    let mut method_counts: BTreeMap<String, usize> =
        MatchMethod::ALL.iter().map(|m| (m.to_string(), 0)).collect();
    for r in input.matches {
        *method_counts.entry(r.match_method.to_string()).or_insert(0) += 1;
    }

    let unique_schools = input
        .output
        .iter()
        .map(|r| r.school_name.as_str())
        .collect::<HashSet<_>>()
        .len();

    let unmapped_city_variations = input
        .city_variations
        .iter()
        .flat_map(|v| &v.cities)
        .filter(|c| c.status == VariationStatus::Unmapped)
        .count();

    ReconSummary {
        input_rows: input.input_rows,
        city_corrections: input.city_corrections,
        unique_pairs: input.matches.len(),
        method_counts,
        applied_pairs: input.apply.applied_pairs,
        not_applied_pairs: input.apply.not_applied_pairs,
        missing_rows: input.apply.missing_rows,
        output_rows: input.output.len(),
        unique_schools,
        unmapped_city_variations,
        empty_counts: empty_counts(input.output),
    }
}

fn empty_counts(records: &[CompetitionRecord]) -> BTreeMap<String, usize> {
    let mut counts = [0usize; OUTPUT_COLUMNS.len()];
    for r in records {
        let values = [
            r.year.as_str(),
            r.subject.as_str(),
            r.grade.as_str(),
            r.rank.as_str(),
            r.school_name.as_str(),
            r.city.as_str(),
            r.county.as_deref().unwrap_or(""),
            r.region.as_deref().unwrap_or(""),
        ];
        for (count, value) in counts.iter_mut().zip(values) {
            if value.trim().is_empty() {
                *count += 1;
            }
        }
    }
    OUTPUT_COLUMNS
        .iter()
        .zip(counts)
        .map(|(col, n)| (col.to_string(), n))
        .collect()
}
