use tracing::info;

use crate::apply::apply_matches;
use crate::city_mapping::{
    apply_city_mapping, check_city_variations, load_city_mapping, CityMapping,
};
use crate::config::ReconConfig;
use crate::error::ReconError;
use crate::evidence::{compute_summary, SummaryInput};
use crate::matcher::Matcher;
use crate::model::{CompetitionRecord, ReconMeta, ReconResult};
use crate::registry::{load_registry, Registry};
use crate::school_mapping::{load_school_mapping, SchoolMapping};
use crate::score::{NameScorer, TokenSetRatio};

/// Everything a run reads, loaded up front and immutable afterwards.
#[derive(Debug, Clone)]
pub struct ReconInput {
    pub records: Vec<CompetitionRecord>,
    pub registry: Registry,
    pub city_mapping: CityMapping,
    pub school_mapping: SchoolMapping,
}

impl ReconInput {
    /// Load the registry and override tables named by `config`.
    ///
    /// Only the registry can fail; override files degrade to empty tables.
    pub fn load(config: &ReconConfig, records: Vec<CompetitionRecord>) -> Result<Self, ReconError> {
        let registry = load_registry(&config.registry.path, &config.registry)?;
        let city_mapping = load_city_mapping(config.overrides.city_mapping_file.as_deref());
        let school_mapping = load_school_mapping(config.overrides.school_mapping_file.as_deref());
        Ok(Self {
            records,
            registry,
            city_mapping,
            school_mapping,
        })
    }
}

/// Run reconciliation per config. Returns reconciled records, every match
/// decision and a summary.
pub fn run(config: &ReconConfig, input: &ReconInput) -> ReconResult {
    run_with_scorer(config, input, TokenSetRatio)
}

/// [`run`] with a caller-supplied name scorer.
pub fn run_with_scorer<S: NameScorer>(
    config: &ReconConfig,
    input: &ReconInput,
    scorer: S,
) -> ReconResult {
    let input_rows = input.records.len();
    info!("reconciling {input_rows} records");

    // City corrections first: matching and variation checks see fixed cities
    let (corrected, city_corrections) = apply_city_mapping(&input.records, &input.city_mapping);
    let city_variations = check_city_variations(&corrected, &input.city_mapping);

    let matcher = Matcher::new(&input.registry, &input.school_mapping, config.matching)
        .with_scorer(scorer);
    let matches = matcher.match_all_schools(&corrected);

    let (records, apply) = apply_matches(&corrected, &matches);

    let summary = compute_summary(&SummaryInput {
        input_rows,
        city_corrections,
        matches: &matches,
        apply,
        output: &records,
        city_variations: &city_variations,
    });
    info!(
        "reconciled {} of {} records ({} unique schools)",
        summary.output_rows, input_rows, summary.unique_schools
    );

    ReconResult {
        meta: ReconMeta {
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            medium_confidence_threshold: config.matching.medium,
            high_confidence_threshold: config.matching.high,
        },
        summary,
        records,
        matches,
        city_variations,
    }
}
