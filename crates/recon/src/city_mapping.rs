//! Curated city corrections, applied before matching.
//!
//! Keyed by (school, original city): the same raw city text can be correct
//! for one school and a typo for another.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::ReconError;
use crate::model::{CityCorrectionStats, CompetitionRecord, SchoolKey};
use crate::overrides;

const TABLE: &str = "city mapping";
const DROP_MARKER: &str = "DROP";
const VALID_MARKER: &str = "VALID";

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

/// What to do with records carrying a given (school, city).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CityAction {
    /// Reviewed; the city is right as written.
    Valid,
    /// Replace the city with this value.
    Correct(String),
    /// Remove the records before matching.
    Drop,
    /// Listed but not yet reviewed; records pass through.
    Unreviewed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityMappingEntry {
    pub action: CityAction,
    pub comment: String,
}

impl CityMappingEntry {
    /// Sentinels are resolved here and nowhere else.
    pub fn from_columns(corrected_city: &str, comment: &str) -> Self {
        let corrected_city = corrected_city.trim();
        let action = if comment.to_uppercase().contains(VALID_MARKER) {
            CityAction::Valid
        } else if corrected_city == DROP_MARKER {
            CityAction::Drop
        } else if corrected_city.is_empty() {
            CityAction::Unreviewed
        } else {
            CityAction::Correct(corrected_city.to_string())
        };
        Self {
            action,
            comment: comment.to_string(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.action == CityAction::Valid
    }

    pub fn corrected_city(&self) -> Option<&str> {
        match &self.action {
            CityAction::Correct(city) => Some(city),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CityMapping {
    entries: HashMap<SchoolKey, CityMappingEntry>,
}

impl CityMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry; a later entry for the same key replaces the earlier one.
    pub fn insert(&mut self, school_name: &str, original_city: &str, entry: CityMappingEntry) {
        let key = SchoolKey::new(school_name, original_city);
        if self.entries.insert(key.clone(), entry).is_some() {
            warn!("duplicate {TABLE} entry for {key}, keeping the last one");
        }
    }

    pub fn get(&self, school_name: &str, city: &str) -> Option<&CityMappingEntry> {
        self.entries.get(&SchoolKey::new(school_name, city))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// (school, city) combinations a curator has signed off: the original
    /// pair of every VALID entry plus the target of every correction.
    pub fn allowed_combinations(&self) -> HashSet<SchoolKey> {
        self.entries
            .iter()
            .filter_map(|(key, entry)| match &entry.action {
                CityAction::Valid => Some(key.clone()),
                CityAction::Correct(city) => Some(SchoolKey::new(&key.school_name, city)),
                CityAction::Drop | CityAction::Unreviewed => None,
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// Strict parse of `school_name;original_city;corrected_city;comment`.
///
/// Rows missing the school or the original city are skipped with a warning.
pub fn parse_city_mapping(text: &str) -> Result<CityMapping, ReconError> {
    let (table, [school, original, corrected, comment]) = overrides::parse_table(
        text,
        TABLE,
        ["school_name", "original_city", "corrected_city", "comment"],
    )?;

    let mut mapping = CityMapping::new();
    for (line, row) in table.rows.iter().enumerate() {
        if row[school].is_empty() || row[original].is_empty() {
            warn!("{TABLE} row {}: school_name and original_city are required, skipping", line + 2);
            continue;
        }
        let entry = CityMappingEntry::from_columns(&row[corrected], &row[comment]);
        mapping.insert(&row[school], &row[original], entry);
    }

    Ok(mapping)
}

/// Load the city mapping file; any problem yields an empty mapping.
pub fn load_city_mapping(path: Option<&Path>) -> CityMapping {
    let mapping = overrides::load_soft(path, TABLE, parse_city_mapping);
    if !mapping.is_empty() {
        info!("loaded {} city mappings", mapping.len());
    }
    mapping
}

// ---------------------------------------------------------------------------
// Apply
// ---------------------------------------------------------------------------

/// Apply corrections and drops to a copy of `records`.
pub fn apply_city_mapping(
    records: &[CompetitionRecord],
    mapping: &CityMapping,
) -> (Vec<CompetitionRecord>, CityCorrectionStats) {
    let mut stats = CityCorrectionStats::default();
    if mapping.is_empty() {
        return (records.to_vec(), stats);
    }

    let mut corrected = Vec::with_capacity(records.len());
    for record in records {
        let Some(entry) = mapping.get(&record.school_name, &record.city) else {
            corrected.push(record.clone());
            continue;
        };

        match &entry.action {
            CityAction::Drop => {
                debug!("dropping record of {} in \"{}\"", record.school_name, record.city);
                stats.dropped += 1;
            }
            CityAction::Correct(city) => {
                debug!("city \"{}\" -> \"{city}\" for {}", record.city, record.school_name);
                let mut fixed = record.clone();
                fixed.city = city.clone();
                corrected.push(fixed);
                stats.corrected += 1;
            }
            CityAction::Valid | CityAction::Unreviewed => corrected.push(record.clone()),
        }
    }

    info!(
        "applied {} city corrections, dropped {} records from excluded cities",
        stats.corrected, stats.dropped
    );
    (corrected, stats)
}

// ---------------------------------------------------------------------------
// Variation check
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VariationStatus {
    Valid,
    Unmapped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CityUsage {
    pub city: String,
    pub status: VariationStatus,
}

/// A school reported under more than one city spelling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CityVariation {
    pub school_name: String,
    pub cities: Vec<CityUsage>,
}

impl CityVariation {
    pub fn has_unmapped(&self) -> bool {
        self.cities.iter().any(|c| c.status == VariationStatus::Unmapped)
    }
}

/// Find schools that appear with several cities after corrections and flag
/// combinations no curator has reviewed yet. Schools and cities are sorted.
pub fn check_city_variations(
    records: &[CompetitionRecord],
    mapping: &CityMapping,
) -> Vec<CityVariation> {
    let mut by_school: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for record in records {
        by_school
            .entry(record.school_name.as_str())
            .or_default()
            .insert(record.city.as_str());
    }

    let allowed = mapping.allowed_combinations();
    let mut variations = Vec::new();
    let mut unmapped = 0usize;

    for (school, cities) in by_school.into_iter().filter(|(_, c)| c.len() > 1) {
        let cities = cities
            .into_iter()
            .map(|city| {
                let status = if allowed.contains(&SchoolKey::new(school, city)) {
                    VariationStatus::Valid
                } else {
                    unmapped += 1;
                    warn!("unmapped city variation: {school} in \"{city}\"");
                    VariationStatus::Unmapped
                };
                CityUsage {
                    city: city.to_string(),
                    status,
                }
            })
            .collect();
        variations.push(CityVariation {
            school_name: school.to_string(),
            cities,
        });
    }

    if !variations.is_empty() {
        info!(
            "{} schools with city variations, {unmapped} unmapped combinations",
            variations.len()
        );
    }
    variations
}
