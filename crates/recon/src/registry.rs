//! The authoritative facility registry (KIR), loaded once per run.

use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use kir_io::Table;
use regex::Regex;
use tracing::{info, warn};

use crate::city::cities_match;
use crate::config::RegistryConfig;
use crate::error::ReconError;
use crate::model::RegistryRecord;

/// Conjunctions and articles kept lowercase inside a title-cased name.
const LOWERCASE_WORDS: &[&str] = &["a", "az", "és", "vagy", "and", "the", "or", "of"];

static ROMAN_WITH_DOT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[IVXLCDM]+\.$").expect("roman numeral pattern"));

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct Registry {
    records: Vec<RegistryRecord>,
    /// Canonical name -> index of its first row.
    by_name: HashMap<String, usize>,
}

impl Registry {
    /// Index records as given. Row order is kept; it decides score ties.
    pub fn from_records(records: Vec<RegistryRecord>) -> Self {
        let mut by_name = HashMap::with_capacity(records.len());
        for (i, r) in records.iter().enumerate() {
            by_name.entry(r.institution_name.clone()).or_insert(i);
        }
        Self { records, by_name }
    }

    /// Build from a raw table: validate columns, map fields, title-case
    /// all-uppercase names.
    pub fn from_table(table: &Table, config: &RegistryConfig) -> Result<Self, ReconError> {
        let cols = &config.columns;

        let mut expected = config.required_columns();
        for mapped in cols.mandatory() {
            if !expected.iter().any(|c| c == mapped) {
                expected.push(mapped.to_string());
            }
        }

        let missing = table.missing_columns(&expected);
        if !missing.is_empty() {
            return Err(ReconError::RegistryMissingColumns {
                expected,
                missing,
                found: table.headers.clone(),
            });
        }

        // Presence of the mandatory columns was checked above
        let idx = |name: &str| table.column_index(name).unwrap_or_default();
        let name_idx = idx(cols.institution_name.as_str());
        let city_idx = idx(cols.city.as_str());
        let county_idx = idx(cols.county.as_str());
        let region_idx = idx(cols.region.as_str());

        let facility_idx = match cols.facility_name.as_deref().filter(|c| !c.is_empty()) {
            Some(col) => {
                let found = table.column_index(col);
                if found.is_none() {
                    warn!("registry has no '{col}' column, scoring canonical names only");
                }
                found
            }
            None => None,
        };

        let mut records = Vec::with_capacity(table.len());
        let mut skipped = 0usize;
        for row in &table.rows {
            if row[name_idx].is_empty() {
                skipped += 1;
                continue;
            }
            records.push(RegistryRecord {
                institution_name: normalize_uppercase_name(&row[name_idx]),
                facility_name: facility_idx
                    .map(|i| row[i].as_str())
                    .filter(|f| !f.is_empty())
                    .map(normalize_uppercase_name),
                city: row[city_idx].clone(),
                county: row[county_idx].clone(),
                region: row[region_idx].clone(),
            });
        }
        if skipped > 0 {
            warn!("skipped {skipped} registry rows without an institution name");
        }

        Ok(Self::from_records(records))
    }

    pub fn records(&self) -> &[RegistryRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Exact canonical-name lookup; the first row with the name wins.
    pub fn find_by_name(&self, name: &str) -> Option<&RegistryRecord> {
        self.by_name.get(name).map(|&i| &self.records[i])
    }

    /// Rows whose city matches the dataset city, in registry order.
    pub fn candidates_in<'a>(
        &'a self,
        city: &str,
    ) -> impl Iterator<Item = &'a RegistryRecord> + 'a {
        let city = city.to_string();
        self.records.iter().filter(move |r| cities_match(&city, &r.city))
    }
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// Load the registry. A missing file or missing columns abort the run.
pub fn load_registry(path: &Path, config: &RegistryConfig) -> Result<Registry, ReconError> {
    if !path.exists() {
        return Err(ReconError::RegistryNotFound(path.to_path_buf()));
    }

    let table = kir_io::read_table(path)?;
    let registry = Registry::from_table(&table, config)?;
    info!("loaded {} schools from registry {}", registry.len(), path.display());
    Ok(registry)
}

// ---------------------------------------------------------------------------
// Name normalization
// ---------------------------------------------------------------------------

/// Title-case a name written entirely in capitals; other names are returned
/// unchanged, which makes the transform idempotent.
///
/// Roman numerals with a trailing dot ("XII.") stay uppercase and the words
/// in [`LOWERCASE_WORDS`] stay lowercase unless they open the name.
pub fn normalize_uppercase_name(name: &str) -> String {
    if !is_all_uppercase(name) {
        return name.to_string();
    }

    name.split_whitespace()
        .enumerate()
        .map(|(i, word)| title_word(word, i == 0))
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_all_uppercase(s: &str) -> bool {
    s.chars().any(char::is_alphabetic) && !s.chars().any(char::is_lowercase)
}

fn title_word(word: &str, first: bool) -> String {
    if ROMAN_WITH_DOT.is_match(word) {
        return word.to_string();
    }
    let lower = word.to_lowercase();
    if !first && LOWERCASE_WORDS.contains(&lower.as_str()) {
        return lower;
    }
    lower.split('-').map(capitalize).collect::<Vec<_>>().join("-")
}

/// Uppercase the first alphabetic character, so "(budapest)" -> "(Budapest)".
fn capitalize(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut done = false;
    for c in segment.chars() {
        if !done && c.is_alphabetic() {
            out.extend(c.to_uppercase());
            done = true;
        } else {
            out.push(c);
        }
    }
    out
}
