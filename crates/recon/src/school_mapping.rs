//! Curator-authored school overrides, consulted before fuzzy matching.

use std::collections::HashMap;
use std::path::Path;

use tracing::{info, warn};

use crate::error::ReconError;
use crate::model::SchoolKey;
use crate::overrides;

const TABLE: &str = "school mapping";
const DROP_MARKER: &str = "DROP";

/// Where a manually mapped (school, city) goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchoolTarget {
    /// Canonical registry name to use instead of fuzzy matching.
    Registry(String),
    /// Exclude the records whatever the fuzzy match would say.
    Drop,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchoolMappingEntry {
    pub target: SchoolTarget,
    pub comment: String,
}

impl SchoolMappingEntry {
    /// `None` for a blank corrected name: the row has not been reviewed yet.
    pub fn from_columns(corrected_school_name: &str, comment: &str) -> Option<Self> {
        let corrected = corrected_school_name.trim();
        let target = match corrected {
            "" => return None,
            DROP_MARKER => SchoolTarget::Drop,
            name => SchoolTarget::Registry(name.to_string()),
        };
        Some(Self {
            target,
            comment: comment.to_string(),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct SchoolMapping {
    entries: HashMap<SchoolKey, SchoolMappingEntry>,
}

impl SchoolMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, school_name: &str, city: &str, entry: SchoolMappingEntry) {
        let key = SchoolKey::new(school_name, city);
        if self.entries.insert(key.clone(), entry).is_some() {
            warn!("duplicate {TABLE} entry for {key}, keeping the last one");
        }
    }

    pub fn get(&self, school_name: &str, city: &str) -> Option<&SchoolMappingEntry> {
        self.entries.get(&SchoolKey::new(school_name, city))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn drop_count(&self) -> usize {
        self.entries
            .values()
            .filter(|e| e.target == SchoolTarget::Drop)
            .count()
    }
}

/// Strict parse of `school_name;city;corrected_school_name;comment`.
pub fn parse_school_mapping(text: &str) -> Result<SchoolMapping, ReconError> {
    let (table, [school, city, corrected, comment]) = overrides::parse_table(
        text,
        TABLE,
        ["school_name", "city", "corrected_school_name", "comment"],
    )?;

    let mut mapping = SchoolMapping::new();
    for (line, row) in table.rows.iter().enumerate() {
        let Some(entry) = SchoolMappingEntry::from_columns(&row[corrected], &row[comment]) else {
            warn!(
                "{TABLE} row {}: empty corrected_school_name for {} in \"{}\", skipping",
                line + 2,
                row[school],
                row[city]
            );
            continue;
        };
        mapping.insert(&row[school], &row[city], entry);
    }

    Ok(mapping)
}

/// Load the school mapping file; any problem yields an empty mapping.
pub fn load_school_mapping(path: Option<&Path>) -> SchoolMapping {
    let mapping = overrides::load_soft(path, TABLE, parse_school_mapping);
    if !mapping.is_empty() {
        info!(
            "loaded {} manual school mappings ({} drops)",
            mapping.len(),
            mapping.drop_count()
        );
    }
    mapping
}
