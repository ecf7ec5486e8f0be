use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One row of scraped competition results.
///
/// Serialized with the Hungarian headers the upstream parser emits; the
/// English names are accepted when reading. `county` and `region` are empty
/// until the applier fills them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetitionRecord {
    #[serde(rename = "ev", alias = "year", default)]
    pub year: String,
    #[serde(rename = "targy", alias = "subject", default)]
    pub subject: String,
    #[serde(rename = "evfolyam", alias = "grade", default)]
    pub grade: String,
    #[serde(rename = "helyezes", alias = "rank", default)]
    pub rank: String,
    #[serde(rename = "iskola_nev", alias = "school_name")]
    pub school_name: String,
    #[serde(rename = "varos", alias = "city")]
    pub city: String,
    #[serde(rename = "vármegye", alias = "varmegye", alias = "county", default)]
    pub county: Option<String>,
    #[serde(rename = "régió", alias = "regio", alias = "region", default)]
    pub region: Option<String>,
}

impl CompetitionRecord {
    pub fn key(&self) -> SchoolKey {
        SchoolKey::new(&self.school_name, &self.city)
    }
}

/// (school name, city) exactly as they appear in a record. Every override
/// table and the match results are keyed this way.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SchoolKey {
    pub school_name: String,
    pub city: String,
}

impl SchoolKey {
    pub fn new(school_name: &str, city: &str) -> Self {
        Self {
            school_name: school_name.to_string(),
            city: city.to_string(),
        }
    }
}

impl std::fmt::Display for SchoolKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.school_name, self.city)
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// One facility row of the authoritative registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistryRecord {
    /// Canonical institution name; the value written back to the dataset.
    pub institution_name: String,
    /// Facility (site) name, scored as an alternate spelling.
    pub facility_name: Option<String>,
    pub city: String,
    pub county: String,
    pub region: String,
}

// ---------------------------------------------------------------------------
// Match results
// ---------------------------------------------------------------------------

/// How a (school, city) pair was resolved.
///
/// Declaration order is the audit sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchMethod {
    Manual,
    ManualDrop,
    AutoHigh,
    AutoMedium,
    Dropped,
    NoMatch,
}

impl MatchMethod {
    pub const ALL: [MatchMethod; 6] = [
        Self::Manual,
        Self::ManualDrop,
        Self::AutoHigh,
        Self::AutoMedium,
        Self::Dropped,
        Self::NoMatch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "MANUAL",
            Self::ManualDrop => "MANUAL_DROP",
            Self::AutoHigh => "AUTO_HIGH",
            Self::AutoMedium => "AUTO_MEDIUM",
            Self::Dropped => "DROPPED",
            Self::NoMatch => "NO_MATCH",
        }
    }

    /// Status is a function of the method, never set independently.
    pub fn status(&self) -> MatchStatus {
        match self {
            Self::Manual | Self::AutoHigh | Self::AutoMedium => MatchStatus::Applied,
            Self::ManualDrop | Self::Dropped | Self::NoMatch => MatchStatus::NotApplied,
        }
    }
}

impl std::fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    Applied,
    NotApplied,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Applied => "APPLIED",
            Self::NotApplied => "NOT_APPLIED",
        }
    }
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The decision for one unique (school, city) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub our_school_name: String,
    pub our_city: String,
    pub matched_school_name: Option<String>,
    pub matched_city: Option<String>,
    pub matched_county: Option<String>,
    pub matched_region: Option<String>,
    /// 0–100; `None` for manual decisions and when nothing was scored.
    pub confidence_score: Option<f64>,
    pub match_method: MatchMethod,
    pub status: MatchStatus,
    pub comment: String,
}

impl MatchResult {
    /// Build a result; `status` is derived from `method`.
    pub fn new(
        key: &SchoolKey,
        method: MatchMethod,
        matched: Option<&RegistryRecord>,
        confidence_score: Option<f64>,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            our_school_name: key.school_name.clone(),
            our_city: key.city.clone(),
            matched_school_name: matched.map(|r| r.institution_name.clone()),
            matched_city: matched.map(|r| r.city.clone()),
            matched_county: matched.map(|r| r.county.clone()),
            matched_region: matched.map(|r| r.region.clone()),
            confidence_score,
            match_method: method,
            status: method.status(),
            comment: comment.into(),
        }
    }

    pub fn key(&self) -> SchoolKey {
        SchoolKey::new(&self.our_school_name, &self.our_city)
    }

    pub fn is_applied(&self) -> bool {
        self.status == MatchStatus::Applied
    }
}

// ---------------------------------------------------------------------------
// Stage statistics
// ---------------------------------------------------------------------------

/// Counts from the city-correction pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CityCorrectionStats {
    pub corrected: usize,
    pub dropped: usize,
}

/// Counts from the applier. `kept_rows + dropped_rows + missing_rows` equals
/// the number of input rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ApplyStats {
    pub kept_rows: usize,
    pub dropped_rows: usize,
    /// Rows whose pair had no match result; always zero in a correct pipeline.
    pub missing_rows: usize,
    pub applied_pairs: usize,
    pub not_applied_pairs: usize,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ReconSummary {
    pub input_rows: usize,
    pub city_corrections: CityCorrectionStats,
    pub unique_pairs: usize,
    pub method_counts: BTreeMap<String, usize>,
    pub applied_pairs: usize,
    pub not_applied_pairs: usize,
    pub missing_rows: usize,
    pub output_rows: usize,
    pub unique_schools: usize,
    pub unmapped_city_variations: usize,
    /// Empty-value count per output column.
    pub empty_counts: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub engine_version: String,
    pub run_at: String,
    pub medium_confidence_threshold: f64,
    pub high_confidence_threshold: f64,
}

/// Everything one pipeline run produces.
#[derive(Debug, Clone, Serialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    #[serde(skip)]
    pub records: Vec<CompetitionRecord>,
    #[serde(skip)]
    pub matches: Vec<MatchResult>,
    #[serde(skip)]
    pub city_variations: Vec<crate::city_mapping::CityVariation>,
}
