use std::path::PathBuf;

use serde::Deserialize;

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Pipeline configuration, parsed once and passed explicitly to each stage.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReconConfig {
    pub registry: RegistryConfig,
    #[serde(default)]
    pub overrides: OverridesConfig,
    #[serde(default)]
    pub matching: Thresholds,
    #[serde(default)]
    pub paths: PathsConfig,
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    pub path: PathBuf,
    #[serde(default)]
    pub columns: RegistryColumns,
    /// Columns that must be present. Defaults to the four mandatory mapped
    /// columns when omitted.
    #[serde(default)]
    pub required_columns: Option<Vec<String>>,
}

impl RegistryConfig {
    pub fn required_columns(&self) -> Vec<String> {
        match &self.required_columns {
            Some(cols) => cols.clone(),
            None => self.columns.mandatory().iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Registry header names. Defaults are the KIR facility export headers.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RegistryColumns {
    pub institution_name: String,
    pub facility_name: Option<String>,
    pub city: String,
    pub county: String,
    pub region: String,
}

impl Default for RegistryColumns {
    fn default() -> Self {
        Self {
            institution_name: "Intézmény megnevezése".into(),
            facility_name: Some("Feladatellátási hely megnevezése".into()),
            city: "A feladatellátási hely települése".into(),
            county: "A feladatellátási hely vármegyéje".into(),
            region: "A feladatellátási hely régiója".into(),
        }
    }
}

impl RegistryColumns {
    pub fn mandatory(&self) -> [&str; 4] {
        [&self.institution_name, &self.city, &self.county, &self.region]
    }
}

// ---------------------------------------------------------------------------
// Overrides + Paths
// ---------------------------------------------------------------------------

/// Curated override tables. Both are optional; a missing file means
/// "no overrides".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OverridesConfig {
    #[serde(default)]
    pub city_mapping_file: Option<PathBuf>,
    #[serde(default)]
    pub school_mapping_file: Option<PathBuf>,
}

/// Dataset and output locations used by the command-line runner.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    #[serde(default)]
    pub dataset: Option<PathBuf>,
    #[serde(default)]
    pub reconciled: Option<PathBuf>,
    #[serde(default)]
    pub audit: Option<PathBuf>,
    #[serde(default)]
    pub report: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Confidence tiers for fuzzy matches: `< medium` is dropped,
/// `[medium, high)` is medium, `>= high` is high.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Thresholds {
    #[serde(rename = "medium_confidence_threshold")]
    pub medium: f64,
    #[serde(rename = "high_confidence_threshold")]
    pub high: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            medium: 70.0,
            high: 90.0,
        }
    }
}

impl Thresholds {
    pub fn new(medium: f64, high: f64) -> Result<Self, ReconError> {
        let t = Self { medium, high };
        t.validate()?;
        Ok(t)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        for (name, value) in [("medium", self.medium), ("high", self.high)] {
            if !(0.0..=100.0).contains(&value) {
                return Err(ReconError::ConfigValidation(format!(
                    "{name}_confidence_threshold must be within [0, 100], got {value}"
                )));
            }
        }
        if self.medium >= self.high {
            return Err(ReconError::ConfigValidation(format!(
                "medium_confidence_threshold ({}) must be below high_confidence_threshold ({})",
                self.medium, self.high
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        self.matching.validate()?;

        let cols = &self.registry.columns;
        for (field, value) in [
            ("institution_name", cols.institution_name.as_str()),
            ("city", cols.city.as_str()),
            ("county", cols.county.as_str()),
            ("region", cols.region.as_str()),
        ] {
            if value.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "registry.columns.{field} must not be empty"
                )));
            }
        }

        if let Some(required) = &self.registry.required_columns {
            if required.is_empty() {
                return Err(ReconError::ConfigValidation(
                    "registry.required_columns must list at least one column".into(),
                ));
            }
        }

        Ok(())
    }

    /// Resolve every relative path against `base` (the config file's directory).
    pub fn resolve_paths(&mut self, base: &std::path::Path) {
        let fix = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        fix(&mut self.registry.path);
        for p in [
            &mut self.overrides.city_mapping_file,
            &mut self.overrides.school_mapping_file,
            &mut self.paths.dataset,
            &mut self.paths.reconciled,
            &mut self.paths.audit,
            &mut self.paths.report,
        ]
        .into_iter()
        .flatten()
        {
            fix(p);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
