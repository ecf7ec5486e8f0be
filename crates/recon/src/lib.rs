//! `kir-recon`: reconciles scraped competition results against the KIR
//! school registry.
//!
//! Pure engine crate: the pipeline works on pre-loaded records and returns
//! reconciled rows, match decisions and a summary. File loading is limited to
//! the registry, the curator override tables and the dataset helpers.

pub mod apply;
pub mod audit;
pub mod city;
pub mod city_mapping;
pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod matcher;
pub mod model;
mod overrides;
pub mod registry;
pub mod school_mapping;
pub mod score;

pub use config::{ReconConfig, Thresholds};
pub use engine::{run, run_with_scorer, ReconInput};
pub use error::ReconError;
pub use matcher::Matcher;
pub use model::{CompetitionRecord, MatchMethod, MatchResult, MatchStatus, ReconResult};
pub use registry::Registry;
