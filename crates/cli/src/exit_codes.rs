//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: pipeline scripts rely on them.
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | Success                                              |
//! | 1    | General error (unspecified)                          |
//! | 2    | Usage error (bad args, unreadable config file)       |
//! | 3    | Invalid config (TOML syntax, thresholds, columns)    |
//! | 4    | Registry error (missing file, missing columns)       |
//! | 5    | Dataset or output I/O error                          |
//!
//! Data-quality outcomes (no match, low confidence, stale overrides) never
//! change the exit code; they are reported in the audit file.

use kir_recon::ReconError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, config file not readable.
pub const EXIT_USAGE: u8 = 2;

/// Config parsed but rejected, or not parseable at all.
pub const EXIT_INVALID_CONFIG: u8 = 3;

/// Registry file missing or lacking required columns.
/// Nothing can be matched without the registry.
pub const EXIT_REGISTRY: u8 = 4;

/// Dataset unreadable, or an output file could not be written.
pub const EXIT_IO: u8 = 5;

/// Map a ReconError to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_INVALID_CONFIG,
        ReconError::RegistryNotFound(_) | ReconError::RegistryMissingColumns { .. } => {
            EXIT_REGISTRY
        }
        ReconError::Dataset(_) | ReconError::Table(_) | ReconError::Io { .. } => EXIT_IO,
        // Override tables load softly and never surface here
        ReconError::MissingColumns { .. } => EXIT_ERROR,
    }
}
