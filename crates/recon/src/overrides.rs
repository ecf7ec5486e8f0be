//! Shared plumbing for the curator-maintained override tables.
//!
//! Both tables are `;`-delimited UTF-8 with a header row. Loading them never
//! fails the run: any problem degrades to "no overrides" with a log line.

use std::path::Path;

use kir_io::Table;
use tracing::{error, info};

use crate::error::ReconError;

pub(crate) const OVERRIDE_DELIMITER: u8 = b';';

/// Parse an override table and resolve the required column positions.
pub(crate) fn parse_table<const N: usize>(
    text: &str,
    table: &'static str,
    required: [&str; N],
) -> Result<(Table, [usize; N]), ReconError> {
    let parsed = kir_io::csv::parse_delimited(text, OVERRIDE_DELIMITER)?;

    let missing = parsed.missing_columns(&required[..]);
    if !missing.is_empty() {
        return Err(ReconError::MissingColumns {
            table,
            missing,
            found: parsed.headers.clone(),
        });
    }

    let mut idx = [0usize; N];
    for (slot, name) in idx.iter_mut().zip(required) {
        // Presence was checked above
        *slot = parsed.column_index(name).unwrap_or_default();
    }
    Ok((parsed, idx))
}

/// Load an optional override file, falling back to `T::default()` on any problem.
pub(crate) fn load_soft<T, F>(path: Option<&Path>, table: &'static str, parse: F) -> T
where
    T: Default,
    F: FnOnce(&str) -> Result<T, ReconError>,
{
    let Some(path) = path else {
        info!("no {table} file configured");
        return T::default();
    };

    if !path.exists() {
        info!("no {table} file found at {}, skipping", path.display());
        return T::default();
    }

    let text = match kir_io::csv::read_file_as_utf8(path) {
        Ok(text) => text,
        Err(e) => {
            error!("failed to read {table} file: {e}");
            return T::default();
        }
    };

    match parse(&text) {
        Ok(parsed) => parsed,
        Err(e) => {
            error!("ignoring {table} file {}: {e}", path.display());
            T::default()
        }
    }
}
