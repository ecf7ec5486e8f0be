//! Competition dataset files.
//!
//! The upstream parser writes `;`-delimited UTF-8 with Hungarian headers.
//! Reading sniffs the delimiter and falls back to Windows-1250 text.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::error::ReconError;
use crate::model::CompetitionRecord;

const DATASET_DELIMITER: u8 = b';';

pub fn read_records(text: &str) -> Result<Vec<CompetitionRecord>, ReconError> {
    let delimiter = kir_io::csv::sniff_delimiter(text);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut records = Vec::new();
    for row in reader.deserialize() {
        records.push(row?);
    }
    Ok(records)
}

pub fn load_records(path: &Path) -> Result<Vec<CompetitionRecord>, ReconError> {
    let text = kir_io::csv::read_file_as_utf8(path)?;
    let records = read_records(&text)?;
    info!("loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

pub fn write_records<W: Write>(writer: W, records: &[CompetitionRecord]) -> Result<(), ReconError> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(DATASET_DELIMITER)
        .from_writer(writer);
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Write the dataset at `path`, creating parent directories.
pub fn save_records(path: &Path, records: &[CompetitionRecord]) -> Result<(), ReconError> {
    let io_err = |source| ReconError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let file = File::create(path).map_err(io_err)?;
    write_records(file, records)?;
    info!("saved {} records to {}", records.len(), path.display());
    Ok(())
}
