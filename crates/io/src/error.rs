use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IoError {
    /// File could not be opened or read.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Malformed delimited text.
    #[error("malformed delimited data: {0}")]
    Csv(#[from] csv::Error),
    /// calamine could not open or decode the workbook.
    #[error("cannot open workbook {}: {message}", path.display())]
    Workbook { path: PathBuf, message: String },
    /// Workbook has no worksheets at all.
    #[error("workbook {} contains no sheets", path.display())]
    NoSheets { path: PathBuf },
}
