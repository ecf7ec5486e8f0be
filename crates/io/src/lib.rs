//! `kir-io`: header-row tables from delimited text and spreadsheet files.
//!
//! No domain knowledge: callers receive a [`Table`] of trimmed strings and
//! decide which columns matter.

pub mod csv;
pub mod error;
pub mod table;
pub mod xlsx;

use std::path::Path;

pub use error::IoError;
pub use table::Table;

/// Read a table from `path`, dispatching on the file extension.
///
/// Spreadsheet extensions go through calamine (first worksheet); everything
/// else is treated as delimited text with a sniffed delimiter.
pub fn read_table(path: &Path) -> Result<Table, IoError> {
    if xlsx::is_spreadsheet(path) {
        xlsx::read_first_sheet(path)
    } else {
        csv::read_delimited(path)
    }
}
