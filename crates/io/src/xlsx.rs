// Spreadsheet import (xlsx, xlsm, xls, xlsb, ods) via calamine

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use tracing::{debug, warn};

use crate::error::IoError;
use crate::table::{clean_header, Table};

const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "xlsb", "ods"];

/// True when the extension is one calamine can open.
pub fn is_spreadsheet(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_ascii_lowercase();
            SPREADSHEET_EXTENSIONS.contains(&e.as_str())
        })
        .unwrap_or(false)
}

/// Read the first worksheet. The first non-empty row is the header row.
pub fn read_first_sheet(path: &Path) -> Result<Table, IoError> {
    let mut workbook: Sheets<_> = open_workbook_auto(path).map_err(|e| IoError::Workbook {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let Some(first) = sheet_names.first() else {
        return Err(IoError::NoSheets {
            path: path.to_path_buf(),
        });
    };
    if sheet_names.len() > 1 {
        debug!(sheet = %first, total = sheet_names.len(), "reading first sheet only");
    }

    let range = workbook
        .worksheet_range(first)
        .map_err(|e| IoError::Workbook {
            path: path.to_path_buf(),
            message: format!("cannot read sheet '{first}': {e}"),
        })?;

    let mut rows = range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect::<Vec<String>>())
        .skip_while(|row| row.iter().all(|c| c.is_empty()));

    let Some(header_row) = rows.next() else {
        warn!(path = %path.display(), sheet = %first, "worksheet is empty");
        return Ok(Table::default());
    };

    let mut table = Table::new(header_row.iter().map(|h| clean_header(h)).collect());
    for row in rows {
        table.push_row(row);
    }

    Ok(table)
}

/// Render a cell as trimmed text. Whole floats print without a fraction so
/// numeric identifiers survive the round trip.
pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(n) => n.to_string(),
        Data::Float(n) => format_float(*n),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => format_float(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("#{e:?}"),
    }
}

fn format_float(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}
