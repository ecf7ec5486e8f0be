/// A header row plus data rows, every cell already trimmed text.
///
/// Rows are padded to the header width so column indexing never goes out of
/// bounds; fully empty rows are not stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Append a row, padding or truncating it to the header width.
    /// Rows with no non-empty cell are ignored.
    pub fn push_row(&mut self, mut row: Vec<String>) {
        if row.iter().all(|c| c.is_empty()) {
            return;
        }
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the first header equal to `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Required column names not present in the header row, in the order given.
    pub fn missing_columns<S: AsRef<str>>(&self, required: &[S]) -> Vec<String> {
        required
            .iter()
            .map(|c| c.as_ref())
            .filter(|c| self.column_index(c).is_none())
            .map(str::to_string)
            .collect()
    }
}

/// Header cleanup shared by both readers: trim and drop a UTF-8 BOM.
pub(crate) fn clean_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}').trim().to_string()
}
