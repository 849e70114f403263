//! CSV post-processing.
//!
//! Pure transformations over an in-memory table of strings. Reading and
//! writing the files is left to the shell.

use std::collections::HashSet;

use crate::error::{Error, Result};

/// Name of the column appended by [`add_year_level`].
pub const YEAR_LEVEL_COLUMN: &str = "year_level";

/// A CSV file held in memory: one header row and string records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Position of `name` in the header row.
    pub fn column(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|header| header == name)
            .ok_or_else(|| Error::MissingColumn(name.to_string()))
    }
}

/// Year level encoded in the fourth character of a course code.
pub fn year_level(code: &str) -> &'static str {
    match code.chars().nth(3) {
        Some('A') => "1st year",
        Some('B') => "2nd year",
        Some('C') => "3rd year",
        Some('D') => "4th year",
        _ => "",
    }
}

/// Append a `year_level` column derived from `code_column`.
pub fn add_year_level(table: &CsvTable, code_column: &str) -> Result<CsvTable> {
    let idx = table.column(code_column)?;

    let mut headers = table.headers.clone();
    headers.push(YEAR_LEVEL_COLUMN.to_string());

    let rows = table
        .rows
        .iter()
        .map(|row| {
            let code = row.get(idx).map(String::as_str).unwrap_or_default();
            let mut row = row.clone();
            row.push(year_level(code).to_string());
            row
        })
        .collect();

    Ok(CsvTable { headers, rows })
}

/// Keep the first row for every distinct value of `key`, in input order.
pub fn dedup_by_key(table: &CsvTable, key: &str) -> Result<CsvTable> {
    let idx = table.column(key)?;
    let mut seen = HashSet::new();

    let rows = table
        .rows
        .iter()
        .filter(|row| seen.insert(row.get(idx).cloned().unwrap_or_default()))
        .cloned()
        .collect();

    Ok(CsvTable {
        headers: table.headers.clone(),
        rows,
    })
}
