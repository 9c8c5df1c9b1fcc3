//! In-memory table of string cells.
//!
//! Every stage of the pipeline passes a [`Frame`] around: an ordered header row
//! plus rectangular string records, exactly as they come out of the CSV reader.
//! An empty cell stands for a missing value. Numeric interpretation happens at
//! the few places that need it through [`parse_number`].

use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Frame {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self { headers, rows }
    }

    /// Builds a frame from string literals; handy for fixtures.
    pub fn from_rows(headers: &[&str], rows: &[&[&str]]) -> Self {
        Self::new(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|row| row.iter().map(|cell| cell.to_string()).collect())
                .collect(),
        )
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(|s| s.as_str())
            .unwrap_or("")
    }

    pub fn column_values(&self, column: usize) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .map(move |row| row.get(column).map(|s| s.as_str()).unwrap_or(""))
    }

    pub fn distinct_values(&self, column: usize) -> HashSet<&str> {
        self.column_values(column).collect()
    }

    /// Returns the frame with the named columns renamed; unknown names are ignored.
    pub fn rename_columns<'a, I>(mut self, renames: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (from, to) in renames {
            if let Some(idx) = self.column_index(from) {
                self.headers[idx] = to.to_string();
            }
        }
        self
    }

    /// Projects the frame onto `indices` (in that order) under new header names.
    pub fn select(&self, indices: &[usize], headers: Vec<String>) -> Self {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                indices
                    .iter()
                    .map(|idx| row.get(*idx).cloned().unwrap_or_default())
                    .collect()
            })
            .collect();
        Self { headers, rows }
    }

    pub fn drop_column(&mut self, index: usize) {
        if index >= self.headers.len() {
            return;
        }
        self.headers.remove(index);
        for row in &mut self.rows {
            if index < row.len() {
                row.remove(index);
            }
        }
    }

    /// Appends a column whose cells are produced row by row.
    pub fn push_column<F>(&mut self, name: &str, mut value: F)
    where
        F: FnMut(&[String]) -> String,
    {
        self.headers.push(name.to_string());
        for row in &mut self.rows {
            let cell = value(row);
            row.push(cell);
        }
    }

    pub fn retain_rows<F>(&mut self, mut keep: F)
    where
        F: FnMut(&[String]) -> bool,
    {
        self.rows.retain(|row| keep(row));
    }
}

/// Parses a cell as a float, treating empty or whitespace-only cells as missing.
pub fn parse_number(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn is_missing(value: &str) -> bool {
    value.trim().is_empty()
}

/// Formats a float the way the CSV writer should emit it.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
