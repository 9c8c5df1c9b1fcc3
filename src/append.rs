//! Union of the aligned panel and snapshot with snapshot precedence.

use std::{cmp::Ordering, collections::BTreeMap};

use log::debug;

use crate::{
    columns::find_column,
    error::ReconcileError,
    frame::{Frame, parse_number},
};

pub const COUNTRY_COLUMN: &str = "country_name";
pub const YEAR_COLUMN: &str = "year";

/// 2^53: above this not every integer has an `f64` representation.
const MAX_EXACT_FLOAT_INT: f64 = 9_007_199_254_740_992.0;

/// Year component of the gold key. Integral years (`2021`, `2021.0`) compare as
/// numbers; anything else falls back to its trimmed text. Floats are only
/// read as numbers while they convert to `i64` exactly.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum YearKey {
    Number(i64),
    Text(String),
}

impl YearKey {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Ok(year) = trimmed.parse::<i64>() {
            return YearKey::Number(year);
        }
        match parse_number(trimmed) {
            Some(value) if value.fract() == 0.0 && value.abs() <= MAX_EXACT_FLOAT_INT => {
                YearKey::Number(value as i64)
            }
            _ => YearKey::Text(trimmed.to_string()),
        }
    }
}

/// `(country_name, year)` key of a gold row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowKey {
    pub country: String,
    pub year: YearKey,
}

impl Ord for RowKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.country
            .cmp(&other.country)
            .then_with(|| self.year.cmp(&other.year))
    }
}

impl PartialOrd for RowKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Appends `snapshot` to `panel`, keeping one row per `(country_name, year)`.
///
/// Both frames must carry the same header row (see
/// [`crate::align::intersect_and_align`]). Panel rows go into the key map
/// first and snapshot rows then replace them whole, so a key present in both
/// tables always resolves to the snapshot's row. Within one table a repeated
/// key keeps its last row. Output rows are ordered by key.
pub fn append_with_precedence(panel: &Frame, snapshot: &Frame) -> Result<Frame, ReconcileError> {
    let panel_country = find_column(panel, "panel", COUNTRY_COLUMN)?.index;
    let panel_year = find_column(panel, "panel", YEAR_COLUMN)?.index;
    let snapshot_country = find_column(snapshot, "snapshot", COUNTRY_COLUMN)?.index;
    let snapshot_year = find_column(snapshot, "snapshot", YEAR_COLUMN)?.index;

    let mut merged: BTreeMap<RowKey, &Vec<String>> = BTreeMap::new();
    for row in &panel.rows {
        merged.insert(row_key(row, panel_country, panel_year), row);
    }
    let mut replaced = 0usize;
    for row in &snapshot.rows {
        if merged
            .insert(row_key(row, snapshot_country, snapshot_year), row)
            .is_some()
        {
            replaced += 1;
        }
    }
    debug!(
        "Appended {} panel and {} snapshot row(s); {replaced} snapshot row(s) replaced an earlier row",
        panel.row_count(),
        snapshot.row_count(),
    );

    let rows = merged.into_values().cloned().collect();
    Ok(Frame::new(panel.headers.clone(), rows))
}

fn row_key(row: &[String], country: usize, year: usize) -> RowKey {
    RowKey {
        country: row.get(country).cloned().unwrap_or_default(),
        year: YearKey::parse(row.get(year).map(|s| s.as_str()).unwrap_or("")),
    }
}
