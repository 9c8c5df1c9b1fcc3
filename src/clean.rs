//! Bronze → silver cleaning.
//!
//! Brings the raw downloads to clean column names and fills the gaps the
//! reconciliation step cannot cope with:
//!
//! - headers are snake-cased and the country column is called `country_name`
//! - the snapshot gains a constant `year` column
//! - rows without a country are dropped
//! - numeric gaps are filled with the country mean, then the column mean
//! - region labels are unified across vintages
//! - geolocation rows without coordinates are dropped

use std::collections::HashMap;

use heck::ToSnakeCase;
use log::info;

use crate::{
    append::{COUNTRY_COLUMN, YEAR_COLUMN},
    frame::{Frame, format_number, is_missing, parse_number},
    geo::{LATITUDE_COLUMN, LONGITUDE_COLUMN},
    region::REGION_COLUMN,
};

/// Year stamped on the single-year snapshot when it has no `year` column.
pub const SNAPSHOT_YEAR: i64 = 2021;

const REGION_LABELS: &[(&str, &str)] = &[
    ("Eastern Asia", "East Asia"),
    ("Southeastern Asia", "Southeast Asia"),
    ("Southern Asia", "South Asia"),
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanReport {
    pub rows_dropped: usize,
    pub cells_imputed: usize,
    pub regions_relabelled: usize,
}

pub fn snake_case_columns(mut frame: Frame) -> Frame {
    for header in &mut frame.headers {
        *header = header.trim().to_snake_case();
    }
    frame
}

/// Cleans a happiness table. `default_year` is added as the `year` column when
/// the table lacks one.
pub fn clean_happiness(frame: Frame, default_year: Option<i64>) -> (Frame, CleanReport) {
    let mut frame = snake_case_columns(frame);
    if frame.column_index(COUNTRY_COLUMN).is_none() {
        frame = frame.rename_columns([("country", COUNTRY_COLUMN)]);
    }
    if let Some(year) = default_year
        && frame.column_index(YEAR_COLUMN).is_none()
    {
        let year = year.to_string();
        frame.push_column(YEAR_COLUMN, |_| year.clone());
    }

    let mut report = CleanReport {
        rows_dropped: drop_missing_countries(&mut frame),
        ..CleanReport::default()
    };
    report.cells_imputed = impute_numeric(&mut frame);
    report.regions_relabelled = normalise_regions(&mut frame);
    (frame, report)
}

/// Cleans the geolocation table: `name` becomes `country_name` (the `country`
/// column keeps the ISO code) and rows without coordinates are dropped.
pub fn clean_geolocation(frame: Frame) -> (Frame, CleanReport) {
    let mut frame = snake_case_columns(frame);
    if frame.column_index(COUNTRY_COLUMN).is_none() {
        frame = frame.rename_columns([("name", COUNTRY_COLUMN)]);
    }
    let mut report = CleanReport {
        rows_dropped: drop_missing_countries(&mut frame),
        ..CleanReport::default()
    };

    if let (Some(lat), Some(lon)) = (
        frame.column_index(LATITUDE_COLUMN),
        frame.column_index(LONGITUDE_COLUMN),
    ) {
        let before = frame.row_count();
        frame.retain_rows(|row| {
            parse_number(row.get(lat).map(|s| s.as_str()).unwrap_or("")).is_some()
                && parse_number(row.get(lon).map(|s| s.as_str()).unwrap_or("")).is_some()
        });
        let dropped = before - frame.row_count();
        if dropped > 0 {
            info!("Dropped {dropped} geolocation row(s) without latitude/longitude");
        }
        report.rows_dropped += dropped;
    }
    (frame, report)
}

fn drop_missing_countries(frame: &mut Frame) -> usize {
    let Some(idx) = frame.column_index(COUNTRY_COLUMN) else {
        return 0;
    };
    for row in &mut frame.rows {
        if let Some(cell) = row.get_mut(idx) {
            let trimmed = cell.trim();
            if trimmed.len() != cell.len() {
                *cell = trimmed.to_string();
            }
        }
    }
    let before = frame.row_count();
    frame.retain_rows(|row| !is_missing(row.get(idx).map(|s| s.as_str()).unwrap_or("")));
    before - frame.row_count()
}

/// Columns whose filled cells are all numbers, with at least one filled cell.
pub fn numeric_columns(frame: &Frame) -> Vec<usize> {
    (0..frame.column_count())
        .filter(|idx| {
            let mut seen = false;
            for value in frame.column_values(*idx) {
                if is_missing(value) {
                    continue;
                }
                if parse_number(value).is_none() {
                    return false;
                }
                seen = true;
            }
            seen
        })
        .collect()
}

#[derive(Default, Clone, Copy)]
struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn value(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Fills numeric gaps with the per-country mean, falling back to the column
/// mean when a country has no value at all. Returns the number of cells filled.
fn impute_numeric(frame: &mut Frame) -> usize {
    let country = frame.column_index(COUNTRY_COLUMN);
    let mut filled = 0usize;
    for column in numeric_columns(frame) {
        let mut global = Mean::default();
        let mut by_country: HashMap<String, Mean> = HashMap::new();
        for row in &frame.rows {
            let Some(value) = parse_number(row.get(column).map(|s| s.as_str()).unwrap_or(""))
            else {
                continue;
            };
            global.add(value);
            if let Some(country) = country {
                let key = row.get(country).cloned().unwrap_or_default();
                by_country.entry(key).or_default().add(value);
            }
        }

        for row in &mut frame.rows {
            let missing = row.get(column).map(|s| is_missing(s)).unwrap_or(false);
            if !missing {
                continue;
            }
            let country_mean = country
                .and_then(|idx| row.get(idx))
                .and_then(|name| by_country.get(name))
                .and_then(Mean::value);
            if let Some(mean) = country_mean.or_else(|| global.value()) {
                row[column] = format_number(mean);
                filled += 1;
            }
        }
    }
    filled
}

fn normalise_regions(frame: &mut Frame) -> usize {
    let Some(idx) = frame.column_index(REGION_COLUMN) else {
        return 0;
    };
    let mut relabelled = 0usize;
    for row in &mut frame.rows {
        let Some(cell) = row.get_mut(idx) else {
            continue;
        };
        if let Some((_, label)) = REGION_LABELS.iter().find(|(from, _)| cell.as_str() == *from) {
            *cell = label.to_string();
            relabelled += 1;
        }
    }
    relabelled
}
