//! Summary tables for a produced CSV, usually the gold table.
//!
//! `explore` prints four sections: the shape and column types, a numeric
//! summary (count, mean, std, min, quartiles, max), the most frequent values
//! of each text column, and the missing-cell count per column.

use std::{collections::HashMap, path::Path};

use anyhow::{Context, Result};
use log::info;

use crate::{
    clean::numeric_columns,
    frame::{Frame, is_missing, parse_number},
    io_utils, table,
};

/// Label used for empty cells in the frequency table.
pub const MISSING_LABEL: &str = "<missing>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Number,
    Text,
}

impl ColumnKind {
    fn as_str(self) -> &'static str {
        match self {
            ColumnKind::Number => "number",
            ColumnKind::Text => "text",
        }
    }
}

/// Kind of every column, in header order. A column is numeric when all of its
/// filled cells parse as numbers.
pub fn column_kinds(frame: &Frame) -> Vec<ColumnKind> {
    let numeric = numeric_columns(frame);
    (0..frame.column_count())
        .map(|idx| {
            if numeric.contains(&idx) {
                ColumnKind::Number
            } else {
                ColumnKind::Text
            }
        })
        .collect()
}

#[derive(Debug, Clone, Default)]
struct ColumnStats {
    values: Vec<f64>,
    sum: f64,
    sum_squares: f64,
}

impl ColumnStats {
    fn add_value(&mut self, value: f64) {
        self.sum += value;
        self.sum_squares += value * value;
        self.values.push(value);
    }

    fn count(&self) -> usize {
        self.values.len()
    }

    fn mean(&self) -> Option<f64> {
        (self.count() > 0).then(|| self.sum / self.count() as f64)
    }

    /// Sample standard deviation.
    fn std_dev(&self) -> Option<f64> {
        if self.count() < 2 {
            return None;
        }
        let n = self.count() as f64;
        let mean = self.mean()?;
        let variance = (self.sum_squares - n * mean * mean) / (n - 1.0);
        Some(variance.max(0.0).sqrt())
    }

    /// Quantile with linear interpolation between the closest ranks.
    fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
        let last = sorted.len().checked_sub(1)?;
        let position = q * last as f64;
        let lower = position.floor() as usize;
        let upper = position.ceil() as usize;
        let fraction = position - lower as f64;
        Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
    }

    fn render_row(&self, name: &str) -> Vec<String> {
        let mut sorted = self.values.clone();
        sorted.sort_by(f64::total_cmp);
        let metrics = [
            self.mean(),
            self.std_dev(),
            sorted.first().copied(),
            Self::quantile(&sorted, 0.25),
            Self::quantile(&sorted, 0.5),
            Self::quantile(&sorted, 0.75),
            sorted.last().copied(),
        ];
        let mut row = vec![name.to_string(), self.count().to_string()];
        row.extend(
            metrics
                .iter()
                .map(|metric| metric.map(format_metric).unwrap_or_default()),
        );
        row
    }
}

fn format_metric(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.4}")
    }
}

fn strings(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

pub fn numeric_summary_headers() -> Vec<String> {
    strings(&["column", "count", "mean", "std", "min", "25%", "50%", "75%", "max"])
}

/// One summary row per numeric column not named in `exclude`. Exclusions
/// match on the exact header.
pub fn describe_numeric(frame: &Frame, exclude: &[String]) -> Vec<Vec<String>> {
    numeric_columns(frame)
        .into_iter()
        .filter(|idx| !exclude.contains(&frame.headers[*idx]))
        .map(|idx| {
            let mut stats = ColumnStats::default();
            for value in frame.column_values(idx).filter_map(parse_number) {
                stats.add_value(value);
            }
            stats.render_row(&frame.headers[idx])
        })
        .collect()
}

pub fn frequency_headers() -> Vec<String> {
    strings(&["column", "value", "count", "percent"])
}

/// Top `top` values of every text column, empty cells included under
/// [`MISSING_LABEL`]. Rows are grouped by column name and ordered by
/// descending count, ties by value. `top == 0` keeps every value.
pub fn describe_categorical(frame: &Frame, top: usize) -> Vec<Vec<String>> {
    let kinds = column_kinds(frame);
    let mut columns = (0..frame.column_count())
        .filter(|idx| kinds[*idx] == ColumnKind::Text)
        .collect::<Vec<_>>();
    columns.sort_by(|a, b| frame.headers[*a].cmp(&frame.headers[*b]));

    let total = frame.row_count();
    let mut rows = Vec::new();
    for idx in columns {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for value in frame.column_values(idx) {
            let value = if is_missing(value) { MISSING_LABEL } else { value };
            *counts.entry(value).or_insert(0) += 1;
        }
        let mut items = counts.into_iter().collect::<Vec<_>>();
        items.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        if top > 0 && items.len() > top {
            items.truncate(top);
        }
        rows.extend(items.into_iter().map(|(value, count)| {
            let percent = (count as f64 / total as f64) * 100.0;
            vec![
                frame.headers[idx].clone(),
                value.to_string(),
                count.to_string(),
                format!("{percent:.2}%"),
            ]
        }));
    }
    rows
}

/// Missing-cell count of every column with at least one gap, largest first.
pub fn missing_counts(frame: &Frame) -> Vec<(String, usize)> {
    let mut counts = frame
        .headers
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let missing = frame.column_values(idx).filter(|v| is_missing(v)).count();
            (name.clone(), missing)
        })
        .filter(|(_, missing)| *missing > 0)
        .collect::<Vec<_>>();
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Prints every section for the CSV at `path`.
pub fn execute(
    path: &Path,
    exclude: &[String],
    top: usize,
    delimiter: Option<u8>,
    encoding: Option<&str>,
) -> Result<()> {
    let frame = io_utils::read_frame(path, delimiter, encoding)
        .with_context(|| format!("Loading {path:?}"))?;

    println!(
        "Shape: {} row(s) x {} column(s)",
        frame.row_count(),
        frame.column_count()
    );
    let mut types = frame
        .headers
        .iter()
        .cloned()
        .zip(column_kinds(&frame))
        .map(|(name, kind)| vec![name, kind.as_str().to_string()])
        .collect::<Vec<_>>();
    types.sort();
    table::print_table(&strings(&["column", "type"]), &types);

    if frame.is_empty() {
        info!("{path:?} has no rows to summarise");
        return Ok(());
    }

    println!();
    let numeric = describe_numeric(&frame, exclude);
    if numeric.is_empty() {
        println!("No numeric columns to describe after exclusion.");
    } else {
        table::print_table(&numeric_summary_headers(), &numeric);
    }

    println!();
    let frequencies = describe_categorical(&frame, top);
    if frequencies.is_empty() {
        println!("No text columns found.");
    } else {
        table::print_table(&frequency_headers(), &frequencies);
    }

    println!();
    let missing = missing_counts(&frame)
        .into_iter()
        .map(|(name, count)| vec![name, count.to_string()])
        .collect::<Vec<_>>();
    if missing.is_empty() {
        println!("No missing values.");
    } else {
        table::print_table(&strings(&["column", "missing"]), &missing);
    }

    info!(
        "Summarised {} numeric column(s) and {} frequent value(s) from {:?}",
        numeric.len(),
        frequencies.len(),
        path
    );
    Ok(())
}
