//! Plain-text rendering of frames for the terminal.

use std::{borrow::Cow, fmt::Write as _, path::Path};

use anyhow::{Context, Result};
use log::info;

use crate::{
    frame::{Frame, parse_number},
    io_utils,
};

/// Renders `headers` and `rows` as space-aligned columns. Cells that parse as
/// numbers are right-aligned.
pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths = headers
        .iter()
        .map(|h| h.chars().count().max(3))
        .collect::<Vec<_>>();
    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(widths.len()) {
            widths[idx] = widths[idx].max(sanitize_cell(cell).chars().count());
        }
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_row(headers, &widths, false));
    let rule = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&rule, &widths, false));
    for row in rows {
        let _ = writeln!(output, "{}", format_row(row, &widths, true));
    }
    output
}

pub fn print_table(headers: &[String], rows: &[Vec<String>]) {
    print!("{}", render_table(headers, rows));
}

/// Renders the first `limit` rows of `frame`, noting how many were left out.
pub fn render_frame(frame: &Frame, limit: usize) -> String {
    let shown = frame.rows.iter().take(limit).cloned().collect::<Vec<_>>();
    let mut output = render_table(&frame.headers, &shown);
    let hidden = frame.row_count().saturating_sub(shown.len());
    if hidden > 0 {
        let _ = writeln!(output, "... {hidden} more row(s)");
    }
    output
}

/// Prints the head of a CSV file.
pub fn preview(path: &Path, rows: usize, delimiter: Option<u8>, encoding: Option<&str>) -> Result<()> {
    let frame = io_utils::read_frame(path, delimiter, encoding)
        .with_context(|| format!("Loading {path:?}"))?;
    print!("{}", render_frame(&frame, rows));
    info!(
        "{:?}: {} row(s) x {} column(s)",
        path,
        frame.row_count(),
        frame.column_count()
    );
    Ok(())
}

fn format_row(values: &[String], widths: &[usize], align_numbers: bool) -> String {
    let cells = values
        .iter()
        .zip(widths)
        .map(|(value, &width)| {
            let cell = sanitize_cell(value);
            if align_numbers && parse_number(&cell).is_some() {
                format!("{cell:>width$}")
            } else {
                format!("{cell:<width$}")
            }
        })
        .collect::<Vec<_>>();
    cells.join("  ").trim_end().to_string()
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}
