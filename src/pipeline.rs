//! File-level drivers for the bronze → silver and silver → gold steps.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;

use crate::{
    clean::{self, CleanReport, SNAPSHOT_YEAR},
    cli::{InputArgs, ReconcileArgs},
    config::{GoldOptions, ReconcileConfig},
    engine::{GoldOutput, SilverToGold},
    frame::Frame,
    io_utils::{self, GOLD_FILE, LayerFiles},
    table,
};

fn load(path: &Path, label: &str, input: &InputArgs) -> Result<Frame> {
    let frame = io_utils::read_frame(path, input.delimiter, input.input_encoding.as_deref())
        .with_context(|| format!("Loading {label} table"))?;
    info!(
        "Loaded {label} [{}]: {} row(s) x {} column(s)",
        path.display(),
        frame.row_count(),
        frame.column_count()
    );
    Ok(frame)
}

fn summarize(label: &str, frame: &Frame, report: &CleanReport) {
    info!(
        "Cleaned {label}: {} row(s) x {} column(s); {} row(s) dropped, {} cell(s) imputed, {} region label(s) unified",
        frame.row_count(),
        frame.column_count(),
        report.rows_dropped,
        report.cells_imputed,
        report.regions_relabelled
    );
}

/// Cleans the three bronze tables of `bronze` into `silver`.
pub fn clean_layer(bronze: &Path, silver: &Path, input: &InputArgs) -> Result<LayerFiles> {
    let sources = LayerFiles::bronze(bronze);
    let targets = LayerFiles::silver(silver);

    let panel = load(&sources.panel, "bronze panel", input)?;
    let snapshot = load(&sources.snapshot, "bronze snapshot", input)?;
    let geo = load(&sources.geo, "bronze geolocation", input)?;

    let (panel, report) = clean::clean_happiness(panel, None);
    summarize("panel", &panel, &report);
    let (snapshot, report) = clean::clean_happiness(snapshot, Some(SNAPSHOT_YEAR));
    summarize("snapshot", &snapshot, &report);
    let (geo, report) = clean::clean_geolocation(geo);
    summarize("geolocation", &geo, &report);

    io_utils::write_frame(&targets.panel, &panel)?;
    io_utils::write_frame(&targets.snapshot, &snapshot)?;
    io_utils::write_frame(&targets.geo, &geo)?;
    info!("Saved cleaned tables to {}", silver.display());
    Ok(targets)
}

pub fn load_config(path: Option<&Path>) -> Result<ReconcileConfig> {
    match path {
        Some(path) => ReconcileConfig::load(path)
            .with_context(|| format!("Loading reconciliation config from {path:?}")),
        None => Ok(ReconcileConfig::default()),
    }
}

/// Reconciles the silver tables of `silver` and writes the gold table under
/// `gold`. Returns the written path together with the engine output.
pub fn gold_layer(
    silver: &Path,
    gold: &Path,
    reconcile: &ReconcileArgs,
    input: &InputArgs,
    verbose: bool,
) -> Result<(PathBuf, GoldOutput)> {
    let config = load_config(reconcile.config.as_deref())?;
    let engine = SilverToGold::new(
        config,
        GoldOptions {
            restrict_to_snapshot_countries: !reconcile.keep_all_countries,
            verbose,
        },
    );

    let files = LayerFiles::silver(silver);
    let panel = load(&files.panel, "silver panel", input)?;
    let snapshot = load(&files.snapshot, "silver snapshot", input)?;
    let geo = load(&files.geo, "silver geolocation", input)?;

    let output = engine
        .run(&panel, &snapshot, &geo)
        .context("Reconciling silver tables")?;

    let path = gold.join(GOLD_FILE);
    io_utils::write_frame(&path, &output.table)
        .with_context(|| format!("Saving gold table to {path:?}"))?;

    let report = &output.report;
    info!(
        "Gold table written to {}: {} row(s) x {} column(s)",
        path.display(),
        output.table.row_count(),
        output.table.column_count()
    );
    info!(
        "{} row(s) removed by country scope, {} row(s) without region, {} row(s) missing coordinates",
        report.rows_removed_by_scope, report.rows_missing_region, report.rows_missing_coordinates
    );
    if reconcile.preview > 0 {
        print!("{}", table::render_frame(&output.table, reconcile.preview));
    }
    Ok((path, output))
}
