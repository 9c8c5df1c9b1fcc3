//! Silver → gold reconciliation.
//!
//! [`SilverToGold::run`] takes the cleaned multi-year panel, the single-year
//! snapshot and the geolocation table and returns the gold table:
//!
//! 1. locate the key columns of both happiness tables
//! 2. optionally scope the panel to the snapshot's countries
//! 3. inject the snapshot's regions into the panel
//! 4. resolve column aliases on both tables
//! 5. intersect and align their columns
//! 6. append with snapshot precedence on `(country_name, year)`
//! 7. merge coordinates through the geo rename dictionary
//!
//! The engine holds no state between calls; the same inputs always produce the
//! same table.

use log::{Level, info, log, warn};

use crate::{
    alias::apply_aliases,
    align::intersect_and_align,
    append::{COUNTRY_COLUMN, YEAR_COLUMN, append_with_precedence},
    columns::find_column,
    config::{GoldOptions, ReconcileConfig},
    error::ReconcileError,
    frame::Frame,
    geo::merge_coordinates,
    region::{REGION_COLUMN, inject_regions, restrict_to_countries},
};

/// Counts of the soft degradations met along the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoldReport {
    pub rows_removed_by_scope: usize,
    pub rows_missing_region: usize,
    pub shared_columns: Vec<String>,
    pub rows_missing_coordinates: usize,
    pub unmatched_countries: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct GoldOutput {
    pub table: Frame,
    pub report: GoldReport,
}

#[derive(Debug, Clone, Default)]
pub struct SilverToGold {
    config: ReconcileConfig,
    options: GoldOptions,
}

impl SilverToGold {
    pub fn new(config: ReconcileConfig, options: GoldOptions) -> Self {
        Self { config, options }
    }

    /// Full reconciliation including the coordinate merge.
    pub fn run(
        &self,
        panel: &Frame,
        snapshot: &Frame,
        geo: &Frame,
    ) -> Result<GoldOutput, ReconcileError> {
        let GoldOutput { table, mut report } = self.append_only(panel, snapshot)?;
        let (table, coverage) = merge_coordinates(table, geo, self.config.geo_renames())?;
        if coverage.rows_missing_coordinates > 0 {
            warn!(
                "{} row(s) missing coordinates, unmatched countries ({}): {}",
                coverage.rows_missing_coordinates,
                coverage.unmatched_countries.len(),
                coverage.unmatched_countries.join(", ")
            );
        }
        report.rows_missing_coordinates = coverage.rows_missing_coordinates;
        report.unmatched_countries = coverage.unmatched_countries;
        self.diagnostic(format_args!(
            "Gold table: {} row(s) x {} column(s)",
            table.row_count(),
            table.column_count()
        ));
        Ok(GoldOutput { table, report })
    }

    /// Every step up to and including the precedence append.
    pub fn append_only(
        &self,
        panel: &Frame,
        snapshot: &Frame,
    ) -> Result<GoldOutput, ReconcileError> {
        let panel_country = find_column(panel, "panel", COUNTRY_COLUMN)?;
        find_column(panel, "panel", YEAR_COLUMN)?;
        let snapshot_country = find_column(snapshot, "snapshot", COUNTRY_COLUMN)?;
        find_column(snapshot, "snapshot", YEAR_COLUMN)?;
        let snapshot_region = find_column(snapshot, "snapshot", REGION_COLUMN)?;

        let mut report = GoldReport::default();

        let (scoped, removed) = restrict_to_countries(
            panel.clone(),
            &panel_country,
            snapshot,
            &snapshot_country,
            self.options.restrict_to_snapshot_countries,
        );
        if self.options.restrict_to_snapshot_countries {
            info!("Filtered panel to snapshot countries: {removed} row(s) removed");
        }
        report.rows_removed_by_scope = removed;

        let (with_regions, missing_region) = inject_regions(
            scoped,
            &panel_country,
            snapshot,
            &snapshot_country,
            &snapshot_region,
        );
        if missing_region > 0 {
            warn!("{missing_region} panel row(s) have no region in the snapshot");
        }
        report.rows_missing_region = missing_region;

        let panel_aliased = apply_aliases(with_regions, self.config.aliases());
        let snapshot_aliased = apply_aliases(snapshot.clone(), self.config.aliases());

        let (panel_aligned, snapshot_aligned) =
            intersect_and_align(&panel_aliased, &snapshot_aliased, "panel", "snapshot")?;
        self.diagnostic(format_args!(
            "Using {} shared column(s) for append: {:?}",
            panel_aligned.column_count(),
            panel_aligned.headers
        ));
        report.shared_columns = panel_aligned.headers.clone();

        let table = append_with_precedence(&panel_aligned, &snapshot_aligned)?;
        self.diagnostic(format_args!(
            "Appended table: {} row(s) x {} column(s)",
            table.row_count(),
            table.column_count()
        ));
        Ok(GoldOutput { table, report })
    }

    fn diagnostic(&self, message: std::fmt::Arguments<'_>) {
        let level = if self.options.verbose {
            Level::Info
        } else {
            Level::Debug
        };
        log!(level, "{message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel() -> Frame {
        Frame::from_rows(
            &["Country name", "year", "Life Ladder", "Generosity"],
            &[
                &["Afghanistan", "2018", "3.6", "0.1"],
                &["Wonderland", "2021", "5.0", "0.3"],
                &["Atlantis", "2015", "6.1", "0.2"],
            ],
        )
    }

    fn snapshot() -> Frame {
        Frame::from_rows(
            &["country_name", "regional_indicator", "ladder_score", "generosity", "year"],
            &[
                &["Afghanistan", "South Asia", "2.5", "-0.1", "2021"],
                &["Wonderland", "Fictional", "7.0", "0.5", "2021"],
            ],
        )
    }

    #[test]
    fn append_only_combines_history_and_snapshot() {
        let engine = SilverToGold::default();
        let out = engine.append_only(&panel(), &snapshot()).unwrap();
        assert_eq!(
            out.table.headers,
            vec!["country_name", "generosity", "ladder_score", "regional_indicator", "year"]
        );
        assert_eq!(
            out.table.rows,
            vec![
                vec!["Afghanistan", "0.1", "3.6", "South Asia", "2018"],
                vec!["Afghanistan", "-0.1", "2.5", "South Asia", "2021"],
                vec!["Wonderland", "0.5", "7.0", "Fictional", "2021"],
            ]
        );
        assert_eq!(out.report.rows_removed_by_scope, 1);
        assert_eq!(out.report.rows_missing_region, 0);
    }

    #[test]
    fn keeping_all_countries_leaves_regions_blank() {
        let engine = SilverToGold::new(
            ReconcileConfig::default(),
            GoldOptions {
                restrict_to_snapshot_countries: false,
                verbose: true,
            },
        );
        let out = engine.append_only(&panel(), &snapshot()).unwrap();
        assert_eq!(out.table.row_count(), 4);
        assert_eq!(out.report.rows_missing_region, 1);
        let atlantis = out
            .table
            .rows
            .iter()
            .find(|r| r[0] == "Atlantis")
            .unwrap();
        assert_eq!(atlantis[3], "");
    }

    #[test]
    fn snapshot_without_region_is_fatal() {
        let snapshot = Frame::from_rows(&["country_name", "year"], &[]);
        let err = SilverToGold::default()
            .append_only(&panel(), &snapshot)
            .unwrap_err();
        assert_eq!(err, ReconcileError::missing_column("snapshot", "regional_indicator"));
    }
}
