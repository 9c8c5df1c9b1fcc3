//! Panel scoping and region injection from the snapshot.
//!
//! The multi-year panel has no region column. The snapshot lists every
//! country with its region, so the panel borrows regions from it by country
//! name.

use std::collections::{HashMap, HashSet};

use log::warn;

use crate::{
    columns::{ColumnHandle, normalize_key},
    frame::{Frame, is_missing},
};

pub const REGION_COLUMN: &str = "regional_indicator";

/// Keeps only panel rows whose country appears in the snapshot. Returns the
/// (possibly untouched) panel and the number of rows removed.
pub fn restrict_to_countries(
    mut panel: Frame,
    panel_country: &ColumnHandle,
    snapshot: &Frame,
    snapshot_country: &ColumnHandle,
    enabled: bool,
) -> (Frame, usize) {
    if !enabled {
        return (panel, 0);
    }
    let valid: HashSet<&str> = snapshot.distinct_values(snapshot_country.index);
    let before = panel.row_count();
    let idx = panel_country.index;
    panel.retain_rows(|row| valid.contains(row.get(idx).map(|s| s.as_str()).unwrap_or("")));
    let removed = before - panel.row_count();
    (panel, removed)
}

/// Country → region lookup from the snapshot. A country listed with several
/// regions keeps the first non-empty one.
pub fn country_regions<'a>(
    snapshot: &'a Frame,
    country: &ColumnHandle,
    region: &ColumnHandle,
) -> HashMap<&'a str, &'a str> {
    let mut lookup: HashMap<&str, &str> = HashMap::new();
    for row in &snapshot.rows {
        let name = row.get(country.index).map(|s| s.as_str()).unwrap_or("");
        let label = row.get(region.index).map(|s| s.as_str()).unwrap_or("");
        if is_missing(label) {
            continue;
        }
        match lookup.get(name) {
            Some(existing) if *existing != label => {
                warn!("Country '{name}' listed under regions '{existing}' and '{label}'; keeping '{existing}'");
            }
            Some(_) => {}
            None => {
                lookup.insert(name, label);
            }
        }
    }
    lookup
}

/// Left-joins the snapshot's region onto `panel` as [`REGION_COLUMN`].
///
/// Any region column the panel already carries is replaced. Returns the panel
/// and the number of rows that found no region.
pub fn inject_regions(
    mut panel: Frame,
    panel_country: &ColumnHandle,
    snapshot: &Frame,
    snapshot_country: &ColumnHandle,
    snapshot_region: &ColumnHandle,
) -> (Frame, usize) {
    let lookup = country_regions(snapshot, snapshot_country, snapshot_region);

    let mut country_idx = panel_country.index;
    while let Some(existing) = panel
        .headers
        .iter()
        .position(|h| normalize_key(h) == REGION_COLUMN)
    {
        panel.drop_column(existing);
        if existing < country_idx {
            country_idx -= 1;
        }
    }

    let mut missing = 0usize;
    panel.push_column(REGION_COLUMN, |row| {
        let country = row.get(country_idx).map(|s| s.as_str()).unwrap_or("");
        match lookup.get(country) {
            Some(region) => region.to_string(),
            None => {
                missing += 1;
                String::new()
            }
        }
    });
    (panel, missing)
}
