//! Coordinate merge from the geolocation table.
//!
//! Geolocation country names follow their own conventions (`Congo [Republic]`,
//! `Myanmar [Burma]`), so the lookup side is renamed through the configured
//! dictionary before the left join.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use log::debug;

use crate::{
    append::COUNTRY_COLUMN,
    columns::{find_column, normalize_key},
    error::ReconcileError,
    frame::{Frame, is_missing},
};

pub const LATITUDE_COLUMN: &str = "latitude";
pub const LONGITUDE_COLUMN: &str = "longitude";

#[derive(Debug, Clone, PartialEq)]
pub struct Coordinates {
    pub latitude: String,
    pub longitude: String,
}

/// Harmonised geolocation table keyed by happiness-style country name.
#[derive(Debug, Clone, Default)]
pub struct GeoLookup {
    entries: HashMap<String, Coordinates>,
}

impl GeoLookup {
    pub fn get(&self, country: &str) -> Option<&Coordinates> {
        self.entries.get(country)
    }
}

/// Soft-failure summary of a coordinate merge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeoCoverage {
    pub rows_missing_coordinates: usize,
    pub unmatched_countries: Vec<String>,
}

/// Builds the lookup side of the merge: country names pass through `renames`,
/// and the first row seen for a name wins.
pub fn harmonize_geo(
    geo: &Frame,
    renames: &BTreeMap<String, String>,
) -> Result<GeoLookup, ReconcileError> {
    let country = find_column(geo, "geolocation", COUNTRY_COLUMN)?.index;
    let latitude = find_column(geo, "geolocation", LATITUDE_COLUMN)?.index;
    let longitude = find_column(geo, "geolocation", LONGITUDE_COLUMN)?.index;

    let mut entries = HashMap::with_capacity(geo.row_count());
    for row_idx in 0..geo.row_count() {
        let raw = geo.cell(row_idx, country);
        let name = renames.get(raw).map(String::as_str).unwrap_or(raw);
        if entries.contains_key(name) {
            debug!("Ignoring repeated geolocation entry for '{name}'");
            continue;
        }
        entries.insert(
            name.to_string(),
            Coordinates {
                latitude: geo.cell(row_idx, latitude).to_string(),
                longitude: geo.cell(row_idx, longitude).to_string(),
            },
        );
    }
    Ok(GeoLookup { entries })
}

/// Left-joins `latitude`/`longitude` onto `gold` by country name.
///
/// Every input row is kept; rows without a match (or whose match has blank
/// coordinates) get empty cells and are counted in the returned coverage.
/// Coordinate columns already present on `gold` are replaced.
pub fn merge_coordinates(
    mut gold: Frame,
    geo: &Frame,
    renames: &BTreeMap<String, String>,
) -> Result<(Frame, GeoCoverage), ReconcileError> {
    let lookup = harmonize_geo(geo, renames)?;
    let country = find_column(&gold, "gold", COUNTRY_COLUMN)?.name;

    while let Some(existing) = gold.headers.iter().position(|h| {
        let key = normalize_key(h);
        key == LATITUDE_COLUMN || key == LONGITUDE_COLUMN
    }) {
        gold.drop_column(existing);
    }
    let country_idx = gold
        .column_index(&country)
        .ok_or_else(|| ReconcileError::missing_column("gold", COUNTRY_COLUMN))?;

    let mut coverage = GeoCoverage::default();
    let mut unmatched = BTreeSet::new();
    let mut latitudes = Vec::with_capacity(gold.row_count());
    let mut longitudes = Vec::with_capacity(gold.row_count());
    for row in &gold.rows {
        let name = row.get(country_idx).map(|s| s.as_str()).unwrap_or("");
        match lookup.get(name) {
            Some(coords) if !is_missing(&coords.latitude) && !is_missing(&coords.longitude) => {
                latitudes.push(coords.latitude.clone());
                longitudes.push(coords.longitude.clone());
            }
            _ => {
                coverage.rows_missing_coordinates += 1;
                unmatched.insert(name.to_string());
                latitudes.push(String::new());
                longitudes.push(String::new());
            }
        }
    }

    let mut latitudes = latitudes.into_iter();
    gold.push_column(LATITUDE_COLUMN, |_| latitudes.next().unwrap_or_default());
    let mut longitudes = longitudes.into_iter();
    gold.push_column(LONGITUDE_COLUMN, |_| longitudes.next().unwrap_or_default());

    coverage.unmatched_countries = unmatched.into_iter().collect();
    Ok((gold, coverage))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReconcileConfig;

    fn geolocation() -> Frame {
        Frame::from_rows(
            &["country", "country_name", "latitude", "longitude"],
            &[
                &["CG", "Congo [Republic]", "-0.228021", "15.827659"],
                &["AF", "Afghanistan", "33.93911", "67.709953"],
                &["AF", "Afghanistan", "0", "0"],
            ],
        )
    }

    fn gold() -> Frame {
        Frame::from_rows(
            &["country_name", "year"],
            &[
                &["Congo (Brazzaville)", "2021"],
                &["Afghanistan", "2021"],
                &["Atlantis", "2021"],
            ],
        )
    }

    #[test]
    fn rename_dictionary_recovers_coordinates() {
        let config = ReconcileConfig::default();
        let (merged, coverage) =
            merge_coordinates(gold(), &geolocation(), config.geo_renames()).unwrap();
        assert_eq!(merged.headers, vec!["country_name", "year", "latitude", "longitude"]);
        assert_eq!(merged.rows[0][2], "-0.228021");
        assert_eq!(merged.rows[1][3], "67.709953");
        assert_eq!(coverage.rows_missing_coordinates, 1);
        assert_eq!(coverage.unmatched_countries, vec!["Atlantis"]);
    }

    #[test]
    fn without_renames_the_row_has_no_coordinates() {
        let (merged, coverage) =
            merge_coordinates(gold(), &geolocation(), &BTreeMap::new()).unwrap();
        assert_eq!(merged.rows[0][2], "");
        assert_eq!(coverage.rows_missing_coordinates, 2);
    }

    #[test]
    fn merge_never_drops_rows() {
        let input = gold();
        let (merged, _) = merge_coordinates(input.clone(), &geolocation(), &BTreeMap::new()).unwrap();
        assert_eq!(merged.row_count(), input.row_count());
    }

    #[test]
    fn geolocation_without_coordinates_is_rejected() {
        let geo = Frame::from_rows(&["country_name", "latitude"], &[]);
        let err = merge_coordinates(gold(), &geo, &BTreeMap::new()).unwrap_err();
        assert_eq!(err, ReconcileError::missing_column("geolocation", "longitude"));
    }
}
