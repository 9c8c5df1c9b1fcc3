//! Spelling-insensitive column matching.
//!
//! Column names across happiness vintages drift (`Country name`,
//! `country_name`, `Country  Name `). Every comparison between tables goes
//! through [`normalize_key`], and every lookup of a semantic column goes
//! through [`find_column`].

use std::{borrow::Cow, collections::HashMap, path::Path, sync::LazyLock};

use anyhow::{Context, Result};
use log::info;
use regex::Regex;

use crate::{
    config::ReconcileConfig, error::ReconcileError, frame::Frame, io_utils, table,
};

static NON_WORD_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w]+").expect("valid non-word pattern"));
static UNDERSCORE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_{2,}").expect("valid underscore pattern"));

/// Lowercases and trims `raw`, folds every run of non-word characters into a
/// single underscore and strips underscores from both ends.
pub fn normalize_key(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let replaced = NON_WORD_RUN.replace_all(&lowered, "_");
    let collapsed: Cow<'_, str> = UNDERSCORE_RUN.replace_all(&replaced, "_");
    collapsed.trim_matches('_').to_string()
}

/// Normalised key → first raw column name that produced it.
#[derive(Debug, Clone, Default)]
pub struct NameMap {
    entries: Vec<(String, String)>,
    by_key: HashMap<String, usize>,
}

impl NameMap {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.by_key
            .get(key)
            .map(|idx| self.entries[*idx].1.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.by_key.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Entries in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, raw)| (key.as_str(), raw.as_str()))
    }
}

/// Builds the key map for `names`. Later names colliding with an earlier key are
/// dropped.
pub fn normalized_map<I, S>(names: I) -> NameMap
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut map = NameMap::default();
    for name in names {
        let raw = name.as_ref();
        let key = normalize_key(raw);
        if map.by_key.contains_key(&key) {
            continue;
        }
        map.by_key.insert(key.clone(), map.entries.len());
        map.entries.push((key, raw.to_string()));
    }
    map
}

/// Position and raw name of a column located by semantic role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnHandle {
    pub index: usize,
    pub name: String,
}

/// Finds the column of `frame` whose normalised name equals `target`.
///
/// `table` only labels the error.
pub fn find_column(
    frame: &Frame,
    table: &str,
    target: &str,
) -> Result<ColumnHandle, ReconcileError> {
    let map = normalized_map(&frame.headers);
    let name = map
        .get(target)
        .ok_or_else(|| ReconcileError::missing_column(table, target))?;
    let index = frame
        .column_index(name)
        .ok_or_else(|| ReconcileError::missing_column(table, target))?;
    Ok(ColumnHandle {
        index,
        name: name.to_string(),
    })
}

/// Lists the columns of a CSV file with their normalised keys and alias targets.
pub fn execute(
    input: &Path,
    delimiter: Option<u8>,
    encoding: Option<&str>,
    config: &ReconcileConfig,
) -> Result<()> {
    let frame = io_utils::read_frame(input, delimiter, encoding)
        .with_context(|| format!("Loading {input:?}"))?;
    if frame.headers.is_empty() {
        info!("{:?} does not define any columns", input);
        return Ok(());
    }

    let map = normalized_map(&frame.headers);
    let mut rows = Vec::with_capacity(frame.headers.len());
    for (idx, name) in frame.headers.iter().enumerate() {
        let key = normalize_key(name);
        let alias = config
            .aliases()
            .get(&key)
            .filter(|target| *target != name)
            .cloned()
            .unwrap_or_default();
        let shadowed = if map.get(&key) == Some(name.as_str()) {
            String::new()
        } else {
            "duplicate".to_string()
        };
        rows.push(vec![(idx + 1).to_string(), name.clone(), key, alias, shadowed]);
    }

    let headers = vec![
        "#".to_string(),
        "name".to_string(),
        "key".to_string(),
        "alias".to_string(),
        "note".to_string(),
    ];
    table::print_table(&headers, &rows);
    info!("Listed {} column(s) from {:?}", frame.headers.len(), input);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_key_folds_spelling_variants() {
        assert_eq!(normalize_key("Country name"), "country_name");
        assert_eq!(normalize_key("  Country  Name "), "country_name");
        assert_eq!(normalize_key("Log GDP per capita"), "log_gdp_per_capita");
        assert_eq!(
            normalize_key("Healthy life expectancy at birth"),
            "healthy_life_expectancy_at_birth"
        );
        assert_eq!(normalize_key("__Ladder--score__"), "ladder_score");
        assert_eq!(normalize_key("Standard error of ladder score"), "standard_error_of_ladder_score");
    }

    #[test]
    fn normalize_key_is_total() {
        assert_eq!(normalize_key(""), "");
        assert_eq!(normalize_key(" -- %% "), "");
        assert_eq!(normalize_key("a___b"), "a_b");
    }

    #[test]
    fn normalized_map_keeps_first_spelling() {
        let map = normalized_map(["Country name", "country_name", "Year"]);
        assert_eq!(map.get("country_name"), Some("Country name"));
        assert_eq!(map.get("year"), Some("Year"));
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["country_name", "year"]);
    }

    #[test]
    fn find_column_returns_handle() {
        let frame = Frame::from_rows(&["Country name", "Year"], &[]);
        let handle = find_column(&frame, "panel", "year").unwrap();
        assert_eq!(handle, ColumnHandle { index: 1, name: "Year".into() });
    }

    #[test]
    fn find_column_reports_missing_role() {
        let frame = Frame::from_rows(&["nation", "year"], &[]);
        let err = find_column(&frame, "panel", "country_name").unwrap_err();
        match err {
            ReconcileError::MissingColumn { target, .. } => assert_eq!(target, "country_name"),
            other => panic!("unexpected error {other:?}"),
        }
    }
}
