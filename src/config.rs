//! Static reconciliation tables and run options.
//!
//! [`ReconcileConfig`] is built once (from the built-in tables or a YAML file)
//! and then only read. Alias keys are normalised on construction so lookups can
//! use [`normalize_key`] output directly.

use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::columns::normalize_key;

/// Older panel spellings mapped onto the snapshot's canonical column names.
const DEFAULT_ALIASES: &[(&str, &str)] = &[
    ("life_ladder", "ladder_score"),
    ("log_gdp_per_capita", "logged_gdp_per_capita"),
    ("healthy_life_expectancy_at_birth", "healthy_life_expectancy"),
];

/// Geolocation spellings mapped onto the happiness tables' country names.
const DEFAULT_GEO_RENAMES: &[(&str, &str)] = &[
    ("Congo [Republic]", "Congo (Brazzaville)"),
    ("Congo [DRC]", "Congo (Kinshasa)"),
    ("Myanmar [Burma]", "Myanmar"),
    ("Macedonia [FYROM]", "North Macedonia"),
    ("Côte d'Ivoire", "Ivory Coast"),
    ("Hong Kong", "Hong Kong S.A.R. of China"),
    ("Taiwan", "Taiwan Province of China"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileConfig {
    aliases: BTreeMap<String, String>,
    geo_renames: BTreeMap<String, String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct ConfigFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    aliases: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    geo_renames: Option<BTreeMap<String, String>>,
}

impl ReconcileConfig {
    pub fn new<A, G>(aliases: A, geo_renames: G) -> Self
    where
        A: IntoIterator<Item = (String, String)>,
        G: IntoIterator<Item = (String, String)>,
    {
        Self {
            aliases: aliases
                .into_iter()
                .map(|(source, target)| (normalize_key(&source), target))
                .collect(),
            geo_renames: geo_renames.into_iter().collect(),
        }
    }

    /// Loads a YAML config. Sections left out of the file keep the built-in tables.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening config file {path:?}"))?;
        let parsed: ConfigFile = serde_yaml::from_reader(BufReader::new(file))
            .with_context(|| format!("Parsing config YAML {path:?}"))?;
        let defaults = Self::default();
        Ok(Self::new(
            parsed.aliases.unwrap_or(defaults.aliases),
            parsed.geo_renames.unwrap_or(defaults.geo_renames),
        ))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = ConfigFile {
            aliases: Some(self.aliases.clone()),
            geo_renames: Some(self.geo_renames.clone()),
        };
        let writer = BufWriter::new(
            File::create(path).with_context(|| format!("Creating config file {path:?}"))?,
        );
        serde_yaml::to_writer(writer, &file).context("Writing config YAML")
    }

    pub fn aliases(&self) -> &BTreeMap<String, String> {
        &self.aliases
    }

    pub fn geo_renames(&self) -> &BTreeMap<String, String> {
        &self.geo_renames
    }
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self::new(
            DEFAULT_ALIASES
                .iter()
                .map(|(s, t)| (s.to_string(), t.to_string())),
            DEFAULT_GEO_RENAMES
                .iter()
                .map(|(s, t)| (s.to_string(), t.to_string())),
        )
    }
}

/// Knobs of a silver → gold run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoldOptions {
    /// Drop panel rows for countries the snapshot does not list.
    pub restrict_to_snapshot_countries: bool,
    /// Emit shapes and column lists at info level instead of debug.
    pub verbose: bool,
}

impl Default for GoldOptions {
    fn default() -> Self {
        Self {
            restrict_to_snapshot_countries: true,
            verbose: false,
        }
    }
}
