use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Build the World Happiness gold table from bronze and silver CSVs",
    long_about = None
)]
pub struct Cli {
    /// Log shapes, shared columns and other diagnostics
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Clean the bronze downloads into the silver layer
    Clean(CleanArgs),
    /// Reconcile the silver tables into the gold table
    Gold(GoldArgs),
    /// Run clean then gold
    Pipeline(PipelineArgs),
    /// Preview the first rows of a CSV file
    Preview(PreviewArgs),
    /// Summarise a CSV file: column types, numeric statistics, frequent values and gaps
    Explore(ExploreArgs),
    /// List a CSV file's columns with their normalised keys and aliases
    Columns(ColumnsArgs),
    /// Write the built-in alias and country rename tables to a YAML file
    Config(ConfigArgs),
}

#[derive(Debug, Clone, Args)]
pub struct InputArgs {
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input files (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct CleanArgs {
    /// Folder holding the raw downloads
    #[arg(long, default_value = "data/bronze")]
    pub bronze: PathBuf,
    /// Destination folder for the cleaned tables
    #[arg(long, default_value = "data/silver")]
    pub silver: PathBuf,
    #[command(flatten)]
    pub input: InputArgs,
}

#[derive(Debug, Args)]
pub struct ReconcileArgs {
    /// YAML file overriding the alias and country rename tables
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Keep panel history for countries missing from the 2021 snapshot
    #[arg(long = "keep-all-countries")]
    pub keep_all_countries: bool,
    /// Rows of the gold table to print once written (0 disables the preview)
    #[arg(long, default_value_t = 0)]
    pub preview: usize,
}

#[derive(Debug, Args)]
pub struct GoldArgs {
    /// Folder holding the cleaned tables
    #[arg(long, default_value = "data/silver")]
    pub silver: PathBuf,
    /// Destination folder for the gold table
    #[arg(long, default_value = "data/gold")]
    pub gold: PathBuf,
    #[command(flatten)]
    pub reconcile: ReconcileArgs,
    #[command(flatten)]
    pub input: InputArgs,
}

#[derive(Debug, Args)]
pub struct PipelineArgs {
    /// Folder holding the raw downloads
    #[arg(long, default_value = "data/bronze")]
    pub bronze: PathBuf,
    /// Folder receiving the cleaned tables
    #[arg(long, default_value = "data/silver")]
    pub silver: PathBuf,
    /// Destination folder for the gold table
    #[arg(long, default_value = "data/gold")]
    pub gold: PathBuf,
    #[command(flatten)]
    pub reconcile: ReconcileArgs,
    #[command(flatten)]
    pub input: InputArgs,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    /// CSV file to preview
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Number of rows to display
    #[arg(long, default_value_t = 10)]
    pub rows: usize,
    #[command(flatten)]
    pub format: InputArgs,
}

#[derive(Debug, Args)]
pub struct ExploreArgs {
    /// CSV file to summarise
    #[arg(
        short = 'i',
        long = "input",
        default_value = "data/gold/world_happiness_gold.csv"
    )]
    pub input: PathBuf,
    /// Numeric columns to leave out of the summary (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub exclude: Vec<String>,
    /// Most frequent values to list per text column (0 lists all)
    #[arg(long, default_value_t = 10)]
    pub top: usize,
    #[command(flatten)]
    pub format: InputArgs,
}

#[derive(Debug, Args)]
pub struct ColumnsArgs {
    /// CSV file to inspect
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// YAML file overriding the alias table
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    #[command(flatten)]
    pub format: InputArgs,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Destination YAML file
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
