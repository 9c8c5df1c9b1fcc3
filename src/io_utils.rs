//! CSV boundary of the pipeline.
//!
//! Every table enters and leaves through this module:
//!
//! - **Delimiter resolution**: `.tsv` → tab, anything else → comma, unless
//!   overridden.
//! - **Encoding**: inputs are decoded via `encoding_rs`, defaulting to UTF-8.
//! - **Friendly errors**: missing and empty files are reported by file name and
//!   folder; malformed records by row number.
//! - **Saving**: parent folders are created on write; output uses
//!   `QuoteStyle::Always`.
//!
//! The bronze/silver/gold file names used by the CLI live here too.

use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Read, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow, bail};
use csv::QuoteStyle;
use encoding_rs::{Encoding, UTF_8};

use crate::frame::Frame;

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

pub const BRONZE_PANEL_FILE: &str = "world-happiness-report.csv";
pub const BRONZE_SNAPSHOT_FILE: &str = "world-happiness-report-2021.csv";
pub const BRONZE_GEO_FILE: &str = "geolocation.csv";
pub const SILVER_PANEL_FILE: &str = "world_happiness_multi_silver.csv";
pub const SILVER_SNAPSHOT_FILE: &str = "world_happiness_2021_silver.csv";
pub const SILVER_GEO_FILE: &str = "geolocation_silver.csv";
pub const GOLD_FILE: &str = "world_happiness_gold.csv";

/// Paths of the three tables of one layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerFiles {
    pub panel: PathBuf,
    pub snapshot: PathBuf,
    pub geo: PathBuf,
}

impl LayerFiles {
    pub fn bronze(folder: &Path) -> Self {
        Self {
            panel: folder.join(BRONZE_PANEL_FILE),
            snapshot: folder.join(BRONZE_SNAPSHOT_FILE),
            geo: folder.join(BRONZE_GEO_FILE),
        }
    }

    pub fn silver(folder: &Path) -> Self {
        Self {
            panel: folder.join(SILVER_PANEL_FILE),
            snapshot: folder.join(SILVER_SNAPSHOT_FILE),
            geo: folder.join(SILVER_GEO_FILE),
        }
    }
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    })
}

pub fn open_csv_reader<R>(reader: R, delimiter: u8) -> csv::Reader<R>
where
    R: Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(true)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(false);
    builder.from_reader(reader)
}

pub fn decode_record(record: &csv::ByteRecord, encoding: &'static Encoding) -> Result<Vec<String>> {
    record
        .iter()
        .map(|field| {
            let (text, _, had_errors) = encoding.decode(field);
            if had_errors {
                Err(anyhow!(
                    "Failed to decode text with encoding {}",
                    encoding.name()
                ))
            } else {
                Ok(text.into_owned())
            }
        })
        .collect()
}

fn describe(path: &Path) -> (String, String) {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let folder = fs::canonicalize(parent)
        .unwrap_or_else(|_| parent.to_path_buf())
        .display()
        .to_string();
    (name, folder)
}

/// Reads a whole CSV file into a [`Frame`].
pub fn read_frame(path: &Path, delimiter: Option<u8>, encoding: Option<&str>) -> Result<Frame> {
    let encoding = resolve_encoding(encoding)?;
    let delimiter = resolve_input_delimiter(path, delimiter);
    let (name, folder) = describe(path);
    if !path.is_file() {
        bail!("Could not find '{name}' in {folder}");
    }
    let file = File::open(path).with_context(|| format!("Opening input file {path:?}"))?;
    if file.metadata().map(|m| m.len() == 0).unwrap_or(false) {
        bail!("Data file '{name}' in {folder} is empty");
    }

    let mut reader = open_csv_reader(BufReader::new(file), delimiter);
    let header_record = reader
        .byte_headers()
        .with_context(|| format!("Data file '{name}' in {folder} appears malformed"))?
        .clone();
    let headers = decode_record(&header_record, encoding)?;
    if headers.iter().all(|h| h.trim().is_empty()) {
        bail!("Data file '{name}' in {folder} is empty");
    }

    let mut rows = Vec::new();
    for (row_idx, record) in reader.byte_records().enumerate() {
        let record = record.with_context(|| {
            format!(
                "Data file '{name}' in {folder} appears malformed at row {}",
                row_idx + 2
            )
        })?;
        rows.push(decode_record(&record, encoding)?);
    }
    Ok(Frame::new(headers, rows))
}

/// Writes `frame` to `path`, creating missing parent folders.
pub fn write_frame(path: &Path, frame: &Frame) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).with_context(|| format!("Creating folder {parent:?}"))?;
    }
    let file = File::create(path).with_context(|| format!("Creating output file {path:?}"))?;
    let mut writer = open_csv_writer(BufWriter::new(file));
    writer
        .write_record(&frame.headers)
        .context("Writing output headers")?;
    for (idx, row) in frame.rows.iter().enumerate() {
        writer
            .write_record(row)
            .with_context(|| format!("Writing row {} to {path:?}", idx + 2))?;
    }
    writer.flush().context("Flushing output writer")?;
    Ok(())
}

pub fn open_csv_writer<W: Write>(writer: W) -> csv::Writer<W> {
    let mut builder = csv::WriterBuilder::new();
    builder
        .delimiter(DEFAULT_CSV_DELIMITER)
        .quote_style(QuoteStyle::Always)
        .double_quote(true);
    builder.from_writer(writer)
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn reads_headers_and_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.csv");
        fs::write(&path, "Country name,year\nAfghanistan,2018\n\"Congo (Brazzaville)\",2021\n")
            .unwrap();
        let frame = read_frame(&path, None, None).unwrap();
        assert_eq!(frame.headers, vec!["Country name", "year"]);
        assert_eq!(frame.rows[1], vec!["Congo (Brazzaville)", "2021"]);
    }

    #[test]
    fn missing_file_names_the_file() {
        let dir = tempdir().unwrap();
        let err = read_frame(&dir.path().join("absent.csv"), None, None).unwrap_err();
        assert!(err.to_string().contains("Could not find 'absent.csv'"));
    }

    #[test]
    fn empty_file_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        fs::write(&path, "").unwrap();
        let err = read_frame(&path, None, None).unwrap_err();
        assert!(err.to_string().contains("is empty"));
    }

    #[test]
    fn ragged_rows_are_malformed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, "a,b\n1,2\n3\n").unwrap();
        let err = read_frame(&path, None, None).unwrap_err();
        assert!(err.to_string().contains("malformed at row 3"));
    }

    #[test]
    fn write_creates_parent_folders() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data").join("gold").join(GOLD_FILE);
        let frame = Frame::from_rows(&["a"], &[&["1"]]);
        write_frame(&path, &frame).unwrap();
        assert_eq!(read_frame(&path, None, None).unwrap(), frame);
    }

    #[test]
    fn tab_delimiter_for_tsv() {
        assert_eq!(resolve_input_delimiter(Path::new("x.tsv"), None), b'\t');
        assert_eq!(resolve_input_delimiter(Path::new("x.csv"), None), b',');
        assert_eq!(resolve_input_delimiter(Path::new("x.tsv"), Some(b';')), b';');
    }
}
