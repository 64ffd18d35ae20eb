//! CSV loading and row mapping
//!
//! The first record of the file is the header row; every following record is
//! a data row. Rows are kept as plain field lists so that the header/column
//! correspondence stays positional until [`map_rows`] pairs them up.

use csv::ReaderBuilder;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// One data row: the fields of a CSV record in column order
pub type Row = Vec<String>;

/// Substitution context for one issue: header name to field value
pub type RowMap = HashMap<String, String>;

/// Errors that can occur while loading a CSV file
#[derive(Debug, Error)]
pub enum CsvError {
    #[error("CSV file is empty: {}", path.display())]
    EmptyInput { path: PathBuf },

    #[error("Empty header found at column {column}")]
    MalformedHeader { column: usize },

    #[error("Malformed CSV row at line {line}: {message}")]
    MalformedRow { line: u64, message: String },

    #[error("CSV has no headers")]
    EmptyHeaders,

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Parsed CSV contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
    /// 1-based line number each row starts on, parallel to `rows`
    pub lines: Vec<u64>,
}

impl CsvTable {
    /// Build the row mappings for every row, in file order
    pub fn row_maps(&self) -> Vec<RowMap> {
        map_rows(&self.rows, &self.headers)
    }
}

/// Load a CSV file from disk
pub fn load_csv(path: &Path) -> Result<CsvTable, CsvError> {
    let raw = fs::read(path).map_err(|source| CsvError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    parse_csv(&raw).map_err(|e| match e {
        CsvError::EmptyInput { .. } => CsvError::EmptyInput {
            path: path.to_path_buf(),
        },
        other => other,
    })
}

/// Parse CSV contents already in memory
pub fn parse_csv(raw: &[u8]) -> Result<CsvTable, CsvError> {
    let raw = raw.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(raw);

    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(raw);

    let records = rdr
        .records()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| malformed(raw, &e))?;

    for (i, record) in records.iter().enumerate() {
        let next = records.get(i + 1).and_then(|r| r.position()).map(|p| p.byte());
        check_quotes(raw, record, next)?;
    }

    let mut records = records.into_iter();
    let headers: Vec<String> = match records.next() {
        Some(record) => record.iter().map(str::to_string).collect(),
        None => {
            return Err(CsvError::EmptyInput {
                path: PathBuf::new(),
            })
        }
    };

    for (i, header) in headers.iter().enumerate() {
        if header.trim().is_empty() {
            return Err(CsvError::MalformedHeader { column: i + 1 });
        }
    }

    let (rows, lines): (Vec<Row>, Vec<u64>) = records
        .map(|record| {
            let line = record.position().map(|p| line_at(raw, p.byte())).unwrap_or(0);
            (record.iter().map(str::to_string).collect(), line)
        })
        .unzip();

    tracing::debug!(headers = headers.len(), rows = rows.len(), "loaded CSV");

    Ok(CsvTable {
        headers,
        rows,
        lines,
    })
}

/// Pair every row with the headers
///
/// A row shorter than the headers simply lacks the trailing keys; fields past
/// the last header are ignored.
pub fn map_rows(rows: &[Row], headers: &[String]) -> Vec<RowMap> {
    rows.iter()
        .map(|row| {
            headers
                .iter()
                .zip(row.iter())
                .map(|(h, v)| (h.clone(), v.clone()))
                .collect()
        })
        .collect()
}

/// Result of comparing CSV headers with template variables
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HeaderReport {
    /// Headers no template variable refers to
    pub unused_headers: Vec<String>,
    /// Template variables without a matching header
    pub missing_headers: Vec<String>,
}

impl HeaderReport {
    /// Human-readable warnings, one per non-empty category
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if !self.unused_headers.is_empty() {
            warnings.push(format!(
                "The following CSV headers are not used in the template: {}",
                self.unused_headers.join(", ")
            ));
        }
        if !self.missing_headers.is_empty() {
            warnings.push(format!(
                "The following template variables are missing from CSV headers: {}",
                self.missing_headers.join(", ")
            ));
        }
        warnings
    }

    pub fn is_clean(&self) -> bool {
        self.unused_headers.is_empty() && self.missing_headers.is_empty()
    }
}

/// Cross-check CSV headers against the variables a template uses
pub fn reconcile(headers: &[String], variables: &[String]) -> Result<HeaderReport, CsvError> {
    if headers.is_empty() {
        return Err(CsvError::EmptyHeaders);
    }

    let vars: HashSet<&str> = variables.iter().map(String::as_str).collect();
    let known: HashSet<&str> = headers.iter().map(String::as_str).collect();

    Ok(HeaderReport {
        unused_headers: headers
            .iter()
            .filter(|h| !vars.contains(h.as_str()))
            .cloned()
            .collect(),
        missing_headers: variables
            .iter()
            .filter(|v| !known.contains(v.as_str()))
            .cloned()
            .collect(),
    })
}

fn malformed(raw: &[u8], err: &csv::Error) -> CsvError {
    let line = err.position().map(|p| line_at(raw, p.byte())).unwrap_or(0);
    CsvError::MalformedRow {
        line,
        message: err.to_string(),
    }
}

/// 1-based line holding `byte`. Counting `\n` keeps LF and CRLF files in step.
fn line_at(raw: &[u8], byte: u64) -> u64 {
    let end = (byte as usize).min(raw.len());
    raw[..end].iter().filter(|&&b| b == b'\n').count() as u64 + 1
}

#[derive(Clone, Copy)]
enum Field {
    Start,
    Unquoted,
    Quoted,
    /// A `"` seen inside a quoted field: either an escape or the closing quote
    QuoteInQuoted,
}

/// Reject records whose quoting the csv reader would silently repair.
///
/// The reader accepts an unterminated quoted field (it swallows the rest of
/// the input), a bare `"` inside an unquoted field, and text after a closing
/// quote. The raw bytes between this record's start and the next one are
/// scanned field by field instead.
fn check_quotes(raw: &[u8], record: &csv::StringRecord, end: Option<u64>) -> Result<(), CsvError> {
    let Some(pos) = record.position() else {
        return Ok(());
    };
    let start = pos.byte() as usize;
    let end = end.map(|e| e as usize).unwrap_or(raw.len()).min(raw.len());
    if start >= end {
        return Ok(());
    }

    let fail = |message: &str| CsvError::MalformedRow {
        line: line_at(raw, pos.byte()),
        message: message.to_string(),
    };

    let mut state = Field::Start;
    for &b in &raw[start..end] {
        state = match (state, b) {
            (Field::Start, b'"') => Field::Quoted,
            (Field::Start | Field::Unquoted, b',' | b'\r' | b'\n') => Field::Start,
            (Field::Unquoted, b'"') => return Err(fail("bare \" in non-quoted field")),
            (Field::Start | Field::Unquoted, _) => Field::Unquoted,
            (Field::Quoted, b'"') => Field::QuoteInQuoted,
            (Field::Quoted, _) => Field::Quoted,
            (Field::QuoteInQuoted, b'"') => Field::Quoted,
            (Field::QuoteInQuoted, b',' | b'\r' | b'\n') => Field::Start,
            (Field::QuoteInQuoted, _) => return Err(fail("extraneous \" in quoted field")),
        };
    }

    if matches!(state, Field::Quoted) {
        return Err(fail("unterminated quoted field"));
    }
    Ok(())
}
