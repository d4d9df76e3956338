use calamine::{open_workbook_auto, Data, Reader};
use chrono::NaiveDate;
use csv::{ByteRecord, ReaderBuilder};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::LoadError;
use crate::process::date_parser::{date_from_serial, parse_date_str};

/// A loosely-typed cell as it came out of the source file.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Spreadsheet date/time cell, already resolved against the workbook's
    /// 1900 or 1904 date system.
    Date(NaiveDate),
}

impl RawCell {
    /// Non-blank text. Whole-number floats render without a fraction so that
    /// numeric postal codes come out as `42420`, not `42420.0`.
    pub fn as_text(&self) -> Option<String> {
        match self {
            RawCell::Text(s) if !s.trim().is_empty() => Some(s.clone()),
            RawCell::Int(i) => Some(i.to_string()),
            RawCell::Float(f) if f.is_finite() && f.fract() == 0.0 => {
                Some(format!("{}", *f as i64))
            }
            RawCell::Float(f) if f.is_finite() => Some(f.to_string()),
            RawCell::Bool(b) => Some(b.to_string()),
            RawCell::Date(d) => Some(d.to_string()),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            RawCell::Int(i) => Some(*i),
            RawCell::Float(f) => float_to_int(*f),
            RawCell::Text(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(float_to_int))
            }
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        let value = match self {
            RawCell::Int(i) => Some(*i as f64),
            RawCell::Float(f) => Some(*f),
            RawCell::Text(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        value.filter(|f| f.is_finite())
    }

    /// Tolerant date coercion: unparsable values become `None`.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            RawCell::Date(d) => Some(*d),
            RawCell::Float(serial) => date_from_serial(*serial),
            RawCell::Text(s) => parse_date_str(s),
            _ => None,
        }
    }
}

fn float_to_int(f: f64) -> Option<i64> {
    (f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64).then_some(f as i64)
}

impl From<&Data> for RawCell {
    fn from(cell: &Data) -> Self {
        match cell {
            Data::Empty | Data::Error(_) => RawCell::Empty,
            Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
                RawCell::Text(s.clone())
            }
            Data::Int(i) => RawCell::Int(*i),
            Data::Float(f) => RawCell::Float(*f),
            Data::Bool(b) => RawCell::Bool(*b),
            Data::DateTime(dt) if dt.is_datetime() => dt
                .as_datetime()
                .map_or(RawCell::Empty, |d| RawCell::Date(d.date())),
            Data::DateTime(dt) => RawCell::Float(dt.as_f64()),
        }
    }
}

pub(crate) static EMPTY_CELL: RawCell = RawCell::Empty;

/// Header row plus data rows of the raw source, before renaming.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<RawCell>>,
}

const SPREADSHEET_EXTENSIONS: &[&str] = &["xls", "xlsx", "xlsm", "xlsb", "ods"];

/// Read a raw table, picking the reader from the file extension.
#[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_raw_table<P: AsRef<Path>>(path: P) -> Result<RawTable, LoadError> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let table = if ext == "csv" {
        load_csv(path)?
    } else if SPREADSHEET_EXTENSIONS.contains(&ext.as_str()) {
        load_workbook(path)?
    } else {
        return Err(LoadError::UnsupportedFormat {
            path: path.to_path_buf(),
        });
    };

    info!(
        columns = table.headers.len(),
        rows = table.rows.len(),
        "loaded raw table"
    );
    Ok(table)
}

fn load_workbook(path: &Path) -> Result<RawTable, LoadError> {
    let workbook_err = |source| LoadError::Workbook {
        path: path.to_path_buf(),
        source,
    };

    let mut workbook = open_workbook_auto(path).map_err(workbook_err)?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| LoadError::NoWorksheet {
            path: path.to_path_buf(),
        })?;
    debug!(sheet = %sheet, "reading first worksheet");

    let range = workbook.worksheet_range(&sheet).map_err(workbook_err)?;
    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .ok_or_else(|| LoadError::NoHeader {
            path: path.to_path_buf(),
        })?
        .iter()
        .map(|cell| match cell {
            Data::String(s) => s.trim().to_string(),
            Data::Empty => String::new(),
            other => other.to_string(),
        })
        .collect();

    let rows = rows
        .map(|row| row.iter().map(RawCell::from).collect())
        .collect();
    Ok(RawTable { headers, rows })
}

fn load_csv(path: &Path) -> Result<RawTable, LoadError> {
    let csv_err = |source| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(csv_err)?;

    let headers: Vec<String> = rdr
        .byte_headers()
        .map_err(csv_err)?
        .iter()
        .map(|h| String::from_utf8_lossy(h).trim().to_string())
        .collect();
    if headers.iter().all(String::is_empty) {
        return Err(LoadError::NoHeader {
            path: path.to_path_buf(),
        });
    }

    // Fields that are not valid UTF-8 become nulls; the row is dropped later
    // only if one of them sits in a mapped column.
    let mut undecodable = 0usize;
    let mut rows = Vec::new();
    let mut record = ByteRecord::new();
    while rdr.read_byte_record(&mut record).map_err(csv_err)? {
        rows.push(
            record
                .iter()
                .map(|field| match std::str::from_utf8(field) {
                    Ok(text) if text.trim().is_empty() => RawCell::Empty,
                    Ok(text) => RawCell::Text(text.to_string()),
                    Err(_) => {
                        undecodable += 1;
                        RawCell::Empty
                    }
                })
                .collect(),
        );
    }
    if undecodable > 0 {
        warn!(fields = undecodable, "treated non-UTF-8 fields as empty");
    }
    Ok(RawTable { headers, rows })
}
