use csv::ReaderBuilder;
use std::path::Path;
use tracing::{info, warn};

use crate::error::DataLoadError;
use crate::model::dataset::Dataset;
use crate::schema::{canonical_columns, CanonicalRecord};

/// Row counts from loading a processed artifact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    /// Rows that failed typed parsing or had a blank field.
    pub skipped: usize,
}

/// Read a processed CSV with strict per-column typing.
///
/// Rows that do not coerce are skipped and counted; only an unsupported
/// extension, missing columns, or an unreadable file fail the load.
#[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn read_processed_csv<P: AsRef<Path>>(path: P) -> Result<(Dataset, LoadReport), DataLoadError> {
    let path = path.as_ref();
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    if !is_csv {
        return Err(DataLoadError::UnsupportedExtension {
            path: path.to_path_buf(),
        });
    }

    let csv_err = |source| DataLoadError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(csv_err)?;

    let headers = rdr.headers().map_err(csv_err)?.clone();
    let missing: Vec<String> = canonical_columns()
        .filter(|c| !headers.iter().any(|h| h == *c))
        .map(str::to_string)
        .collect();
    if !missing.is_empty() {
        return Err(DataLoadError::MissingColumns {
            path: path.to_path_buf(),
            missing,
        });
    }

    let mut records = Vec::new();
    let mut report = LoadReport::default();
    for result in rdr.deserialize::<CanonicalRecord>() {
        match result {
            Ok(record) if !record.has_blank_field() => records.push(record),
            Ok(_) => report.skipped += 1,
            Err(e) if e.is_io_error() => return Err(csv_err(e)),
            Err(_) => report.skipped += 1,
        }
    }
    report.loaded = records.len();

    if report.skipped > 0 {
        warn!(skipped = report.skipped, "skipped rows that failed typed parsing");
    }
    info!(rows = report.loaded, "loaded processed dataset");

    Ok((Dataset::new(records), report))
}
