// src/process/mod.rs
pub mod clean;
pub mod date_parser;
pub mod export;
pub mod raw_table;

use std::path::Path;
use tracing::info;

use crate::error::TransformError;
use crate::schema::{canonical_name, resolve_headers, CanonicalRecord, SCHEMA_MAPPING};

pub use clean::CleanReport;
pub use export::export_csv;
pub use raw_table::{load_raw_table, RawCell, RawTable};

/// Canonical rows ready for export, plus what was dropped on the way.
#[derive(Debug, Clone)]
pub struct TransformOutput {
    pub records: Vec<CanonicalRecord>,
    pub report: CleanReport,
}

/// Load the raw file, rename through the schema mapping, and clean.
///
/// Unreadable input and missing columns fail the whole run; bad rows are only
/// counted.
#[tracing::instrument(level = "info", skip(raw_path), fields(path = %raw_path.as_ref().display()))]
pub fn transform<P: AsRef<Path>>(raw_path: P) -> Result<TransformOutput, TransformError> {
    let table = load_raw_table(raw_path)?;

    let schema = resolve_headers(&table.headers)?;
    info!(
        mapping = ?SCHEMA_MAPPING,
        "renaming columns according to the schema mapping"
    );
    let ignored: Vec<&str> = table
        .headers
        .iter()
        .map(String::as_str)
        .filter(|h| canonical_name(h).is_none())
        .collect();
    if !ignored.is_empty() {
        info!(?ignored, "raw columns outside the mapping are dropped");
    }

    let (records, report) = clean::clean(&table, &schema);
    Ok(TransformOutput { records, report })
}
