//! Error taxonomy for the pipeline stages and the dataset model.
//!
//! Row-level data quality problems never show up here: they are counted and
//! skipped by the stage that finds them.

use std::path::PathBuf;

/// Failures while fetching the raw spreadsheet into the local cache.
#[derive(Debug, thiserror::Error)]
pub enum AcquisitionError {
    #[error("invalid source URL `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("GET {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("GET {url} returned non-success status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("writing `{}`: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The raw file could not be read as a table at all.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("unsupported raw file format `{}`", .path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("opening workbook `{}`: {source}", .path.display())]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("workbook `{}` has no worksheets", .path.display())]
    NoWorksheet { path: PathBuf },

    #[error("raw table `{}` has no header row", .path.display())]
    NoHeader { path: PathBuf },

    #[error("reading CSV `{}`: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// One or more raw columns required by the schema mapping are absent.
#[derive(Debug, thiserror::Error)]
#[error("raw header is missing expected columns: {}", .missing.join(", "))]
pub struct SchemaMismatchError {
    pub missing: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Schema(#[from] SchemaMismatchError),
}

/// Writing a CSV artifact (processed dataset or aggregate table) failed.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("writing `{}`: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serializing CSV to `{}`: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("building HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("acquisition failed: {0}")]
    Acquisition(#[from] AcquisitionError),

    #[error("transforming `{}` failed: {source}", .path.display())]
    Transform {
        path: PathBuf,
        #[source]
        source: TransformError,
    },

    #[error("export failed: {0}")]
    Export(#[from] ExportError),

    #[error("transform task did not complete: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// The processed artifact could not be loaded into the dataset model.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    #[error("unsupported file extension for `{}` (expected .csv)", .path.display())]
    UnsupportedExtension { path: PathBuf },

    #[error("`{}` is missing required columns: {}", .path.display(), .missing.join(", "))]
    MissingColumns { path: PathBuf, missing: Vec<String> },

    #[error("reading `{}`: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// An extremum was requested over zero rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("dataset is empty")]
pub struct EmptyDatasetError;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("reading config file `{}`: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing config file `{}`: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid value `{value}` for {key}")]
    InvalidValue { key: &'static str, value: String },
}
