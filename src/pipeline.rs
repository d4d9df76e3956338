use reqwest::Client;
use std::{path::PathBuf, time::Instant};
use tracing::info;

use crate::config::Config;
use crate::error::PipelineError;
use crate::{fetch, process};

/// Produces the processed artifact, either from cache or from scratch.
pub struct Pipeline {
    config: Config,
    client: Client,
}

impl Pipeline {
    /// Build a pipeline with an HTTP client bounded by the configured timeout.
    pub fn new(config: Config) -> Result<Self, PipelineError> {
        let client = Client::builder()
            .timeout(config.fetch_timeout())
            .build()
            .map_err(PipelineError::Client)?;
        Ok(Self::with_client(config, client))
    }

    pub fn with_client(config: Config, client: Client) -> Self {
        Self { config, client }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Return the processed artifact path, regenerating it when it is missing
    /// or `force` is set. A forced run also re-downloads the raw file.
    ///
    /// On `Ok` the artifact at the returned path is complete.
    #[tracing::instrument(level = "info", skip(self))]
    pub async fn run(&self, force: bool) -> Result<PathBuf, PipelineError> {
        let processed = self.config.processed_path();
        if !force && processed.is_file() {
            info!(
                path = %processed.display(),
                "using the processed file from the cache"
            );
            return Ok(processed);
        }

        info!("starting ETL process");
        let start = Instant::now();

        let raw = fetch::acquire(
            &self.client,
            &self.config.source_url,
            self.config.raw_path(),
            force,
        )
        .await?;

        let output = tokio::task::spawn_blocking({
            let raw = raw.clone();
            move || process::transform(raw)
        })
        .await?
        .map_err(|source| PipelineError::Transform {
            path: raw.clone(),
            source,
        })?;

        let dest = processed.clone();
        let records = output.records;
        tokio::task::spawn_blocking(move || process::export_csv(&records, &dest)).await??;

        info!(
            path = %processed.display(),
            kept = output.report.kept,
            dropped = output.report.dropped(),
            elapsed = ?start.elapsed(),
            "ETL process finished"
        );
        Ok(processed)
    }

    /// Run with the `force` flag from the configuration.
    pub async fn run_configured(&self) -> Result<PathBuf, PipelineError> {
        self.run(self.config.force).await
    }
}
