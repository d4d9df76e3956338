use anyhow::{Context, Result};
use superstore::{Config, DatasetModel, Pipeline};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    // ─── 2) configuration ────────────────────────────────────────────
    let config = Config::from_env().context("loading configuration")?;
    let pipeline = Pipeline::new(config).context("building pipeline")?;
    let config = pipeline.config();
    info!(
        source = %config.source_url,
        data_dir = %config.data_dir.display(),
        force = config.force,
        "configured"
    );

    // ─── 3) produce the processed artifact ───────────────────────────
    let processed = pipeline
        .run_configured()
        .await
        .context("running ETL pipeline")?;
    info!(path = %processed.display(), "processed dataset ready");

    // ─── 4) load it the way a client session would ───────────────────
    let mut model = DatasetModel::new();
    let report = model
        .load_data(&processed)
        .with_context(|| format!("loading {}", processed.display()))?;
    if report.skipped > 0 {
        warn!(skipped = report.skipped, "rows skipped on load");
    }

    match (model.min_order_date(), model.max_order_date()) {
        (Ok(first), Ok(last)) => info!(rows = report.loaded, %first, %last, "dataset summary"),
        _ => warn!("processed dataset has no rows"),
    }
    for total in model.category_data() {
        info!(category = %total.key, sales = total.sales, "category sales");
    }

    info!("all done");
    Ok(())
}
