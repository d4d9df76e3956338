use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use std::{env, fs, path::PathBuf};
use superstore::model::{write_group_totals, DatasetModel};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Load a processed CSV, optionally narrow it to a date range with every
/// region/state/city selected, and write the aggregate tables to a directory.
fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(filter).init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 3 && args.len() != 5 {
        bail!(
            "Usage: {} <PROCESSED_CSV> <OUT_DIR> [START_DATE END_DATE]",
            args[0]
        );
    }
    let processed = PathBuf::from(&args[1]);
    let out_dir = PathBuf::from(&args[2]);

    let mut model = DatasetModel::new();
    let report = model
        .load_data(&processed)
        .with_context(|| format!("loading {}", processed.display()))?;
    info!(rows = report.loaded, skipped = report.skipped, "loaded");

    if args.len() == 5 {
        let start = parse_date(&args[3])?;
        let end = parse_date(&args[4])?;

        // Select-all defaults, cascading region → state → city.
        let regions = model.unique_regions();
        let states = model.filter_states_based_on_regions(&regions);
        let cities = model.filter_cities_based_on_states(&states);
        model.filter_data(start, end, &regions, &states, &cities);
        info!(rows = model.dataset().len(), %start, %end, "filtered");
    }

    fs::create_dir_all(&out_dir).with_context(|| format!("creating {}", out_dir.display()))?;
    write_group_totals(out_dir.join("Category.csv"), "category", &model.category_data())?;
    write_group_totals(out_dir.join("Region.csv"), "region", &model.region_data())?;
    write_group_totals(out_dir.join("TimeSeries.csv"), "month_year", &model.time_series_data())?;

    info!(out_dir = %out_dir.display(), "wrote aggregate tables");
    Ok(())
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date `{}`", s))
}
