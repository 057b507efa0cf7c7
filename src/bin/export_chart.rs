//! Print the chart specification for one chart and set of filters as JSON.
//!
//! ```text
//! export_chart <data_dir> <chart-id> [field=value ...]
//! export_chart data average-naplan-results "schools=Alpha|Beta" domain=Reading
//! export_chart data top-schools year=2021 skill=All
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use naplan_dashboard::{render, ChartId, DatasetStore, FilterState};

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let (Some(data_dir), Some(chart)) = (args.next(), args.next()) else {
        bail!("usage: export_chart <data_dir> <chart-id> [field=value ...]");
    };
    let chart: ChartId = chart.parse()?;

    let mut filters = FilterState::initial(chart);
    for arg in args {
        let (field, value) = arg
            .split_once('=')
            .with_context(|| format!("expected field=value, got '{arg}'"))?;
        filters.set_input(field, value)?;
    }

    let data_dir = PathBuf::from(data_dir);
    let store = DatasetStore::load(&data_dir)
        .with_context(|| format!("loading datasets from {}", data_dir.display()))?;

    let spec = render(&store, &filters);
    log::info!(
        "{chart}: {} series, {} points",
        spec.series_count(),
        spec.point_count()
    );
    println!("{}", spec.to_json()?);
    Ok(())
}
