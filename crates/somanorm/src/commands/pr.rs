//! Percentile rank for one metric

use anyhow::Result;
use somanorm_loader::{DatasetFetcher, DatasetLoader};
use tracing::warn;

use super::common::{DatasetSource, MetricReport, OutputFormat, load_dataset, parse_metric, print_json};

pub async fn pr<F: DatasetFetcher>(
    loader: &DatasetLoader<F>,
    source: &DatasetSource,
    metric: &str,
    value: f64,
    format: OutputFormat,
) -> Result<()> {
    let metric = parse_metric(metric)?;
    let dataset = load_dataset(loader, source).await?;

    if dataset.metric(metric).is_none() {
        warn!(metric = %metric, "Dataset has no reference data for this metric");
    }

    let report = MetricReport::new(&dataset, metric, value);
    if format == OutputFormat::Json {
        return print_json(&report);
    }

    println!(
        "{} ({})",
        dataset.name.as_deref().or(dataset.id.as_deref()).unwrap_or("dataset"),
        metric
    );
    report.print();
    println!("  method: {}", report.rank.method);
    if let Some(raw) = report.rank.raw_percentile {
        println!("  raw percentile: {:.2}", raw);
    }
    if report.badge.fallback {
        println!("  badge uses the median only");
    }

    Ok(())
}
