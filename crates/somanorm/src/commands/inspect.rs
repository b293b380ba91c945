//! Print a dataset in canonical form

use anyhow::Result;
use serde_json::{Map, Value, json};
use somanorm_loader::{DatasetFetcher, DatasetLoader};

use super::common::{DatasetSource, OutputFormat, load_dataset, print_json};

pub async fn inspect<F: DatasetFetcher>(
    loader: &DatasetLoader<F>,
    source: &DatasetSource,
    format: OutputFormat,
) -> Result<()> {
    let dataset = load_dataset(loader, source).await?;

    let summaries: Map<String, Value> = dataset
        .metrics
        .iter()
        .filter_map(|(key, metric)| {
            let summary = metric.summary()?;
            serde_json::to_value(summary).ok().map(|v| (key.key().to_string(), v))
        })
        .collect();

    if format == OutputFormat::Json {
        return print_json(&json!({ "dataset": &*dataset, "summaries": summaries }));
    }

    print_json(&*dataset)?;

    if !summaries.is_empty() {
        println!();
        println!("Raw sample summaries:");
        for (key, metric) in dataset.metrics.iter() {
            let Some(s) = metric.summary() else {
                continue;
            };
            println!(
                "  {}: n={} mean={:.3} sd={:.3} min={:.3} p50={:.3} max={:.3} iqr={:.3}",
                key,
                s.count,
                s.mean,
                s.std_dev,
                s.min,
                s.p50,
                s.max,
                s.iqr()
            );
        }
    }

    let cohorts = loader.registry().keys();
    if !cohorts.is_empty() {
        println!();
        println!("Registered cohorts: {}", cohorts.join(", "));
    }

    Ok(())
}
