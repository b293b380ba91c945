//! Model segment range lookup

use anyhow::{Context, Result};
use serde_json::json;
use somanorm_dataset::get_model_range;
use somanorm_loader::{DatasetFetcher, DatasetLoader};

use super::common::{OutputFormat, print_json};

pub async fn range<F: DatasetFetcher>(
    loader: &DatasetLoader<F>,
    file: &str,
    model_type: &str,
    metric: &str,
    value: Option<f64>,
    format: OutputFormat,
) -> Result<()> {
    let model = loader
        .load_model(file)
        .await
        .with_context(|| format!("Model file '{}' could not be loaded", file))?;

    let Some(range) = get_model_range(&model, model_type, metric) else {
        anyhow::bail!("No '{}' range for model type '{}' in {}", metric, model_type, file);
    };
    let inside = value.map(|v| range.contains(v));

    if format == OutputFormat::Json {
        return print_json(&json!({
            "type": model_type,
            "metric": metric,
            "range": range,
            "value": value,
            "inside": inside,
        }));
    }

    let show = |v: Option<f64>| v.map_or_else(|| "—".to_string(), |v| format!("{:.3}", v));
    println!("{} / {}", model_type, metric);
    println!("  range: {} .. {}", show(range.lo), show(range.hi));
    println!("  mean:  {} (sd {})", show(range.avg), show(range.sd));
    if range.q1.is_some() || range.q3.is_some() {
        println!("  IQR:   {} .. {}", show(range.q1), show(range.q3));
    }
    if let (Some(v), Some(inside)) = (value, inside) {
        println!("  {:.3} is {}", v, if inside { "inside" } else { "outside" });
    }

    Ok(())
}
