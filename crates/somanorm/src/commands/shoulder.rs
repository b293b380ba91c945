//! Conditional shoulder width given height

use anyhow::{Context, Result};
use serde_json::json;
use somanorm_dataset::Reference;
use somanorm_loader::{DatasetFetcher, DatasetLoader};

use super::common::{DatasetSource, OutputFormat, format_percentile, load_dataset, print_json};

pub async fn shoulder<F: DatasetFetcher>(
    loader: &DatasetLoader<F>,
    source: &DatasetSource,
    height: f64,
    shoulder: Option<f64>,
    reference: Reference,
    cohort: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let dataset = load_dataset(loader, source).await?;
    let joint = dataset
        .joint()
        .context("Dataset has no joint shoulder/height parameters")?;

    let cohort = match cohort {
        Some(key) => key.trim(),
        None => reference
            .resolve_cohort(joint)
            .context("Joint table has no cohorts")?,
    };

    let Some(result) = loader
        .registry()
        .compute_conditional_shoulder(height, shoulder, cohort)
    else {
        anyhow::bail!(
            "No conditional estimate for cohort '{}' (available: {})",
            cohort,
            loader.registry().keys().join(", ")
        );
    };

    if format == OutputFormat::Json {
        return print_json(&json!({ "cohort": cohort, "reference": reference, "result": result }));
    }

    println!("Cohort: {} (reference: {})", cohort, reference);
    if result.flags.missing_rho {
        println!("  No height/shoulder correlation in this dataset; estimate unavailable.");
        return Ok(());
    }
    if let (Some(mu), Some(sigma)) = (result.mu_cond, result.sigma_cond) {
        println!("  Expected shoulder at {:.1} cm: {:.1} cm (sd {:.2})", height, mu, sigma);
    }
    if let Some(z) = result.z {
        println!("  z = {:.2}, {}", z, format_percentile(result.pr));
    }
    if result.flags.height_clamped {
        println!("  Height outside the sampled range; clamped to the nearest bound.");
    }

    Ok(())
}
