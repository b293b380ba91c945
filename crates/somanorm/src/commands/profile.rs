//! Full measurement profile

use anyhow::Result;
use serde::Serialize;
use somanorm_dataset::{
    BmiBand, BodyFatBand, BodyMeasurements, CanonicalDataset, ConditionalShoulder, MetricKey,
    Reference,
};
use somanorm_loader::{DatasetFetcher, DatasetLoader};

use super::common::{DatasetSource, MetricReport, OutputFormat, format_percentile, load_dataset, print_json};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Profile {
    reference: Reference,
    metrics: Vec<MetricReport>,
    bmi_band: Option<BmiBand>,
    body_fat_band: Option<BodyFatBand>,
    whr_cut: Option<f64>,
    shoulder_median_deviation_pct: Option<f64>,
    conditional_shoulder: Option<ConditionalShoulder>,
}

/// Ratios for `reference`; waist/hip is ranked against the matching
/// sex-specific table only.
fn relevant_ratios(measurements: &BodyMeasurements, reference: Reference) -> Vec<(MetricKey, f64)> {
    let whr = reference.whr_metric();
    measurements
        .ratios()
        .into_iter()
        .filter(|(key, _)| match key {
            MetricKey::WaistToHip | MetricKey::WaistToHipFemale | MetricKey::WaistToHipMale => *key == whr,
            _ => true,
        })
        .collect()
}

fn build_profile<F: DatasetFetcher>(
    loader: &DatasetLoader<F>,
    dataset: &CanonicalDataset,
    reference: Reference,
    measurements: &BodyMeasurements,
) -> Profile {
    let metrics = relevant_ratios(measurements, reference)
        .into_iter()
        .map(|(key, value)| MetricReport::new(dataset, key, value))
        .collect();

    let bmi_band = measurements
        .ratio(MetricKey::Bmi)
        .and_then(|bmi| reference.bmi_guideline().classify(bmi));
    let body_fat_band = measurements
        .body_fat_pct
        .and_then(|pct| reference.body_fat_guideline().classify(pct));

    let shoulder_median_deviation_pct = measurements.shoulder_cm.and_then(|cm| {
        let (male, female) = dataset.shoulder_medians.deviation_pct(cm);
        match reference {
            Reference::Female => female,
            Reference::Male => male,
            Reference::Neutral => None,
        }
    });

    let conditional_shoulder = match (dataset.joint(), measurements.height_cm) {
        (Some(joint), Some(height)) => reference.resolve_cohort(joint).and_then(|cohort| {
            loader
                .registry()
                .compute_conditional_shoulder(height, measurements.shoulder_cm, cohort)
        }),
        _ => None,
    };

    Profile {
        reference,
        metrics,
        bmi_band,
        body_fat_band,
        whr_cut: reference.whr_cut(dataset),
        shoulder_median_deviation_pct,
        conditional_shoulder,
    }
}

pub async fn profile<F: DatasetFetcher>(
    loader: &DatasetLoader<F>,
    source: &DatasetSource,
    reference: Reference,
    measurements: &BodyMeasurements,
    format: OutputFormat,
) -> Result<()> {
    let dataset = load_dataset(loader, source).await?;
    let profile = build_profile(loader, &dataset, reference, measurements);

    if format == OutputFormat::Json {
        return print_json(&profile);
    }

    println!(
        "Profile against {} (reference: {})",
        dataset.name.as_deref().or(dataset.id.as_deref()).unwrap_or("dataset"),
        reference
    );
    for report in &profile.metrics {
        report.print();
    }
    println!();
    if let Some(band) = profile.bmi_band {
        println!("  BMI band: {:?}", band);
    }
    if let Some(band) = profile.body_fat_band {
        println!("  Body fat band: {:?}", band);
    }
    if let Some(cut) = profile.whr_cut {
        println!("  Waist ratio cut-off: {:.2}", cut);
    }
    if let Some(deviation) = profile.shoulder_median_deviation_pct {
        println!("  Shoulder deviation from cohort median: {:.1}%", deviation);
    }
    if let Some(mu) = profile.conditional_shoulder.as_ref().and_then(|c| c.mu_cond) {
        println!(
            "  Expected shoulder for height: {:.1} cm ({})",
            mu,
            format_percentile(profile.conditional_shoulder.as_ref().and_then(|c| c.pr))
        );
    }

    Ok(())
}
