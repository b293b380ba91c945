//! Common helpers for CLI commands

use anyhow::{Context, Result, anyhow};
use clap::Args;
use serde::Serialize;
use somanorm_dataset::{CanonicalDataset, MetricKey, PercentileBadge, percentile_badge};
use somanorm_loader::{DatasetFetcher, DatasetLoader};
use somanorm_stats::{ClampSide, PercentileRank};
use std::sync::Arc;

/// Which population dataset a command runs against.
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct DatasetSource {
    /// Dataset file, relative to the data root
    #[arg(short, long)]
    pub file: Option<String>,

    /// Dataset id from the population manifest
    #[arg(short, long)]
    pub dataset: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Text }
    }
}

pub async fn load_dataset<F: DatasetFetcher>(
    loader: &DatasetLoader<F>,
    source: &DatasetSource,
) -> Result<Arc<CanonicalDataset>> {
    match (&source.file, &source.dataset) {
        (Some(file), _) => loader
            .load_population(file)
            .await
            .with_context(|| format!("Dataset file '{}' could not be loaded", file)),
        (None, Some(id)) => loader
            .load_population_by_id(id)
            .await
            .with_context(|| format!("Dataset '{}' not found. Run 'somanorm datasets' to list them.", id)),
        (None, None) => anyhow::bail!("Pass --file or --dataset"),
    }
}

pub fn parse_metric(key: &str) -> Result<MetricKey> {
    key.parse::<MetricKey>().map_err(|e| {
        let known: Vec<&str> = MetricKey::ALL.iter().map(MetricKey::key).collect();
        anyhow!("{} (known metrics: {})", e, known.join(", "))
    })
}

/// `P42.3`, or the no-data dash.
pub fn format_percentile(percentile: Option<f64>) -> String {
    match percentile {
        Some(p) => format!("P{:.1}", p),
        None => "—".to_string(),
    }
}

/// Short note for ranks that fell outside the sampled range.
pub fn clamp_note(rank: &PercentileRank) -> Option<&'static str> {
    match rank.clamped? {
        ClampSide::Low => Some("below sampled range"),
        ClampSide::High => Some("above sampled range"),
    }
}

/// One metric value ranked against a dataset.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricReport {
    pub metric: MetricKey,
    pub label: &'static str,
    pub value: f64,
    pub rank: PercentileRank,
    /// Percentile after the lower-is-better policy.
    pub display_percentile: Option<f64>,
    pub badge: PercentileBadge,
}

impl MetricReport {
    pub fn new(dataset: &CanonicalDataset, metric: MetricKey, value: f64) -> Self {
        let canonical = dataset.metric(metric);
        let rank = canonical.map_or_else(PercentileRank::unavailable, |m| m.percentile_rank(value));
        let display_percentile = match (canonical, rank.percentile) {
            (Some(m), Some(p)) => Some(m.display_percentile(p)),
            _ => None,
        };
        Self {
            metric,
            label: metric.label(),
            value,
            rank,
            display_percentile,
            badge: percentile_badge(canonical, value),
        }
    }

    pub fn print(&self) {
        let mut line = format!(
            "  {:<28} {:>9.3}  {:>7}  [{}]",
            self.label,
            self.value,
            format_percentile(self.display_percentile),
            self.badge.label
        );
        if let Some(note) = clamp_note(&self.rank) {
            line.push_str(&format!("  {}", note));
        }
        if self.badge.state.is_some() {
            line.push_str("  past cut-off");
        }
        println!("{}", line);
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", text);
    Ok(())
}
