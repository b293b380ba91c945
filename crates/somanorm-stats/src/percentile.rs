//! Percentile-rank resolution against empirical samples or quantile tables.

use crate::numeric::value_key;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One `(percentile, value)` point of a quantile table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuantilePoint {
    /// Percentile in `[0, 100]`.
    pub percentile: f64,
    pub value: f64,
}

impl QuantilePoint {
    pub fn new(percentile: f64, value: f64) -> Self {
        Self { percentile, value }
    }
}

/// How a percentile rank was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PercentileMethod {
    /// Rank among stored raw samples.
    Empirical,
    /// Only one distinct quantile value was available.
    QuantileSingle,
    /// Linear interpolation (or extrapolation) between quantile points.
    QuantileLinear,
    /// Nothing usable.
    #[default]
    None,
}

impl std::fmt::Display for PercentileMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empirical => write!(f, "empirical"),
            Self::QuantileSingle => write!(f, "quantile-single"),
            Self::QuantileLinear => write!(f, "quantile-linear"),
            Self::None => write!(f, "none"),
        }
    }
}

/// Which bound was applied when a raw percentile left `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClampSide {
    Low,
    High,
}

/// Result of a percentile-rank query.
///
/// `percentile` is `raw_percentile` clamped to `[0, 100]`; `clamped` records
/// which bound (if any) was hit so callers can still say "above the sampled
/// range".
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PercentileRank {
    pub percentile: Option<f64>,
    pub raw_percentile: Option<f64>,
    pub method: PercentileMethod,
    pub clamped: Option<ClampSide>,
}

impl PercentileRank {
    /// The "no data" result.
    pub fn unavailable() -> Self {
        Self::default()
    }

    fn resolved(raw_percentile: f64, method: PercentileMethod) -> Self {
        let (percentile, clamped) = clamp_percentile(raw_percentile);
        Self {
            percentile,
            raw_percentile: raw_percentile.is_finite().then_some(raw_percentile),
            method,
            clamped,
        }
    }

    pub fn is_available(&self) -> bool {
        self.percentile.is_some()
    }
}

/// Resolve the percentile rank of `value`.
///
/// Non-empty `raw_samples` (sorted ascending) take precedence over the
/// quantile table. Non-finite values are unavailable.
pub fn percentile_rank(
    raw_samples: Option<&[f64]>,
    quantiles: &[QuantilePoint],
    value: f64,
) -> PercentileRank {
    if !value.is_finite() {
        return PercentileRank::unavailable();
    }

    if let Some(samples) = raw_samples.filter(|s| !s.is_empty()) {
        let position = upper_bound(samples, value);
        let raw = position as f64 / samples.len() as f64 * 100.0;
        return PercentileRank::resolved(raw, PercentileMethod::Empirical);
    }

    let points = dedupe_by_value(quantiles);
    match points.as_slice() {
        [] => PercentileRank::unavailable(),
        [single] => PercentileRank::resolved(single.percentile, PercentileMethod::QuantileSingle),
        _ => PercentileRank::resolved(
            interpolate_rank(&points, value),
            PercentileMethod::QuantileLinear,
        ),
    }
}

/// Number of samples `<= value` in an ascending slice.
pub fn upper_bound(sorted: &[f64], value: f64) -> usize {
    sorted.partition_point(|sample| *sample <= value)
}

/// Clamp a raw percentile into `[0, 100]`, reporting the bound that applied.
pub fn clamp_percentile(raw: f64) -> (Option<f64>, Option<ClampSide>) {
    if !raw.is_finite() {
        (None, None)
    } else if raw < 0.0 {
        (Some(0.0), Some(ClampSide::Low))
    } else if raw > 100.0 {
        (Some(100.0), Some(ClampSide::High))
    } else {
        (Some(raw), None)
    }
}

/// Keep one point per distinct value (highest percentile wins), sorted by value.
///
/// Points with a non-finite percentile or value are dropped.
pub fn dedupe_by_value(points: &[QuantilePoint]) -> Vec<QuantilePoint> {
    let mut by_value: HashMap<String, QuantilePoint> = HashMap::new();
    for point in points {
        if !point.percentile.is_finite() || !point.value.is_finite() {
            continue;
        }
        by_value
            .entry(value_key(point.value))
            .and_modify(|existing| {
                if point.percentile > existing.percentile {
                    *existing = *point;
                }
            })
            .or_insert(*point);
    }

    let mut deduped: Vec<QuantilePoint> = by_value.into_values().collect();
    deduped.sort_by(|a, b| a.value.total_cmp(&b.value));
    deduped
}

/// Linear percentile between two points, or their midpoint when the values tie.
pub fn interpolate_percentile(lower: &QuantilePoint, upper: &QuantilePoint, target: f64) -> f64 {
    if upper.value == lower.value {
        return (upper.percentile + lower.percentile) / 2.0;
    }
    let fraction = (target - lower.value) / (upper.value - lower.value);
    lower.percentile + fraction * (upper.percentile - lower.percentile)
}

/// Interpolate over at least two points sorted by value.
///
/// Outside the table the first or last pair is extended linearly.
fn interpolate_rank(points: &[QuantilePoint], value: f64) -> f64 {
    let n = points.len();
    let first = &points[0];
    let last = &points[n - 1];

    let raw = if value <= first.value {
        interpolate_percentile(first, &points[1], value)
    } else if value >= last.value {
        interpolate_percentile(&points[n - 2], last, value)
    } else {
        // First point strictly above value; first.value < value < last.value
        let idx = points.partition_point(|p| p.value < value);
        let current = &points[idx];
        if current.value == value {
            current.percentile
        } else {
            interpolate_percentile(&points[idx - 1], current, value)
        }
    };

    if raw.is_finite() { raw } else { last.percentile }
}
