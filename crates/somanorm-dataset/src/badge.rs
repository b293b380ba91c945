//! Coarse percentile badges (P10 ... P90) for display next to a value.

use crate::metric::CanonicalMetric;
use serde::{Deserialize, Serialize};

/// Percentiles that can appear on a badge.
pub const BADGE_PERCENTILES: [f64; 5] = [10.0, 25.0, 50.0, 75.0, 90.0];

/// Label shown when the metric has no badge percentiles.
pub const NO_LABEL: &str = "—";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeState {
    /// The value is at or past the metric's cut-off.
    Alert,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercentileBadge {
    pub label: String,
    pub state: Option<BadgeState>,
    /// Only the median was available.
    pub fallback: bool,
}

impl PercentileBadge {
    fn unavailable() -> Self {
        Self {
            label: NO_LABEL.to_string(),
            state: None,
            fallback: false,
        }
    }
}

/// Badge for `value` against `metric`.
///
/// Picks the highest badge percentile whose value does not exceed `value`,
/// or the lowest one when `value` is below all of them. For metrics where
/// lower is better the label is mirrored (P10 reads as P90).
pub fn percentile_badge(metric: Option<&CanonicalMetric>, value: f64) -> PercentileBadge {
    let Some(metric) = metric else {
        return PercentileBadge::unavailable();
    };
    if !value.is_finite() {
        return PercentileBadge::unavailable();
    }

    let mut steps: Vec<(f64, f64)> = BADGE_PERCENTILES
        .iter()
        .filter_map(|p| metric.quantile_at(*p).map(|v| (*p, v)))
        .collect();
    if steps.is_empty() {
        return PercentileBadge::unavailable();
    }
    steps.sort_by(|a, b| a.1.total_cmp(&b.1));

    let percentile = steps
        .iter()
        .take_while(|(_, step)| value >= *step)
        .last()
        .unwrap_or(&steps[0])
        .0;

    let state = metric
        .cut_threshold
        .filter(|cut| *cut != 0.0 && value >= *cut)
        .map(|_| BadgeState::Alert);

    PercentileBadge {
        label: format!("P{}", metric.display_percentile(percentile).round()),
        state,
        fallback: steps.len() == 1 && steps[0].0 == 50.0,
    }
}
