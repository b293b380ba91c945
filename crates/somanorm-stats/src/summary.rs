//! Descriptive statistics over raw sample arrays.

use serde::{Deserialize, Serialize};

/// Summary computed from a metric's raw samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleSummary {
    /// Number of samples.
    pub count: usize,
    pub mean: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    /// 10th percentile.
    pub p10: f64,
    /// First quartile.
    pub p25: f64,
    /// Median.
    pub p50: f64,
    /// Third quartile.
    pub p75: f64,
    /// 90th percentile.
    pub p90: f64,
    /// 95th percentile.
    pub p95: f64,
}

impl SampleSummary {
    /// Compute statistics from a slice of samples.
    ///
    /// Non-finite samples are ignored. Returns `None` if nothing is left.
    pub fn compute(samples: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = samples.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(|a, b| a.total_cmp(b));

        let count = sorted.len();
        let mean = sorted.iter().sum::<f64>() / count as f64;
        let variance = sorted.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / count as f64;

        Some(Self {
            count,
            mean,
            std_dev: variance.sqrt(),
            min: sorted[0],
            max: sorted[count - 1],
            p10: quantile_of_sorted(&sorted, 10.0),
            p25: quantile_of_sorted(&sorted, 25.0),
            p50: quantile_of_sorted(&sorted, 50.0),
            p75: quantile_of_sorted(&sorted, 75.0),
            p90: quantile_of_sorted(&sorted, 90.0),
            p95: quantile_of_sorted(&sorted, 95.0),
        })
    }

    /// Interquartile range.
    pub fn iqr(&self) -> f64 {
        self.p75 - self.p25
    }
}

/// Value at percentile `p` (0-100) of an ascending slice.
///
/// Uses linear interpolation between adjacent order statistics.
pub fn quantile_of_sorted(sorted: &[f64], p: f64) -> f64 {
    match sorted {
        [] => f64::NAN,
        [only] => *only,
        _ => {
            let p = p.clamp(0.0, 100.0);
            let index = (p / 100.0) * (sorted.len() - 1) as f64;
            let lower = index.floor() as usize;
            let upper = index.ceil() as usize;
            if lower == upper {
                sorted[lower]
            } else {
                let fraction = index - lower as f64;
                sorted[lower] * (1.0 - fraction) + sorted[upper] * fraction
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_empty() {
        assert!(SampleSummary::compute(&[]).is_none());
        assert!(SampleSummary::compute(&[f64::NAN]).is_none());
    }

    #[test]
    fn test_compute_single() {
        let summary = SampleSummary::compute(&[21.5]).unwrap();
        assert_eq!(summary.count, 1);
        assert_eq!(summary.p50, 21.5);
        assert_eq!(summary.std_dev, 0.0);
    }

    #[test]
    fn test_compute_unsorted() {
        let summary = SampleSummary::compute(&[5.0, 1.0, 3.0, 2.0, 4.0]).unwrap();
        assert_eq!(summary.count, 5);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 5.0);
        assert!((summary.mean - 3.0).abs() < 1e-12);
        assert!((summary.p50 - 3.0).abs() < 1e-12);
        assert!((summary.iqr() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_serialized_field_names() {
        let summary = SampleSummary::compute(&[1.0, 3.0]).unwrap();
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["stdDev"], 1.0);
        assert!(value.get("std_dev").is_none());
        assert_eq!(value["count"], 2);
    }

    #[test]
    fn test_quantile_interpolates() {
        let sorted: Vec<f64> = (0..100).map(f64::from).collect();
        assert!((quantile_of_sorted(&sorted, 10.0) - 9.9).abs() < 1e-9);
        assert!((quantile_of_sorted(&sorted, 50.0) - 49.5).abs() < 1e-9);
        assert_eq!(quantile_of_sorted(&sorted, 150.0), 99.0);
    }
}
