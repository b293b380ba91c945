//! Body ratios computed from raw measurements.

use crate::metric::MetricKey;
use serde::{Deserialize, Serialize};

/// Raw body measurements. Lengths in centimetres, weight in kilograms.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyMeasurements {
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub waist_cm: Option<f64>,
    pub hip_cm: Option<f64>,
    pub shoulder_cm: Option<f64>,
    pub bust_cm: Option<f64>,
    pub thigh_cm: Option<f64>,
    pub calf_cm: Option<f64>,
    pub body_fat_pct: Option<f64>,
}

impl BodyMeasurements {
    /// Value of `key` for these measurements.
    ///
    /// `None` when an input is missing or non-finite, or a denominator is zero.
    pub fn ratio(&self, key: MetricKey) -> Option<f64> {
        match key {
            MetricKey::Bmi => {
                let meters = self.height_cm? / 100.0;
                divide(self.weight_kg, Some(meters * meters))
            }
            MetricKey::WaistToHeight => divide(self.waist_cm, self.height_cm),
            MetricKey::WaistToHip | MetricKey::WaistToHipFemale | MetricKey::WaistToHipMale => {
                divide(self.waist_cm, self.hip_cm)
            }
            MetricKey::ShoulderToHeight => divide(self.shoulder_cm, self.height_cm),
            MetricKey::ShoulderToHip => divide(self.shoulder_cm, self.hip_cm),
            MetricKey::BustToWaist => divide(self.bust_cm, self.waist_cm),
            MetricKey::BustToHeight => divide(self.bust_cm, self.height_cm),
            MetricKey::ThighToHeight => divide(self.thigh_cm, self.height_cm),
            MetricKey::CalfToHeight => divide(self.calf_cm, self.height_cm),
            MetricKey::BodyFatPct => self.body_fat_pct.filter(|v| v.is_finite()),
        }
    }

    /// Every computable metric, in [`MetricKey::ALL`] order.
    pub fn ratios(&self) -> Vec<(MetricKey, f64)> {
        MetricKey::ALL
            .into_iter()
            .filter_map(|key| self.ratio(key).map(|value| (key, value)))
            .collect()
    }
}

fn divide(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    let (n, d) = (numerator?, denominator?);
    if !n.is_finite() || !d.is_finite() || d == 0.0 {
        return None;
    }
    Some(n / d)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BodyMeasurements {
        BodyMeasurements {
            height_cm: Some(160.0),
            weight_kg: Some(51.2),
            waist_cm: Some(64.0),
            hip_cm: Some(90.0),
            shoulder_cm: Some(36.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_bmi() {
        let bmi = sample().ratio(MetricKey::Bmi).unwrap();
        assert!((bmi - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_ratios() {
        let m = sample();
        assert!((m.ratio(MetricKey::WaistToHeight).unwrap() - 0.4).abs() < 1e-12);
        assert!((m.ratio(MetricKey::ShoulderToHip).unwrap() - 0.4).abs() < 1e-12);
        assert_eq!(m.ratio(MetricKey::WaistToHipMale), m.ratio(MetricKey::WaistToHip));
        assert!(m.ratio(MetricKey::BustToWaist).is_none());
        assert!(m.ratio(MetricKey::BodyFatPct).is_none());
    }

    #[test]
    fn test_zero_denominator() {
        let m = BodyMeasurements {
            height_cm: Some(0.0),
            weight_kg: Some(50.0),
            waist_cm: Some(60.0),
            ..Default::default()
        };
        assert!(m.ratio(MetricKey::Bmi).is_none());
        assert!(m.ratio(MetricKey::WaistToHeight).is_none());
    }

    #[test]
    fn test_ratios_list_order() {
        let keys: Vec<MetricKey> = sample().ratios().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys[0], MetricKey::Bmi);
        assert!(keys.contains(&MetricKey::ShoulderToHeight));
        assert!(!keys.contains(&MetricKey::CalfToHeight));
    }
}
