//! Joint shoulder-width / height annex.
//!
//! A dataset's shoulder-to-height metric may carry a `computedFrom` block
//! with height and shoulder percentiles per cohort. Each cohort is reduced to
//! two normal marginals plus a correlation coefficient, which is enough to
//! answer "how wide are these shoulders for someone this tall".

use crate::aliases;
use crate::cohort::determine_cohort_keys;
use crate::metric::collect_quantile_points;
use crate::registry::CohortRegistry;
use crate::value::{first_key, first_number, first_present, non_empty_str};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use somanorm_stats::{
    LengthUnit, NormalApproximation, QuantilePoint, TailPair, clamp_rho,
    fit_normal_from_percentiles, to_centimeters,
};
use std::collections::BTreeMap;
use tracing::debug;

/// Cohort key to joint parameters.
pub type JointTable = BTreeMap<String, JointEntry>;

/// Closed interval in centimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub low: f64,
    pub high: f64,
}

impl Bounds {
    /// Clamp `value` into the interval, reporting whether it moved.
    pub fn clamp(&self, value: f64) -> (f64, bool) {
        if value < self.low {
            (self.low, true)
        } else if value > self.high {
            (self.high, true)
        } else {
            (value, false)
        }
    }
}

/// Bivariate-normal parameters for one cohort. All lengths are centimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JointEntry {
    pub mu_height: f64,
    pub sigma_height: f64,
    pub mu_shoulder: f64,
    pub sigma_shoulder: f64,
    #[serde(default)]
    pub rho: Option<f64>,
    #[serde(default = "centimeters")]
    pub unit: LengthUnit,
    pub height_range: Bounds,
    pub shoulder_range: Bounds,
    #[serde(default = "preferred_pair", with = "tail_pair_bounds")]
    pub height_percentiles: TailPair,
    #[serde(default = "preferred_pair", with = "tail_pair_bounds")]
    pub shoulder_percentiles: TailPair,
}

fn centimeters() -> LengthUnit {
    LengthUnit::Centimeter
}

fn preferred_pair() -> TailPair {
    TailPair::PREFERENCE[0]
}

/// Tail pairs travel as `{"low": 5, "high": 95}`.
mod tail_pair_bounds {
    use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error};
    use somanorm_stats::TailPair;

    #[derive(Serialize, Deserialize)]
    struct Percentiles {
        low: f64,
        high: f64,
    }

    pub fn serialize<S: Serializer>(pair: &TailPair, serializer: S) -> Result<S::Ok, S::Error> {
        let (low, high) = pair.percentiles();
        Percentiles { low, high }.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TailPair, D::Error> {
        let Percentiles { low, high } = Percentiles::deserialize(deserializer)?;
        TailPair::PREFERENCE
            .into_iter()
            .find(|pair| pair.percentiles() == (low, high))
            .ok_or_else(|| D::Error::custom(format!("unsupported percentile pair {}/{}", low, high)))
    }
}

/// Normal fit of one marginal section plus the tail values it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarginalFit {
    pub normal: NormalApproximation,
    pub bounds: Bounds,
    pub pair: TailPair,
}

/// Fit a normal to a height or shoulder section.
///
/// Requires a median and one complete tail pair (5/95 preferred over 10/90).
/// Values are converted to centimetres using the section's unit label or the
/// magnitude heuristic.
pub fn read_normal_approximation(section: &Value) -> Option<MarginalFit> {
    let object = section.as_object()?;
    let points = collect_quantile_points(object);
    let unit = first_key(section, aliases::UNIT)
        .and_then(non_empty_str)
        .and_then(LengthUnit::detect);
    let at = |percentile: f64| -> Option<f64> {
        lookup(&points, percentile).and_then(|value| to_centimeters(value, unit))
    };

    let q50 = at(50.0)?;
    let pair = TailPair::PREFERENCE.into_iter().find(|pair| {
        let (low, high) = pair.percentiles();
        lookup(&points, low).is_some() && lookup(&points, high).is_some()
    })?;

    let (p_low, p_high) = pair.percentiles();
    let (q_low, q_high) = (at(p_low)?, at(p_high)?);
    let (z_low, z_high) = pair.z_scores();
    let normal = fit_normal_from_percentiles(Some(q_low), q50, Some(q_high), z_low, z_high)?;

    Some(MarginalFit {
        normal,
        bounds: Bounds {
            low: q_low,
            high: q_high,
        },
        pair,
    })
}

/// Later entries for the same percentile override earlier ones.
fn lookup(points: &[QuantilePoint], percentile: f64) -> Option<f64> {
    points
        .iter()
        .rev()
        .find(|point| point.percentile == percentile)
        .map(|point| point.value)
}

/// First numeric correlation among the rho aliases, clamped into (-1, 1).
pub fn extract_rho(block: &Value) -> Option<f64> {
    first_number(block, aliases::RHO).and_then(clamp_rho)
}

/// Build the joint parameters of one cohort block.
pub fn parse_joint_entry(block: &Value) -> Option<JointEntry> {
    let height = first_present(block, aliases::HEIGHT_SECTION).and_then(read_normal_approximation)?;
    let shoulder =
        first_present(block, aliases::SHOULDER_SECTION).and_then(read_normal_approximation)?;

    Some(JointEntry {
        mu_height: height.normal.mu,
        sigma_height: height.normal.sigma,
        mu_shoulder: shoulder.normal.mu,
        sigma_shoulder: shoulder.normal.sigma,
        rho: extract_rho(block),
        unit: LengthUnit::Centimeter,
        height_range: height.bounds,
        shoulder_range: shoulder.bounds,
        height_percentiles: height.pair,
        shoulder_percentiles: shoulder.pair,
    })
}

/// Build the joint table from a shoulder-to-height metric's `computedFrom`.
///
/// `cohorts` may be an array of blocks, an object keyed by cohort, or absent
/// (the `computedFrom` block is then the single cohort). Every resolved
/// cohort key is registered in `registry`. Returns `None` when no cohort
/// yields usable parameters.
pub fn build_shoulder_height_joint(
    metric: &Value,
    dataset: &Value,
    registry: &CohortRegistry,
) -> Option<JointTable> {
    let computed = first_key(metric, aliases::COMPUTED_FROM).filter(|v| v.is_object())?;
    let mut table = JointTable::new();

    let mut add = |block: &Value, explicit: Option<&str>| {
        if !block.is_object() {
            return;
        }
        let Some(entry) = parse_joint_entry(block) else {
            debug!(cohort = ?explicit, "Skipping joint cohort without usable percentiles");
            return;
        };
        for key in determine_cohort_keys(block, dataset, explicit) {
            registry.register(&key, entry);
            table.insert(key, entry);
        }
    };

    match computed.get(aliases::COHORTS) {
        Some(Value::Array(blocks)) => blocks.iter().for_each(|block| add(block, None)),
        Some(Value::Object(blocks)) => blocks
            .iter()
            .for_each(|(key, block)| add(block, Some(key.as_str()))),
        _ => add(computed, None),
    }

    (!table.is_empty()).then_some(table)
}

/// Read a joint table already attached to a metric.
///
/// Each entry is checked like a freshly built one: rho is clamped into
/// (-1, 1), sigmas must be positive and ranges ordered. Entries that fail
/// are dropped; the rest are registered.
pub fn read_existing_joint(existing: &Value, registry: &CohortRegistry) -> Option<JointTable> {
    let Some(entries) = existing.as_object() else {
        debug!("Ignoring joint annex that is not an object");
        return None;
    };
    let mut table = JointTable::new();
    for (key, raw) in entries {
        let entry = match serde_json::from_value::<JointEntry>(raw.clone()) {
            Ok(entry) => entry.validated(),
            Err(e) => {
                debug!(cohort = %key, error = %e, "Ignoring malformed joint entry");
                continue;
            }
        };
        match entry {
            Some(entry) => {
                registry.register(key, entry);
                table.insert(key.clone(), entry);
            }
            None => debug!(cohort = %key, "Ignoring joint entry with invalid parameters"),
        }
    }
    (!table.is_empty()).then_some(table)
}

impl JointEntry {
    /// This entry with rho clamped, or `None` when a mean or sigma is not
    /// finite, a sigma is not positive, or a range is inverted.
    pub fn validated(mut self) -> Option<Self> {
        let positive = |sigma: f64| sigma.is_finite() && sigma > 0.0;
        let ordered = |b: &Bounds| b.low.is_finite() && b.high.is_finite() && b.low <= b.high;
        if !self.mu_height.is_finite()
            || !self.mu_shoulder.is_finite()
            || !positive(self.sigma_height)
            || !positive(self.sigma_shoulder)
            || !ordered(&self.height_range)
            || !ordered(&self.shoulder_range)
        {
            return None;
        }
        self.rho = self.rho.and_then(clamp_rho);
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use somanorm_stats::{Z5, Z90, Z95};

    fn height_mm() -> Value {
        json!({"unit": "mm", "p5": 1520, "p50": 1620, "p95": 1720})
    }

    fn shoulder_cm() -> Value {
        json!({"p10": 33.0, "p50": 36.0, "p90": 39.0})
    }

    #[test]
    fn test_normal_from_5_95_in_mm() {
        let fit = read_normal_approximation(&height_mm()).unwrap();
        assert_eq!(fit.pair, TailPair::P5P95);
        assert!((fit.normal.mu - 162.0).abs() < 1e-9);
        assert!((fit.normal.sigma - 10.0 / Z95).abs() < 1e-9);
        assert_eq!(fit.bounds, Bounds { low: 152.0, high: 172.0 });
    }

    #[test]
    fn test_normal_falls_back_to_10_90() {
        let fit = read_normal_approximation(&shoulder_cm()).unwrap();
        assert_eq!(fit.pair, TailPair::P10P90);
        assert!((fit.normal.sigma - 3.0 / Z90).abs() < 1e-9);
    }

    #[test]
    fn test_normal_prefers_5_95_when_both_exist() {
        let section = json!({"p5": 150, "p10": 155, "p50": 162, "p90": 169, "p95": 174});
        let fit = read_normal_approximation(&section).unwrap();
        assert_eq!(fit.pair, TailPair::P5P95);
        let expected = ((162.0 - 150.0) / -Z5 + (174.0 - 162.0) / Z95) / 2.0;
        assert!((fit.normal.sigma - expected).abs() < 1e-9);
    }

    #[test]
    fn test_normal_requires_median_and_pair() {
        assert!(read_normal_approximation(&json!({"p5": 150, "p95": 170})).is_none());
        assert!(read_normal_approximation(&json!({"p50": 160, "p95": 170})).is_none());
        assert!(read_normal_approximation(&json!("p50")).is_none());
    }

    #[test]
    fn test_quantile_table_sections() {
        let section = json!({
            "units": "centimeters",
            "percentiles": {"10": 150, "50": 160, "90": 170}
        });
        let fit = read_normal_approximation(&section).unwrap();
        assert_eq!(fit.pair, TailPair::P10P90);
        assert_eq!(fit.normal.mu, 160.0);
    }

    #[test]
    fn test_extract_rho() {
        assert_eq!(extract_rho(&json!({"rho": 0.4})), Some(0.4));
        assert_eq!(extract_rho(&json!({"correlation": "bad", "correlationRho": "0.3"})), Some(0.3));
        assert_eq!(extract_rho(&json!({"assumptions": {"rho": 1.5}})), Some(0.999_999));
        assert_eq!(extract_rho(&json!({})), None);
    }

    #[test]
    fn test_build_from_single_block() {
        let registry = CohortRegistry::new();
        let metric = json!({
            "computedFrom": {
                "gender": "female",
                "height_mm": height_mm(),
                "shoulder": shoulder_cm(),
                "rho": 0.5
            }
        });
        let table = build_shoulder_height_joint(&metric, &json!({}), &registry).unwrap();
        assert_eq!(table.keys().collect::<Vec<_>>(), vec!["cisFemale"]);
        let entry = table["cisFemale"];
        assert_eq!(entry.rho, Some(0.5));
        assert_eq!(entry.unit, LengthUnit::Centimeter);
        assert_eq!(registry.lookup("cisFemale"), Some(entry));
    }

    #[test]
    fn test_build_from_cohort_object_and_array() {
        let registry = CohortRegistry::new();
        let block = json!({"stature": height_mm(), "biacromial": shoulder_cm()});

        let metric = json!({"computedFrom": {"cohorts": {"men": block.clone()}}});
        let table = build_shoulder_height_joint(&metric, &json!({}), &registry).unwrap();
        assert!(table.contains_key("men"));
        assert!(table["men"].rho.is_none());

        let metric = json!({"computed_from": {"cohorts": [block, {"id": "broken"}, 3]}});
        let table = build_shoulder_height_joint(&metric, &json!({"gender": "male"}), &registry)
            .unwrap();
        assert_eq!(table.keys().collect::<Vec<_>>(), vec!["cisMale"]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_build_returns_none_without_usable_cohort() {
        let registry = CohortRegistry::new();
        assert!(build_shoulder_height_joint(&json!({}), &json!({}), &registry).is_none());
        let metric = json!({"computedFrom": {"height": {"p50": 160}}});
        assert!(build_shoulder_height_joint(&metric, &json!({}), &registry).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_joint_entry_wire_format() {
        let registry = CohortRegistry::new();
        let metric = json!({"computedFrom": {"height": height_mm(), "shoulder": shoulder_cm()}});
        let table = build_shoulder_height_joint(&metric, &json!({}), &registry).unwrap();
        let value = serde_json::to_value(&table).unwrap();
        let entry = &value["default"];
        assert_eq!(entry["unit"], "cm");
        assert_eq!(entry["heightPercentiles"], json!({"low": 5.0, "high": 95.0}));
        assert_eq!(entry["shoulderPercentiles"], json!({"low": 10.0, "high": 90.0}));
        assert!(entry["rho"].is_null());

        let back = read_existing_joint(&value, &CohortRegistry::new()).unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn test_read_existing_joint_rejects_garbage() {
        let registry = CohortRegistry::new();
        assert!(read_existing_joint(&json!({"x": {"muHeight": "tall"}}), &registry).is_none());
        assert!(read_existing_joint(&json!(true), &registry).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_validated_entry() {
        let registry = CohortRegistry::new();
        let metric = json!({"computedFrom": {"height": height_mm(), "shoulder": shoulder_cm()}});
        let entry = build_shoulder_height_joint(&metric, &json!({}), &registry).unwrap()["default"];

        let clamped = JointEntry { rho: Some(-4.0), ..entry }.validated().unwrap();
        assert_eq!(clamped.rho, Some(-somanorm_stats::RHO_LIMIT));
        assert!(JointEntry { sigma_height: 0.0, ..entry }.validated().is_none());
        assert!(JointEntry { sigma_shoulder: f64::NAN, ..entry }.validated().is_none());
        let inverted = Bounds { low: 180.0, high: 150.0 };
        assert!(JointEntry { height_range: inverted, ..entry }.validated().is_none());
        assert_eq!(entry.validated(), Some(entry));
    }
}
