//! Population dataset normalization.
//!
//! Turns an arbitrarily shaped norm file into a [`CanonicalDataset`]: a fixed
//! map of named metrics, bibliographic metadata, convenience cut-offs and the
//! joint shoulder/height annex. Malformed parts degrade to `None`; nothing
//! here fails.

mod meta;

pub use meta::{DatasetMeta, MetaValue, collect_source_titles, extract_sample_size, extract_year};

use crate::aliases;
use crate::joint::{JointTable, build_shoulder_height_joint, read_existing_joint};
use crate::metric::{CanonicalMetric, MetricKey, normalize_metric};
use crate::registry::CohortRegistry;
use crate::value::{KeyPath, first_key, get_path, identifier, non_empty_str, to_number};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Shoulder-width medians by cohort, when a dataset records them.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoulderMedians {
    pub cis_male: Option<f64>,
    pub cis_female: Option<f64>,
}

impl ShoulderMedians {
    pub fn extract(metric: Option<&Value>) -> Self {
        let Some(metric) = metric.filter(|m| m.is_object()) else {
            return Self::default();
        };
        let read = |paths: &[KeyPath]| {
            paths
                .iter()
                .find_map(|path| get_path(metric, path).and_then(read_median))
        };
        Self {
            cis_male: read(aliases::SHOULDER_MEDIAN_MALE),
            cis_female: read(aliases::SHOULDER_MEDIAN_FEMALE),
        }
    }

    /// Absolute deviation of `value` from each median, in percent.
    pub fn deviation_pct(&self, value: f64) -> (Option<f64>, Option<f64>) {
        let deviation = |median: Option<f64>| {
            median
                .filter(|m| m.is_finite() && *m != 0.0)
                .map(|m| ((value - m) / m * 100.0).abs())
                .filter(|d| d.is_finite())
        };
        (deviation(self.cis_male), deviation(self.cis_female))
    }
}

fn read_median(section: &Value) -> Option<f64> {
    match section {
        Value::Object(_) => first_key(section, aliases::MEDIAN_VALUE).and_then(to_number),
        other => to_number(other),
    }
}

/// One canonical metric slot per [`MetricKey`]; absent metrics are `None`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DatasetMetrics {
    pub bmi: Option<CanonicalMetric>,
    #[serde(rename = "whtR")]
    pub waist_to_height: Option<CanonicalMetric>,
    pub whr: Option<CanonicalMetric>,
    #[serde(rename = "whrFemale")]
    pub whr_female: Option<CanonicalMetric>,
    #[serde(rename = "whrMale")]
    pub whr_male: Option<CanonicalMetric>,
    #[serde(rename = "shoulderHeightRatio")]
    pub shoulder_height: Option<CanonicalMetric>,
    #[serde(rename = "shoulderHipRatio")]
    pub shoulder_hip: Option<CanonicalMetric>,
    #[serde(rename = "bustWaistRatio")]
    pub bust_waist: Option<CanonicalMetric>,
    #[serde(rename = "bustHeightRatio")]
    pub bust_height: Option<CanonicalMetric>,
    #[serde(rename = "thighHeightRatio")]
    pub thigh_height: Option<CanonicalMetric>,
    #[serde(rename = "calfHeightRatio")]
    pub calf_height: Option<CanonicalMetric>,
    #[serde(rename = "bodyFatPct")]
    pub body_fat_pct: Option<CanonicalMetric>,
}

impl DatasetMetrics {
    pub fn get(&self, key: MetricKey) -> Option<&CanonicalMetric> {
        self.slot(key).as_ref()
    }

    pub fn set(&mut self, key: MetricKey, metric: Option<CanonicalMetric>) {
        *self.slot_mut(key) = metric;
    }

    /// Present metrics in [`MetricKey::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (MetricKey, &CanonicalMetric)> {
        MetricKey::ALL
            .into_iter()
            .filter_map(|key| self.get(key).map(|metric| (key, metric)))
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, key: MetricKey) -> &Option<CanonicalMetric> {
        match key {
            MetricKey::Bmi => &self.bmi,
            MetricKey::WaistToHeight => &self.waist_to_height,
            MetricKey::WaistToHip => &self.whr,
            MetricKey::WaistToHipFemale => &self.whr_female,
            MetricKey::WaistToHipMale => &self.whr_male,
            MetricKey::ShoulderToHeight => &self.shoulder_height,
            MetricKey::ShoulderToHip => &self.shoulder_hip,
            MetricKey::BustToWaist => &self.bust_waist,
            MetricKey::BustToHeight => &self.bust_height,
            MetricKey::ThighToHeight => &self.thigh_height,
            MetricKey::CalfToHeight => &self.calf_height,
            MetricKey::BodyFatPct => &self.body_fat_pct,
        }
    }

    fn slot_mut(&mut self, key: MetricKey) -> &mut Option<CanonicalMetric> {
        match key {
            MetricKey::Bmi => &mut self.bmi,
            MetricKey::WaistToHeight => &mut self.waist_to_height,
            MetricKey::WaistToHip => &mut self.whr,
            MetricKey::WaistToHipFemale => &mut self.whr_female,
            MetricKey::WaistToHipMale => &mut self.whr_male,
            MetricKey::ShoulderToHeight => &mut self.shoulder_height,
            MetricKey::ShoulderToHip => &mut self.shoulder_hip,
            MetricKey::BustToWaist => &mut self.bust_waist,
            MetricKey::BustToHeight => &mut self.bust_height,
            MetricKey::ThighToHeight => &mut self.thigh_height,
            MetricKey::CalfToHeight => &mut self.calf_height,
            MetricKey::BodyFatPct => &mut self.body_fat_pct,
        }
    }
}

/// Normalized population dataset.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalDataset {
    pub id: Option<String>,
    pub name: Option<String>,
    pub meta: DatasetMeta,
    pub metrics: DatasetMetrics,
    #[serde(rename = "whtRCut")]
    pub waist_to_height_cut: Option<f64>,
    pub whr_female_cut: Option<f64>,
    pub whr_male_cut: Option<f64>,
    pub shoulder_medians: ShoulderMedians,
}

impl CanonicalDataset {
    pub fn metric(&self, key: MetricKey) -> Option<&CanonicalMetric> {
        self.metrics.get(key)
    }

    /// Joint shoulder/height annex, if one was built or supplied.
    pub fn joint(&self) -> Option<&JointTable> {
        self.metrics.shoulder_height.as_ref()?.joint.as_ref()
    }
}

/// Raw metric block for `key` under a `metrics` container.
/// First alias of `key` whose value is an object, with the alias it was
/// found under.
fn source_metric_entry(metrics: Option<&Value>, key: MetricKey) -> Option<(&'static str, &Value)> {
    let metrics = metrics?;
    key.aliases()
        .iter()
        .find_map(|alias| metrics.get(*alias).filter(|v| v.is_object()).map(|v| (*alias, v)))
}

fn source_metric(metrics: Option<&Value>, key: MetricKey) -> Option<&Value> {
    source_metric_entry(metrics, key).map(|(_, value)| value)
}

/// Joint annex for a raw shoulder/height block: usable entries of an
/// attached `joint` are kept, otherwise one is built from `computedFrom`.
fn shoulder_joint(
    source: Option<&Value>,
    dataset: &Value,
    registry: &CohortRegistry,
) -> Option<JointTable> {
    let source = source.filter(|s| s.is_object())?;
    first_key(source, &[aliases::EXISTING_JOINT])
        .and_then(|existing| read_existing_joint(existing, registry))
        .or_else(|| build_shoulder_height_joint(source, dataset, registry))
}

/// Normalize a population dataset payload.
///
/// Returns `None` when `raw` is not a JSON object. Cohorts found in the
/// shoulder/height annex are registered in `registry`.
pub fn normalize_dataset(raw: &Value, registry: &CohortRegistry) -> Option<CanonicalDataset> {
    if !raw.is_object() {
        return None;
    }
    let metrics_source = raw.get("metrics").filter(|m| m.is_object());

    let mut metrics = DatasetMetrics::default();
    for key in MetricKey::ALL {
        let source = source_metric(metrics_source, key);
        metrics.set(key, source.and_then(normalize_metric));
    }

    let shoulder_source = source_metric(metrics_source, MetricKey::ShoulderToHeight);
    if let Some(joint) = shoulder_joint(shoulder_source, raw, registry) {
        let metric = match metrics.shoulder_height.take() {
            Some(metric) => metric.with_joint(joint),
            None => CanonicalMetric::joint_only(shoulder_source, joint),
        };
        metrics.shoulder_height = Some(metric);
    }

    let cut = |metric: &Option<CanonicalMetric>| metric.as_ref().and_then(|m| m.cut_threshold);
    let dataset = CanonicalDataset {
        id: raw.get("id").and_then(identifier),
        name: raw.get("name").and_then(non_empty_str).map(str::to_string),
        meta: DatasetMeta::extract(raw),
        waist_to_height_cut: cut(&metrics.waist_to_height),
        whr_female_cut: cut(&metrics.whr_female),
        whr_male_cut: cut(&metrics.whr_male),
        shoulder_medians: ShoulderMedians::extract(shoulder_source),
        metrics,
    };

    debug!(
        id = ?dataset.id,
        metrics = dataset.metrics.len(),
        cohorts = dataset.joint().map_or(0, |j| j.len()),
        "Normalized dataset"
    );
    Some(dataset)
}

/// Attach a joint annex to a model payload's shoulder/height metric.
///
/// Model payloads are otherwise passed through untouched. When a usable joint
/// is already attached, or none can be built, the payload is returned as is.
/// An unusable attached joint is replaced by one built from `computedFrom`.
pub fn attach_joint_to_model(raw: &Value, registry: &CohortRegistry) -> Value {
    let Some(metrics) = raw.get("metrics").filter(|m| m.is_object()) else {
        return raw.clone();
    };
    let Some((metric_key, source)) = source_metric_entry(Some(metrics), MetricKey::ShoulderToHeight)
    else {
        return raw.clone();
    };

    let existing = first_key(source, &[aliases::EXISTING_JOINT]);
    if existing.and_then(|e| read_existing_joint(e, registry)).is_some() {
        return raw.clone();
    }

    let Some(joint) = build_shoulder_height_joint(source, raw, registry) else {
        return raw.clone();
    };
    let Ok(joint_value) = serde_json::to_value(&joint) else {
        return raw.clone();
    };

    let mut patched = raw.clone();
    if let Some(metric) = patched
        .get_mut("metrics")
        .and_then(|m| m.get_mut(metric_key))
        .and_then(Value::as_object_mut)
    {
        metric.insert(aliases::EXISTING_JOINT.to_string(), joint_value);
    }
    patched
}

#[cfg(test)]
mod tests;
