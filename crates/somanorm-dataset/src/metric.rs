//! Canonical per-metric statistical profile.

use crate::aliases;
use crate::joint::JointTable;
use crate::value::{first_key, non_empty_str, to_number};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use somanorm_stats::{PercentileRank, QuantilePoint, SampleSummary, dedupe_by_value, percentile_rank};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static PERCENTILE_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^p(\d{1,3})(?:_(\d{1,3}))?$").expect("valid percentile key pattern")
});

/// Named metrics carried by a canonical dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MetricKey {
    #[serde(rename = "bmi")]
    Bmi,
    #[serde(rename = "whtR")]
    WaistToHeight,
    #[serde(rename = "whr")]
    WaistToHip,
    #[serde(rename = "whrFemale")]
    WaistToHipFemale,
    #[serde(rename = "whrMale")]
    WaistToHipMale,
    #[serde(rename = "shoulderHeightRatio")]
    ShoulderToHeight,
    #[serde(rename = "shoulderHipRatio")]
    ShoulderToHip,
    #[serde(rename = "bustWaistRatio")]
    BustToWaist,
    #[serde(rename = "bustHeightRatio")]
    BustToHeight,
    #[serde(rename = "thighHeightRatio")]
    ThighToHeight,
    #[serde(rename = "calfHeightRatio")]
    CalfToHeight,
    #[serde(rename = "bodyFatPct")]
    BodyFatPct,
}

impl MetricKey {
    pub const ALL: [MetricKey; 12] = [
        Self::Bmi,
        Self::WaistToHeight,
        Self::WaistToHip,
        Self::WaistToHipFemale,
        Self::WaistToHipMale,
        Self::ShoulderToHeight,
        Self::ShoulderToHip,
        Self::BustToWaist,
        Self::BustToHeight,
        Self::ThighToHeight,
        Self::CalfToHeight,
        Self::BodyFatPct,
    ];

    /// Key used in dataset files and JSON output.
    pub fn key(&self) -> &'static str {
        self.aliases()[0]
    }

    /// Accepted spellings in source payloads, canonical key first.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::Bmi => &["bmi", "BMI"],
            Self::WaistToHeight => &["whtR", "whtr", "waistHeightRatio", "waist_height_ratio"],
            Self::WaistToHip => &["whr", "WHR", "waistHipRatio", "waist_hip_ratio"],
            Self::WaistToHipFemale => &["whrFemale", "whr_female"],
            Self::WaistToHipMale => &["whrMale", "whr_male"],
            Self::ShoulderToHeight => &["shoulderHeightRatio", "shoulder_height_ratio"],
            Self::ShoulderToHip => &["shoulderHipRatio", "shoulder_hip_ratio"],
            Self::BustToWaist => &["bustWaistRatio", "bust_waist_ratio"],
            Self::BustToHeight => &["bustHeightRatio", "bust_height_ratio"],
            Self::ThighToHeight => &["thighHeightRatio", "thigh_height_ratio"],
            Self::CalfToHeight => &["calfHeightRatio", "calf_height_ratio"],
            Self::BodyFatPct => &["bodyFatPct", "body_fat_pct", "bodyFat"],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Bmi => "BMI",
            Self::WaistToHeight => "waist-to-height",
            Self::WaistToHip => "waist-to-hip",
            Self::WaistToHipFemale => "waist-to-hip (female)",
            Self::WaistToHipMale => "waist-to-hip (male)",
            Self::ShoulderToHeight => "shoulder-to-height",
            Self::ShoulderToHip => "shoulder-to-hip",
            Self::BustToWaist => "bust-to-waist",
            Self::BustToHeight => "bust-to-height",
            Self::ThighToHeight => "thigh-to-height",
            Self::CalfToHeight => "calf-to-height",
            Self::BodyFatPct => "body fat %",
        }
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for MetricKey {
    type Err = String;

    /// Case-insensitive, ignoring `-` and `_`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fold = |name: &str| -> String {
            name.chars()
                .filter(|c| *c != '-' && *c != '_')
                .flat_map(char::to_lowercase)
                .collect()
        };
        let wanted = fold(s.trim());
        Self::ALL
            .into_iter()
            .find(|key| key.aliases().iter().any(|alias| fold(alias) == wanted))
            .ok_or_else(|| format!("unknown metric '{}'", s))
    }
}

/// Which end of a metric's scale counts as better.
///
/// Only `"lower"` changes behavior; any other label is preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BetterDirection {
    Lower,
    Other(String),
}

impl BetterDirection {
    pub fn is_lower(&self) -> bool {
        matches!(self, Self::Lower)
    }

    /// Percentile as shown to the user: `100 - p` when lower is better.
    pub fn display_percentile(&self, percentile: f64) -> f64 {
        match self {
            Self::Lower => 100.0 - percentile,
            Self::Other(_) => percentile,
        }
    }
}

impl From<String> for BetterDirection {
    fn from(label: String) -> Self {
        if label.trim().eq_ignore_ascii_case("lower") {
            Self::Lower
        } else {
            Self::Other(label)
        }
    }
}

impl From<BetterDirection> for String {
    fn from(direction: BetterDirection) -> Self {
        match direction {
            BetterDirection::Lower => "lower".to_string(),
            BetterDirection::Other(label) => label,
        }
    }
}

/// Normalized statistical profile of one metric within one dataset.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalMetric {
    pub unit: Option<String>,
    /// Sorted ascending; never empty when present.
    pub raw_samples: Option<Vec<f64>>,
    /// Deduplicated by value, sorted by percentile.
    pub quantile_points: Vec<QuantilePoint>,
    pub cut_threshold: Option<f64>,
    pub better_direction: Option<BetterDirection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joint: Option<JointTable>,
}

impl CanonicalMetric {
    /// Percentile rank of `value` against this metric.
    pub fn percentile_rank(&self, value: f64) -> PercentileRank {
        percentile_rank(self.raw_samples.as_deref(), &self.quantile_points, value)
    }

    pub fn is_lower_better(&self) -> bool {
        self.better_direction
            .as_ref()
            .is_some_and(BetterDirection::is_lower)
    }

    /// Apply the direction policy to a resolved percentile.
    pub fn display_percentile(&self, percentile: f64) -> f64 {
        match &self.better_direction {
            Some(direction) => direction.display_percentile(percentile),
            None => percentile,
        }
    }

    /// Value recorded for an exact percentile, if any.
    pub fn quantile_at(&self, percentile: f64) -> Option<f64> {
        self.quantile_points
            .iter()
            .find(|point| point.percentile == percentile)
            .map(|point| point.value)
    }

    pub fn summary(&self) -> Option<SampleSummary> {
        self.raw_samples.as_deref().and_then(SampleSummary::compute)
    }

    /// Copy of this metric carrying `joint`.
    pub fn with_joint(self, joint: JointTable) -> Self {
        Self {
            joint: Some(joint),
            ..self
        }
    }

    /// Metric with no distribution data, only a joint annex.
    pub(crate) fn joint_only(source: Option<&Value>, joint: JointTable) -> Self {
        let source = source.filter(|value| value.is_object());
        Self {
            unit: source.and_then(read_unit),
            better_direction: source.and_then(read_direction),
            joint: Some(joint),
            ..Self::default()
        }
    }
}

/// Parse a `p<major>[_<minor>]` key into a percentile.
///
/// The minor digits are a decimal fraction: `p97_5` is 97.5.
pub fn parse_percentile_key(key: &str) -> Option<f64> {
    let captures = PERCENTILE_KEY.captures(key.trim())?;
    let major = captures.get(1)?.as_str();
    let text = match captures.get(2) {
        Some(minor) => format!("{}.{}", major, minor.as_str()),
        None => major.to_string(),
    };
    text.parse().ok()
}

/// Normalize one metric block. Non-objects yield `None`.
pub fn normalize_metric(value: &Value) -> Option<CanonicalMetric> {
    let object = value.as_object()?;

    Some(CanonicalMetric {
        unit: read_unit(value),
        raw_samples: read_raw_samples(object),
        quantile_points: canonical_quantiles(collect_quantile_points(object)),
        cut_threshold: first_key(value, aliases::CUT).and_then(to_number),
        better_direction: read_direction(value),
        joint: None,
    })
}

/// Every `(percentile, value)` pair found in a section, in discovery order.
///
/// Percentile-named keys come first, then entries of any `quantiles` or
/// `percentiles` table. Points outside `[0, 100]` are dropped.
pub(crate) fn collect_quantile_points(object: &Map<String, Value>) -> Vec<QuantilePoint> {
    let mut points = Vec::new();

    for (key, value) in object {
        if let (Some(percentile), Some(value)) = (parse_percentile_key(key), to_number(value)) {
            points.push(QuantilePoint::new(percentile, value));
        }
    }

    for (key, table) in object {
        let folded = key.trim().to_lowercase();
        if aliases::QUANTILE_TABLE.contains(&folded.as_str()) {
            read_quantile_table(table, &mut points);
        }
    }

    points.retain(|point| (0.0..=100.0).contains(&point.percentile));
    points
}

fn read_quantile_table(table: &Value, points: &mut Vec<QuantilePoint>) {
    match table {
        Value::Array(entries) => {
            for entry in entries {
                let percentile = first_key(entry, aliases::QUANTILE_PERCENTILE).and_then(to_number);
                let value = first_key(entry, aliases::QUANTILE_VALUE).and_then(to_number);
                if let (Some(percentile), Some(value)) = (percentile, value) {
                    points.push(QuantilePoint::new(percentile, value));
                }
            }
        }
        Value::Object(entries) => {
            for (key, value) in entries {
                let percentile = parse_percentile_key(key).or_else(|| key.trim().parse().ok());
                if let (Some(percentile), Some(value)) = (percentile, to_number(value)) {
                    points.push(QuantilePoint::new(percentile, value));
                }
            }
        }
        _ => {}
    }
}

/// Deduplicate by value (highest percentile wins) and sort by percentile.
fn canonical_quantiles(points: Vec<QuantilePoint>) -> Vec<QuantilePoint> {
    let mut points = dedupe_by_value(&points);
    points.sort_by(|a, b| {
        a.percentile
            .total_cmp(&b.percentile)
            .then(a.value.total_cmp(&b.value))
    });
    points
}

fn read_raw_samples(object: &Map<String, Value>) -> Option<Vec<f64>> {
    let entries = aliases::RAW_SAMPLES
        .iter()
        .find_map(|key| object.get(*key).and_then(Value::as_array))?;
    let mut samples: Vec<f64> = entries.iter().filter_map(to_number).collect();
    if samples.is_empty() {
        return None;
    }
    samples.sort_by(|a, b| a.total_cmp(b));
    Some(samples)
}

fn read_unit(value: &Value) -> Option<String> {
    first_key(value, aliases::UNIT)
        .and_then(non_empty_str)
        .map(str::to_string)
}

fn read_direction(value: &Value) -> Option<BetterDirection> {
    first_key(value, aliases::BETTER_DIRECTION)
        .and_then(non_empty_str)
        .map(|label| BetterDirection::from(label.to_string()))
}
