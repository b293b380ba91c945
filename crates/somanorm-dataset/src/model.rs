//! Range lookup in model-segment payloads.
//!
//! Model datasets describe target ranges per segment type (flat/print,
//! runway) and metric, in whichever nesting their authors preferred. The
//! lookup searches every known container and both nesting orders.

use crate::aliases;
use crate::value::to_number;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Target range of one metric for one model segment.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelRange {
    pub lo: Option<f64>,
    pub hi: Option<f64>,
    pub avg: Option<f64>,
    pub sd: Option<f64>,
    pub q1: Option<f64>,
    pub q3: Option<f64>,
}

impl ModelRange {
    /// Whether `value` lies inside `[lo, hi]`, treating a missing bound as open.
    pub fn contains(&self, value: f64) -> bool {
        self.lo.is_none_or(|lo| value >= lo) && self.hi.is_none_or(|hi| value <= hi)
    }
}

/// Segment type keys to try for a requested type.
///
/// Any spelling of a known family expands to the whole family; unknown types
/// are tried as given and lowercased.
pub fn type_keys(model_type: &str) -> Vec<String> {
    let trimmed = model_type.trim();
    let folded = trimmed.to_lowercase();
    let family = aliases::MODEL_TYPES.iter().find(|(canonical, spellings)| {
        *canonical == folded || spellings.iter().any(|s| *s == trimmed || *s == folded)
    });
    match family {
        Some((_, spellings)) => spellings.iter().map(|s| s.to_string()).collect(),
        None => dedup(vec![trimmed.to_string(), folded]),
    }
}

/// Spellings of a metric key: as given, lowercase, snake_case, kebab-case and
/// with underscores removed.
pub fn metric_key_variants(metric: &str) -> Vec<String> {
    let separated = |separator: char| -> String {
        let mut out = String::with_capacity(metric.len() + 4);
        for c in metric.chars() {
            if c.is_ascii_uppercase() {
                out.push(separator);
                out.push(c.to_ascii_lowercase());
            } else {
                out.push(c);
            }
        }
        out
    };
    dedup(vec![
        metric.to_string(),
        metric.to_lowercase(),
        separated('_'),
        separated('-'),
        metric.replace('_', "").to_lowercase(),
    ])
}

fn dedup(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        if !item.is_empty() && !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

/// Read a range from `[lo, hi]` or an object with any range key spelling.
pub fn extract_range(candidate: &Value) -> Option<ModelRange> {
    match candidate {
        Value::Array(items) if items.len() >= 2 => {
            let lo = to_number(&items[0]);
            let hi = to_number(&items[1]);
            (lo.is_some() || hi.is_some()).then_some(ModelRange {
                lo,
                hi,
                ..ModelRange::default()
            })
        }
        Value::Object(object) => {
            let read = |keys: &[&str]| {
                keys.iter()
                    .find_map(|key| object.get(*key).and_then(to_number))
            };
            let range = ModelRange {
                lo: read(aliases::RANGE_LO),
                hi: read(aliases::RANGE_HI),
                avg: read(aliases::RANGE_AVG),
                sd: read(aliases::RANGE_SD),
                q1: read(aliases::RANGE_Q1),
                q3: read(aliases::RANGE_Q3),
            };
            (range != ModelRange::default()).then_some(range)
        }
        _ => None,
    }
}

/// Find the range of `metric` for segment `model_type`.
///
/// Returns `None` for blank arguments, non-object payloads or when no
/// container holds a usable range.
pub fn get_model_range(model: &Value, model_type: &str, metric: &str) -> Option<ModelRange> {
    let model = model.as_object()?;
    if model_type.trim().is_empty() || metric.trim().is_empty() {
        return None;
    }
    let types = type_keys(model_type);
    let metrics = metric_key_variants(metric.trim());

    aliases::MODEL_CONTAINERS
        .iter()
        .filter_map(|name| model.get(*name).and_then(Value::as_object))
        .find_map(|container| {
            type_first(container, &types, &metrics)
                .or_else(|| metric_first(container, &types, &metrics))
        })
}

/// `container[type][metric]`, `container[type].metrics[metric]` or
/// `container[type][i][metric]`.
fn type_first(container: &Map<String, Value>, types: &[String], metrics: &[String]) -> Option<ModelRange> {
    types.iter().find_map(|type_key| match container.get(type_key)? {
        Value::Array(entries) => entries.iter().filter_map(Value::as_object).find_map(|entry| {
            metrics
                .iter()
                .find_map(|metric| entry.get(metric).and_then(extract_range))
        }),
        Value::Object(section) => metrics.iter().find_map(|metric| {
            let candidate = section
                .get(metric)
                .filter(|v| !v.is_null())
                .or_else(|| section.get("metrics")?.get(metric));
            candidate.and_then(extract_range)
        }),
        _ => None,
    })
}

/// `container[metric][type]` (also with `-`/`_` swapped),
/// `container[metric].ranges[type]` or `container[metric][i][type]`.
fn metric_first(container: &Map<String, Value>, types: &[String], metrics: &[String]) -> Option<ModelRange> {
    metrics.iter().find_map(|metric| match container.get(metric)? {
        Value::Array(items) => items.iter().filter_map(Value::as_object).find_map(|item| {
            types
                .iter()
                .find_map(|type_key| item.get(type_key).and_then(extract_range))
        }),
        Value::Object(entry) => types.iter().find_map(|type_key| {
            let candidate = [
                type_key.clone(),
                type_key.replace('-', "_"),
                type_key.replace('_', "-"),
            ]
            .iter()
            .find_map(|key| entry.get(key).filter(|v| !v.is_null()))
            .or_else(|| entry.get("ranges")?.get(type_key.as_str()));
            candidate.and_then(extract_range)
        }),
        _ => None,
    })
}
