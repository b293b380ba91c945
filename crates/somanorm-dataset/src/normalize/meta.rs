//! Bibliographic metadata: sources, publication year, sample size.

use crate::aliases;
use crate::value::{first_key, get_path, non_empty_str};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use somanorm_stats::parse_float;
use std::fmt;
use std::sync::LazyLock;

static YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4}").expect("valid year pattern"));

/// A metadata field that is numeric when it can be, free text otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetMeta {
    pub sources: Vec<String>,
    pub year: Option<MetaValue>,
    pub sample_size: Option<MetaValue>,
}

impl DatasetMeta {
    pub fn extract(raw: &Value) -> Self {
        Self {
            sources: first_key(raw, aliases::SOURCES)
                .map(collect_source_titles)
                .unwrap_or_default(),
            year: extract_year(raw),
            sample_size: extract_sample_size(raw),
        }
    }
}

/// Source titles from a string, a structured entry or a list of either.
pub fn collect_source_titles(candidate: &Value) -> Vec<String> {
    match candidate {
        Value::Array(entries) => entries.iter().filter_map(source_title).collect(),
        other => source_title(other).into_iter().collect(),
    }
}

fn source_title(entry: &Value) -> Option<String> {
    let title = match entry {
        Value::Object(_) => first_key(entry, aliases::SOURCE_TITLE)?,
        other => other,
    };
    non_empty_str(title).map(str::to_string)
}

/// First finite number or non-blank string under `keys`, searching the
/// metadata containers in order.
fn extract_meta_value<'a>(raw: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    aliases::META_CONTAINERS
        .iter()
        .filter_map(|path| get_path(raw, path).filter(|c| c.is_object()))
        .find_map(|container| {
            keys.iter().find_map(|key| {
                container.get(*key).filter(|value| match value {
                    Value::Number(n) => n.as_f64().is_some_and(f64::is_finite),
                    Value::String(s) => !s.trim().is_empty(),
                    _ => false,
                })
            })
        })
}

/// Publication year: numbers as-is, otherwise the first four-digit run.
pub fn extract_year(raw: &Value) -> Option<MetaValue> {
    match extract_meta_value(raw, aliases::YEAR)? {
        Value::Number(n) => n.as_f64().map(MetaValue::Number),
        Value::String(s) => {
            let year = YEAR
                .find(s)
                .and_then(|m| m.as_str().parse().ok());
            Some(match year {
                Some(year) => MetaValue::Number(year),
                None => MetaValue::Text(s.trim().to_string()),
            })
        }
        _ => None,
    }
}

/// Sample size: numbers as-is, strings reduced to their digits and dots.
pub fn extract_sample_size(raw: &Value) -> Option<MetaValue> {
    match extract_meta_value(raw, aliases::SAMPLE_SIZE)? {
        Value::Number(n) => n.as_f64().map(MetaValue::Number),
        Value::String(s) => {
            let numeric: String = s.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();
            Some(match parse_float(&numeric) {
                Some(n) => MetaValue::Number(n),
                None => MetaValue::Text(s.trim().to_string()),
            })
        }
        _ => None,
    }
}
