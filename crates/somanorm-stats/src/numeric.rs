//! Scalar coercion and length-unit normalization.

use serde::{Deserialize, Serialize};

/// Values above this are assumed to be millimetres when no unit is known.
pub const MILLIMETER_THRESHOLD: f64 = 300.0;

/// Values below this are assumed to be metres when no unit is known.
pub const METER_THRESHOLD: f64 = 3.0;

/// Significant digits used when comparing quantile values for equality.
const VALUE_KEY_DIGITS: usize = 12;

/// Linear measurement unit recognised in dataset sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    #[serde(rename = "mm")]
    Millimeter,
    #[serde(rename = "cm")]
    Centimeter,
    #[serde(rename = "m")]
    Meter,
}

impl LengthUnit {
    /// Detect a unit from a free-form label such as `"mm"`, `"Centimeters"`
    /// or `"m (standing)"`.
    pub fn detect(label: &str) -> Option<Self> {
        let normalized = label.trim().to_lowercase();
        if normalized.is_empty() {
            return None;
        }
        if normalized.contains("millimet") || normalized.contains("mm") {
            return Some(Self::Millimeter);
        }
        if normalized.contains("centimet") || normalized.contains("cm") {
            return Some(Self::Centimeter);
        }
        if normalized.contains("meter") || normalized.contains("metre") || normalized.contains("m ")
        {
            return Some(Self::Meter);
        }
        (normalized == "m").then_some(Self::Meter)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Millimeter => "mm",
            Self::Centimeter => "cm",
            Self::Meter => "m",
        }
    }
}

impl std::fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Convert a linear measurement to centimetres.
///
/// An explicit unit hint always wins. Without one, the magnitude decides:
/// values above 300 are treated as millimetres, values below 3 as metres and
/// anything in between (both bounds included) as centimetres already.
pub fn to_centimeters(value: f64, unit: Option<LengthUnit>) -> Option<f64> {
    if !value.is_finite() {
        return None;
    }
    let converted = match unit {
        Some(LengthUnit::Centimeter) => value,
        Some(LengthUnit::Millimeter) => value / 10.0,
        Some(LengthUnit::Meter) => value * 100.0,
        None if value > MILLIMETER_THRESHOLD => value / 10.0,
        None if value < METER_THRESHOLD => value * 100.0,
        None => value,
    };
    Some(converted)
}

/// Parse the longest numeric prefix of a string.
///
/// Leading whitespace is skipped and trailing garbage ignored, so `"12.5cm"`
/// yields `12.5`. Returns `None` when no digits lead the string or the result
/// is not finite.
pub fn parse_float(input: &str) -> Option<f64> {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }

    // Exponent only counts when at least one digit follows it
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Key used to treat two quantile values as identical.
///
/// Values are compared at 12 significant digits so that `0.1 + 0.2` and
/// `0.3` collapse into one point.
pub fn value_key(value: f64) -> String {
    let value = if value == 0.0 { 0.0 } else { value };
    format!("{:.*e}", VALUE_KEY_DIGITS - 1, value)
}
