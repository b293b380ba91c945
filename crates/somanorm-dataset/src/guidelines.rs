//! Reference-population guidance: cohort preference, cut-offs and bands.

use crate::joint::JointTable;
use crate::metric::MetricKey;
use crate::normalize::CanonicalDataset;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reference population a user compares against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reference {
    Female,
    Male,
    #[default]
    Neutral,
}

impl Reference {
    /// Cohort keys tried, in order, when picking joint parameters.
    pub fn cohort_preference(&self) -> &'static [&'static str] {
        match self {
            Self::Female => &["cisFemale", "female", "combined", "default"],
            Self::Male => &["cisMale", "male", "combined", "default"],
            Self::Neutral => &["combined", "neutral", "default"],
        }
    }

    /// Cohort of `joint` to use for this reference.
    ///
    /// Falls back to the first cohort when no preferred key is present.
    pub fn resolve_cohort<'a>(&self, joint: &'a JointTable) -> Option<&'a str> {
        self.cohort_preference()
            .iter()
            .find_map(|key| joint.get_key_value(*key).map(|(k, _)| k.as_str()))
            .or_else(|| joint.keys().next().map(String::as_str))
    }

    /// Waist-to-hip metric matching this reference.
    pub fn whr_metric(&self) -> MetricKey {
        match self {
            Self::Female => MetricKey::WaistToHipFemale,
            Self::Male => MetricKey::WaistToHipMale,
            Self::Neutral => MetricKey::WaistToHip,
        }
    }

    /// Cut-off shown next to waist ratios. Neutral references use the
    /// waist-to-height cut.
    pub fn whr_cut(&self, dataset: &CanonicalDataset) -> Option<f64> {
        match self {
            Self::Female => dataset.whr_female_cut,
            Self::Male => dataset.whr_male_cut,
            Self::Neutral => dataset.waist_to_height_cut,
        }
    }

    pub fn bmi_guideline(&self) -> BmiGuideline {
        BmiGuideline::default()
    }

    pub fn body_fat_guideline(&self) -> BodyFatGuideline {
        match self {
            Self::Female => BodyFatGuideline {
                low: 20.0,
                optimal_high: 32.0,
                caution: 38.0,
            },
            Self::Male => BodyFatGuideline {
                low: 10.0,
                optimal_high: 25.0,
                caution: 30.0,
            },
            Self::Neutral => BodyFatGuideline {
                low: 15.0,
                optimal_high: 28.0,
                caution: 33.0,
            },
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Female => write!(f, "female"),
            Self::Male => write!(f, "male"),
            Self::Neutral => write!(f, "neutral"),
        }
    }
}

impl FromStr for Reference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "female" => Ok(Self::Female),
            "male" => Ok(Self::Male),
            "neutral" | "" => Ok(Self::Neutral),
            other => Err(format!("unknown reference '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BmiBand {
    Underweight,
    Normal,
    /// At or above the Asia-Pacific risk threshold.
    AsianRisk,
    Overweight,
    Obese,
}

/// BMI thresholds (kg/m²).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BmiGuideline {
    pub underweight: f64,
    pub asian_risk: f64,
    pub overweight: f64,
    pub obesity: f64,
}

impl Default for BmiGuideline {
    fn default() -> Self {
        Self {
            underweight: 18.5,
            asian_risk: 23.0,
            overweight: 25.0,
            obesity: 30.0,
        }
    }
}

impl BmiGuideline {
    pub fn classify(&self, bmi: f64) -> Option<BmiBand> {
        if !bmi.is_finite() {
            return None;
        }
        Some(if bmi < self.underweight {
            BmiBand::Underweight
        } else if bmi >= self.obesity {
            BmiBand::Obese
        } else if bmi >= self.overweight {
            BmiBand::Overweight
        } else if bmi >= self.asian_risk {
            BmiBand::AsianRisk
        } else {
            BmiBand::Normal
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BodyFatBand {
    Low,
    Optimal,
    Elevated,
    High,
}

/// Body-fat percentage thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyFatGuideline {
    pub low: f64,
    pub optimal_high: f64,
    pub caution: f64,
}

impl BodyFatGuideline {
    pub fn classify(&self, body_fat_pct: f64) -> Option<BodyFatBand> {
        if !body_fat_pct.is_finite() {
            return None;
        }
        Some(if body_fat_pct < self.low {
            BodyFatBand::Low
        } else if body_fat_pct > self.caution {
            BodyFatBand::High
        } else if body_fat_pct > self.optimal_high {
            BodyFatBand::Elevated
        } else {
            BodyFatBand::Optimal
        })
    }
}
