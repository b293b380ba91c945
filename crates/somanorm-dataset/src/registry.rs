//! Registry of joint shoulder/height parameters keyed by cohort.
//!
//! Populated as a side effect of normalizing datasets and queried by
//! [`CohortRegistry::compute_conditional_shoulder`]. Later registrations for
//! the same cohort key replace earlier ones.

use crate::joint::JointEntry;
use serde::{Deserialize, Serialize};
use somanorm_stats::conditional_params;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tracing::debug;

/// Flags describing how a conditional shoulder result was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalFlags {
    /// The cohort has no correlation coefficient; nothing was computed.
    pub missing_rho: bool,
    /// The height was outside the cohort's tail range and was clamped.
    pub height_clamped: bool,
}

/// Shoulder-width position given height.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalShoulder {
    pub z: Option<f64>,
    /// Percentile 0-100; present exactly when `z` is.
    pub pr: Option<f64>,
    pub mu_cond: Option<f64>,
    pub sigma_cond: Option<f64>,
    pub flags: ConditionalFlags,
}

impl ConditionalShoulder {
    fn missing_rho() -> Self {
        Self {
            flags: ConditionalFlags {
                missing_rho: true,
                height_clamped: false,
            },
            ..Self::default()
        }
    }
}

impl JointEntry {
    /// Conditional shoulder distribution at `height` (cm), and the position
    /// of `shoulder` (cm) within it when given.
    ///
    /// Without a correlation coefficient the result only carries the
    /// `missing_rho` flag. Returns `None` for a non-finite height or
    /// degenerate parameters.
    pub fn conditional_shoulder(
        &self,
        height: f64,
        shoulder: Option<f64>,
    ) -> Option<ConditionalShoulder> {
        let Some(rho) = self.rho.filter(|r| r.is_finite()) else {
            return Some(ConditionalShoulder::missing_rho());
        };
        if !height.is_finite() {
            return None;
        }

        let (working_height, height_clamped) = self.height_range.clamp(height);
        let params = conditional_params(
            self.mu_height,
            self.sigma_height,
            self.mu_shoulder,
            self.sigma_shoulder,
            rho,
            working_height,
        )?;

        let z = shoulder
            .filter(|s| s.is_finite())
            .map(|s| params.z_score(s));
        Some(ConditionalShoulder {
            z,
            pr: shoulder
                .filter(|s| s.is_finite())
                .map(|s| params.percentile(s)),
            mu_cond: Some(params.mu_cond),
            sigma_cond: Some(params.sigma_cond),
            flags: ConditionalFlags {
                missing_rho: false,
                height_clamped,
            },
        })
    }
}

/// Cohort key to joint parameters, shared across dataset loads.
#[derive(Debug, Default)]
pub struct CohortRegistry {
    entries: RwLock<HashMap<String, JointEntry>>,
}

impl CohortRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `entry` under `key` (trimmed). Blank keys are ignored.
    pub fn register(&self, key: &str, entry: JointEntry) {
        let key = key.trim();
        if key.is_empty() {
            return;
        }
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.insert(key.to_string(), entry).is_some() {
            debug!(cohort = key, "Replaced joint parameters");
        }
    }

    pub fn lookup(&self, key: &str) -> Option<JointEntry> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(key.trim()).copied()
    }

    /// Registered cohort keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget every registered cohort.
    pub fn reset(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Conditional shoulder query against a registered cohort.
    ///
    /// Unknown cohorts yield `None`; see [`JointEntry::conditional_shoulder`]
    /// for the rest.
    pub fn compute_conditional_shoulder(
        &self,
        height: f64,
        shoulder: Option<f64>,
        cohort_key: &str,
    ) -> Option<ConditionalShoulder> {
        let entry = self.lookup(cohort_key)?;
        entry.conditional_shoulder(height, shoulder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::joint::Bounds;
    use somanorm_stats::{LengthUnit, TailPair};

    fn entry(rho: Option<f64>) -> JointEntry {
        JointEntry {
            mu_height: 170.0,
            sigma_height: 7.0,
            mu_shoulder: 40.0,
            sigma_shoulder: 3.0,
            rho,
            unit: LengthUnit::Centimeter,
            height_range: Bounds { low: 158.0, high: 182.0 },
            shoulder_range: Bounds { low: 35.0, high: 45.0 },
            height_percentiles: TailPair::P5P95,
            shoulder_percentiles: TailPair::P5P95,
        }
    }

    #[test]
    fn test_unknown_cohort() {
        let registry = CohortRegistry::new();
        assert!(registry.compute_conditional_shoulder(170.0, Some(40.0), "cisMale").is_none());
    }

    #[test]
    fn test_at_mean_height() {
        let registry = CohortRegistry::new();
        registry.register("cisMale", entry(Some(0.6)));

        let result = registry
            .compute_conditional_shoulder(170.0, Some(40.0), " cisMale ")
            .unwrap();
        assert!((result.mu_cond.unwrap() - 40.0).abs() < 1e-12);
        assert!((result.sigma_cond.unwrap() - 2.4).abs() < 1e-12);
        assert_eq!(result.z, Some(0.0));
        assert_eq!(result.pr, Some(50.0));
        assert_eq!(result.flags, ConditionalFlags::default());
    }

    #[test]
    fn test_without_shoulder() {
        let registry = CohortRegistry::new();
        registry.register("combined", entry(Some(0.6)));
        let result = registry
            .compute_conditional_shoulder(177.0, None, "combined")
            .unwrap();
        assert!(result.z.is_none());
        assert!(result.pr.is_none());
        assert!((result.mu_cond.unwrap() - 41.8).abs() < 1e-9);
    }

    #[test]
    fn test_height_clamped_to_range() {
        let registry = CohortRegistry::new();
        registry.register("cisFemale", entry(Some(0.5)));

        let clamped = registry
            .compute_conditional_shoulder(200.0, Some(40.0), "cisFemale")
            .unwrap();
        let at_edge = registry
            .compute_conditional_shoulder(182.0, Some(40.0), "cisFemale")
            .unwrap();
        assert!(clamped.flags.height_clamped);
        assert!(!at_edge.flags.height_clamped);
        assert_eq!(clamped.mu_cond, at_edge.mu_cond);
    }

    #[test]
    fn test_missing_rho() {
        let registry = CohortRegistry::new();
        registry.register("default", entry(None));
        let result = registry
            .compute_conditional_shoulder(170.0, Some(40.0), "default")
            .unwrap();
        assert!(result.flags.missing_rho);
        assert!(result.z.is_none());
        assert!(result.mu_cond.is_none());
    }

    #[test]
    fn test_non_finite_height() {
        let registry = CohortRegistry::new();
        registry.register("default", entry(Some(0.2)));
        assert!(registry
            .compute_conditional_shoulder(f64::NAN, Some(40.0), "default")
            .is_none());
    }

    #[test]
    fn test_register_replace_and_reset() {
        let registry = CohortRegistry::new();
        registry.register("  ", entry(None));
        assert!(registry.is_empty());

        registry.register("a", entry(None));
        registry.register("a", entry(Some(0.1)));
        registry.register("b", entry(None));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.lookup("a").unwrap().rho, Some(0.1));
        assert_eq!(registry.keys(), vec!["a", "b"]);

        registry.reset();
        assert!(registry.is_empty());
        assert!(registry.lookup("a").is_none());
    }

    #[test]
    fn test_serialized_shape() {
        let value = serde_json::to_value(ConditionalShoulder::missing_rho()).unwrap();
        assert_eq!(value["flags"]["missingRho"], true);
        assert!(value["muCond"].is_null());
    }
}
