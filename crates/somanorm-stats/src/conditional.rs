//! Conditional distribution of one correlated normal variable given another.

use crate::normal::normal_cdf;
use serde::{Deserialize, Serialize};

/// Floor for the conditional standard deviation.
pub const MIN_SIGMA: f64 = 1e-6;

/// Correlation coefficients are kept strictly inside (-1, 1).
pub const RHO_LIMIT: f64 = 0.999_999;

/// Mean and standard deviation of `S | H = h` for a bivariate normal `(H, S)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalParams {
    pub mu_cond: f64,
    pub sigma_cond: f64,
}

impl ConditionalParams {
    pub fn z_score(&self, observed: f64) -> f64 {
        (observed - self.mu_cond) / self.sigma_cond
    }

    /// Percentile (0-100) of `observed` under the conditional distribution.
    pub fn percentile(&self, observed: f64) -> f64 {
        normal_cdf(self.z_score(observed)) * 100.0
    }
}

/// Conditional mean and sigma of the second variable given `h`.
///
/// `mu_cond = mu_s + rho * (sigma_s / sigma_h) * (h - mu_h)` and
/// `sigma_cond = max(MIN_SIGMA, sigma_s * sqrt(max(0, 1 - rho^2)))`.
/// Returns `None` on any non-finite input or a non-positive marginal sigma.
pub fn conditional_params(
    mu_h: f64,
    sigma_h: f64,
    mu_s: f64,
    sigma_s: f64,
    rho: f64,
    h: f64,
) -> Option<ConditionalParams> {
    let all_finite = [mu_h, sigma_h, mu_s, sigma_s, rho, h]
        .iter()
        .all(|v| v.is_finite());
    if !all_finite || sigma_h <= 0.0 || sigma_s <= 0.0 {
        return None;
    }

    let mu_cond = mu_s + rho * (sigma_s / sigma_h) * (h - mu_h);
    let variance = (1.0 - rho * rho).max(0.0);
    let sigma_cond = (sigma_s * variance.sqrt()).max(MIN_SIGMA);

    Some(ConditionalParams {
        mu_cond,
        sigma_cond,
    })
}

/// Clamp a correlation coefficient into `[-RHO_LIMIT, RHO_LIMIT]`.
///
/// Non-finite input yields `None`.
pub fn clamp_rho(rho: f64) -> Option<f64> {
    rho.is_finite().then(|| rho.clamp(-RHO_LIMIT, RHO_LIMIT))
}
