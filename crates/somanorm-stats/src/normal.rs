//! Standard normal distribution primitives.
//!
//! These are closed-form approximations that are accurate to well below the
//! resolution any anthropometric percentile table carries.

use serde::{Deserialize, Serialize};

/// z-score of the 5th percentile.
pub const Z5: f64 = -1.644_853_626_9;
/// z-score of the 95th percentile.
pub const Z95: f64 = 1.644_853_626_9;
/// z-score of the 10th percentile.
pub const Z10: f64 = -1.281_551_565_5;
/// z-score of the 90th percentile.
pub const Z90: f64 = 1.281_551_565_5;

// Acklam's rational approximation coefficients
const ACKLAM_A: [f64; 6] = [
    -3.969_683_028_665_376e1,
    2.209_460_984_245_205e2,
    -2.759_285_104_469_687e2,
    1.383_577_518_672_69e2,
    -3.066_479_806_614_716e1,
    2.506_628_277_459_239,
];
const ACKLAM_B: [f64; 5] = [
    -5.447_609_879_822_406e1,
    1.615_858_368_580_409e2,
    -1.556_989_798_598_866e2,
    6.680_131_188_771_972e1,
    -1.328_068_155_288_572e1,
];
const ACKLAM_C: [f64; 6] = [
    -7.784_894_002_430_293e-3,
    -3.223_964_580_411_365e-1,
    -2.400_758_277_161_838,
    -2.549_732_539_343_734,
    4.374_664_141_464_968,
    2.938_163_982_698_783,
];
const ACKLAM_D: [f64; 4] = [
    7.784_695_709_041_462e-3,
    3.224_671_290_700_398e-1,
    2.445_134_137_142_996,
    3.754_408_661_907_416,
];
const P_LOW: f64 = 0.02425;
const P_HIGH: f64 = 1.0 - P_LOW;

/// Standard normal CDF using the Abramowitz-Stegun 7.1.26 approximation of erf.
///
/// `+inf` maps to 1, `-inf` to 0, zero to exactly 0.5 and NaN stays NaN. The
/// result is clamped to `[0, 1]`.
pub fn normal_cdf(z: f64) -> f64 {
    if z.is_nan() {
        return f64::NAN;
    }
    if z == f64::INFINITY {
        return 1.0;
    }
    if z == f64::NEG_INFINITY {
        return 0.0;
    }
    if z == 0.0 {
        return 0.5;
    }

    let sign = if z < 0.0 { -1.0 } else { 1.0 };
    let x = z.abs() / std::f64::consts::SQRT_2;
    let t = 1.0 / (1.0 + 0.327_591_1 * x);
    let poly = ((((1.061_405_429 * t - 1.453_152_027) * t + 1.421_413_741) * t - 0.284_496_736)
        * t
        + 0.254_829_592)
        * t;
    let erf = 1.0 - poly * (-x * x).exp();

    (0.5 * (1.0 + sign * erf)).clamp(0.0, 1.0)
}

/// Standard normal quantile function (Acklam).
///
/// `p <= 0` maps to `-inf`, `p >= 1` to `+inf` and NaN stays NaN.
pub fn normal_inv_cdf(p: f64) -> f64 {
    if p.is_nan() {
        return f64::NAN;
    }
    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }

    if p < P_LOW {
        let q = (-2.0 * p.ln()).sqrt();
        return tail(q);
    }
    if p > P_HIGH {
        let q = (-2.0 * (1.0 - p).ln()).sqrt();
        return -tail(q);
    }

    let q = p - 0.5;
    let r = q * q;
    let [a0, a1, a2, a3, a4, a5] = ACKLAM_A;
    let [b0, b1, b2, b3, b4] = ACKLAM_B;
    (((((a0 * r + a1) * r + a2) * r + a3) * r + a4) * r + a5) * q
        / (((((b0 * r + b1) * r + b2) * r + b3) * r + b4) * r + 1.0)
}

fn tail(q: f64) -> f64 {
    let [c0, c1, c2, c3, c4, c5] = ACKLAM_C;
    let [d0, d1, d2, d3] = ACKLAM_D;
    (((((c0 * q + c1) * q + c2) * q + c3) * q + c4) * q + c5)
        / ((((d0 * q + d1) * q + d2) * q + d3) * q + 1.0)
}

/// Symmetric percentile pair used to fit a normal from sparse quantiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TailPair {
    /// 5th and 95th percentiles.
    P5P95,
    /// 10th and 90th percentiles.
    P10P90,
}

impl TailPair {
    /// Pairs in order of preference.
    pub const PREFERENCE: [TailPair; 2] = [TailPair::P5P95, TailPair::P10P90];

    pub fn percentiles(&self) -> (f64, f64) {
        match self {
            Self::P5P95 => (5.0, 95.0),
            Self::P10P90 => (10.0, 90.0),
        }
    }

    pub fn z_scores(&self) -> (f64, f64) {
        match self {
            Self::P5P95 => (Z5, Z95),
            Self::P10P90 => (Z10, Z90),
        }
    }
}

/// Normal fit of a marginal distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalApproximation {
    pub mu: f64,
    /// Always strictly positive.
    pub sigma: f64,
}

impl NormalApproximation {
    pub fn z_score(&self, x: f64) -> f64 {
        (x - self.mu) / self.sigma
    }

    /// Value at percentile `p` (0-100).
    pub fn quantile(&self, p: f64) -> f64 {
        self.mu + self.sigma * normal_inv_cdf(p / 100.0)
    }
}

/// Fit a normal from the median plus one symmetric percentile pair.
///
/// Each tail contributes one sigma estimate; only positive estimates are kept
/// and averaged. Returns `None` when the median is not finite or neither tail
/// yields a positive estimate.
pub fn fit_normal_from_percentiles(
    q_low: Option<f64>,
    q50: f64,
    q_high: Option<f64>,
    z_low: f64,
    z_high: f64,
) -> Option<NormalApproximation> {
    if !q50.is_finite() {
        return None;
    }
    let mu = q50;

    let low = q_low
        .filter(|q| q.is_finite() && z_low.is_finite() && z_low != 0.0)
        .map(|q| (mu - q) / -z_low);
    let high = q_high
        .filter(|q| q.is_finite() && z_high.is_finite() && z_high != 0.0)
        .map(|q| (q - mu) / z_high);

    let estimates: Vec<f64> = [low, high].into_iter().flatten().filter(|s| *s > 0.0).collect();
    if estimates.is_empty() {
        return None;
    }

    let sigma = estimates.iter().sum::<f64>() / estimates.len() as f64;
    (sigma > 0.0).then_some(NormalApproximation { mu, sigma })
}
