//! Statistical core for body-metric reference data.
//!
//! Everything here is pure and synchronous: unit handling, standard normal
//! primitives, conditional bivariate-normal parameters and percentile-rank
//! resolution.

pub mod conditional;
pub mod normal;
pub mod numeric;
pub mod percentile;
pub mod summary;

pub use conditional::{ConditionalParams, MIN_SIGMA, RHO_LIMIT, clamp_rho, conditional_params};
pub use normal::{
    NormalApproximation, TailPair, Z5, Z10, Z90, Z95, fit_normal_from_percentiles, normal_cdf,
    normal_inv_cdf,
};
pub use numeric::{LengthUnit, parse_float, to_centimeters, value_key};
pub use percentile::{
    ClampSide, PercentileMethod, PercentileRank, QuantilePoint, clamp_percentile,
    dedupe_by_value, interpolate_percentile, percentile_rank, upper_bound,
};
pub use summary::{SampleSummary, quantile_of_sorted};
