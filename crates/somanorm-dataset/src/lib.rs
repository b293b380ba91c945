//! Dataset normalization for body-metric reference files.
//!
//! Population and model norm files come in many shapes. This crate reduces
//! them to canonical metrics, builds the joint shoulder/height annex and keeps
//! the cohort registry that conditional shoulder queries run against.

pub mod aliases;
pub mod badge;
pub mod cohort;
pub mod guidelines;
pub mod joint;
pub mod metric;
pub mod model;
pub mod normalize;
pub mod ratios;
pub mod registry;
pub mod value;

pub use badge::{BadgeState, PercentileBadge, percentile_badge};
pub use cohort::{determine_cohort_keys, gender_to_cohort};
pub use guidelines::{BmiBand, BmiGuideline, BodyFatBand, BodyFatGuideline, Reference};
pub use joint::{
    Bounds, JointEntry, JointTable, MarginalFit, build_shoulder_height_joint, extract_rho,
    parse_joint_entry, read_normal_approximation,
};
pub use metric::{BetterDirection, CanonicalMetric, MetricKey, normalize_metric, parse_percentile_key};
pub use model::{ModelRange, get_model_range};
pub use normalize::{
    CanonicalDataset, DatasetMeta, DatasetMetrics, MetaValue, ShoulderMedians,
    attach_joint_to_model, normalize_dataset,
};
pub use ratios::BodyMeasurements;
pub use registry::{CohortRegistry, ConditionalFlags, ConditionalShoulder};
pub use value::to_number;
