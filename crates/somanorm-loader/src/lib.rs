//! Loading boundary for somanorm datasets.
//!
//! Reads the population and model manifests, fetches dataset files through a
//! [`DatasetFetcher`] and memoizes the normalized results. Load failures are
//! logged and resolve to empty results; nothing here returns an error to the
//! caller.

pub mod config;
pub mod error;
pub mod fetch;
pub mod loader;
pub mod manifest;

pub use config::LoaderConfig;
pub use error::LoadError;
pub use fetch::{DatasetFetcher, FsFetcher};
pub use loader::{DATASET_OFF, DatasetLoader};
pub use manifest::{ManifestEntry, parse_model_manifest, parse_population_manifest};
