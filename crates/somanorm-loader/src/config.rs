use std::path::PathBuf;

pub const DEFAULT_POPULATION_MANIFEST: &str = "assets/data/datasets.json";

pub const DEFAULT_MODEL_MANIFESTS: [&str; 3] = [
    "assets/data/models/manifest.json",
    "assets/data/models/datasets.json",
    "assets/data/models.json",
];

/// Where dataset files live and which manifests to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Directory that manifest and dataset paths are relative to.
    pub data_root: PathBuf,
    pub population_manifest: String,
    /// Tried in order; the first one with a dataset list wins.
    pub model_manifest_candidates: Vec<String>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("."),
            population_manifest: DEFAULT_POPULATION_MANIFEST.to_string(),
            model_manifest_candidates: DEFAULT_MODEL_MANIFESTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl LoaderConfig {
    /// Defaults overridden by `SOMANORM_DATA_ROOT`,
    /// `SOMANORM_POPULATION_MANIFEST` and `SOMANORM_MODEL_MANIFESTS`
    /// (comma-separated).
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(root) = non_empty_var("SOMANORM_DATA_ROOT") {
            config.data_root = PathBuf::from(root);
        }
        if let Some(manifest) = non_empty_var("SOMANORM_POPULATION_MANIFEST") {
            config.population_manifest = manifest;
        }
        if let Some(candidates) = non_empty_var("SOMANORM_MODEL_MANIFESTS") {
            let candidates: Vec<String> = candidates
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            if !candidates.is_empty() {
                config.model_manifest_candidates = candidates;
            }
        }

        config
    }

    pub fn with_data_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.data_root = root.into();
        self
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
