//! Memoized dataset loading.
//!
//! Every manifest and file is fetched at most once per loader until
//! [`DatasetLoader::reset`]. Concurrent requests for the same path wait on a
//! shared [`OnceCell`], so they collapse into a single fetch. Failures are
//! logged and cached as `None` like successes.

use crate::config::LoaderConfig;
use crate::error::LoadError;
use crate::fetch::{DatasetFetcher, FsFetcher};
use crate::manifest::{ManifestEntry, parse_model_manifest, parse_population_manifest};
use serde_json::Value;
use somanorm_dataset::{CanonicalDataset, CohortRegistry, attach_joint_to_model, normalize_dataset};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::OnceCell;
use tracing::{debug, warn};

type Slot<T> = Arc<OnceCell<T>>;

/// Dataset id that means "no dataset selected".
pub const DATASET_OFF: &str = "off";

pub struct DatasetLoader<F = FsFetcher> {
    config: LoaderConfig,
    fetcher: F,
    registry: Arc<CohortRegistry>,
    population_manifest: Mutex<Slot<Vec<ManifestEntry>>>,
    model_manifest: Mutex<Slot<Vec<ManifestEntry>>>,
    populations: Mutex<HashMap<String, Slot<Option<Arc<CanonicalDataset>>>>>,
    models: Mutex<HashMap<String, Slot<Option<Arc<Value>>>>>,
}

impl DatasetLoader<FsFetcher> {
    pub fn new(config: LoaderConfig) -> Self {
        let fetcher = FsFetcher::new(config.data_root.clone());
        Self::with_fetcher(config, fetcher)
    }
}

impl<F: DatasetFetcher> DatasetLoader<F> {
    pub fn with_fetcher(config: LoaderConfig, fetcher: F) -> Self {
        Self {
            config,
            fetcher,
            registry: Arc::new(CohortRegistry::new()),
            population_manifest: Mutex::default(),
            model_manifest: Mutex::default(),
            populations: Mutex::default(),
            models: Mutex::default(),
        }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Registry that every loaded joint annex is registered into.
    pub fn registry(&self) -> &Arc<CohortRegistry> {
        &self.registry
    }

    /// Population datasets listed in the manifest; empty when it is missing.
    pub async fn population_list(&self) -> Vec<ManifestEntry> {
        let slot = current(&self.population_manifest);
        slot.get_or_init(|| async {
            let path = self.config.population_manifest.as_str();
            match self.fetcher.fetch(path).await {
                Ok(manifest) => parse_population_manifest(&manifest),
                Err(e) => {
                    warn!(file = %path, error = %e, "Dataset manifest unavailable");
                    Vec::new()
                }
            }
        })
        .await
        .clone()
    }

    /// Model datasets from the first candidate manifest with a usable list.
    pub async fn model_list(&self) -> Vec<ManifestEntry> {
        let slot = current(&self.model_manifest);
        slot.get_or_init(|| async {
            match self.scan_model_manifests().await {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(error = %e, "Model manifest unavailable");
                    Vec::new()
                }
            }
        })
        .await
        .clone()
    }

    async fn scan_model_manifests(&self) -> Result<Vec<ManifestEntry>, LoadError> {
        for candidate in &self.config.model_manifest_candidates {
            match self.fetcher.fetch(candidate).await {
                Ok(manifest) => match parse_model_manifest(&manifest) {
                    Some(entries) => return Ok(entries),
                    None => debug!(file = %candidate, "Model manifest has no dataset list"),
                },
                Err(e) => debug!(file = %candidate, error = %e, "Model manifest candidate skipped"),
            }
        }
        Err(LoadError::ManifestUnavailable(
            self.config.model_manifest_candidates.join(", "),
        ))
    }

    /// Loads and normalizes a population file. Its joint annex, if any, is
    /// registered as a side effect.
    pub async fn load_population(&self, file: &str) -> Option<Arc<CanonicalDataset>> {
        let slot = slot_for(&self.populations, file);
        slot.get_or_init(|| async {
            let raw = self.fetch_logged(file).await?;
            log_diagnostics(&raw, file);
            normalize_dataset(&raw, &self.registry).map(Arc::new)
        })
        .await
        .clone()
    }

    /// Resolves `id` through the population manifest and loads its file.
    pub async fn load_population_by_id(&self, id: &str) -> Option<Arc<CanonicalDataset>> {
        let id = id.trim();
        if id.is_empty() || id == DATASET_OFF {
            return None;
        }
        let entries = self.population_list().await;
        let Some(entry) = entries.iter().find(|entry| entry.id == id) else {
            warn!(error = %LoadError::UnknownDataset(id.to_string()), "Dataset lookup failed");
            return None;
        };
        self.load_population(&entry.file).await
    }

    /// Loads a model file. When it has a `metrics` section the joint annex is
    /// attached and registered.
    pub async fn load_model(&self, file: &str) -> Option<Arc<Value>> {
        let slot = slot_for(&self.models, file);
        slot.get_or_init(|| async {
            let raw = self.fetch_logged(file).await?;
            log_diagnostics(&raw, file);
            Some(Arc::new(attach_joint_to_model(&raw, &self.registry)))
        })
        .await
        .clone()
    }

    /// Drops every cached manifest and file and empties the registry.
    pub fn reset(&self) {
        *lock(&self.population_manifest) = Slot::default();
        *lock(&self.model_manifest) = Slot::default();
        lock(&self.populations).clear();
        lock(&self.models).clear();
        self.registry.reset();
        debug!("Dataset caches reset");
    }

    async fn fetch_logged(&self, file: &str) -> Option<Value> {
        match self.fetcher.fetch(file).await {
            Ok(raw) => Some(raw),
            Err(e) => {
                warn!(file = %file, error = %e, "Dataset load failed");
                None
            }
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn current<T>(slot: &Mutex<Slot<T>>) -> Slot<T> {
    Arc::clone(&lock(slot))
}

fn slot_for<T>(cache: &Mutex<HashMap<String, Slot<T>>>, file: &str) -> Slot<T> {
    Arc::clone(lock(cache).entry(file.to_string()).or_default())
}

fn log_diagnostics(raw: &Value, file: &str) {
    let Some(metrics) = raw.get("metrics").and_then(Value::as_object) else {
        return;
    };
    let dataset = raw.get("id").and_then(Value::as_str).unwrap_or(file);
    for (metric, value) in metrics {
        if let Some(diagnostic) = value.get("diagnostic").filter(|d| !d.is_null()) {
            debug!(dataset = %dataset, metric = %metric, diagnostic = %diagnostic, "Dataset QA");
        }
    }
}
