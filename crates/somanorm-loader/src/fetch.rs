//! Source of raw JSON documents.

use crate::error::LoadError;
use serde_json::Value;
use std::future::Future;
use std::path::PathBuf;

/// Fetches a JSON document by relative path.
pub trait DatasetFetcher: Send + Sync {
    fn fetch(&self, path: &str) -> impl Future<Output = Result<Value, LoadError>> + Send;
}

/// Reads JSON files below a root directory.
#[derive(Debug, Clone)]
pub struct FsFetcher {
    root: PathBuf,
}

impl FsFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }
}

impl DatasetFetcher for FsFetcher {
    async fn fetch(&self, path: &str) -> Result<Value, LoadError> {
        let full = self.resolve(path);
        let bytes = tokio::fs::read(&full).await.map_err(|source| LoadError::Io {
            path: full.display().to_string(),
            source,
        })?;
        serde_json::from_slice(&bytes).map_err(|source| LoadError::Json {
            path: full.display().to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_reads_json_below_root() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("assets")).unwrap();
        std::fs::write(dir.path().join("assets/a.json"), r#"{"id": "a"}"#).unwrap();

        let fetcher = FsFetcher::new(dir.path());
        let value = fetcher.fetch("/assets/a.json").await.unwrap();
        assert_eq!(value["id"], "a");
    }

    #[tokio::test]
    async fn test_missing_and_invalid_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("bad.json"), "{not json").unwrap();
        let fetcher = FsFetcher::new(dir.path());

        assert!(matches!(fetcher.fetch("nope.json").await, Err(LoadError::Io { .. })));
        assert!(matches!(fetcher.fetch("bad.json").await, Err(LoadError::Json { .. })));
    }
}
