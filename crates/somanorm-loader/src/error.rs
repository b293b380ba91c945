use thiserror::Error;

/// Failure while fetching or decoding a dataset file.
///
/// Public load operations never surface these; they log them and resolve to
/// an empty result instead.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown dataset '{0}'")]
    UnknownDataset(String),

    #[error("no usable model manifest (tried {0})")]
    ManifestUnavailable(String),
}
