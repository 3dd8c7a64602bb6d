use thiserror::Error;

/// Result alias for `skill-cohort`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the clustering pipeline.
///
/// The first three variants are the pipeline-level failures a caller is
/// expected to branch on. Fewer than two clusters is not an error; the
/// silhouette is simply reported as absent.
#[derive(Debug, Error)]
pub enum Error {
    /// No profiles were supplied to `fit`.
    #[error("empty corpus: at least one profile is required")]
    EmptyCorpus,

    /// Document-frequency filters left no usable terms.
    #[error("insufficient vocabulary: {reason}")]
    InsufficientVocabulary {
        /// Which filter removed the last term.
        reason: String,
    },

    /// Algorithm name did not match any supported variant.
    #[error("unknown clustering algorithm '{0}' (expected kmeans, agglomerative or dbscan)")]
    UnknownAlgorithm(String),

    /// Clustering input was empty.
    #[error("empty input provided")]
    EmptyInput,

    /// Rows in a feature matrix have inconsistent dimensionality.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Found dimension.
        found: usize,
    },

    /// Requested cluster count is incompatible with the dataset.
    #[error("cannot create {requested} clusters from {n_items} items")]
    InvalidClusterCount {
        /// Requested count.
        requested: usize,
        /// Number of items.
        n_items: usize,
    },

    /// Invalid parameter value.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Error message.
        message: &'static str,
    },

    /// Artifact I/O failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Artifact (de)serialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn insufficient_vocabulary(reason: impl Into<String>) -> Self {
        Error::InsufficientVocabulary {
            reason: reason.into(),
        }
    }
}
