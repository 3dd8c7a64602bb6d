//! Pipeline configuration.
//!
//! Every field has a default, so an empty JSON object `{}` is a valid
//! configuration. Builders follow the `with_*` style used by the
//! clusterers themselves.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Cluster count used by k-based algorithms when none is configured.
pub const DEFAULT_N_CLUSTERS: usize = 4;

/// Clustering algorithm variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Algorithm {
    /// Centroid clustering (k-means with restarts).
    Kmeans,
    /// Ward-linkage agglomerative clustering.
    #[default]
    Agglomerative,
    /// Density-based clustering with a noise label.
    Dbscan,
}

impl Algorithm {
    /// Canonical name, as written into analysis artifacts.
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Kmeans => "kmeans",
            Algorithm::Agglomerative => "agglomerative",
            Algorithm::Dbscan => "dbscan",
        }
    }

    /// Whether the algorithm needs a target cluster count.
    pub fn uses_cluster_count(&self) -> bool {
        !matches!(self, Algorithm::Dbscan)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kmeans" | "k-means" | "centroid" => Ok(Algorithm::Kmeans),
            "agglomerative" | "hierarchical" | "ward" => Ok(Algorithm::Agglomerative),
            "dbscan" | "density" => Ok(Algorithm::Dbscan),
            _ => Err(Error::UnknownAlgorithm(s.to_string())),
        }
    }
}

impl TryFrom<String> for Algorithm {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Algorithm> for String {
    fn from(value: Algorithm) -> Self {
        value.as_str().to_string()
    }
}

/// Configuration for [`crate::SkillClusterer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Target cluster count for k-means and agglomerative clustering.
    /// `None` means [`DEFAULT_N_CLUSTERS`]. Ignored by DBSCAN.
    pub n_clusters: Option<usize>,
    /// Clustering algorithm.
    pub algorithm: Algorithm,
    /// Minimum number of documents a term must appear in.
    pub min_skill_freq: usize,
    /// Maximum fraction of documents a term may appear in.
    pub max_df: f64,
    /// Project TF-IDF rows through a truncated SVD before clustering.
    pub dim_reduction: bool,
    /// Requested SVD dimensionality.
    pub dim_components: usize,
    /// Seed for every randomized stage.
    pub random_state: u64,
    /// DBSCAN neighborhood radius.
    pub dbscan_eps: f32,
    /// DBSCAN minimum neighborhood population, including the point itself.
    pub dbscan_min_samples: usize,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            n_clusters: None,
            algorithm: Algorithm::default(),
            min_skill_freq: 2,
            max_df: 0.7,
            dim_reduction: true,
            dim_components: 50,
            random_state: 42,
            dbscan_eps: 0.5,
            dbscan_min_samples: 5,
        }
    }
}

impl ClusterConfig {
    /// Default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Set the target cluster count.
    pub fn with_n_clusters(mut self, k: usize) -> Self {
        self.n_clusters = Some(k);
        self
    }

    /// Set the clustering algorithm.
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Set the minimum document frequency.
    pub fn with_min_skill_freq(mut self, min_df: usize) -> Self {
        self.min_skill_freq = min_df;
        self
    }

    /// Set the maximum document-frequency fraction.
    pub fn with_max_df(mut self, max_df: f64) -> Self {
        self.max_df = max_df;
        self
    }

    /// Enable or disable SVD reduction.
    pub fn with_dim_reduction(mut self, enabled: bool) -> Self {
        self.dim_reduction = enabled;
        self
    }

    /// Set the requested SVD dimensionality.
    pub fn with_dim_components(mut self, n: usize) -> Self {
        self.dim_components = n;
        self
    }

    /// Set the random seed.
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    /// Set DBSCAN parameters.
    pub fn with_dbscan(mut self, eps: f32, min_samples: usize) -> Self {
        self.dbscan_eps = eps;
        self.dbscan_min_samples = min_samples;
        self
    }

    /// Cluster count the k-based algorithms will use.
    pub fn effective_n_clusters(&self) -> usize {
        self.n_clusters.unwrap_or(DEFAULT_N_CLUSTERS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_algorithm_aliases() {
        assert_eq!("kmeans".parse::<Algorithm>().unwrap(), Algorithm::Kmeans);
        assert_eq!("Centroid".parse::<Algorithm>().unwrap(), Algorithm::Kmeans);
        assert_eq!(
            "hierarchical".parse::<Algorithm>().unwrap(),
            Algorithm::Agglomerative
        );
        assert_eq!("density".parse::<Algorithm>().unwrap(), Algorithm::Dbscan);
    }

    #[test]
    fn test_unknown_algorithm() {
        let err = "spectral".parse::<Algorithm>().unwrap_err();
        assert!(matches!(err, Error::UnknownAlgorithm(ref name) if name == "spectral"));
    }

    #[test]
    fn test_defaults_from_empty_json() {
        let config: ClusterConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ClusterConfig::default());
        assert_eq!(config.effective_n_clusters(), DEFAULT_N_CLUSTERS);
    }

    #[test]
    fn test_json_rejects_unknown_algorithm() {
        let result: std::result::Result<ClusterConfig, _> =
            serde_json::from_str(r#"{"algorithm": "birch"}"#);
        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("unknown clustering algorithm"), "{msg}");
    }

    #[test]
    fn test_algorithm_serializes_canonical_name() {
        let config = ClusterConfig::new().with_algorithm(Algorithm::Dbscan);
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["algorithm"], "dbscan");
    }
}
