//! Clustering algorithms for grouping profiles by skill vectors.
//!
//! Three interchangeable hard-clustering algorithms sit behind the
//! [`Clustering`] trait, selected by the closed [`Algorithm`] enum:
//!
//! | Algorithm | k required | Randomness | Noise |
//! |-----------|-----------|------------|-------|
//! | [`Kmeans`] | yes (default 4) | seeded k-means++ restarts | no |
//! | [`HierarchicalClustering`] | yes (default 4) | none | no |
//! | [`Dbscan`] | no | none | label [`NOISE`] |
//!
//! ### K-means
//!
//! Assign each point to the nearest centroid, move centroids to the mean
//! of their points, repeat. Minimizes within-cluster sum of squares and
//! assumes roughly spherical clusters.
//!
//! ### Hierarchical (Agglomerative) Clustering
//!
//! Bottom-up: start with each point as its own cluster and repeatedly merge
//! the pair whose union increases variance least (Ward). The merge history
//! forms a [`Dendrogram`] cut to exactly k clusters.
//!
//! ### DBSCAN
//!
//! Grows clusters from points with dense ε-neighborhoods; the cluster count
//! falls out of the data and isolated points are labeled noise.
//!
//! ## Usage
//!
//! ```rust
//! use skill_cohort::cluster::{Clustering, Kmeans};
//!
//! let data = vec![
//!     vec![0.0, 0.0],
//!     vec![0.1, 0.1],
//!     vec![10.0, 10.0],
//!     vec![10.1, 10.1],
//! ];
//!
//! let labels = Kmeans::new(2).with_seed(42).fit_predict(&data).unwrap();
//! assert_eq!(labels[0], labels[1]);
//! assert_ne!(labels[0], labels[2]);
//! ```

mod dbscan;
mod dendrogram;
mod hierarchical;
mod kmeans;
mod traits;
pub(crate) mod util;

pub use dbscan::{Dbscan, NOISE};
pub use dendrogram::{Dendrogram, Merge};
pub use hierarchical::{HierarchicalClustering, Linkage};
pub use kmeans::{Kmeans, KmeansFit};
pub use traits::{Clustering, Label};

use tracing::{debug, info};

use crate::config::{Algorithm, ClusterConfig};
use crate::error::Result;

impl Algorithm {
    /// Build the clusterer this variant stands for.
    pub fn clusterer(&self, config: &ClusterConfig) -> Box<dyn Clustering> {
        match self {
            Algorithm::Kmeans => Box::new(
                Kmeans::new(config.effective_n_clusters()).with_seed(config.random_state),
            ),
            Algorithm::Agglomerative => Box::new(
                HierarchicalClustering::new(config.effective_n_clusters())
                    .with_linkage(Linkage::Ward),
            ),
            Algorithm::Dbscan => {
                if let Some(k) = config.n_clusters {
                    debug!(n_clusters = k, "dbscan ignores the configured cluster count");
                }
                Box::new(Dbscan::new(config.dbscan_eps, config.dbscan_min_samples))
            }
        }
    }

    /// Partition feature rows into labels, one per row in input order.
    pub fn partition(&self, features: &[Vec<f32>], config: &ClusterConfig) -> Result<Vec<Label>> {
        let labels = self.clusterer(config).fit_predict(features)?;
        info!(
            algorithm = %self,
            points = labels.len(),
            clusters = distinct_labels(&labels).len(),
            noise = labels.iter().filter(|&&l| l == NOISE).count(),
            "partitioned features"
        );
        Ok(labels)
    }
}

/// Sorted distinct labels, noise included.
pub fn distinct_labels(labels: &[Label]) -> Vec<Label> {
    let mut unique = labels.to_vec();
    unique.sort_unstable();
    unique.dedup();
    unique
}
