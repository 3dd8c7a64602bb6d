//! # skill-cohort
//!
//! Groups professional profiles into cohorts by the vocabulary of their
//! declared skills, explains each cohort by its dominant skills, and picks
//! the most representative members of a cohort on request.
//!
//! ```text
//! skills ─► tf-idf ─► truncated SVD (optional) ─► k-means | Ward | DBSCAN
//!                                                     │
//!                        silhouette + top skills ◄────┘──► ranked selection
//! ```
//!
//! ```rust
//! use skill_cohort::{Algorithm, ClusterConfig, Profile, SelectionRequest, SkillClusterer};
//!
//! let profiles = vec![
//!     Profile::new("p1", ["python", "sql"]),
//!     Profile::new("p2", ["python", "excel"]),
//!     Profile::new("p3", ["java", "sql"]),
//!     Profile::new("p4", ["java", "excel"]),
//! ];
//! let config = ClusterConfig::new()
//!     .with_algorithm(Algorithm::Kmeans)
//!     .with_n_clusters(2)
//!     .with_min_skill_freq(1)
//!     .with_max_df(1.0);
//!
//! let model = SkillClusterer::new(config).fit(&profiles).unwrap();
//! assert_eq!(model.assignments().len(), 4);
//!
//! let request = SelectionRequest::from([(0, 1), (1, 1)]);
//! let picked = model.select(&request);
//! assert_eq!(picked.values().map(Vec::len).sum::<usize>(), 2);
//! ```

#![forbid(unsafe_code)]

pub mod analysis;
pub mod cluster;
pub mod config;
/// Error types used across `skill-cohort`.
pub mod error;
pub mod metrics;
pub mod persist;
pub mod pipeline;
pub mod profile;
pub mod reduce;
pub mod select;
pub mod vectorize;

pub use analysis::{ClusterAnalysis, ClusterProfile, ClusterSummary, SkillImportance};
pub use cluster::{Clustering, Label, NOISE};
pub use config::{Algorithm, ClusterConfig};
pub use error::{Error, Result};
pub use metrics::{silhouette_samples, silhouette_score};
pub use pipeline::{FittedModel, ReductionSummary, SkillClusterer};
pub use profile::Profile;
pub use select::{SelectionRequest, SelectionResult};
