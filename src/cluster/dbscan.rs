//! DBSCAN: Density-Based Spatial Clustering of Applications with Noise.
//!
//! # The Algorithm (Ester et al., 1996)
//!
//! - **Epsilon (ε)**: Maximum distance between two points to be neighbors.
//! - **MinPts**: Minimum neighborhood population (the point itself counts)
//!   for a point to be "core".
//! - **Core point**: Has at least MinPts points within ε.
//! - **Border point**: Within ε of a core point but not core itself.
//! - **Noise point**: Neither core nor border; labeled [`NOISE`].
//!
//! Points are scanned in input order and each unassigned core point seeds
//! a new cluster, so cluster ids are `0, 1, 2, …` in discovery order and
//! the result is deterministic.
//!
//! ## Complexity
//!
//! O(n²) distance evaluations (no spatial index); skill corpora are small.
//!
//! ## References
//!
//! Ester et al. (1996). "A Density-Based Algorithm for Discovering Clusters
//! in Large Spatial Databases with Noise." KDD-96.

use super::traits::{Clustering, Label};
use super::util::{check_rows, squared_euclidean};
use crate::error::{Error, Result};

/// Label assigned to points not reachable from any core point.
pub const NOISE: Label = -1;

const UNVISITED: Label = -2;

/// DBSCAN clustering algorithm.
#[derive(Debug, Clone)]
pub struct Dbscan {
    /// Epsilon: maximum distance for neighborhood.
    epsilon: f32,
    /// Minimum points for core point classification.
    min_pts: usize,
}

impl Dbscan {
    /// Create a new DBSCAN clusterer.
    ///
    /// # Arguments
    ///
    /// * `epsilon` - Maximum distance between two points to be neighbors.
    /// * `min_pts` - Minimum number of points (including itself) to form a dense region.
    pub fn new(epsilon: f32, min_pts: usize) -> Self {
        Self { epsilon, min_pts }
    }

    /// Set epsilon (neighborhood radius).
    pub fn with_epsilon(mut self, epsilon: f32) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Set minimum points for core classification.
    pub fn with_min_pts(mut self, min_pts: usize) -> Self {
        self.min_pts = min_pts;
        self
    }

    /// All points within epsilon, including the point itself.
    fn region_query(&self, data: &[Vec<f32>], point_idx: usize) -> Vec<usize> {
        let eps_sq = self.epsilon * self.epsilon;
        let point = &data[point_idx];
        data.iter()
            .enumerate()
            .filter(|(_, other)| squared_euclidean(point, other) <= eps_sq)
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Grow a cluster outward from a core point.
    fn expand_cluster(
        &self,
        data: &[Vec<f32>],
        seeds: Vec<usize>,
        labels: &mut [Label],
        cluster_id: Label,
    ) {
        let mut to_process = seeds;

        while let Some(idx) = to_process.pop() {
            match labels[idx] {
                // Border point previously written off as noise.
                NOISE => {
                    labels[idx] = cluster_id;
                    continue;
                }
                UNVISITED => labels[idx] = cluster_id,
                _ => continue,
            }

            let neighbors = self.region_query(data, idx);
            if neighbors.len() >= self.min_pts {
                to_process.extend(
                    neighbors
                        .into_iter()
                        .filter(|&nn| labels[nn] == UNVISITED || labels[nn] == NOISE),
                );
            }
        }
    }
}

impl Default for Dbscan {
    fn default() -> Self {
        Self::new(0.5, 5)
    }
}

impl Clustering for Dbscan {
    fn fit_predict(&self, data: &[Vec<f32>]) -> Result<Vec<Label>> {
        check_rows(data)?;
        let n = data.len();

        if !(self.epsilon > 0.0) {
            return Err(Error::InvalidParameter {
                name: "epsilon",
                message: "must be positive",
            });
        }

        if self.min_pts == 0 {
            return Err(Error::InvalidParameter {
                name: "min_pts",
                message: "must be at least 1",
            });
        }

        let mut labels = vec![UNVISITED; n];
        let mut cluster_id: Label = 0;

        for point_idx in 0..n {
            if labels[point_idx] != UNVISITED {
                continue;
            }

            let neighbors = self.region_query(data, point_idx);
            if neighbors.len() < self.min_pts {
                // Not dense: noise unless a later core point reaches it.
                labels[point_idx] = NOISE;
                continue;
            }

            labels[point_idx] = cluster_id;
            let seeds = neighbors
                .into_iter()
                .filter(|&nn| nn != point_idx)
                .collect();
            self.expand_cluster(data, seeds, &mut labels, cluster_id);
            cluster_id += 1;
        }

        Ok(labels)
    }

    /// DBSCAN discovers clusters dynamically.
    fn n_clusters(&self) -> Option<usize> {
        None
    }
}
