//! K-means clustering.
//!
//! Partitions data into k clusters by minimizing **within-cluster sum of squares**
//! (WCSS, also called inertia):
//!
//! ```text
//! WCSS = Σₖ Σᵢ∈Cₖ ||xᵢ - μₖ||²
//! ```
//!
//! # Lloyd's Algorithm
//!
//! 1. Initialize k centroids via k-means++
//! 2. **Assign**: Each point → nearest centroid
//! 3. **Update**: Each centroid → mean of assigned points
//! 4. Repeat until the centroid shift drops below `tol`
//!
//! Lloyd only finds a local minimum, so the whole procedure is restarted
//! `n_init` times from one seeded RNG and the lowest-WCSS run is kept.
//!
//! # Empty clusters
//!
//! A cluster that loses all its points takes over the point farthest from
//! its current centroid (drawn from a cluster with at least two members).
//! With `k <= n` this keeps every label in `0..k` populated, even when the
//! data has fewer than k distinct points.

use super::traits::{Clustering, Label};
use super::util::{check_rows, squared_euclidean};
use crate::error::{Error, Result};
use ndarray::Array2;
use rand::prelude::*;
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// K-means clustering algorithm.
#[derive(Debug, Clone)]
pub struct Kmeans {
    /// Number of clusters.
    k: usize,
    /// Maximum iterations per run.
    max_iter: usize,
    /// Convergence tolerance on total squared centroid shift.
    tol: f64,
    /// Number of restarts.
    n_init: usize,
    /// Random seed.
    seed: Option<u64>,
}

/// Labels and objective from a k-means fit.
#[derive(Debug, Clone)]
pub struct KmeansFit {
    /// Cluster per point.
    pub labels: Vec<usize>,
    /// Final centroids (`k × d`).
    pub centroids: Array2<f32>,
    /// Within-cluster sum of squares.
    pub inertia: f64,
}

impl Kmeans {
    /// Create a new K-means clusterer.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            max_iter: 300,
            tol: 1e-4,
            n_init: 10,
            seed: None,
        }
    }

    /// Set maximum iterations.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set convergence tolerance.
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Set the number of restarts.
    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init.max(1);
        self
    }

    /// Set random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Initialize centroids using k-means++ algorithm.
    fn init_centroids(&self, data: &Array2<f32>, rng: &mut impl Rng) -> Array2<f32> {
        let n = data.nrows();
        let d = data.ncols();
        let mut centroids = Array2::zeros((self.k, d));

        // First centroid: random point
        let first = rng.random_range(0..n);
        centroids.row_mut(0).assign(&data.row(first));

        // Remaining centroids: k-means++ selection
        for i in 1..self.k {
            let distances: Vec<f32> = (0..n)
                .map(|j| {
                    let point = data.row(j);
                    (0..i)
                        .map(|c| sq_dist(&point, &centroids.row(c)))
                        .fold(f32::MAX, f32::min)
                })
                .collect();

            // Sample proportional to squared distance
            let total: f32 = distances.iter().sum();
            if total == 0.0 {
                let idx = rng.random_range(0..n);
                centroids.row_mut(i).assign(&data.row(idx));
                continue;
            }

            let threshold = rng.random::<f32>() * total;
            let mut cumsum = 0.0;
            let mut selected = n - 1;

            for (j, &d) in distances.iter().enumerate() {
                cumsum += d;
                if cumsum >= threshold {
                    selected = j;
                    break;
                }
            }

            centroids.row_mut(i).assign(&data.row(selected));
        }

        centroids
    }

    fn nearest(&self, point: &ndarray::ArrayView1<'_, f32>, centroids: &Array2<f32>) -> usize {
        let mut best_cluster = 0;
        let mut best_dist = f32::MAX;
        for k in 0..self.k {
            let dist = sq_dist(point, &centroids.row(k));
            if dist < best_dist {
                best_dist = dist;
                best_cluster = k;
            }
        }
        best_cluster
    }

    /// Move the farthest points into clusters that ended up empty.
    fn relocate_empty(&self, data: &Array2<f32>, centroids: &Array2<f32>, labels: &mut [usize]) {
        let mut counts = vec![0usize; self.k];
        for &l in labels.iter() {
            counts[l] += 1;
        }
        for empty in 0..self.k {
            if counts[empty] > 0 {
                continue;
            }
            let mut farthest = None;
            let mut far_dist = -1.0f32;
            for (i, &l) in labels.iter().enumerate() {
                if counts[l] < 2 {
                    continue;
                }
                let dist = sq_dist(&data.row(i), &centroids.row(l));
                if dist > far_dist {
                    far_dist = dist;
                    farthest = Some(i);
                }
            }
            if let Some(i) = farthest {
                counts[labels[i]] -= 1;
                labels[i] = empty;
                counts[empty] = 1;
            }
        }
    }

    fn run(&self, data: &Array2<f32>, rng: &mut impl Rng) -> KmeansFit {
        let n = data.nrows();
        let d = data.ncols();
        let mut centroids = self.init_centroids(data, rng);
        let mut labels = vec![0usize; n];

        for iter in 0..self.max_iter {
            // Assignment step - parallel when feature enabled
            #[cfg(feature = "parallel")]
            {
                let centroids_ref = &centroids;
                labels.par_iter_mut().enumerate().for_each(|(i, label)| {
                    *label = self.nearest(&data.row(i), centroids_ref);
                });
            }

            #[cfg(not(feature = "parallel"))]
            for (i, label) in labels.iter_mut().enumerate() {
                *label = self.nearest(&data.row(i), &centroids);
            }

            self.relocate_empty(data, &centroids, &mut labels);

            // Update step
            let mut new_centroids = Array2::zeros((self.k, d));
            let mut counts = vec![0usize; self.k];

            for (i, &k) in labels.iter().enumerate() {
                let mut row = new_centroids.row_mut(k);
                row += &data.row(i);
                counts[k] += 1;
            }

            for (k, &count) in counts.iter().enumerate() {
                if count > 0 {
                    new_centroids
                        .row_mut(k)
                        .mapv_inplace(|v| v / count as f32);
                } else {
                    new_centroids.row_mut(k).assign(&centroids.row(k));
                }
            }

            // Check convergence
            let shift: f32 = centroids
                .iter()
                .zip(new_centroids.iter())
                .map(|(a, b)| (a - b).powi(2))
                .sum();

            centroids = new_centroids;

            if shift < self.tol as f32 {
                debug!(iterations = iter + 1, "k-means converged");
                break;
            }
        }

        let inertia = labels
            .iter()
            .enumerate()
            .map(|(i, &k)| sq_dist(&data.row(i), &centroids.row(k)) as f64)
            .sum();

        KmeansFit {
            labels,
            centroids,
            inertia,
        }
    }

    /// Fit with restarts and return the best run.
    pub fn fit(&self, data: &[Vec<f32>]) -> Result<KmeansFit> {
        let d = check_rows(data)?;
        let n = data.len();

        if self.k == 0 {
            return Err(Error::InvalidParameter {
                name: "n_clusters",
                message: "must be at least 1",
            });
        }
        if self.k > n {
            return Err(Error::InvalidClusterCount {
                requested: self.k,
                n_items: n,
            });
        }

        let flat: Vec<f32> = data.iter().flatten().copied().collect();
        let data_arr = Array2::from_shape_vec((n, d), flat).map_err(|_| {
            Error::DimensionMismatch {
                expected: n * d,
                found: data.iter().map(Vec::len).sum(),
            }
        })?;

        // Initialize RNG
        let mut rng: Box<dyn RngCore> = match self.seed {
            Some(s) => Box::new(StdRng::seed_from_u64(s)),
            None => Box::new(rand::rng()),
        };

        let mut best: Option<KmeansFit> = None;
        for run in 0..self.n_init {
            let fit = self.run(&data_arr, &mut rng);
            debug!(run, inertia = fit.inertia, "k-means restart");
            if best.as_ref().map_or(true, |b| fit.inertia < b.inertia) {
                best = Some(fit);
            }
        }
        best.ok_or(Error::EmptyInput)
    }
}

impl Clustering for Kmeans {
    fn fit_predict(&self, data: &[Vec<f32>]) -> Result<Vec<Label>> {
        let fit = self.fit(data)?;
        Ok(fit.labels.into_iter().map(|l| l as Label).collect())
    }

    fn n_clusters(&self) -> Option<usize> {
        Some(self.k)
    }
}

/// Squared Euclidean distance between two ndarray rows.
fn sq_dist(a: &ndarray::ArrayView1<'_, f32>, b: &ndarray::ArrayView1<'_, f32>) -> f32 {
    match (a.as_slice(), b.as_slice()) {
        (Some(x), Some(y)) => squared_euclidean(x, y),
        _ => a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_kmeans_basic() {
        let data = vec![
            vec![0.0, 0.0],
            vec![0.1, 0.1],
            vec![10.0, 10.0],
            vec![10.1, 10.1],
        ];

        let kmeans = Kmeans::new(2).with_seed(42);
        let labels = kmeans.fit_predict(&data).unwrap();

        // Points 0,1 should be in same cluster, points 2,3 in another
        assert_eq!(labels[0], labels[1]);
        assert_eq!(labels[2], labels[3]);
        assert_ne!(labels[0], labels[2]);
    }

    #[test]
    fn test_kmeans_labels_cover_range() {
        let data: Vec<Vec<f32>> = (0..50)
            .map(|i| vec![i as f32 * 0.1, (i % 5) as f32])
            .collect();

        let labels = Kmeans::new(5).with_seed(123).fit_predict(&data).unwrap();

        assert_eq!(labels.len(), data.len());
        let unique: HashSet<_> = labels.iter().copied().collect();
        assert_eq!(unique, (0..5).collect());
    }

    #[test]
    fn test_kmeans_duplicate_points_fill_all_clusters() {
        // Only two distinct points, three clusters requested.
        let data = vec![
            vec![0.0, 0.0],
            vec![0.0, 0.0],
            vec![1.0, 1.0],
            vec![1.0, 1.0],
        ];

        let labels = Kmeans::new(3).with_seed(7).fit_predict(&data).unwrap();
        let unique: HashSet<_> = labels.iter().copied().collect();
        assert_eq!(unique.len(), 3);
    }

    #[test]
    fn test_kmeans_k_equals_n() {
        let data = vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![0.0, 1.0]];

        let labels = Kmeans::new(3).with_seed(42).fit_predict(&data).unwrap();

        let unique: HashSet<_> = labels.iter().collect();
        assert_eq!(unique.len(), 3);
    }

    #[test]
    fn test_kmeans_deterministic_with_seed() {
        let data: Vec<Vec<f32>> = (0..30)
            .map(|i| vec![(i % 7) as f32, (i % 3) as f32 * 2.5])
            .collect();

        let labels1 = Kmeans::new(3).with_seed(42).fit_predict(&data).unwrap();
        let labels2 = Kmeans::new(3).with_seed(42).fit_predict(&data).unwrap();

        assert_eq!(labels1, labels2, "same seed should give same result");
    }

    #[test]
    fn test_restarts_never_worse_than_single_run() {
        let data: Vec<Vec<f32>> = (0..40)
            .map(|i| vec![(i * 37 % 11) as f32, (i * 13 % 7) as f32])
            .collect();

        let single = Kmeans::new(4).with_n_init(1).with_seed(3).fit(&data).unwrap();
        let multi = Kmeans::new(4).with_n_init(10).with_seed(3).fit(&data).unwrap();

        // The first restart of `multi` is the same run as `single`.
        assert!(multi.inertia <= single.inertia + 1e-6);
    }

    #[test]
    fn test_kmeans_empty_input_error() {
        let data: Vec<Vec<f32>> = vec![];
        assert!(matches!(
            Kmeans::new(2).fit_predict(&data),
            Err(Error::EmptyInput)
        ));
    }

    #[test]
    fn test_kmeans_k_larger_than_n_error() {
        let data = vec![vec![0.0, 0.0], vec![1.0, 1.0]];
        assert!(matches!(
            Kmeans::new(5).fit_predict(&data),
            Err(Error::InvalidClusterCount {
                requested: 5,
                n_items: 2
            })
        ));
    }

    #[test]
    fn test_kmeans_zero_k_error() {
        let data = vec![vec![0.0, 0.0]];
        assert!(Kmeans::new(0).fit_predict(&data).is_err());
    }
}
