//! Hierarchical (agglomerative) clustering.
//!
//! Bottom-up clustering that builds a **dendrogram** by iteratively
//! merging the closest clusters, then cuts it to exactly k clusters.
//!
//! # Linkage Methods
//!
//! | Linkage | Formula | Effect |
//! |---------|---------|--------|
//! | Single | min(d(a,b)) for a∈A, b∈B | Chaining; elongated clusters |
//! | Complete | max(d(a,b)) | Compact, spherical clusters |
//! | Average | mean(d(a,b)) | Balanced compromise |
//! | Ward | Δ variance | Minimizes within-cluster variance |
//!
//! ## Ward's Method: Variance Minimization
//!
//! Ward linkage minimizes the increase in total within-cluster variance
//! when merging clusters A and B:
//!
//! ```text
//! Δ(A,B) = (nₐ × nᵦ)/(nₐ + nᵦ) × ||μₐ - μᵦ||²
//! ```
//!
//! Skill cohorts use Ward: it yields compact, comparably sized groups and
//! involves no randomness.

use super::dendrogram::Dendrogram;
use super::traits::{Clustering, Label};
use super::util::{check_rows, euclidean_f64};
use crate::error::{Error, Result};
use kodama::{linkage as kodama_linkage, Method as KodamaMethod};

/// Linkage method for hierarchical clustering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Linkage {
    /// Single linkage: minimum distance between clusters.
    Single,
    /// Complete linkage: maximum distance between clusters.
    Complete,
    /// Average linkage: mean distance between clusters.
    Average,
    /// Ward's method: minimize within-cluster variance.
    Ward,
}

/// Hierarchical (agglomerative) clustering.
#[derive(Debug, Clone)]
pub struct HierarchicalClustering {
    /// Number of clusters to produce.
    n_clusters: usize,
    /// Linkage method.
    linkage: Linkage,
}

impl HierarchicalClustering {
    /// Create a new Ward-linkage clusterer.
    pub fn new(n_clusters: usize) -> Self {
        Self {
            n_clusters,
            linkage: Linkage::Ward,
        }
    }

    /// Set linkage method.
    pub fn with_linkage(mut self, linkage: Linkage) -> Self {
        self.linkage = linkage;
        self
    }

    /// Fit and return the full dendrogram.
    pub fn fit_dendrogram(&self, data: &[Vec<f32>]) -> Result<Dendrogram> {
        check_rows(data)?;
        let n = data.len();
        let mut dendro = Dendrogram::new(n);
        if n < 2 {
            return Ok(dendro);
        }

        // Condensed dissimilarity matrix (upper triangle, row-major), N-choose-2 long.
        let mut condensed = Vec::with_capacity((n * (n - 1)) / 2);
        for row in 0..(n - 1) {
            for col in (row + 1)..n {
                condensed.push(euclidean_f64(&data[row], &data[col]));
            }
        }

        let method = match self.linkage {
            Linkage::Single => KodamaMethod::Single,
            Linkage::Complete => KodamaMethod::Complete,
            Linkage::Average => KodamaMethod::Average,
            Linkage::Ward => KodamaMethod::Ward,
        };

        let steps = kodama_linkage(&mut condensed, n, method);
        for step in steps.steps() {
            dendro.add_merge(step.cluster1, step.cluster2, step.dissimilarity, step.size);
        }

        Ok(dendro)
    }
}

impl Clustering for HierarchicalClustering {
    fn fit_predict(&self, data: &[Vec<f32>]) -> Result<Vec<Label>> {
        if self.n_clusters == 0 {
            return Err(Error::InvalidParameter {
                name: "n_clusters",
                message: "must be at least 1",
            });
        }
        if self.n_clusters > data.len() && !data.is_empty() {
            return Err(Error::InvalidClusterCount {
                requested: self.n_clusters,
                n_items: data.len(),
            });
        }
        let dendro = self.fit_dendrogram(data)?;
        Ok(dendro
            .cut_to_k(self.n_clusters)?
            .into_iter()
            .map(|l| l as Label)
            .collect())
    }

    fn n_clusters(&self) -> Option<usize> {
        Some(self.n_clusters)
    }
}
