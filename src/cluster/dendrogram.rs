//! Dendrogram produced by agglomerative clustering.
//!
//! Merge ids follow the SciPy convention: leaves are `0..n`, and merge `i`
//! creates cluster `n + i`.

use crate::error::{Error, Result};

/// A dendrogram representing hierarchical cluster merges.
#[derive(Debug, Clone)]
pub struct Dendrogram {
    /// Merge history in order of increasing dissimilarity.
    merges: Vec<Merge>,
    /// Number of original items.
    n_items: usize,
}

/// A single merge operation in the dendrogram.
#[derive(Debug, Clone, Copy)]
pub struct Merge {
    /// First cluster being merged (index).
    pub cluster_a: usize,
    /// Second cluster being merged (index).
    pub cluster_b: usize,
    /// Distance/dissimilarity at which merge occurred.
    pub distance: f64,
    /// Size of resulting cluster.
    pub size: usize,
}

impl Dendrogram {
    /// Create a new dendrogram for n items.
    pub fn new(n_items: usize) -> Self {
        Self {
            merges: Vec::with_capacity(n_items.saturating_sub(1)),
            n_items,
        }
    }

    /// Record a merge operation.
    pub fn add_merge(&mut self, cluster_a: usize, cluster_b: usize, distance: f64, size: usize) {
        self.merges.push(Merge {
            cluster_a,
            cluster_b,
            distance,
            size,
        });
    }

    /// Cluster assignments with exactly `k` clusters.
    ///
    /// Applies the first `n - k` merges. Labels are numbered in order of
    /// first appearance, so item 0 is always in cluster 0.
    pub fn cut_to_k(&self, k: usize) -> Result<Vec<usize>> {
        if k == 0 || k > self.n_items {
            return Err(Error::InvalidClusterCount {
                requested: k,
                n_items: self.n_items,
            });
        }

        let n_merges = self.n_items - k;
        if n_merges > self.merges.len() {
            return Err(Error::InvalidClusterCount {
                requested: k,
                n_items: self.merges.len() + 1,
            });
        }

        // Every merge id (leaf or internal) points at the id it was merged into.
        let mut parent: Vec<usize> = (0..self.n_items + n_merges).collect();
        for (i, merge) in self.merges.iter().take(n_merges).enumerate() {
            let new_id = self.n_items + i;
            parent[merge.cluster_a] = new_id;
            parent[merge.cluster_b] = new_id;
        }

        let mut roots = Vec::with_capacity(self.n_items);
        for item in 0..self.n_items {
            let mut id = item;
            while parent[id] != id {
                id = parent[id];
            }
            roots.push(id);
        }

        let mut seen: Vec<usize> = Vec::with_capacity(k);
        Ok(roots
            .into_iter()
            .map(|root| match seen.iter().position(|&r| r == root) {
                Some(label) => label,
                None => {
                    seen.push(root);
                    seen.len() - 1
                }
            })
            .collect())
    }

    /// Number of original items.
    pub fn n_items(&self) -> usize {
        self.n_items
    }

    /// Number of merges recorded.
    pub fn n_merges(&self) -> usize {
        self.merges.len()
    }

    /// Iterate over merges.
    pub fn merges(&self) -> impl Iterator<Item = &Merge> {
        self.merges.iter()
    }
}
