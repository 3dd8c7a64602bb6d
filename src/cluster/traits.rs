//! Clustering traits.

use crate::error::Result;

/// Cluster label. Non-negative values are clusters; [`super::NOISE`] marks
/// points a density-based clusterer could not place.
pub type Label = i32;

/// Trait for hard clustering algorithms.
pub trait Clustering {
    /// Fit the model to data and return cluster assignments.
    ///
    /// Returns one label per input row, in input order.
    fn fit_predict(&self, data: &[Vec<f32>]) -> Result<Vec<Label>>;

    /// Target number of clusters, or `None` when the algorithm discovers it.
    fn n_clusters(&self) -> Option<usize>;
}
