//! Truncated SVD (latent semantic analysis) over TF-IDF rows.
//!
//! ```text
//! X ≈ U_k Σ_k V_kᵀ        projected rows = U_k Σ_k = X V_k
//! ```
//!
//! Rows of the projection are L2-normalized so that Euclidean distance in
//! the reduced space tracks cosine similarity of the original documents.
//!
//! The decomposition is exact (faer's thin SVD) and then truncated, so the
//! result depends only on the input matrix. Singular vectors are sign
//! ambiguous; each component is flipped so that the largest-magnitude
//! entry of its left singular vector is positive.

use faer::Mat;
use tracing::info;

use crate::error::{Error, Result};

/// Reduced features plus the fitted components.
#[derive(Debug, Clone)]
pub struct SvdProjection {
    /// Projected, row-normalized features (`n_rows × k`).
    pub features: Vec<Vec<f32>>,
    /// Right singular vectors as rows (`k × n_cols`).
    pub components: Vec<Vec<f64>>,
    /// Top-k singular values, descending.
    pub singular_values: Vec<f64>,
    /// Fraction of total column variance captured by each component.
    pub explained_variance_ratio: Vec<f64>,
}

impl SvdProjection {
    /// Number of retained components.
    pub fn n_components(&self) -> usize {
        self.components.len()
    }

    /// Sum of explained-variance ratios.
    pub fn total_explained_variance(&self) -> f64 {
        self.explained_variance_ratio.iter().sum()
    }

    /// Map a vector in reduced space back onto the original term axes.
    pub fn inverse_transform(&self, reduced: &[f64]) -> Vec<f64> {
        let d = self.components.first().map_or(0, Vec::len);
        let mut out = vec![0.0; d];
        for (weight, component) in reduced.iter().zip(&self.components) {
            for (o, c) in out.iter_mut().zip(component) {
                *o += weight * c;
            }
        }
        out
    }
}

/// Truncated SVD reducer.
#[derive(Debug, Clone)]
pub struct TruncatedSvd {
    n_components: usize,
}

impl TruncatedSvd {
    /// Request `n_components` dimensions (capped by the data shape at fit time).
    pub fn new(n_components: usize) -> Self {
        Self { n_components }
    }

    /// Fit on dense rows and return the normalized projection.
    pub fn fit_transform(&self, data: &[Vec<f32>]) -> Result<SvdProjection> {
        if data.is_empty() {
            return Err(Error::EmptyInput);
        }
        if self.n_components == 0 {
            return Err(Error::InvalidParameter {
                name: "dim_components",
                message: "must be at least 1",
            });
        }
        let n = data.len();
        let d = data[0].len();
        if let Some(row) = data.iter().find(|r| r.len() != d) {
            return Err(Error::DimensionMismatch {
                expected: d,
                found: row.len(),
            });
        }
        if d == 0 {
            return Err(Error::EmptyInput);
        }

        let k = self.n_components.min(n).min(d);
        let x = Mat::<f64>::from_fn(n, d, |i, j| data[i][j] as f64);
        let svd = x.thin_svd();
        let u = svd.u();
        let s = svd.s_diagonal();
        let v = svd.v();

        // Order by singular value rather than relying on the backend's ordering.
        let mut order: Vec<usize> = (0..s.nrows()).collect();
        order.sort_by(|&a, &b| s.read(b).total_cmp(&s.read(a)));
        order.truncate(k);

        let mut projected = vec![vec![0.0f64; k]; n];
        let mut components = Vec::with_capacity(k);
        let mut singular_values = Vec::with_capacity(k);
        for (c, &idx) in order.iter().enumerate() {
            let pivot = (0..n)
                .max_by(|&a, &b| u.read(a, idx).abs().total_cmp(&u.read(b, idx).abs()))
                .unwrap_or(0);
            let sign = if u.read(pivot, idx) < 0.0 { -1.0 } else { 1.0 };
            let sigma = s.read(idx);
            for (i, row) in projected.iter_mut().enumerate() {
                row[c] = sign * u.read(i, idx) * sigma;
            }
            components.push((0..d).map(|j| sign * v.read(j, idx)).collect::<Vec<f64>>());
            singular_values.push(sigma);
        }

        let total_var: f64 = (0..d)
            .map(|j| column_variance((0..n).map(|i| data[i][j] as f64)))
            .sum();
        let explained_variance_ratio = (0..k)
            .map(|c| {
                let var = column_variance(projected.iter().map(|r| r[c]));
                if total_var > 0.0 {
                    var / total_var
                } else {
                    0.0
                }
            })
            .collect::<Vec<f64>>();

        let features = projected
            .into_iter()
            .map(|row| normalize_row(&row))
            .collect();

        let projection = SvdProjection {
            features,
            components,
            singular_values,
            explained_variance_ratio,
        };
        info!(
            requested = self.n_components,
            components = k,
            explained_variance = projection.total_explained_variance(),
            "reduced features via truncated SVD"
        );
        Ok(projection)
    }
}

fn column_variance(values: impl Iterator<Item = f64> + Clone) -> f64 {
    let (sum, count) = values.clone().fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        return 0.0;
    }
    let mean = sum / count as f64;
    values.map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64
}

/// L2-normalize a row; all-zero rows stay zero.
pub(crate) fn normalize_row(row: &[f64]) -> Vec<f32> {
    let norm = row.iter().map(|x| x * x).sum::<f64>().sqrt();
    row.iter()
        .map(|&x| if norm > 0.0 { (x / norm) as f32 } else { 0.0 })
        .collect()
}
