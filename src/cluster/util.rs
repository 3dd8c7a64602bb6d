use crate::error::{Error, Result};

/// Validate a dense row matrix and return its dimensionality.
pub(crate) fn check_rows(data: &[Vec<f32>]) -> Result<usize> {
    let first = data.first().ok_or(Error::EmptyInput)?;
    let d = first.len();
    if let Some(p) = data.iter().find(|p| p.len() != d) {
        return Err(Error::DimensionMismatch {
            expected: d,
            found: p.len(),
        });
    }
    Ok(d)
}

#[inline]
pub(crate) fn squared_euclidean(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Euclidean distance accumulated in f64.
#[inline]
pub(crate) fn euclidean_f64(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = *x as f64 - *y as f64;
            d * d
        })
        .sum::<f64>()
        .sqrt()
}
