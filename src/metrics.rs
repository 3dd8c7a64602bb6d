//! Internal clustering quality metrics.
//!
//! No ground truth exists for skill cohorts, so quality is judged from the
//! geometry of the fitted features alone.
//!
//! # Silhouette
//!
//! For point i in cluster C:
//!
//! ```text
//! a(i) = mean distance from i to the other members of C
//! b(i) = min over clusters C' ≠ C of mean distance from i to members of C'
//! s(i) = (b(i) - a(i)) / max(a(i), b(i))
//! ```
//!
//! `s(i)` lies in [-1, 1]: near 1 means i sits well inside its cluster,
//! near -1 means it would fit a neighboring cluster better. Members of a
//! singleton cluster score 0. The noise label is treated as an ordinary
//! group. With fewer than two labels the statistic is undefined.
//!
//! # References
//!
//! - Rousseeuw (1987). "Silhouettes: a graphical aid to the interpretation
//!   and validation of cluster analysis"

use std::collections::BTreeMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::cluster::util::euclidean_f64;
use crate::cluster::Label;

/// Ranking value substituted for a silhouette that is undefined.
pub const UNDEFINED_SILHOUETTE: f64 = 0.0;

fn group_members(labels: &[Label]) -> BTreeMap<Label, Vec<usize>> {
    let mut groups: BTreeMap<Label, Vec<usize>> = BTreeMap::new();
    for (i, &l) in labels.iter().enumerate() {
        groups.entry(l).or_default().push(i);
    }
    groups
}

fn sample_silhouette(
    i: usize,
    data: &[Vec<f32>],
    labels: &[Label],
    groups: &BTreeMap<Label, Vec<usize>>,
) -> f64 {
    let own = &groups[&labels[i]];
    if own.len() < 2 {
        return 0.0;
    }
    let mean_dist = |members: &[usize]| -> f64 {
        members
            .iter()
            .filter(|&&j| j != i)
            .map(|&j| euclidean_f64(&data[i], &data[j]))
            .sum::<f64>()
    };

    let a = mean_dist(own.as_slice()) / (own.len() - 1) as f64;
    let b = groups
        .iter()
        .filter(|(l, _)| **l != labels[i])
        .map(|(_, members)| mean_dist(members.as_slice()) / members.len() as f64)
        .fold(f64::INFINITY, f64::min);

    let denom = a.max(b);
    if denom > 0.0 && denom.is_finite() {
        (b - a) / denom
    } else {
        0.0
    }
}

/// Per-point silhouette values, or `None` with fewer than two distinct labels.
pub fn silhouette_samples(data: &[Vec<f32>], labels: &[Label]) -> Option<Vec<f64>> {
    if data.len() != labels.len() || data.is_empty() {
        return None;
    }
    let groups = group_members(labels);
    if groups.len() < 2 {
        return None;
    }

    #[cfg(feature = "parallel")]
    let samples = (0..data.len())
        .into_par_iter()
        .map(|i| sample_silhouette(i, data, labels, &groups))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let samples = (0..data.len())
        .map(|i| sample_silhouette(i, data, labels, &groups))
        .collect();

    Some(samples)
}

/// Mean silhouette, or `None` with fewer than two distinct labels.
pub fn silhouette_score(data: &[Vec<f32>], labels: &[Label]) -> Option<f64> {
    silhouette_samples(data, labels).map(|s| mean(&s))
}

/// Mean of per-point silhouette values.
pub fn mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f64>() / samples.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_blobs() -> (Vec<Vec<f32>>, Vec<Label>) {
        (
            vec![
                vec![0.0, 0.0],
                vec![0.0, 1.0],
                vec![10.0, 0.0],
                vec![10.0, 1.0],
            ],
            vec![0, 0, 1, 1],
        )
    }

    #[test]
    fn test_well_separated_near_one() {
        let (data, labels) = two_blobs();
        let score = silhouette_score(&data, &labels).unwrap();
        assert!(score > 0.85 && score <= 1.0, "{score}");
    }

    #[test]
    fn test_exact_sample_value() {
        let (data, labels) = two_blobs();
        let s = silhouette_samples(&data, &labels).unwrap();
        // a = 1, b = (10 + sqrt(101)) / 2
        let b = (10.0 + 101f64.sqrt()) / 2.0;
        assert!((s[0] - (b - 1.0) / b).abs() < 1e-9);
    }

    #[test]
    fn test_swapped_labels_negative() {
        let (data, _) = two_blobs();
        let score = silhouette_score(&data, &[0, 1, 0, 1]).unwrap();
        assert!(score < 0.0 && score >= -1.0, "{score}");
    }

    #[test]
    fn test_single_cluster_undefined() {
        let (data, _) = two_blobs();
        assert!(silhouette_score(&data, &[0, 0, 0, 0]).is_none());
        assert!(silhouette_samples(&data, &[-1, -1, -1, -1]).is_none());
    }

    #[test]
    fn test_singleton_cluster_scores_zero() {
        let (data, _) = two_blobs();
        let s = silhouette_samples(&data, &[0, 0, 0, 1]).unwrap();
        assert_eq!(s[3], 0.0);
    }

    #[test]
    fn test_noise_is_its_own_group() {
        let (data, _) = two_blobs();
        let s = silhouette_samples(&data, &[-1, -1, 0, 0]).unwrap();
        assert!(s.iter().all(|&v| v > 0.0));
    }

    #[test]
    fn test_length_mismatch() {
        let (data, _) = two_blobs();
        assert!(silhouette_samples(&data, &[0, 1]).is_none());
    }
}
