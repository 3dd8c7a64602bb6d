//! Per-cluster summaries: size, centroid and skill importances.
//!
//! A cluster's importance for a skill is the mean weight its members put
//! on that skill's axis. When clustering ran in SVD space the reduced
//! centroid is mapped back onto the term axes through the fitted
//! components, so importances are always reported per vocabulary term.

use std::collections::BTreeMap;

use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cluster::Label;
use crate::config::Algorithm;
use crate::reduce::SvdProjection;

/// Number of skills reported per cluster and used for selection overlap.
pub const TOP_SKILLS: usize = 10;

/// A skill and its weight within one cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillImportance {
    /// Vocabulary term.
    pub skill: String,
    /// Mean member weight along the term's axis.
    pub importance: f64,
}

/// Fitted facts about one cluster.
#[derive(Debug, Clone)]
pub struct ClusterProfile {
    /// Cluster label.
    pub label: Label,
    /// Row indices of members, ascending.
    pub members: Vec<usize>,
    /// Mean feature vector in the space clustering ran in.
    pub centroid: Vec<f32>,
    /// Every vocabulary term, most important first.
    pub skill_importances: Vec<SkillImportance>,
}

impl ClusterProfile {
    /// Number of members.
    pub fn size(&self) -> usize {
        self.members.len()
    }

    /// The `n` most important skills.
    pub fn top_skills(&self, n: usize) -> &[SkillImportance] {
        &self.skill_importances[..n.min(self.skill_importances.len())]
    }
}

/// Build a [`ClusterProfile`] for every distinct label (noise included).
pub fn profile_clusters(
    features: &[Vec<f32>],
    labels: &[Label],
    terms: &[String],
    projection: Option<&SvdProjection>,
) -> BTreeMap<Label, ClusterProfile> {
    let mut members: BTreeMap<Label, Vec<usize>> = BTreeMap::new();
    for (i, &l) in labels.iter().enumerate() {
        members.entry(l).or_default().push(i);
    }
    let d = features.first().map_or(0, Vec::len);

    members
        .into_iter()
        .map(|(label, rows)| {
            let block = Array2::from_shape_fn((rows.len(), d), |(r, c)| {
                features[rows[r]][c] as f64
            });
            let centroid = block
                .mean_axis(Axis(0))
                .map(|m| m.to_vec())
                .unwrap_or_else(|| vec![0.0; d]);

            let term_weights = match projection {
                Some(p) => p.inverse_transform(&centroid),
                None => centroid.clone(),
            };
            let mut skill_importances: Vec<SkillImportance> = terms
                .iter()
                .zip(term_weights)
                .map(|(skill, importance)| SkillImportance {
                    skill: skill.clone(),
                    importance,
                })
                .collect();
            // Stable: equal weights keep vocabulary order.
            skill_importances.sort_by(|a, b| b.importance.total_cmp(&a.importance));

            debug!(
                label,
                size = rows.len(),
                top = skill_importances.first().map_or("", |s| s.skill.as_str()),
                "profiled cluster"
            );

            let profile = ClusterProfile {
                label,
                members: rows,
                centroid: centroid.iter().map(|&v| v as f32).collect(),
                skill_importances,
            };
            (label, profile)
        })
        .collect()
}

/// Serializable analysis of one fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterAnalysis {
    /// Algorithm that produced the labels.
    pub algorithm: Algorithm,
    /// Configured cluster count for k-based algorithms, otherwise the
    /// number of distinct labels (noise included).
    pub n_clusters: usize,
    /// Mean silhouette; `None` with fewer than two distinct labels.
    pub silhouette_score: Option<f64>,
    /// Members per label.
    pub cluster_sizes: BTreeMap<Label, usize>,
    /// Top skills per label.
    pub top_skills: BTreeMap<Label, Vec<SkillImportance>>,
}

impl ClusterAnalysis {
    /// Assemble the analysis from fitted cluster profiles.
    pub fn new(
        algorithm: Algorithm,
        configured_k: usize,
        silhouette_score: Option<f64>,
        clusters: &BTreeMap<Label, ClusterProfile>,
    ) -> Self {
        let n_clusters = if algorithm.uses_cluster_count() {
            configured_k
        } else {
            clusters.len()
        };
        Self {
            algorithm,
            n_clusters,
            silhouette_score,
            cluster_sizes: clusters.iter().map(|(&l, c)| (l, c.size())).collect(),
            top_skills: clusters
                .iter()
                .map(|(&l, c)| (l, c.top_skills(TOP_SKILLS).to_vec()))
                .collect(),
        }
    }

    /// Condensed view with only the `n` leading skills per cluster.
    pub fn summary(&self, n: usize) -> ClusterSummary {
        ClusterSummary {
            algorithm: self.algorithm,
            n_clusters: self.n_clusters,
            cluster_sizes: self.cluster_sizes.clone(),
            top_skills: self
                .top_skills
                .iter()
                .map(|(&l, skills)| (l, skills.iter().take(n).cloned().collect()))
                .collect(),
        }
    }
}

/// Short form of [`ClusterAnalysis`] for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSummary {
    /// Algorithm that produced the labels.
    pub algorithm: Algorithm,
    /// Reported cluster count.
    pub n_clusters: usize,
    /// Members per label.
    pub cluster_sizes: BTreeMap<Label, usize>,
    /// Leading skills per label.
    pub top_skills: BTreeMap<Label, Vec<SkillImportance>>,
}
