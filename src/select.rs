//! Per-cluster candidate ranking and quota selection.
//!
//! Members of a requested cluster are ranked by three keys, compared
//! lexicographically and in descending order:
//!
//! | Key | Signal | Higher means |
//! |-----|--------|--------------|
//! | 1 | silhouette sample | more representative of its own cluster |
//! | 2 | −‖x − centroid‖ | closer to the cluster mean |
//! | 3 | overlap with the cluster's top-10 skills | more on-profile |
//!
//! The sort is stable, so members equal on all three keys keep their
//! enumeration order. When the silhouette is undefined (one cluster) every
//! member gets [`UNDEFINED_SILHOUETTE`] and ranking falls through to
//! distance.
//!
//! A label that is not present in the fit yields an empty list: the
//! request is a caller-held cursor into a model fitted independently.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use tracing::{debug, warn};

use crate::analysis::TOP_SKILLS;
use crate::cluster::util::euclidean_f64;
use crate::cluster::Label;
use crate::metrics::UNDEFINED_SILHOUETTE;
use crate::pipeline::FittedModel;

/// Desired number of candidates per label. Negative counts select nothing.
pub type SelectionRequest = BTreeMap<Label, i64>;

/// Selected profile ids per label, best first.
pub type SelectionResult = BTreeMap<Label, Vec<String>>;

/// Ranking signals for one cluster member.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateScore {
    /// Row index in the fitted model.
    pub index: usize,
    /// Profile id.
    pub profile_id: String,
    /// Silhouette sample, or the undefined substitute.
    pub silhouette: f64,
    /// Euclidean distance to the cluster centroid.
    pub distance: f64,
    /// Declared skills found among the cluster's top skills. Skills are
    /// lowercased before the lookup and repeated skills count each time.
    pub skill_overlap: usize,
}

impl CandidateScore {
    /// Descending rank order: better candidates compare as `Less`.
    fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .silhouette
            .total_cmp(&self.silhouette)
            .then_with(|| self.distance.total_cmp(&other.distance))
            .then_with(|| other.skill_overlap.cmp(&self.skill_overlap))
    }
}

/// Score and rank every member of `label`, best first.
///
/// Returns an empty list when the label is not part of the fit.
pub fn rank_cluster(model: &FittedModel, label: Label) -> Vec<CandidateScore> {
    let Some(cluster) = model.clusters().get(&label) else {
        return Vec::new();
    };
    let top: HashSet<&str> = cluster
        .top_skills(TOP_SKILLS)
        .iter()
        .map(|s| s.skill.as_str())
        .collect();

    let mut scores: Vec<CandidateScore> = cluster
        .members
        .iter()
        .map(|&i| {
            let silhouette = model
                .silhouette_samples()
                .map_or(UNDEFINED_SILHOUETTE, |s| s[i]);
            let distance = euclidean_f64(&model.features()[i], &cluster.centroid);
            let skill_overlap = model.skills()[i]
                .iter()
                .filter(|s| top.contains(s.to_lowercase().as_str()))
                .count();
            CandidateScore {
                index: i,
                profile_id: model.profile_ids()[i].clone(),
                silhouette,
                distance,
                skill_overlap,
            }
        })
        .collect();

    scores.sort_by(CandidateScore::rank_cmp);
    scores
}

/// Select up to the requested number of top-ranked members per label.
pub fn select(model: &FittedModel, request: &SelectionRequest) -> SelectionResult {
    request
        .iter()
        .map(|(&label, &count)| {
            if !model.clusters().contains_key(&label) {
                warn!(label, "selection requested for a label absent from the fit");
            }
            let ranked = rank_cluster(model, label);
            let take = usize::try_from(count.max(0)).unwrap_or(usize::MAX);
            let chosen: Vec<String> = ranked
                .into_iter()
                .take(take)
                .map(|c| c.profile_id)
                .collect();
            debug!(label, requested = count, selected = chosen.len(), "selected candidates");
            (label, chosen)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Algorithm, ClusterConfig};
    use crate::pipeline::SkillClusterer;
    use crate::profile::Profile;

    fn fit_one_cluster(profiles: &[Profile]) -> FittedModel {
        let config = ClusterConfig::new()
            .with_algorithm(Algorithm::Agglomerative)
            .with_n_clusters(1)
            .with_min_skill_freq(1)
            .with_max_df(1.0)
            .with_dim_reduction(false);
        SkillClusterer::new(config).fit(profiles).unwrap()
    }

    fn score(index: usize, silhouette: f64, distance: f64, overlap: usize) -> CandidateScore {
        CandidateScore {
            index,
            profile_id: format!("p{index}"),
            silhouette,
            distance,
            skill_overlap: overlap,
        }
    }

    fn ranked(mut scores: Vec<CandidateScore>) -> Vec<usize> {
        scores.sort_by(CandidateScore::rank_cmp);
        scores.into_iter().map(|s| s.index).collect()
    }

    #[test]
    fn test_silhouette_is_primary_key() {
        let order = ranked(vec![score(0, 0.1, 0.0, 9), score(1, 0.5, 3.0, 0)]);
        assert_eq!(order, vec![1, 0]);
    }

    #[test]
    fn test_distance_breaks_silhouette_ties() {
        let order = ranked(vec![score(0, 0.5, 2.0, 9), score(1, 0.5, 1.0, 0)]);
        assert_eq!(order, vec![1, 0]);
    }

    #[test]
    fn test_overlap_breaks_distance_ties() {
        let order = ranked(vec![score(0, 0.0, 1.0, 1), score(1, 0.0, 1.0, 3)]);
        assert_eq!(order, vec![1, 0]);
    }

    #[test]
    fn test_full_ties_keep_enumeration_order() {
        let order = ranked(vec![
            score(0, 0.0, 0.0, 0),
            score(1, 0.0, 0.0, 0),
            score(2, 0.0, 0.0, 0),
        ]);
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn test_single_cluster_uses_undefined_silhouette() {
        let model = fit_one_cluster(&[
            Profile::new("a", ["python", "sql"]),
            Profile::new("b", ["java", "sql"]),
            Profile::new("c", ["java", "excel"]),
        ]);
        assert!(model.silhouette_samples().is_none());

        let ranked = rank_cluster(&model, 0);
        assert_eq!(ranked.len(), 3);
        assert!(ranked.iter().all(|c| c.silhouette == UNDEFINED_SILHOUETTE));
    }

    #[test]
    fn test_overlap_decides_between_equidistant_members() {
        // "a" and "b" share a feature row; "b" declares python twice.
        let model = fit_one_cluster(&[
            Profile::new("a", ["python"]),
            Profile::new("b", ["python", "Python"]),
            Profile::new("c", ["java"]),
        ]);
        let ranked = rank_cluster(&model, 0);
        assert_eq!(ranked[0].distance, ranked[1].distance);

        let ids: Vec<&str> = ranked.iter().map(|c| c.profile_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
        assert_eq!(ranked[0].skill_overlap, 2);
        assert_eq!(ranked[1].skill_overlap, 1);
    }

    #[test]
    fn test_overlap_limited_to_top_skills() {
        let skills = [
            "docker", "excel", "figma", "hadoop", "java", "kotlin", "python", "rust", "scala",
            "spark", "tableau", "terraform",
        ];
        let model = fit_one_cluster(&[Profile::new("wide", skills)]);
        assert_eq!(model.vocabulary().len(), 12);

        let ranked = rank_cluster(&model, 0);
        assert_eq!(ranked[0].skill_overlap, TOP_SKILLS);
    }

    #[test]
    fn test_unknown_label_ranks_nothing() {
        let model = fit_one_cluster(&[Profile::new("a", ["python"])]);
        assert!(rank_cluster(&model, 7).is_empty());
    }
}
