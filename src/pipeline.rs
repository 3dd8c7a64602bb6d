//! End-to-end fit: profiles in, [`FittedModel`] out.
//!
//! ```text
//! Profile[] ─► Corpus ─► TF-IDF ─► (SVD) ─► partition ─► silhouette ─► analysis
//! ```
//!
//! [`SkillClusterer`] is immutable configuration. Every call to
//! [`SkillClusterer::fit`] builds a fresh, caller-owned [`FittedModel`], so
//! concurrent fits never share derived state and selection always reads the
//! exact fit it was asked about.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::analysis::{profile_clusters, ClusterAnalysis, ClusterProfile};
use crate::cluster::{Label, NOISE};
use crate::config::ClusterConfig;
use crate::error::{Error, Result};
use crate::metrics::{mean, silhouette_samples};
use crate::profile::{Corpus, Profile};
use crate::reduce::TruncatedSvd;
use crate::select::{self, SelectionRequest, SelectionResult};
use crate::vectorize::{TfidfVectorizer, Vocabulary};

/// Shape of the SVD stage when dimensionality reduction ran.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReductionSummary {
    /// Components kept after capping by the data shape.
    pub n_components: usize,
    /// Singular values, descending.
    pub singular_values: Vec<f64>,
    /// Fraction of feature variance captured per component.
    pub explained_variance_ratio: Vec<f64>,
}

/// Clusters professional profiles by their skill vocabulary.
#[derive(Debug, Clone, Default)]
pub struct SkillClusterer {
    config: ClusterConfig,
}

impl SkillClusterer {
    /// Create a clusterer with the given configuration.
    pub fn new(config: ClusterConfig) -> Self {
        Self { config }
    }

    /// The configuration every fit uses.
    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    /// Vectorize, optionally reduce, partition and analyze `profiles`.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyCorpus`] when `profiles` is empty.
    /// - [`Error::InsufficientVocabulary`] when document-frequency
    ///   filtering leaves no terms.
    /// - [`Error::InvalidClusterCount`] when a k-based algorithm is asked
    ///   for more clusters than there are profiles.
    pub fn fit(&self, profiles: &[Profile]) -> Result<FittedModel> {
        if profiles.is_empty() {
            return Err(Error::EmptyCorpus);
        }
        let config = &self.config;
        let corpus = Corpus::from_profiles(profiles);
        info!(profiles = corpus.len(), "fitting skill clusters");

        let (vocabulary, tfidf) =
            TfidfVectorizer::new(config.min_skill_freq, config.max_df).fit_transform(&corpus.documents)?;
        info!(
            terms = vocabulary.len(),
            nnz = tfidf.nnz(),
            "built tf-idf matrix"
        );

        let dense = tfidf.to_dense();
        let (features, projection) = if config.dim_reduction {
            let projection = TruncatedSvd::new(config.dim_components).fit_transform(&dense)?;
            (projection.features.clone(), Some(projection))
        } else {
            debug!("dimensionality reduction disabled");
            (dense, None)
        };

        let labels = config.algorithm.partition(&features, config)?;

        let samples = silhouette_samples(&features, &labels);
        let silhouette_score = samples.as_deref().map(mean);
        match silhouette_score {
            Some(score) => info!(silhouette = score, "scored clustering"),
            None => info!("fewer than two clusters, silhouette skipped"),
        }

        let clusters = profile_clusters(
            &features,
            &labels,
            vocabulary.terms(),
            projection.as_ref(),
        );
        let analysis = ClusterAnalysis::new(
            config.algorithm,
            config.effective_n_clusters(),
            silhouette_score,
            &clusters,
        );

        let reduction = projection.map(|p| ReductionSummary {
            n_components: p.n_components(),
            singular_values: p.singular_values,
            explained_variance_ratio: p.explained_variance_ratio,
        });

        info!(
            algorithm = %config.algorithm,
            clusters = clusters.len(),
            noise = labels.iter().filter(|&&l| l == NOISE).count(),
            "fit complete"
        );

        Ok(FittedModel {
            profile_ids: corpus.ids,
            skills: profiles.iter().map(|p| p.skills.clone()).collect(),
            vocabulary,
            features,
            labels,
            silhouette_samples: samples,
            clusters,
            reduction,
            analysis,
        })
    }
}

/// Everything one fit derived, aligned with the input profile order.
#[derive(Debug, Clone)]
pub struct FittedModel {
    profile_ids: Vec<String>,
    skills: Vec<Vec<String>>,
    vocabulary: Vocabulary,
    features: Vec<Vec<f32>>,
    labels: Vec<Label>,
    silhouette_samples: Option<Vec<f64>>,
    clusters: BTreeMap<Label, ClusterProfile>,
    reduction: Option<ReductionSummary>,
    analysis: ClusterAnalysis,
}

impl FittedModel {
    /// Number of fitted profiles.
    pub fn len(&self) -> usize {
        self.profile_ids.len()
    }

    /// Whether the model holds no profiles. Never true for a successful fit.
    pub fn is_empty(&self) -> bool {
        self.profile_ids.is_empty()
    }

    /// Profile ids in input order.
    pub fn profile_ids(&self) -> &[String] {
        &self.profile_ids
    }

    /// Declared skills per profile, as supplied.
    pub fn skills(&self) -> &[Vec<String>] {
        &self.skills
    }

    /// Fitted vocabulary.
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Feature rows clustering ran on.
    pub fn features(&self) -> &[Vec<f32>] {
        &self.features
    }

    /// One label per profile.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Per-profile silhouette, `None` with fewer than two labels.
    pub fn silhouette_samples(&self) -> Option<&[f64]> {
        self.silhouette_samples.as_deref()
    }

    /// Per-label centroid, members and full importance list.
    pub fn clusters(&self) -> &BTreeMap<Label, ClusterProfile> {
        &self.clusters
    }

    /// SVD stage summary, if reduction ran.
    pub fn reduction(&self) -> Option<&ReductionSummary> {
        self.reduction.as_ref()
    }

    /// Serializable analysis.
    pub fn analysis(&self) -> &ClusterAnalysis {
        &self.analysis
    }

    /// Profile id to label.
    ///
    /// Ids are expected to be unique; a repeated id keeps its last label.
    pub fn assignments(&self) -> BTreeMap<String, Label> {
        self.profile_ids
            .iter()
            .cloned()
            .zip(self.labels.iter().copied())
            .collect()
    }

    /// Pick top-ranked candidates per label from this fit.
    pub fn select(&self, request: &SelectionRequest) -> SelectionResult {
        select::select(self, request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Algorithm;

    fn profiles() -> Vec<Profile> {
        vec![
            Profile::new("p1", ["python", "sql"]),
            Profile::new("p2", ["python", "excel"]),
            Profile::new("p3", ["java", "sql"]),
            Profile::new("p4", ["java", "excel"]),
            Profile::new("p5", ["python", "sql"]),
            Profile::new("p6", ["java", "sql"]),
        ]
    }

    fn config() -> ClusterConfig {
        ClusterConfig::new()
            .with_algorithm(Algorithm::Kmeans)
            .with_n_clusters(2)
            .with_min_skill_freq(1)
            .with_max_df(1.0)
    }

    #[test]
    fn test_fit_aligns_with_input() {
        let model = SkillClusterer::new(config()).fit(&profiles()).unwrap();
        assert_eq!(model.len(), 6);
        assert_eq!(model.labels().len(), 6);
        assert_eq!(model.features().len(), 6);
        assert_eq!(model.profile_ids()[3], "p4");
        assert_eq!(model.vocabulary().terms(), &["excel", "java", "python", "sql"]);
        assert_eq!(model.assignments().len(), 6);
    }

    #[test]
    fn test_reduction_summary_present() {
        let model = SkillClusterer::new(config()).fit(&profiles()).unwrap();
        let reduction = model.reduction().unwrap();
        assert_eq!(reduction.n_components, 4);
        assert_eq!(reduction.singular_values.len(), 4);
    }

    #[test]
    fn test_without_reduction_features_are_tfidf() {
        let model = SkillClusterer::new(config().with_dim_reduction(false))
            .fit(&profiles())
            .unwrap();
        assert!(model.reduction().is_none());
        assert_eq!(model.features()[0].len(), 4);
    }

    #[test]
    fn test_empty_corpus() {
        let err = SkillClusterer::default().fit(&[]).unwrap_err();
        assert!(matches!(err, Error::EmptyCorpus));
    }

    #[test]
    fn test_too_many_clusters() {
        let err = SkillClusterer::new(config().with_n_clusters(10))
            .fit(&profiles())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidClusterCount { requested: 10, n_items: 6 }));
    }

    #[test]
    fn test_analysis_matches_labels() {
        let model = SkillClusterer::new(config()).fit(&profiles()).unwrap();
        let total: usize = model.analysis().cluster_sizes.values().sum();
        assert_eq!(total, 6);
        assert_eq!(model.analysis().n_clusters, 2);
        assert_eq!(model.clusters().len(), 2);
    }
}
