use std::collections::HashSet;

use proptest::prelude::*;
use skill_cohort::cluster::{distinct_labels, Clustering, Dbscan, HierarchicalClustering, Kmeans};
use skill_cohort::{Algorithm, ClusterConfig, Profile, SelectionRequest, SkillClusterer, NOISE};

const SKILLS: &[&str] = &[
    "python", "java", "sql", "excel", "docker", "kotlin", "scala", "tableau",
];

fn profiles_strategy() -> impl Strategy<Value = Vec<Profile>> {
    prop::collection::vec(prop::sample::subsequence(SKILLS, 1..4), 2..12).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, skills)| Profile::new(format!("p{i}"), skills))
            .collect()
    })
}

fn config(algorithm: Algorithm, k: usize) -> ClusterConfig {
    ClusterConfig::new()
        .with_algorithm(algorithm)
        .with_n_clusters(k)
        .with_min_skill_freq(1)
        .with_max_df(1.0)
}

proptest! {
    #[test]
    fn prop_kmeans_labels_cover_zero_to_k(
        data in prop::collection::vec(prop::collection::vec(-10.0f32..10.0, 2), 1..20),
        k in 1usize..5
    ) {
        prop_assume!(k <= data.len());
        let labels = Kmeans::new(k).with_seed(42).fit_predict(&data).unwrap();
        prop_assert_eq!(labels.len(), data.len());
        prop_assert_eq!(distinct_labels(&labels), (0..k as i32).collect::<Vec<_>>());
    }

    #[test]
    fn prop_ward_labels_cover_zero_to_k(
        data in prop::collection::vec(prop::collection::vec(-10.0f32..10.0, 3), 1..20),
        k in 1usize..5
    ) {
        prop_assume!(k <= data.len());
        let labels = HierarchicalClustering::new(k).fit_predict(&data).unwrap();
        prop_assert_eq!(distinct_labels(&labels), (0..k as i32).collect::<Vec<_>>());
    }

    #[test]
    fn prop_dbscan_labels_noise_or_dense(
        data in prop::collection::vec(prop::collection::vec(-5.0f32..5.0, 2), 1..30),
        eps in 0.1f32..3.0,
        min_pts in 1usize..5
    ) {
        let labels = Dbscan::new(eps, min_pts).fit_predict(&data).unwrap();
        prop_assert_eq!(labels.len(), data.len());
        prop_assert!(labels.iter().all(|&l| l >= NOISE));
        // Cluster ids are contiguous from zero.
        let clusters: Vec<i32> = distinct_labels(&labels).into_iter().filter(|&l| l >= 0).collect();
        prop_assert_eq!(clusters.clone(), (0..clusters.len() as i32).collect::<Vec<_>>());
    }

    #[test]
    fn prop_assignment_table_is_complete(
        profiles in profiles_strategy(),
        k in 1usize..4
    ) {
        prop_assume!(k <= profiles.len());
        let model = SkillClusterer::new(config(Algorithm::Agglomerative, k)).fit(&profiles).unwrap();
        let assignments = model.assignments();
        prop_assert_eq!(assignments.len(), profiles.len());
        for p in &profiles {
            prop_assert!(assignments.contains_key(&p.id));
        }
        if let Some(score) = model.analysis().silhouette_score {
            prop_assert!((-1.0..=1.0).contains(&score));
        }
    }

    #[test]
    fn prop_selection_bounded_by_request_and_membership(
        profiles in profiles_strategy(),
        requests in prop::collection::vec((-1i32..4, -3i64..8), 0..6)
    ) {
        let k = 2.min(profiles.len());
        let model = SkillClusterer::new(config(Algorithm::Kmeans, k)).fit(&profiles).unwrap();
        let request: SelectionRequest = requests.into_iter().collect();
        let picked = model.select(&request);

        prop_assert_eq!(picked.len(), request.len());
        for (label, ids) in &picked {
            let members = model.analysis().cluster_sizes.get(label).copied().unwrap_or(0);
            let wanted = usize::try_from(request[label].max(0)).unwrap();
            prop_assert_eq!(ids.len(), wanted.min(members));

            let assignments = model.assignments();
            prop_assert!(ids.iter().all(|id| assignments[id] == *label));
            let unique: HashSet<&String> = ids.iter().collect();
            prop_assert_eq!(unique.len(), ids.len());
        }
    }
}
