//! Profiles and skill-list cleaning.
//!
//! A profile's declared skills are reduced to a single whitespace-joined
//! "document" before vectorization. Only short, alphanumeric, non-junk
//! tokens survive:
//!
//! ```text
//! ["Python", "C++", "SQL", "Skills", "go"]  ->  "python sql"
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Section headers and resume boilerplate that leak into skill lists.
pub const JUNK_SKILLS: &[&str] = &[
    "state",
    "accomplishments",
    "highlights",
    "sales",
    "summary",
    "experience",
    "skills",
    "company",
    "date",
    "manager",
    "benefits",
    "approach",
    "city",
];

/// A professional profile as supplied by the corpus loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Stable profile identifier.
    pub id: String,
    /// Declared skills, in source order.
    #[serde(default)]
    pub skills: Vec<String>,
    /// Free-text summary. Not used for clustering.
    #[serde(default)]
    pub summary: String,
}

impl Profile {
    /// Create a profile with no summary.
    pub fn new<S: Into<String>>(id: impl Into<String>, skills: impl IntoIterator<Item = S>) -> Self {
        Self {
            id: id.into(),
            skills: skills.into_iter().map(Into::into).collect(),
            summary: String::new(),
        }
    }
}

/// Cleaned documents aligned with their profile ids.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    /// Profile ids in input order.
    pub ids: Vec<String>,
    /// One document per profile, same order as `ids`.
    pub documents: Vec<String>,
}

impl Corpus {
    /// Build a corpus from profiles.
    pub fn from_profiles(profiles: &[Profile]) -> Self {
        debug!(profiles = profiles.len(), "preprocessing profiles");
        let mut corpus = Corpus {
            ids: Vec::with_capacity(profiles.len()),
            documents: Vec::with_capacity(profiles.len()),
        };
        for profile in profiles {
            corpus.ids.push(profile.id.clone());
            corpus.documents.push(skill_document(&profile.skills));
        }
        corpus
    }

    /// Number of documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the corpus has no documents.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Clean a single skill. Returns the lowercased token if it survives.
pub fn clean_skill(skill: &str) -> Option<String> {
    if skill.chars().count() <= 2 || !skill.chars().all(char::is_alphanumeric) {
        return None;
    }
    let lowered = skill.to_lowercase();
    if JUNK_SKILLS.contains(&lowered.as_str()) {
        return None;
    }
    Some(lowered)
}

/// Join the surviving skills of one profile into a document.
pub fn skill_document<S: AsRef<str>>(skills: &[S]) -> String {
    skills
        .iter()
        .filter_map(|s| clean_skill(s.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}
