//! TF-IDF vectorization of skill documents.
//!
//! Each document becomes a sparse row over a shared vocabulary:
//!
//! ```text
//! w(t, d) = tf(t, d) × (ln((1 + N) / (1 + df(t))) + 1)
//! ```
//!
//! followed by L2 normalization of every row. The smoothed IDF keeps
//! terms that occur in every document at a weight of 1 instead of 0.
//!
//! # Vocabulary pruning
//!
//! | Filter | Rule |
//! |--------|------|
//! | stop words | NLTK English list from `stop-words` (function words only) |
//! | `min_df` | term appears in at least `min_df` documents |
//! | `max_df` | term appears in at most `⌊max_df × N⌋` documents |
//! | `max_features` | keep the most frequent terms corpus-wide |
//!
//! A vocabulary that prunes down to nothing is an error, never a
//! zero-column matrix.

use std::collections::{BTreeMap, HashMap, HashSet};

use stop_words::{get, LANGUAGE};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Hard cap on vocabulary size.
pub const MAX_FEATURES: usize = 300;

/// Sparse row-major matrix: one `(column, weight)` list per row.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseMatrix {
    rows: Vec<Vec<(usize, f32)>>,
    n_cols: usize,
}

impl SparseMatrix {
    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Non-zero entries of a row, sorted by column.
    pub fn row(&self, i: usize) -> &[(usize, f32)] {
        &self.rows[i]
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    /// Densify into one `Vec<f32>` per row.
    pub fn to_dense(&self) -> Vec<Vec<f32>> {
        self.rows
            .iter()
            .map(|row| {
                let mut dense = vec![0.0f32; self.n_cols];
                for &(j, w) in row {
                    dense[j] = w;
                }
                dense
            })
            .collect()
    }
}

/// TF-IDF vectorizer with document-frequency pruning.
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    min_df: usize,
    max_df: f64,
    max_features: usize,
    stop_words: HashSet<String>,
}

impl Default for TfidfVectorizer {
    fn default() -> Self {
        Self::new(1, 1.0)
    }
}

impl TfidfVectorizer {
    /// Create a vectorizer with the given document-frequency bounds.
    pub fn new(min_df: usize, max_df: f64) -> Self {
        Self {
            min_df,
            max_df,
            max_features: MAX_FEATURES,
            stop_words: get(LANGUAGE::English).iter().map(|w| w.to_string()).collect(),
        }
    }

    /// Override the vocabulary cap.
    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = max_features;
        self
    }

    /// Word tokens of at least two characters, lowercased, stop words removed.
    fn tokenize<'a>(&'a self, doc: &'a str) -> impl Iterator<Item = String> + 'a {
        doc.split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .filter(|t| t.chars().count() >= 2)
            .map(str::to_lowercase)
            .filter(|t| !self.stop_words.contains(t))
    }

    fn validate(&self) -> Result<()> {
        if self.min_df == 0 {
            return Err(Error::InvalidParameter {
                name: "min_skill_freq",
                message: "must be at least 1",
            });
        }
        if !(self.max_df > 0.0 && self.max_df <= 1.0) {
            return Err(Error::InvalidParameter {
                name: "max_df",
                message: "must be a fraction in (0, 1]",
            });
        }
        Ok(())
    }

    /// Learn the vocabulary and weight the corpus.
    pub fn fit_transform<S: AsRef<str>>(&self, docs: &[S]) -> Result<(Vocabulary, SparseMatrix)> {
        self.validate()?;
        if docs.is_empty() {
            return Err(Error::EmptyCorpus);
        }
        let n_docs = docs.len();

        let counts: Vec<HashMap<String, usize>> = docs
            .iter()
            .map(|d| {
                let mut tf = HashMap::new();
                for token in self.tokenize(d.as_ref()) {
                    *tf.entry(token).or_insert(0) += 1;
                }
                tf
            })
            .collect();

        let mut df: HashMap<&str, usize> = HashMap::new();
        let mut total: HashMap<&str, usize> = HashMap::new();
        for tf in &counts {
            for (term, &c) in tf {
                *df.entry(term.as_str()).or_insert(0) += 1;
                *total.entry(term.as_str()).or_insert(0) += c;
            }
        }
        if df.is_empty() {
            return Err(Error::insufficient_vocabulary(
                "documents contain no terms after stop-word removal",
            ));
        }

        let max_doc_count = (self.max_df * n_docs as f64).floor() as usize;
        if max_doc_count < self.min_df {
            return Err(Error::insufficient_vocabulary(format!(
                "max_df={} allows at most {max_doc_count} documents, fewer than min_df={}",
                self.max_df, self.min_df
            )));
        }

        let mut kept: Vec<&str> = df
            .iter()
            .filter(|&(_, &d)| d >= self.min_df && d <= max_doc_count)
            .map(|(&t, _)| t)
            .collect();
        if kept.is_empty() {
            return Err(Error::insufficient_vocabulary(format!(
                "no term has document frequency in [{}, {max_doc_count}] across {n_docs} documents",
                self.min_df
            )));
        }

        if kept.len() > self.max_features {
            kept.sort_by(|a, b| total[b].cmp(&total[a]).then_with(|| a.cmp(b)));
            kept.truncate(self.max_features);
        }
        kept.sort_unstable();

        let terms: Vec<String> = kept.iter().map(|t| t.to_string()).collect();
        let idf: Vec<f64> = kept
            .iter()
            .map(|t| ((1.0 + n_docs as f64) / (1.0 + df[t] as f64)).ln() + 1.0)
            .collect();
        let vocabulary = Vocabulary::new(terms, idf);
        debug!(
            candidates = df.len(),
            retained = vocabulary.len(),
            max_doc_count,
            "pruned vocabulary"
        );

        let rows = counts
            .iter()
            .map(|tf| {
                let mut row: Vec<(usize, f64)> = tf
                    .iter()
                    .filter_map(|(term, &c)| {
                        vocabulary
                            .index_of(term)
                            .map(|j| (j, c as f64 * vocabulary.idf[j]))
                    })
                    .collect();
                row.sort_unstable_by_key(|&(j, _)| j);
                let norm = row.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
                row.into_iter()
                    .map(|(j, w)| (j, if norm > 0.0 { (w / norm) as f32 } else { 0.0 }))
                    .collect()
            })
            .collect();

        let matrix = SparseMatrix {
            rows,
            n_cols: vocabulary.len(),
        };
        info!(
            rows = matrix.n_rows(),
            cols = matrix.n_cols(),
            nnz = matrix.nnz(),
            min_df = self.min_df,
            max_df = self.max_df,
            "encoded TF-IDF matrix"
        );
        Ok((vocabulary, matrix))
    }
}

/// Retained terms in column order, with their IDF weights.
#[derive(Debug, Clone, PartialEq)]
pub struct Vocabulary {
    terms: Vec<String>,
    idf: Vec<f64>,
    index: BTreeMap<String, usize>,
}

impl Vocabulary {
    fn new(terms: Vec<String>, idf: Vec<f64>) -> Self {
        let index = terms
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();
        Self { terms, idf, index }
    }

    /// Terms in column order.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// IDF weight per column.
    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    /// Column of a term.
    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.index.get(term).copied()
    }

    /// Number of terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Whether the vocabulary is empty.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs() -> Vec<&'static str> {
        vec!["python sql", "python excel", "java sql", "java excel"]
    }

    #[test]
    fn test_vocabulary_sorted() {
        let (vocab, m) = TfidfVectorizer::new(1, 1.0).fit_transform(&docs()).unwrap();
        assert_eq!(vocab.terms(), &["excel", "java", "python", "sql"]);
        assert_eq!(m.n_rows(), 4);
        assert_eq!(m.n_cols(), 4);
    }

    #[test]
    fn test_rows_l2_normalized() {
        let (_, m) = TfidfVectorizer::new(1, 1.0).fit_transform(&docs()).unwrap();
        for row in m.to_dense() {
            let norm: f32 = row.iter().map(|x| x * x).sum::<f32>().sqrt();
            assert!((norm - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_smoothed_idf() {
        let (vocab, _) = TfidfVectorizer::new(1, 1.0)
            .fit_transform(&["kotlin scala", "kotlin", "kotlin"])
            .unwrap();
        let kotlin = vocab.index_of("kotlin").unwrap();
        let scala = vocab.index_of("scala").unwrap();
        assert!((vocab.idf()[kotlin] - 1.0).abs() < 1e-12);
        assert!((vocab.idf()[scala] - ((4.0f64 / 2.0).ln() + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_min_df_prunes_rare_terms() {
        let (vocab, _) = TfidfVectorizer::new(2, 1.0)
            .fit_transform(&["python sql", "python rust", "python"])
            .unwrap();
        assert_eq!(vocab.terms(), &["python"]);
    }

    #[test]
    fn test_max_df_prunes_common_terms() {
        let (vocab, _) = TfidfVectorizer::new(1, 0.5)
            .fit_transform(&["python sql", "python rust", "python java", "python"])
            .unwrap();
        assert!(vocab.index_of("python").is_none());
        assert!(vocab.index_of("sql").is_some());
    }

    #[test]
    fn test_min_df_too_high_is_insufficient_vocabulary() {
        let err = TfidfVectorizer::new(3, 1.0)
            .fit_transform(&["python sql", "java excel"])
            .unwrap_err();
        assert!(matches!(err, Error::InsufficientVocabulary { .. }));
    }

    #[test]
    fn test_empty_documents_are_insufficient_vocabulary() {
        let err = TfidfVectorizer::new(1, 1.0)
            .fit_transform(&["", ""])
            .unwrap_err();
        assert!(matches!(err, Error::InsufficientVocabulary { .. }));
    }

    #[test]
    fn test_stop_words_removed() {
        let (vocab, _) = TfidfVectorizer::new(1, 1.0)
            .fit_transform(&["the python", "and java"])
            .unwrap();
        assert!(vocab.index_of("the").is_none());
        assert!(vocab.index_of("and").is_none());
    }

    #[test]
    fn test_skill_words_are_not_stop_words() {
        let (vocab, _) = TfidfVectorizer::new(1, 1.0)
            .fit_transform(&["microsoft research", "microsoft web", "research web", "python web"])
            .unwrap();
        assert_eq!(vocab.terms(), &["microsoft", "python", "research", "web"]);
    }

    #[test]
    fn test_max_features_keeps_most_frequent() {
        let (vocab, _) = TfidfVectorizer::new(1, 1.0)
            .with_max_features(2)
            .fit_transform(&["rust rust python", "rust python java", "scala"])
            .unwrap();
        assert_eq!(vocab.terms(), &["python", "rust"]);
    }

    #[test]
    fn test_empty_document_is_zero_row() {
        let (_, m) = TfidfVectorizer::new(1, 1.0)
            .fit_transform(&["python", ""])
            .unwrap();
        assert!(m.row(1).is_empty());
        assert!(m.to_dense()[1].iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_invalid_max_df() {
        let err = TfidfVectorizer::new(1, 1.5).fit_transform(&["a b"]).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { name: "max_df", .. }));
    }
}
