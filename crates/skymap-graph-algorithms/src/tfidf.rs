//! TF-IDF term weighting
//!
//! Lower-cased `\b\w\w+\b` tokens, optional English stop-word filtering,
//! document-frequency pruning, a vocabulary cap by corpus frequency, smooth idf
//! and L2-normalised rows.

use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use std::sync::OnceLock;
use thiserror::Error;

/// TF-IDF errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TfIdfError {
    /// No token survived tokenisation and stop-word filtering
    #[error("empty vocabulary; documents may only contain stop words")]
    EmptyVocabulary,

    /// `max_df` admits fewer documents than a term can appear in
    #[error("max_df={max_df} corresponds to fewer than one document out of {documents}")]
    MaxDfBelowOneDocument { max_df: f64, documents: usize },

    /// Document-frequency pruning removed every term
    #[error("after pruning, no terms remain")]
    NoTermsAfterPruning,

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// TF-IDF configuration
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TfIdfConfig {
    /// Keep at most this many terms, by total count across the corpus
    pub max_features: Option<usize>,
    /// Drop terms present in more than `max_df * n_documents` documents. In (0, 1].
    pub max_df: f64,
    /// Filter the built-in English stop-word list
    pub english_stop_words: bool,
}

impl Default for TfIdfConfig {
    fn default() -> Self {
        Self {
            max_features: None,
            max_df: 1.0,
            english_stop_words: false,
        }
    }
}

/// Weighted document-term matrix, one sparse row per document
#[derive(Debug, Clone)]
pub struct TfIdfMatrix {
    /// Vocabulary in alphabetical order; row entries index into it
    pub vocabulary: Vec<String>,
    /// Sparse rows `(term index, weight)`, weights > 0
    pub rows: Vec<Vec<(usize, f64)>>,
}

impl TfIdfMatrix {
    /// Terms of one document by weight descending, ties alphabetical
    pub fn ranked_terms(&self, document: usize) -> Vec<(String, f64)> {
        let mut entries: Vec<(usize, f64)> = self.rows[document].clone();
        entries.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        entries
            .into_iter()
            .map(|(t, w)| (self.vocabulary[t].clone(), w))
            .collect()
    }
}

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b\w\w+\b").expect("static token pattern"))
}

fn stop_words() -> &'static HashSet<&'static str> {
    static WORDS: OnceLock<HashSet<&'static str>> = OnceLock::new();
    WORDS.get_or_init(|| ENGLISH_STOP_WORDS.iter().copied().collect())
}

/// Split a document into lower-cased tokens of two or more word characters.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    token_pattern()
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Fit TF-IDF over a corpus and return the weighted matrix.
pub fn tfidf(documents: &[String], config: &TfIdfConfig) -> Result<TfIdfMatrix, TfIdfError> {
    if !(config.max_df > 0.0 && config.max_df <= 1.0) {
        return Err(TfIdfError::InvalidParameter(format!(
            "max_df must be in (0, 1], got {}",
            config.max_df
        )));
    }

    let n_docs = documents.len();
    let stops = stop_words();

    // term -> (document frequency, total count); per-document counts
    let mut stats: BTreeMap<String, (usize, usize)> = BTreeMap::new();
    let mut doc_counts: Vec<BTreeMap<String, usize>> = Vec::with_capacity(n_docs);
    for doc in documents {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for token in tokenize(doc) {
            if config.english_stop_words && stops.contains(token.as_str()) {
                continue;
            }
            *counts.entry(token).or_insert(0) += 1;
        }
        for (term, &count) in &counts {
            let entry = stats.entry(term.clone()).or_insert((0, 0));
            entry.0 += 1;
            entry.1 += count;
        }
        doc_counts.push(counts);
    }

    if stats.is_empty() {
        return Err(TfIdfError::EmptyVocabulary);
    }

    let max_doc_count = config.max_df * n_docs as f64;
    if max_doc_count < 1.0 {
        return Err(TfIdfError::MaxDfBelowOneDocument {
            max_df: config.max_df,
            documents: n_docs,
        });
    }

    let mut kept: Vec<(String, usize)> = stats
        .into_iter()
        .filter(|(_, (df, _))| (*df as f64) <= max_doc_count)
        .map(|(term, (_, total))| (term, total))
        .collect();
    if kept.is_empty() {
        return Err(TfIdfError::NoTermsAfterPruning);
    }

    if let Some(limit) = config.max_features {
        if kept.len() > limit {
            kept.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            kept.truncate(limit);
            kept.sort_by(|a, b| a.0.cmp(&b.0));
        }
    }

    let vocabulary: Vec<String> = kept.into_iter().map(|(term, _)| term).collect();
    let index: BTreeMap<&str, usize> = vocabulary
        .iter()
        .enumerate()
        .map(|(i, t)| (t.as_str(), i))
        .collect();

    let mut df = vec![0usize; vocabulary.len()];
    for counts in &doc_counts {
        for term in counts.keys() {
            if let Some(&i) = index.get(term.as_str()) {
                df[i] += 1;
            }
        }
    }
    let idf: Vec<f64> = df
        .iter()
        .map(|&d| ((1.0 + n_docs as f64) / (1.0 + d as f64)).ln() + 1.0)
        .collect();

    let rows = doc_counts
        .iter()
        .map(|counts| {
            let mut row: Vec<(usize, f64)> = counts
                .iter()
                .filter_map(|(term, &count)| {
                    index.get(term.as_str()).map(|&i| (i, count as f64 * idf[i]))
                })
                .collect();
            let norm = row.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
            if norm > 0.0 {
                row.iter_mut().for_each(|(_, w)| *w /= norm);
            }
            row.retain(|(_, w)| *w > 0.0);
            row
        })
        .collect();

    Ok(TfIdfMatrix { vocabulary, rows })
}

/// Common English function words
pub const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "afterwards", "again", "against", "all", "almost",
    "alone", "along", "already", "also", "although", "always", "am", "among", "amongst", "amount",
    "an", "and", "another", "any", "anyhow", "anyone", "anything", "anyway", "anywhere", "are",
    "around", "as", "at", "back", "be", "became", "because", "become", "becomes", "becoming",
    "been", "before", "beforehand", "behind", "being", "below", "beside", "besides", "between",
    "beyond", "both", "bottom", "but", "by", "call", "can", "cannot", "cant", "co", "con",
    "could", "couldnt", "de", "describe", "detail", "do", "done", "down", "due", "during", "each",
    "eg", "eight", "either", "eleven", "else", "elsewhere", "empty", "enough", "etc", "even",
    "ever", "every", "everyone", "everything", "everywhere", "except", "few", "fifteen", "fifty",
    "fill", "find", "first", "five", "for", "former", "formerly", "forty", "found", "four",
    "from", "front", "full", "further", "get", "give", "go", "had", "has", "hasnt", "have", "he",
    "hence", "her", "here", "hereafter", "hereby", "herein", "hereupon", "hers", "herself", "him",
    "himself", "his", "how", "however", "hundred", "i", "ie", "if", "in", "inc", "indeed",
    "interest", "into", "is", "it", "its", "itself", "keep", "last", "latter", "latterly",
    "least", "less", "ltd", "made", "many", "may", "me", "meanwhile", "might", "mine", "more",
    "moreover", "most", "mostly", "move", "much", "must", "my", "myself", "name", "namely",
    "neither", "never", "nevertheless", "next", "nine", "no", "nobody", "none", "noone", "nor",
    "not", "nothing", "now", "nowhere", "of", "off", "often", "on", "once", "one", "only",
    "onto", "or", "other", "others", "otherwise", "our", "ours", "ourselves", "out", "over",
    "own", "part", "per", "perhaps", "please", "put", "rather", "re", "same", "see", "seem",
    "seemed", "seeming", "seems", "serious", "several", "she", "should", "show", "side", "since",
    "sincere", "six", "sixty", "so", "some", "somehow", "someone", "something", "sometime",
    "sometimes", "somewhere", "still", "such", "take", "ten", "than", "that", "the", "their",
    "them", "themselves", "then", "thence", "there", "thereafter", "thereby", "therefore",
    "therein", "thereupon", "these", "they", "thick", "thin", "third", "this", "those", "though",
    "three", "through", "throughout", "thru", "thus", "to", "together", "too", "top", "toward",
    "towards", "twelve", "twenty", "two", "un", "under", "until", "up", "upon", "us", "very",
    "via", "was", "we", "well", "were", "what", "whatever", "when", "whence", "whenever", "where",
    "whereafter", "whereas", "whereby", "wherein", "whereupon", "wherever", "whether", "which",
    "while", "whither", "who", "whoever", "whole", "whom", "whose", "why", "will", "with",
    "within", "without", "would", "yet", "you", "your", "yours", "yourself", "yourselves",
];

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    fn labeling_config() -> TfIdfConfig {
        TfIdfConfig {
            max_features: Some(1000),
            max_df: 0.8,
            english_stop_words: true,
        }
    }

    #[test]
    fn test_tokenize_lowercases_and_drops_single_chars() {
        assert_eq!(tokenize("I love Rust, a LOT!"), vec!["love", "rust", "lot"]);
    }

    #[test]
    fn test_distinct_documents_rank_their_own_terms() {
        let matrix = tfidf(
            &docs(&["cats dogs cats dogs", "finance stocks finance"]),
            &labeling_config(),
        )
        .unwrap();

        let first: Vec<String> = matrix.ranked_terms(0).into_iter().map(|(t, _)| t).collect();
        assert_eq!(first, vec!["cats", "dogs"]);

        let second = matrix.ranked_terms(1);
        assert_eq!(second[0].0, "finance");
        assert_eq!(second[1].0, "stocks");
        assert!(second[0].1 > second[1].1);

        let norm: f64 = second.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_common_terms_are_pruned_by_max_df() {
        let matrix = tfidf(
            &docs(&["rust graph", "rust music", "rust film"]),
            &labeling_config(),
        )
        .unwrap();
        assert!(!matrix.vocabulary.contains(&"rust".to_string()));
        assert_eq!(matrix.ranked_terms(0)[0].0, "graph");
    }

    #[test]
    fn test_stop_words_only_is_empty_vocabulary() {
        let err = tfidf(&docs(&["the and of", "is it"]), &labeling_config()).unwrap_err();
        assert_eq!(err, TfIdfError::EmptyVocabulary);
    }

    #[test]
    fn test_single_document_cannot_satisfy_max_df() {
        let err = tfidf(&docs(&["cats dogs"]), &labeling_config()).unwrap_err();
        assert!(matches!(err, TfIdfError::MaxDfBelowOneDocument { .. }));
    }

    #[test]
    fn test_everything_pruned() {
        let config = TfIdfConfig {
            max_df: 0.5,
            ..labeling_config()
        };
        let err = tfidf(&docs(&["same words", "same words"]), &config).unwrap_err();
        assert_eq!(err, TfIdfError::NoTermsAfterPruning);
    }

    #[test]
    fn test_max_features_keeps_most_frequent() {
        let config = TfIdfConfig {
            max_features: Some(1),
            ..labeling_config()
        };
        let matrix = tfidf(&docs(&["apple apple pear", "plum"]), &config).unwrap();
        assert_eq!(matrix.vocabulary, vec!["apple"]);
        assert!(matrix.rows[1].is_empty());
    }
}
