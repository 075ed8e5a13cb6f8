//! Labeling engine
//!
//! Ranks terms of every community's text jointly through a [`TermWeighter`] and
//! turns the top terms into a short label. When no community has text, or the
//! weighter fails, every community gets the `Community {id}` fallback.

use crate::aggregate::CommunityText;
use crate::algo::{CommunityId, TermWeightParams, TermWeighter};
use tracing::{debug, warn};

/// Terms kept per community
pub const TOP_TERMS: usize = 5;
/// Terms joined into the label
pub const LABEL_TERMS: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct CommunityLabel {
    pub label: String,
    /// Highest weight first, at most [`TOP_TERMS`]
    pub top_terms: Vec<String>,
}

impl CommunityLabel {
    pub fn fallback(id: CommunityId) -> Self {
        Self {
            label: fallback_label(id),
            top_terms: Vec::new(),
        }
    }
}

pub fn fallback_label(id: CommunityId) -> String {
    format!("Community {}", id)
}

/// How the labels were obtained
#[derive(Debug, Clone, PartialEq)]
pub enum LabelingStatus {
    /// The weighter ran and its terms were used
    Weighted,
    /// No community had text; the weighter was not called
    NoText,
    /// The weighter failed; fallback labels everywhere
    OracleFailed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Labeling {
    /// Index-aligned with the community ids passed in
    pub labels: Vec<CommunityLabel>,
    pub status: LabelingStatus,
}

/// Label communities from their concatenated texts.
///
/// `ids` and `texts` are index-aligned and sorted by community id.
pub fn label_communities(
    ids: &[CommunityId],
    texts: &[CommunityText],
    weighter: &dyn TermWeighter,
) -> Labeling {
    debug_assert_eq!(ids.len(), texts.len());

    if !texts.iter().any(CommunityText::has_content) {
        debug!("No community text; using fallback labels");
        return fallback_all(ids, LabelingStatus::NoText);
    }

    let documents: Vec<String> = texts.iter().map(|t| t.as_str().to_string()).collect();
    let ranked = match weighter.weigh(&documents, &TermWeightParams::default()) {
        Ok(ranked) if ranked.len() == documents.len() => ranked,
        Ok(ranked) => {
            let reason = format!(
                "expected {} ranked documents, got {}",
                documents.len(),
                ranked.len()
            );
            warn!("Term weighting returned malformed output: {}", reason);
            return fallback_all(ids, LabelingStatus::OracleFailed(reason));
        }
        Err(e) => {
            warn!("Term weighting failed, using fallback labels: {}", e);
            return fallback_all(ids, LabelingStatus::OracleFailed(e.to_string()));
        }
    };

    let labels = ids
        .iter()
        .zip(ranked)
        .map(|(&id, terms)| label_from_terms(id, terms))
        .collect();

    Labeling {
        labels,
        status: LabelingStatus::Weighted,
    }
}

fn label_from_terms(id: CommunityId, mut ranked: Vec<(String, f64)>) -> CommunityLabel {
    // Stable: equal weights keep the weighter's order
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    let top_terms: Vec<String> = ranked
        .into_iter()
        .take(TOP_TERMS)
        .filter(|(_, weight)| *weight > 0.0)
        .map(|(term, _)| term)
        .collect();

    if top_terms.is_empty() {
        return CommunityLabel::fallback(id);
    }

    let label = top_terms
        .iter()
        .take(LABEL_TERMS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    CommunityLabel { label, top_terms }
}

fn fallback_all(ids: &[CommunityId], status: LabelingStatus) -> Labeling {
    Labeling {
        labels: ids.iter().map(|&id| CommunityLabel::fallback(id)).collect(),
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::{OracleError, OracleResult, TfIdfWeighter};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingWeighter {
        calls: AtomicUsize,
        result: OracleResult<Vec<Vec<(String, f64)>>>,
    }

    impl CountingWeighter {
        fn new(result: OracleResult<Vec<Vec<(String, f64)>>>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                result,
            }
        }
    }

    impl TermWeighter for CountingWeighter {
        fn weigh(
            &self,
            _: &[String],
            params: &TermWeightParams,
        ) -> OracleResult<Vec<Vec<(String, f64)>>> {
            assert_eq!(params.vocabulary_limit, 1000);
            assert_eq!(params.max_doc_freq, 0.8);
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    fn text(s: &str) -> CommunityText {
        CommunityText::Text(s.to_string())
    }

    fn terms(pairs: &[(&str, f64)]) -> Vec<(String, f64)> {
        pairs.iter().map(|(t, w)| (t.to_string(), *w)).collect()
    }

    #[test]
    fn test_no_text_skips_weighter() {
        let weighter = CountingWeighter::new(Ok(Vec::new()));
        let labeling = label_communities(
            &[2, 9],
            &[CommunityText::Empty, text("  ")],
            &weighter,
        );

        assert_eq!(weighter.calls.load(Ordering::SeqCst), 0);
        assert_eq!(labeling.status, LabelingStatus::NoText);
        assert_eq!(labeling.labels[0], CommunityLabel::fallback(2));
        assert_eq!(labeling.labels[1].label, "Community 9");
    }

    #[test]
    fn test_weighter_failure_is_recovered() {
        let weighter = CountingWeighter::new(Err(OracleError::Failed("empty vocabulary".into())));
        let labeling = label_communities(&[0, 1], &[text("the"), text("and")], &weighter);

        assert!(matches!(labeling.status, LabelingStatus::OracleFailed(_)));
        assert!(labeling.labels.iter().all(|l| l.top_terms.is_empty()));
        assert_eq!(labeling.labels[1].label, "Community 1");
    }

    #[test]
    fn test_wrong_row_count_is_recovered() {
        let weighter = CountingWeighter::new(Ok(vec![terms(&[("x", 1.0)])]));
        let labeling = label_communities(&[0, 1], &[text("x"), text("y")], &weighter);
        assert!(matches!(labeling.status, LabelingStatus::OracleFailed(_)));
    }

    #[test]
    fn test_label_uses_three_of_five_positive_terms() {
        let weighter = CountingWeighter::new(Ok(vec![
            terms(&[("a", 0.9), ("b", 0.8), ("c", 0.7), ("d", 0.6), ("e", 0.5), ("f", 0.4)]),
            terms(&[("solo", 0.5), ("zero", 0.0)]),
            terms(&[("nil", 0.0)]),
        ]));
        let labeling = label_communities(
            &[4, 5, 6],
            &[text("..."), text("..."), CommunityText::Empty],
            &weighter,
        );

        assert_eq!(labeling.status, LabelingStatus::Weighted);
        assert_eq!(labeling.labels[0].label, "a, b, c");
        assert_eq!(labeling.labels[0].top_terms, vec!["a", "b", "c", "d", "e"]);
        assert_eq!(labeling.labels[1].label, "solo");
        assert_eq!(labeling.labels[1].top_terms, vec!["solo"]);
        assert_eq!(labeling.labels[2], CommunityLabel::fallback(6));
    }

    #[test]
    fn test_unsorted_rows_are_ranked_by_weight() {
        let weighter = CountingWeighter::new(Ok(vec![terms(&[
            ("low", 0.1),
            ("zero", 0.0),
            ("high", 0.9),
            ("tie_a", 0.3),
            ("mid", 0.5),
            ("tie_b", 0.3),
            ("lowest", 0.05),
        ])]));
        let labeling = label_communities(&[0], &[text("...")], &weighter);

        assert_eq!(labeling.labels[0].label, "high, mid, tie_a");
        assert_eq!(
            labeling.labels[0].top_terms,
            vec!["high", "mid", "tie_a", "tie_b", "low"]
        );
    }

    #[test]
    fn test_tfidf_labels_distinct_topics() {
        let labeling = label_communities(
            &[0, 1],
            &[text("cats dogs cats dogs"), text("finance stocks finance")],
            &TfIdfWeighter,
        );
        assert_eq!(labeling.labels[0].label, "cats, dogs");
        assert_eq!(labeling.labels[1].label, "finance, stocks");
    }

    #[test]
    fn test_tfidf_single_community_falls_back() {
        let labeling = label_communities(&[3], &[text("cats dogs")], &TfIdfWeighter);
        assert!(matches!(labeling.status, LabelingStatus::OracleFailed(_)));
        assert_eq!(labeling.labels[0].label, "Community 3");
    }
}
