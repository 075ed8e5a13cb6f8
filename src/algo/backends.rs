//! Reference oracle implementations backed by `skymap-graph-algorithms`

use super::{
    CommunityDetector, CommunityId, GraphEmbedder, OracleError, OracleResult, Projector,
    TermWeightParams, TermWeighter, WalkParams,
};
use ndarray::Array2;
use skymap_graph_algorithms::{
    leiden, node2vec, pca_2d, tfidf, GraphView, KeyedVectors, LeidenConfig, Node2VecConfig,
    TfIdfConfig, UndirectedGraph,
};
use tracing::debug;

/// Leiden-style modularity optimisation for directed graphs
#[derive(Debug, Clone)]
pub struct LeidenDetector {
    pub seed: Option<u64>,
}

impl Default for LeidenDetector {
    fn default() -> Self {
        Self { seed: Some(42) }
    }
}

impl CommunityDetector for LeidenDetector {
    fn detect(&self, graph: &GraphView, resolution: f64) -> OracleResult<Vec<CommunityId>> {
        if !resolution.is_finite() || resolution <= 0.0 {
            return Err(OracleError::InvalidParameter(format!(
                "resolution must be positive, got {}",
                resolution
            )));
        }
        let config = LeidenConfig {
            resolution,
            seed: self.seed,
            ..Default::default()
        };
        let result = leiden(graph, &config);
        debug!(
            "Leiden: {} communities, quality {:.4}, {} levels",
            result.community_count, result.quality, result.levels
        );
        Ok(result
            .membership
            .into_iter()
            .map(|c| c as CommunityId)
            .collect())
    }
}

/// Uniform random-walk node2vec with skip-gram training
#[derive(Debug, Clone)]
pub struct Node2VecEmbedder {
    pub seed: u64,
    pub epochs: usize,
}

impl Default for Node2VecEmbedder {
    fn default() -> Self {
        Self { seed: 42, epochs: 1 }
    }
}

impl GraphEmbedder for Node2VecEmbedder {
    fn embed(
        &self,
        graph: &UndirectedGraph,
        dimensions: usize,
        walk: &WalkParams,
    ) -> OracleResult<KeyedVectors> {
        if dimensions == 0 {
            return Err(OracleError::InvalidParameter(
                "dimensions must be at least 1".to_string(),
            ));
        }
        let config = Node2VecConfig {
            dimensions,
            walk_length: walk.walk_length,
            num_walks: walk.num_walks,
            window: walk.window,
            epochs: self.epochs,
            seed: self.seed,
            ..Default::default()
        };
        Ok(node2vec(graph, &config))
    }
}

/// Principal component projection
#[derive(Debug, Clone, Default)]
pub struct PcaProjector;

impl Projector for PcaProjector {
    fn project(&self, embeddings: &Array2<f64>, seed: u64) -> OracleResult<Array2<f64>> {
        Ok(pca_2d(embeddings, seed))
    }
}

/// TF-IDF term weighting
#[derive(Debug, Clone, Default)]
pub struct TfIdfWeighter;

impl TermWeighter for TfIdfWeighter {
    fn weigh(
        &self,
        documents: &[String],
        params: &TermWeightParams,
    ) -> OracleResult<Vec<Vec<(String, f64)>>> {
        let config = TfIdfConfig {
            max_features: Some(params.vocabulary_limit),
            max_df: params.max_doc_freq,
            english_stop_words: params.english_stop_words,
        };
        let matrix = tfidf(documents, &config).map_err(|e| OracleError::Failed(e.to_string()))?;
        Ok((0..documents.len()).map(|d| matrix.ranked_terms(d)).collect())
    }
}
