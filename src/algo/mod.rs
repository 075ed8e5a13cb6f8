//! Oracle integration layer
//!
//! The four heavy algorithms (community detection, graph embedding,
//! dimensionality reduction, term weighting) sit behind narrow traits. The
//! pipeline only talks to these traits; the reference implementations in
//! `skymap-graph-algorithms` are wired up in [`backends`], and [`adapter`]
//! validates whatever an oracle hands back.

pub mod adapter;
pub mod backends;

use ndarray::Array2;
pub use skymap_graph_algorithms::{GraphView, KeyedVectors, UndirectedGraph};
use thiserror::Error;

pub use backends::{LeidenDetector, Node2VecEmbedder, PcaProjector, TfIdfWeighter};

/// Opaque community label assigned by a [`CommunityDetector`]
pub type CommunityId = i64;

/// Random-walk length used for every embedding run
pub const WALK_LENGTH: usize = 30;
/// Walks started from each node
pub const NUM_WALKS: usize = 200;
/// Skip-gram context window
pub const WALK_WINDOW: usize = 10;
/// Seed handed to the projection oracle; layouts are reproducible by contract
pub const PROJECTION_SEED: u64 = 42;

/// Errors reported by an oracle implementation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OracleError {
    #[error("{0}")]
    Failed(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type OracleResult<T> = Result<T, OracleError>;

/// Random-walk parameters passed to the embedding oracle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkParams {
    pub walk_length: usize,
    pub num_walks: usize,
    pub window: usize,
}

impl Default for WalkParams {
    fn default() -> Self {
        Self {
            walk_length: WALK_LENGTH,
            num_walks: NUM_WALKS,
            window: WALK_WINDOW,
        }
    }
}

/// Parameters passed to the term-weighting oracle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TermWeightParams {
    /// Upper bound on vocabulary size
    pub vocabulary_limit: usize,
    /// Filter common English words
    pub english_stop_words: bool,
    /// Drop terms present in more than this fraction of documents
    pub max_doc_freq: f64,
}

impl Default for TermWeightParams {
    fn default() -> Self {
        Self {
            vocabulary_limit: 1000,
            english_stop_words: true,
            max_doc_freq: 0.8,
        }
    }
}

/// Community detection over a directed graph.
///
/// Must return one community id per node index.
pub trait CommunityDetector: Send + Sync {
    fn detect(&self, graph: &GraphView, resolution: f64) -> OracleResult<Vec<CommunityId>>;
}

/// Node embedding over an undirected graph.
///
/// Vectors are keyed by the decimal string of the node index.
pub trait GraphEmbedder: Send + Sync {
    fn embed(
        &self,
        graph: &UndirectedGraph,
        dimensions: usize,
        walk: &WalkParams,
    ) -> OracleResult<KeyedVectors>;
}

/// Reduction of an `n x d` matrix to `n x 2` coordinates
pub trait Projector: Send + Sync {
    fn project(&self, embeddings: &Array2<f64>, seed: u64) -> OracleResult<Array2<f64>>;
}

/// Joint term weighting over a set of documents.
///
/// Returns, per document, `(term, weight)` pairs ranked by weight descending.
pub trait TermWeighter: Send + Sync {
    fn weigh(
        &self,
        documents: &[String],
        params: &TermWeightParams,
    ) -> OracleResult<Vec<Vec<(String, f64)>>>;
}
