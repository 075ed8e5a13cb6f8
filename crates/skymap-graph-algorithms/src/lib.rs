pub mod common;
pub mod community;
pub mod node2vec;
pub mod projection;
pub mod tfidf;

pub use common::{GraphView, NodeIndex, UndirectedGraph};
pub use community::{
    leiden, modularity, weakly_connected_components, LeidenConfig, LeidenResult, WccResult,
};
pub use node2vec::{generate_walks, node2vec, train_skipgram, KeyedVectors, Node2VecConfig};
pub use projection::{pca, pca_2d, PcaConfig, PcaResult};
pub use tfidf::{tfidf, tokenize, TfIdfConfig, TfIdfError, TfIdfMatrix, ENGLISH_STOP_WORDS};
