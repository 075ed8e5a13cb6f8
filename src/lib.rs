//! Skymap
//!
//! Community structure, 2D layout and labels for social interaction graphs.
//!
//! Given directed `(source, target)` identifier pairs and free-text
//! biographies, the pipeline:
//!
//! 1. maps identifiers to dense node indices ([`registry`])
//! 2. builds a directed graph, dropping dangling edges ([`builder`])
//! 3. detects communities, embeds nodes and projects them to 2D through
//!    pluggable oracles ([`algo`])
//! 4. aggregates communities with member counts and centroids ([`aggregate`])
//! 5. labels each community from its members' biographies ([`labeling`])
//! 6. colors communities by rank ([`palette`]) and assembles the result
//!    ([`output`])
//!
//! ## Example Usage
//!
//! ```rust
//! use skymap::{Pipeline, PipelineInput};
//! use std::collections::HashMap;
//!
//! let input = PipelineInput {
//!     edges: vec![
//!         ("a".to_string(), "b".to_string()),
//!         ("b".to_string(), "a".to_string()),
//!     ],
//!     bios: HashMap::new(),
//!     resolution: 1.0,
//!     dimensions: 8,
//! };
//!
//! let output = Pipeline::default().run(&input).unwrap();
//! assert_eq!(output.embeddings.len(), 2);
//! let members: usize = output.communities.iter().map(|c| c.member_count).sum();
//! assert_eq!(members, 2);
//! ```

pub mod aggregate;
pub mod algo;
pub mod builder;
pub mod config;
pub mod error;
pub mod labeling;
pub mod output;
pub mod palette;
pub mod pipeline;
pub mod registry;

pub use aggregate::{aggregate_communities, CommunityAggregate, CommunityText};
pub use algo::{
    CommunityDetector, CommunityId, GraphEmbedder, OracleError, OracleResult, Projector,
    TermWeightParams, TermWeighter, WalkParams,
};
pub use builder::{build_graph, graph_stats, BuiltGraph, GraphStats};
pub use config::{PipelineConfig, PipelineInput, PipelineRequest};
pub use error::{PipelineError, PipelineResult, Stage};
pub use labeling::{label_communities, CommunityLabel, Labeling, LabelingStatus};
pub use output::{CommunityRecord, NodeRecord, PipelineOutput};
pub use palette::{palette, Hsl};
pub use pipeline::{run_pipeline, Pipeline, PipelineRun};
pub use registry::IdentifierRegistry;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
