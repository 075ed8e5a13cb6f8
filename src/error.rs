//! Pipeline error types

use crate::algo::OracleError;
use thiserror::Error;

/// Errors that abort a pipeline invocation.
///
/// Term-weighting failures are not listed: they are recovered by the labeling
/// engine and never reach the caller.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Rejected configuration or request parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Community-detection oracle failed
    #[error("Community detection failed: {0}")]
    Community(#[source] OracleError),

    /// Graph-embedding oracle failed
    #[error("Embedding failed: {0}")]
    Embedding(#[source] OracleError),

    /// Dimensionality-reduction oracle failed
    #[error("Projection failed: {0}")]
    Projection(#[source] OracleError),

    /// An oracle returned data of the wrong shape
    #[error("Malformed {stage} output: {reason}")]
    MalformedOutput { stage: Stage, reason: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML config error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Pipeline stage that produced a malformed result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Community,
    Embedding,
    Projection,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Community => "community detection",
            Stage::Embedding => "embedding",
            Stage::Projection => "projection",
        };
        f.write_str(name)
    }
}

impl PipelineError {
    pub(crate) fn malformed(stage: Stage, reason: impl Into<String>) -> Self {
        PipelineError::MalformedOutput {
            stage,
            reason: reason.into(),
        }
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
