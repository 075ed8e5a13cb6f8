//! Pipeline configuration and batch requests

use crate::error::{PipelineError, PipelineResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Tunables for a pipeline run.
///
/// Every field has a default, so a YAML file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Community granularity (higher gives more, smaller communities)
    pub resolution: f64,
    /// Embedding width
    pub dimensions: usize,
    /// Seed for the reference community detector; `None` is nondeterministic
    pub community_seed: Option<u64>,
    /// Seed for the reference random-walk embedder
    pub embedding_seed: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            resolution: 1.0,
            dimensions: 64,
            community_seed: Some(42),
            embedding_seed: 42,
        }
    }
}

impl PipelineConfig {
    /// Parse a YAML document. Missing keys keep their defaults.
    pub fn from_yaml_str(yaml: &str) -> PipelineResult<Self> {
        let config: PipelineConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML config file
    pub fn load(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn validate(&self) -> PipelineResult<()> {
        validate_parameters(self.resolution, self.dimensions)
    }
}

pub(crate) fn validate_parameters(resolution: f64, dimensions: usize) -> PipelineResult<()> {
    if !resolution.is_finite() || resolution <= 0.0 {
        return Err(PipelineError::InvalidConfig(format!(
            "resolution must be a positive finite number, got {}",
            resolution
        )));
    }
    if dimensions == 0 {
        return Err(PipelineError::InvalidConfig(
            "dimensions must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// One batch invocation of the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineInput {
    /// Directed `(source, target)` identifier pairs; duplicates and dangling references allowed
    pub edges: Vec<(String, String)>,
    /// Biography text by identifier; missing entries count as empty
    #[serde(default)]
    pub bios: HashMap<String, String>,
    pub resolution: f64,
    pub dimensions: usize,
}

/// Request file form of [`PipelineInput`]: parameters may be left to the config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineRequest {
    pub edges: Vec<(String, String)>,
    #[serde(default)]
    pub bios: HashMap<String, String>,
    #[serde(default)]
    pub resolution: Option<f64>,
    #[serde(default)]
    pub dimensions: Option<usize>,
}

impl PipelineRequest {
    pub fn from_json_str(json: &str) -> PipelineResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Fill unset parameters from `config`
    pub fn into_input(self, config: &PipelineConfig) -> PipelineInput {
        PipelineInput {
            edges: self.edges,
            bios: self.bios,
            resolution: self.resolution.unwrap_or(config.resolution),
            dimensions: self.dimensions.unwrap_or(config.dimensions),
        }
    }
}
