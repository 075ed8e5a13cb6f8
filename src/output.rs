//! Result assembler

use crate::aggregate::CommunityAggregate;
use crate::algo::CommunityId;
use crate::labeling::CommunityLabel;
use crate::palette::Hsl;
use crate::registry::IdentifierRegistry;
use ndarray::Array2;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommunityRecord {
    pub id: CommunityId,
    pub label: String,
    pub top_terms: Vec<String>,
    pub color: Hsl,
    pub member_count: usize,
    pub centroid_x: f64,
    pub centroid_y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeRecord {
    pub identifier: String,
    pub x: f64,
    pub y: f64,
    pub community_id: CommunityId,
}

/// Final result of one pipeline invocation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineOutput {
    /// Ascending community id
    pub communities: Vec<CommunityRecord>,
    /// Node index order
    pub embeddings: Vec<NodeRecord>,
}

impl PipelineOutput {
    pub fn node_count(&self) -> usize {
        self.embeddings.len()
    }

    pub fn community(&self, id: CommunityId) -> Option<&CommunityRecord> {
        self.communities.iter().find(|c| c.id == id)
    }

    pub fn node(&self, identifier: &str) -> Option<&NodeRecord> {
        self.embeddings.iter().find(|n| n.identifier == identifier)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Merge per-community and per-node data.
///
/// `aggregates`, `labels` and `colors` are index-aligned by community rank;
/// `membership` and `coordinates` are row-aligned with the registry.
pub fn assemble(
    aggregates: Vec<CommunityAggregate>,
    labels: Vec<CommunityLabel>,
    colors: Vec<Hsl>,
    registry: &IdentifierRegistry,
    membership: &[CommunityId],
    coordinates: &Array2<f64>,
) -> PipelineOutput {
    let communities = aggregates
        .into_iter()
        .zip(labels)
        .zip(colors)
        .map(|((aggregate, label), color)| CommunityRecord {
            id: aggregate.id,
            label: label.label,
            top_terms: label.top_terms,
            color,
            member_count: aggregate.member_count,
            centroid_x: aggregate.centroid.0,
            centroid_y: aggregate.centroid.1,
        })
        .collect();

    let embeddings = registry
        .identifiers()
        .iter()
        .zip(membership)
        .enumerate()
        .map(|(idx, (identifier, &community_id))| NodeRecord {
            identifier: identifier.clone(),
            x: coordinates[[idx, 0]],
            y: coordinates[[idx, 1]],
            community_id,
        })
        .collect();

    PipelineOutput {
        communities,
        embeddings,
    }
}
