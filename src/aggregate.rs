//! Community aggregation
//!
//! Groups node indices by community id (ascending), joins member biographies
//! and computes member counts and 2D centroids.

use crate::algo::CommunityId;
use crate::registry::IdentifierRegistry;
use ndarray::Array2;
use skymap_graph_algorithms::NodeIndex;
use std::collections::{BTreeMap, HashMap};

/// Concatenated member text of a community
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommunityText {
    Text(String),
    Empty,
}

impl CommunityText {
    /// The text, or `""` when empty
    pub fn as_str(&self) -> &str {
        match self {
            CommunityText::Text(text) => text,
            CommunityText::Empty => "",
        }
    }

    /// True when there is text left after trimming whitespace
    pub fn has_content(&self) -> bool {
        !self.as_str().trim().is_empty()
    }
}

/// Per-community aggregate, before labeling and coloring
#[derive(Debug, Clone, PartialEq)]
pub struct CommunityAggregate {
    pub id: CommunityId,
    /// Members in ascending node index
    pub members: Vec<NodeIndex>,
    pub text: CommunityText,
    pub member_count: usize,
    pub centroid: (f64, f64),
}

/// Aggregate communities, sorted by ascending community id.
///
/// `coordinates` is the `N x 2` layout, row-aligned with the registry.
pub fn aggregate_communities(
    membership: &[CommunityId],
    registry: &IdentifierRegistry,
    bios: &HashMap<String, String>,
    coordinates: &Array2<f64>,
) -> Vec<CommunityAggregate> {
    let mut groups: BTreeMap<CommunityId, Vec<NodeIndex>> = BTreeMap::new();
    for (idx, &community) in membership.iter().enumerate() {
        groups.entry(community).or_default().push(idx);
    }

    groups
        .into_iter()
        .map(|(id, members)| {
            let text = join_bios(&members, registry, bios);
            let centroid = centroid(&members, coordinates);
            CommunityAggregate {
                id,
                member_count: members.len(),
                members,
                text,
                centroid,
            }
        })
        .collect()
}

/// Join member bios with single spaces, skipping missing and empty ones.
fn join_bios(
    members: &[NodeIndex],
    registry: &IdentifierRegistry,
    bios: &HashMap<String, String>,
) -> CommunityText {
    let joined = members
        .iter()
        .filter_map(|&idx| bios.get(registry.to_identifier(idx)))
        .filter(|bio| !bio.is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ");

    if joined.is_empty() {
        CommunityText::Empty
    } else {
        CommunityText::Text(joined)
    }
}

/// Mean of member coordinates; `(0, 0)` for no members.
pub fn centroid(members: &[NodeIndex], coordinates: &Array2<f64>) -> (f64, f64) {
    if members.is_empty() {
        return (0.0, 0.0);
    }
    let (sum_x, sum_y) = members.iter().fold((0.0, 0.0), |(sx, sy), &idx| {
        (sx + coordinates[[idx, 0]], sy + coordinates[[idx, 1]])
    });
    let n = members.len() as f64;
    (sum_x / n, sum_y / n)
}
