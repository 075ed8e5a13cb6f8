//! Graph builder and graph statistics

use crate::registry::IdentifierRegistry;
use serde::Serialize;
use skymap_graph_algorithms::{weakly_connected_components, GraphView, NodeIndex};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Directed graph over the registry's index domain
#[derive(Debug, Clone)]
pub struct BuiltGraph {
    pub view: GraphView,
    /// Input edges discarded because an endpoint is not registered
    pub dropped_edges: usize,
}

/// Build a directed graph over exactly `0..registry.len()`.
///
/// Edges with an unregistered endpoint are dropped silently. Parallel edges
/// and self-loops are kept.
pub fn build_graph<S: AsRef<str>>(edges: &[(S, S)], registry: &IdentifierRegistry) -> BuiltGraph {
    let mut resolved: Vec<(NodeIndex, NodeIndex)> = Vec::with_capacity(edges.len());
    let mut dropped_edges = 0;

    for (source, target) in edges {
        match (
            registry.to_index(source.as_ref()),
            registry.to_index(target.as_ref()),
        ) {
            (Some(u), Some(v)) => resolved.push((u, v)),
            _ => dropped_edges += 1,
        }
    }

    if dropped_edges > 0 {
        warn!("Dropped {} edges with unregistered endpoints", dropped_edges);
    }
    debug!(
        "Built graph: {} nodes, {} edges",
        registry.len(),
        resolved.len()
    );

    BuiltGraph {
        view: GraphView::from_edges(registry.len(), &resolved),
        dropped_edges,
    }
}

/// Shape of an input graph, computed without running any oracle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub input_edges: usize,
    pub kept_edges: usize,
    pub dropped_edges: usize,
    pub self_loops: usize,
    pub isolated_nodes: usize,
    pub weak_components: usize,
    /// Biographies whose identifier never appears in an edge
    pub unmatched_bios: usize,
}

pub fn graph_stats(
    edges: &[(String, String)],
    bios: &HashMap<String, String>,
) -> GraphStats {
    let registry = IdentifierRegistry::from_edges(edges);
    let built = build_graph(edges, &registry);
    let view = &built.view;

    let self_loops = view.edges().filter(|(u, v)| u == v).count();
    let isolated_nodes = (0..view.node_count)
        .filter(|&i| view.successors(i).iter().chain(view.predecessors(i)).all(|&j| j == i))
        .count();
    let unmatched_bios = bios
        .keys()
        .filter(|id| registry.to_index(id).is_none())
        .count();

    GraphStats {
        node_count: view.node_count,
        input_edges: edges.len(),
        kept_edges: view.edge_count(),
        dropped_edges: built.dropped_edges,
        self_loops,
        isolated_nodes,
        weak_components: weakly_connected_components(view).component_count,
        unmatched_bios,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(edges: &[(&str, &str)]) -> Vec<(String, String)> {
        edges
            .iter()
            .map(|(s, t)| (s.to_string(), t.to_string()))
            .collect()
    }

    #[test]
    fn test_unknown_endpoints_are_dropped() {
        let registry = IdentifierRegistry::from_edges(&[("a", "b")]);
        let built = build_graph(&[("a", "b"), ("a", "ghost"), ("ghost", "b")], &registry);

        assert_eq!(built.view.node_count, 2);
        assert_eq!(built.view.edge_count(), 1);
        assert_eq!(built.dropped_edges, 2);
    }

    #[test]
    fn test_parallel_edges_are_kept() {
        let edges = [("a", "b"), ("a", "b"), ("b", "b")];
        let registry = IdentifierRegistry::from_edges(&edges);
        let built = build_graph(&edges, &registry);

        assert_eq!(built.view.edge_count(), 3);
        assert_eq!(built.dropped_edges, 0);
    }

    #[test]
    fn test_graph_stats() {
        let edges = pairs(&[("a", "b"), ("b", "c"), ("x", "x"), ("a", "b")]);
        let mut bios = HashMap::new();
        bios.insert("a".to_string(), "hi".to_string());
        bios.insert("nobody".to_string(), "lonely".to_string());

        let stats = graph_stats(&edges, &bios);
        assert_eq!(stats.node_count, 4);
        assert_eq!(stats.input_edges, 4);
        assert_eq!(stats.kept_edges, 4);
        assert_eq!(stats.self_loops, 1);
        assert_eq!(stats.isolated_nodes, 1);
        assert_eq!(stats.weak_components, 2);
        assert_eq!(stats.unmatched_bios, 1);
    }
}
