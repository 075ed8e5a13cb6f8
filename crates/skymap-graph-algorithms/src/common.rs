//! Shared utilities for graph algorithms
//!
//! Provides read-only, dense-indexed views of the graph topology for algorithm execution.

/// Dense node index (0..N)
pub type NodeIndex = usize;

/// A dense, integer-indexed view of a directed graph using Compressed Sparse Row (CSR) format.
///
/// Unweighted. Parallel edges are kept as separate entries; nothing is deduplicated.
#[derive(Debug, Clone)]
pub struct GraphView {
    /// Number of nodes
    pub node_count: usize,

    /// Outgoing edges CSR structure
    /// Offsets into `out_targets`. Size = node_count + 1
    pub out_offsets: Vec<usize>,
    /// Contiguous array of target node indices
    pub out_targets: Vec<NodeIndex>,

    /// Incoming edges CSR structure (Compressed Sparse Column effectively)
    /// Offsets into `in_sources`. Size = node_count + 1
    pub in_offsets: Vec<usize>,
    /// Contiguous array of source node indices
    pub in_sources: Vec<NodeIndex>,
}

impl GraphView {
    /// Build a view over `node_count` nodes from a directed edge list.
    ///
    /// Every endpoint must be `< node_count`; callers filter unknown endpoints first.
    pub fn from_edges(node_count: usize, edges: &[(NodeIndex, NodeIndex)]) -> Self {
        let mut outgoing: Vec<Vec<NodeIndex>> = vec![Vec::new(); node_count];
        let mut incoming: Vec<Vec<NodeIndex>> = vec![Vec::new(); node_count];
        for &(u, v) in edges {
            outgoing[u].push(v);
            incoming[v].push(u);
        }
        Self::from_adjacency_list(node_count, outgoing, incoming)
    }

    /// Helper to create GraphView from adjacency lists
    pub fn from_adjacency_list(
        node_count: usize,
        outgoing: Vec<Vec<NodeIndex>>,
        incoming: Vec<Vec<NodeIndex>>,
    ) -> Self {
        let mut out_offsets = Vec::with_capacity(node_count + 1);
        let mut out_targets = Vec::new();
        let mut in_offsets = Vec::with_capacity(node_count + 1);
        let mut in_sources = Vec::new();

        out_offsets.push(0);
        for neighbors in outgoing {
            out_targets.extend(neighbors);
            out_offsets.push(out_targets.len());
        }

        in_offsets.push(0);
        for sources in incoming {
            in_sources.extend(sources);
            in_offsets.push(in_sources.len());
        }

        GraphView {
            node_count,
            out_offsets,
            out_targets,
            in_offsets,
            in_sources,
        }
    }

    /// Total number of directed edges (parallel edges counted separately)
    pub fn edge_count(&self) -> usize {
        self.out_targets.len()
    }

    /// Get the out-degree of a node (by index)
    pub fn out_degree(&self, idx: NodeIndex) -> usize {
        self.out_offsets[idx + 1] - self.out_offsets[idx]
    }

    /// Get the in-degree of a node (by index)
    pub fn in_degree(&self, idx: NodeIndex) -> usize {
        self.in_offsets[idx + 1] - self.in_offsets[idx]
    }

    /// Get outgoing neighbors (successors) of a node
    pub fn successors(&self, idx: NodeIndex) -> &[NodeIndex] {
        let start = self.out_offsets[idx];
        let end = self.out_offsets[idx + 1];
        &self.out_targets[start..end]
    }

    /// Get incoming neighbors (predecessors) of a node
    pub fn predecessors(&self, idx: NodeIndex) -> &[NodeIndex] {
        let start = self.in_offsets[idx];
        let end = self.in_offsets[idx + 1];
        &self.in_sources[start..end]
    }

    /// Iterate all directed edges as `(source, target)` pairs in CSR order
    pub fn edges(&self) -> impl Iterator<Item = (NodeIndex, NodeIndex)> + '_ {
        (0..self.node_count).flat_map(move |u| self.successors(u).iter().map(move |&v| (u, v)))
    }

    /// Collapse the graph to its undirected simple form.
    ///
    /// Direction is discarded and parallel edges collapse into one. Self-loops are
    /// kept once. Every node index survives, including isolated ones.
    pub fn to_undirected(&self) -> UndirectedGraph {
        let mut adjacency: Vec<Vec<NodeIndex>> = vec![Vec::new(); self.node_count];
        for (u, v) in self.edges() {
            adjacency[u].push(v);
            if u != v {
                adjacency[v].push(u);
            }
        }
        for neighbors in adjacency.iter_mut() {
            neighbors.sort_unstable();
            neighbors.dedup();
        }
        UndirectedGraph { adjacency }
    }
}

/// Undirected simple graph over dense indices `0..N`, stored as sorted adjacency lists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UndirectedGraph {
    adjacency: Vec<Vec<NodeIndex>>,
}

impl UndirectedGraph {
    /// Build from an undirected edge list. Duplicates are collapsed.
    pub fn from_edges(node_count: usize, edges: &[(NodeIndex, NodeIndex)]) -> Self {
        GraphView::from_edges(node_count, edges).to_undirected()
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of undirected edges, each counted once (self-loops included)
    pub fn edge_count(&self) -> usize {
        let mut doubled = 0;
        let mut loops = 0;
        for (u, neighbors) in self.adjacency.iter().enumerate() {
            for &v in neighbors {
                if u == v {
                    loops += 1;
                } else {
                    doubled += 1;
                }
            }
        }
        doubled / 2 + loops
    }

    pub fn neighbors(&self, idx: NodeIndex) -> &[NodeIndex] {
        &self.adjacency[idx]
    }

    pub fn degree(&self, idx: NodeIndex) -> usize {
        self.adjacency[idx].len()
    }
}
