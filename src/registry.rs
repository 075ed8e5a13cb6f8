//! Identifier registry
//!
//! Bidirectional mapping between external identifiers and dense node indices
//! `0..N`. Indices are allocated monotonically in first-seen order while
//! scanning the edge list (source before target). Callers must not rely on the
//! particular order, only on the bijection.

use rustc_hash::FxHashMap;
use skymap_graph_algorithms::NodeIndex;

#[derive(Debug, Clone, Default)]
pub struct IdentifierRegistry {
    index_of: FxHashMap<String, NodeIndex>,
    identifiers: Vec<String>,
}

impl IdentifierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every identifier appearing in either position of any edge.
    pub fn from_edges<S: AsRef<str>>(edges: &[(S, S)]) -> Self {
        let mut registry = Self::new();
        for (source, target) in edges {
            registry.register(source.as_ref());
            registry.register(target.as_ref());
        }
        registry
    }

    /// Index of `identifier`, allocating the next one if unseen.
    pub fn register(&mut self, identifier: &str) -> NodeIndex {
        if let Some(&idx) = self.index_of.get(identifier) {
            return idx;
        }
        let idx = self.identifiers.len();
        self.identifiers.push(identifier.to_string());
        self.index_of.insert(identifier.to_string(), idx);
        idx
    }

    pub fn to_index(&self, identifier: &str) -> Option<NodeIndex> {
        self.index_of.get(identifier).copied()
    }

    /// Identifier for an in-range index. Panics when `index >= len()`.
    pub fn to_identifier(&self, index: NodeIndex) -> &str {
        &self.identifiers[index]
    }

    pub fn get_identifier(&self, index: NodeIndex) -> Option<&str> {
        self.identifiers.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }

    /// Identifiers in index order
    pub fn identifiers(&self) -> &[String] {
        &self.identifiers
    }
}
