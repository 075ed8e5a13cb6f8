//! Community detection algorithms
//!
//! Weakly connected components and a Leiden-style modularity optimiser for
//! directed graphs with a resolution parameter.

use super::common::GraphView;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::debug;

/// Result of WCC algorithm
#[derive(Debug, Clone)]
pub struct WccResult {
    /// Component id per node index (dense, numbered by first appearance)
    pub component_of: Vec<usize>,
    /// Number of components
    pub component_count: usize,
}

/// Union-Find data structure
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<usize>,
}

impl UnionFind {
    fn new(size: usize) -> Self {
        UnionFind {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    fn find(&mut self, i: usize) -> usize {
        if self.parent[i] != i {
            self.parent[i] = self.find(self.parent[i]); // Path compression
        }
        self.parent[i]
    }

    fn union(&mut self, i: usize, j: usize) {
        let root_i = self.find(i);
        let root_j = self.find(j);

        if root_i != root_j {
            if self.rank[root_i] < self.rank[root_j] {
                self.parent[root_i] = root_j;
            } else if self.rank[root_i] > self.rank[root_j] {
                self.parent[root_j] = root_i;
            } else {
                self.parent[root_j] = root_i;
                self.rank[root_i] += 1;
            }
        }
    }

    /// Root of every element, renumbered densely by first appearance.
    fn dense_labels(&mut self) -> (Vec<usize>, usize) {
        let n = self.parent.len();
        let mut remap = vec![usize::MAX; n];
        let mut labels = Vec::with_capacity(n);
        let mut next = 0;
        for i in 0..n {
            let root = self.find(i);
            if remap[root] == usize::MAX {
                remap[root] = next;
                next += 1;
            }
            labels.push(remap[root]);
        }
        (labels, next)
    }
}

/// Weakly Connected Components (WCC)
///
/// Finds all disjoint subgraphs in the graph.
/// Ignores edge direction.
pub fn weakly_connected_components(view: &GraphView) -> WccResult {
    let mut uf = UnionFind::new(view.node_count);

    for (u, v) in view.edges() {
        uf.union(u, v);
    }

    let (component_of, component_count) = uf.dense_labels();
    WccResult {
        component_of,
        component_count,
    }
}

/// Leiden configuration
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LeidenConfig {
    /// Resolution parameter (gamma). Higher values give more, smaller communities.
    pub resolution: f64,
    /// Seed for the node visiting order. `None` draws from OS entropy.
    pub seed: Option<u64>,
    /// Maximum number of aggregation levels
    pub max_levels: usize,
    /// Maximum local-moving sweeps per level
    pub max_sweeps: usize,
}

impl Default for LeidenConfig {
    fn default() -> Self {
        Self {
            resolution: 1.0,
            seed: Some(42),
            max_levels: 32,
            max_sweeps: 64,
        }
    }
}

/// Result of the Leiden algorithm
#[derive(Debug, Clone)]
pub struct LeidenResult {
    /// Community per node index, dense `0..community_count`, numbered by first appearance
    pub membership: Vec<usize>,
    pub community_count: usize,
    /// Quality of the final partition (see [`modularity`])
    pub quality: f64,
    /// Aggregation levels executed
    pub levels: usize,
}

/// Weighted directed multigraph used at each aggregation level.
struct LevelGraph {
    out_edges: Vec<Vec<(usize, f64)>>,
    in_edges: Vec<Vec<(usize, f64)>>,
    out_strength: Vec<f64>,
    in_strength: Vec<f64>,
}

impl LevelGraph {
    fn from_view(view: &GraphView) -> Self {
        let n = view.node_count;
        let mut out_edges = vec![Vec::new(); n];
        let mut in_edges = vec![Vec::new(); n];
        // Every input edge has unit weight; parallel edges add up on aggregation.
        for (u, v) in view.edges() {
            out_edges[u].push((v, 1.0));
            in_edges[v].push((u, 1.0));
        }
        Self::with_strengths(out_edges, in_edges)
    }

    fn with_strengths(
        out_edges: Vec<Vec<(usize, f64)>>,
        in_edges: Vec<Vec<(usize, f64)>>,
    ) -> Self {
        let out_strength = out_edges.iter().map(|es| es.iter().map(|e| e.1).sum()).collect();
        let in_strength = in_edges.iter().map(|es| es.iter().map(|e| e.1).sum()).collect();
        Self {
            out_edges,
            in_edges,
            out_strength,
            in_strength,
        }
    }

    fn node_count(&self) -> usize {
        self.out_edges.len()
    }

    /// Collapse nodes sharing a label into one super-node, summing parallel weights.
    fn aggregate(&self, labels: &[usize], count: usize) -> Self {
        let mut out_edges: Vec<Vec<(usize, f64)>> = vec![Vec::new(); count];
        let mut in_edges: Vec<Vec<(usize, f64)>> = vec![Vec::new(); count];
        let mut scratch = vec![0.0f64; count];
        let mut touched: Vec<usize> = Vec::new();

        let mut members: Vec<Vec<usize>> = vec![Vec::new(); count];
        for (node, &label) in labels.iter().enumerate() {
            members[label].push(node);
        }

        for (cu, group) in members.iter().enumerate() {
            for &u in group {
                for &(v, w) in &self.out_edges[u] {
                    let cv = labels[v];
                    if scratch[cv] == 0.0 {
                        touched.push(cv);
                    }
                    scratch[cv] += w;
                }
            }
            for cv in touched.drain(..) {
                let w = scratch[cv];
                scratch[cv] = 0.0;
                out_edges[cu].push((cv, w));
                in_edges[cv].push((cu, w));
            }
        }

        Self::with_strengths(out_edges, in_edges)
    }
}

/// Move nodes between communities while the quality strictly improves.
///
/// Returns true when at least one node changed community.
fn local_moving(
    graph: &LevelGraph,
    community: &mut [usize],
    resolution: f64,
    total_weight: f64,
    max_sweeps: usize,
    rng: &mut StdRng,
) -> bool {
    let n = graph.node_count();
    let mut comm_out = vec![0.0f64; n];
    let mut comm_in = vec![0.0f64; n];
    let mut comm_size = vec![0usize; n];
    for i in 0..n {
        comm_out[community[i]] += graph.out_strength[i];
        comm_in[community[i]] += graph.in_strength[i];
        comm_size[community[i]] += 1;
    }
    let mut empty: Vec<usize> = (0..n).filter(|&c| comm_size[c] == 0).collect();

    let mut neigh_weight = vec![0.0f64; n];
    let mut neigh_comms: Vec<usize> = Vec::new();
    let mut order: Vec<usize> = (0..n).collect();
    let mut any_moved = false;

    for _ in 0..max_sweeps {
        order.shuffle(rng);
        let mut moved = false;

        for &i in &order {
            let current = community[i];
            let k_out = graph.out_strength[i];
            let k_in = graph.in_strength[i];

            neigh_comms.clear();
            neigh_comms.push(current);
            let edges = graph.out_edges[i].iter().chain(graph.in_edges[i].iter());
            for &(j, w) in edges {
                if j == i {
                    continue;
                }
                let c = community[j];
                if neigh_weight[c] == 0.0 && c != current {
                    neigh_comms.push(c);
                }
                neigh_weight[c] += w;
            }

            comm_out[current] -= k_out;
            comm_in[current] -= k_in;
            comm_size[current] -= 1;

            let gain = |c: usize, w: f64| {
                w - resolution * (k_out * comm_in[c] + k_in * comm_out[c]) / total_weight
            };

            let mut best = current;
            let mut best_gain = gain(current, neigh_weight[current]);
            for &c in &neigh_comms[1..] {
                let g = gain(c, neigh_weight[c]);
                if g > best_gain + 1e-12 {
                    best = c;
                    best_gain = g;
                }
            }
            // An empty community has zero gain; use one when every option is negative.
            if best_gain < -1e-12 && comm_size[current] > 0 {
                while let Some(c) = empty.pop() {
                    if comm_size[c] == 0 {
                        best = c;
                        break;
                    }
                }
            }

            for &c in &neigh_comms {
                neigh_weight[c] = 0.0;
            }

            comm_out[best] += k_out;
            comm_in[best] += k_in;
            comm_size[best] += 1;
            if best != current {
                if comm_size[current] == 0 {
                    empty.push(current);
                }
                community[i] = best;
                moved = true;
            }
        }

        if !moved {
            break;
        }
        any_moved = true;
    }

    any_moved
}

/// Split every community into its weakly connected parts.
fn refine(graph: &LevelGraph, community: &[usize]) -> (Vec<usize>, usize) {
    let mut uf = UnionFind::new(graph.node_count());
    for (u, edges) in graph.out_edges.iter().enumerate() {
        for &(v, _) in edges {
            if community[u] == community[v] {
                uf.union(u, v);
            }
        }
    }
    uf.dense_labels()
}

fn renumber(labels: &[usize]) -> (Vec<usize>, usize) {
    let mut remap = vec![usize::MAX; labels.len().max(1)];
    let mut next = 0;
    let mut out = Vec::with_capacity(labels.len());
    for &l in labels {
        if remap.len() <= l {
            remap.resize(l + 1, usize::MAX);
        }
        if remap[l] == usize::MAX {
            remap[l] = next;
            next += 1;
        }
        out.push(remap[l]);
    }
    (out, next)
}

/// Leiden community detection on a directed graph.
///
/// Optimises the directed RB-configuration quality
/// `Q = 1/m * sum_ij (A_ij - gamma * k_i^out * k_j^in / m) * delta(c_i, c_j)`
/// with local moving, connectivity refinement and aggregation until no level
/// can be collapsed further. Output is deterministic for a fixed seed.
pub fn leiden(view: &GraphView, config: &LeidenConfig) -> LeidenResult {
    let n = view.node_count;
    if n == 0 {
        return LeidenResult {
            membership: Vec::new(),
            community_count: 0,
            quality: 0.0,
            levels: 0,
        };
    }

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut graph = LevelGraph::from_view(view);
    let total_weight: f64 = graph.out_strength.iter().sum();
    if total_weight <= 0.0 {
        let membership: Vec<usize> = (0..n).collect();
        return LeidenResult {
            community_count: n,
            membership,
            quality: 0.0,
            levels: 0,
        };
    }

    // Original node -> node of the current level graph
    let mut node_to_level: Vec<usize> = (0..n).collect();
    let mut community: Vec<usize> = (0..n).collect();
    let mut levels = 0;

    loop {
        levels += 1;
        local_moving(
            &graph,
            &mut community,
            config.resolution,
            total_weight,
            config.max_sweeps,
            &mut rng,
        );
        let (refined, refined_count) = refine(&graph, &community);
        debug!(
            "leiden level {}: {} nodes -> {} refined communities",
            levels,
            graph.node_count(),
            refined_count
        );

        for slot in node_to_level.iter_mut() {
            *slot = refined[*slot];
        }

        if refined_count == graph.node_count() || levels >= config.max_levels {
            break;
        }

        // Aggregated nodes start in the (unrefined) community of their members.
        let mut next_community = vec![0usize; refined_count];
        for (node, &r) in refined.iter().enumerate() {
            next_community[r] = community[node];
        }
        let (next_community, _) = renumber(&next_community);

        graph = graph.aggregate(&refined, refined_count);
        community = next_community;
    }

    let (membership, community_count) = renumber(&node_to_level);
    let quality = modularity(view, &membership, config.resolution);
    LeidenResult {
        membership,
        community_count,
        quality,
        levels,
    }
}

/// Directed modularity with resolution for a membership vector.
///
/// `Q = 1/m * sum_c (w_c - gamma * K_c^out * K_c^in / m)`, where `w_c` counts the
/// edges inside community `c`. Parallel edges count once each. Returns 0.0 for
/// edgeless graphs.
pub fn modularity(view: &GraphView, membership: &[usize], resolution: f64) -> f64 {
    let count = membership.iter().copied().max().map_or(0, |m| m + 1);
    let mut internal = vec![0.0f64; count];
    let mut k_out = vec![0.0f64; count];
    let mut k_in = vec![0.0f64; count];
    let mut m = 0.0;

    for (u, v) in view.edges() {
        m += 1.0;
        k_out[membership[u]] += 1.0;
        k_in[membership[v]] += 1.0;
        if membership[u] == membership[v] {
            internal[membership[u]] += 1.0;
        }
    }

    if m == 0.0 {
        return 0.0;
    }

    (0..count)
        .map(|c| internal[c] - resolution * k_out[c] * k_in[c] / m)
        .sum::<f64>()
        / m
}
