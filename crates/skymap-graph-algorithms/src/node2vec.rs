//! Random-walk node embeddings
//!
//! Uniform (p = q = 1) node2vec: truncated random walks are generated from every
//! node and fed to a skip-gram model trained with negative sampling. Walks are
//! produced in parallel, but every walk owns a seeded RNG so the output does not
//! depend on thread scheduling.

use super::common::{NodeIndex, UndirectedGraph};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::collections::HashMap;
use tracing::debug;

/// node2vec configuration
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node2VecConfig {
    /// Embedding width
    pub dimensions: usize,
    /// Steps per walk (including the start node)
    pub walk_length: usize,
    /// Walks started from every node
    pub num_walks: usize,
    /// Skip-gram context window
    pub window: usize,
    /// Negative samples per positive pair
    pub negative: usize,
    /// Passes over the walk corpus
    pub epochs: usize,
    /// Starting learning rate, decayed linearly to `min_learning_rate`
    pub learning_rate: f64,
    pub min_learning_rate: f64,
    pub seed: u64,
}

impl Default for Node2VecConfig {
    fn default() -> Self {
        Self {
            dimensions: 64,
            walk_length: 30,
            num_walks: 200,
            window: 10,
            negative: 5,
            epochs: 1,
            learning_rate: 0.025,
            min_learning_rate: 0.0001,
            seed: 42,
        }
    }
}

/// Vectors keyed by walk token, as a word-vector store would hold them.
///
/// Tokens are the decimal string of the node index.
#[derive(Debug, Clone, Default)]
pub struct KeyedVectors {
    pub dimensions: usize,
    vectors: HashMap<String, Vec<f64>>,
}

impl KeyedVectors {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            vectors: HashMap::new(),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, vector: Vec<f64>) {
        self.vectors.insert(key.into(), vector);
    }

    pub fn get(&self, key: &str) -> Option<&[f64]> {
        self.vectors.get(key).map(|v| v.as_slice())
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.vectors.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

fn walk_seed(seed: u64, walk: usize) -> u64 {
    seed ^ (walk as u64).wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Generate `num_walks` uniform random walks from every node.
///
/// Walk `k` starts at node `k % n`. A walk stops early at a node without neighbors,
/// so isolated nodes produce single-token walks.
pub fn generate_walks(
    graph: &UndirectedGraph,
    walk_length: usize,
    num_walks: usize,
    seed: u64,
) -> Vec<Vec<NodeIndex>> {
    let n = graph.node_count();
    if n == 0 || walk_length == 0 {
        return Vec::new();
    }

    (0..n * num_walks)
        .into_par_iter()
        .map(|k| {
            let mut rng = StdRng::seed_from_u64(walk_seed(seed, k));
            let mut walk = Vec::with_capacity(walk_length);
            let mut current = k % n;
            walk.push(current);
            while walk.len() < walk_length {
                match graph.neighbors(current).choose(&mut rng) {
                    Some(&next) => {
                        current = next;
                        walk.push(current);
                    }
                    None => break,
                }
            }
            walk
        })
        .collect()
}

struct SkipGram {
    dims: usize,
    input: Vec<f64>,
    output: Vec<f64>,
}

impl SkipGram {
    fn new(n: usize, dims: usize, rng: &mut StdRng) -> Self {
        let input = (0..n * dims)
            .map(|_| (rng.gen::<f64>() - 0.5) / dims as f64)
            .collect();
        Self {
            dims,
            input,
            output: vec![0.0; n * dims],
        }
    }

    /// One SGD step for the pair (context -> center) plus negative samples.
    #[allow(clippy::too_many_arguments)]
    fn train_pair(
        &mut self,
        context: usize,
        center: usize,
        alpha: f64,
        negative: usize,
        noise: &WeightedIndex<f64>,
        rng: &mut StdRng,
        grad: &mut [f64],
    ) {
        let d = self.dims;
        grad.iter_mut().for_each(|g| *g = 0.0);
        let in_off = context * d;

        for k in 0..=negative {
            let (target, label) = if k == 0 {
                (center, 1.0)
            } else {
                let sample = noise.sample(rng);
                if sample == center {
                    continue;
                }
                (sample, 0.0)
            };
            let out_off = target * d;
            let dot: f64 = (0..d)
                .map(|i| self.input[in_off + i] * self.output[out_off + i])
                .sum();
            let g = (label - sigmoid(dot)) * alpha;
            for i in 0..d {
                grad[i] += g * self.output[out_off + i];
                self.output[out_off + i] += g * self.input[in_off + i];
            }
        }

        for i in 0..d {
            self.input[in_off + i] += grad[i];
        }
    }
}

fn sigmoid(x: f64) -> f64 {
    if x > 20.0 {
        1.0
    } else if x < -20.0 {
        0.0
    } else {
        1.0 / (1.0 + (-x).exp())
    }
}

/// Train skip-gram embeddings over a walk corpus of `node_count` tokens.
pub fn train_skipgram(
    walks: &[Vec<NodeIndex>],
    node_count: usize,
    config: &Node2VecConfig,
) -> Vec<Vec<f64>> {
    let dims = config.dimensions;
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut model = SkipGram::new(node_count, dims, &mut rng);

    let mut counts = vec![0.0f64; node_count];
    for walk in walks {
        for &token in walk {
            counts[token] += 1.0;
        }
    }
    let total_tokens: f64 = counts.iter().sum();
    let noise_weights: Vec<f64> = counts.iter().map(|c| c.powf(0.75)).collect();

    // Nothing to learn from: no walk has a second token.
    let has_context = walks.iter().any(|w| w.len() > 1);
    let noise = match WeightedIndex::new(&noise_weights) {
        Ok(noise) if has_context && config.window > 0 => noise,
        _ => return split_rows(model.input, node_count, dims),
    };

    let planned = (total_tokens * config.epochs.max(1) as f64).max(1.0);
    let mut processed = 0.0;
    let mut grad = vec![0.0f64; dims];

    for _ in 0..config.epochs.max(1) {
        for walk in walks {
            for (pos, &center) in walk.iter().enumerate() {
                let progress = processed / planned;
                let alpha = (config.learning_rate * (1.0 - progress)).max(config.min_learning_rate);
                processed += 1.0;

                let reduced = rng.gen_range(0..config.window);
                let span = config.window - reduced;
                let start = pos.saturating_sub(span);
                let end = (pos + span + 1).min(walk.len());
                for (ctx_pos, &context) in walk.iter().enumerate().take(end).skip(start) {
                    if ctx_pos == pos {
                        continue;
                    }
                    model.train_pair(
                        context,
                        center,
                        alpha,
                        config.negative,
                        &noise,
                        &mut rng,
                        &mut grad,
                    );
                }
            }
        }
    }

    split_rows(model.input, node_count, dims)
}

fn split_rows(flat: Vec<f64>, rows: usize, dims: usize) -> Vec<Vec<f64>> {
    if dims == 0 {
        return vec![Vec::new(); rows];
    }
    flat.chunks(dims).map(|c| c.to_vec()).collect()
}

/// Embed every node of an undirected graph.
///
/// Returns one vector per node keyed by its walk token.
pub fn node2vec(graph: &UndirectedGraph, config: &Node2VecConfig) -> KeyedVectors {
    let n = graph.node_count();
    let walks = generate_walks(graph, config.walk_length, config.num_walks, config.seed);
    debug!("node2vec: {} walks over {} nodes", walks.len(), n);

    let rows = train_skipgram(&walks, n, config);
    let mut vectors = KeyedVectors::new(config.dimensions);
    for (idx, row) in rows.into_iter().enumerate() {
        vectors.insert(idx.to_string(), row);
    }
    vectors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> Node2VecConfig {
        Node2VecConfig {
            dimensions: 8,
            walk_length: 10,
            num_walks: 20,
            window: 3,
            ..Default::default()
        }
    }

    #[test]
    fn test_walks_follow_edges() {
        let graph = UndirectedGraph::from_edges(4, &[(0, 1), (1, 2)]);
        let walks = generate_walks(&graph, 6, 3, 1);

        assert_eq!(walks.len(), 12);
        for walk in &walks {
            for pair in walk.windows(2) {
                assert!(graph.neighbors(pair[0]).contains(&pair[1]));
            }
        }
        // Node 3 is isolated
        assert!(walks.iter().filter(|w| w[0] == 3).all(|w| w.len() == 1));
    }

    #[test]
    fn test_walks_are_deterministic_across_runs() {
        let graph = UndirectedGraph::from_edges(5, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 0)]);
        assert_eq!(generate_walks(&graph, 8, 4, 9), generate_walks(&graph, 8, 4, 9));
    }

    #[test]
    fn test_node2vec_covers_every_node() {
        let graph = UndirectedGraph::from_edges(5, &[(0, 1), (1, 2), (2, 0)]);
        let vectors = node2vec(&graph, &small_config());

        assert_eq!(vectors.len(), 5);
        for i in 0..5 {
            let v = vectors.get(&i.to_string()).unwrap();
            assert_eq!(v.len(), 8);
            assert!(v.iter().all(|x| x.is_finite()));
        }
    }

    #[test]
    fn test_node2vec_separates_components() {
        // Two disjoint 4-cliques
        let mut edges = Vec::new();
        for base in [0, 4] {
            for i in 0..4 {
                for j in (i + 1)..4 {
                    edges.push((base + i, base + j));
                }
            }
        }
        let graph = UndirectedGraph::from_edges(8, &edges);
        let config = Node2VecConfig {
            num_walks: 40,
            epochs: 5,
            ..small_config()
        };
        let vectors = node2vec(&graph, &config);

        let cos = |a: usize, b: usize| {
            let x = vectors.get(&a.to_string()).unwrap();
            let y = vectors.get(&b.to_string()).unwrap();
            let dot: f64 = x.iter().zip(y).map(|(p, q)| p * q).sum();
            let nx: f64 = x.iter().map(|p| p * p).sum::<f64>().sqrt();
            let ny: f64 = y.iter().map(|q| q * q).sum::<f64>().sqrt();
            dot / (nx * ny)
        };
        assert!(cos(0, 1) > cos(0, 5));
    }

    #[test]
    fn test_node2vec_empty_graph() {
        let graph = UndirectedGraph::from_edges(0, &[]);
        assert!(node2vec(&graph, &small_config()).is_empty());
    }
}
