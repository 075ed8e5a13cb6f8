//! Oracle adapters
//!
//! Each adapter prepares the oracle's input, invokes it, and checks the shape
//! of the result. Oracle errors and malformed results are fatal.

use super::{
    CommunityDetector, CommunityId, GraphEmbedder, Projector, WalkParams, PROJECTION_SEED,
};
use crate::error::{PipelineError, PipelineResult, Stage};
use ndarray::Array2;
use skymap_graph_algorithms::GraphView;
use tracing::info;

/// Run community detection; returns one community id per node index.
pub fn detect_communities(
    detector: &dyn CommunityDetector,
    graph: &GraphView,
    resolution: f64,
) -> PipelineResult<Vec<CommunityId>> {
    let membership = detector
        .detect(graph, resolution)
        .map_err(PipelineError::Community)?;

    if membership.len() != graph.node_count {
        return Err(PipelineError::malformed(
            Stage::Community,
            format!(
                "expected {} memberships, got {}",
                graph.node_count,
                membership.len()
            ),
        ));
    }
    info!(
        "Community detection: {} nodes, resolution {}",
        membership.len(),
        resolution
    );
    Ok(membership)
}

/// Embed every node of the undirected form of `graph`.
///
/// Returns an `N x dimensions` matrix whose row `i` belongs to node index `i`.
pub fn embed_nodes(
    embedder: &dyn GraphEmbedder,
    graph: &GraphView,
    dimensions: usize,
) -> PipelineResult<Array2<f64>> {
    let n = graph.node_count;
    let undirected = graph.to_undirected();
    let vectors = embedder
        .embed(&undirected, dimensions, &WalkParams::default())
        .map_err(PipelineError::Embedding)?;

    if vectors.len() != n {
        return Err(PipelineError::malformed(
            Stage::Embedding,
            format!("expected {} vectors, got {}", n, vectors.len()),
        ));
    }

    let mut matrix = Array2::<f64>::zeros((n, dimensions));
    for idx in 0..n {
        let vector = vectors.get(&idx.to_string()).ok_or_else(|| {
            PipelineError::malformed(Stage::Embedding, format!("no vector for node {}", idx))
        })?;
        if vector.len() != dimensions {
            return Err(PipelineError::malformed(
                Stage::Embedding,
                format!(
                    "node {} has {} components, expected {}",
                    idx,
                    vector.len(),
                    dimensions
                ),
            ));
        }
        if vector.iter().any(|x| !x.is_finite()) {
            return Err(PipelineError::malformed(
                Stage::Embedding,
                format!("node {} has a non-finite component", idx),
            ));
        }
        for (col, &value) in vector.iter().enumerate() {
            matrix[[idx, col]] = value;
        }
    }

    info!(
        "Embedding: {} nodes x {} dimensions ({} undirected edges)",
        n,
        dimensions,
        undirected.edge_count()
    );
    Ok(matrix)
}

/// Project embeddings to 2D with the fixed layout seed.
pub fn project_to_2d(
    projector: &dyn Projector,
    embeddings: &Array2<f64>,
) -> PipelineResult<Array2<f64>> {
    let coordinates = projector
        .project(embeddings, PROJECTION_SEED)
        .map_err(PipelineError::Projection)?;

    let expected = (embeddings.nrows(), 2);
    if coordinates.dim() != expected {
        return Err(PipelineError::malformed(
            Stage::Projection,
            format!("expected {:?} coordinates, got {:?}", expected, coordinates.dim()),
        ));
    }
    if coordinates.iter().any(|x| !x.is_finite()) {
        return Err(PipelineError::malformed(
            Stage::Projection,
            "non-finite coordinate",
        ));
    }
    info!("Projection: {} points", coordinates.nrows());
    Ok(coordinates)
}
