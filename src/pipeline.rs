//! Pipeline orchestration
//!
//! Registry -> graph -> communities -> (embedding -> projection) ->
//! aggregation -> labeling -> palette -> assembly. Stages run strictly in
//! sequence; any parallelism lives inside the oracle backends.

use crate::aggregate::aggregate_communities;
use crate::algo::adapter::{detect_communities, embed_nodes, project_to_2d};
use crate::algo::{
    CommunityDetector, GraphEmbedder, LeidenDetector, Node2VecEmbedder, PcaProjector, Projector,
    TermWeighter, TfIdfWeighter,
};
use crate::builder::build_graph;
use crate::config::{validate_parameters, PipelineConfig, PipelineInput};
use crate::error::PipelineResult;
use crate::labeling::{label_communities, LabelingStatus};
use crate::output::{assemble, PipelineOutput};
use crate::palette::palette;
use crate::registry::IdentifierRegistry;
use std::time::Instant;
use tracing::{debug, info};

/// Output plus diagnostics that are not part of the serialized result
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineRun {
    pub output: PipelineOutput,
    pub labeling: LabelingStatus,
    pub dropped_edges: usize,
}

/// Community pipeline with pluggable oracles
pub struct Pipeline {
    detector: Box<dyn CommunityDetector>,
    embedder: Box<dyn GraphEmbedder>,
    projector: Box<dyn Projector>,
    weighter: Box<dyn TermWeighter>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reference backends seeded from `config`
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            detector: Box::new(LeidenDetector {
                seed: config.community_seed,
            }),
            embedder: Box::new(Node2VecEmbedder {
                seed: config.embedding_seed,
                ..Default::default()
            }),
            projector: Box::new(PcaProjector),
            weighter: Box::new(TfIdfWeighter),
        }
    }

    pub fn with_detector(mut self, detector: impl CommunityDetector + 'static) -> Self {
        self.detector = Box::new(detector);
        self
    }

    pub fn with_embedder(mut self, embedder: impl GraphEmbedder + 'static) -> Self {
        self.embedder = Box::new(embedder);
        self
    }

    pub fn with_projector(mut self, projector: impl Projector + 'static) -> Self {
        self.projector = Box::new(projector);
        self
    }

    pub fn with_weighter(mut self, weighter: impl TermWeighter + 'static) -> Self {
        self.weighter = Box::new(weighter);
        self
    }

    /// Run one batch invocation
    pub fn run(&self, input: &PipelineInput) -> PipelineResult<PipelineOutput> {
        self.run_with_report(input).map(|run| run.output)
    }

    /// Run one batch invocation and keep the diagnostics
    pub fn run_with_report(&self, input: &PipelineInput) -> PipelineResult<PipelineRun> {
        validate_parameters(input.resolution, input.dimensions)?;
        let start = Instant::now();

        let registry = IdentifierRegistry::from_edges(&input.edges);
        let built = build_graph(&input.edges, &registry);
        info!(
            "Graph: {} nodes, {} edges",
            built.view.node_count,
            built.view.edge_count()
        );

        if registry.is_empty() {
            debug!("Empty graph; skipping oracles");
            return Ok(PipelineRun {
                output: PipelineOutput::default(),
                labeling: LabelingStatus::NoText,
                dropped_edges: built.dropped_edges,
            });
        }

        let membership = detect_communities(self.detector.as_ref(), &built.view, input.resolution)?;
        let embeddings = embed_nodes(self.embedder.as_ref(), &built.view, input.dimensions)?;
        let coordinates = project_to_2d(self.projector.as_ref(), &embeddings)?;

        let aggregates = aggregate_communities(&membership, &registry, &input.bios, &coordinates);
        info!("Aggregated {} communities", aggregates.len());

        let ids: Vec<_> = aggregates.iter().map(|a| a.id).collect();
        let texts: Vec<_> = aggregates.iter().map(|a| a.text.clone()).collect();
        let labeling = label_communities(&ids, &texts, self.weighter.as_ref());
        debug!("Labeling status: {:?}", labeling.status);

        let colors = palette(aggregates.len());
        let output = assemble(
            aggregates,
            labeling.labels,
            colors,
            &registry,
            &membership,
            &coordinates,
        );

        info!(
            "Pipeline finished in {:.2?}: {} nodes, {} communities",
            start.elapsed(),
            output.embeddings.len(),
            output.communities.len()
        );
        Ok(PipelineRun {
            output,
            labeling: labeling.status,
            dropped_edges: built.dropped_edges,
        })
    }
}

/// Run with the default reference backends
pub fn run_pipeline(input: &PipelineInput) -> PipelineResult<PipelineOutput> {
    Pipeline::default().run(input)
}
