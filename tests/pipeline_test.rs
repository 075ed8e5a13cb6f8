use ndarray::Array2;
use skymap::algo::{GraphView, KeyedVectors, UndirectedGraph};
use skymap::{
    CommunityDetector, CommunityId, GraphEmbedder, LabelingStatus, OracleError, OracleResult,
    Pipeline, PipelineError, PipelineInput, Projector, Stage, TermWeightParams, TermWeighter,
    WalkParams,
};

fn input(edges: &[(&str, &str)], bios: &[(&str, &str)]) -> PipelineInput {
    PipelineInput {
        edges: edges
            .iter()
            .map(|(s, t)| (s.to_string(), t.to_string()))
            .collect(),
        bios: bios
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        resolution: 1.0,
        dimensions: 4,
    }
}

fn triangle_and_pair() -> PipelineInput {
    input(
        &[("a", "b"), ("b", "c"), ("c", "a"), ("x", "y")],
        &[
            ("a", "cats dogs"),
            ("b", "cats"),
            ("c", "dogs"),
            ("x", "finance stocks"),
            ("y", "finance"),
        ],
    )
}

/// Assigns fixed community ids, in node index order
struct FixedDetector(Vec<CommunityId>);

impl CommunityDetector for FixedDetector {
    fn detect(&self, _: &GraphView, _: f64) -> OracleResult<Vec<CommunityId>> {
        Ok(self.0.clone())
    }
}

/// Constant vector per node, valued by its index
struct IndexEmbedder;

impl GraphEmbedder for IndexEmbedder {
    fn embed(
        &self,
        graph: &UndirectedGraph,
        dimensions: usize,
        _: &WalkParams,
    ) -> OracleResult<KeyedVectors> {
        let mut vectors = KeyedVectors::new(dimensions);
        for i in 0..graph.node_count() {
            vectors.insert(i.to_string(), vec![i as f64; dimensions]);
        }
        Ok(vectors)
    }
}

/// Places node `i` at `(i, 10 * i)`
struct DiagonalProjector;

impl Projector for DiagonalProjector {
    fn project(&self, embeddings: &Array2<f64>, _: u64) -> OracleResult<Array2<f64>> {
        let n = embeddings.nrows();
        Ok(Array2::from_shape_fn((n, 2), |(i, j)| {
            if j == 0 {
                i as f64
            } else {
                10.0 * i as f64
            }
        }))
    }
}

struct TransposedProjector;

impl Projector for TransposedProjector {
    fn project(&self, embeddings: &Array2<f64>, _: u64) -> OracleResult<Array2<f64>> {
        Ok(Array2::zeros((2, embeddings.nrows())))
    }
}

struct FailingEmbedder;

impl GraphEmbedder for FailingEmbedder {
    fn embed(&self, _: &UndirectedGraph, _: usize, _: &WalkParams) -> OracleResult<KeyedVectors> {
        Err(OracleError::Failed("walk generator crashed".to_string()))
    }
}

struct FailingWeighter;

impl TermWeighter for FailingWeighter {
    fn weigh(&self, _: &[String], _: &TermWeightParams) -> OracleResult<Vec<Vec<(String, f64)>>> {
        Err(OracleError::Failed("vocabulary collapsed".to_string()))
    }
}

fn mock_pipeline(membership: Vec<CommunityId>) -> Pipeline {
    Pipeline::default()
        .with_detector(FixedDetector(membership))
        .with_embedder(IndexEmbedder)
        .with_projector(DiagonalProjector)
}

#[test]
fn test_triangle_and_pair_scenario() {
    let output = Pipeline::default().run(&triangle_and_pair()).unwrap();

    assert_eq!(output.communities.len(), 2);
    assert_eq!(output.embeddings.len(), 5);

    let community_of = |id: &str| output.node(id).unwrap().community_id;
    assert_eq!(community_of("a"), community_of("b"));
    assert_eq!(community_of("a"), community_of("c"));
    assert_eq!(community_of("x"), community_of("y"));
    assert_ne!(community_of("a"), community_of("x"));

    let social = output.community(community_of("a")).unwrap();
    let money = output.community(community_of("x")).unwrap();
    assert_eq!(social.member_count, 3);
    assert_eq!(money.member_count, 2);
    assert_eq!(social.label, "cats, dogs");
    assert_eq!(money.label, "finance, stocks");
    assert!(social.top_terms.iter().all(|t| t == "cats" || t == "dogs"));
    assert!(money.top_terms.iter().all(|t| t == "finance" || t == "stocks"));

    for community in &output.communities {
        assert!(community.centroid_x.is_finite());
        assert!(community.centroid_y.is_finite());
    }
    assert_eq!(output.communities[0].color.to_string(), "hsl(0, 70%, 50%)");
    assert_eq!(output.communities[1].color.to_string(), "hsl(180, 70%, 50%)");
}

#[test]
fn test_empty_edges() {
    let output = Pipeline::default().run(&input(&[], &[])).unwrap();
    assert!(output.communities.is_empty());
    assert!(output.embeddings.is_empty());
    assert_eq!(
        serde_json::to_string(&output).unwrap(),
        r#"{"communities":[],"embeddings":[]}"#
    );
}

#[test]
fn test_single_self_loop() {
    let output = Pipeline::default().run(&input(&[("a", "a")], &[])).unwrap();

    assert_eq!(output.communities.len(), 1);
    let community = &output.communities[0];
    assert_eq!(community.member_count, 1);
    assert_eq!(community.label, format!("Community {}", community.id));
    assert!(community.top_terms.is_empty());
    assert_eq!(output.embeddings[0].identifier, "a");
    assert_eq!(output.embeddings[0].community_id, community.id);
}

#[test]
fn test_membership_is_exhaustive_and_centroids_are_means() {
    let pipeline = mock_pipeline(vec![7, -2, 7, 3, -2]);
    let output = pipeline
        .run(&input(&[("n0", "n1"), ("n2", "n3"), ("n4", "n0")], &[]))
        .unwrap();

    let total: usize = output.communities.iter().map(|c| c.member_count).sum();
    assert_eq!(total, output.embeddings.len());

    for community in &output.communities {
        let members: Vec<_> = output
            .embeddings
            .iter()
            .filter(|n| n.community_id == community.id)
            .collect();
        assert_eq!(members.len(), community.member_count);
        let mean_x = members.iter().map(|n| n.x).sum::<f64>() / members.len() as f64;
        let mean_y = members.iter().map(|n| n.y).sum::<f64>() / members.len() as f64;
        assert!((community.centroid_x - mean_x).abs() < 1e-6);
        assert!((community.centroid_y - mean_y).abs() < 1e-6);
    }
}

#[test]
fn test_communities_ascend_and_colors_follow_rank() {
    let pipeline = mock_pipeline(vec![42, -5, 0, 42]);
    let output = pipeline
        .run(&input(&[("a", "b"), ("c", "d")], &[]))
        .unwrap();

    let ids: Vec<CommunityId> = output.communities.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![-5, 0, 42]);

    let hues: Vec<u32> = output.communities.iter().map(|c| c.color.hue).collect();
    assert_eq!(hues, vec![0, 120, 240]);

    // Nodes stay in discovery order regardless of community id
    let identifiers: Vec<&str> = output
        .embeddings
        .iter()
        .map(|n| n.identifier.as_str())
        .collect();
    assert_eq!(identifiers, vec!["a", "b", "c", "d"]);
}

#[test]
fn test_missing_bios_give_fallback_labels() {
    let pipeline = mock_pipeline(vec![1, 2, 1]);
    let run = pipeline
        .run_with_report(&input(&[("a", "b"), ("b", "c")], &[("a", ""), ("b", "")]))
        .unwrap();

    assert_eq!(run.labeling, LabelingStatus::NoText);
    for community in &run.output.communities {
        assert_eq!(community.label, format!("Community {}", community.id));
        assert!(community.top_terms.is_empty());
    }
}

#[test]
fn test_weighter_failure_is_not_fatal() {
    let pipeline = Pipeline::default().with_weighter(FailingWeighter);
    let run = pipeline.run_with_report(&triangle_and_pair()).unwrap();

    assert!(matches!(run.labeling, LabelingStatus::OracleFailed(_)));
    assert_eq!(run.output.embeddings.len(), 5);
    for community in &run.output.communities {
        assert_eq!(community.label, format!("Community {}", community.id));
    }
}

#[test]
fn test_stop_word_bios_fall_back() {
    let pipeline = mock_pipeline(vec![0, 1]);
    let run = pipeline
        .run_with_report(&input(&[("a", "b")], &[("a", "the and of"), ("b", "it is")]))
        .unwrap();

    assert!(matches!(run.labeling, LabelingStatus::OracleFailed(_)));
    assert_eq!(run.output.communities[0].label, "Community 0");
    assert_eq!(run.output.communities[1].label, "Community 1");
}

#[test]
fn test_embedding_failure_is_fatal() {
    let pipeline = Pipeline::default().with_embedder(FailingEmbedder);
    let err = pipeline.run(&triangle_and_pair()).unwrap_err();
    assert!(matches!(err, PipelineError::Embedding(_)));
}

#[test]
fn test_malformed_projection_is_fatal() {
    let pipeline = mock_pipeline(vec![0, 0, 0]).with_projector(TransposedProjector);
    let err = pipeline
        .run(&input(&[("a", "b"), ("b", "c")], &[]))
        .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::MalformedOutput {
            stage: Stage::Projection,
            ..
        }
    ));
}

#[test]
fn test_wrong_membership_length_is_fatal() {
    let pipeline = mock_pipeline(vec![0]);
    let err = pipeline.run(&input(&[("a", "b")], &[])).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::MalformedOutput {
            stage: Stage::Community,
            ..
        }
    ));
}

#[test]
fn test_bios_for_unknown_identifiers_are_ignored() {
    let pipeline = mock_pipeline(vec![0, 1]);
    let output = pipeline
        .run(&input(
            &[("a", "b")],
            &[("a", "rust"), ("b", "compilers"), ("ghost", "phantom")],
        ))
        .unwrap();
    assert_eq!(output.embeddings.len(), 2);
    assert_eq!(output.communities[0].top_terms, vec!["rust"]);
    assert_eq!(output.communities[1].top_terms, vec!["compilers"]);
}

#[test]
fn test_runs_are_reproducible_with_seeded_backends() {
    let first = Pipeline::default().run(&triangle_and_pair()).unwrap();
    let second = Pipeline::default().run(&triangle_and_pair()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_parallel_edges_and_duplicates_pass_through() {
    let output = Pipeline::default()
        .run(&input(&[("a", "b"), ("a", "b"), ("b", "a")], &[]))
        .unwrap();
    assert_eq!(output.embeddings.len(), 2);
}
