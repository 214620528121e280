use netscope_layout::{
    build_tree, AccelerationError, ForceAccelerator, ForceAtlas2, LayoutConfig, LayoutEngine,
    LayoutPipeline, NodeId, Point, PositionMap, Strategy, Subgraph,
};
use petgraph::graphmap::UnGraphMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use test_log::test;

fn scenario() -> Subgraph {
    Subgraph::new([0, 1, 2, 3, 4], [(0, 1), (0, 2), (1, 3), (1, 4)], 0).unwrap()
}

/// Tree rooted at 0 plus an isolated node 42
fn with_isolated() -> Subgraph {
    Subgraph::new(
        [0, 1, 2, 3, 4, 42],
        [(0, 1), (0, 2), (1, 3), (1, 4)],
        0,
    )
    .unwrap()
}

fn deepest_tree_y(p: &PositionMap) -> f64 {
    [0, 1, 2, 3, 4]
        .iter()
        .map(|n| p[n].y)
        .fold(f64::NEG_INFINITY, f64::max)
}

fn random_subgraph(seed: u64) -> Subgraph {
    let mut rng = StdRng::seed_from_u64(seed);
    let n = rng.gen_range(1..40u32);
    let edges: Vec<(NodeId, NodeId)> = (0..rng.gen_range(0..2 * n))
        .map(|_| (rng.gen_range(0..n), rng.gen_range(0..n)))
        .collect();
    // Origin sometimes falls outside the node set
    let origin = rng.gen_range(0..n + 3);
    Subgraph::new(0..n, edges, origin).unwrap()
}

fn pipelines() -> Vec<(String, LayoutPipeline)> {
    let chains = [
        Strategy::ALL.to_vec(),
        vec![Strategy::Tree, Strategy::Radial, Strategy::Grid],
        vec![Strategy::Tree, Strategy::Grid],
        vec![Strategy::Force],
        vec![Strategy::Radial],
        vec![],
    ];

    let mut pipelines = Vec::new();
    for chain in chains {
        let config = LayoutConfig {
            strategies: chain.clone(),
            ..Default::default()
        };
        pipelines.push((format!("{chain:?}"), LayoutPipeline::new(config.clone())));
        pipelines.push((
            format!("{chain:?} + fa2"),
            LayoutPipeline::new(config).with_accelerator(ForceAtlas2::default()),
        ));
    }
    pipelines
}

#[test]
fn every_node_is_placed_once() {
    for seed in 0..25 {
        let subgraph = random_subgraph(seed);
        for (name, pipeline) in pipelines() {
            let outcome = pipeline.run(&subgraph).unwrap();
            assert_eq!(
                outcome.positions.len(),
                subgraph.node_count(),
                "seed {seed}, {name}"
            );
            for node in subgraph.nodes() {
                assert!(
                    outcome.positions.contains_key(node),
                    "seed {seed}, {name}: node {node} missing"
                );
            }
            assert!(outcome.positions.values().all(|p| p.is_finite()));
            let placed: usize = outcome.steps.iter().map(|s| s.placed).sum();
            assert_eq!(placed, subgraph.node_count(), "seed {seed}, {name}");
        }
    }
}

#[test]
fn layouts_are_reproducible() {
    for seed in 0..10 {
        let subgraph = random_subgraph(seed);
        for (name, pipeline) in pipelines() {
            let a = pipeline.layout(&subgraph).unwrap();
            let b = pipeline.layout(&subgraph).unwrap();
            assert_eq!(a, b, "seed {seed}, {name}");
        }
    }
}

#[test]
fn empty_subgraph_gives_empty_map() {
    let subgraph = Subgraph::new([], [], 0).unwrap();
    let outcome = LayoutPipeline::default().run(&subgraph).unwrap();
    assert!(outcome.positions.is_empty());
    assert!(outcome.steps.is_empty());
}

#[test]
fn scenario_tree() {
    let subgraph = scenario();
    let tree = build_tree(&subgraph, 0);
    let depths: Vec<_> = (0..5).map(|n| tree.depth(n).unwrap()).collect();
    assert_eq!(depths, vec![0, 1, 1, 2, 2]);
    assert_eq!(tree.children(0), &[1, 2]);
    assert_eq!(tree.children(1), &[3, 4]);

    let outcome = LayoutPipeline::default().run(&subgraph).unwrap();
    assert_eq!(outcome.placed_with(Strategy::Tree), 5);
    assert_eq!(outcome.steps.len(), 1);

    let p = &outcome.positions;
    assert!(p[&3].x < p[&2].x && p[&4].x < p[&2].x && p[&1].x < p[&2].x);
    assert!(p[&0].y < p[&1].y && p[&1].y < p[&3].y);
}

#[test]
fn disconnected_node_goes_below_tree() {
    let subgraph = with_isolated();

    for (name, pipeline) in pipelines() {
        let outcome = pipeline.run(&subgraph).unwrap();
        let strategies = &pipeline.config().strategies;
        if !strategies.contains(&Strategy::Tree) {
            continue;
        }
        let p = &outcome.positions;
        assert!(p[&42].y > deepest_tree_y(p), "{name}");
    }
}

#[test]
fn force_fills_gaps_after_tree() {
    let outcome = LayoutPipeline::default().run(&with_isolated()).unwrap();
    assert_eq!(outcome.placed_with(Strategy::Tree), 5);
    assert_eq!(outcome.placed_by[&42], Strategy::Force);
    assert_eq!(outcome.steps.len(), 2);
}

#[test]
fn oversized_gap_skips_force() {
    let mut config = LayoutConfig::default();
    config.force.max_nodes = 0;
    let outcome = LayoutPipeline::new(config).run(&with_isolated()).unwrap();

    assert_eq!(outcome.placed_by[&42], Strategy::Radial);
    assert!(!outcome.steps[1].attempted);
    assert_eq!(outcome.steps[1].strategy, Strategy::Force);
    let p = &outcome.positions;
    assert!(p[&42].y > deepest_tree_y(p));
}

#[test]
fn radial_gap_sits_below_tree() {
    let config = LayoutConfig {
        strategies: vec![Strategy::Tree, Strategy::Radial],
        ..Default::default()
    };
    let level_y = config.tree.level_y;
    let outcome = LayoutPipeline::new(config).run(&with_isolated()).unwrap();

    assert_eq!(outcome.placed_with(Strategy::Tree), 5);
    assert_eq!(outcome.placed_by[&42], Strategy::Radial);
    let p = &outcome.positions;
    assert_eq!(deepest_tree_y(p), 2.0 * level_y);
    assert!(p[&42].y >= 3.0 * level_y);
}

#[test]
fn listed_order_does_not_change_the_chain() {
    let config = LayoutConfig {
        strategies: vec![Strategy::Radial, Strategy::Tree],
        ..Default::default()
    };
    let outcome = LayoutPipeline::new(config).run(&with_isolated()).unwrap();

    let order: Vec<_> = outcome.steps.iter().map(|s| s.strategy).collect();
    assert_eq!(order, vec![Strategy::Tree, Strategy::Radial]);
    assert_eq!(outcome.placed_with(Strategy::Tree), 5);
    assert_eq!(outcome.placed_with(Strategy::Radial), 1);
}

#[test]
fn grid_catches_the_rest() {
    let config = LayoutConfig {
        strategies: vec![Strategy::Tree],
        ..Default::default()
    };
    let spacing = config.tree;
    let outcome = LayoutPipeline::new(config).run(&with_isolated()).unwrap();

    assert_eq!(outcome.placed_by[&42], Strategy::Grid);
    assert_eq!(outcome.positions[&42].y, 3.0 * spacing.level_y);
}

#[test]
fn missing_origin_skips_tree_and_radial() {
    let subgraph = Subgraph::new([1, 2, 3], [(1, 2), (2, 3)], 0).unwrap();
    let config = LayoutConfig {
        strategies: vec![Strategy::Tree, Strategy::Radial, Strategy::Grid],
        ..Default::default()
    };
    let outcome = LayoutPipeline::new(config).run(&subgraph).unwrap();

    let attempted: Vec<_> = outcome
        .steps
        .iter()
        .map(|s| (s.strategy, s.attempted))
        .collect();
    assert_eq!(
        attempted,
        vec![
            (Strategy::Tree, false),
            (Strategy::Radial, false),
            (Strategy::Grid, true)
        ]
    );
    assert_eq!(outcome.placed_with(Strategy::Grid), 3);
    assert!(outcome.positions.values().all(|p| p.y == 0.0));
}

#[test]
fn missing_origin_uses_force_on_everything() {
    let subgraph = Subgraph::new([1, 2, 3], [(1, 2), (2, 3)], 0).unwrap();
    let outcome = LayoutPipeline::default().run(&subgraph).unwrap();
    assert_eq!(outcome.placed_with(Strategy::Force), 3);
}

struct Rogue;

impl ForceAccelerator for Rogue {
    fn name(&self) -> &'static str {
        "rogue"
    }

    fn layout(&self, graph: &UnGraphMap<NodeId, ()>) -> Result<PositionMap, AccelerationError> {
        let mut positions: PositionMap = graph
            .nodes()
            .map(|n| (n, Point::new(n as f64, 0.0)))
            .collect();
        positions.insert(9999, Point::zero());
        Ok(positions)
    }
}

#[test]
fn foreign_nodes_never_leak() {
    let subgraph = Subgraph::new([1, 2, 3], [(1, 2)], 0).unwrap();
    let positions = LayoutPipeline::default()
        .with_accelerator(Rogue)
        .layout(&subgraph)
        .unwrap();

    assert_eq!(positions.keys().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
    assert_eq!(positions[&2], Point::new(2.0, 0.0));
}
