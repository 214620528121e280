use crate::force::{force_layout, gap_depths, layered_force_layout};
use crate::{
    build_tree, grid_layout, place_rings_below, position_tree, radial_layout, Bounds, ForceAccelerator,
    LayoutConfig, LayoutEngine, LayoutError, NodeId, PositionMap, SpanningTree, Strategy,
    Subgraph,
};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, error, info, warn};

/// What one strategy of the chain did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepReport {
    pub strategy: Strategy,
    /// False when the strategy's preconditions were not met
    pub attempted: bool,
    /// Number of nodes this strategy placed
    pub placed: usize,
}

/// Result of a full layout run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutOutcome {
    pub positions: PositionMap,
    /// Strategy that placed each node
    pub placed_by: BTreeMap<NodeId, Strategy>,
    /// Strategies that ran, in order
    pub steps: Vec<StepReport>,
}

impl LayoutOutcome {
    /// Number of nodes placed by `strategy`
    pub fn placed_with(&self, strategy: Strategy) -> usize {
        self.placed_by.values().filter(|&&s| s == strategy).count()
    }
}

/// Ordered fallback chain of layout strategies
///
/// Each strategy only fills positions left empty by the ones before it, so a
/// position is never moved once assigned. The grid always runs last, which
/// guarantees that every node of the subgraph is placed exactly once.
pub struct LayoutPipeline {
    config: LayoutConfig,
    accelerator: Option<Box<dyn ForceAccelerator + Send + Sync>>,
}

impl Default for LayoutPipeline {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

impl std::fmt::Debug for LayoutPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutPipeline")
            .field("config", &self.config)
            .field("accelerator", &self.accelerator.as_ref().map(|a| a.name()))
            .finish()
    }
}

impl LayoutPipeline {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            accelerator: None,
        }
    }

    /// Use `accelerator` before the spring embedding in the force stage
    pub fn with_accelerator<A>(mut self, accelerator: A) -> Self
    where
        A: ForceAccelerator + Send + Sync + 'static,
    {
        self.accelerator = Some(Box::new(accelerator));
        self
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Run the strategy chain over `subgraph`
    ///
    /// An empty subgraph yields an empty outcome.
    ///
    /// # Errors
    /// Returns [`LayoutError::Incomplete`] if some node is left without a
    /// position, which the trailing grid stage rules out.
    pub fn run(&self, subgraph: &Subgraph) -> Result<LayoutOutcome, LayoutError> {
        let mut outcome = LayoutOutcome::default();
        if subgraph.is_empty() {
            debug!("Empty subgraph, nothing to lay out");
            return Ok(outcome);
        }

        let tree = build_tree(subgraph, subgraph.origin());

        for strategy in self.config.chain() {
            let missing: BTreeSet<NodeId> = subgraph
                .nodes()
                .iter()
                .copied()
                .filter(|n| !outcome.positions.contains_key(n))
                .collect();
            if missing.is_empty() {
                break;
            }

            let attempted = applies(strategy, subgraph, &tree, &missing, &self.config);
            let placed = if attempted {
                let proposed = self.propose(strategy, subgraph, &tree, &missing, &outcome.positions);
                merge(strategy, subgraph, proposed, &mut outcome)
            } else {
                debug!("{strategy:?}: preconditions not met, skipping");
                0
            };
            debug!(
                "{strategy:?}: placed {placed} of {} missing nodes",
                missing.len()
            );
            outcome.steps.push(StepReport {
                strategy,
                attempted,
                placed,
            });
        }

        if outcome.positions.len() != subgraph.node_count() {
            return Err(LayoutError::Incomplete {
                expected: subgraph.node_count(),
                placed: outcome.positions.len(),
            });
        }

        info!(
            "Laid out {} nodes and {} edges from origin {} ({})",
            subgraph.node_count(),
            subgraph.edge_count(),
            subgraph.origin(),
            outcome
                .steps
                .iter()
                .map(|s| format!("{:?}={}", s.strategy, s.placed))
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(outcome)
    }

    /// Positions proposed by `strategy` for the current gap set
    fn propose(
        &self,
        strategy: Strategy,
        subgraph: &Subgraph,
        tree: &SpanningTree,
        missing: &BTreeSet<NodeId>,
        placed: &PositionMap,
    ) -> PositionMap {
        let bounds = Bounds::of(placed.values().copied());
        let center_x = bounds.map_or(0.0, |b| b.center().x);
        let config = &self.config;
        match strategy {
            Strategy::Tree => position_tree(tree, &config.tree),
            Strategy::Force => {
                let gap = subgraph.induced(|n| missing.contains(&n));
                let accelerator = self.accelerator.as_deref().map(|a| a as &dyn ForceAccelerator);
                if tree.is_empty() {
                    force_layout(&gap, accelerator, &config.force.spring)
                } else {
                    let depths = gap_depths(subgraph, tree, missing);
                    layered_force_layout(
                        &gap,
                        &depths,
                        accelerator,
                        &config.force,
                        &config.tree,
                        center_x,
                    )
                }
            }
            Strategy::Radial => {
                let rings = radial_layout(subgraph, subgraph.origin(), &config.radial);
                match bounds {
                    // Gap nodes go one level below everything already placed
                    Some(bounds) => place_rings_below(
                        &rings,
                        missing,
                        center_x,
                        bounds.max.y + config.tree.level_y,
                    ),
                    None => rings,
                }
            }
            Strategy::Grid => grid_layout(
                missing.iter().copied(),
                tree.depths(),
                &config.tree,
                &config.grid,
                center_x,
            ),
        }
    }
}

/// Whether the preconditions of `strategy` hold
fn applies(
    strategy: Strategy,
    subgraph: &Subgraph,
    tree: &SpanningTree,
    missing: &BTreeSet<NodeId>,
    config: &LayoutConfig,
) -> bool {
    match strategy {
        Strategy::Tree => !tree.is_empty(),
        Strategy::Force => missing.len() <= config.force.max_nodes,
        Strategy::Radial => subgraph.contains(subgraph.origin()),
        Strategy::Grid => true,
    }
}

/// Add the new entries of `proposed` to the outcome
///
/// Nodes outside the subgraph, nodes already placed and non-finite
/// coordinates are dropped.
fn merge(
    strategy: Strategy,
    subgraph: &Subgraph,
    proposed: PositionMap,
    outcome: &mut LayoutOutcome,
) -> usize {
    let mut placed = 0;
    for (node, point) in proposed {
        if !subgraph.contains(node) {
            error!("{strategy:?} produced a position for node {node} outside the subgraph");
            continue;
        }
        if outcome.positions.contains_key(&node) {
            continue;
        }
        if !point.is_finite() {
            warn!("{strategy:?} produced a non-finite position for node {node}");
            continue;
        }
        outcome.positions.insert(node, point);
        outcome.placed_by.insert(node, strategy);
        placed += 1;
    }
    placed
}

impl LayoutEngine for LayoutPipeline {
    fn layout(&self, subgraph: &Subgraph) -> Result<PositionMap, LayoutError> {
        self.run(subgraph).map(|outcome| outcome.positions)
    }
}
