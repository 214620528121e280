use crate::{NodeId, Point, PositionMap, RadialConfig, Subgraph};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};
use std::f64::consts::TAU;
use tracing::debug;

/// Hop distance from `origin` along outgoing edges
///
/// Nodes that cannot be reached are put on one extra outer level.
pub fn radial_levels(subgraph: &Subgraph, origin: NodeId) -> BTreeMap<usize, Vec<NodeId>> {
    let mut levels: BTreeMap<usize, Vec<NodeId>> = BTreeMap::new();
    if !subgraph.contains(origin) {
        return levels;
    }

    let mut visited = HashSet::from([origin]);
    let mut queue = VecDeque::from([(origin, 0)]);
    let mut max_level = 0;
    while let Some((node, level)) = queue.pop_front() {
        levels.entry(level).or_default().push(node);
        max_level = max_level.max(level);
        for next in subgraph.successors(node) {
            if visited.insert(next) {
                queue.push_back((next, level + 1));
            }
        }
    }

    let outer: Vec<NodeId> = subgraph
        .nodes()
        .iter()
        .copied()
        .filter(|n| !visited.contains(n))
        .collect();
    if !outer.is_empty() {
        levels.insert(max_level + 1, outer);
    }

    for nodes in levels.values_mut() {
        nodes.sort_unstable();
    }
    levels
}

/// Place nodes on concentric rings around `origin`
///
/// Ring `level` has radius `base_radius + level * radius_step`. Nodes on a
/// ring are evenly spaced in ascending id order, then nudged by a seeded
/// jitter. Returns an empty map when the origin is not in the subgraph.
pub fn radial_layout(subgraph: &Subgraph, origin: NodeId, config: &RadialConfig) -> PositionMap {
    let levels = radial_levels(subgraph, origin);
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut positions = PositionMap::new();

    for (&level, nodes) in &levels {
        let radius = config.base_radius + level as f64 * config.radius_step;
        let angle_step = TAU / nodes.len().max(1) as f64;
        for (i, &node) in nodes.iter().enumerate() {
            let angle = i as f64 * angle_step;
            let jitter = if config.jitter > 0.0 {
                rng.gen_range(-config.jitter..=config.jitter)
            } else {
                0.0
            };
            positions.insert(
                node,
                Point::new(radius * angle.cos() + jitter, radius * angle.sin() + jitter),
            );
        }
    }

    debug!(
        "Radial layout placed {} nodes on {} rings",
        positions.len(),
        levels.len()
    );

    positions
}

/// Move the ring positions of `nodes` under an existing layout
///
/// The ring center lands on `center_x` and the highest of the moved nodes on
/// `top`, so none of them sits above `top`. Other entries are left out.
pub fn place_rings_below(
    rings: &PositionMap,
    nodes: &BTreeSet<NodeId>,
    center_x: f64,
    top: f64,
) -> PositionMap {
    let selected: Vec<(NodeId, Point)> = rings
        .iter()
        .filter(|(n, _)| nodes.contains(n))
        .map(|(&n, &p)| (n, p))
        .collect();
    let Some(min_y) = selected.iter().map(|(_, p)| p.y).reduce(f64::min) else {
        return PositionMap::new();
    };

    selected
        .into_iter()
        .map(|(n, p)| (n, Point::new(center_x + p.x, top + (p.y - min_y))))
        .collect()
}
