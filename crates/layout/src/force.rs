use crate::{
    AccelerationError, Bounds, ForceConfig, NodeId, Point, PositionMap, SpanningTree,
    SpringConfig, Subgraph, TreeSpacing,
};
use petgraph::graphmap::UnGraphMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use tracing::{debug, warn};

/// An optional, faster force-directed layout
///
/// Implementations work on the undirected projection of a subgraph. Any
/// error is treated by the pipeline as "no result" and the deterministic
/// spring embedding is used instead.
pub trait ForceAccelerator {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Compute a position for every node of `graph`
    ///
    /// # Errors
    /// Returns an error when the capability is unavailable or the
    /// simulation could not produce usable coordinates.
    fn layout(&self, graph: &UnGraphMap<NodeId, ()>) -> Result<PositionMap, AccelerationError>;
}

/// Fruchterman-Reingold spring embedding with a fixed seed
///
/// The result is centered on the centroid and scaled so the largest
/// absolute coordinate equals `config.scale`.
pub fn spring_layout(subgraph: &Subgraph, config: &SpringConfig) -> PositionMap {
    let nodes = subgraph.nodes();
    let n = nodes.len();
    match n {
        0 => return PositionMap::new(),
        1 => return PositionMap::from([(nodes[0], Point::zero())]),
        _ => {}
    }

    let index: HashMap<NodeId, usize> = nodes.iter().enumerate().map(|(i, &n)| (n, i)).collect();
    let edges: BTreeSet<(usize, usize)> = subgraph
        .edges()
        .iter()
        .map(|(from, to)| (index[from], index[to]))
        .filter(|(a, b)| a != b)
        .map(|(a, b)| (a.min(b), a.max(b)))
        .collect();

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut pos: Vec<(f64, f64)> = (0..n).map(|_| (rng.gen::<f64>(), rng.gen::<f64>())).collect();

    let k = config.optimal_distance(n);
    let initial = Bounds::of(pos.iter().map(|&(x, y)| Point::new(x, y)))
        .map_or(1.0, |b| b.width().max(b.height()));
    let mut temperature = initial * 0.1;
    let cooling = temperature / (config.iterations as f64 + 1.0);

    let mut displacement = vec![(0.0, 0.0); n];
    for _ in 0..config.iterations {
        displacement.iter_mut().for_each(|d| *d = (0.0, 0.0));

        for i in 0..n {
            for j in (i + 1)..n {
                let (dx, dy) = (pos[i].0 - pos[j].0, pos[i].1 - pos[j].1);
                let distance = dx.hypot(dy).max(0.01);
                let force = k * k / distance;
                let (fx, fy) = (dx / distance * force, dy / distance * force);
                displacement[i].0 += fx;
                displacement[i].1 += fy;
                displacement[j].0 -= fx;
                displacement[j].1 -= fy;
            }
        }

        for &(i, j) in &edges {
            let (dx, dy) = (pos[i].0 - pos[j].0, pos[i].1 - pos[j].1);
            let distance = dx.hypot(dy).max(0.01);
            let force = distance * distance / k;
            let (fx, fy) = (dx / distance * force, dy / distance * force);
            displacement[i].0 -= fx;
            displacement[i].1 -= fy;
            displacement[j].0 += fx;
            displacement[j].1 += fy;
        }

        for (p, &(dx, dy)) in pos.iter_mut().zip(&displacement) {
            let length = dx.hypot(dy).max(0.01);
            let step = length.min(temperature);
            p.0 += dx / length * step;
            p.1 += dy / length * step;
        }
        temperature -= cooling;
    }

    rescale(&mut pos, config.scale);

    nodes
        .iter()
        .zip(pos)
        .map(|(&node, (x, y))| (node, Point::new(x, y)))
        .collect()
}

/// Center on the centroid and scale into `[-scale, scale]`
fn rescale(pos: &mut [(f64, f64)], scale: f64) {
    let n = pos.len() as f64;
    let (sx, sy) = pos.iter().fold((0.0, 0.0), |acc, p| (acc.0 + p.0, acc.1 + p.1));
    let (cx, cy) = (sx / n, sy / n);

    let mut limit: f64 = 0.0;
    for p in pos.iter_mut() {
        p.0 -= cx;
        p.1 -= cy;
        limit = limit.max(p.0.abs()).max(p.1.abs());
    }

    if limit > 0.0 {
        for p in pos.iter_mut() {
            p.0 *= scale / limit;
            p.1 *= scale / limit;
        }
    }
}

/// Force-directed positions for a whole subgraph
///
/// Tries the accelerator first and falls back to [`spring_layout`] when it
/// is absent, fails or misses nodes.
pub fn force_layout(
    subgraph: &Subgraph,
    accelerator: Option<&dyn ForceAccelerator>,
    config: &SpringConfig,
) -> PositionMap {
    if subgraph.is_empty() {
        return PositionMap::new();
    }

    if let Some(accelerator) = accelerator {
        match accelerator.layout(&subgraph.to_undirected()) {
            Ok(positions)
                if subgraph
                    .nodes()
                    .iter()
                    .all(|n| positions.get(n).is_some_and(|p| p.is_finite())) =>
            {
                debug!(
                    "{} placed {} nodes",
                    accelerator.name(),
                    subgraph.node_count()
                );
                return positions
                    .into_iter()
                    .filter(|(n, _)| subgraph.contains(*n))
                    .collect();
            }
            Ok(_) => warn!(
                "{} did not place every node, using spring embedding",
                accelerator.name()
            ),
            Err(e) => warn!("{} failed: {e}, using spring embedding", accelerator.name()),
        }
    }

    spring_layout(subgraph, config)
}

/// Pseudo-depths for nodes the spanning tree did not reach
///
/// Every node starts one level below the deepest tree level. Nodes touching
/// the tree are the BFS sources, the rest of the gap set is reached by
/// undirected hops, and components that never touch the tree start their
/// own BFS at the same base level.
pub fn gap_depths(
    subgraph: &Subgraph,
    tree: &SpanningTree,
    missing: &BTreeSet<NodeId>,
) -> BTreeMap<NodeId, usize> {
    let base = tree.max_depth().map_or(0, |d| d + 1);
    let mut depths = BTreeMap::new();
    let mut queue = VecDeque::new();

    for &node in missing {
        let touches_tree = subgraph
            .neighbors_undirected(node)
            .iter()
            .any(|&n| tree.contains(n));
        if touches_tree {
            depths.insert(node, base);
            queue.push_back(node);
        }
    }

    let mut seeds = missing.iter().copied();
    loop {
        while let Some(node) = queue.pop_front() {
            let depth = depths[&node];
            for next in subgraph.neighbors_undirected(node) {
                if missing.contains(&next) && !depths.contains_key(&next) {
                    depths.insert(next, depth + 1);
                    queue.push_back(next);
                }
            }
        }

        match seeds.find(|n| !depths.contains_key(n)) {
            Some(seed) => {
                depths.insert(seed, base);
                queue.push_back(seed);
            }
            None => break,
        }
    }

    depths
}

/// Force-directed positions constrained to levels
///
/// The force output is normalized into `[-0.5, 0.5]` on both axes. The
/// horizontal extent grows logarithmically with the node count around
/// `center_x`, and each node sits on its level with a vertical jitter taken
/// from the normalized force y-coordinate.
pub fn layered_force_layout(
    subgraph: &Subgraph,
    depths: &BTreeMap<NodeId, usize>,
    accelerator: Option<&dyn ForceAccelerator>,
    config: &ForceConfig,
    spacing: &TreeSpacing,
    center_x: f64,
) -> PositionMap {
    let raw = force_layout(subgraph, accelerator, &config.spring);
    let Some(bounds) = Bounds::of(raw.values().copied()) else {
        return PositionMap::new();
    };

    let normalize = |value: f64, min: f64, extent: f64| {
        if extent > f64::EPSILON {
            (value - min) / extent - 0.5
        } else {
            0.0
        }
    };

    let n = subgraph.node_count() as f64;
    let width = config.level_x * (1.0 + (1.0 + n).ln());
    let fallback_depth = depths.values().copied().max().unwrap_or(0);

    raw.into_iter()
        .map(|(node, p)| {
            let nx = normalize(p.x, bounds.min.x, bounds.width());
            let ny = normalize(p.y, bounds.min.y, bounds.height());
            let depth = depths.get(&node).copied().unwrap_or(fallback_depth) as f64;
            let x = center_x + nx * width;
            let y = depth * spacing.level_y + ny * config.jitter_fraction * spacing.level_y;
            (node, Point::new(x, y))
        })
        .collect()
}
