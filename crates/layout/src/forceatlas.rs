//! ForceAtlas2 with Barnes-Hut approximated repulsion
//!
//! Node mass is `1 + degree`. Repulsion is approximated with a quadtree
//! split around mass centers, attraction is linear and optionally divided by
//! the source mass, gravity pulls towards the origin, and every node moves
//! with an adaptive speed bounded by its own swinging.

use crate::{AccelerationError, ForceAccelerator, NodeId, Point, PositionMap};
use petgraph::graphmap::UnGraphMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::trace;

/// Quadtree regions deeper than this are treated as leaves
const MAX_REGION_DEPTH: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForceAtlas2 {
    pub iterations: usize,
    pub scaling_ratio: f64,
    pub gravity: f64,
    pub jitter_tolerance: f64,
    /// Barnes-Hut opening criterion
    pub theta: f64,
    /// Divide attraction by the mass of the source node
    pub outbound_attraction_distribution: bool,
    pub seed: u64,
}

impl Default for ForceAtlas2 {
    fn default() -> Self {
        Self {
            iterations: 200,
            scaling_ratio: 8.0,
            gravity: 1.0,
            jitter_tolerance: 1.0,
            theta: 1.2,
            outbound_attraction_distribution: true,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Body {
    x: f64,
    y: f64,
    mass: f64,
    dx: f64,
    dy: f64,
    old_dx: f64,
    old_dy: f64,
}

#[derive(Debug)]
struct Region {
    bodies: Vec<usize>,
    mass: f64,
    center_x: f64,
    center_y: f64,
    size: f64,
    children: Vec<usize>,
}

/// Arena-allocated Barnes-Hut quadtree
struct QuadTree {
    regions: Vec<Region>,
}

impl QuadTree {
    fn build(bodies: &[Body]) -> Self {
        let mut tree = Self {
            regions: Vec::new(),
        };
        tree.push_region(bodies, (0..bodies.len()).collect());

        let mut pending = vec![(0, 0)];
        while let Some((index, depth)) = pending.pop() {
            if tree.regions[index].bodies.len() < 2 || depth >= MAX_REGION_DEPTH {
                continue;
            }

            let (cx, cy) = (tree.regions[index].center_x, tree.regions[index].center_y);
            let mut quadrants: [Vec<usize>; 4] = Default::default();
            for &b in &tree.regions[index].bodies {
                let quadrant = match (bodies[b].x < cx, bodies[b].y < cy) {
                    (true, true) => 0,
                    (false, true) => 1,
                    (true, false) => 2,
                    (false, false) => 3,
                };
                quadrants[quadrant].push(b);
            }

            // Coincident bodies cannot be separated any further
            if quadrants.iter().filter(|q| !q.is_empty()).count() < 2 {
                continue;
            }

            for quadrant in quadrants.into_iter().filter(|q| !q.is_empty()) {
                let child = tree.push_region(bodies, quadrant);
                tree.regions[index].children.push(child);
                pending.push((child, depth + 1));
            }
        }

        tree
    }

    fn push_region(&mut self, bodies: &[Body], members: Vec<usize>) -> usize {
        let mass: f64 = members.iter().map(|&b| bodies[b].mass).sum();
        let (mut cx, mut cy) = (0.0, 0.0);
        for &b in &members {
            cx += bodies[b].x * bodies[b].mass;
            cy += bodies[b].y * bodies[b].mass;
        }
        if mass > 0.0 {
            cx /= mass;
            cy /= mass;
        }
        let size = members
            .iter()
            .map(|&b| 2.0 * (bodies[b].x - cx).hypot(bodies[b].y - cy))
            .fold(0.0, f64::max);

        self.regions.push(Region {
            bodies: members,
            mass,
            center_x: cx,
            center_y: cy,
            size,
            children: Vec::new(),
        });
        self.regions.len() - 1
    }

    /// Repulsion force on `body` from every other body, approximated
    fn repulsion(&self, bodies: &[Body], body: usize, theta: f64, coefficient: f64) -> (f64, f64) {
        let me = bodies[body];
        let (mut fx, mut fy) = (0.0, 0.0);
        let mut stack = vec![0];

        while let Some(index) = stack.pop() {
            let region = &self.regions[index];
            if region.children.is_empty() {
                for &other in region.bodies.iter().filter(|&&other| other != body) {
                    let o = bodies[other];
                    let (dx, dy) = (me.x - o.x, me.y - o.y);
                    let d2 = dx * dx + dy * dy;
                    if d2 > 0.0 {
                        let factor = coefficient * me.mass * o.mass / d2;
                        fx += dx * factor;
                        fy += dy * factor;
                    }
                }
                continue;
            }

            let dx = me.x - region.center_x;
            let dy = me.y - region.center_y;
            let distance = dx.hypot(dy);
            if distance * theta > region.size {
                let factor = coefficient * me.mass * region.mass / (distance * distance);
                fx += dx * factor;
                fy += dy * factor;
            } else {
                stack.extend(region.children.iter().copied());
            }
        }

        (fx, fy)
    }
}

impl ForceAtlas2 {
    fn step(
        &self,
        bodies: &mut [Body],
        edges: &[(usize, usize)],
        speed: &mut f64,
        efficiency: &mut f64,
        compensation: f64,
    ) {
        for b in bodies.iter_mut() {
            b.old_dx = b.dx;
            b.old_dy = b.dy;
            b.dx = 0.0;
            b.dy = 0.0;
        }

        let tree = QuadTree::build(bodies);
        let forces: Vec<(f64, f64)> = (0..bodies.len())
            .map(|i| tree.repulsion(bodies, i, self.theta, self.scaling_ratio))
            .collect();
        for (b, (fx, fy)) in bodies.iter_mut().zip(forces) {
            b.dx += fx;
            b.dy += fy;

            let distance = b.x.hypot(b.y);
            if distance > 0.0 {
                let factor = b.mass * self.gravity / distance;
                b.dx -= b.x * factor;
                b.dy -= b.y * factor;
            }
        }

        for &(i, j) in edges {
            let (dx, dy) = (bodies[i].x - bodies[j].x, bodies[i].y - bodies[j].y);
            let factor = if self.outbound_attraction_distribution {
                -compensation / bodies[i].mass
            } else {
                -1.0
            };
            bodies[i].dx += dx * factor;
            bodies[i].dy += dy * factor;
            bodies[j].dx -= dx * factor;
            bodies[j].dy -= dy * factor;
        }

        self.apply_forces(bodies, speed, efficiency);
    }

    fn apply_forces(&self, bodies: &mut [Body], speed: &mut f64, efficiency: &mut f64) {
        let mut swinging_total = 0.0;
        let mut traction_total = 0.0;
        for b in bodies.iter() {
            swinging_total += b.mass * (b.old_dx - b.dx).hypot(b.old_dy - b.dy);
            traction_total += 0.5 * b.mass * (b.old_dx + b.dx).hypot(b.old_dy + b.dy);
        }

        let n = bodies.len() as f64;
        let estimated_jitter = 0.05 * n.sqrt();
        let min_jitter = estimated_jitter.sqrt();
        let max_jitter: f64 = 10.0;
        let mut jitter = self.jitter_tolerance
            * min_jitter.max(max_jitter.min(estimated_jitter * traction_total / (n * n)));

        let min_efficiency = 0.05;
        if traction_total > 0.0 && swinging_total / traction_total > 2.0 {
            if *efficiency > min_efficiency {
                *efficiency *= 0.5;
            }
            jitter = jitter.max(self.jitter_tolerance);
        }

        let target_speed = if swinging_total == 0.0 {
            f64::INFINITY
        } else {
            jitter * *efficiency * traction_total / swinging_total
        };

        if swinging_total > jitter * traction_total {
            if *efficiency > min_efficiency {
                *efficiency *= 0.7;
            }
        } else if *speed < 1000.0 {
            *efficiency *= 1.3;
        }

        let max_rise = 0.5;
        *speed += (target_speed - *speed).min(max_rise * *speed);

        for b in bodies.iter_mut() {
            let swinging = b.mass * (b.old_dx - b.dx).hypot(b.old_dy - b.dy);
            let factor = *speed / (1.0 + (*speed * swinging).sqrt());
            b.x += b.dx * factor;
            b.y += b.dy * factor;
        }
    }
}

impl ForceAccelerator for ForceAtlas2 {
    fn name(&self) -> &'static str {
        "forceatlas2"
    }

    fn layout(&self, graph: &UnGraphMap<NodeId, ()>) -> Result<PositionMap, AccelerationError> {
        if graph.node_count() == 0 {
            return Err(AccelerationError::EmptyGraph);
        }

        let nodes: Vec<NodeId> = graph.nodes().collect();
        let index: HashMap<NodeId, usize> = nodes.iter().enumerate().map(|(i, &n)| (n, i)).collect();
        let edges: Vec<(usize, usize)> = graph
            .all_edges()
            .filter(|(a, b, _)| a != b)
            .map(|(a, b, _)| (index[&a], index[&b]))
            .collect();

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut bodies: Vec<Body> = nodes
            .iter()
            .map(|&n| Body {
                x: rng.gen::<f64>(),
                y: rng.gen::<f64>(),
                mass: 1.0 + graph.neighbors(n).count() as f64,
                ..Default::default()
            })
            .collect();

        let compensation = if self.outbound_attraction_distribution {
            bodies.iter().map(|b| b.mass).sum::<f64>() / bodies.len() as f64
        } else {
            1.0
        };

        let mut speed = 1.0;
        let mut efficiency = 1.0;
        for iteration in 0..self.iterations {
            self.step(&mut bodies, &edges, &mut speed, &mut efficiency, compensation);
            trace!("forceatlas2 iteration {iteration}, speed {speed:.4}");
        }

        nodes
            .iter()
            .zip(&bodies)
            .map(|(&node, b)| {
                let point = Point::new(b.x, b.y);
                if point.is_finite() {
                    Ok((node, point))
                } else {
                    Err(AccelerationError::Diverged(node))
                }
            })
            .collect()
    }
}
