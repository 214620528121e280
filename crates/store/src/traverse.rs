use crate::{CsrGraph, NodeId, StoreError};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, info};

/// Order in which a bounded traversal explores the graph
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraversalMode {
    #[default]
    BreadthFirst,
    DepthFirst,
}

/// Nodes and edges visited by a bounded traversal
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Traversal {
    /// Nodes in visiting order, the origin first
    pub nodes: Vec<NodeId>,
    pub edges: Vec<(NodeId, NodeId)>,
}

impl Traversal {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl CsrGraph {
    /// Explore the graph from `origin` up to `max_depth` hops
    ///
    /// # Errors
    /// Returns [`StoreError::OriginOutOfRange`] if `origin` is not a node of
    /// the graph.
    pub fn traverse(
        &self,
        origin: NodeId,
        max_depth: usize,
        mode: TraversalMode,
    ) -> Result<Traversal, StoreError> {
        if !self.contains(origin) {
            return Err(StoreError::OriginOutOfRange {
                origin,
                node_count: self.node_count(),
            });
        }

        info!("{mode:?} traversal from {origin}, max depth {max_depth}");
        let traversal = match mode {
            TraversalMode::BreadthFirst => self.breadth_first(origin, max_depth),
            TraversalMode::DepthFirst => self.depth_first(origin, max_depth),
        };
        info!(
            "Traversal visited {} nodes and {} edges",
            traversal.nodes.len(),
            traversal.edges.len()
        );
        Ok(traversal)
    }

    /// Every edge scanned from an expanded node is kept, including edges
    /// back to nodes that were already visited.
    fn breadth_first(&self, origin: NodeId, max_depth: usize) -> Traversal {
        let mut traversal = Traversal::default();
        let mut visited = vec![false; self.node_count()];
        let mut queue = VecDeque::from([(origin, 0)]);
        visited[origin as usize] = true;
        traversal.nodes.push(origin);

        let mut reported_level = None;
        while let Some((node, level)) = queue.pop_front() {
            if reported_level != Some(level) {
                reported_level = Some(level);
                debug!("Exploring level {level}");
            }
            if level >= max_depth {
                continue;
            }

            for &next in self.neighbors(node) {
                traversal.edges.push((node, next));
                if !visited[next as usize] {
                    visited[next as usize] = true;
                    traversal.nodes.push(next);
                    queue.push_back((next, level + 1));
                }
            }
        }

        traversal
    }

    /// Only tree edges are kept, recorded when their child is first popped.
    fn depth_first(&self, origin: NodeId, max_depth: usize) -> Traversal {
        struct Frame {
            node: NodeId,
            depth: usize,
            parent: Option<NodeId>,
        }

        let mut traversal = Traversal::default();
        let mut visited = vec![false; self.node_count()];
        let mut stack = vec![Frame {
            node: origin,
            depth: 0,
            parent: None,
        }];

        while let Some(frame) = stack.pop() {
            if visited[frame.node as usize] {
                continue;
            }
            visited[frame.node as usize] = true;
            traversal.nodes.push(frame.node);
            if let Some(parent) = frame.parent {
                traversal.edges.push((parent, frame.node));
            }
            if frame.depth >= max_depth {
                continue;
            }

            // Reversed so the first neighbor in input order is popped first
            for &next in self.neighbors(frame.node).iter().rev() {
                if !visited[next as usize] {
                    stack.push(Frame {
                        node: next,
                        depth: frame.depth + 1,
                        parent: Some(frame.node),
                    });
                }
            }
        }

        traversal
    }
}
