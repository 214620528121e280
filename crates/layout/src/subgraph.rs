use crate::LayoutError;
use petgraph::graphmap::{DiGraphMap, UnGraphMap};
use petgraph::Direction;
use std::collections::BTreeSet;
use tracing::debug;

/// Opaque node identifier, unique within a subgraph
pub type NodeId = u32;

/// A bounded node/edge set extracted from a larger graph
///
/// Nodes keep their insertion order, which is the order the traversal
/// engine discovered them in. Every edge endpoint is a member of the node
/// set.
#[derive(Debug, Clone)]
pub struct Subgraph {
    nodes: Vec<NodeId>,
    edges: Vec<(NodeId, NodeId)>,
    origin: NodeId,
    graph: DiGraphMap<NodeId, ()>,
}

/// What [`Subgraph::truncate`] dropped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Truncation {
    pub dropped_nodes: usize,
    pub dropped_edges: usize,
}

impl Truncation {
    pub fn is_empty(&self) -> bool {
        self.dropped_nodes == 0 && self.dropped_edges == 0
    }
}

impl Subgraph {
    /// Build a subgraph from a node sequence, an edge sequence and an origin
    ///
    /// Repeated nodes and edges are collapsed onto their first occurrence.
    /// The origin does not need to be part of the node set.
    ///
    /// # Errors
    /// Returns [`LayoutError::DanglingEdge`] if an edge endpoint is missing
    /// from the node set.
    pub fn new<N, E>(nodes: N, edges: E, origin: NodeId) -> Result<Self, LayoutError>
    where
        N: IntoIterator<Item = NodeId>,
        E: IntoIterator<Item = (NodeId, NodeId)>,
    {
        let mut graph = DiGraphMap::new();
        let mut ordered_nodes = Vec::new();
        for node in nodes {
            if !graph.contains_node(node) {
                graph.add_node(node);
                ordered_nodes.push(node);
            }
        }

        let mut ordered_edges = Vec::new();
        for (from, to) in edges {
            for endpoint in [from, to] {
                if !graph.contains_node(endpoint) {
                    return Err(LayoutError::DanglingEdge {
                        from,
                        to,
                        missing: endpoint,
                    });
                }
            }
            if graph.add_edge(from, to, ()).is_none() {
                ordered_edges.push((from, to));
            }
        }

        Ok(Self {
            nodes: ordered_nodes,
            edges: ordered_edges,
            origin,
            graph,
        })
    }

    /// Nodes in insertion order
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Directed edges in insertion order
    pub fn edges(&self) -> &[(NodeId, NodeId)] {
        &self.edges
    }

    pub fn origin(&self) -> NodeId {
        self.origin
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.graph.contains_node(node)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Outgoing neighbors of `node`, ascending and without duplicates
    pub fn successors(&self, node: NodeId) -> Vec<NodeId> {
        self.sorted_neighbors(node, &[Direction::Outgoing])
    }

    /// Neighbors of `node` along edges in either direction, ascending
    pub fn neighbors_undirected(&self, node: NodeId) -> Vec<NodeId> {
        self.sorted_neighbors(node, &[Direction::Outgoing, Direction::Incoming])
    }

    fn sorted_neighbors(&self, node: NodeId, directions: &[Direction]) -> Vec<NodeId> {
        if !self.contains(node) {
            return Vec::new();
        }
        let set: BTreeSet<NodeId> = directions
            .iter()
            .flat_map(|&dir| self.graph.neighbors_directed(node, dir))
            .collect();
        set.into_iter().collect()
    }

    /// Undirected projection of the subgraph
    pub fn to_undirected(&self) -> UnGraphMap<NodeId, ()> {
        let mut graph = UnGraphMap::new();
        for &node in &self.nodes {
            graph.add_node(node);
        }
        for &(from, to) in &self.edges {
            graph.add_edge(from, to, ());
        }
        graph
    }

    /// Subgraph induced by the nodes for which `keep` returns true
    ///
    /// The origin is carried over even if it is filtered out.
    pub fn induced<F>(&self, keep: F) -> Self
    where
        F: Fn(NodeId) -> bool,
    {
        let mut graph = DiGraphMap::new();
        let nodes: Vec<NodeId> = self.nodes.iter().copied().filter(|&n| keep(n)).collect();
        for &node in &nodes {
            graph.add_node(node);
        }
        let edges: Vec<(NodeId, NodeId)> = self
            .edges
            .iter()
            .copied()
            .filter(|&(from, to)| graph.contains_node(from) && graph.contains_node(to))
            .collect();
        for &(from, to) in &edges {
            graph.add_edge(from, to, ());
        }

        Self {
            nodes,
            edges,
            origin: self.origin,
            graph,
        }
    }

    /// Cap the subgraph to a drawable size
    ///
    /// Keeps the first `max_nodes` nodes, then the first `max_edges` edges
    /// whose endpoints both survived.
    pub fn truncate(&self, max_nodes: usize, max_edges: usize) -> (Self, Truncation) {
        if self.node_count() <= max_nodes && self.edge_count() <= max_edges {
            return (self.clone(), Truncation::default());
        }

        let kept: BTreeSet<NodeId> = self.nodes.iter().copied().take(max_nodes).collect();
        let mut truncated = self.induced(|n| kept.contains(&n));
        if truncated.edges.len() > max_edges {
            for &(from, to) in &truncated.edges[max_edges..] {
                truncated.graph.remove_edge(from, to);
            }
            truncated.edges.truncate(max_edges);
        }

        let report = Truncation {
            dropped_nodes: self.node_count() - truncated.node_count(),
            dropped_edges: self.edge_count() - truncated.edge_count(),
        };
        debug!(
            "Truncated subgraph to {} nodes and {} edges ({report:?})",
            truncated.node_count(),
            truncated.edge_count()
        );
        (truncated, report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn sample() -> Subgraph {
        Subgraph::new([0, 1, 2, 3], [(0, 2), (0, 1), (3, 1), (0, 1)], 0).unwrap()
    }

    #[test]
    fn collapses_duplicates() {
        let graph = Subgraph::new([4, 2, 4, 7], [(4, 2), (4, 2), (2, 7)], 4).unwrap();
        assert_eq!(graph.nodes(), &[4, 2, 7]);
        assert_eq!(graph.edges(), &[(4, 2), (2, 7)]);
    }

    #[test]
    fn rejects_dangling_edges() {
        let err = Subgraph::new([0, 1], [(0, 1), (1, 5)], 0).unwrap_err();
        assert_eq!(
            err,
            LayoutError::DanglingEdge {
                from: 1,
                to: 5,
                missing: 5
            }
        );
    }

    #[test]
    fn origin_may_be_absent() {
        let graph = Subgraph::new([1, 2], [(1, 2)], 9).unwrap();
        assert_eq!(graph.origin(), 9);
        assert!(!graph.contains(9));
    }

    #[test]
    fn neighbors_are_sorted() {
        let graph = sample();
        assert_eq!(graph.successors(0), vec![1, 2]);
        assert_eq!(graph.successors(1), Vec::<NodeId>::new());
        assert_eq!(graph.neighbors_undirected(1), vec![0, 3]);
        assert_eq!(graph.neighbors_undirected(42), Vec::<NodeId>::new());
    }

    #[test]
    fn induced_keeps_inner_edges() {
        let graph = sample().induced(|n| n != 0);
        assert_eq!(graph.nodes(), &[1, 2, 3]);
        assert_eq!(graph.edges(), &[(3, 1)]);
        assert_eq!(graph.origin(), 0);
    }

    #[test]
    fn truncate_caps_nodes_then_edges() {
        let graph = Subgraph::new(
            0..6,
            [(0, 1), (0, 2), (1, 3), (2, 4), (4, 5), (3, 0)],
            0,
        )
        .unwrap();

        let (small, report) = graph.truncate(4, 2);
        assert_eq!(small.nodes(), &[0, 1, 2, 3]);
        assert_eq!(small.edges(), &[(0, 1), (0, 2)]);
        assert_eq!(small.successors(1), Vec::<NodeId>::new());
        assert_eq!(
            report,
            Truncation {
                dropped_nodes: 2,
                dropped_edges: 4
            }
        );

        let (same, report) = graph.truncate(600, 1200);
        assert!(report.is_empty());
        assert_eq!(same.node_count(), 6);
    }
}
