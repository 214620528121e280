use crate::{NodeId, Subgraph};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use tracing::debug;

/// Rooted BFS tree over the part of a subgraph reachable from its origin
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpanningTree {
    root: Option<NodeId>,
    children: HashMap<NodeId, Vec<NodeId>>,
    depths: BTreeMap<NodeId, usize>,
}

impl SpanningTree {
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Children of `node` in ascending id order
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.children.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn depth(&self, node: NodeId) -> Option<usize> {
        self.depths.get(&node).copied()
    }

    /// Depth of every reached node
    pub fn depths(&self) -> &BTreeMap<NodeId, usize> {
        &self.depths
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.depths.values().copied().max()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.depths.contains_key(&node)
    }

    pub fn is_empty(&self) -> bool {
        self.depths.is_empty()
    }

    pub fn len(&self) -> usize {
        self.depths.len()
    }

    /// True for nodes without children, including nodes outside the tree
    pub fn is_leaf(&self, node: NodeId) -> bool {
        self.children(node).is_empty()
    }

    /// Number of nodes at each depth, indexed by depth
    pub fn level_widths(&self) -> Vec<usize> {
        let mut widths = vec![0; self.max_depth().map_or(0, |d| d + 1)];
        for &depth in self.depths.values() {
            widths[depth] += 1;
        }
        widths
    }
}

/// Build the spanning tree of `subgraph` rooted at `origin`
///
/// A node expands along its outgoing edges, or along its edges in either
/// direction when it has no outgoing edge, so the tree can grow through
/// sinks. Neighbors are visited in ascending id order and the first
/// discovery of a node fixes its parent and depth.
///
/// An origin outside the subgraph yields an empty tree.
pub fn build_tree(subgraph: &Subgraph, origin: NodeId) -> SpanningTree {
    if !subgraph.contains(origin) {
        debug!("Origin {origin} is not part of the subgraph, no spanning tree");
        return SpanningTree::default();
    }

    let mut tree = SpanningTree {
        root: Some(origin),
        ..Default::default()
    };
    let mut visited = HashSet::from([origin]);
    let mut queue = VecDeque::from([origin]);
    tree.depths.insert(origin, 0);

    while let Some(node) = queue.pop_front() {
        let depth = tree.depths[&node];
        let mut neighbors = subgraph.successors(node);
        if neighbors.is_empty() {
            neighbors = subgraph.neighbors_undirected(node);
        }

        for next in neighbors {
            if !visited.insert(next) {
                continue;
            }
            tree.depths.insert(next, depth + 1);
            tree.children.entry(node).or_default().push(next);
            queue.push_back(next);
        }
    }

    debug!(
        "Spanning tree from {origin}: {} of {} nodes, max depth {:?}",
        tree.len(),
        subgraph.node_count(),
        tree.max_depth()
    );

    tree
}
