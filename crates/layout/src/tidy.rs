//! Tidy tree placement of a [`SpanningTree`]
//!
//! Horizontal space is handed out proportionally to the number of
//! leaf-equivalent slots under each node. Both passes walk the tree with an
//! explicit stack so that very deep trees cannot exhaust the call stack.

use crate::{NodeId, Point, PositionMap, SpanningTree, TreeSpacing};
use std::collections::HashMap;
use tracing::debug;

/// Leaf-equivalent slot count of every node in a tree
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubtreeSizes(HashMap<NodeId, f64>);

impl SubtreeSizes {
    /// Size of `node`, 1.0 for nodes outside the tree
    pub fn get(&self, node: NodeId) -> f64 {
        self.0.get(&node).copied().unwrap_or(1.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

enum Visit {
    Enter(NodeId),
    Exit(NodeId),
}

/// Compute subtree sizes in post-order
///
/// A leaf weighs 1.0, an internal node the sum of its children, floored at
/// 1.0.
pub fn subtree_sizes(tree: &SpanningTree) -> SubtreeSizes {
    let mut sizes = HashMap::with_capacity(tree.len());
    let Some(root) = tree.root() else {
        return SubtreeSizes(sizes);
    };

    let mut stack = vec![Visit::Enter(root)];
    while let Some(visit) = stack.pop() {
        match visit {
            Visit::Enter(node) => {
                stack.push(Visit::Exit(node));
                stack.extend(tree.children(node).iter().map(|&c| Visit::Enter(c)));
            }
            Visit::Exit(node) => {
                let size = if tree.is_leaf(node) {
                    1.0
                } else {
                    tree.children(node)
                        .iter()
                        .map(|c| sizes[c])
                        .sum::<f64>()
                        .max(1.0)
                };
                sizes.insert(node, size);
            }
        }
    }

    SubtreeSizes(sizes)
}

/// Gap factor between siblings, mildly wider for large fan-outs
pub(crate) fn sibling_separation(child_count: usize) -> f64 {
    1.0 + (child_count.saturating_sub(1) as f64 * 0.05).min(0.5)
}

/// Horizontal unit for a tree whose widest level has `max_level_width` nodes
pub(crate) fn horizontal_spacing(spacing: &TreeSpacing, max_level_width: usize) -> f64 {
    let width = (max_level_width as f64).max(1.0);
    spacing.base_x + spacing.range_x / (1.0 + width.log10())
}

/// Assign raw horizontal positions in pre-order, in slot units
fn assign_horizontal(tree: &SpanningTree, root: NodeId, sizes: &SubtreeSizes) -> HashMap<NodeId, f64> {
    let mut xs = HashMap::with_capacity(sizes.len());
    let mut stack = vec![(Visit::Enter(root), 0.0)];

    while let Some((visit, cursor)) = stack.pop() {
        match visit {
            Visit::Enter(node) => {
                if tree.is_leaf(node) {
                    xs.insert(node, cursor + 0.5);
                    continue;
                }
                let children = tree.children(node);

                stack.push((Visit::Exit(node), cursor));
                let separation = sibling_separation(children.len());
                let mut child_cursor = cursor;
                let mut frames = Vec::with_capacity(children.len());
                for &child in children {
                    frames.push((Visit::Enter(child), child_cursor));
                    child_cursor += sizes.get(child) * separation;
                }
                // Reversed so the leftmost child pops first
                stack.extend(frames.into_iter().rev());
            }
            Visit::Exit(node) => {
                let children = tree.children(node);
                let (Some(first), Some(last)) = (children.first(), children.last()) else {
                    continue;
                };
                let x = (xs[first] + xs[last]) / 2.0;
                xs.insert(node, x);
            }
        }
    }

    xs
}

/// Place every node of the tree
///
/// Returns an empty map for an empty tree.
pub fn position_tree(tree: &SpanningTree, spacing: &TreeSpacing) -> PositionMap {
    let mut positions = PositionMap::new();
    let Some(root) = tree.root().filter(|&r| tree.contains(r)) else {
        return positions;
    };

    let sizes = subtree_sizes(tree);
    let xs = assign_horizontal(tree, root, &sizes);

    let max_level_width = tree.level_widths().into_iter().max().unwrap_or(1);
    let spacing_x = horizontal_spacing(spacing, max_level_width);
    let min_x = xs.values().copied().fold(f64::INFINITY, f64::min);

    for (&node, &x) in &xs {
        let depth = tree.depth(node).unwrap_or(0);
        positions.insert(
            node,
            Point::new((x - min_x) * spacing_x, depth as f64 * spacing.level_y),
        );
    }

    normalize_vertical_positions(&mut positions);

    debug!(
        "Tree placed {} nodes, widest level {max_level_width}, spacing {spacing_x:.3}",
        positions.len()
    );

    positions
}

/// Shift positions so that the smallest y is zero
fn normalize_vertical_positions(positions: &mut PositionMap) {
    let min_y = positions
        .values()
        .map(|pos| pos.y)
        .fold(f64::INFINITY, f64::min);
    if !min_y.is_finite() {
        return;
    }

    for pos in positions.values_mut() {
        pos.y -= min_y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{build_tree, Subgraph};
    use test_log::test;

    fn scenario() -> SpanningTree {
        let graph = Subgraph::new(0..5, [(0, 1), (0, 2), (1, 3), (1, 4)], 0).unwrap();
        build_tree(&graph, 0)
    }

    #[test]
    fn sizes_follow_leaf_count() {
        let tree = scenario();
        let sizes = subtree_sizes(&tree);

        assert_eq!(sizes.len(), 5);
        assert_eq!(sizes.get(3), 1.0);
        assert_eq!(sizes.get(4), 1.0);
        assert_eq!(sizes.get(1), 2.0);
        assert_eq!(sizes.get(2), 1.0);
        assert_eq!(sizes.get(0), 3.0);
    }

    #[test]
    fn size_law_holds_everywhere() {
        let graph = Subgraph::new(
            0..10,
            [(0, 1), (0, 2), (0, 3), (1, 4), (4, 5), (4, 6), (2, 7), (7, 8), (8, 9)],
            0,
        )
        .unwrap();
        let tree = build_tree(&graph, 0);
        let sizes = subtree_sizes(&tree);

        for node in 0..10 {
            let children = tree.children(node);
            let expected = if children.is_empty() {
                1.0
            } else {
                children.iter().map(|&c| sizes.get(c)).sum::<f64>().max(1.0)
            };
            assert_eq!(sizes.get(node), expected, "node {node}");
        }
    }

    #[test]
    fn separation_is_capped() {
        assert_eq!(sibling_separation(0), 1.0);
        assert_eq!(sibling_separation(1), 1.0);
        assert!((sibling_separation(3) - 1.1).abs() < 1e-12);
        assert_eq!(sibling_separation(11), 1.5);
        assert_eq!(sibling_separation(500), 1.5);
    }

    #[test]
    fn spacing_compresses_with_width() {
        let spacing = TreeSpacing::default();
        let narrow = horizontal_spacing(&spacing, 1);
        let medium = horizontal_spacing(&spacing, 10);
        let wide = horizontal_spacing(&spacing, 1000);

        assert_eq!(narrow, spacing.base_x + spacing.range_x);
        assert!(narrow > medium && medium > wide);
        assert!(wide > spacing.base_x);
    }

    #[test]
    fn scenario_layout() {
        let positions = position_tree(&scenario(), &TreeSpacing::default());
        assert_eq!(positions.len(), 5);

        let p = |n: NodeId| positions[&n];
        // Node 2's subtree sits to the right of node 1's
        for left in [1, 3, 4] {
            assert!(p(left).x < p(2).x);
        }
        assert!(p(3).x < p(4).x);
        // Parents centered over their first and last child
        assert!((p(1).x - (p(3).x + p(4).x) / 2.0).abs() < 1e-9);
        assert!((p(0).x - (p(1).x + p(2).x) / 2.0).abs() < 1e-9);
        // Levels go down with depth
        assert_eq!(p(0).y, 0.0);
        assert!(p(0).y < p(1).y && p(1).y < p(3).y);
        assert_eq!(p(1).y, p(2).y);
        assert_eq!(p(3).y, p(4).y);
        // Normalized to start at zero
        let min_x = positions.values().map(|p| p.x).fold(f64::INFINITY, f64::min);
        assert_eq!(min_x, 0.0);
    }

    #[test]
    fn deep_chain_does_not_overflow() {
        let n = 200_000u32;
        let graph = Subgraph::new(0..n, (0..n - 1).map(|i| (i, i + 1)), 0).unwrap();
        let tree = build_tree(&graph, 0);
        let positions = position_tree(&tree, &TreeSpacing::default());

        assert_eq!(positions.len(), n as usize);
        assert_eq!(positions[&(n - 1)].y, (n - 1) as f64 * 2.0);
    }

    #[test]
    fn empty_tree_gives_no_positions() {
        let positions = position_tree(&SpanningTree::default(), &TreeSpacing::default());
        assert!(positions.is_empty());
    }

    #[test]
    fn repeated_runs_are_identical() {
        let a = position_tree(&scenario(), &TreeSpacing::default());
        let b = position_tree(&scenario(), &TreeSpacing::default());
        assert_eq!(a, b);
    }
}
