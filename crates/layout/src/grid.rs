use crate::{GridConfig, NodeId, Point, PositionMap, TreeSpacing};
use std::collections::BTreeMap;
use tracing::debug;

/// Number of grid columns for `node_count` nodes
pub fn grid_columns(node_count: usize, config: &GridConfig) -> usize {
    let columns = (node_count as f64).sqrt().round() as usize;
    columns.max(config.min_columns).max(1)
}

/// Pack nodes into rows below the deepest known level
///
/// Nodes are sorted by id, the first row sits one level below the deepest
/// entry of `depths` (or at zero without depth information), and each row
/// is centered on `center_x`.
pub fn grid_layout<I>(
    nodes: I,
    depths: &BTreeMap<NodeId, usize>,
    spacing: &TreeSpacing,
    config: &GridConfig,
    center_x: f64,
) -> PositionMap
where
    I: IntoIterator<Item = NodeId>,
{
    let mut nodes: Vec<NodeId> = nodes.into_iter().collect();
    nodes.sort_unstable();
    nodes.dedup();

    let mut positions = PositionMap::new();
    if nodes.is_empty() {
        return positions;
    }

    let columns = grid_columns(nodes.len(), config);
    let start_y = depths
        .values()
        .copied()
        .max()
        .map_or(0.0, |d| (d + 1) as f64 * spacing.level_y);

    for (row, chunk) in nodes.chunks(columns).enumerate() {
        let y = start_y + row as f64 * config.spacing_y;
        let offset = (chunk.len() as f64 - 1.0) / 2.0;
        for (column, &node) in chunk.iter().enumerate() {
            let x = center_x + (column as f64 - offset) * config.spacing_x;
            positions.insert(node, Point::new(x, y));
        }
    }

    debug!(
        "Grid placed {} nodes in {columns} columns from y = {start_y}",
        positions.len()
    );

    positions
}
