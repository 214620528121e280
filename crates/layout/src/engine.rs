use crate::{LayoutError, PositionMap, Subgraph};

/// A layout engine that can compute positions for subgraph nodes
///
/// Engines are pure functions of their input: running one twice on the
/// same subgraph gives the same positions, and nothing is kept between
/// calls, so one engine can serve requests from any thread.
pub trait LayoutEngine {
    /// Compute a position for every node of `subgraph`
    ///
    /// # Errors
    /// Returns an error if the engine could not place every node.
    fn layout(&self, subgraph: &Subgraph) -> Result<PositionMap, LayoutError>;
}
