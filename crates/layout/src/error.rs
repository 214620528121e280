use crate::NodeId;
use thiserror::Error;

/// Errors that can occur while building a subgraph or laying it out
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// An edge references a node that is not part of the subgraph
    #[error("edge ({from}, {to}) references node {missing} outside the subgraph")]
    DanglingEdge {
        from: NodeId,
        to: NodeId,
        missing: NodeId,
    },

    /// The fallback chain finished without placing every node
    #[error("layout placed {placed} of {expected} nodes")]
    Incomplete { expected: usize, placed: usize },
}

/// Failures of an optional force-directed accelerator
///
/// These never escape the pipeline, they only mean "no result".
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AccelerationError {
    #[error("accelerator is not available")]
    Unavailable,

    #[error("graph has no nodes to lay out")]
    EmptyGraph,

    #[error("simulation diverged at node {0}")]
    Diverged(NodeId),
}
