use crate::NodeId;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or querying a graph
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input held no valid node pair
    #[error("dataset contains no valid edge")]
    Empty,

    /// Ids are dense, so ids above the limit are refused before allocating
    #[error("node id {id} on line {line} exceeds the limit of {limit}")]
    NodeIdTooLarge { id: NodeId, line: usize, limit: NodeId },

    #[error("origin {origin} is outside the graph of {node_count} nodes")]
    OriginOutOfRange { origin: NodeId, node_count: usize },
}
