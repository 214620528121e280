//! Storage and bounded traversal of large sparse graphs
//!
//! Datasets are plain edge lists, one `from to` pair of non-negative
//! integers per line, with `#` comment lines. They are loaded into a
//! compressed sparse row [`CsrGraph`] which answers depth-bounded
//! breadth-first and depth-first traversals.
//!
//! ```
//! use netscope_store::{CsrGraph, TraversalMode};
//!
//! let graph = CsrGraph::from_reader("# toy\n0 1\n1 2\n2 0\n".as_bytes()).unwrap();
//! let traversal = graph.traverse(0, 1, TraversalMode::BreadthFirst).unwrap();
//! assert_eq!(traversal.nodes, vec![0, 1]);
//! ```

mod csr;
mod error;
mod traverse;

/// Dense node identifier
pub type NodeId = u32;

pub use csr::{CsrGraph, LoadReport, DEFAULT_MAX_NODE_ID};
pub use error::StoreError;
pub use traverse::{Traversal, TraversalMode};
