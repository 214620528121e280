//! Layout of bounded subgraphs
//!
//! This crate computes 2D coordinates for every node of a subgraph extracted
//! from a larger graph. Nodes reachable from the origin are laid out as a
//! tidy tree, and an ordered chain of fallbacks fills whatever is left so
//! that no node ends up without a position.
//!
//! # Strategies
//!
//! - [`Strategy::Tree`]: BFS spanning tree ([`build_tree`]) placed with
//!   subtree-size weighted spacing ([`position_tree`])
//! - [`Strategy::Force`]: force-directed placement of the remaining nodes,
//!   through an optional [`ForceAccelerator`] such as [`ForceAtlas2`] or the
//!   seeded [`spring_layout`]
//! - [`Strategy::Radial`]: concentric rings by hop distance ([`radial_layout`])
//! - [`Strategy::Grid`]: rows below the deepest tree level ([`grid_layout`])
//!
//! # Example
//!
//! ```
//! use netscope_layout::{LayoutConfig, LayoutEngine, LayoutPipeline, Subgraph};
//!
//! // A small tree rooted at 0, plus a node nothing points to
//! let subgraph = Subgraph::new(
//!     [0, 1, 2, 3, 42],
//!     [(0, 1), (0, 2), (1, 3)],
//!     0,
//! )
//! .unwrap();
//!
//! let pipeline = LayoutPipeline::new(LayoutConfig::default());
//!
//! // Use the LayoutEngine trait for positions only:
//! let positions = pipeline.layout(&subgraph).unwrap();
//! assert_eq!(positions.len(), 5);
//!
//! // Or run the chain directly to see which strategy placed what
//! let outcome = pipeline.run(&subgraph).unwrap();
//! assert!(outcome.positions[&42].y > outcome.positions[&3].y);
//! ```

mod config;
mod engine;
mod error;
mod forceatlas;
mod geometry;
mod grid;
mod pipeline;
mod radial;
mod subgraph;
mod tidy;
mod tree;

pub mod force;

// Re-export core types and traits
pub use config::{
    ForceConfig, GridConfig, LayoutConfig, RadialConfig, SpringConfig, Strategy, TreeSpacing,
};
pub use engine::LayoutEngine;
pub use error::{AccelerationError, LayoutError};
pub use geometry::{Bounds, Point, PositionMap};
pub use subgraph::{NodeId, Subgraph, Truncation};

// Re-export the individual strategies
pub use force::{spring_layout, ForceAccelerator};
pub use forceatlas::ForceAtlas2;
pub use grid::{grid_columns, grid_layout};
pub use pipeline::{LayoutOutcome, LayoutPipeline, StepReport};
pub use radial::{place_rings_below, radial_layout, radial_levels};
pub use tidy::{position_tree, subtree_sizes, SubtreeSizes};
pub use tree::{build_tree, SpanningTree};
