//! Spatial partitioning data structures
//!
//! Provides the broad phase for body-vs-static-geometry tests on the 2D
//! collision plane.

mod quadtree;
mod rect;
mod spatial_query;

pub use quadtree::{Quadtree, QuadtreeConfig, QuadtreeNode};
pub use rect::Rect;
pub use spatial_query::{LinearIndex, SpatialIndex};
