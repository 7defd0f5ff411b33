//! Abstract spatial query interface for broad-phase collision detection
//!
//! The simulation only asks one question of its static geometry: which items
//! overlap this rectangle? Implementations may cull however they like as long
//! as the answer equals a linear scan.

use super::rect::Rect;

/// Broad-phase index over a fixed set of rectangles
pub trait SpatialIndex: Send + Sync {
    /// Indices of items overlapping `rect`, ascending and unique
    fn query(&self, rect: &Rect) -> Vec<usize>;

    /// Number of indexed items
    fn item_count(&self) -> usize;

    /// Bounds of all items, `None` when empty
    fn bounds(&self) -> Option<Rect>;
}

/// Unpartitioned index that tests every item
#[derive(Debug, Clone, Default)]
pub struct LinearIndex {
    rects: Vec<Rect>,
}

impl LinearIndex {
    /// Create an index over `rects`
    pub fn new(rects: Vec<Rect>) -> Self {
        Self { rects }
    }
}

impl SpatialIndex for LinearIndex {
    fn query(&self, rect: &Rect) -> Vec<usize> {
        self.rects
            .iter()
            .enumerate()
            .filter(|(_, item)| item.overlaps(rect))
            .map(|(index, _)| index)
            .collect()
    }

    fn item_count(&self) -> usize {
        self.rects.len()
    }

    fn bounds(&self) -> Option<Rect> {
        Rect::union_all(&self.rects)
    }
}
