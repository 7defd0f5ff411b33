//! Quadtree spatial partitioning structure
//!
//! Divides the 2D collision plane into hierarchical regions for fast
//! rectangle queries. The tree is built once from a fixed item set and never
//! modified; each node splits around the center of its items' bounds.

use serde::{Deserialize, Serialize};

use super::rect::Rect;
use super::spatial_query::SpatialIndex;

/// Configuration for quadtree behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuadtreeConfig {
    /// Maximum items per node before subdivision
    pub max_items_per_node: usize,

    /// Maximum subdivision depth
    pub max_depth: u32,

    /// Minimum node size (prevents excessive subdivision)
    pub min_node_size: i32,
}

impl Default for QuadtreeConfig {
    fn default() -> Self {
        Self {
            max_items_per_node: 4,
            max_depth: 6,
            min_node_size: 8,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Quadrants {
    nw: bool,
    ne: bool,
    sw: bool,
    se: bool,
}

impl Quadrants {
    fn of(rect: &Rect, (cx, cy): (i32, i32)) -> Self {
        let west = rect.x < cx;
        let east = rect.right() > cx;
        let north = rect.y < cy;
        let south = rect.bottom() > cy;
        Self {
            nw: west && north,
            ne: east && north,
            sw: west && south,
            se: east && south,
        }
    }

    fn all(self) -> bool {
        self.nw && self.ne && self.sw && self.se
    }

    fn as_array(self) -> [bool; 4] {
        [self.nw, self.ne, self.sw, self.se]
    }
}

/// Single node in the quadtree hierarchy
#[derive(Debug, Clone)]
pub struct QuadtreeNode {
    /// Items stored at this node: those spanning every quadrant, or all of
    /// them when the node is a leaf
    items: Vec<(usize, Rect)>,

    /// Split point of this node
    center: (i32, i32),

    /// Child nodes (nw, ne, sw, se), None if this is a leaf
    children: Option<Box<[QuadtreeNode; 4]>>,

    /// Depth in the tree (0 = root)
    depth: u32,
}

impl QuadtreeNode {
    fn build(items: Vec<(usize, Rect)>, depth: u32, config: &QuadtreeConfig) -> Self {
        let bounds = Rect::union_all(items.iter().map(|(_, rect)| rect)).unwrap_or_default();
        let center = bounds.center();

        let should_subdivide = items.len() > config.max_items_per_node
            && depth < config.max_depth
            && bounds.w.min(bounds.h) > config.min_node_size;

        if !should_subdivide {
            return Self {
                items,
                center,
                children: None,
                depth,
            };
        }

        let mut here = Vec::new();
        let mut split: [Vec<(usize, Rect)>; 4] = Default::default();
        for (index, rect) in items {
            let quadrants = Quadrants::of(&rect, center);
            if quadrants.all() {
                here.push((index, rect));
                continue;
            }
            for (bucket, touches) in split.iter_mut().zip(quadrants.as_array()) {
                if touches {
                    bucket.push((index, rect));
                }
            }
        }

        let [nw, ne, sw, se] = split;
        let children = Box::new([
            Self::build(nw, depth + 1, config),
            Self::build(ne, depth + 1, config),
            Self::build(sw, depth + 1, config),
            Self::build(se, depth + 1, config),
        ]);

        Self {
            items: here,
            center,
            children: Some(children),
            depth,
        }
    }

    /// Check if this node is a leaf (has no children)
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Depth in the tree (0 = root)
    pub fn depth(&self) -> u32 {
        self.depth
    }

    fn hit(&self, rect: &Rect, results: &mut Vec<usize>) {
        results.extend(
            self.items
                .iter()
                .filter(|(_, item)| item.overlaps(rect))
                .map(|(index, _)| *index),
        );

        if let Some(ref children) = self.children {
            let quadrants = Quadrants::of(rect, self.center).as_array();
            for (child, touches) in children.iter().zip(quadrants) {
                if touches {
                    child.hit(rect, results);
                }
            }
        }
    }

    fn max_depth(&self) -> u32 {
        self.children
            .as_ref()
            .map_or(self.depth, |children| children.iter().map(Self::max_depth).max().unwrap_or(self.depth))
    }
}

/// Build-once quadtree over a fixed set of rectangles
#[derive(Debug, Clone)]
pub struct Quadtree {
    /// Root node covering every item
    root: QuadtreeNode,

    /// Bounds of all items
    bounds: Option<Rect>,

    /// Number of items the tree was built from
    item_count: usize,
}

impl Quadtree {
    /// Build a quadtree; item indices are positions in `rects`
    pub fn new(rects: &[Rect], config: &QuadtreeConfig) -> Self {
        let items: Vec<(usize, Rect)> = rects.iter().copied().enumerate().collect();
        Self {
            root: QuadtreeNode::build(items, 0, config),
            bounds: Rect::union_all(rects),
            item_count: rects.len(),
        }
    }

    /// Root node
    pub fn root(&self) -> &QuadtreeNode {
        &self.root
    }

    /// Deepest level reached during subdivision
    pub fn depth(&self) -> u32 {
        self.root.max_depth()
    }

    /// Indices of every item overlapping `rect`, ascending and unique
    pub fn hit(&self, rect: &Rect) -> Vec<usize> {
        let mut results = Vec::new();
        self.root.hit(rect, &mut results);
        results.sort_unstable();
        results.dedup();
        results
    }
}

impl SpatialIndex for Quadtree {
    fn query(&self, rect: &Rect) -> Vec<usize> {
        self.hit(rect)
    }

    fn item_count(&self) -> usize {
        self.item_count
    }

    fn bounds(&self) -> Option<Rect> {
        self.bounds
    }
}
