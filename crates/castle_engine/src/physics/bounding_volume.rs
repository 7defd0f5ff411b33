//! Axis-aligned bounding volumes
//!
//! A volume is an origin plus non-negative extents. Axis names follow the
//! world convention: x is depth, y is lateral, z is height (screen-down
//! positive), so the origin is the back-left-bottom corner.

use serde::{Deserialize, Serialize};

use crate::foundation::math::Vec3;

/// Axis-aligned 3D box
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingVolume {
    /// Back-left-bottom corner
    pub position: Vec3,
    /// Extents as (depth, width, height)
    pub size: Vec3,
}

impl BoundingVolume {
    /// Create a volume from its corner and size
    pub fn new(position: Vec3, size: Vec3) -> Self {
        Self { position, size }
    }

    /// Create a volume from six scalars `(x, y, z, depth, width, height)`
    pub fn from_components(x: f32, y: f32, z: f32, d: f32, w: f32, h: f32) -> Self {
        Self::new(Vec3::new(x, y, z), Vec3::new(d, w, h))
    }

    /// Translate in place
    pub fn move_by(&mut self, dx: f32, dy: f32, dz: f32) {
        self.position += Vec3::new(dx, dy, dz);
    }

    /// Translate by a vector in place
    pub fn translate(&mut self, delta: &Vec3) {
        self.position += delta;
    }

    /// Scale position and size per axis
    pub fn scale(&mut self, sx: f32, sy: f32, sz: f32) {
        let factors = Vec3::new(sx, sy, sz);
        self.position.component_mul_assign(&factors);
        self.size.component_mul_assign(&factors);
    }

    /// Grow by the given amounts, keeping the volume centered
    pub fn inflate(&mut self, dx: f32, dy: f32, dz: f32) {
        let grow = Vec3::new(dx, dy, dz);
        self.position -= grow / 2.0;
        self.size += grow;
    }

    /// Copy with negative extents flipped so every size component is positive
    pub fn normalized(&self) -> Self {
        let mut out = *self;
        for axis in 0..3 {
            if out.size[axis] < 0.0 {
                out.position[axis] += out.size[axis];
                out.size[axis] = -out.size[axis];
            }
        }
        out
    }

    /// Half-open overlap on all three axes.
    ///
    /// On each axis one box's minimum must lie within the other's `[min, max)`.
    pub fn intersects(&self, other: &BoundingVolume) -> bool {
        (0..3).all(|axis| {
            let (a_min, a_max) = (self.position[axis], self.position[axis] + self.size[axis]);
            let (b_min, b_max) = (other.position[axis], other.position[axis] + other.size[axis]);
            (a_min >= b_min && a_min < b_max) || (b_min >= a_min && b_min < a_max)
        })
    }

    /// True when `point` lies inside the half-open box
    pub fn contains_point(&self, point: &Vec3) -> bool {
        (0..3).all(|axis| {
            let min = self.position[axis];
            point[axis] >= min && point[axis] < min + self.size[axis]
        })
    }

    /// Index of the first volume in `others` intersecting this one
    pub fn collide_list(&self, others: &[BoundingVolume]) -> Option<usize> {
        others.iter().position(|other| self.intersects(other))
    }

    /// Indices of every volume in `others` intersecting this one
    pub fn collide_list_all(&self, others: &[BoundingVolume]) -> Vec<usize> {
        others
            .iter()
            .enumerate()
            .filter(|(_, other)| self.intersects(other))
            .map(|(index, _)| index)
            .collect()
    }

    /// Minimum depth coordinate
    pub fn back(&self) -> f32 {
        self.position.x
    }

    /// Minimum lateral coordinate
    pub fn left(&self) -> f32 {
        self.position.y
    }

    /// Minimum vertical coordinate
    pub fn bottom(&self) -> f32 {
        self.position.z
    }

    /// Maximum depth coordinate
    pub fn front(&self) -> f32 {
        self.position.x + self.size.x
    }

    /// Maximum lateral coordinate
    pub fn right(&self) -> f32 {
        self.position.y + self.size.y
    }

    /// Maximum vertical coordinate
    pub fn top(&self) -> f32 {
        self.position.z + self.size.z
    }

    /// Center of the volume
    pub fn center(&self) -> Vec3 {
        self.position + self.size / 2.0
    }

    /// Center of the minimum-z face
    pub fn bottom_center(&self) -> Vec3 {
        Vec3::new(self.position.x + self.size.x / 2.0, self.position.y + self.size.y / 2.0, self.position.z)
    }

    /// Center of the maximum-z face
    pub fn top_center(&self) -> Vec3 {
        Vec3::new(self.position.x + self.size.x / 2.0, self.position.y + self.size.y / 2.0, self.top())
    }

    /// Depth extent
    pub fn depth(&self) -> f32 {
        self.size.x
    }

    /// Lateral extent
    pub fn width(&self) -> f32 {
        self.size.y
    }

    /// Vertical extent
    pub fn height(&self) -> f32 {
        self.size.z
    }
}
