//! 3D to 2D projection strategies
//!
//! Static collision runs on an integer 2D grid. The projection decides which
//! two world axes form that grid.

use serde::{Deserialize, Serialize};

use super::body::Body;
use super::bounding_volume::BoundingVolume;
use crate::spatial::Rect;

/// Which plane static geometry is tested in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Projection {
    /// Side view: lateral (y) and vertical (z) axes
    #[default]
    Platformer,
    /// Top-down view: depth (x) and lateral (y) axes
    Adventure,
}

impl Projection {
    /// Rasterize a volume onto the query grid.
    ///
    /// The rect covers every whole unit the volume touches, so a volume
    /// flush against geometry on a unit boundary does not hit it while any
    /// fractional overlap does.
    pub fn to_query_rect(self, volume: &BoundingVolume) -> Rect {
        let (p, s) = (&volume.position, &volume.size);
        match self {
            Self::Platformer => covering_rect(p.y, p.z, s.y, s.z),
            Self::Adventure => covering_rect(p.x, p.y, s.x, s.y),
        }
    }

    /// Lift a level rectangle into a static volume
    pub fn volume_from_rect(self, rect: &Rect) -> BoundingVolume {
        let (x, y, w, h) = (rect.x as f32, rect.y as f32, rect.w as f32, rect.h as f32);
        match self {
            Self::Platformer => BoundingVolume::from_components(0.0, x, y, 1.0, w, h),
            Self::Adventure => BoundingVolume::from_components(x, y, 0.0, w, h, 0.0),
        }
    }

    /// Lift a level rectangle into a gravity-free body at rest
    pub fn body_from_rect(self, rect: &Rect) -> Body {
        Body::fixed(self.volume_from_rect(rect))
    }
}

fn covering_rect(u: f32, v: f32, width: f32, height: f32) -> Rect {
    let (left, top) = (u.floor(), v.floor());
    let (right, bottom) = ((u + width).ceil(), (v + height).ceil());
    Rect::new(left as i32, top as i32, (right - left) as i32, (bottom - top) as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platformer_uses_lateral_and_vertical() {
        let volume = BoundingVolume::from_components(9.0, 10.7, -3.9, 4.0, 16.2, 32.0);
        assert_eq!(Projection::Platformer.to_query_rect(&volume), Rect::new(10, -4, 17, 33));
    }

    #[test]
    fn test_adventure_uses_depth_and_lateral() {
        let volume = BoundingVolume::from_components(9.0, 10.7, -3.9, 4.0, 16.2, 32.0);
        assert_eq!(Projection::Adventure.to_query_rect(&volume), Rect::new(9, 10, 4, 17));
    }

    #[test]
    fn test_whole_unit_volume_is_exact() {
        let standing = BoundingVolume::from_components(0.0, -8.0, 0.0, 16.0, 16.0, 32.0);
        assert_eq!(Projection::Platformer.to_query_rect(&standing), Rect::new(-8, 0, 16, 32));

        let sunk = BoundingVolume::from_components(0.0, -8.0, 0.01, 16.0, 16.0, 32.0);
        assert_eq!(Projection::Platformer.to_query_rect(&sunk).bottom(), 33);
    }

    #[test]
    fn test_body_from_rect_round_trips_through_query_rect() {
        let rect = Rect::new(32, 64, 128, 16);
        for projection in [Projection::Platformer, Projection::Adventure] {
            let body = projection.body_from_rect(&rect);
            assert!(!body.gravity);
            assert_eq!(projection.to_query_rect(&body.volume), rect);
        }
    }
}
