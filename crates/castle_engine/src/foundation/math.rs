//! Math utilities and types
//!
//! Provides the vector types shared by the physics and action layers.

pub use nalgebra::{Vector2, Vector3};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// World axes used by the box simulation.
///
/// `X` points toward the viewer, `Y` runs left/right and `Z` is height
/// (screen-down positive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Depth axis
    X,
    /// Lateral axis
    Y,
    /// Vertical axis
    Z,
}

impl Axis {
    /// All axes in resolution order
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Component index into a [`Vec3`]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// Unit-length delta along this axis scaled by `amount`
    pub fn delta(self, amount: f32) -> Vec3 {
        let mut delta = Vec3::zeros();
        delta[self.index()] = amount;
        delta
    }
}

/// Math utility functions
pub mod utils {
    /// Round to a fixed number of decimal places
    pub fn round_to(value: f32, places: u32) -> f32 {
        let factor = 10f32.powi(places as i32);
        (value * factor).round() / factor
    }

    /// Linear interpolation
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a + (b - a) * t
    }
}
