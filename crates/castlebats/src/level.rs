//! Built-in level
//!
//! Geometry is given as 2D rectangles in the platformer projection: `x` is the
//! lateral position, `y` the vertical one with down positive.

use castle_engine::foundation::math::Vec3;
use castle_engine::physics::{BoundingVolume, Projection};
use castle_engine::spatial::Rect;

use crate::error::GameError;

/// Static geometry plus spawn points
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    /// Level name, used in logs and errors
    pub name: String,
    /// Solid rectangles
    pub geometry: Vec<Rect>,
    /// Hero's back-left-bottom corner
    pub hero_spawn: Vec3,
    /// One entry per bat
    pub bat_spawns: Vec<Vec3>,
}

impl Level {
    /// Castle hall: a floor between two walls with one ledge.
    ///
    /// The floor's top row is 32 so a 32 tall actor spawned at z = 0 stands
    /// on the ground plane.
    pub fn castle() -> Self {
        Self {
            name: "castle".to_string(),
            geometry: vec![
                Rect::new(-400, 32, 800, 16),
                Rect::new(-416, -300, 16, 348),
                Rect::new(400, -300, 16, 348),
                Rect::new(120, -40, 96, 8),
            ],
            hero_spawn: Vec3::zeros(),
            bat_spawns: vec![Vec3::new(0.0, -200.0, 0.0), Vec3::new(0.0, 240.0, 0.0), Vec3::new(0.0, 320.0, 0.0)],
        }
    }

    /// Rectangle covering all geometry
    pub fn bounds(&self) -> Option<Rect> {
        Rect::union_all(&self.geometry)
    }

    /// Check that there is geometry and no spawn of `size` starts inside it
    pub fn validate(&self, size: Vec3) -> Result<(), GameError> {
        if self.geometry.is_empty() {
            return Err(self.error("no geometry"));
        }

        let spawns = std::iter::once(&self.hero_spawn).chain(&self.bat_spawns);
        for spawn in spawns {
            let rect = Projection::Platformer.to_query_rect(&BoundingVolume::new(*spawn, size));
            if self.geometry.iter().any(|solid| solid.overlaps(&rect)) {
                return Err(self.error(&format!("spawn at {spawn:?} starts inside geometry")));
            }
        }
        Ok(())
    }

    fn error(&self, reason: &str) -> GameError {
        GameError::Level {
            name: self.name.clone(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor_size() -> Vec3 {
        Vec3::new(16.0, 16.0, 32.0)
    }

    #[test]
    fn test_castle_is_valid() {
        let level = Level::castle();
        assert!(level.validate(actor_size()).is_ok());
        assert_eq!(level.bounds(), Some(Rect::new(-416, -300, 832, 348)));
    }

    #[test]
    fn test_spawn_inside_wall_rejected() {
        let mut level = Level::castle();
        level.bat_spawns.push(Vec3::new(0.0, 405.0, 0.0));
        let err = level.validate(actor_size()).unwrap_err();
        assert!(err.to_string().contains("starts inside geometry"));
    }

    #[test]
    fn test_spawn_sunk_into_floor_rejected() {
        let mut level = Level::castle();
        level.hero_spawn = Vec3::new(0.0, 0.0, 0.5);
        assert!(level.validate(actor_size()).is_err());
    }

    #[test]
    fn test_empty_level_rejected() {
        let mut level = Level::castle();
        level.geometry.clear();
        assert!(matches!(level.validate(actor_size()), Err(GameError::Level { .. })));
    }
}
