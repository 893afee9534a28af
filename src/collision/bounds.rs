//! Axis-aligned boxes for the avatar and solid island structures.

use bevy::math::bounding::{Aabb3d, IntersectsVolume};
use bevy::math::Vec3;

/// Box around an avatar standing with its center at `center`.
pub fn avatar_box(center: Vec3, radius: f32, half_height: f32) -> Aabb3d {
    Aabb3d::new(center, Vec3::new(radius, half_height, radius))
}

/// True when moving from `current` to `candidate` enters an obstacle.
///
/// Obstacles the current box already overlaps are ignored, so an avatar that
/// ends up inside a box can still walk out of it.
pub fn enters_obstacle(current: &Aabb3d, candidate: &Aabb3d, obstacles: &[Aabb3d]) -> bool {
    obstacles
        .iter()
        .any(|o| candidate.intersects(o) && !current.intersects(o))
}
