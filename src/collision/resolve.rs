//! Terrain-following resolution of a proposed move.
//!
//! Steps, in order:
//! 1. find ground under the candidate (islands first, then deck meshes),
//! 2. snap onto it when at, below or just above the standing height,
//! 3. fall back to the ground under the current position as a lower bound,
//! 4. never go below the ocean safety floor, preferring nearby ground,
//! 5. reject horizontal movement into solid structures.
//!
//! Nothing here fails: every branch degrades to the best ground available.

use std::f32::consts::TAU;

use bevy::math::bounding::Aabb3d;
use bevy::math::{Vec2, Vec3};

use super::bounds::{avatar_box, enters_obstacle};
use super::{CollisionConfig, CollisionWorld};

/// One frame's movement proposal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollisionRequest {
    pub current: Vec3,
    pub candidate: Vec3,
    /// Positive when moving up.
    pub vertical_velocity: f32,
}

/// Corrected position plus what happened on the way.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Resolution {
    pub position: Vec3,
    pub grounded: bool,
    /// Horizontal movement was rejected by an obstacle.
    pub collided: bool,
}

/// Radii and sample count of the nearby-ground search below the safety floor.
const RESCUE_RINGS: [f32; 3] = [1.5, 3.0, 6.0];
const RESCUE_SAMPLES: u32 = 8;

pub fn resolve(world: &CollisionWorld, config: &CollisionConfig, request: &CollisionRequest) -> Resolution {
    let CollisionRequest {
        current,
        candidate,
        vertical_velocity,
    } = *request;
    let probe_ceiling = current.y + config.probe_headroom;
    let mut position = candidate;
    let mut grounded = false;

    if let Some(ground) = world.ground_at(candidate.x, candidate.z, probe_ceiling) {
        let min_y = ground + config.ground_offset;
        let settling = vertical_velocity <= 0.0 && position.y - min_y <= config.snap_tolerance;
        if settling || position.y < min_y {
            position.y = min_y;
            grounded = true;
        }
    } else if let Some(ground) = world.ground_at(current.x, current.z, probe_ceiling) {
        let floor = ground + config.ground_offset;
        if position.y < floor {
            position.y = floor;
            grounded = true;
        }
    }

    let current_box = avatar_box(current, config.avatar_radius, config.avatar_half_height);
    let safety_floor = config.safety_floor();
    if position.y < safety_floor {
        match nearby_ground(world, config, &current_box, candidate, probe_ceiling) {
            Some((at, ground)) => {
                position = Vec3::new(at.x, (ground + config.ground_offset).max(safety_floor), at.y);
            }
            None => position.y = safety_floor,
        }
        grounded = true;
    }

    // Blocking is judged where the move was aimed, not where a rescue put it.
    let aimed = Vec3::new(candidate.x, position.y, candidate.z);
    let candidate_box = avatar_box(aimed, config.avatar_radius, config.avatar_half_height);
    let collided = enters_obstacle(&current_box, &candidate_box, world.registry.obstacles());
    if collided {
        position.x = current.x;
        position.z = current.z;
        if let Some(ground) = world.ground_at(current.x, current.z, probe_ceiling) {
            position.y = position.y.max(ground + config.ground_offset);
        }
    }

    Resolution {
        position,
        grounded,
        collided,
    }
}

/// First ground sample on the innermost ring around `around` that has any, as
/// `(xz, height)`. Samples that would put the avatar into an obstacle are skipped.
fn nearby_ground(
    world: &CollisionWorld,
    config: &CollisionConfig,
    current_box: &Aabb3d,
    around: Vec3,
    ceiling: f32,
) -> Option<(Vec2, f32)> {
    let obstacles = world.registry.obstacles();
    RESCUE_RINGS.iter().find_map(|&radius| {
        (0..RESCUE_SAMPLES).find_map(|i| {
            let angle = i as f32 / RESCUE_SAMPLES as f32 * TAU;
            let at = Vec2::new(around.x + radius * angle.cos(), around.z + radius * angle.sin());
            let ground = world.ground_at(at.x, at.y, ceiling)?;
            let standing = Vec3::new(at.x, (ground + config.ground_offset).max(config.safety_floor()), at.y);
            let landing = avatar_box(standing, config.avatar_radius, config.avatar_half_height);
            (!enters_obstacle(current_box, &landing, obstacles)).then_some((at, ground))
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::CollisionRegistry;
    use crate::world::layout::{default_roster, Archipelago};
    use crate::world::WorldConfig;
    use bevy::math::bounding::IntersectsVolume;

    fn world() -> (Archipelago, CollisionRegistry) {
        let archipelago = Archipelago::generate(&WorldConfig::default(), default_roster()).unwrap();
        let registry = CollisionRegistry::from_archipelago(&archipelago);
        (archipelago, registry)
    }

    fn request(current: Vec3, candidate: Vec3, vy: f32) -> CollisionRequest {
        CollisionRequest {
            current,
            candidate,
            vertical_velocity: vy,
        }
    }

    #[test]
    fn lands_on_hub_plaza() {
        let (archipelago, registry) = world();
        let world = CollisionWorld::new(&archipelago, &registry);
        let config = CollisionConfig::default();
        let ground = archipelago.hub.height_at_local(Vec2::new(1.0, 0.0));
        let r = resolve(&world, &config, &request(Vec3::new(0.0, 10.0, 0.0), Vec3::new(1.0, 0.0, 0.0), -5.0));
        assert!(r.grounded);
        assert_eq!(r.position.y, ground + config.ground_offset);
    }

    #[test]
    fn rising_jump_is_not_snapped() {
        let (archipelago, registry) = world();
        let world = CollisionWorld::new(&archipelago, &registry);
        let config = CollisionConfig::default();
        let ground = archipelago.hub.height_at_local(Vec2::ZERO) + config.ground_offset;
        let start = Vec3::new(0.0, ground, 0.0);
        let r = resolve(&world, &config, &request(start, start + Vec3::Y * 0.05, 12.0));
        assert!(!r.grounded);
        assert!(r.position.y > ground);
    }

    #[test]
    fn open_water_falls_to_safety_floor() {
        let (archipelago, registry) = world();
        let world = CollisionWorld::new(&archipelago, &registry);
        let config = CollisionConfig::default();
        // Between two ring islands, well clear of any bridge.
        let angle = TAU / 12.0;
        let p = Vec3::new(angle.cos() * 120.0, -40.0, angle.sin() * 120.0);
        let r = resolve(&world, &config, &request(p.with_y(2.5), p, -30.0));
        assert_eq!(r.position.y, config.safety_floor());
        assert!(!r.collided);
    }

    #[test]
    fn bridge_deck_supports_walker() {
        let (archipelago, registry) = world();
        let world = CollisionWorld::new(&archipelago, &registry);
        let config = CollisionConfig::default();
        let span = archipelago.bridges().next().unwrap().clone();
        let mid = span.point_at(0.5);
        let r = resolve(&world, &config, &request(mid + Vec3::Y * 1.2, mid + Vec3::Y * 0.9, -1.0));
        assert!(r.grounded);
        assert!((r.position.y - (mid.y + config.ground_offset)).abs() < 1e-3);
    }

    #[test]
    fn solid_structure_blocks_horizontal_move() {
        let (archipelago, mut registry) = world();
        let config = CollisionConfig::default();
        let ground = archipelago.hub.height_at_local(Vec2::ZERO);
        registry.register_obstacle(Aabb3d::new(Vec3::new(2.0, ground + 1.0, 0.0), Vec3::new(0.5, 1.0, 2.0)));
        let world = CollisionWorld::new(&archipelago, &registry);
        let current = Vec3::new(0.5, ground + config.ground_offset, 0.0);
        let r = resolve(&world, &config, &request(current, current + Vec3::X * 0.8, 0.0));
        assert!(r.collided);
        assert_eq!(r.position.x, current.x);
        assert_eq!(r.position.z, current.z);
    }

    #[test]
    fn rescue_skips_ground_inside_structures() {
        let (archipelago, mut registry) = world();
        let config = CollisionConfig::default();
        let current = Vec3::new(33.0, 2.0, 0.0);
        let candidate = Vec3::new(33.0, -5.0, 0.0);
        let current_box = avatar_box(current, config.avatar_radius, config.avatar_half_height);
        let (first, ground) = {
            let world = CollisionWorld::new(&archipelago, &registry);
            nearby_ground(&world, &config, &current_box, candidate, current.y + config.probe_headroom).unwrap()
        };
        let post = Aabb3d::new(
            Vec3::new(first.x, (ground + config.ground_offset).max(config.safety_floor()), first.y),
            Vec3::splat(0.3),
        );
        registry.register_obstacle(post);
        let world = CollisionWorld::new(&archipelago, &registry);
        let r = resolve(&world, &config, &request(current, candidate, -20.0));
        assert!(!r.collided);
        assert!(r.position.y >= config.safety_floor());
        let landed = avatar_box(r.position, config.avatar_radius, config.avatar_half_height);
        assert!(!landed.intersects(&post));
    }
}
