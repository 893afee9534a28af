//! Property tests over the pure terrain, collision and prop-physics code.

use std::sync::OnceLock;

use bevy::math::bounding::Aabb3d;
use bevy::math::{Vec2, Vec3, Vec3Swizzles};
use proptest::prelude::*;

use islands_portfolio::collision::{resolve, CollisionConfig, CollisionRegistry, CollisionRequest, CollisionWorld};
use islands_portfolio::interact::basketball::{needs_respawn, scored_hoop, BallPhysics, Basketball, Hoop};
use islands_portfolio::procgen::terrain::{build_island_mesh, IslandMeshParams};
use islands_portfolio::procgen::{terrain_height, NO_GROUND};
use islands_portfolio::world::layout::{default_roster, Archipelago};
use islands_portfolio::world::WorldConfig;

fn archipelago() -> &'static (Archipelago, CollisionRegistry) {
    static WORLD: OnceLock<(Archipelago, CollisionRegistry)> = OnceLock::new();
    WORLD.get_or_init(|| {
        let archipelago = Archipelago::generate(&WorldConfig::default(), default_roster())
            .expect("default layout is valid");
        let registry = CollisionRegistry::from_archipelago(&archipelago);
        (archipelago, registry)
    })
}

/// Does the avatar's horizontal footprint at `at` overlap any obstacle's?
fn footprint_overlaps(at: Vec3, radius: f32, obstacles: &[Aabb3d]) -> bool {
    obstacles.iter().any(|o| {
        at.x + radius >= o.min.x && at.x - radius <= o.max.x && at.z + radius >= o.min.z && at.z - radius <= o.max.z
    })
}

fn world_point() -> impl Strategy<Value = Vec3> {
    (-180.0f32..180.0, -60.0f32..40.0, -180.0f32..180.0).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn outside_radius_is_sentinel(
        angle in 0.0f32..std::f32::consts::TAU,
        extra in 0.01f32..50.0,
        radius in 5.0f32..40.0,
        seed in any::<u32>(),
    ) {
        let d = radius + extra;
        prop_assert_eq!(terrain_height(angle.cos() * d, angle.sin() * d, radius, seed), NO_GROUND);
    }

    #[test]
    fn height_is_deterministic(
        x in -40.0f32..40.0,
        z in -40.0f32..40.0,
        radius in 5.0f32..40.0,
        seed in any::<u32>(),
    ) {
        let a = terrain_height(x, z, radius, seed);
        let b = terrain_height(x, z, radius, seed);
        prop_assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn center_vertex_matches_query(radius in 8.0f32..40.0, seed in any::<u32>()) {
        let params = IslandMeshParams { radius, ..Default::default() };
        let mesh = build_island_mesh(params, |x, z| terrain_height(x, z, radius, seed), |_, _, _| [1.0; 4]);
        prop_assert_eq!(mesh.positions[0][1].to_bits(), terrain_height(0.0, 0.0, radius, seed).to_bits());
    }

    #[test]
    fn never_below_safety_floor(current in world_point(), candidate in world_point(), vy in -40.0f32..15.0) {
        let (archipelago, registry) = archipelago();
        let world = CollisionWorld::new(archipelago, registry);
        let config = CollisionConfig::default();
        let r = resolve(&world, &config, &CollisionRequest { current, candidate, vertical_velocity: vy });
        prop_assert!(r.position.y >= config.safety_floor());
    }

    #[test]
    fn no_obstacles_never_collide(current in world_point(), candidate in world_point(), vy in -40.0f32..15.0) {
        let (archipelago, _) = archipelago();
        let empty = CollisionRegistry::default();
        let world = CollisionWorld::new(archipelago, &empty);
        let config = CollisionConfig::default();
        let r = resolve(&world, &config, &CollisionRequest { current, candidate, vertical_velocity: vy });
        prop_assert!(!r.collided);
    }

    #[test]
    fn collides_only_where_candidate_overlaps_a_structure(
        current in world_point(),
        step in prop::array::uniform3(-3.0f32..3.0),
        vy in -40.0f32..15.0,
        post in world_point(),
        post_half in 0.1f32..1.0,
    ) {
        let (archipelago, registry) = archipelago();
        let mut registry = registry.clone();
        registry.register_obstacle(Aabb3d::new(post, Vec3::splat(post_half)));
        let world = CollisionWorld::new(archipelago, &registry);
        let config = CollisionConfig::default();
        let candidate = current + Vec3::from_array(step);
        let r = resolve(&world, &config, &CollisionRequest { current, candidate, vertical_velocity: vy });
        if r.collided {
            prop_assert!(footprint_overlaps(candidate, config.avatar_radius, registry.obstacles()));
        }
    }

    #[test]
    fn rescue_near_island_edge_never_collides(
        angle in 0.0f32..std::f32::consts::TAU,
        sample in 0u32..8,
        depth in 1.0f32..40.0,
    ) {
        let (archipelago, _) = archipelago();
        let config = CollisionConfig::default();
        // Just past the hub rim, with a post on one of the first rescue ring samples.
        let rim = Vec2::from_angle(angle) * (archipelago.hub.radius + 0.5) + archipelago.hub.center.xz();
        let current = Vec3::new(rim.x, config.safety_floor() + 0.5, rim.y);
        let candidate = current.with_y(-depth);
        let ring = Vec2::from_angle(sample as f32 / 8.0 * std::f32::consts::TAU) * 1.5;
        let mut registry = CollisionRegistry::default();
        registry.register_obstacle(Aabb3d::new(
            Vec3::new(rim.x + ring.x, config.safety_floor() + config.ground_offset, rim.y + ring.y),
            Vec3::splat(0.3),
        ));
        let world = CollisionWorld::new(archipelago, &registry);
        let r = resolve(&world, &config, &CollisionRequest { current, candidate, vertical_velocity: -20.0 });
        prop_assert!(!r.collided);
    }

    #[test]
    fn far_below_open_water_lands_on_floor(depth in 20.0f32..500.0, angle_step in 0u32..6) {
        let (archipelago, registry) = archipelago();
        let world = CollisionWorld::new(archipelago, registry);
        let config = CollisionConfig::default();
        // Halfway between neighboring ring islands, beyond the outer rims.
        let angle = (angle_step as f32 + 0.5) / 6.0 * std::f32::consts::TAU;
        let xz = Vec2::new(angle.cos(), angle.sin()) * 175.0;
        let candidate = Vec3::new(xz.x, -depth, xz.y);
        let current = candidate.with_y(5.0);
        let r = resolve(&world, &config, &CollisionRequest { current, candidate, vertical_velocity: -30.0 });
        prop_assert_eq!(r.position.y, config.safety_floor());
    }

    #[test]
    fn one_score_per_crossing(
        offset in prop::array::uniform2(-0.4f32..0.4),
        above in 0.01f32..0.5,
        below in 0.01f32..0.5,
        now in 10.0f32..100.0,
    ) {
        let hoops = [Hoop { rim: Vec3::new(0.0, 3.05, 0.0), radius: 0.6 }];
        let prev = Vec3::new(offset[0], 3.05 + above, offset[1]);
        let next = Vec3::new(offset[0], 3.05 - below, offset[1]);
        let first = scored_hoop(prev, next, &hoops, None, now, 1.0);
        prop_assert!(first.is_some());
        // The next frame is still inside the cooldown window.
        let again = scored_hoop(prev, next, &hoops, Some(now), now + 0.016, 1.0);
        prop_assert!(again.is_none());
    }

    #[test]
    fn deep_ball_respawns_at_rest(
        y in -500.0f32..-5.001,
        spawn in prop::array::uniform3(-50.0f32..50.0),
        velocity in prop::array::uniform3(-30.0f32..30.0),
    ) {
        prop_assert!(needs_respawn(Vec3::new(0.0, y, 0.0), &BallPhysics::default()));
        let spawn = Vec3::from_array(spawn);
        let mut ball = Basketball::new(spawn);
        ball.velocity = Vec3::from_array(velocity);
        prop_assert_eq!(ball.respawn(), spawn);
        prop_assert_eq!(ball.velocity, Vec3::ZERO);
    }
}
