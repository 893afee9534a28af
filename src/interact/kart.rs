//! Go-kart driving model.
//!
//! Arcade handling: throttle accelerates along the heading, steering is
//! scaled by speed so a parked kart cannot spin, friction bleeds speed every
//! step, and gravity with ground follow keeps it on the terrain.

use bevy::math::bounding::Aabb3d;
use bevy::prelude::*;

use crate::procgen::shapes::{cuboid, prism};
use crate::procgen::MeshData;

/// Kart handling tunables.
#[derive(Resource, Clone, Debug)]
pub struct KartConfig {
    pub acceleration: f32,
    pub max_speed: f32,
    /// Top speed in reverse (positive).
    pub reverse_speed: f32,
    /// Deceleration when braking against forward motion.
    pub brake: f32,
    /// Turn rate at full speed, radians per second.
    pub steer_rate: f32,
    /// Speed multiplier per step.
    pub friction: f32,
    pub gravity: f32,
    /// Height of the kart origin above the ground.
    pub ride_height: f32,
    /// Driver seat relative to the kart origin, kart frame.
    pub seat_offset: Vec3,
    pub half_extents: Vec3,
    pub respawn_below: f32,
}

impl Default for KartConfig {
    fn default() -> Self {
        Self {
            acceleration: 20.0,
            max_speed: 25.0,
            reverse_speed: 10.0,
            brake: 40.0,
            steer_rate: 2.0,
            friction: 0.98,
            gravity: -30.0,
            ride_height: 0.35,
            seat_offset: Vec3::new(0.0, 0.75, -0.25),
            half_extents: Vec3::new(0.8, 0.4, 1.3),
            respawn_below: -5.0,
        }
    }
}

/// Physics body of a go-kart. Position lives in the `Transform`.
#[derive(Component, Debug)]
pub struct GoKart {
    /// Yaw, radians; forward is `(sin, 0, cos)`.
    pub heading: f32,
    /// Signed speed along the heading.
    pub speed: f32,
    pub vertical_velocity: f32,
    pub driven: bool,
    pub spawn: Vec3,
    pub spawn_heading: f32,
}

impl GoKart {
    pub fn new(spawn: Vec3, heading: f32) -> Self {
        Self {
            heading,
            speed: 0.0,
            vertical_velocity: 0.0,
            driven: false,
            spawn,
            spawn_heading: heading,
        }
    }

    pub fn forward(&self) -> Vec3 {
        Vec3::new(self.heading.sin(), 0.0, self.heading.cos())
    }

    /// Park back at the spawn, stopped and facing the spawn heading.
    pub fn respawn(&mut self) -> Vec3 {
        self.heading = self.spawn_heading;
        self.speed = 0.0;
        self.vertical_velocity = 0.0;
        self.spawn
    }
}

/// World box around a kart body at `center` turned to `heading`.
pub fn kart_box(center: Vec3, heading: f32, half_extents: Vec3) -> Aabb3d {
    let (sin, cos) = heading.sin_cos();
    let (sin, cos) = (sin.abs(), cos.abs());
    Aabb3d::new(
        center,
        Vec3::new(
            cos * half_extents.x + sin * half_extents.z,
            half_extents.y,
            sin * half_extents.x + cos * half_extents.z,
        ),
    )
}

/// Driver input: `throttle` forward/back, `steer` right positive. Both in `[-1, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct KartInput {
    pub throttle: f32,
    pub steer: f32,
}

/// New signed speed after throttle, brake, reverse and friction.
pub fn next_speed(speed: f32, throttle: f32, config: &KartConfig, delta: f32) -> f32 {
    let mut speed = speed;
    if throttle > 0.0 {
        speed += config.acceleration * throttle * delta;
    } else if throttle < 0.0 {
        if speed > 0.0 {
            speed = (speed + config.brake * throttle * delta).max(0.0);
        } else {
            speed += config.acceleration * throttle * delta;
        }
    }
    speed.clamp(-config.reverse_speed, config.max_speed) * config.friction
}

/// New heading. Turning scales with speed; reverse steers the other way round.
pub fn next_heading(heading: f32, speed: f32, steer: f32, config: &KartConfig, delta: f32) -> f32 {
    let grip = (speed / config.max_speed).clamp(-1.0, 1.0);
    heading - steer * config.steer_rate * grip * delta
}

/// Horizontal step. Returns the new position without ground follow.
pub fn drive_step(position: Vec3, kart: &mut GoKart, input: KartInput, config: &KartConfig, delta: f32) -> Vec3 {
    kart.speed = next_speed(kart.speed, input.throttle, config, delta);
    kart.heading = next_heading(kart.heading, kart.speed, input.steer, config, delta);
    position + kart.forward() * kart.speed * delta
}

/// Apply gravity and snap onto `ground` if the kart reaches it.
pub fn settle_on_ground(position: Vec3, kart: &mut GoKart, ground: Option<f32>, config: &KartConfig, delta: f32) -> Vec3 {
    kart.vertical_velocity += config.gravity * delta;
    let mut position = position + Vec3::Y * kart.vertical_velocity * delta;
    if let Some(height) = ground {
        let floor = height + config.ride_height;
        if position.y <= floor {
            position.y = floor;
            kart.vertical_velocity = 0.0;
        }
    }
    position
}

/// World position of the driver's seat.
pub fn seat_position(position: Vec3, kart: &GoKart, config: &KartConfig) -> Vec3 {
    position + Quat::from_rotation_y(kart.heading) * config.seat_offset
}

/// Low-poly kart facing +Z with its origin at axle height.
pub fn kart_mesh(config: &KartConfig) -> MeshData {
    let mut m = MeshData::default();
    let h = config.half_extents;
    let body = [0.9, 0.18, 0.15, 1.0];
    let dark = [0.12, 0.12, 0.14, 1.0];

    m.append_transformed(
        &cuboid(Vec3::new(h.x * 0.85, 0.12, h.z), body),
        Vec3::new(0.0, 0.05, 0.0),
        Quat::IDENTITY,
        Vec3::ONE,
    );
    // Nose and seat back.
    m.append_transformed(&cuboid(Vec3::new(h.x * 0.6, 0.15, 0.3), body), Vec3::new(0.0, 0.22, h.z - 0.3), Quat::IDENTITY, Vec3::ONE);
    m.append_transformed(&cuboid(Vec3::new(0.35, 0.35, 0.08), dark), Vec3::new(0.0, 0.5, -0.65), Quat::IDENTITY, Vec3::ONE);
    // Steering column and wheel.
    m.append_transformed(&cuboid(Vec3::new(0.04, 0.25, 0.04), dark), Vec3::new(0.0, 0.4, 0.45), Quat::from_rotation_x(-0.5), Vec3::ONE);
    m.append_transformed(&cuboid(Vec3::new(0.22, 0.03, 0.22), dark), Vec3::new(0.0, 0.62, 0.35), Quat::from_rotation_x(-0.5), Vec3::ONE);

    // Prism axis is +y; the quarter turn lays it along -x, the offset centers it.
    let wheel = prism(0.3, 0.25, 8, dark);
    let side = Quat::from_rotation_z(std::f32::consts::FRAC_PI_2);
    for (x, z) in [(1.0, 1.0), (-1.0, 1.0), (1.0, -1.0), (-1.0, -1.0)] {
        let at = Vec3::new(x * (h.x + 0.1), -0.05, z * (h.z - 0.35));
        m.append_transformed(&wheel, at + Vec3::X * 0.125, side, Vec3::ONE);
    }
    m
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::bounds::enters_obstacle;

    #[test]
    fn throttle_accelerates_to_cap() {
        let config = KartConfig::default();
        let mut speed = 0.0;
        for _ in 0..600 {
            speed = next_speed(speed, 1.0, &config, 1.0 / 60.0);
        }
        assert!(speed > 5.0);
        assert!(speed <= config.max_speed);
    }

    #[test]
    fn brake_stops_before_reversing() {
        let config = KartConfig::default();
        let speed = next_speed(0.3, -1.0, &config, 0.1);
        assert_eq!(speed, 0.0);
        let reversing = next_speed(0.0, -1.0, &config, 0.1);
        assert!(reversing < 0.0);
        assert!(reversing >= -config.reverse_speed);
    }

    #[test]
    fn friction_coasts_down() {
        let config = KartConfig::default();
        let coasting = next_speed(10.0, 0.0, &config, 1.0 / 60.0);
        assert!(coasting < 10.0 && coasting > 9.0);
    }

    #[test]
    fn parked_kart_cannot_spin() {
        let config = KartConfig::default();
        assert_eq!(next_heading(0.5, 0.0, 1.0, &config, 0.1), 0.5);
    }

    #[test]
    fn steering_right_turns_right() {
        let config = KartConfig::default();
        let mut kart = GoKart::new(Vec3::ZERO, 0.0);
        kart.speed = 20.0;
        let before = kart.forward();
        drive_step(Vec3::ZERO, &mut kart, KartInput { throttle: 0.0, steer: 1.0 }, &config, 0.1);
        let right = before.cross(Vec3::Y);
        assert!(kart.forward().dot(right) > 0.0);
    }

    #[test]
    fn lands_on_ground() {
        let config = KartConfig::default();
        let mut kart = GoKart::new(Vec3::ZERO, 0.0);
        let p = settle_on_ground(Vec3::new(0.0, 2.4, 0.0), &mut kart, Some(2.0), &config, 0.1);
        assert_eq!(p.y, 2.0 + config.ride_height);
        assert_eq!(kart.vertical_velocity, 0.0);
    }

    #[test]
    fn box_turns_with_heading() {
        let h = KartConfig::default().half_extents;
        let straight = kart_box(Vec3::ZERO, 0.0, h);
        assert!((straight.max.z - h.z).abs() < 1e-5);
        assert!((straight.max.x - h.x).abs() < 1e-5);
        let sideways = kart_box(Vec3::ZERO, std::f32::consts::FRAC_PI_2, h);
        assert!((sideways.max.x - h.z).abs() < 1e-5);
        assert!((sideways.max.z - h.x).abs() < 1e-5);
    }

    #[test]
    fn nose_hits_wall_ahead() {
        let config = KartConfig::default();
        let wall = Aabb3d::new(Vec3::new(0.0, 0.0, 2.0), Vec3::new(3.0, 1.0, 1.0));
        let current = kart_box(Vec3::new(0.0, 0.0, -0.5), 0.0, config.half_extents);
        let next = kart_box(Vec3::ZERO, 0.0, config.half_extents);
        assert!(enters_obstacle(&current, &next, &[wall]));
    }

    #[test]
    fn respawn_parks_at_spawn() {
        let spawn = Vec3::new(3.0, 1.0, 7.0);
        let mut kart = GoKart::new(spawn, 1.2);
        kart.heading = -2.0;
        kart.speed = 14.0;
        kart.vertical_velocity = -9.0;
        assert_eq!(kart.respawn(), spawn);
        assert_eq!(kart.heading, 1.2);
        assert_eq!(kart.speed, 0.0);
        assert_eq!(kart.vertical_velocity, 0.0);
    }

    #[test]
    fn seat_rotates_with_kart() {
        let config = KartConfig::default();
        let kart = GoKart::new(Vec3::ZERO, std::f32::consts::PI);
        let seat = seat_position(Vec3::ZERO, &kart, &config);
        assert!(seat.z > 0.0);
    }
}
