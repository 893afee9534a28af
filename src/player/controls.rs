//! Keyboard input to proposed motion.
//!
//! Pure helpers; the player plugin feeds them input and time each frame and
//! hands the result to collision.

use std::f32::consts::{PI, TAU};

use bevy::prelude::*;

/// Movement tunables.
#[derive(Resource, Clone, Debug)]
pub struct ControlsConfig {
    pub walk_speed: f32,
    pub run_speed: f32,
    /// Downward acceleration (negative).
    pub gravity: f32,
    pub jump_velocity: f32,
    /// Heading approach rate, per second.
    pub turn_rate: f32,
    /// Speeds below this read as idle.
    pub walk_threshold: f32,
    /// Speeds at or above this read as running.
    pub run_threshold: f32,
    /// Fall speed cap.
    pub terminal_velocity: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            walk_speed: 8.0,
            run_speed: 16.0,
            gravity: -30.0,
            jump_velocity: 12.0,
            turn_rate: 10.0,
            walk_threshold: 0.5,
            run_threshold: 11.0,
            terminal_velocity: -50.0,
        }
    }
}

/// One frame of movement keys.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ControlInput {
    /// `x` strafes right, `y` moves forward. Components are -1, 0 or 1.
    pub axis: Vec2,
    pub run: bool,
    pub jump: bool,
}

impl ControlInput {
    pub fn from_keys(keys: &ButtonInput<KeyCode>) -> Self {
        let held = |a: KeyCode, b: KeyCode| keys.pressed(a) || keys.pressed(b);
        let mut axis = Vec2::ZERO;
        if held(KeyCode::KeyW, KeyCode::ArrowUp) {
            axis.y += 1.0;
        }
        if held(KeyCode::KeyS, KeyCode::ArrowDown) {
            axis.y -= 1.0;
        }
        if held(KeyCode::KeyD, KeyCode::ArrowRight) {
            axis.x += 1.0;
        }
        if held(KeyCode::KeyA, KeyCode::ArrowLeft) {
            axis.x -= 1.0;
        }
        Self {
            axis,
            run: held(KeyCode::ShiftLeft, KeyCode::ShiftRight),
            jump: keys.just_pressed(KeyCode::Space),
        }
    }
}

/// Unit world-space direction for `axis`, relative to the camera heading.
/// Zero when no keys are held.
pub fn movement_direction(axis: Vec2, camera_yaw: f32) -> Vec3 {
    let forward = Vec3::new(camera_yaw.sin(), 0.0, camera_yaw.cos());
    let right = Vec3::new(-camera_yaw.cos(), 0.0, camera_yaw.sin());
    (forward * axis.y + right * axis.x).normalize_or_zero()
}

/// Vertical velocity after one step: reset on the ground, jump impulse when
/// requested while grounded, gravity otherwise.
pub fn next_vertical_velocity(current: f32, grounded: bool, jump: bool, config: &ControlsConfig, delta: f32) -> f32 {
    if grounded {
        if jump {
            config.jump_velocity
        } else {
            0.0
        }
    } else {
        (current + config.gravity * delta).max(config.terminal_velocity)
    }
}

/// Candidate position before collision correction.
pub fn propose_move(position: Vec3, direction: Vec3, speed: f32, vertical_velocity: f32, delta: f32) -> Vec3 {
    position + direction * speed * delta + Vec3::Y * vertical_velocity * delta
}

/// Wrap an angle to `(-π, π]`.
pub fn wrap_angle(angle: f32) -> f32 {
    let a = (angle + PI).rem_euclid(TAU) - PI;
    if a <= -PI {
        a + TAU
    } else {
        a
    }
}

/// Exponentially turn `current` toward `target` along the shorter arc.
pub fn approach_angle(current: f32, target: f32, rate: f32, delta: f32) -> f32 {
    let diff = wrap_angle(target - current);
    let t = 1.0 - (-rate * delta).exp();
    wrap_angle(current + diff * t)
}

/// Heading (yaw) that faces `direction`.
pub fn heading_of(direction: Vec3) -> f32 {
    direction.x.atan2(direction.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_follows_camera() {
        let dir = movement_direction(Vec2::Y, 0.0);
        assert!((dir - Vec3::Z).length() < 1e-6);
        let dir = movement_direction(Vec2::Y, std::f32::consts::FRAC_PI_2);
        assert!((dir - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn diagonal_is_normalized() {
        let dir = movement_direction(Vec2::new(1.0, 1.0), 0.3);
        assert!((dir.length() - 1.0).abs() < 1e-5);
        assert_eq!(movement_direction(Vec2::ZERO, 1.0), Vec3::ZERO);
    }

    #[test]
    fn heading_matches_direction() {
        let dir = movement_direction(Vec2::Y, 1.1);
        assert!((heading_of(dir) - 1.1).abs() < 1e-5);
    }

    #[test]
    fn jump_only_from_ground() {
        let config = ControlsConfig::default();
        assert_eq!(next_vertical_velocity(-3.0, true, true, &config, 0.016), config.jump_velocity);
        assert_eq!(next_vertical_velocity(-3.0, true, false, &config, 0.016), 0.0);
        let airborne = next_vertical_velocity(5.0, false, true, &config, 0.1);
        assert!((airborne - 2.0).abs() < 1e-5);
    }

    #[test]
    fn fall_speed_is_capped() {
        let config = ControlsConfig::default();
        assert_eq!(next_vertical_velocity(-49.9, false, false, &config, 1.0), config.terminal_velocity);
    }

    #[test]
    fn turns_the_short_way() {
        let near_pi = 3.0;
        let past_pi = -3.0;
        let next = approach_angle(near_pi, past_pi, 10.0, 0.01);
        // Crossing ±π rather than sweeping back through zero.
        assert!(next > near_pi || next < -3.0);
        assert!(wrap_angle(next - near_pi).abs() < 0.3);
    }

    #[test]
    fn approach_converges() {
        let mut a = 0.0;
        for _ in 0..200 {
            a = approach_angle(a, 2.0, 10.0, 1.0 / 60.0);
        }
        assert!((a - 2.0).abs() < 1e-3);
    }

    #[test]
    fn wrap_stays_in_range() {
        for i in -20..20 {
            let w = wrap_angle(i as f32 * 1.7);
            assert!(w > -PI - 1e-6 && w <= PI + 1e-6);
        }
    }

    #[test]
    fn keys_map_to_axis() {
        let mut keys = ButtonInput::<KeyCode>::default();
        keys.press(KeyCode::KeyW);
        keys.press(KeyCode::KeyA);
        keys.press(KeyCode::ShiftLeft);
        let input = ControlInput::from_keys(&keys);
        assert_eq!(input.axis, Vec2::new(-1.0, 1.0));
        assert!(input.run);
        assert!(!input.jump);
    }
}
