//! Basketball physics and hoop scoring.
//!
//! Explicit Euler with per-step damping. A score is a downward crossing of a
//! hoop's rim plane inside the rim radius, at most once per cooldown.

use bevy::prelude::*;

/// Ball physics tunables.
#[derive(Resource, Clone, Debug)]
pub struct BallPhysics {
    pub gravity: f32,
    /// Velocity multiplier per step while airborne.
    pub air_damping: f32,
    /// Fraction of vertical speed kept on a bounce.
    pub bounce_damping: f32,
    /// Horizontal velocity multiplier per step while touching the ground.
    pub rolling_friction: f32,
    pub radius: f32,
    /// Bounces slower than this come to rest.
    pub settle_speed: f32,
    pub throw_speed: f32,
    pub throw_lift: f32,
    /// Seconds after a score during which the same ball cannot score again.
    pub score_cooldown: f32,
    /// Below this height the ball returns to its spawn.
    pub respawn_below: f32,
}

impl Default for BallPhysics {
    fn default() -> Self {
        Self {
            gravity: -20.0,
            air_damping: 0.99,
            bounce_damping: 0.7,
            rolling_friction: 0.98,
            radius: 0.5,
            settle_speed: 0.6,
            throw_speed: 13.0,
            throw_lift: 5.0,
            score_cooldown: 1.0,
            respawn_below: -5.0,
        }
    }
}

/// Physics body of a basketball. Position lives in the `Transform`.
#[derive(Component, Debug)]
pub struct Basketball {
    pub velocity: Vec3,
    pub held: bool,
    pub spawn: Vec3,
    /// Elapsed time of the last score, if any.
    pub last_score: Option<f32>,
}

impl Basketball {
    pub fn new(spawn: Vec3) -> Self {
        Self {
            velocity: Vec3::ZERO,
            held: false,
            spawn,
            last_score: None,
        }
    }

    /// Put the ball back at rest; returns where it goes.
    pub fn respawn(&mut self) -> Vec3 {
        self.velocity = Vec3::ZERO;
        self.held = false;
        self.spawn
    }
}

/// A hoop's rim: center of the ring and its radius.
#[derive(Component, Clone, Copy, Debug)]
pub struct Hoop {
    pub rim: Vec3,
    pub radius: f32,
}

/// Sent once per scored basket.
#[derive(Event, Clone, Copy, Debug, PartialEq)]
pub struct ScoreEvent {
    pub hoop: Vec3,
    pub ball: Entity,
}

/// Running basket count.
#[derive(Resource, Default, Debug)]
pub struct Scoreboard {
    pub baskets: u32,
}

/// Position and velocity after one integration step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BallStep {
    pub position: Vec3,
    pub velocity: Vec3,
    pub on_ground: bool,
}

/// Integrate one step. `ground` is the surface height under the new position.
pub fn step_ball(
    position: Vec3,
    velocity: Vec3,
    ground: impl Fn(f32, f32) -> Option<f32>,
    physics: &BallPhysics,
    delta: f32,
) -> BallStep {
    let mut velocity = velocity + Vec3::Y * physics.gravity * delta;
    velocity *= physics.air_damping;
    let mut position = position + velocity * delta;
    let mut on_ground = false;

    if let Some(height) = ground(position.x, position.z) {
        let floor = height + physics.radius;
        if position.y <= floor {
            position.y = floor;
            on_ground = true;
            if velocity.y < 0.0 {
                velocity.y = -velocity.y * physics.bounce_damping;
                if velocity.y < physics.settle_speed {
                    velocity.y = 0.0;
                }
            }
            velocity.x *= physics.rolling_friction;
            velocity.z *= physics.rolling_friction;
        }
    }

    BallStep {
        position,
        velocity,
        on_ground,
    }
}

/// True when the segment `prev → next` passes down through the rim plane
/// inside `radius` of the rim center.
pub fn rim_crossing(prev: Vec3, next: Vec3, rim: Vec3, radius: f32) -> bool {
    if !(prev.y > rim.y && next.y <= rim.y) {
        return false;
    }
    let s = (prev.y - rim.y) / (prev.y - next.y);
    let through = prev.lerp(next, s);
    through.xz().distance(rim.xz()) < radius
}

/// Whether a ball that last scored at `last` may score at `now`.
pub fn off_cooldown(last: Option<f32>, now: f32, cooldown: f32) -> bool {
    last.map_or(true, |t| now - t >= cooldown)
}

/// The hoop scored through this step, if any and if allowed.
pub fn scored_hoop<'a>(
    prev: Vec3,
    next: Vec3,
    hoops: impl IntoIterator<Item = &'a Hoop>,
    last_score: Option<f32>,
    now: f32,
    cooldown: f32,
) -> Option<&'a Hoop> {
    if !off_cooldown(last_score, now, cooldown) {
        return None;
    }
    hoops.into_iter().find(|h| rim_crossing(prev, next, h.rim, h.radius))
}

/// Whether the ball has dropped out of the world and should return to spawn.
pub fn needs_respawn(position: Vec3, physics: &BallPhysics) -> bool {
    position.y < physics.respawn_below
}

/// Launch velocity for a throw along `look` (the camera forward).
pub fn throw_velocity(look: Vec3, physics: &BallPhysics) -> Vec3 {
    look.normalize_or_zero() * physics.throw_speed + Vec3::Y * physics.throw_lift
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(h: f32) -> impl Fn(f32, f32) -> Option<f32> {
        move |_, _| Some(h)
    }

    #[test]
    fn falls_under_gravity() {
        let physics = BallPhysics::default();
        let step = step_ball(Vec3::new(0.0, 10.0, 0.0), Vec3::ZERO, |_, _| None, &physics, 0.1);
        assert!(step.velocity.y < 0.0);
        assert!(step.position.y < 10.0);
        assert!(!step.on_ground);
    }

    #[test]
    fn bounces_with_damping() {
        let physics = BallPhysics::default();
        let step = step_ball(Vec3::new(0.0, 2.6, 0.0), Vec3::new(0.0, -10.0, 0.0), flat(2.0), &physics, 0.05);
        assert!(step.on_ground);
        assert_eq!(step.position.y, 2.0 + physics.radius);
        assert!(step.velocity.y > 0.0);
        assert!(step.velocity.y < 10.0);
    }

    #[test]
    fn comes_to_rest() {
        let physics = BallPhysics::default();
        let mut p = Vec3::new(0.0, 4.0, 0.0);
        let mut v = Vec3::new(1.0, 0.0, 0.0);
        for _ in 0..600 {
            let s = step_ball(p, v, flat(2.0), &physics, 1.0 / 60.0);
            p = s.position;
            v = s.velocity;
        }
        assert!((p.y - 2.5).abs() < 0.05);
        assert!(v.length() < 0.1);
    }

    #[test]
    fn downward_crossing_inside_rim_scores() {
        let rim = Vec3::new(0.0, 3.05, 0.0);
        assert!(rim_crossing(Vec3::new(0.1, 3.2, 0.0), Vec3::new(0.1, 3.0, 0.0), rim, 0.6));
    }

    #[test]
    fn upward_or_outside_does_not_score() {
        let rim = Vec3::new(0.0, 3.05, 0.0);
        assert!(!rim_crossing(Vec3::new(0.1, 3.0, 0.0), Vec3::new(0.1, 3.2, 0.0), rim, 0.6));
        assert!(!rim_crossing(Vec3::new(1.0, 3.2, 0.0), Vec3::new(1.0, 3.0, 0.0), rim, 0.6));
        assert!(!rim_crossing(Vec3::new(0.1, 3.5, 0.0), Vec3::new(0.1, 3.2, 0.0), rim, 0.6));
    }

    #[test]
    fn cooldown_suppresses_second_score() {
        let hoops = [Hoop {
            rim: Vec3::new(0.0, 3.05, 0.0),
            radius: 0.6,
        }];
        let prev = Vec3::new(0.0, 3.2, 0.0);
        let next = Vec3::new(0.0, 3.0, 0.0);
        assert!(scored_hoop(prev, next, &hoops, None, 5.0, 1.0).is_some());
        assert!(scored_hoop(prev, next, &hoops, Some(4.5), 5.0, 1.0).is_none());
        assert!(scored_hoop(prev, next, &hoops, Some(3.9), 5.0, 1.0).is_some());
    }

    #[test]
    fn respawn_threshold() {
        let physics = BallPhysics::default();
        assert!(needs_respawn(Vec3::new(0.0, -5.1, 0.0), &physics));
        assert!(!needs_respawn(Vec3::new(0.0, -4.9, 0.0), &physics));
    }

    #[test]
    fn lost_ball_returns_to_spawn_at_rest() {
        let physics = BallPhysics::default();
        let spawn = Vec3::new(4.0, 3.0, -2.0);
        let mut ball = Basketball::new(spawn);
        let mut p = Vec3::new(60.0, 2.0, 0.0);
        let mut v = Vec3::new(6.0, 4.0, 1.0);
        for _ in 0..600 {
            let s = step_ball(p, v, |_, _| None, &physics, 1.0 / 60.0);
            p = s.position;
            v = s.velocity;
            if needs_respawn(p, &physics) {
                break;
            }
        }
        assert!(needs_respawn(p, &physics));

        ball.velocity = v;
        assert_eq!(ball.respawn(), spawn);
        assert_eq!(ball.velocity, Vec3::ZERO);
        assert!(!ball.held);
    }

    #[test]
    fn throw_goes_forward_and_up() {
        let v = throw_velocity(Vec3::new(0.0, 0.0, 2.0), &BallPhysics::default());
        assert!(v.z > 0.0 && v.y > 0.0);
    }
}
