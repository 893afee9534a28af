//! Locomotion state and procedural limb animation for the avatar.
//!
//! The avatar is a handful of low-poly boxes: a body (torso and head) that
//! bobs, and four limbs that swing about their shoulder or hip pivots.

use bevy::prelude::*;

use crate::procgen::shapes::cuboid;
use crate::procgen::MeshData;

/// Idle / walking / running, picked from horizontal speed without hysteresis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LocomotionState {
    #[default]
    Idle,
    Walking,
    Running,
}

impl LocomotionState {
    pub fn from_speed(speed: f32, walk_threshold: f32, run_threshold: f32) -> Self {
        if speed < walk_threshold {
            LocomotionState::Idle
        } else if speed < run_threshold {
            LocomotionState::Walking
        } else {
            LocomotionState::Running
        }
    }

    /// Swing frequency (radians per second) and amplitude (radians).
    fn swing(self) -> (f32, f32) {
        match self {
            LocomotionState::Idle => (2.0, 0.05),
            LocomotionState::Walking => (9.0, 0.6),
            LocomotionState::Running => (14.0, 1.0),
        }
    }

    /// Bob amplitude of the body.
    fn bob(self) -> f32 {
        match self {
            LocomotionState::Idle => 0.02,
            LocomotionState::Walking => 0.06,
            LocomotionState::Running => 0.12,
        }
    }
}

/// Forward swing angle at time `t`, before per-limb sign.
pub fn limb_swing(state: LocomotionState, t: f32) -> f32 {
    let (frequency, amplitude) = state.swing();
    amplitude * (t * frequency).sin()
}

/// Vertical body offset at time `t`. Two bobs per stride, never below rest.
pub fn torso_bob(state: LocomotionState, t: f32) -> f32 {
    let (frequency, _) = state.swing();
    state.bob() * (t * frequency).sin().abs()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LimbKind {
    LeftArm,
    RightArm,
    LeftLeg,
    RightLeg,
}

impl LimbKind {
    pub const ALL: [LimbKind; 4] = [LimbKind::LeftArm, LimbKind::RightArm, LimbKind::LeftLeg, LimbKind::RightLeg];

    /// Arms swing against the leg on the same side.
    fn phase_sign(self) -> f32 {
        match self {
            LimbKind::LeftArm | LimbKind::RightLeg => -1.0,
            LimbKind::RightArm | LimbKind::LeftLeg => 1.0,
        }
    }

    fn is_leg(self) -> bool {
        matches!(self, LimbKind::LeftLeg | LimbKind::RightLeg)
    }

    /// Pivot in the body frame (shoulder or hip).
    pub fn pivot(self) -> Vec3 {
        match self {
            LimbKind::LeftArm => Vec3::new(0.38, 0.55, 0.0),
            LimbKind::RightArm => Vec3::new(-0.38, 0.55, 0.0),
            LimbKind::LeftLeg => Vec3::new(0.14, -0.1, 0.0),
            LimbKind::RightLeg => Vec3::new(-0.14, -0.1, 0.0),
        }
    }

    /// Rotation about the pivot's x axis.
    pub fn angle(self, state: LocomotionState, t: f32, seated: bool) -> f32 {
        if seated {
            return if self.is_leg() { -1.4 } else { -0.7 };
        }
        self.phase_sign() * limb_swing(state, t)
    }
}

/// Marker on the limb pivot entity.
#[derive(Component)]
pub struct Limb(pub LimbKind);

/// Marker on the body entity that bobs.
#[derive(Component)]
pub struct AvatarBody;

const SKIN: [f32; 4] = [0.95, 0.78, 0.62, 1.0];
const SHIRT: [f32; 4] = [0.2, 0.45, 0.85, 1.0];
const TROUSERS: [f32; 4] = [0.18, 0.2, 0.3, 1.0];

/// Torso and head, in the body frame.
pub fn body_mesh() -> MeshData {
    let mut m = MeshData::default();
    m.append_transformed(
        &cuboid(Vec3::new(0.3, 0.35, 0.18), SHIRT),
        Vec3::new(0.0, 0.25, 0.0),
        Quat::IDENTITY,
        Vec3::ONE,
    );
    m.append_transformed(&cuboid(Vec3::splat(0.2), SKIN), Vec3::new(0.0, 0.84, 0.0), Quat::IDENTITY, Vec3::ONE);
    // Nose, so the facing reads from behind the camera too.
    m.append_transformed(
        &cuboid(Vec3::new(0.04, 0.04, 0.05), SKIN),
        Vec3::new(0.0, 0.82, 0.24),
        Quat::IDENTITY,
        Vec3::ONE,
    );
    m
}

/// Limb hanging down from its pivot at the origin.
pub fn limb_mesh(kind: LimbKind) -> MeshData {
    let (half, color) = if kind.is_leg() {
        (Vec3::new(0.11, 0.45, 0.12), TROUSERS)
    } else {
        (Vec3::new(0.08, 0.35, 0.08), SHIRT)
    };
    let mut m = MeshData::default();
    m.append_transformed(&cuboid(half, color), Vec3::new(0.0, -half.y, 0.0), Quat::IDENTITY, Vec3::ONE);
    m
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_from_speed() {
        assert_eq!(LocomotionState::from_speed(0.2, 0.5, 11.0), LocomotionState::Idle);
        assert_eq!(LocomotionState::from_speed(8.0, 0.5, 11.0), LocomotionState::Walking);
        assert_eq!(LocomotionState::from_speed(11.0, 0.5, 11.0), LocomotionState::Running);
    }

    #[test]
    fn running_swings_harder_than_walking() {
        let peak = |s| (0..200).map(|i| limb_swing(s, i as f32 * 0.01).abs()).fold(0.0, f32::max);
        assert!(peak(LocomotionState::Running) > peak(LocomotionState::Walking));
        assert!(peak(LocomotionState::Walking) > peak(LocomotionState::Idle));
    }

    #[test]
    fn bob_never_sinks() {
        for i in 0..100 {
            assert!(torso_bob(LocomotionState::Running, i as f32 * 0.037) >= 0.0);
        }
    }

    #[test]
    fn opposite_limbs_counter_swing() {
        let t = 0.13;
        let s = LocomotionState::Walking;
        assert_eq!(LimbKind::LeftArm.angle(s, t, false), -LimbKind::LeftLeg.angle(s, t, false));
        assert_eq!(LimbKind::LeftArm.angle(s, t, false), LimbKind::RightLeg.angle(s, t, false));
    }

    #[test]
    fn feet_reach_the_ground() {
        // Origin sits one unit above the ground.
        let leg = limb_mesh(LimbKind::LeftLeg);
        let (lo, _) = leg.extents().unwrap();
        let foot = LimbKind::LeftLeg.pivot().y + lo.y;
        assert!((foot + 1.0).abs() < 1e-5);
    }
}
