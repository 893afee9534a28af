//! Third-person orbit camera with pointer lock.
//!
//! Left click locks the pointer, Escape releases it. Mouse look only turns
//! the camera while locked. The camera trails the player with exponential
//! smoothing and never dips under the ground beneath it.

use bevy::{
    core_pipeline::{
        bloom::{Bloom, BloomCompositeMode, BloomPrefilter},
        tonemapping::Tonemapping,
    },
    input::mouse::MouseMotion,
    pbr::{DistanceFog, FogFalloff},
    prelude::*,
    window::{CursorGrabMode, PrimaryWindow},
};

use crate::collision::Collision;
use crate::player::Player;
use crate::FrameSet;

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CameraConfig>()
            .init_resource::<BloomConfig>()
            .init_resource::<PointerLock>()
            .add_systems(Startup, setup_camera)
            .add_systems(Update, (toggle_pointer_lock, mouse_look).chain().in_set(FrameSet::Input))
            .add_systems(Update, follow_player.in_set(FrameSet::Camera));
    }
}

/// Orbit and follow tunables.
#[derive(Resource, Clone)]
pub struct CameraConfig {
    /// Radians per pixel of mouse motion.
    pub sensitivity: f32,
    pub min_pitch: f32,
    pub max_pitch: f32,
    /// Distance from the focus point.
    pub distance: f32,
    /// Focus height above the player's origin.
    pub focus_height: f32,
    /// Exponential follow rate, per second.
    pub follow_rate: f32,
    /// Minimum height above the ground under the camera.
    pub ground_clearance: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            sensitivity: 0.003,
            min_pitch: -0.15,
            max_pitch: 1.25,
            distance: 9.0,
            focus_height: 1.2,
            follow_rate: 8.0,
            ground_clearance: 0.8,
        }
    }
}

/// Configuration for bloom on the glowing bridges and billboards.
#[derive(Resource)]
pub struct BloomConfig {
    pub intensity: f32,
    /// Bloom threshold (luminance above this glows).
    pub threshold: f32,
    pub threshold_softness: f32,
}

impl Default for BloomConfig {
    fn default() -> Self {
        Self {
            intensity: 0.25,
            threshold: 0.9,
            threshold_softness: 0.3,
        }
    }
}

/// Whether the pointer is currently captured for mouse look.
#[derive(Resource, Default)]
pub struct PointerLock(pub bool);

/// The player-following camera.
#[derive(Component)]
pub struct ThirdPersonCamera {
    /// Heading of the camera's horizontal forward, radians.
    pub yaw: f32,
    /// Elevation above the focus point, radians.
    pub pitch: f32,
}

impl Default for ThirdPersonCamera {
    fn default() -> Self {
        Self { yaw: 0.0, pitch: 0.35 }
    }
}

impl ThirdPersonCamera {
    /// Horizontal forward direction, the frame movement input is relative to.
    pub fn forward(&self) -> Vec3 {
        Vec3::new(self.yaw.sin(), 0.0, self.yaw.cos())
    }
}

/// Camera position relative to its focus for the given orbit.
pub fn orbit_offset(yaw: f32, pitch: f32, distance: f32) -> Vec3 {
    let horizontal = distance * pitch.cos();
    Vec3::new(-yaw.sin() * horizontal, distance * pitch.sin(), -yaw.cos() * horizontal)
}

/// Fraction of the remaining distance covered in `delta` seconds.
pub fn follow_factor(rate: f32, delta: f32) -> f32 {
    1.0 - (-rate * delta).exp()
}

fn setup_camera(mut commands: Commands, bloom_config: Res<BloomConfig>, config: Res<CameraConfig>) {
    let orbit = ThirdPersonCamera::default();
    let start = Vec3::new(0.0, 4.0, 0.0) + orbit_offset(orbit.yaw, orbit.pitch, config.distance);
    commands.spawn((
        Camera3d::default(),
        Camera {
            hdr: true, // Required for bloom
            ..default()
        },
        Projection::Perspective(PerspectiveProjection {
            fov: 60.0_f32.to_radians(),
            far: 1500.0,
            ..default()
        }),
        Transform::from_translation(start).looking_at(Vec3::new(0.0, 4.0, 0.0), Vec3::Y),
        DistanceFog {
            color: Color::srgba(0.62, 0.8, 0.95, 1.0),
            falloff: FogFalloff::Linear { start: 180.0, end: 520.0 },
            directional_light_color: Color::srgba(1.0, 0.9, 0.7, 0.3),
            directional_light_exponent: 20.0,
        },
        Bloom {
            intensity: bloom_config.intensity,
            prefilter: BloomPrefilter {
                threshold: bloom_config.threshold,
                threshold_softness: bloom_config.threshold_softness,
            },
            composite_mode: BloomCompositeMode::Additive,
            ..default()
        },
        Tonemapping::TonyMcMapface,
        orbit,
    ));
}

fn toggle_pointer_lock(
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    keys: Res<ButtonInput<KeyCode>>,
    mut lock: ResMut<PointerLock>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
) {
    let wanted = if keys.just_pressed(KeyCode::Escape) {
        false
    } else if mouse_buttons.just_pressed(MouseButton::Left) {
        true
    } else {
        return;
    };
    if wanted == lock.0 {
        return;
    }

    let Ok(mut window) = windows.get_single_mut() else {
        return;
    };
    window.cursor_options.grab_mode = if wanted { CursorGrabMode::Locked } else { CursorGrabMode::None };
    window.cursor_options.visible = !wanted;
    lock.0 = wanted;
    debug!("Pointer lock: {}", if wanted { "ON" } else { "OFF" });
}

fn mouse_look(
    lock: Res<PointerLock>,
    config: Res<CameraConfig>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut cameras: Query<&mut ThirdPersonCamera>,
) {
    if !lock.0 {
        // Drop motion gathered while unlocked so it doesn't jump on lock.
        mouse_motion.clear();
        return;
    }
    let delta: Vec2 = mouse_motion.read().map(|e| e.delta).sum();
    if delta == Vec2::ZERO {
        return;
    }
    for mut orbit in &mut cameras {
        orbit.yaw -= delta.x * config.sensitivity;
        orbit.pitch = (orbit.pitch + delta.y * config.sensitivity).clamp(config.min_pitch, config.max_pitch);
    }
}

fn follow_player(
    time: Res<Time>,
    config: Res<CameraConfig>,
    collision: Collision,
    players: Query<&Transform, (With<Player>, Without<ThirdPersonCamera>)>,
    mut cameras: Query<(&mut Transform, &ThirdPersonCamera)>,
) {
    let Ok(player) = players.get_single() else {
        return;
    };
    let focus = player.translation + Vec3::Y * config.focus_height;
    let t = follow_factor(config.follow_rate, time.delta_secs());
    let world = collision.world();

    for (mut transform, orbit) in &mut cameras {
        let desired = focus + orbit_offset(orbit.yaw, orbit.pitch, config.distance);
        let mut position = transform.translation.lerp(desired, t);

        let mut floor = collision.config.ocean_level + config.ground_clearance;
        if let Some(ground) = world.and_then(|w| w.ground_at(position.x, position.z, position.y + 50.0)) {
            floor = floor.max(ground + config.ground_clearance);
        }
        position.y = position.y.max(floor);

        *transform = Transform::from_translation(position).looking_at(focus, Vec3::Y);
    }
}
