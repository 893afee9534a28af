//! Low-poly clouds drifting with the wind.
//!
//! Each cloud is a cluster of jittered puffs. Clouds drift along the wind,
//! wrap around at the world edge and bob slowly up and down.

use std::f32::consts::TAU;

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::procgen::shapes::jittered_sphere;
use crate::procgen::MeshData;

/// Cloud layer tunables.
#[derive(Resource, Clone, Debug)]
pub struct CloudConfig {
    pub count: usize,
    pub seed: u64,
    pub altitude: f32,
    /// Clouds spawn within `altitude ± altitude_jitter`.
    pub altitude_jitter: f32,
    /// Half-width of the square clouds wrap inside.
    pub extent: f32,
    /// Wind direction (normalized).
    pub wind_direction: Vec2,
    /// Wind speed in world units per second.
    pub wind_speed: f32,
    pub bob_amplitude: f32,
    /// Radians per second.
    pub bob_rate: f32,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            count: 14,
            seed: 777,
            altitude: 58.0,
            altitude_jitter: 10.0,
            extent: 320.0,
            wind_direction: Vec2::new(1.0, 0.3).normalize(),
            wind_speed: 3.0,
            bob_amplitude: 0.8,
            bob_rate: 0.3,
        }
    }
}

#[derive(Component, Debug)]
pub struct Cloud {
    /// Altitude the bob oscillates around.
    pub base_height: f32,
    pub phase: f32,
    /// Per-cloud multiplier on the wind speed.
    pub speed_scale: f32,
}

/// Wrap a coordinate into `[-extent, extent)`.
pub fn wrap_coordinate(value: f32, extent: f32) -> f32 {
    (value + extent).rem_euclid(2.0 * extent) - extent
}

/// Horizontal drift for one step, wrapped at the world edge.
pub fn drift(position: Vec2, wind: Vec2, delta: f32, extent: f32) -> Vec2 {
    let moved = position + wind * delta;
    Vec2::new(wrap_coordinate(moved.x, extent), wrap_coordinate(moved.y, extent))
}

/// Vertical offset from the base height at time `t`.
pub fn bob_offset(t: f32, phase: f32, amplitude: f32, rate: f32) -> f32 {
    amplitude * (t * rate + phase).sin()
}

/// A few overlapping puffs along the x axis.
pub fn cloud_mesh(seed: u32, puffs: u32) -> MeshData {
    let mut m = MeshData::default();
    let white = [0.97, 0.97, 1.0, 1.0];
    let puffs = puffs.max(1);
    for i in 0..puffs {
        let t = if puffs > 1 { i as f32 / (puffs - 1) as f32 } else { 0.5 };
        let x = (t - 0.5) * puffs as f32 * 3.2;
        // Middle puffs are the biggest.
        let size = 3.0 + 2.5 * (1.0 - (2.0 * t - 1.0).abs());
        let puff = jittered_sphere(size, 4, 7, 0.18, seed.wrapping_add(i * 13), white);
        m.append_transformed(&puff, Vec3::new(x, size * 0.2, 0.0), Quat::IDENTITY, Vec3::new(1.0, 0.65, 1.0));
    }
    m
}

pub(super) fn spawn_clouds(
    mut commands: Commands,
    config: Res<CloudConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let material = materials.add(StandardMaterial {
        base_color: Color::WHITE,
        perceptual_roughness: 1.0,
        ..default()
    });
    let mut rng = StdRng::seed_from_u64(config.seed);

    for i in 0..config.count {
        let puffs = rng.gen_range(3..6);
        let mesh = meshes.add(cloud_mesh(rng.gen(), puffs).to_flat_mesh());
        let x = rng.gen_range(-config.extent..config.extent);
        let z = rng.gen_range(-config.extent..config.extent);
        let height = config.altitude + rng.gen_range(-config.altitude_jitter..config.altitude_jitter);
        let scale = rng.gen_range(0.8..1.6);
        commands.spawn((
            Mesh3d(mesh),
            MeshMaterial3d(material.clone()),
            Transform::from_xyz(x, height, z)
                .with_rotation(Quat::from_rotation_y(rng.gen_range(0.0..TAU)))
                .with_scale(Vec3::splat(scale)),
            Cloud {
                base_height: height,
                phase: i as f32 * 1.3,
                speed_scale: rng.gen_range(0.7..1.3),
            },
            Name::new("Cloud"),
        ));
    }
    info!("Spawned {} clouds", config.count);
}

pub(super) fn drift_clouds(time: Res<Time>, config: Res<CloudConfig>, mut clouds: Query<(&mut Transform, &Cloud)>) {
    let delta = time.delta_secs();
    let t = time.elapsed_secs();
    for (mut transform, cloud) in &mut clouds {
        let wind = config.wind_direction * config.wind_speed * cloud.speed_scale;
        let xz = drift(transform.translation.xz(), wind, delta, config.extent);
        transform.translation.x = xz.x;
        transform.translation.z = xz.y;
        transform.translation.y =
            cloud.base_height + bob_offset(t, cloud.phase, config.bob_amplitude, config.bob_rate);
    }
}
