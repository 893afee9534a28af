//! Flocking birds circling above the archipelago.
//!
//! Classic separation / alignment / cohesion over every pair of birds, plus a
//! soft pull back toward the flock's home sphere. The flock is small enough
//! that the quadratic neighbor scan is fine.

use std::f32::consts::TAU;

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::procgen::shapes::cuboid;
use crate::procgen::MeshData;

/// Flock tunables.
#[derive(Resource, Clone, Debug)]
pub struct BoidConfig {
    pub count: usize,
    pub seed: u64,
    /// Center of the sphere the flock stays inside.
    pub home: Vec3,
    pub home_radius: f32,
    pub separation_radius: f32,
    pub neighbor_radius: f32,
    pub separation_weight: f32,
    pub alignment_weight: f32,
    pub cohesion_weight: f32,
    /// Steering per unit of distance past the home sphere.
    pub bounds_weight: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    /// Wing beats per second, in radians.
    pub flap_rate: f32,
}

impl Default for BoidConfig {
    fn default() -> Self {
        Self {
            count: 25,
            seed: 4242,
            home: Vec3::new(0.0, 38.0, 0.0),
            home_radius: 90.0,
            separation_radius: 4.0,
            neighbor_radius: 12.0,
            separation_weight: 1.5,
            alignment_weight: 1.0,
            cohesion_weight: 0.8,
            bounds_weight: 0.5,
            min_speed: 4.0,
            max_speed: 10.0,
            flap_rate: 12.0,
        }
    }
}

/// Position and velocity of one bird.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoidState {
    pub position: Vec3,
    pub velocity: Vec3,
}

/// Bird entity; its position lives in the `Transform`.
#[derive(Component, Debug)]
pub struct Boid {
    pub velocity: Vec3,
    pub flap_phase: f32,
}

/// Wing pivot; `side` is `1.0` for the left wing and `-1.0` for the right.
#[derive(Component, Debug)]
pub struct Wing {
    pub side: f32,
}

/// Steering for bird `i` from the rest of the flock, before integration.
pub fn steering(flock: &[BoidState], i: usize, config: &BoidConfig) -> Vec3 {
    let me = flock[i];
    let mut separation = Vec3::ZERO;
    let mut heading = Vec3::ZERO;
    let mut center = Vec3::ZERO;
    let mut neighbors = 0;

    for (j, other) in flock.iter().enumerate() {
        if j == i {
            continue;
        }
        let offset = me.position - other.position;
        let distance = offset.length();
        if distance >= config.neighbor_radius {
            continue;
        }
        if distance < config.separation_radius && distance > 1e-4 {
            separation += offset / (distance * distance);
        }
        heading += other.velocity;
        center += other.position;
        neighbors += 1;
    }

    let mut steer = separation * config.separation_weight;
    if neighbors > 0 {
        let n = neighbors as f32;
        steer += (heading / n - me.velocity) * config.alignment_weight * 0.1;
        steer += (center / n - me.position) * config.cohesion_weight * 0.05;
    }

    let from_home = me.position - config.home;
    let overshoot = from_home.length() - config.home_radius;
    if overshoot > 0.0 {
        steer -= from_home.normalize_or_zero() * overshoot * config.bounds_weight;
    }
    steer
}

/// Clamp speed into `[min, max]`, keeping direction. A stalled bird heads +x.
pub fn clamp_speed(velocity: Vec3, min: f32, max: f32) -> Vec3 {
    let speed = velocity.length();
    if speed < 1e-4 {
        return Vec3::X * min;
    }
    velocity * (speed.clamp(min, max) / speed)
}

/// Advance the whole flock by one step. All steering reads the old state.
pub fn step_boids(flock: &mut [BoidState], config: &BoidConfig, delta: f32) {
    let steer: Vec<Vec3> = (0..flock.len()).map(|i| steering(flock, i, config)).collect();
    for (boid, steer) in flock.iter_mut().zip(steer) {
        boid.velocity = clamp_speed(boid.velocity + steer * delta, config.min_speed, config.max_speed);
        boid.position += boid.velocity * delta;
    }
}

/// Initial flock: random points inside the home sphere, random headings.
pub fn seed_flock(config: &BoidConfig) -> Vec<BoidState> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    (0..config.count)
        .map(|_| {
            let angle = rng.gen_range(0.0..TAU);
            let r = rng.gen_range(0.0..config.home_radius * 0.6);
            let y = rng.gen_range(-8.0..8.0);
            let heading = rng.gen_range(0.0..TAU);
            let speed = rng.gen_range(config.min_speed..config.max_speed);
            BoidState {
                position: config.home + Vec3::new(angle.cos() * r, y, angle.sin() * r),
                velocity: Vec3::new(heading.cos(), 0.0, heading.sin()) * speed,
            }
        })
        .collect()
}

/// Wing angle at time `t`.
pub fn wing_angle(t: f32, phase: f32, rate: f32) -> f32 {
    0.6 * (t * rate + phase).sin()
}

fn bird_body() -> MeshData {
    let mut m = MeshData::default();
    let dark = [0.15, 0.15, 0.18, 1.0];
    m.append_transformed(&cuboid(Vec3::new(0.12, 0.1, 0.35), dark), Vec3::ZERO, Quat::IDENTITY, Vec3::ONE);
    m.append_transformed(
        &cuboid(Vec3::new(0.04, 0.03, 0.08), [0.95, 0.7, 0.2, 1.0]),
        Vec3::new(0.0, 0.0, 0.42),
        Quat::IDENTITY,
        Vec3::ONE,
    );
    m
}

/// Wing extending along `+x` from its root at the origin.
fn wing() -> MeshData {
    let mut m = MeshData::default();
    m.append_transformed(
        &cuboid(Vec3::new(0.35, 0.02, 0.15), [0.25, 0.25, 0.3, 1.0]),
        Vec3::new(0.35, 0.0, 0.0),
        Quat::IDENTITY,
        Vec3::ONE,
    );
    m
}

pub(super) fn spawn_flock(
    mut commands: Commands,
    config: Res<BoidConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let body = meshes.add(bird_body().to_flat_mesh());
    let wing_mesh = meshes.add(wing().to_flat_mesh());
    let material = materials.add(StandardMaterial {
        base_color: Color::WHITE,
        perceptual_roughness: 0.9,
        ..default()
    });

    let flock = seed_flock(&config);
    for (i, bird) in flock.iter().enumerate() {
        commands
            .spawn((
                Mesh3d(body.clone()),
                MeshMaterial3d(material.clone()),
                Transform::from_translation(bird.position).looking_to(-bird.velocity, Vec3::Y),
                Boid {
                    velocity: bird.velocity,
                    flap_phase: i as f32 * 0.7,
                },
                Name::new("Bird"),
            ))
            .with_children(|parent| {
                for side in [1.0, -1.0] {
                    parent.spawn((
                        Mesh3d(wing_mesh.clone()),
                        MeshMaterial3d(material.clone()),
                        Transform::from_scale(Vec3::new(side, 1.0, 1.0)),
                        Wing { side },
                    ));
                }
            });
    }
    info!("Spawned {} birds", flock.len());
}

pub(super) fn update_flock(time: Res<Time>, config: Res<BoidConfig>, mut birds: Query<(&mut Transform, &mut Boid)>) {
    let delta = time.delta_secs();
    if delta <= 0.0 {
        return;
    }
    let mut flock: Vec<BoidState> = birds
        .iter()
        .map(|(t, b)| BoidState {
            position: t.translation,
            velocity: b.velocity,
        })
        .collect();
    step_boids(&mut flock, &config, delta);

    // Query iteration order is stable between the two passes.
    for ((mut transform, mut boid), state) in birds.iter_mut().zip(flock) {
        transform.translation = state.position;
        // Beak is on +z.
        transform.look_to(-state.velocity, Vec3::Y);
        boid.velocity = state.velocity;
    }
}

pub(super) fn flap_wings(
    time: Res<Time>,
    config: Res<BoidConfig>,
    birds: Query<(&Boid, &Children)>,
    mut wings: Query<(&mut Transform, &Wing)>,
) {
    let t = time.elapsed_secs();
    for (boid, children) in &birds {
        let angle = wing_angle(t, boid.flap_phase, config.flap_rate);
        for &child in children {
            if let Ok((mut transform, wing)) = wings.get_mut(child) {
                transform.rotation = Quat::from_rotation_z(angle * wing.side);
            }
        }
    }
}
