//! Grass tufts on the islands, swaying in Perlin-noise gusts.

use std::f32::consts::{PI, TAU};

use bevy::math::bounding::Aabb3d;
use bevy::prelude::*;
use noise::{NoiseFn, Perlin};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::procgen::MeshData;
use crate::world::island::Island;
use crate::world::layout::Archipelago;

/// Grass tunables.
#[derive(Resource, Clone, Debug)]
pub struct GrassConfig {
    pub tufts_per_island: usize,
    pub seed: u64,
    /// Tufts stay inside this fraction of the island radius, off the beach.
    pub coverage: f32,
    pub blade_height: f32,
    /// Peak lean, radians.
    pub sway_amplitude: f32,
    /// Spatial frequency of the gust field.
    pub gust_scale: f64,
    /// How fast gusts travel across the field.
    pub gust_speed: f64,
}

impl Default for GrassConfig {
    fn default() -> Self {
        Self {
            tufts_per_island: 80,
            seed: 2024,
            coverage: 0.82,
            blade_height: 0.7,
            sway_amplitude: 0.22,
            gust_scale: 0.06,
            gust_speed: 0.5,
        }
    }
}

/// Shared gust noise.
#[derive(Resource)]
pub struct GustField(pub Perlin);

impl FromWorld for GustField {
    fn from_world(world: &mut World) -> Self {
        let seed = world.get_resource::<GrassConfig>().map_or(0, |c| c.seed as u32);
        Self(Perlin::new(seed))
    }
}

/// A tuft rooted at its `Transform` translation.
#[derive(Component, Debug)]
pub struct GrassTuft {
    /// Resting yaw, radians.
    pub yaw: f32,
}

/// World-space tuft roots on one island, skipping paved ground and solid structures.
pub fn scatter_tufts(island: &Island, count: usize, coverage: f32, seed: u64) -> Vec<Vec3> {
    let mut rng = StdRng::seed_from_u64(seed ^ u64::from(island.seed).wrapping_mul(0x9E37_79B9));
    let blocked = island.obstacle_bounds();
    let reach = island.radius * coverage;
    let mut roots = Vec::with_capacity(count);
    for _ in 0..count {
        let angle = rng.gen_range(0.0..TAU);
        // sqrt keeps the density uniform over the disc.
        let r = reach * rng.gen::<f32>().sqrt();
        let local = Vec2::new(angle.cos(), angle.sin()) * r;
        if island.is_paved(local) {
            continue;
        }
        let root = island.to_world(local, island.height_at_local(local));
        if blocked.iter().any(|b| inside_footprint(b, root)) {
            continue;
        }
        roots.push(root);
    }
    roots
}

fn inside_footprint(bounds: &Aabb3d, p: Vec3) -> bool {
    p.x >= bounds.min.x && p.x <= bounds.max.x && p.z >= bounds.min.z && p.z <= bounds.max.z
}

/// Gust strength in roughly `[-1, 1]` at a point and time.
pub fn gust(field: &Perlin, x: f32, z: f32, t: f32, config: &GrassConfig) -> f32 {
    let drift = f64::from(t) * config.gust_speed;
    field.get([f64::from(x) * config.gust_scale + drift, f64::from(z) * config.gust_scale]) as f32
}

/// Lean for a gust. Tufts tip toward +x, never past `amplitude`.
pub fn sway_rotation(gust: f32, yaw: f32, amplitude: f32) -> Quat {
    let lean = (gust.clamp(-1.0, 1.0) * 0.5 + 0.5) * amplitude;
    Quat::from_rotation_z(-lean) * Quat::from_rotation_y(yaw)
}

/// Three crossed blades. Drawn double-sided.
pub fn tuft_mesh(height: f32) -> MeshData {
    let mut m = MeshData::default();
    let root = [0.25, 0.5, 0.2, 1.0];
    let tip = [0.55, 0.8, 0.35, 1.0];
    for i in 0..3 {
        let a = i as f32 / 3.0 * PI;
        let (s, c) = a.sin_cos();
        let w = 0.09;
        let l = m.push_vertex([-c * w, 0.0, -s * w], root);
        let r = m.push_vertex([c * w, 0.0, s * w], root);
        let t = m.push_vertex([c * 0.05, height, s * 0.05], tip);
        m.push_triangle(l, r, t);
    }
    m
}

pub(super) fn spawn_grass(
    mut commands: Commands,
    archipelago: Option<Res<Archipelago>>,
    config: Res<GrassConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let Some(archipelago) = archipelago else {
        return;
    };
    let mesh = meshes.add(tuft_mesh(config.blade_height).to_flat_mesh());
    let material = materials.add(StandardMaterial {
        base_color: Color::WHITE,
        perceptual_roughness: 0.9,
        double_sided: true,
        cull_mode: None,
        ..default()
    });

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut total = 0;
    for island in archipelago.scan_order() {
        for root in scatter_tufts(island, config.tufts_per_island, config.coverage, config.seed) {
            let yaw = rng.gen_range(0.0..TAU);
            commands.spawn((
                Mesh3d(mesh.clone()),
                MeshMaterial3d(material.clone()),
                Transform::from_translation(root)
                    .with_rotation(Quat::from_rotation_y(yaw))
                    .with_scale(Vec3::splat(rng.gen_range(0.7..1.3))),
                GrassTuft { yaw },
            ));
            total += 1;
        }
    }
    info!("Scattered {} grass tufts", total);
}

pub(super) fn sway_grass(
    time: Res<Time>,
    config: Res<GrassConfig>,
    field: Res<GustField>,
    mut tufts: Query<(&mut Transform, &GrassTuft)>,
) {
    let t = time.elapsed_secs();
    for (mut transform, tuft) in &mut tufts {
        let p = transform.translation;
        let strength = gust(&field.0, p.x, p.z, t, &config);
        transform.rotation = sway_rotation(strength, tuft.yaw, config.sway_amplitude);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::layout::default_roster;
    use crate::world::WorldConfig;

    fn archipelago() -> Archipelago {
        Archipelago::generate(&WorldConfig::default(), default_roster()).unwrap()
    }

    #[test]
    fn tufts_sit_on_their_island() {
        let world = archipelago();
        let island = &world.islands[0];
        let roots = scatter_tufts(island, 60, 0.82, 1);
        assert!(!roots.is_empty());
        for root in roots {
            assert!(island.contains_xz(root.x, root.z));
            let ground = island.height_at_world(root.x, root.z).unwrap();
            assert!((root.y - ground).abs() < 1e-4);
        }
    }

    #[test]
    fn scatter_is_deterministic() {
        let world = archipelago();
        let a = scatter_tufts(&world.hub, 40, 0.82, 7);
        let b = scatter_tufts(&world.hub, 40, 0.82, 7);
        assert_eq!(a, b);
    }

    #[test]
    fn tufts_avoid_structures() {
        let world = archipelago();
        for island in world.scan_order() {
            let blocked = island.obstacle_bounds();
            for root in scatter_tufts(island, 120, 0.82, 3) {
                assert!(!blocked.iter().any(|b| inside_footprint(b, root)));
            }
        }
    }

    #[test]
    fn tufts_stay_off_paved_ground() {
        let world = archipelago();
        for island in world.scan_order() {
            for root in scatter_tufts(island, 200, 0.82, 11) {
                assert!(!island.is_paved(island.to_local(root.x, root.z)), "tuft on {} paving", island.name);
            }
        }
        // The campus lawn is level but still grass.
        let campus = &world.islands[4];
        let on_lawn = scatter_tufts(campus, 200, 0.82, 11)
            .iter()
            .map(|r| campus.to_local(r.x, r.z))
            .filter(|l| l.x.abs() < 12.0 && l.y.abs() < 9.0)
            .count();
        assert!(on_lawn > 0);
    }

    #[test]
    fn lean_is_bounded() {
        let config = GrassConfig::default();
        let field = Perlin::new(5);
        for i in 0..40 {
            let g = gust(&field, i as f32 * 3.1, i as f32 * 1.7, i as f32 * 0.2, &config);
            let rotation = sway_rotation(g, 0.0, config.sway_amplitude);
            let up = rotation * Vec3::Y;
            assert!(up.angle_between(Vec3::Y) <= config.sway_amplitude + 1e-4);
        }
    }
}
