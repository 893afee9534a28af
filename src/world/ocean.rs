//! Animated low-poly ocean.
//!
//! A flat-shaded grid centered on the origin. Vertex heights are rewritten on
//! the CPU every frame from [`wave_height`] and facet normals recomputed, which
//! keeps the faceted look without a custom shader.

use bevy::prelude::*;
use bevy::render::mesh::VertexAttributeValues;

use crate::procgen::MeshData;

/// Configuration for ocean appearance and motion.
#[derive(Resource, Clone)]
pub struct OceanConfig {
    /// Edge length of the square grid.
    pub size: f32,
    /// Cells per side.
    pub subdivisions: u32,
    /// Amplitude of the primary swell.
    pub amplitude: f32,
    /// Wavelength of the primary swell.
    pub wavelength: f32,
    /// Phase speed in radians per second.
    pub speed: f32,
    pub color: Color,
}

impl Default for OceanConfig {
    fn default() -> Self {
        Self {
            size: 900.0,
            subdivisions: 90,
            amplitude: 0.35,
            wavelength: 18.0,
            speed: 0.9,
            color: Color::srgb(0.16, 0.42, 0.62),
        }
    }
}

/// Marker for the ocean surface entity.
#[derive(Component)]
pub struct OceanSurface;

/// Wave offset from the rest level at `(x, z)` and time `t`.
///
/// Two travelling sinusoids at different headings, so crests never line up
/// into a single grid-aligned pattern.
pub fn wave_height(x: f32, z: f32, t: f32, config: &OceanConfig) -> f32 {
    let k = std::f32::consts::TAU / config.wavelength.max(0.01);
    let primary = (x * k + t * config.speed).sin() * (z * k * 0.7 + t * config.speed * 0.6).cos();
    let chop = ((x * 0.6 + z) * k * 1.9 - t * config.speed * 1.4).sin();
    config.amplitude * (primary * 0.75 + chop * 0.25)
}

/// Flat grid in the entity's local frame, `y = 0` everywhere.
pub fn ocean_grid(config: &OceanConfig) -> MeshData {
    let n = config.subdivisions.max(1);
    let step = config.size / n as f32;
    let half = config.size * 0.5;
    let tint = config.color.to_srgba();
    let color = [tint.red, tint.green, tint.blue, 1.0];

    let mut m = MeshData::default();
    for j in 0..=n {
        for i in 0..=n {
            m.push_vertex([-half + i as f32 * step, 0.0, -half + j as f32 * step], color);
        }
    }
    let row = n + 1;
    for j in 0..n {
        for i in 0..n {
            let a = j * row + i;
            let b = a + 1;
            let c = a + row;
            let d = c + 1;
            m.push_triangle(a, c, b);
            m.push_triangle(b, c, d);
        }
    }
    m
}

pub(super) fn spawn_ocean(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    config: &OceanConfig,
    level: f32,
) {
    let material = materials.add(StandardMaterial {
        base_color: Color::WHITE,
        perceptual_roughness: 0.35,
        reflectance: 0.6,
        ..default()
    });
    let mesh = ocean_grid(config);
    let vertex_count = mesh.vertex_count();
    commands.spawn((
        Mesh3d(meshes.add(mesh.to_flat_mesh())),
        MeshMaterial3d(material),
        Transform::from_xyz(0.0, level, 0.0),
        OceanSurface,
        Name::new("Ocean"),
    ));
    info!("Ocean spawned at level {:.1} ({} grid vertices)", level, vertex_count);
}

/// Rewrite ocean vertex heights for the current time.
pub fn animate_ocean(
    time: Res<Time>,
    config: Res<OceanConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    query: Query<&Mesh3d, With<OceanSurface>>,
) {
    let t = time.elapsed_secs();
    for handle in &query {
        let Some(mesh) = meshes.get_mut(&handle.0) else {
            continue;
        };
        if let Some(VertexAttributeValues::Float32x3(positions)) = mesh.attribute_mut(Mesh::ATTRIBUTE_POSITION) {
            for p in positions.iter_mut() {
                p[1] = wave_height(p[0], p[2], t, &config);
            }
        }
        mesh.compute_flat_normals();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waves_stay_within_amplitude() {
        let config = OceanConfig::default();
        for i in 0..200 {
            let x = i as f32 * 3.7 - 300.0;
            let z = i as f32 * -2.3 + 100.0;
            let h = wave_height(x, z, i as f32 * 0.1, &config);
            assert!(h.abs() <= config.amplitude + 1e-5);
        }
    }

    #[test]
    fn waves_move_over_time() {
        let config = OceanConfig::default();
        assert_ne!(wave_height(10.0, 5.0, 0.0, &config), wave_height(10.0, 5.0, 1.0, &config));
    }

    #[test]
    fn grid_covers_configured_extent() {
        let config = OceanConfig {
            size: 100.0,
            subdivisions: 10,
            ..default()
        };
        let grid = ocean_grid(&config);
        assert_eq!(grid.vertex_count(), 121);
        assert_eq!(grid.triangle_count(), 200);
        let (lo, hi) = grid.extents().unwrap();
        assert_eq!(lo.x, -50.0);
        assert_eq!(hi.z, 50.0);
    }

    #[test]
    fn grid_faces_up() {
        let config = OceanConfig {
            size: 10.0,
            subdivisions: 2,
            ..default()
        };
        for [a, b, c] in ocean_grid(&config).triangles() {
            assert!((b - a).cross(c - a).y > 0.0);
        }
    }
}
