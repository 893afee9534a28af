//! Low-poly prop geometry: rocks, boulders, trees and the primitives
//! they are assembled from.
//!
//! Everything here is a pure function of its arguments. Jitter comes from
//! [`hash01`], never from a global RNG, so a seed always yields the same shape.

use std::f32::consts::{PI, TAU};

use bevy::math::{Quat, Vec3};

use super::mesh::MeshData;
use super::noise::hash01;

/// Axis-aligned box centered on the origin.
pub fn cuboid(half: Vec3, color: [f32; 4]) -> MeshData {
    let mut m = MeshData::default();
    for i in 0..8u32 {
        let x = if i & 1 != 0 { half.x } else { -half.x };
        let y = if i & 2 != 0 { half.y } else { -half.y };
        let z = if i & 4 != 0 { half.z } else { -half.z };
        m.push_vertex([x, y, z], color);
    }
    const FACES: [[u32; 6]; 6] = [
        [1, 3, 7, 1, 7, 5], // +x
        [0, 4, 6, 0, 6, 2], // -x
        [2, 6, 7, 2, 7, 3], // +y
        [0, 1, 5, 0, 5, 4], // -y
        [4, 5, 7, 4, 7, 6], // +z
        [0, 2, 3, 0, 3, 1], // -z
    ];
    for face in FACES {
        m.indices.extend_from_slice(&face);
    }
    m
}

/// Cone standing on the origin with its apex at `height`.
pub fn cone(radius: f32, height: f32, segments: u32, color: [f32; 4]) -> MeshData {
    let segments = segments.max(3);
    let mut m = MeshData::default();
    let apex = m.push_vertex([0.0, height, 0.0], color);
    let base = m.push_vertex([0.0, 0.0, 0.0], color);
    let ring = m.vertex_count();
    for s in 0..segments {
        let a = s as f32 / segments as f32 * TAU;
        m.push_vertex([radius * a.cos(), 0.0, radius * a.sin()], color);
    }
    for s in 0..segments {
        let cur = ring + s;
        let next = ring + (s + 1) % segments;
        m.push_triangle(apex, next, cur);
        m.push_triangle(base, cur, next);
    }
    m
}

/// Open-bottomed prism (a faceted cylinder) from `y = 0` to `y = height`.
pub fn prism(radius: f32, height: f32, segments: u32, color: [f32; 4]) -> MeshData {
    let segments = segments.max(3);
    let mut m = MeshData::default();
    let top_center = m.push_vertex([0.0, height, 0.0], color);
    let top = m.vertex_count();
    for s in 0..segments {
        let a = s as f32 / segments as f32 * TAU;
        m.push_vertex([radius * a.cos(), height, radius * a.sin()], color);
    }
    let bottom = m.vertex_count();
    for s in 0..segments {
        let a = s as f32 / segments as f32 * TAU;
        m.push_vertex([radius * a.cos(), 0.0, radius * a.sin()], color);
    }
    for s in 0..segments {
        let a0 = top + s;
        let a1 = top + (s + 1) % segments;
        let b0 = bottom + s;
        let b1 = bottom + (s + 1) % segments;
        m.push_triangle(a0, a1, b0);
        m.push_triangle(a1, b1, b0);
        m.push_triangle(top_center, a1, a0);
    }
    m
}

/// UV sphere whose vertices are pushed in or out by up to `jitter * radius`.
pub fn jittered_sphere(
    radius: f32,
    bands: u32,
    segments: u32,
    jitter: f32,
    seed: u32,
    color: [f32; 4],
) -> MeshData {
    let bands = bands.max(2);
    let segments = segments.max(3);
    let mut m = MeshData::default();

    let scale_at = |i: u32, j: u32| 1.0 + (hash01(i as f32, j as f32, seed) - 0.5) * 2.0 * jitter;

    let top = m.push_vertex([0.0, radius * scale_at(0, 0), 0.0], color);
    for i in 1..bands {
        let phi = i as f32 / bands as f32 * PI;
        for j in 0..segments {
            let theta = j as f32 / segments as f32 * TAU;
            let r = radius * scale_at(i, j);
            m.push_vertex(
                [r * phi.sin() * theta.cos(), r * phi.cos(), r * phi.sin() * theta.sin()],
                color,
            );
        }
    }
    let bottom = m.push_vertex([0.0, -radius * scale_at(bands, 0), 0.0], color);

    let ring = |i: u32| 1 + (i - 1) * segments;
    for j in 0..segments {
        let cur = ring(1) + j;
        let next = ring(1) + (j + 1) % segments;
        m.push_triangle(top, next, cur);
    }
    for i in 1..bands - 1 {
        for j in 0..segments {
            let a0 = ring(i) + j;
            let a1 = ring(i) + (j + 1) % segments;
            let b0 = ring(i + 1) + j;
            let b1 = ring(i + 1) + (j + 1) % segments;
            m.push_triangle(a0, a1, b0);
            m.push_triangle(a1, b1, b0);
        }
    }
    for j in 0..segments {
        let cur = ring(bands - 1) + j;
        let next = ring(bands - 1) + (j + 1) % segments;
        m.push_triangle(bottom, cur, next);
    }
    m
}

/// Small squat rock.
pub fn rock(size: f32, seed: u32) -> MeshData {
    let grey = 0.42 + hash01(size, 1.0, seed) * 0.15;
    let mut m = jittered_sphere(size, 3, 5, 0.3, seed, [grey, grey * 0.97, grey * 0.92, 1.0]);
    for p in &mut m.positions {
        p[1] *= 0.6;
    }
    m
}

/// Climbing-grade boulder: bigger, rounder, with a flat base.
pub fn boulder(size: f32, seed: u32) -> MeshData {
    let mut m = jittered_sphere(size, 4, 7, 0.22, seed, [0.55, 0.52, 0.48, 1.0]);
    let floor = -size * 0.35;
    for p in &mut m.positions {
        p[1] = p[1].max(floor) - floor;
    }
    m
}

/// Trunk plus stacked foliage cones tinted around `foliage`.
pub fn tree(height: f32, seed: u32, foliage: [f32; 3]) -> MeshData {
    let trunk_height = height * 0.35;
    let mut m = prism(height * 0.06, trunk_height, 5, [0.4, 0.27, 0.16, 1.0]);

    let tiers = 2 + (hash01(height, 3.0, seed) * 2.0) as u32;
    let tint = 0.9 + hash01(height, 5.0, seed) * 0.2;
    let foliage_height = height - trunk_height * 0.7;
    for tier in 0..tiers {
        let t = tier as f32 / tiers as f32;
        let radius = height * (0.32 - t * 0.12);
        let cone_height = foliage_height * (0.55 - t * 0.1);
        let y = trunk_height * 0.7 + foliage_height * t * 0.55;
        let spin = Quat::from_rotation_y(hash01(tier as f32, height, seed) * TAU);
        let lift = 1.0 + t * 0.12;
        let shade = [
            foliage[0] * tint * lift,
            foliage[1] * tint * lift,
            foliage[2] * tint * lift,
            1.0,
        ];
        m.append_transformed(&cone(radius, cone_height, 6, shade), Vec3::new(0.0, y, 0.0), spin, Vec3::ONE);
    }
    m
}

#[cfg(test)]
mod tests {
    use super::*;

    fn closed(m: &MeshData) -> bool {
        let n = m.vertex_count();
        m.indices.len() % 3 == 0 && m.indices.iter().all(|&i| i < n)
    }

    #[test]
    fn primitives_are_well_formed() {
        assert!(closed(&cuboid(Vec3::ONE, [1.0; 4])));
        assert!(closed(&cone(1.0, 2.0, 6, [1.0; 4])));
        assert!(closed(&prism(1.0, 2.0, 6, [1.0; 4])));
        assert!(closed(&jittered_sphere(1.0, 4, 6, 0.2, 3, [1.0; 4])));
        assert!(closed(&tree(6.0, 8, [0.2, 0.5, 0.2])));
    }

    #[test]
    fn shapes_are_deterministic() {
        assert_eq!(rock(1.5, 42).positions, rock(1.5, 42).positions);
        assert_eq!(tree(7.0, 3, [0.9, 0.6, 0.7]).positions, tree(7.0, 3, [0.9, 0.6, 0.7]).positions);
    }

    #[test]
    fn boulder_rests_on_origin() {
        let (lo, _) = boulder(2.0, 11).extents().unwrap();
        assert!(lo.y.abs() < 1e-5);
    }

    #[test]
    fn cuboid_faces_point_outward() {
        let m = cuboid(Vec3::ONE, [1.0; 4]);
        for [a, b, c] in m.triangles() {
            let normal = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(normal.dot(centroid) > 0.0);
        }
    }
}
