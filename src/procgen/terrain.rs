//! Island terrain: the height formula and the disc mesh baked from it.
//!
//! The formula is evaluated twice in the life of an island: once per vertex
//! while the mesh is built, and again whenever gameplay asks for the ground
//! under a point. Both go through the same pure function, so they agree.

use super::mesh::MeshData;
use super::noise::trig_noise;

/// Returned for points outside the island footprint.
pub const NO_GROUND: f32 = -10.0;

/// Elevation of the island rim above the world origin.
pub const BASE_ELEVATION: f32 = 2.0;

/// Exponent of the edge falloff curve.
const FALLOFF_POWER: f32 = 2.5;

/// Shift applied to the summed octaves before clamping at zero.
const HILL_BIAS: f32 = 1.2;

/// Outer ring vertices are pulled in by this factor so float error on
/// `cos`/`sin` never pushes them past the footprint.
const RIM_INSET: f32 = 0.999;

/// Octave table: (frequency, seed offset, amplitude).
const OCTAVES: [(f32, u32, f32); 3] = [(0.045, 0, 2.5), (0.11, 101, 1.2), (0.23, 211, 0.45)];

/// Height of the generic island terrain at local `(x, z)`.
///
/// Outside `radius` the result is [`NO_GROUND`].
pub fn terrain_height(x: f32, z: f32, radius: f32, seed: u32) -> f32 {
    let d = (x * x + z * z).sqrt();
    if d > radius {
        return NO_GROUND;
    }

    let raw: f32 = OCTAVES
        .iter()
        .map(|&(freq, offset, amp)| {
            trig_noise(x * freq, z * freq, seed.wrapping_add(offset)) * amp
        })
        .sum();
    let hills = (raw + HILL_BIAS).max(0.0);

    let t = if radius > 0.0 { d / radius } else { 1.0 };
    let falloff = (1.0 - t.powf(FALLOFF_POWER)).clamp(0.0, 1.0);

    BASE_ELEVATION + hills * falloff
}

/// Parameters for baking an island disc.
#[derive(Clone, Copy, Debug)]
pub struct IslandMeshParams {
    pub radius: f32,
    /// Concentric vertex rings between center and rim.
    pub rings: u32,
    /// Vertices per ring.
    pub segments: u32,
    /// Y of the skirt's bottom, below the waterline.
    pub skirt_depth: f32,
}

impl Default for IslandMeshParams {
    fn default() -> Self {
        Self {
            radius: 30.0,
            rings: 12,
            segments: 36,
            skirt_depth: -8.0,
        }
    }
}

/// Build the island top surface plus a rocky skirt hanging under the rim.
///
/// Vertex 0 is the center; ring `r` (1-based) starts at `1 + (r - 1) * segments`.
/// Every top vertex takes its height from `height`, and its color from `color`.
pub fn build_island_mesh(
    params: IslandMeshParams,
    height: impl Fn(f32, f32) -> f32,
    color: impl Fn(f32, f32, f32) -> [f32; 4],
) -> MeshData {
    let rings = params.rings.max(1);
    let segments = params.segments.max(3);
    let mut data = MeshData::default();

    let h0 = height(0.0, 0.0);
    data.push_vertex([0.0, h0, 0.0], color(0.0, 0.0, h0));

    for r in 1..=rings {
        let mut ring_radius = params.radius * r as f32 / rings as f32;
        if r == rings {
            ring_radius *= RIM_INSET;
        }
        // Odd rings are rotated half a step for a less regular facet pattern.
        let phase = if r % 2 == 1 { 0.5 } else { 0.0 };
        for s in 0..segments {
            let angle = (s as f32 + phase) / segments as f32 * std::f32::consts::TAU;
            let x = ring_radius * angle.cos();
            let z = ring_radius * angle.sin();
            let y = height(x, z);
            data.push_vertex([x, y, z], color(x, z, y));
        }
    }

    let ring_start = |r: u32| 1 + (r - 1) * segments;

    for s in 0..segments {
        let cur = ring_start(1) + s;
        let next = ring_start(1) + (s + 1) % segments;
        data.push_triangle(0, next, cur);
    }

    for r in 1..rings {
        let inner = ring_start(r);
        let outer = ring_start(r + 1);
        for s in 0..segments {
            let a0 = inner + s;
            let a1 = inner + (s + 1) % segments;
            let b0 = outer + s;
            let b1 = outer + (s + 1) % segments;
            data.push_triangle(a0, a1, b0);
            data.push_triangle(a1, b1, b0);
        }
    }

    // Skirt: rim -> narrower ring below the waterline -> bottom tip.
    let rim = ring_start(rings);
    let skirt = data.vertex_count();
    let rock = [0.36, 0.31, 0.27, 1.0];
    for s in 0..segments {
        let [x, _, z] = data.positions[(rim + s) as usize];
        let wobble = 0.8 + 0.1 * trig_noise(x * 0.3, z * 0.3, segments);
        data.push_vertex([x * wobble, params.skirt_depth, z * wobble], rock);
    }
    let tip = data.vertex_count();
    data.push_vertex([0.0, params.skirt_depth - params.radius * 0.35, 0.0], rock);

    for s in 0..segments {
        let a0 = rim + s;
        let a1 = rim + (s + 1) % segments;
        let b0 = skirt + s;
        let b1 = skirt + (s + 1) % segments;
        data.push_triangle(a0, a1, b0);
        data.push_triangle(a1, b1, b0);
        data.push_triangle(tip, b0, b1);
    }

    data
}

/// Index of the first top-surface vertex of ring `r` (1-based).
pub fn ring_vertex_index(r: u32, segments: u32) -> usize {
    (1 + (r - 1) * segments) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outside_radius_is_no_ground() {
        assert_eq!(terrain_height(31.0, 0.0, 30.0, 4), NO_GROUND);
        assert_eq!(terrain_height(25.0, 25.0, 30.0, 4), NO_GROUND);
    }

    #[test]
    fn rim_settles_at_base_elevation() {
        let h = terrain_height(30.0, 0.0, 30.0, 9);
        assert!((h - BASE_ELEVATION).abs() < 1e-4);
    }

    #[test]
    fn inside_never_below_base() {
        for i in 0..40 {
            let a = i as f32 * 0.4;
            let h = terrain_height(a.cos() * 12.0, a.sin() * 12.0, 30.0, 77);
            assert!(h >= BASE_ELEVATION);
        }
    }

    #[test]
    fn center_vertex_matches_formula() {
        let params = IslandMeshParams {
            radius: 28.0,
            ..Default::default()
        };
        let mesh = build_island_mesh(
            params,
            |x, z| terrain_height(x, z, 28.0, 1234),
            |_, _, _| [1.0; 4],
        );
        let baked = mesh.positions[0][1];
        assert_eq!(baked.to_bits(), terrain_height(0.0, 0.0, 28.0, 1234).to_bits());
    }

    #[test]
    fn rim_vertices_stay_inside_footprint() {
        let params = IslandMeshParams::default();
        let mesh = build_island_mesh(
            params,
            |x, z| terrain_height(x, z, params.radius, 5),
            |_, _, _| [1.0; 4],
        );
        let start = ring_vertex_index(params.rings, params.segments);
        for v in &mesh.positions[start..start + params.segments as usize] {
            assert!(v[1] > NO_GROUND, "rim vertex fell off the island");
        }
    }

    #[test]
    fn indices_reference_existing_vertices() {
        let mesh = build_island_mesh(
            IslandMeshParams::default(),
            |x, z| terrain_height(x, z, 30.0, 2),
            |_, _, _| [1.0; 4],
        );
        let n = mesh.vertex_count();
        assert!(mesh.indices.iter().all(|&i| i < n));
        assert_eq!(mesh.indices.len() % 3, 0);
    }
}
