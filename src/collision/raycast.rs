//! Vertical rays against registered triangle soups (bridge decks).

use bevy::math::bounding::Aabb3d;
use bevy::math::{Vec3, Vec3A};
use smallvec::SmallVec;

use crate::procgen::MeshData;

/// World-space triangles with a bounding box for quick rejection.
#[derive(Clone, Debug)]
pub struct CollisionMesh {
    triangles: Vec<[Vec3; 3]>,
    bounds: Aabb3d,
}

impl CollisionMesh {
    /// Copy the triangles of a world-space mesh. Returns `None` for empty meshes.
    pub fn from_mesh_data(mesh: &MeshData) -> Option<Self> {
        let (lo, hi) = mesh.extents()?;
        let triangles: Vec<[Vec3; 3]> = mesh.triangles().collect();
        if triangles.is_empty() {
            return None;
        }
        Some(Self {
            triangles,
            bounds: Aabb3d {
                min: Vec3A::from(lo),
                max: Vec3A::from(hi),
            },
        })
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    fn covers_xz(&self, x: f32, z: f32) -> bool {
        x >= self.bounds.min.x && x <= self.bounds.max.x && z >= self.bounds.min.z && z <= self.bounds.max.z
    }

    /// Heights where a vertical line at `(x, z)` crosses this mesh.
    pub fn hits(&self, x: f32, z: f32) -> SmallVec<[f32; 4]> {
        if !self.covers_xz(x, z) {
            return SmallVec::new();
        }
        self.triangles
            .iter()
            .filter_map(|tri| vertical_hit(tri, x, z))
            .collect()
    }
}

/// Height of the triangle at `(x, z)` if the point lies over it.
pub fn vertical_hit(tri: &[Vec3; 3], x: f32, z: f32) -> Option<f32> {
    const EDGE_EPSILON: f32 = 1e-5;
    let [a, b, c] = tri;
    let denom = (b.z - c.z) * (a.x - c.x) + (c.x - b.x) * (a.z - c.z);
    if denom.abs() < 1e-8 {
        return None;
    }
    let w1 = ((b.z - c.z) * (x - c.x) + (c.x - b.x) * (z - c.z)) / denom;
    let w2 = ((c.z - a.z) * (x - c.x) + (a.x - c.x) * (z - c.z)) / denom;
    let w3 = 1.0 - w1 - w2;
    if w1 < -EDGE_EPSILON || w2 < -EDGE_EPSILON || w3 < -EDGE_EPSILON {
        return None;
    }
    Some(w1 * a.y + w2 * b.y + w3 * c.y)
}

/// Highest hit across `meshes` that is not above `max_y`.
pub fn highest_hit_below<'a>(meshes: impl IntoIterator<Item = &'a CollisionMesh>, x: f32, z: f32, max_y: f32) -> Option<f32> {
    meshes
        .into_iter()
        .flat_map(|m| m.hits(x, z))
        .filter(|&y| y <= max_y)
        .reduce(f32::max)
}
