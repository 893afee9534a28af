//! Engine-independent triangle soup used by every procedural shape.
//!
//! Geometry is generated as plain arrays so it can be tested without a
//! render world, then converted to a flat-shaded Bevy [`Mesh`] at spawn time.

use bevy::{
    math::{Quat, Vec3},
    render::{
        mesh::{Indices, Mesh, PrimitiveTopology},
        render_asset::RenderAssetUsages,
    },
};

/// Indexed triangle list with per-vertex colors.
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub colors: Vec<[f32; 4]>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> u32 {
        self.positions.len() as u32
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Append a vertex, returning its index.
    pub fn push_vertex(&mut self, position: [f32; 3], color: [f32; 4]) -> u32 {
        self.positions.push(position);
        self.colors.push(color);
        self.vertex_count() - 1
    }

    /// Append a triangle. Counter-clockwise winding faces the viewer.
    pub fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    /// Append `other` after rotating, scaling and translating it.
    pub fn append_transformed(&mut self, other: &MeshData, translation: Vec3, rotation: Quat, scale: Vec3) {
        let base = self.vertex_count();
        for (p, c) in other.positions.iter().zip(&other.colors) {
            let v = rotation * (Vec3::from(*p) * scale) + translation;
            self.push_vertex(v.to_array(), *c);
        }
        self.indices.extend(other.indices.iter().map(|i| i + base));
    }

    /// Iterate triangles as vertex triples.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).map(|tri| {
            [
                Vec3::from(self.positions[tri[0] as usize]),
                Vec3::from(self.positions[tri[1] as usize]),
                Vec3::from(self.positions[tri[2] as usize]),
            ]
        })
    }

    /// Lowest and highest corner of the vertex cloud.
    pub fn extents(&self) -> Option<(Vec3, Vec3)> {
        let mut iter = self.positions.iter().map(|p| Vec3::from(*p));
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p))))
    }

    /// Convert to a faceted Bevy mesh (vertices split per triangle).
    ///
    /// Positions stay writable in the main world so animated surfaces
    /// (the ocean) can be edited in place.
    pub fn to_flat_mesh(&self) -> Mesh {
        Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default())
            .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, self.positions.clone())
            .with_inserted_attribute(Mesh::ATTRIBUTE_COLOR, self.colors.clone())
            .with_inserted_indices(Indices::U32(self.indices.clone()))
            .with_duplicated_vertices()
            .with_computed_flat_normals()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_triangle() -> MeshData {
        let mut m = MeshData::default();
        let a = m.push_vertex([0.0, 0.0, 0.0], [1.0; 4]);
        let b = m.push_vertex([0.0, 0.0, 1.0], [1.0; 4]);
        let c = m.push_vertex([1.0, 0.0, 0.0], [1.0; 4]);
        m.push_triangle(a, b, c);
        m
    }

    #[test]
    fn append_offsets_indices() {
        let mut m = unit_triangle();
        m.append_transformed(&unit_triangle(), Vec3::Y, Quat::IDENTITY, Vec3::ONE);
        assert_eq!(m.indices, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(m.positions[3], [0.0, 1.0, 0.0]);
    }

    #[test]
    fn extents_cover_all_vertices() {
        let (lo, hi) = unit_triangle().extents().unwrap();
        assert_eq!(lo, Vec3::ZERO);
        assert_eq!(hi, Vec3::new(1.0, 0.0, 1.0));
    }

    #[test]
    fn empty_mesh_has_no_extents() {
        assert!(MeshData::default().extents().is_none());
    }
}
