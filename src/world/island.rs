//! Islands and the small capability interface each themed variant implements.
//!
//! An [`Island`] owns its footprint (center, radius, seed), its theme and the
//! decorations the theme placed on it. All height queries go through
//! [`Island::height_at_local`], which prefers the theme's override over the
//! generic formula. The baked mesh uses the same path, so the two cannot drift.

use bevy::math::{bounding::Aabb3d, Vec2, Vec3};

use crate::procgen::noise::hash01;
use crate::procgen::terrain::{build_island_mesh, terrain_height, IslandMeshParams, NO_GROUND};
use crate::procgen::MeshData;

/// Which themed variant an island is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IslandKind {
    Hub,
    BasketballArena,
    RacingTrack,
    BoulderingWall,
    AnimeShrine,
    Campus,
    TechShowcase,
}

impl IslandKind {
    pub fn display_name(self) -> &'static str {
        match self {
            IslandKind::Hub => "Central Plaza",
            IslandKind::BasketballArena => "Basketball Arena",
            IslandKind::RacingTrack => "Racing Track",
            IslandKind::BoulderingWall => "Bouldering Wall",
            IslandKind::AnimeShrine => "Anime Shrine",
            IslandKind::Campus => "Campus",
            IslandKind::TechShowcase => "Tech Showcase",
        }
    }

    /// Base grass tint for the island's natural terrain.
    pub fn ground_tint(self) -> [f32; 3] {
        match self {
            IslandKind::Hub => [0.36, 0.58, 0.3],
            IslandKind::BasketballArena => [0.4, 0.6, 0.28],
            IslandKind::RacingTrack => [0.45, 0.6, 0.25],
            IslandKind::BoulderingWall => [0.42, 0.5, 0.32],
            IslandKind::AnimeShrine => [0.38, 0.55, 0.35],
            IslandKind::Campus => [0.3, 0.6, 0.3],
            IslandKind::TechShowcase => [0.34, 0.52, 0.38],
        }
    }
}

/// Foliage palette for a decorative tree.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Foliage {
    Green,
    Blossom,
    Autumn,
}

impl Foliage {
    pub fn color(self) -> [f32; 3] {
        match self {
            Foliage::Green => [0.2, 0.48, 0.2],
            Foliage::Blossom => [0.95, 0.68, 0.78],
            Foliage::Autumn => [0.85, 0.45, 0.15],
        }
    }
}

/// Something a theme places on its island. Positions are island-local.
#[derive(Clone, Debug, PartialEq)]
pub enum Decoration {
    Tree { at: Vec2, height: f32, seed: u32, foliage: Foliage },
    Rock { at: Vec2, size: f32, seed: u32 },
    Boulder { at: Vec2, size: f32, seed: u32 },
    /// Box resting on the ground at `at` (plus `lift`). Solid ones block movement.
    Structure { at: Vec2, half_extents: Vec3, lift: f32, color: [f32; 3], solid: bool },
    /// Basketball hoop; the rim hangs `rim_height` above the ground, offset toward `facing`.
    Hoop { at: Vec2, facing: f32, rim_height: f32 },
    /// Portfolio billboard facing `facing` (yaw, radians).
    Billboard { at: Vec2, facing: f32, title: &'static str, color: [f32; 3] },
    BallSpawn { at: Vec2 },
    KartSpawn { at: Vec2, heading: f32 },
}

/// The per-variant capability interface.
///
/// Themes are composed into islands by the layout builder; they never see
/// world coordinates.
pub trait IslandTheme: Send + Sync {
    fn kind(&self) -> IslandKind;

    /// Custom terrain at `local`, given the generic formula's value there.
    fn height_override(&self, _local: Vec2, _generic: f32) -> Option<f32> {
        None
    }

    /// Built surface (plaza, court, track) at `local`, where no vegetation grows.
    fn paved(&self, _local: Vec2) -> bool {
        false
    }

    /// Decorations to place on an island of this radius and seed.
    fn decorate(&self, radius: f32, seed: u32) -> Vec<Decoration>;

    /// Mesh resolution for the terrain disc.
    fn mesh_params(&self, radius: f32) -> IslandMeshParams {
        IslandMeshParams {
            radius,
            rings: (radius / 2.2).ceil() as u32,
            segments: 40,
            ..Default::default()
        }
    }

    /// Vertex color of the terrain at `local`.
    fn ground_color(&self, local: Vec2, radius: f32, height: f32) -> [f32; 4] {
        natural_ground(self.kind(), local, radius, height)
    }
}

/// Sand at the shoreline, theme-tinted grass elsewhere, slightly jittered.
pub fn natural_ground(kind: IslandKind, local: Vec2, radius: f32, height: f32) -> [f32; 4] {
    let t = local.length() / radius;
    if t > 0.86 {
        return [0.86, 0.8, 0.58, 1.0];
    }
    let [r, g, b] = kind.ground_tint();
    let shade = 0.92 + hash01(local.x, local.y, 3) * 0.14 + (height - 2.0) * 0.02;
    [r * shade, g * shade, b * shade, 1.0]
}

/// A themed terrain patch in the world.
pub struct Island {
    pub name: String,
    pub kind: IslandKind,
    /// World-space center; islands sit at `y = 0`.
    pub center: Vec3,
    pub radius: f32,
    pub seed: u32,
    theme: Box<dyn IslandTheme>,
    decorations: Vec<Decoration>,
}

impl Island {
    pub fn new(name: impl Into<String>, center: Vec2, radius: f32, seed: u32, theme: Box<dyn IslandTheme>) -> Self {
        let decorations = theme.decorate(radius, seed);
        Self {
            name: name.into(),
            kind: theme.kind(),
            center: Vec3::new(center.x, 0.0, center.y),
            radius,
            seed,
            theme,
            decorations,
        }
    }

    pub fn decorations(&self) -> &[Decoration] {
        &self.decorations
    }

    pub fn to_local(&self, x: f32, z: f32) -> Vec2 {
        Vec2::new(x - self.center.x, z - self.center.z)
    }

    pub fn to_world(&self, local: Vec2, y: f32) -> Vec3 {
        Vec3::new(self.center.x + local.x, y, self.center.z + local.y)
    }

    pub fn contains_xz(&self, x: f32, z: f32) -> bool {
        self.to_local(x, z).length() <= self.radius
    }

    /// Effective terrain height at a local point, [`NO_GROUND`] outside.
    pub fn height_at_local(&self, local: Vec2) -> f32 {
        let generic = terrain_height(local.x, local.y, self.radius, self.seed);
        if generic == NO_GROUND {
            return NO_GROUND;
        }
        self.theme.height_override(local, generic).unwrap_or(generic)
    }

    pub fn is_paved(&self, local: Vec2) -> bool {
        self.theme.paved(local)
    }

    /// Effective terrain height under a world point, if the island claims it.
    pub fn height_at_world(&self, x: f32, z: f32) -> Option<f32> {
        let local = self.to_local(x, z);
        if local.length() > self.radius {
            return None;
        }
        Some(self.height_at_local(local))
    }

    /// Bake the terrain disc in island-local space.
    pub fn build_mesh(&self) -> MeshData {
        let params = self.theme.mesh_params(self.radius);
        build_island_mesh(
            params,
            |x, z| self.height_at_local(Vec2::new(x, z)),
            |x, z, y| self.theme.ground_color(Vec2::new(x, z), self.radius, y),
        )
    }

    /// Largest disagreement between baked top-surface vertices and a fresh query.
    ///
    /// Zero unless the mesh was baked from a different radius, seed or override.
    pub fn mesh_consistency_error(&self, mesh: &MeshData) -> f32 {
        let params = self.theme.mesh_params(self.radius);
        let top_vertices = 1 + (params.rings * params.segments) as usize;
        mesh.positions
            .iter()
            .take(top_vertices)
            .map(|p| (p[1] - self.height_at_local(Vec2::new(p[0], p[2]))).abs())
            .fold(0.0, f32::max)
    }

    /// World-space boxes of the solid structures on this island.
    pub fn obstacle_bounds(&self) -> Vec<Aabb3d> {
        self.decorations
            .iter()
            .filter_map(|d| match d {
                Decoration::Structure { at, half_extents, lift, solid: true, .. } => {
                    let ground = self.height_at_local(*at);
                    let center = self.to_world(*at, ground + lift + half_extents.y);
                    Some(Aabb3d::new(center, *half_extents))
                }
                _ => None,
            })
            .collect()
    }
}

impl std::fmt::Debug for Island {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Island")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("center", &self.center)
            .field("radius", &self.radius)
            .field("seed", &self.seed)
            .finish()
    }
}
