//! Collision management: terrain-following ground queries, bridge-deck
//! raycasts and solid-structure blocking.
//!
//! The [`CollisionRegistry`] is filled once while the world is built and is
//! append-only afterwards. Queries borrow it together with the
//! [`Archipelago`] through a [`CollisionWorld`].

use bevy::ecs::system::SystemParam;
use bevy::math::bounding::Aabb3d;
use bevy::prelude::*;

pub mod bounds;
pub mod raycast;
pub mod resolve;

pub use raycast::CollisionMesh;
pub use resolve::{resolve, CollisionRequest, Resolution};

use crate::world::layout::Archipelago;
use crate::FrameSet;

pub struct CollisionPlugin;

impl Plugin for CollisionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CollisionConfig>()
            .init_resource::<CollisionRegistry>()
            .add_systems(Update, resolve_proposed_moves.in_set(FrameSet::Collision));
    }
}

/// Tunables for avatar ground following.
#[derive(Resource, Clone, Debug)]
pub struct CollisionConfig {
    /// Height of the avatar's origin above the ground it stands on.
    pub ground_offset: f32,
    /// Distance above standing height that still counts as landed.
    pub snap_tolerance: f32,
    pub avatar_radius: f32,
    pub avatar_half_height: f32,
    pub ocean_level: f32,
    /// Safety floor distance above the ocean.
    pub floor_margin: f32,
    /// How far above the current position deck raycasts start.
    pub probe_headroom: f32,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            ground_offset: 1.0,
            snap_tolerance: 0.1,
            avatar_radius: 0.4,
            avatar_half_height: 0.9,
            ocean_level: -1.0,
            floor_margin: 3.0,
            probe_headroom: 10.0,
        }
    }
}

impl CollisionConfig {
    /// Nothing resolved by the collision manager ends up below this.
    pub fn safety_floor(&self) -> f32 {
        self.ocean_level + self.floor_margin
    }
}

/// Registered collision geometry. Append-only.
#[derive(Resource, Default, Clone, Debug)]
pub struct CollisionRegistry {
    meshes: Vec<CollisionMesh>,
    obstacles: Vec<Aabb3d>,
}

impl CollisionRegistry {
    /// Bridge decks and island structures of a freshly built archipelago.
    pub fn from_archipelago(archipelago: &Archipelago) -> Self {
        let mut registry = Self::default();
        registry.register_archipelago(archipelago);
        registry
    }

    pub fn register_archipelago(&mut self, archipelago: &Archipelago) {
        for span in archipelago.bridges() {
            if let Some(mesh) = CollisionMesh::from_mesh_data(&span.deck_surface()) {
                self.register_mesh(mesh);
            }
        }
        for island in archipelago.scan_order() {
            self.obstacles.extend(island.obstacle_bounds());
        }
    }

    pub fn register_mesh(&mut self, mesh: CollisionMesh) {
        self.meshes.push(mesh);
    }

    pub fn register_obstacle(&mut self, bounds: Aabb3d) {
        self.obstacles.push(bounds);
    }

    pub fn meshes(&self) -> &[CollisionMesh] {
        &self.meshes
    }

    pub fn obstacles(&self) -> &[Aabb3d] {
        &self.obstacles
    }
}

/// Borrowed view used by every ground query.
#[derive(Clone, Copy)]
pub struct CollisionWorld<'a> {
    pub archipelago: &'a Archipelago,
    pub registry: &'a CollisionRegistry,
}

impl<'a> CollisionWorld<'a> {
    pub fn new(archipelago: &'a Archipelago, registry: &'a CollisionRegistry) -> Self {
        Self { archipelago, registry }
    }

    /// Ground height under `(x, z)`: the first island containing the point,
    /// otherwise the highest registered surface not above `ceiling`.
    pub fn ground_at(&self, x: f32, z: f32, ceiling: f32) -> Option<f32> {
        self.archipelago
            .ground_height(x, z)
            .or_else(|| raycast::highest_hit_below(self.registry.meshes(), x, z, ceiling))
    }
}

/// System parameter bundling everything a ground query needs.
#[derive(SystemParam)]
pub struct Collision<'w> {
    archipelago: Option<Res<'w, Archipelago>>,
    registry: Res<'w, CollisionRegistry>,
    pub config: Res<'w, CollisionConfig>,
}

impl Collision<'_> {
    pub fn world(&self) -> Option<CollisionWorld<'_>> {
        let archipelago = self.archipelago.as_deref()?;
        Some(CollisionWorld::new(archipelago, &self.registry))
    }
}

/// Movement an entity wants to make this frame, and the corrected outcome.
#[derive(Component, Default, Debug)]
pub struct ProposedMove {
    pub candidate: Option<Vec3>,
    pub vertical_velocity: f32,
    pub resolution: Option<Resolution>,
}

fn resolve_proposed_moves(collision: Collision, mut movers: Query<(&Transform, &mut ProposedMove)>) {
    let Some(world) = collision.world() else {
        return;
    };
    for (transform, mut proposal) in &mut movers {
        let Some(candidate) = proposal.candidate.take() else {
            continue;
        };
        let request = CollisionRequest {
            current: transform.translation,
            candidate,
            vertical_velocity: proposal.vertical_velocity,
        };
        proposal.resolution = Some(resolve(&world, &collision.config, &request));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::layout::default_roster;
    use crate::world::WorldConfig;

    #[test]
    fn registry_collects_decks_and_structures() {
        let archipelago = Archipelago::generate(&WorldConfig::default(), default_roster()).unwrap();
        let registry = CollisionRegistry::from_archipelago(&archipelago);
        assert_eq!(registry.meshes().len(), archipelago.bridges().count());
        let expected: usize = archipelago.scan_order().map(|i| i.obstacle_bounds().len()).sum();
        assert_eq!(registry.obstacles().len(), expected);
        assert!(expected > 0);
    }

    #[test]
    fn safety_floor_tracks_ocean() {
        let config = CollisionConfig {
            ocean_level: 4.0,
            ..default()
        };
        assert_eq!(config.safety_floor(), 7.0);
    }
}
