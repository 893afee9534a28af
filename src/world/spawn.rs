//! Turns the generated archipelago into entities.
//!
//! Static props on an island (trees, rocks, boulders, structures) are merged
//! into one vertex-coloured mesh per island. Billboards get their own entity
//! so the HUD can find them; hoops and prop spawns are left to the
//! interaction plugin.

use bevy::pbr::CascadeShadowConfigBuilder;
use bevy::prelude::*;

use super::bridges::{BridgeGlow, BridgeSpan};
use super::island::{Decoration, Island};
use super::layout::Archipelago;
use crate::procgen::shapes::{boulder, cuboid, rock, tree};
use crate::procgen::MeshData;

/// Portfolio billboard; the HUD shows `title` when the player is near.
#[derive(Component)]
pub struct Billboard {
    pub title: &'static str,
    /// World position of the panel center.
    pub anchor: Vec3,
}

#[derive(Default, Debug)]
pub struct SpawnStats {
    pub props: usize,
    pub billboards: usize,
}

/// Height of a billboard panel's center above the ground.
const BILLBOARD_LIFT: f32 = 4.0;
const BILLBOARD_HALF: Vec3 = Vec3::new(4.0, 2.0, 0.2);

pub(super) fn spawn_lighting(commands: &mut Commands) {
    commands.insert_resource(AmbientLight {
        color: Color::srgb(0.9, 0.95, 1.0),
        brightness: 500.0,
    });

    commands.spawn((
        DirectionalLight {
            illuminance: 12_000.0,
            shadows_enabled: true,
            shadow_depth_bias: 0.3,
            shadow_normal_bias: 1.8,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(
            EulerRot::XYZ,
            -std::f32::consts::FRAC_PI_3,
            std::f32::consts::FRAC_PI_4,
            0.0,
        )),
        CascadeShadowConfigBuilder {
            num_cascades: 3,
            minimum_distance: 0.1,
            maximum_distance: 250.0,
            first_cascade_far_bound: 40.0,
            overlap_proportion: 0.3,
        }
        .build(),
        Name::new("Sun"),
    ));
}

pub(super) fn spawn_archipelago(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    archipelago: &Archipelago,
) -> SpawnStats {
    let vertex_colored = materials.add(StandardMaterial {
        base_color: Color::WHITE,
        perceptual_roughness: 0.9,
        ..default()
    });

    let mut stats = SpawnStats::default();
    for island in archipelago.scan_order() {
        spawn_island(commands, meshes, materials, &vertex_colored, island, &mut stats);
    }
    for span in archipelago.bridges() {
        spawn_bridge(commands, meshes, materials, &vertex_colored, span);
    }
    stats
}

fn spawn_island(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    vertex_colored: &Handle<StandardMaterial>,
    island: &Island,
    stats: &mut SpawnStats,
) {
    let terrain = island.build_mesh();
    let mismatch = island.mesh_consistency_error(&terrain);
    if mismatch > 0.0 {
        warn!("Terrain mesh of {} disagrees with height queries by {:.4}", island.name, mismatch);
    }

    let props = island_props(island);
    stats.props += island.decorations().len();

    commands
        .spawn((
            Mesh3d(meshes.add(terrain.to_flat_mesh())),
            MeshMaterial3d(vertex_colored.clone()),
            Transform::from_translation(island.center),
            Name::new(island.name.clone()),
        ))
        .with_children(|parent| {
            if props.vertex_count() > 0 {
                parent.spawn((
                    Mesh3d(meshes.add(props.to_flat_mesh())),
                    MeshMaterial3d(vertex_colored.clone()),
                    Transform::IDENTITY,
                ));
            }
        });

    for decoration in island.decorations() {
        if let Decoration::Billboard { at, facing, title, color } = decoration {
            spawn_billboard(commands, meshes, materials, island, *at, *facing, *title, *color);
            stats.billboards += 1;
        }
    }
}

/// All static decorations merged into one island-local mesh.
pub fn island_props(island: &Island) -> MeshData {
    let mut merged = MeshData::default();
    for decoration in island.decorations() {
        match decoration {
            Decoration::Tree { at, height, seed, foliage } => {
                let ground = island.height_at_local(*at) - 0.2;
                let spin = Quat::from_rotation_y(*seed as f32 * 0.37);
                merged.append_transformed(
                    &tree(*height, *seed, foliage.color()),
                    Vec3::new(at.x, ground, at.y),
                    spin,
                    Vec3::ONE,
                );
            }
            Decoration::Rock { at, size, seed } => {
                let ground = island.height_at_local(*at);
                merged.append_transformed(&rock(*size, *seed), Vec3::new(at.x, ground, at.y), Quat::IDENTITY, Vec3::ONE);
            }
            Decoration::Boulder { at, size, seed } => {
                let ground = island.height_at_local(*at) - 0.1;
                merged.append_transformed(&boulder(*size, *seed), Vec3::new(at.x, ground, at.y), Quat::IDENTITY, Vec3::ONE);
            }
            Decoration::Structure { at, half_extents, lift, color, .. } => {
                let ground = island.height_at_local(*at);
                let [r, g, b] = *color;
                let center = Vec3::new(at.x, ground + lift + half_extents.y, at.y);
                merged.append_transformed(&cuboid(*half_extents, [r, g, b, 1.0]), center, Quat::IDENTITY, Vec3::ONE);
            }
            Decoration::Billboard { at, facing, .. } => {
                let ground = island.height_at_local(*at);
                let post_half = Vec3::new(0.15, (BILLBOARD_LIFT - BILLBOARD_HALF.y) * 0.5, 0.15);
                let post = cuboid(post_half, [0.3, 0.3, 0.32, 1.0]);
                let rotation = Quat::from_rotation_y(*facing);
                for side in [-1.0, 1.0] {
                    let offset = rotation * Vec3::new(side * (BILLBOARD_HALF.x - 0.6), 0.0, 0.0);
                    let center = Vec3::new(at.x, ground + post_half.y, at.y) + offset;
                    merged.append_transformed(&post, center, rotation, Vec3::ONE);
                }
            }
            Decoration::Hoop { .. } | Decoration::BallSpawn { .. } | Decoration::KartSpawn { .. } => {}
        }
    }
    merged
}

#[allow(clippy::too_many_arguments)]
fn spawn_billboard(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    island: &Island,
    at: Vec2,
    facing: f32,
    title: &'static str,
    color: [f32; 3],
) {
    let [r, g, b] = color;
    let material = materials.add(StandardMaterial {
        base_color: Color::srgb(r, g, b),
        emissive: LinearRgba::new(r * 0.4, g * 0.4, b * 0.4, 1.0),
        perceptual_roughness: 0.3,
        ..default()
    });
    let ground = island.height_at_local(at);
    let anchor = island.to_world(at, ground + BILLBOARD_LIFT);
    commands.spawn((
        Mesh3d(meshes.add(Cuboid::from_size(BILLBOARD_HALF * 2.0))),
        MeshMaterial3d(material),
        Transform::from_translation(anchor).with_rotation(Quat::from_rotation_y(facing)),
        Billboard { title, anchor },
        Name::new(format!("Billboard: {title}")),
    ));
}

fn spawn_bridge(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    vertex_colored: &Handle<StandardMaterial>,
    span: &BridgeSpan,
) {
    commands.spawn((
        Mesh3d(meshes.add(span.deck_mesh().to_flat_mesh())),
        MeshMaterial3d(vertex_colored.clone()),
        Transform::IDENTITY,
        Name::new("Bridge deck"),
    ));

    // Each railing owns its material so its glow can be animated separately.
    let glow = materials.add(StandardMaterial {
        base_color: Color::hsl(span.hue_offset, 0.85, 0.6),
        emissive: Color::hsl(span.hue_offset, 0.85, 0.6).to_linear() * 2.5,
        ..default()
    });
    commands.spawn((
        Mesh3d(meshes.add(span.railing_mesh().to_flat_mesh())),
        MeshMaterial3d(glow),
        Transform::IDENTITY,
        BridgeGlow {
            hue_offset: span.hue_offset,
        },
    ));
}
