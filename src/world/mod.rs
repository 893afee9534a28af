//! World management: island layout, terrain, bridges and the ocean.
//!
//! The archipelago is generated once at startup, its collision geometry is
//! registered, and its entities are spawned before the game enters
//! [`GameState::Playing`].

use bevy::prelude::*;

pub mod bridges;
pub mod island;
pub mod layout;
pub mod ocean;
pub mod spawn;
pub mod themes;

use bridges::{animate_bridge_glow, BridgeGlowConfig, BridgeParams};
use layout::{default_roster, Archipelago};
use ocean::{animate_ocean, OceanConfig};

use crate::collision::CollisionRegistry;
use crate::game_state::GameState;

pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WorldConfig>()
            .init_resource::<OceanConfig>()
            .init_resource::<BridgeGlowConfig>()
            .insert_resource(ClearColor(Color::srgb(0.55, 0.78, 0.95)))
            .add_systems(Startup, build_world)
            .add_systems(
                Update,
                (animate_ocean, animate_bridge_glow).run_if(in_state(GameState::Playing)),
            );
    }
}

/// Global world configuration.
#[derive(Resource, Clone, Debug)]
pub struct WorldConfig {
    /// Seed for the hub; themed islands derive theirs from it.
    pub seed: u32,
    pub hub_radius: f32,
    /// Distance from the origin to each themed island's center.
    pub ring_radius: f32,
    /// Angle of the first themed island, radians.
    pub ring_phase: f32,
    /// Minimum open water between any two island rims.
    pub min_island_gap: f32,
    pub ocean_level: f32,
    pub bridge: BridgeParams,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: 1337,
            hub_radius: 32.0,
            ring_radius: 105.0,
            ring_phase: 0.0,
            min_island_gap: 8.0,
            ocean_level: -1.0,
            bridge: BridgeParams::default(),
        }
    }
}

/// Generate the archipelago, fall back to the default layout if the
/// configured one is rejected.
pub fn generate_or_fallback(config: &WorldConfig) -> Option<Archipelago> {
    match Archipelago::generate(config, default_roster()) {
        Ok(archipelago) => Some(archipelago),
        Err(err) => {
            warn!("World layout rejected ({err}); falling back to the default layout");
            Archipelago::generate(&WorldConfig::default(), default_roster())
                .map_err(|err| error!("Default world layout failed: {err}"))
                .ok()
        }
    }
}

fn build_world(
    mut commands: Commands,
    config: Res<WorldConfig>,
    ocean: Res<OceanConfig>,
    mut registry: ResMut<CollisionRegistry>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    info!("Building island world (seed {})...", config.seed);

    let Some(archipelago) = generate_or_fallback(&config) else {
        return;
    };

    registry.register_archipelago(&archipelago);

    spawn::spawn_lighting(&mut commands);
    ocean::spawn_ocean(&mut commands, &mut meshes, &mut materials, &ocean, config.ocean_level);
    let stats = spawn::spawn_archipelago(&mut commands, &mut meshes, &mut materials, &archipelago);

    info!(
        "World ready: {} islands, {} bridges, {} props, {} billboards, {} deck triangles, {} obstacles",
        archipelago.islands.len() + 1,
        archipelago.bridges().count(),
        stats.props,
        stats.billboards,
        registry.meshes().iter().map(|m| m.triangle_count()).sum::<usize>(),
        registry.obstacles().len()
    );

    commands.insert_resource(archipelago);
    next_state.set(GameState::Playing);
}
