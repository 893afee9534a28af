//! Core game state.
//!
//! The world is built during [`GameState::Loading`]; everything that needs
//! the archipelago (player, props, grass) spawns on entering
//! [`GameState::Playing`].

use bevy::prelude::*;

pub struct GameStatePlugin;

impl Plugin for GameStatePlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GameState>()
            .add_systems(OnEnter(GameState::Playing), log_ready);
    }
}

/// High-level game state controlling which systems run.
#[derive(States, Default, Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum GameState {
    /// Generating islands and spawning the world.
    #[default]
    Loading,
    /// World is live and the player can explore.
    Playing,
}

fn log_ready() {
    info!("World loaded, entering play");
}
