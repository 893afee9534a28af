//! Islands Portfolio - an explorable low-poly archipelago
//!
//! A Bevy world of themed islands joined by glowing bridges over an animated
//! ocean, walked by a third-person avatar that can shoot hoops and drive a
//! go-kart.

use bevy::prelude::*;

pub mod ambient;
pub mod camera;
pub mod collision;
pub mod config;
pub mod game_state;
pub mod interact;
pub mod player;
pub mod procgen;
pub mod ui;
pub mod world;

use game_state::GameState;

/// Per-frame stages of the avatar pipeline, run in this order.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameSet {
    /// Pointer lock and mouse look.
    Input,
    /// Keys to a proposed move.
    Controls,
    /// Proposed move to a corrected position.
    Collision,
    /// Corrected position onto the avatar, then its animation.
    Commit,
    /// Ball and kart physics, interaction.
    Props,
    /// Camera follows whatever moved.
    Camera,
}

/// Everything, in dependency order. Config first so overrides win.
pub struct IslandsPlugin;

impl Plugin for IslandsPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            Update,
            (
                FrameSet::Input,
                FrameSet::Controls,
                FrameSet::Collision,
                FrameSet::Commit,
                FrameSet::Props,
                FrameSet::Camera,
            )
                .chain()
                .run_if(in_state(GameState::Playing)),
        )
        .add_plugins(config::ConfigPlugin::default())
        .add_plugins(game_state::GameStatePlugin)
        .add_plugins(world::WorldPlugin)
        .add_plugins(collision::CollisionPlugin)
        .add_plugins(player::PlayerPlugin)
        .add_plugins(interact::InteractPlugin)
        .add_plugins(camera::CameraPlugin)
        .add_plugins(ambient::AmbientPlugin)
        .add_plugins(ui::UiPlugin);
    }
}
