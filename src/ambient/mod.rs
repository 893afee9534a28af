//! Decorative life: birds, clouds and grass.
//!
//! These systems read nothing but their own entities and run unordered.

use bevy::prelude::*;

pub mod boids;
pub mod clouds;
pub mod grass;

use boids::BoidConfig;
use clouds::CloudConfig;
use grass::{GrassConfig, GustField};

use crate::game_state::GameState;

pub struct AmbientPlugin;

impl Plugin for AmbientPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<BoidConfig>()
            .init_resource::<CloudConfig>()
            .init_resource::<GrassConfig>()
            .init_resource::<GustField>()
            .add_systems(
                OnEnter(GameState::Playing),
                (boids::spawn_flock, clouds::spawn_clouds, grass::spawn_grass),
            )
            .add_systems(
                Update,
                (boids::update_flock, boids::flap_wings, clouds::drift_clouds, grass::sway_grass)
                    .run_if(in_state(GameState::Playing)),
            );
    }
}
