//! Optional glTF avatar.
//!
//! The model is requested once at startup. If it loads, it is attached to the
//! player and the primitive body is hidden; if it is missing or broken, a
//! warning is logged and the primitive avatar stays.

use bevy::asset::LoadState;
use bevy::gltf::GltfAssetLabel;
use bevy::prelude::*;

use super::animation::AvatarBody;
use super::Player;
use crate::collision::CollisionConfig;

/// Where to look for the avatar model, relative to the asset folder.
/// `None` skips loading and always uses the primitive avatar.
#[derive(Resource, Clone, Debug, PartialEq)]
pub struct AvatarModelConfig {
    pub path: Option<String>,
}

impl Default for AvatarModelConfig {
    fn default() -> Self {
        Self {
            path: Some("models/avatar.glb".into()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelStatus {
    Loading,
    Ready,
    Fallback,
}

impl ModelStatus {
    pub fn from_load_state(state: &LoadState) -> Self {
        match state {
            LoadState::Loaded => ModelStatus::Ready,
            LoadState::Failed(_) => ModelStatus::Fallback,
            LoadState::NotLoaded | LoadState::Loading => ModelStatus::Loading,
        }
    }

    pub fn is_settled(self) -> bool {
        self != ModelStatus::Loading
    }
}

/// The requested model and how far it got.
#[derive(Resource, Debug)]
pub struct AvatarModel {
    pub path: String,
    pub scene: Handle<Scene>,
    pub status: ModelStatus,
}

pub(super) fn request_avatar_model(
    mut commands: Commands,
    config: Res<AvatarModelConfig>,
    asset_server: Res<AssetServer>,
) {
    let Some(path) = config.path.clone() else {
        info!("No avatar model configured, using the primitive avatar");
        return;
    };
    let scene = asset_server.load(GltfAssetLabel::Scene(0).from_asset(path.clone()));
    commands.insert_resource(AvatarModel {
        path,
        scene,
        status: ModelStatus::Loading,
    });
}

/// Swap the primitive body for the model once it has loaded.
pub(super) fn attach_avatar_model(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    collision: Res<CollisionConfig>,
    model: Option<ResMut<AvatarModel>>,
    players: Query<Entity, With<Player>>,
    mut bodies: Query<&mut Visibility, With<AvatarBody>>,
) {
    let Some(mut model) = model else {
        return;
    };
    if model.status.is_settled() {
        return;
    }

    let state = asset_server.load_state(model.scene.id());
    match ModelStatus::from_load_state(&state) {
        ModelStatus::Loading => {}
        ModelStatus::Fallback => {
            if let LoadState::Failed(err) = &state {
                warn!("Avatar model {} failed to load ({err}); keeping the primitive avatar", model.path);
            }
            model.status = ModelStatus::Fallback;
        }
        ModelStatus::Ready => {
            let Ok(player) = players.get_single() else {
                return;
            };
            // Model feet sit at its origin; the player origin floats above the ground.
            let scene = commands
                .spawn((
                    SceneRoot(model.scene.clone()),
                    Transform::from_xyz(0.0, -collision.ground_offset, 0.0),
                    Name::new("Avatar model"),
                ))
                .id();
            commands.entity(player).add_child(scene);
            for mut visibility in &mut bodies {
                *visibility = Visibility::Hidden;
            }
            model.status = ModelStatus::Ready;
            info!("Avatar model {} attached", model.path);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use bevy::asset::io::AssetReaderError;
    use bevy::asset::AssetLoadError;

    #[test]
    fn load_states_map_to_status() {
        assert_eq!(ModelStatus::from_load_state(&LoadState::Loaded), ModelStatus::Ready);
        assert_eq!(ModelStatus::from_load_state(&LoadState::Loading), ModelStatus::Loading);
        assert_eq!(ModelStatus::from_load_state(&LoadState::NotLoaded), ModelStatus::Loading);
        assert!(!ModelStatus::Loading.is_settled());
        assert!(ModelStatus::Fallback.is_settled());
    }

    #[test]
    fn missing_file_falls_back() {
        let missing = AssetLoadError::from(AssetReaderError::NotFound("models/avatar.glb".into()));
        let state = LoadState::Failed(Arc::new(missing));
        assert_eq!(ModelStatus::from_load_state(&state), ModelStatus::Fallback);
    }
}
