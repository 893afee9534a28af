//! Optional `islands.toml` overrides for the per-plugin config resources.
//!
//! Every key is optional. A missing file means defaults; an unreadable or
//! malformed file is logged and also means defaults.
//!
//! ```toml
//! [world]
//! seed = 7
//! ring_radius = 120.0
//!
//! [player]
//! run_speed = 20.0
//! model = "models/avatar.glb"
//!
//! [ambient]
//! bird_count = 40
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use bevy::prelude::*;
use serde::Deserialize;
use thiserror::Error;

use crate::ambient::boids::BoidConfig;
use crate::ambient::clouds::CloudConfig;
use crate::collision::CollisionConfig;
use crate::interact::kart::KartConfig;
use crate::player::controls::ControlsConfig;
use crate::player::model::AvatarModelConfig;
use crate::world::WorldConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Overrides {
    pub world: WorldOverrides,
    pub player: PlayerOverrides,
    pub kart: KartOverrides,
    pub ambient: AmbientOverrides,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorldOverrides {
    pub seed: Option<u32>,
    pub ring_radius: Option<f32>,
    pub ocean_level: Option<f32>,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlayerOverrides {
    pub walk_speed: Option<f32>,
    pub run_speed: Option<f32>,
    pub jump_velocity: Option<f32>,
    /// Avatar model path under the asset folder; empty disables it.
    pub model: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KartOverrides {
    pub max_speed: Option<f32>,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AmbientOverrides {
    pub bird_count: Option<usize>,
    pub cloud_count: Option<usize>,
}

pub fn parse_overrides(text: &str, path: &Path) -> Result<Overrides, ConfigError> {
    toml::from_str(text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// `Ok(None)` when the file does not exist.
pub fn load_overrides(path: &Path) -> Result<Option<Overrides>, ConfigError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    parse_overrides(&text, path).map(Some)
}

/// Config resources with overrides applied on top of their defaults.
#[derive(Debug, Default)]
pub struct Tunables {
    pub world: WorldConfig,
    pub collision: CollisionConfig,
    pub controls: ControlsConfig,
    pub avatar_model: AvatarModelConfig,
    pub kart: KartConfig,
    pub boids: BoidConfig,
    pub clouds: CloudConfig,
}

impl Tunables {
    pub fn with_overrides(overrides: &Overrides) -> Self {
        let mut t = Self::default();
        let w = &overrides.world;
        if let Some(seed) = w.seed {
            t.world.seed = seed;
        }
        if let Some(ring_radius) = w.ring_radius {
            t.world.ring_radius = ring_radius;
        }
        // Rendering and collision must agree on the waterline.
        if let Some(level) = w.ocean_level {
            t.world.ocean_level = level;
            t.collision.ocean_level = level;
        }

        let p = &overrides.player;
        if let Some(speed) = p.walk_speed {
            t.controls.walk_speed = speed;
        }
        if let Some(speed) = p.run_speed {
            t.controls.run_speed = speed;
        }
        if let Some(velocity) = p.jump_velocity {
            t.controls.jump_velocity = velocity;
        }
        if let Some(model) = &p.model {
            t.avatar_model.path = Some(model.clone()).filter(|m| !m.is_empty());
        }

        if let Some(speed) = overrides.kart.max_speed {
            t.kart.max_speed = speed;
        }

        if let Some(count) = overrides.ambient.bird_count {
            t.boids.count = count;
        }
        if let Some(count) = overrides.ambient.cloud_count {
            t.clouds.count = count;
        }
        t
    }

    fn insert_into(self, app: &mut App) {
        app.insert_resource(self.world)
            .insert_resource(self.collision)
            .insert_resource(self.controls)
            .insert_resource(self.avatar_model)
            .insert_resource(self.kart)
            .insert_resource(self.boids)
            .insert_resource(self.clouds);
    }
}

/// Reads the override file at build time. Add before the other plugins so
/// their `init_resource` calls keep the overridden values.
pub struct ConfigPlugin {
    pub path: PathBuf,
}

impl Default for ConfigPlugin {
    fn default() -> Self {
        Self {
            path: PathBuf::from("islands.toml"),
        }
    }
}

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        match load_overrides(&self.path) {
            Ok(Some(overrides)) => {
                info!("Loaded config overrides from {}", self.path.display());
                Tunables::with_overrides(&overrides).insert_into(app);
            }
            Ok(None) => debug!("No {} found, using defaults", self.path.display()),
            Err(err) => warn!("{err}; using defaults"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Overrides, ConfigError> {
        parse_overrides(text, Path::new("islands.toml"))
    }

    #[test]
    fn empty_file_is_all_defaults() {
        assert_eq!(parse("").unwrap(), Overrides::default());
    }

    #[test]
    fn partial_sections() {
        let overrides = parse("[world]\nseed = 9\nocean_level = -2.5\n\n[ambient]\nbird_count = 40\n").unwrap();
        assert_eq!(overrides.world.seed, Some(9));
        assert_eq!(overrides.world.ring_radius, None);
        assert_eq!(overrides.ambient.bird_count, Some(40));

        let t = Tunables::with_overrides(&overrides);
        assert_eq!(t.world.seed, 9);
        assert_eq!(t.world.ocean_level, -2.5);
        assert_eq!(t.collision.ocean_level, -2.5);
        assert_eq!(t.boids.count, 40);
        assert_eq!(t.clouds.count, CloudConfig::default().count);
    }

    #[test]
    fn avatar_model_can_be_moved_or_disabled() {
        let moved = Tunables::with_overrides(&parse("[player]\nmodel = \"models/robot.glb\"\n").unwrap());
        assert_eq!(moved.avatar_model.path.as_deref(), Some("models/robot.glb"));
        let disabled = Tunables::with_overrides(&parse("[player]\nmodel = \"\"\n").unwrap());
        assert_eq!(disabled.avatar_model.path, None);
        let untouched = Tunables::with_overrides(&Overrides::default());
        assert_eq!(untouched.avatar_model, AvatarModelConfig::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(parse("[world]\nsead = 3\n"), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn wrong_types_are_rejected() {
        assert!(matches!(parse("[player]\nrun_speed = \"fast\"\n"), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let path = std::env::temp_dir().join("islands_portfolio_missing_config.toml");
        assert!(load_overrides(&path).unwrap().is_none());
    }
}
