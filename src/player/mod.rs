//! Third-person player: input to proposal, commit after collision, limb
//! animation.

use bevy::prelude::*;

pub mod animation;
pub mod controls;
pub mod model;

use animation::{body_mesh, limb_mesh, torso_bob, AvatarBody, Limb, LimbKind, LocomotionState};
use controls::{approach_angle, heading_of, movement_direction, next_vertical_velocity, propose_move, ControlInput, ControlsConfig};
use model::{attach_avatar_model, request_avatar_model, AvatarModelConfig};

use crate::camera::ThirdPersonCamera;
use crate::collision::{CollisionConfig, ProposedMove};
use crate::game_state::GameState;
use crate::world::layout::Archipelago;
use crate::FrameSet;

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ControlsConfig>()
            .init_resource::<AvatarModelConfig>()
            .add_systems(Startup, request_avatar_model)
            .add_systems(OnEnter(GameState::Playing), spawn_player)
            .add_systems(Update, attach_avatar_model.run_if(in_state(GameState::Playing)))
            .add_systems(Update, propose_player_move.in_set(FrameSet::Controls))
            .add_systems(Update, (commit_player_move, animate_avatar).chain().in_set(FrameSet::Commit));
    }
}

/// Avatar state.
#[derive(Component, Debug, Default)]
pub struct Player {
    /// Horizontal velocity actually achieved last frame.
    pub velocity: Vec3,
    pub vertical_velocity: f32,
    pub grounded: bool,
    /// Facing yaw, radians.
    pub heading: f32,
    /// Heading the avatar is turning toward.
    pub target_heading: f32,
    /// Held basketball, if any.
    pub holding: Option<Entity>,
    /// Kart being driven, if any.
    pub driving: Option<Entity>,
    pub locomotion: LocomotionState,
}

impl Player {
    pub fn is_driving(&self) -> bool {
        self.driving.is_some()
    }
}

fn spawn_player(
    mut commands: Commands,
    archipelago: Option<Res<Archipelago>>,
    collision_config: Res<CollisionConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let Some(archipelago) = archipelago else {
        warn!("No world to spawn the player into");
        return;
    };
    let spawn = archipelago.spawn_point() + Vec3::new(0.0, collision_config.ground_offset, 4.0);

    let material = materials.add(StandardMaterial {
        base_color: Color::WHITE,
        perceptual_roughness: 0.8,
        ..default()
    });
    let body = meshes.add(body_mesh().to_flat_mesh());

    commands
        .spawn((
            Transform::from_translation(spawn),
            Visibility::default(),
            Player {
                grounded: true,
                ..default()
            },
            ProposedMove::default(),
            Name::new("Player"),
        ))
        .with_children(|root| {
            root.spawn((
                Mesh3d(body),
                MeshMaterial3d(material.clone()),
                Transform::IDENTITY,
                AvatarBody,
            ))
            .with_children(|body| {
                for kind in LimbKind::ALL {
                    body.spawn((
                        Mesh3d(meshes.add(limb_mesh(kind).to_flat_mesh())),
                        MeshMaterial3d(material.clone()),
                        Transform::from_translation(kind.pivot()),
                        Limb(kind),
                    ));
                }
            });
        });

    info!("Player spawned at ({:.1}, {:.1}, {:.1})", spawn.x, spawn.y, spawn.z);
}

fn propose_player_move(
    time: Res<Time>,
    keys: Res<ButtonInput<KeyCode>>,
    config: Res<ControlsConfig>,
    cameras: Query<&ThirdPersonCamera>,
    mut players: Query<(&Transform, &mut Player, &mut ProposedMove)>,
) {
    let delta = time.delta_secs();
    let camera_yaw = cameras.get_single().map(|c| c.yaw).unwrap_or(0.0);
    let input = ControlInput::from_keys(&keys);

    for (transform, mut player, mut proposal) in &mut players {
        if player.is_driving() {
            proposal.candidate = None;
            continue;
        }

        let direction = movement_direction(input.axis, camera_yaw);
        let speed = if input.run { config.run_speed } else { config.walk_speed };
        let jump = input.jump && player.grounded;
        let vy = next_vertical_velocity(player.vertical_velocity, player.grounded, jump, &config, delta);
        if direction != Vec3::ZERO {
            player.target_heading = heading_of(direction);
        }
        player.vertical_velocity = vy;

        proposal.vertical_velocity = vy;
        proposal.candidate = Some(propose_move(transform.translation, direction, speed, vy, delta));
    }
}

fn commit_player_move(
    time: Res<Time>,
    config: Res<ControlsConfig>,
    mut players: Query<(&mut Transform, &mut Player, &mut ProposedMove)>,
) {
    let delta = time.delta_secs();
    for (mut transform, mut player, mut proposal) in &mut players {
        let Some(resolution) = proposal.resolution.take() else {
            continue;
        };

        let moved = (resolution.position - transform.translation).with_y(0.0);
        player.velocity = if delta > 0.0 { moved / delta } else { Vec3::ZERO };
        transform.translation = resolution.position;

        player.grounded = resolution.grounded;
        if resolution.grounded && player.vertical_velocity <= 0.0 {
            player.vertical_velocity = 0.0;
        }

        player.heading = approach_angle(player.heading, player.target_heading, config.turn_rate, delta);
        transform.rotation = Quat::from_rotation_y(player.heading);
        player.locomotion =
            LocomotionState::from_speed(player.velocity.length(), config.walk_threshold, config.run_threshold);
    }
}

fn animate_avatar(
    time: Res<Time>,
    players: Query<(&Player, &Children)>,
    mut bodies: Query<(&mut Transform, &Children), With<AvatarBody>>,
    mut limbs: Query<(&mut Transform, &Limb), Without<AvatarBody>>,
) {
    let t = time.elapsed_secs();
    for (player, children) in &players {
        let seated = player.is_driving();
        let state = if seated { LocomotionState::Idle } else { player.locomotion };
        for &child in children {
            let Ok((mut body, limb_entities)) = bodies.get_mut(child) else {
                continue;
            };
            body.translation.y = if seated { 0.0 } else { torso_bob(state, t) };
            for &limb_entity in limb_entities {
                if let Ok((mut limb_transform, limb)) = limbs.get_mut(limb_entity) {
                    limb_transform.rotation = Quat::from_rotation_x(limb.0.angle(state, t, seated));
                }
            }
        }
    }
}
