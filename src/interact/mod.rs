//! Interactive props: the throwable basketball and the drivable go-kart.
//!
//! Each frame the nearest prop in reach is found, an [`InteractionAction`] is
//! decided from it and the avatar's state, and the HUD prompt shows it.
//! `E` performs the action, `F` throws a held ball.

use bevy::prelude::*;

pub mod basketball;
pub mod kart;

use basketball::{
    needs_respawn, scored_hoop, step_ball, throw_velocity, BallPhysics, Basketball, Hoop, ScoreEvent, Scoreboard,
};
use kart::{drive_step, kart_box, kart_mesh, seat_position, settle_on_ground, GoKart, KartConfig, KartInput};

use crate::camera::ThirdPersonCamera;
use crate::collision::bounds::enters_obstacle;
use crate::collision::Collision;
use crate::game_state::GameState;
use crate::player::controls::ControlInput;
use crate::player::Player;
use crate::world::island::Decoration;
use crate::world::layout::Archipelago;
use crate::FrameSet;

pub struct InteractPlugin;

impl Plugin for InteractPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<InteractConfig>()
            .init_resource::<BallPhysics>()
            .init_resource::<KartConfig>()
            .init_resource::<Scoreboard>()
            .init_resource::<InteractionPrompt>()
            .add_event::<ScoreEvent>()
            .add_systems(OnEnter(GameState::Playing), spawn_props)
            .add_systems(
                Update,
                (update_interaction, throw_ball, drive_karts, step_balls, tally_scores)
                    .chain()
                    .in_set(FrameSet::Props),
            );
    }
}

/// What kind of prop an interactable is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InteractableKind {
    Basketball,
    GoKart,
}

#[derive(Component, Clone, Copy, Debug)]
pub struct Interactable {
    pub kind: InteractableKind,
}

#[derive(Resource, Clone)]
pub struct InteractConfig {
    /// Reach for picking up or entering props.
    pub radius: f32,
    /// Where a held ball sits, in the avatar frame.
    pub carry_offset: Vec3,
    /// Sideways distance the driver steps out to.
    pub exit_offset: f32,
    pub hoop_rim_radius: f32,
}

impl Default for InteractConfig {
    fn default() -> Self {
        Self {
            radius: 3.0,
            carry_offset: Vec3::new(0.0, 0.35, 0.65),
            exit_offset: 1.8,
            hoop_rim_radius: 0.6,
        }
    }
}

/// A prop the avatar might act on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    pub entity: Entity,
    pub kind: InteractableKind,
    pub position: Vec3,
    /// Already held or driven.
    pub busy: bool,
}

/// Closest free prop within `radius`, by linear scan.
pub fn nearest_interactable(
    player: Vec3,
    candidates: impl IntoIterator<Item = Candidate>,
    radius: f32,
) -> Option<Candidate> {
    candidates
        .into_iter()
        .filter(|c| !c.busy)
        .map(|c| (c.position.distance_squared(player), c))
        .filter(|(d2, _)| *d2 <= radius * radius)
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, c)| c)
}

/// What `E` would do right now.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InteractionAction {
    #[default]
    None,
    PickUpBall(Entity),
    EnterKart(Entity),
    ExitVehicle(Entity),
    /// Something is in reach but the avatar's hands are full.
    Blocked,
}

impl InteractionAction {
    pub fn prompt(self) -> Option<&'static str> {
        match self {
            InteractionAction::None => None,
            InteractionAction::PickUpBall(_) => Some("Press E to pick up the ball"),
            InteractionAction::EnterKart(_) => Some("Press E to drive"),
            InteractionAction::ExitVehicle(_) => Some("Press E to get out"),
            InteractionAction::Blocked => Some("Hands full: press F to throw the ball"),
        }
    }
}

/// What the avatar currently has.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AvatarStatus {
    pub holding: Option<Entity>,
    pub driving: Option<Entity>,
}

/// Holding a ball and driving are mutually exclusive.
pub fn decide_interaction(avatar: AvatarStatus, nearby: Option<&Candidate>) -> InteractionAction {
    if let Some(kart) = avatar.driving {
        return InteractionAction::ExitVehicle(kart);
    }
    let Some(candidate) = nearby else {
        return InteractionAction::None;
    };
    match (candidate.kind, avatar.holding) {
        (_, Some(_)) => InteractionAction::Blocked,
        (InteractableKind::Basketball, None) => InteractionAction::PickUpBall(candidate.entity),
        (InteractableKind::GoKart, None) => InteractionAction::EnterKart(candidate.entity),
    }
}

/// The current action, for the HUD.
#[derive(Resource, Default, Debug)]
pub struct InteractionPrompt {
    pub action: InteractionAction,
    pub holding: bool,
}

/// Hoop geometry derived from a hoop decoration.
pub fn hoop_rim(base: Vec3, facing: f32, rim_height: f32, rim_radius: f32) -> Vec3 {
    let toward = Vec3::new(facing.sin(), 0.0, facing.cos());
    base + toward * (0.45 + rim_radius) + Vec3::Y * rim_height
}

fn spawn_props(
    mut commands: Commands,
    archipelago: Option<Res<Archipelago>>,
    config: Res<InteractConfig>,
    physics: Res<BallPhysics>,
    kart_config: Res<KartConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let Some(archipelago) = archipelago else {
        return;
    };

    let ball_mesh = meshes.add(Sphere::new(physics.radius).mesh().uv(12, 8));
    let ball_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.95, 0.45, 0.1),
        perceptual_roughness: 0.7,
        ..default()
    });
    let kart_handle = meshes.add(kart_mesh(&kart_config).to_flat_mesh());
    let vertex_colored = materials.add(StandardMaterial {
        base_color: Color::WHITE,
        perceptual_roughness: 0.6,
        ..default()
    });
    let pole_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.25, 0.25, 0.28),
        metallic: 0.6,
        perceptual_roughness: 0.4,
        ..default()
    });
    let rim_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.95, 0.3, 0.05),
        emissive: LinearRgba::new(0.3, 0.08, 0.0, 1.0),
        ..default()
    });
    let board_material = materials.add(StandardMaterial {
        base_color: Color::srgba(0.95, 0.95, 0.98, 0.85),
        alpha_mode: AlphaMode::Blend,
        ..default()
    });

    let (mut balls, mut karts, mut hoops) = (0, 0, 0);
    for island in archipelago.scan_order() {
        for decoration in island.decorations() {
            match decoration {
                Decoration::BallSpawn { at } => {
                    let ground = island.height_at_local(*at);
                    let spawn = island.to_world(*at, ground + physics.radius + 0.5);
                    commands.spawn((
                        Mesh3d(ball_mesh.clone()),
                        MeshMaterial3d(ball_material.clone()),
                        Transform::from_translation(spawn),
                        Basketball::new(spawn),
                        Interactable {
                            kind: InteractableKind::Basketball,
                        },
                        Name::new("Basketball"),
                    ));
                    balls += 1;
                }
                Decoration::KartSpawn { at, heading } => {
                    let ground = island.height_at_local(*at);
                    let spawn = island.to_world(*at, ground + kart_config.ride_height);
                    commands.spawn((
                        Mesh3d(kart_handle.clone()),
                        MeshMaterial3d(vertex_colored.clone()),
                        Transform::from_translation(spawn).with_rotation(Quat::from_rotation_y(*heading)),
                        GoKart::new(spawn, *heading),
                        Interactable {
                            kind: InteractableKind::GoKart,
                        },
                        Name::new("Go-kart"),
                    ));
                    karts += 1;
                }
                Decoration::Hoop { at, facing, rim_height } => {
                    let ground = island.height_at_local(*at);
                    let base = island.to_world(*at, ground);
                    let rim = hoop_rim(base, *facing, *rim_height, config.hoop_rim_radius);
                    let rotation = Quat::from_rotation_y(*facing);
                    let pole_height = rim_height + 1.2;
                    commands.spawn((
                        Mesh3d(meshes.add(Cylinder::new(0.1, pole_height))),
                        MeshMaterial3d(pole_material.clone()),
                        Transform::from_translation(base + Vec3::Y * pole_height * 0.5),
                    ));
                    commands.spawn((
                        Mesh3d(meshes.add(Cuboid::new(1.8, 1.1, 0.06))),
                        MeshMaterial3d(board_material.clone()),
                        Transform::from_translation(base + rotation * Vec3::new(0.0, 0.0, 0.4) + Vec3::Y * (rim_height + 0.45))
                            .with_rotation(rotation),
                    ));
                    commands.spawn((
                        Mesh3d(meshes.add(Torus::new(config.hoop_rim_radius - 0.03, config.hoop_rim_radius + 0.03))),
                        MeshMaterial3d(rim_material.clone()),
                        Transform::from_translation(rim),
                        Hoop {
                            rim,
                            radius: config.hoop_rim_radius,
                        },
                        Name::new("Hoop"),
                    ));
                    hoops += 1;
                }
                _ => {}
            }
        }
    }
    info!("Spawned {} basketballs, {} karts, {} hoops", balls, karts, hoops);
}

fn update_interaction(
    keys: Res<ButtonInput<KeyCode>>,
    config: Res<InteractConfig>,
    kart_config: Res<KartConfig>,
    collision: Collision,
    mut prompt: ResMut<InteractionPrompt>,
    mut players: Query<(&mut Transform, &mut Player)>,
    mut props: Query<
        (Entity, &Transform, &Interactable, Option<&mut Basketball>, Option<&mut GoKart>),
        Without<Player>,
    >,
) {
    let Ok((mut player_transform, mut player)) = players.get_single_mut() else {
        return;
    };

    let candidates = props.iter().map(|(entity, transform, interactable, ball, kart)| Candidate {
        entity,
        kind: interactable.kind,
        position: transform.translation,
        busy: match interactable.kind {
            InteractableKind::Basketball => ball.is_some_and(|b| b.held),
            InteractableKind::GoKart => kart.is_some_and(|k| k.driven),
        },
    });
    let nearby = nearest_interactable(player_transform.translation, candidates, config.radius);
    let status = AvatarStatus {
        holding: player.holding,
        driving: player.driving,
    };
    let action = decide_interaction(status, nearby.as_ref());
    prompt.action = action;
    prompt.holding = player.holding.is_some();

    if !keys.just_pressed(KeyCode::KeyE) {
        return;
    }

    match action {
        InteractionAction::PickUpBall(entity) => {
            if let Ok((_, _, _, Some(mut ball), _)) = props.get_mut(entity) {
                ball.held = true;
                ball.velocity = Vec3::ZERO;
                player.holding = Some(entity);
                info!("Picked up the basketball");
            }
        }
        InteractionAction::EnterKart(entity) => {
            if let Ok((_, _, _, _, Some(mut kart))) = props.get_mut(entity) {
                kart.driven = true;
                player.driving = Some(entity);
                info!("Entered the go-kart");
            }
        }
        InteractionAction::ExitVehicle(entity) => {
            if let Ok((_, kart_transform, _, _, Some(mut kart))) = props.get_mut(entity) {
                kart.driven = false;
                kart.speed = 0.0;
                let right = kart.forward().cross(Vec3::Y);
                let mut exit = kart_transform.translation + right * config.exit_offset;
                if let Some(world) = collision.world() {
                    let ceiling = exit.y + collision.config.probe_headroom;
                    if let Some(ground) = world.ground_at(exit.x, exit.z, ceiling) {
                        exit.y = ground + collision.config.ground_offset;
                    } else {
                        exit.y = kart_transform.translation.y - kart_config.ride_height + collision.config.ground_offset;
                    }
                }
                player_transform.translation = exit;
                player.vertical_velocity = 0.0;
                info!("Left the go-kart");
            }
            player.driving = None;
        }
        InteractionAction::Blocked | InteractionAction::None => {}
    }
}

fn throw_ball(
    keys: Res<ButtonInput<KeyCode>>,
    physics: Res<BallPhysics>,
    cameras: Query<&Transform, With<ThirdPersonCamera>>,
    mut players: Query<&mut Player>,
    mut balls: Query<&mut Basketball>,
) {
    if !keys.just_pressed(KeyCode::KeyF) {
        return;
    }
    let Ok(mut player) = players.get_single_mut() else {
        return;
    };
    let Some(entity) = player.holding else {
        return;
    };
    let look = cameras.get_single().map(|t| *t.forward()).unwrap_or(Vec3::Z);
    if let Ok(mut ball) = balls.get_mut(entity) {
        ball.held = false;
        ball.velocity = throw_velocity(look, &physics);
        info!("Threw the basketball");
    }
    player.holding = None;
}

fn drive_karts(
    time: Res<Time>,
    keys: Res<ButtonInput<KeyCode>>,
    config: Res<KartConfig>,
    collision: Collision,
    mut karts: Query<(&mut Transform, &mut GoKart), Without<Player>>,
    mut players: Query<(&mut Transform, &mut Player)>,
) {
    let delta = time.delta_secs();
    let Some(world) = collision.world() else {
        return;
    };
    let input = ControlInput::from_keys(&keys);

    for (mut transform, mut kart) in &mut karts {
        let kart_input = if kart.driven {
            KartInput {
                throttle: input.axis.y,
                steer: input.axis.x,
            }
        } else {
            KartInput::default()
        };

        let current = transform.translation;
        let current_box = kart_box(current, kart.heading, config.half_extents);
        let mut next = drive_step(current, &mut kart, kart_input, &config, delta);
        let next_box = kart_box(next, kart.heading, config.half_extents);
        if enters_obstacle(&current_box, &next_box, world.registry.obstacles()) {
            next.x = current.x;
            next.z = current.z;
            kart.speed = 0.0;
        }

        let ceiling = current.y + collision.config.probe_headroom;
        let ground = world.ground_at(next.x, next.z, ceiling);
        next = settle_on_ground(next, &mut kart, ground, &config, delta);

        if next.y < config.respawn_below {
            next = kart.respawn();
            info!("Go-kart fell in the ocean, respawning");
        }

        transform.translation = next;
        transform.rotation = Quat::from_rotation_y(kart.heading);
    }

    // Driver rides in the seat.
    for (mut player_transform, mut player) in &mut players {
        let Some(entity) = player.driving else {
            continue;
        };
        let Ok((kart_transform, kart)) = karts.get(entity) else {
            continue;
        };
        player_transform.translation = seat_position(kart_transform.translation, kart, &config);
        player_transform.rotation = Quat::from_rotation_y(kart.heading);
        player.heading = kart.heading;
        player.target_heading = kart.heading;
        player.grounded = true;
    }
}

fn step_balls(
    time: Res<Time>,
    physics: Res<BallPhysics>,
    config: Res<InteractConfig>,
    collision: Collision,
    players: Query<(&Transform, &Player), Without<Basketball>>,
    hoops: Query<&Hoop>,
    mut balls: Query<(Entity, &mut Transform, &mut Basketball)>,
    mut scores: EventWriter<ScoreEvent>,
) {
    let delta = time.delta_secs();
    let now = time.elapsed_secs();
    let Some(world) = collision.world() else {
        return;
    };
    let hoops: Vec<Hoop> = hoops.iter().copied().collect();
    let carrier = players.get_single().ok();

    for (entity, mut transform, mut ball) in &mut balls {
        if ball.held {
            if let Some((player_transform, _)) = carrier.filter(|(_, p)| p.holding == Some(entity)) {
                transform.translation = player_transform.translation + player_transform.rotation * config.carry_offset;
                continue;
            }
            // Holder is gone; drop the ball where it is.
            ball.held = false;
        }

        let prev = transform.translation;
        let ceiling = prev.y + physics.radius;
        let step = step_ball(prev, ball.velocity, |x, z| world.ground_at(x, z, ceiling), &physics, delta);

        if let Some(hoop) = scored_hoop(prev, step.position, &hoops, ball.last_score, now, physics.score_cooldown) {
            ball.last_score = Some(now);
            scores.send(ScoreEvent { hoop: hoop.rim, ball: entity });
        }

        if needs_respawn(step.position, &physics) {
            transform.translation = ball.respawn();
            debug!("Basketball respawned");
            continue;
        }
        transform.translation = step.position;
        ball.velocity = step.velocity;
    }
}

fn tally_scores(mut events: EventReader<ScoreEvent>, mut scoreboard: ResMut<Scoreboard>) {
    for event in events.read() {
        scoreboard.baskets += 1;
        info!("Basket! Total {} (hoop at {:.1?})", scoreboard.baskets, event.hoop);
    }
}
