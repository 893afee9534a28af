//! Heads-up display: loading screen, pointer hint, interaction prompt,
//! score and location.

use bevy::prelude::*;

use crate::camera::PointerLock;
use crate::game_state::GameState;
use crate::interact::basketball::Scoreboard;
use crate::interact::InteractionPrompt;
use crate::player::Player;
use crate::world::layout::Archipelago;
use crate::world::spawn::Billboard;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<HudConfig>()
            .add_systems(Startup, spawn_loading_overlay)
            .add_systems(OnEnter(GameState::Playing), (despawn_loading_overlay, setup_hud))
            .add_systems(
                Update,
                (update_pointer_hint, update_prompt, update_score, update_location)
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

#[derive(Resource)]
pub struct HudConfig {
    /// Billboards closer than this show their title.
    pub billboard_radius: f32,
}

impl Default for HudConfig {
    fn default() -> Self {
        Self { billboard_radius: 12.0 }
    }
}

#[derive(Component)]
struct LoadingOverlay;

#[derive(Component)]
struct PointerHintText;

#[derive(Component)]
struct PromptText;

#[derive(Component)]
struct ScoreText;

#[derive(Component)]
struct LocationText;

#[derive(Component)]
struct BillboardText;

const PANEL_BG: Color = Color::srgba(0.04, 0.06, 0.1, 0.75);
const TEXT_COLOR: Color = Color::srgb(0.95, 0.97, 1.0);
const ACCENT: Color = Color::srgb(1.0, 0.75, 0.3);
const MUTED_TEXT: Color = Color::srgb(0.7, 0.78, 0.88);

/// Title of the closest billboard within `radius`, if any.
pub fn nearest_billboard<'a>(
    position: Vec3,
    billboards: impl IntoIterator<Item = (&'a str, Vec3)>,
    radius: f32,
) -> Option<&'a str> {
    billboards
        .into_iter()
        .map(|(title, anchor)| (title, anchor.xz().distance_squared(position.xz())))
        .filter(|(_, d2)| *d2 <= radius * radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(title, _)| title)
}

pub fn location_label(island: Option<&str>) -> String {
    match island {
        Some(name) => name.to_string(),
        None => "Open water".to_string(),
    }
}

pub fn score_label(baskets: u32) -> String {
    format!("Baskets: {baskets}")
}

fn text(value: &str, size: f32, color: Color) -> (Text, TextFont, TextColor) {
    (
        Text::new(value),
        TextFont {
            font_size: size,
            ..default()
        },
        TextColor(color),
    )
}

fn spawn_loading_overlay(mut commands: Commands) {
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            BackgroundColor(Color::srgb(0.05, 0.08, 0.14)),
            GlobalZIndex(10),
            LoadingOverlay,
        ))
        .with_children(|overlay| {
            overlay.spawn(text("Raising islands...", 32.0, TEXT_COLOR));
        });
}

fn despawn_loading_overlay(mut commands: Commands, overlays: Query<Entity, With<LoadingOverlay>>) {
    for entity in &overlays {
        commands.entity(entity).despawn_recursive();
    }
}

fn setup_hud(mut commands: Commands) {
    // Top-left: where am I.
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                top: Val::Px(12.0),
                left: Val::Px(12.0),
                padding: UiRect::axes(Val::Px(12.0), Val::Px(8.0)),
                row_gap: Val::Px(4.0),
                flex_direction: FlexDirection::Column,
                ..default()
            },
            BackgroundColor(PANEL_BG),
        ))
        .with_children(|panel| {
            panel.spawn((text("Open water", 20.0, TEXT_COLOR), LocationText));
            panel.spawn((text("", 15.0, MUTED_TEXT), BillboardText));
        });

    // Top-right: score.
    commands.spawn((
        text(&score_label(0), 20.0, ACCENT),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(12.0),
            right: Val::Px(12.0),
            ..default()
        },
        ScoreText,
    ));

    // Bottom-center: interaction prompt.
    commands
        .spawn(Node {
            position_type: PositionType::Absolute,
            bottom: Val::Px(48.0),
            width: Val::Percent(100.0),
            justify_content: JustifyContent::Center,
            ..default()
        })
        .with_children(|row| {
            row.spawn((text("", 18.0, TEXT_COLOR), PromptText));
        });

    // Center: pointer hint.
    commands
        .spawn(Node {
            position_type: PositionType::Absolute,
            top: Val::Percent(45.0),
            width: Val::Percent(100.0),
            justify_content: JustifyContent::Center,
            ..default()
        })
        .with_children(|row| {
            row.spawn((text("Click to explore", 26.0, ACCENT), PointerHintText));
        });

    commands.spawn((
        text(
            "WASD move | Shift run | Space jump | E interact | F throw | Esc release mouse",
            13.0,
            MUTED_TEXT,
        ),
        Node {
            position_type: PositionType::Absolute,
            bottom: Val::Px(10.0),
            left: Val::Px(12.0),
            ..default()
        },
    ));
}

fn update_pointer_hint(lock: Res<PointerLock>, mut hints: Query<&mut Visibility, With<PointerHintText>>) {
    if !lock.is_changed() {
        return;
    }
    for mut visibility in &mut hints {
        *visibility = if lock.0 { Visibility::Hidden } else { Visibility::Inherited };
    }
}

fn update_prompt(prompt: Res<InteractionPrompt>, mut texts: Query<&mut Text, With<PromptText>>) {
    if !prompt.is_changed() {
        return;
    }
    let line = prompt.action.prompt().unwrap_or_default();
    for mut text in &mut texts {
        if text.0 != line {
            **text = line.to_string();
        }
    }
}

fn update_score(scoreboard: Res<Scoreboard>, mut texts: Query<&mut Text, With<ScoreText>>) {
    if !scoreboard.is_changed() {
        return;
    }
    for mut text in &mut texts {
        **text = score_label(scoreboard.baskets);
    }
}

fn update_location(
    config: Res<HudConfig>,
    archipelago: Option<Res<Archipelago>>,
    players: Query<&Transform, With<Player>>,
    billboards: Query<&Billboard>,
    mut locations: Query<&mut Text, (With<LocationText>, Without<BillboardText>)>,
    mut titles: Query<&mut Text, (With<BillboardText>, Without<LocationText>)>,
) {
    let (Some(archipelago), Ok(player)) = (archipelago, players.get_single()) else {
        return;
    };
    let p = player.translation;

    let island = archipelago.island_at(p.x, p.z).map(|i| i.name.as_str());
    let label = location_label(island);
    for mut text in &mut locations {
        if text.0 != label {
            **text = label.clone();
        }
    }

    let nearby = nearest_billboard(p, billboards.iter().map(|b| (b.title, b.anchor)), config.billboard_radius);
    let title = nearby.unwrap_or_default();
    for mut text in &mut titles {
        if text.0 != title {
            **text = title.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closest_billboard_in_range_wins() {
        let boards = [("Far", Vec3::new(30.0, 0.0, 0.0)), ("Near", Vec3::new(5.0, 9.0, 0.0))];
        assert_eq!(nearest_billboard(Vec3::ZERO, boards, 12.0), Some("Near"));
        assert_eq!(nearest_billboard(Vec3::new(100.0, 0.0, 0.0), boards, 12.0), None);
    }

    #[test]
    fn water_has_a_label() {
        assert_eq!(location_label(None), "Open water");
        assert_eq!(location_label(Some("Campus")), "Campus");
    }

    #[test]
    fn score_text() {
        assert_eq!(score_label(3), "Baskets: 3");
    }
}
