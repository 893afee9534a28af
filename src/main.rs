use bevy::prelude::*;

use islands_portfolio::IslandsPlugin;

fn main() {
    // Force Vulkan backend on Windows (DX12 causes crashes on some systems)
    #[cfg(target_os = "windows")]
    std::env::set_var("WGPU_BACKEND", "vulkan");
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Islands Portfolio".into(),
                resolution: (1280., 720.).into(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(IslandsPlugin)
        .run();
}
