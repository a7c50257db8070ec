use bevy::prelude::*;
use bevy::window::{PresentMode, WindowResolution};

use chestrush::bridge::HostChannel;
use chestrush::session::SessionPlugin;
use chestrush::ui::UiPlugin;

const WINDOW_WIDTH: f32 = 360.0;
const WINDOW_HEIGHT: f32 = 640.0;

fn main() {
    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Chest Rush".into(),
                        resolution: WindowResolution::new(WINDOW_WIDTH, WINDOW_HEIGHT),
                        present_mode: PresentMode::AutoVsync,
                        resizable: true,
                        ..default()
                    }),
                    ..default()
                })
                .set(ImagePlugin::default_nearest()),
        )
        .insert_resource(ClearColor(Color::srgb(0.10, 0.11, 0.16)))
        .add_plugins(SessionPlugin {
            channel: HostChannel::default(),
        })
        .add_plugins(UiPlugin)
        .add_systems(Update, log_host_messages)
        .run();
}

/// Standalone builds have no host page; print what would be posted.
fn log_host_messages(channel: Res<HostChannel>) {
    for message in channel.drain() {
        match message.to_json() {
            Ok(json) => info!("[Host] {}", json),
            Err(reason) => warn!("[Host] {}", reason),
        }
    }
}
