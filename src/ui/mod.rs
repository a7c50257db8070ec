mod hud;

use bevy::prelude::*;
use bevy::render::camera::ScalingMode;
use crate::shared::*;

/// Camera and HUD. Only the windowed binary adds this plugin; the session
/// itself runs without it.
pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        // The config is installed during Loading, so everything sized from
        // it is spawned on the way out.
        app.add_systems(
            OnExit(GameState::Loading),
            (spawn_playfield_camera, hud::spawn_hud),
        );
        app.add_systems(
            Update,
            (
                hud::update_score_display,
                hud::update_autoplay_label,
                hud::update_pause_banner,
                hud::update_reward_ticker,
            ),
        );
    }
}

/// A 2D camera that always shows exactly the playfield, whatever the
/// window size. Pointer mapping in the input plugin relies on this.
fn spawn_playfield_camera(mut commands: Commands, config: Res<SessionConfig>) {
    let field = &config.playfield;
    let center = field.center();
    commands.spawn((
        Camera2d,
        OrthographicProjection {
            scaling_mode: ScalingMode::Fixed {
                width: field.width,
                height: field.height,
            },
            ..OrthographicProjection::default_2d()
        },
        Transform::from_xyz(center.x, center.y, 0.0),
    ));
}
