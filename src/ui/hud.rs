use bevy::prelude::*;
use crate::shared::*;

#[derive(Component)]
pub struct HudScoreText;

#[derive(Component)]
pub struct HudAutoplayLabel;

#[derive(Component)]
pub struct HudPauseBanner;

/// Shows the payout of the most recently broken chest.
#[derive(Component)]
pub struct HudRewardTicker;

const AUTO_ON: Color = Color::srgb(0.35, 0.85, 0.45);
const AUTO_OFF: Color = Color::srgb(0.55, 0.55, 0.60);

fn percent(value: f32, total: f32) -> Val {
    Val::Percent(value / total * 100.0)
}

pub fn spawn_hud(mut commands: Commands, config: Res<SessionConfig>) {
    // Score, top-left
    commands.spawn((
        HudScoreText,
        Text::new("0"),
        TextFont {
            font_size: 22.0,
            ..default()
        },
        TextColor(Color::srgb(1.0, 0.84, 0.0)),
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(12.0),
            top: Val::Px(8.0),
            ..default()
        },
        PickingBehavior::IGNORE,
    ));

    commands.spawn((
        HudRewardTicker,
        Text::new(""),
        TextFont {
            font_size: 14.0,
            ..default()
        },
        TextColor(Color::srgb(0.95, 0.95, 0.85)),
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(12.0),
            top: Val::Px(36.0),
            ..default()
        },
        PickingBehavior::IGNORE,
    ));

    // Autoplay toggle, drawn over the configured hit zone. The zone is in
    // playfield units with y up; UI nodes are laid out from the top.
    let field = &config.playfield;
    let zone = &config.autoplay_toggle_zone;
    commands
        .spawn((
            HudAutoplayLabel,
            Node {
                position_type: PositionType::Absolute,
                left: percent(zone.x, field.width),
                top: percent(field.height - (zone.y + zone.height), field.height),
                width: percent(zone.width, field.width),
                height: percent(zone.height, field.height),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                border: UiRect::all(Val::Px(2.0)),
                ..default()
            },
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.5)),
            BorderColor(AUTO_OFF),
            PickingBehavior::IGNORE,
        ))
        .with_children(|button| {
            button.spawn((
                Text::new("AUTO"),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(AUTO_OFF),
                PickingBehavior::IGNORE,
            ));
        });

    commands.spawn((
        HudPauseBanner,
        Text::new("PAUSED"),
        TextFont {
            font_size: 32.0,
            ..default()
        },
        TextColor(Color::WHITE),
        Node {
            position_type: PositionType::Absolute,
            left: Val::Percent(30.0),
            top: Val::Percent(45.0),
            ..default()
        },
        Visibility::Hidden,
        PickingBehavior::IGNORE,
    ));
}

pub fn update_score_display(
    score: Res<Score>,
    mut query: Query<&mut Text, With<HudScoreText>>,
) {
    if !score.is_changed() {
        return;
    }
    for mut text in &mut query {
        **text = score.total.to_string();
    }
}

pub fn update_autoplay_label(
    mode: Res<AutoplayMode>,
    mut labels: Query<(&mut BorderColor, &Children), With<HudAutoplayLabel>>,
    mut texts: Query<&mut TextColor>,
) {
    if !mode.is_changed() {
        return;
    }
    let color = if mode.enabled { AUTO_ON } else { AUTO_OFF };
    for (mut border, children) in &mut labels {
        border.0 = color;
        for &child in children.iter() {
            if let Ok(mut text_color) = texts.get_mut(child) {
                text_color.0 = color;
            }
        }
    }
}

pub fn update_pause_banner(
    state: Res<State<GameState>>,
    mut banners: Query<&mut Visibility, With<HudPauseBanner>>,
) {
    if !state.is_changed() {
        return;
    }
    let visibility = if *state.get() == GameState::Paused {
        Visibility::Inherited
    } else {
        Visibility::Hidden
    };
    for mut banner in &mut banners {
        *banner = visibility;
    }
}

pub fn reward_label(event: &ChestDestroyedEvent) -> String {
    format!("+{} {}", event.points, event.rarity.label())
}

pub fn update_reward_ticker(
    mut destroyed: EventReader<ChestDestroyedEvent>,
    mut tickers: Query<(&mut Text, &mut TextColor), With<HudRewardTicker>>,
) {
    let Some(latest) = destroyed.read().last() else {
        return;
    };
    let label = reward_label(latest);
    for (mut text, mut color) in &mut tickers {
        **text = label.clone();
        color.0 = latest.rarity.color();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reward_label_shows_points_and_rarity() {
        let event = ChestDestroyedEvent {
            chest_id: ChestId(3),
            rarity: Rarity::Epic,
            points: 215,
            position: Vec2::ZERO,
        };
        assert_eq!(reward_label(&event), "+215 epic");
    }
}
