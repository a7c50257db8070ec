use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::chests::find_active_at;
use crate::shared::*;

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (read_pointer_input, handle_pointer_down)
                .chain()
                .in_set(GameplaySet::Input),
        );
    }
}

/// The single point where mouse clicks and touches become pointer events.
/// The camera shows exactly the playfield, so window pixels map linearly
/// onto playfield units (window y grows downward, playfield y upward).
pub fn read_pointer_input(
    mouse: Option<Res<ButtonInput<MouseButton>>>,
    touches: Option<Res<Touches>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    config: Res<SessionConfig>,
    mut pointer_events: EventWriter<PointerDownEvent>,
) {
    let Ok(window) = windows.get_single() else {
        return;
    };
    if window.width() <= 0.0 || window.height() <= 0.0 {
        return;
    }

    let mut presses: Vec<Vec2> = Vec::new();
    if let Some(mouse) = mouse {
        if mouse.just_pressed(MouseButton::Left) {
            if let Some(cursor) = window.cursor_position() {
                presses.push(cursor);
            }
        }
    }
    if let Some(touches) = touches {
        presses.extend(touches.iter_just_pressed().map(|touch| touch.position()));
    }

    let field = &config.playfield;
    for screen in presses {
        let position = Vec2::new(
            screen.x / window.width() * field.width,
            (window.height() - screen.y) / window.height() * field.height,
        );
        pointer_events.send(PointerDownEvent { position });
    }
}

/// System: turn a pointer press into a movement or attack intent.
///
/// Presses inside the autoplay toggle zone only flip autoplay. Any other
/// press cancels the running attack sequence first; a press on a live
/// chest then approaches it with a fresh manual sequence, and a press on
/// open ground is a plain move.
pub fn handle_pointer_down(
    mut commands: Commands,
    mut pointer_events: EventReader<PointerDownEvent>,
    mut toggle_events: EventWriter<ToggleAutoplayEvent>,
    config: Res<SessionConfig>,
    mut actors: Query<
        (Entity, &Actor, &mut ActorMotion, &Transform, Option<&AttackSequence>),
        Without<Chest>,
    >,
    chests: Query<(Entity, &Chest, &Transform)>,
) {
    for event in pointer_events.read() {
        if config.autoplay_toggle_zone.contains(event.position) {
            toggle_events.send(ToggleAutoplayEvent);
            continue;
        }

        let Ok((entity, actor, mut motion, transform, sequence)) = actors.get_single_mut() else {
            continue;
        };
        if sequence.is_some() {
            commands.entity(entity).remove::<AttackSequence>();
        }
        motion.end_attack();

        let from = transform.translation.truncate();
        let candidates = chests
            .iter()
            .map(|(entity, chest, transform)| (entity, chest, transform.translation.truncate()));
        match find_active_at(candidates, event.position, config.chest_hit_radius) {
            Some(target) => {
                motion.move_toward(
                    from,
                    target.last_known,
                    config.autoplay.standoff_distance,
                    actor.speed,
                    &config.playfield,
                );
                commands.entity(entity).insert(AttackSequence::new(
                    target,
                    config.actor.attack_interval_ms,
                    SequenceOrigin::Manual,
                ));
            }
            None => {
                motion.move_to(from, event.position, actor.speed, &config.playfield);
            }
        }
    }
}
