use bevy::prelude::*;
use crate::shared::*;

const ACTOR_SIZE: f32 = 32.0;

/// Spawn the actor at the playfield center. Returns `None` when one
/// already exists (the session is being resumed, not started).
pub fn spawn_actor(
    commands: &mut Commands,
    config: &SessionConfig,
    existing: &Query<Entity, With<Actor>>,
) -> Option<Entity> {
    if !existing.is_empty() {
        return None;
    }

    let center = config.playfield.center();
    let entity = commands
        .spawn((
            Actor {
                attack_damage: config.actor.attack_damage,
                speed: config.actor.speed,
            },
            ActorMotion::default(),
            Sprite::from_color(Color::srgb(0.25, 0.55, 0.85), Vec2::splat(ACTOR_SIZE)),
            // Z = 10 so the actor draws above chests.
            Transform::from_xyz(center.x, center.y, 10.0),
        ))
        .id();
    Some(entity)
}
