use bevy::prelude::*;
use crate::shared::*;

const ORB_SIZE: f32 = 8.0;
const ORB_COLOR: Color = Color::srgb(1.0, 0.85, 0.25);

pub fn spawn_orb(commands: &mut Commands, position: Vec2, amount: u64) -> Entity {
    commands
        .spawn((
            PointOrb { amount },
            Sprite::from_color(ORB_COLOR, Vec2::splat(ORB_SIZE)),
            Transform::from_xyz(position.x, position.y, 5.0),
        ))
        .id()
}

/// System: fly every orb toward the actor. An orb that reaches the actor
/// adds its amount to the score once and is despawned.
pub fn orb_travel(
    mut commands: Commands,
    time: Res<Time>,
    config: Res<SessionConfig>,
    actors: Query<&Transform, (With<Actor>, Without<PointOrb>)>,
    mut orbs: Query<(Entity, &mut Transform, &PointOrb)>,
    mut score: ResMut<Score>,
    mut score_events: EventWriter<ScoreUpdatedEvent>,
) {
    let Ok(actor) = actors.get_single() else {
        return;
    };
    let destination = actor.translation.truncate();
    let step = config.orbs.speed * time.delta_secs();

    for (entity, mut transform, orb) in orbs.iter_mut() {
        let position = transform.translation.truncate();
        let remaining = destination - position;
        let next = if remaining.length() <= step {
            destination
        } else {
            position + remaining.normalize_or_zero() * step
        };
        transform.translation.x = next.x;
        transform.translation.y = next.y;

        if next.distance(destination) <= config.orbs.pickup_radius {
            score.total += orb.amount;
            score_events.send(ScoreUpdatedEvent { score: score.total });
            commands.entity(entity).despawn();
        }
    }
}
