use bevy::prelude::*;

use crate::chests::{resolve_chest, ChestBreaker};
use crate::shared::*;
use super::AutoplayRetry;

/// System: fire every actor's attack-acquisition timer.
///
/// On each firing the captured chest is re-validated by its liveness token.
/// A vanished target ends the sequence (autoplay then re-acquires after a
/// short delay); a target in range is attacked; a target out of range with
/// the actor at rest gets a fresh approach.
pub fn run_attack_sequences(
    mut commands: Commands,
    time: Res<Time>,
    mode: Res<AutoplayMode>,
    mut retry: ResMut<AutoplayRetry>,
    mut actors: Query<
        (Entity, &Actor, &mut ActorMotion, &Transform, &mut AttackSequence),
        Without<Chest>,
    >,
    mut chests: Query<(Entity, &mut Chest, &Transform)>,
    mut breaker: ChestBreaker,
) {
    let attack_range = breaker.spawner.config.autoplay.attack_range;
    let standoff = breaker.spawner.config.autoplay.standoff_distance;
    let reacquire_delay = breaker.spawner.config.autoplay.reacquire_delay_ms;
    let field = breaker.spawner.config.playfield;

    for (entity, actor, mut motion, transform, mut sequence) in actors.iter_mut() {
        sequence.timer.tick(time.delta());
        if !sequence.timer.just_finished() {
            continue;
        }

        if sequence.origin == SequenceOrigin::Autoplay && !mode.enabled {
            commands.entity(entity).remove::<AttackSequence>();
            motion.end_attack();
            motion.stop();
            continue;
        }

        let Some(chest_position) = resolve_chest(&chests, &sequence.target) else {
            commands.entity(entity).remove::<AttackSequence>();
            motion.end_attack();
            // The approach point belonged to the vanished chest.
            motion.stop();
            if sequence.origin == SequenceOrigin::Autoplay {
                retry.schedule(reacquire_delay);
            }
            continue;
        };
        sequence.target.last_known = chest_position;

        let actor_position = transform.translation.truncate();
        if actor_position.distance(chest_position) < attack_range {
            motion.begin_attack();
            if let Ok((chest_entity, mut chest, _)) = chests.get_mut(sequence.target.entity) {
                breaker.strike(chest_entity, &mut chest, chest_position, actor.attack_damage);
            }
        } else if !motion.is_moving {
            motion.end_attack();
            motion.move_toward(actor_position, chest_position, standoff, actor.speed, &field);
        }
    }
}
