//! Autoplay controller.
//!
//! Two states, Idle and Active, switched only by an explicit toggle. While
//! Active, an actor that is neither moving nor attacking is sent toward the
//! nearest live chest with an attack sequence attached. When no chest is
//! live, or the previous target vanished, acquisition waits on a one-shot
//! delay before trying again.

mod sequence;

use std::time::Duration;

use bevy::prelude::*;
use crate::chests::nearest_chest;
use crate::shared::*;

pub use sequence::run_attack_sequences;

pub struct AutoplayPlugin;

impl Plugin for AutoplayPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AutoplayMode>();
        app.init_resource::<AutoplayRetry>();
        app.add_systems(
            Update,
            (apply_autoplay_toggle, autoplay_acquire)
                .chain()
                .in_set(GameplaySet::Autoplay),
        );
        app.add_systems(
            Update,
            sequence::run_attack_sequences.in_set(GameplaySet::Combat),
        );
    }
}

/// One-shot delay gating the next acquisition attempt.
#[derive(Resource, Debug, Default)]
pub struct AutoplayRetry {
    pub timer: Option<Timer>,
}

impl AutoplayRetry {
    pub fn schedule(&mut self, delay_ms: u64) {
        self.timer = Some(Timer::new(Duration::from_millis(delay_ms), TimerMode::Once));
    }

    pub fn clear(&mut self) {
        self.timer = None;
    }

    pub fn is_pending(&self) -> bool {
        self.timer.is_some()
    }

    /// Advance the delay. Returns true once acquisition may run.
    pub fn tick(&mut self, delta: Duration) -> bool {
        let Some(timer) = self.timer.as_mut() else {
            return true;
        };
        timer.tick(delta);
        if timer.finished() {
            self.timer = None;
            return true;
        }
        false
    }
}

/// System: flip autoplay on toggle. Turning it off cancels whatever
/// attack sequence is running, manual or not, and leaves the actor idle.
pub fn apply_autoplay_toggle(
    mut commands: Commands,
    mut toggles: EventReader<ToggleAutoplayEvent>,
    mut mode: ResMut<AutoplayMode>,
    mut retry: ResMut<AutoplayRetry>,
    mut actors: Query<(Entity, &mut ActorMotion, Has<AttackSequence>), With<Actor>>,
) {
    let flips = toggles.read().count();
    if flips % 2 == 0 {
        return;
    }
    mode.enabled = !mode.enabled;
    retry.clear();
    info!("[Autoplay] {}", if mode.enabled { "on" } else { "off" });

    if mode.enabled {
        return;
    }
    for (entity, mut motion, running) in actors.iter_mut() {
        if running {
            commands.entity(entity).remove::<AttackSequence>();
        }
        motion.end_attack();
        motion.stop();
    }
}

/// System: step 1 of the controller. Picks the nearest live chest for an
/// idle actor and starts an attack sequence on it.
pub fn autoplay_acquire(
    mut commands: Commands,
    time: Res<Time>,
    config: Res<SessionConfig>,
    mode: Res<AutoplayMode>,
    mut retry: ResMut<AutoplayRetry>,
    mut actors: Query<
        (Entity, &Actor, &mut ActorMotion, &Transform),
        Without<AttackSequence>,
    >,
    chests: Query<(Entity, &Chest, &Transform), Without<Actor>>,
) {
    if !mode.enabled {
        return;
    }
    if !retry.tick(time.delta()) {
        return;
    }

    let Ok((entity, actor, mut motion, transform)) = actors.get_single_mut() else {
        return;
    };
    if motion.is_attacking || motion.is_moving {
        return;
    }

    let from = transform.translation.truncate();
    let candidates = chests
        .iter()
        .map(|(entity, chest, transform)| (entity, chest, transform.translation.truncate()));
    let Some(target) = nearest_chest(candidates, from) else {
        retry.schedule(config.autoplay.retry_delay_ms);
        return;
    };

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
        SequenceOrigin::Autoplay,
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_is_ready_without_a_pending_delay() {
        let mut retry = AutoplayRetry::default();
        assert!(retry.tick(Duration::ZERO));
    }

    #[test]
    fn test_retry_waits_for_the_full_delay() {
        let mut retry = AutoplayRetry::default();
        retry.schedule(300);
        assert!(!retry.tick(Duration::from_millis(200)));
        assert!(retry.is_pending());
        assert!(retry.tick(Duration::from_millis(100)));
        assert!(!retry.is_pending());
    }

    #[test]
    fn test_clear_drops_the_delay() {
        let mut retry = AutoplayRetry::default();
        retry.schedule(1_000);
        retry.clear();
        assert!(retry.tick(Duration::ZERO));
    }
}
