//! Session wiring: states, events, frame order, and the domain plugins.
//!
//! Both the windowed binary and the headless tests build a session through
//! `SessionPlugin`, so the simulation is identical in the two.

use bevy::prelude::*;

use crate::actor::{spawn_actor, ActorPlugin};
use crate::autoplay::AutoplayPlugin;
use crate::bridge::{BridgePlugin, HostChannel};
use crate::chests::{ChestSpawner, ChestsPlugin};
use crate::data::DataPlugin;
use crate::input::InputPlugin;
use crate::shared::*;

#[derive(Default)]
pub struct SessionPlugin {
    /// Host side of the bridge. Keep a clone to read messages and send
    /// commands.
    pub channel: HostChannel,
}

impl Plugin for SessionPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GameState>()
            .init_resource::<Score>()
            .init_resource::<CouponPool>()
            .init_resource::<SessionRng>()
            .add_event::<ScoreUpdatedEvent>()
            .add_event::<CouponCollectedEvent>()
            .add_event::<SceneReadyEvent>()
            .add_event::<ChestHitEvent>()
            .add_event::<ChestDestroyedEvent>()
            .add_event::<ToggleAutoplayEvent>()
            .add_event::<PointerDownEvent>();

        app.configure_sets(
            Update,
            (
                GameplaySet::Host,
                GameplaySet::Input,
                GameplaySet::Autoplay,
                GameplaySet::Movement,
                GameplaySet::Combat,
                GameplaySet::Rewards,
                GameplaySet::Bridge,
            )
                .chain(),
        );
        // Host and Bridge stay live while paused so the host can resume.
        for set in [
            GameplaySet::Input,
            GameplaySet::Autoplay,
            GameplaySet::Movement,
            GameplaySet::Combat,
            GameplaySet::Rewards,
        ] {
            app.configure_sets(Update, set.run_if(in_state(GameState::Playing)));
        }

        app.add_plugins((
            DataPlugin,
            ActorPlugin,
            ChestsPlugin,
            AutoplayPlugin,
            InputPlugin,
            BridgePlugin {
                channel: self.channel.clone(),
            },
        ));

        app.add_systems(OnEnter(GameState::Playing), setup_session);
    }
}

/// Runs on every entry into Playing. Only the first entry builds the
/// scene; resuming from Paused finds the actor already there.
fn setup_session(
    mut spawner: ChestSpawner,
    actors: Query<Entity, With<Actor>>,
    mut ready_events: EventWriter<SceneReadyEvent>,
) {
    if spawn_actor(&mut spawner.commands, &spawner.config, &actors).is_none() {
        return;
    }
    let count = spawner.config.initial_chest_count;
    spawner.spawn_initial(count);
    ready_events.send(SceneReadyEvent);
    info!("[Session] Scene ready");
}
