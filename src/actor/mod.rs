mod movement;
mod spawn;

use bevy::prelude::*;
use crate::shared::*;

pub use movement::{actor_movement, sync_actor_sprite};
pub use spawn::spawn_actor;

pub struct ActorPlugin;

impl Plugin for ActorPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                movement::actor_movement,
                movement::sync_actor_sprite.after(movement::actor_movement),
            )
                .in_set(GameplaySet::Movement),
        );
    }
}
