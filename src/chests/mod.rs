//! Chest domain plugin for Chest Rush.
//!
//! Provides:
//! - Weighted rarity rolls and chest spawning inside the playfield
//! - Live-set queries (nearest chest, chest at a point, token re-validation)
//! - Combat resolution and the destruction sequence (points, orbs,
//!   coupon drop, one-for-one respawn)
//! - Point orbs that fly to the actor and feed the score
//! - HP indicators proportional to remaining hit points

pub mod combat;
pub mod loot;
pub mod orbs;
pub mod spawning;

use std::time::Duration;

use bevy::prelude::*;
use crate::shared::*;

pub use combat::{attack, AttackOutcome, ChestBreaker};
pub use loot::{roll_points, roll_rarity, split_orbs, CouponDrop};
pub use spawning::{
    find_active_at, nearest_chest, resolve_chest, ChestHpBar, ChestSpawner, CHEST_SIZE,
};

pub struct ChestsPlugin;

impl Plugin for ChestsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ChestLedger>();
        app.add_systems(
            Update,
            (
                sync_hp_bars,
                (flash_hit_chests, fade_hit_flash).chain(),
                orbs::orb_travel,
            )
                .in_set(GameplaySet::Rewards),
        );
    }
}

/// System: scale each chest's HP bar to `current_hp / max_hp`.
pub fn sync_hp_bars(
    chests: Query<(&Chest, &Children), Changed<Chest>>,
    mut bars: Query<&mut Transform, With<ChestHpBar>>,
) {
    for (chest, children) in chests.iter() {
        for &child in children.iter() {
            if let Ok(mut transform) = bars.get_mut(child) {
                transform.scale.x = chest.hp_ratio();
            }
        }
    }
}

const HIT_FLASH_MS: u64 = 80;
const HIT_FLASH_COLOR: Color = Color::WHITE;

/// A chest that was just struck and is drawn in the flash color.
#[derive(Component, Debug)]
pub struct HitFlash {
    pub timer: Timer,
}

/// System: flash every chest that took a hit this frame and survived it.
pub fn flash_hit_chests(
    mut commands: Commands,
    mut hits: EventReader<ChestHitEvent>,
    mut chests: Query<(Entity, &Chest, &mut Sprite)>,
) {
    for hit in hits.read() {
        if hit.remaining_hp == 0 {
            continue;
        }
        let Some((entity, _, mut sprite)) = chests
            .iter_mut()
            .find(|(_, chest, _)| chest.id == hit.chest_id)
        else {
            continue;
        };
        sprite.color = HIT_FLASH_COLOR;
        commands.entity(entity).try_insert(HitFlash {
            timer: Timer::new(Duration::from_millis(HIT_FLASH_MS), TimerMode::Once),
        });
    }
}

/// System: restore the rarity color once a flash runs out.
pub fn fade_hit_flash(
    mut commands: Commands,
    time: Res<Time>,
    mut flashing: Query<(Entity, &Chest, &mut Sprite, &mut HitFlash)>,
) {
    for (entity, chest, mut sprite, mut flash) in flashing.iter_mut() {
        flash.timer.tick(time.delta());
        if flash.timer.finished() {
            sprite.color = chest.rarity.color();
            commands.entity(entity).remove::<HitFlash>();
        }
    }
}
