//! Combat resolution: damage, destruction, reward emission, respawn.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use rand::Rng;

use crate::shared::*;
use super::loot::{roll_points, split_orbs, CouponDrop};
use super::orbs::spawn_orb;
use super::spawning::ChestSpawner;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackOutcome {
    /// The chest was already at zero HP. Nothing happened.
    Ignored,
    Damaged { remaining: u32 },
    Destroyed,
}

/// Apply `damage` to a chest. HP never drops below zero and a chest at
/// zero is never damaged again.
pub fn attack(chest: &mut Chest, damage: u32) -> AttackOutcome {
    if !chest.is_alive() {
        return AttackOutcome::Ignored;
    }
    chest.current_hp = chest.current_hp.saturating_sub(damage);
    if chest.current_hp == 0 {
        AttackOutcome::Destroyed
    } else {
        AttackOutcome::Damaged {
            remaining: chest.current_hp,
        }
    }
}

/// Combat resolution plus the destruction sequence it triggers.
#[derive(SystemParam)]
pub struct ChestBreaker<'w, 's> {
    pub spawner: ChestSpawner<'w, 's>,
    coupons: ResMut<'w, CouponPool>,
    hit_events: EventWriter<'w, ChestHitEvent>,
    destroyed_events: EventWriter<'w, ChestDestroyedEvent>,
    coupon_events: EventWriter<'w, CouponCollectedEvent>,
}

impl ChestBreaker<'_, '_> {
    /// Hit a chest once. On zero HP the chest is removed, its rewards are
    /// emitted, and exactly one replacement is spawned in the same command
    /// batch, so the live count never visibly dips.
    pub fn strike(
        &mut self,
        entity: Entity,
        chest: &mut Chest,
        position: Vec2,
        damage: u32,
    ) -> AttackOutcome {
        let outcome = attack(chest, damage);
        if outcome == AttackOutcome::Ignored {
            return outcome;
        }

        self.spawner.ledger.hits += 1;
        self.hit_events.send(ChestHitEvent {
            chest_id: chest.id,
            damage,
            remaining_hp: chest.current_hp,
        });

        if outcome == AttackOutcome::Destroyed {
            self.destroy(entity, chest, position);
        }
        outcome
    }

    fn destroy(&mut self, entity: Entity, chest: &Chest, position: Vec2) {
        self.spawner.commands.entity(entity).despawn_recursive();

        let Some(tier) = self.spawner.config.tier(chest.rarity).cloned() else {
            warn!(
                "[Chests] No tier for {} chest {:?}; skipping rewards",
                chest.rarity.label(),
                chest.id
            );
            self.spawner.spawn_chest();
            return;
        };

        let points = roll_points(&tier, &mut self.spawner.rng.0);
        let orbs = self.spawner.config.orbs.clone();
        for amount in split_orbs(points, orbs.max_orbs, orbs.points_per_orb) {
            let scatter = Vec2::new(
                self.spawner.rng.0.gen_range(-1.0..=1.0),
                self.spawner.rng.0.gen_range(-1.0..=1.0),
            ) * orbs.scatter_radius;
            spawn_orb(&mut self.spawner.commands, position + scatter, amount);
        }

        match self.coupons.roll_drop(tier.coupon_chance, &mut self.spawner.rng.0) {
            CouponDrop::Dropped(coupon_id) => {
                info!("[Chests] Coupon {} dropped from {} chest", coupon_id, tier.rarity.label());
                self.coupon_events.send(CouponCollectedEvent { coupon_id });
            }
            CouponDrop::Exhausted => {
                info!("[Chests] Coupon roll won but the pool is exhausted");
            }
            CouponDrop::Missed => {}
        }

        self.spawner.ledger.destroyed += 1;
        self.spawner.ledger.points_rolled += points;
        self.destroyed_events.send(ChestDestroyedEvent {
            chest_id: chest.id,
            rarity: chest.rarity,
            points,
            position,
        });
        info!(
            "[Chests] {} chest {:?} destroyed for {} points",
            tier.rarity.label(),
            chest.id,
            points
        );

        self.spawner.spawn_chest();
    }
}
