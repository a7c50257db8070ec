//! Chest spawning and live-set queries.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use rand::Rng;

use crate::shared::*;
use super::loot::roll_rarity;

pub const CHEST_SIZE: f32 = 40.0;
const HP_BAR_HEIGHT: f32 = 5.0;
const HP_BAR_COLOR: Color = Color::srgb(0.85, 0.20, 0.20);

/// Marker for the HP indicator child drawn above each chest.
#[derive(Component, Debug)]
pub struct ChestHpBar;

/// Everything needed to put a new chest into the live set.
#[derive(SystemParam)]
pub struct ChestSpawner<'w, 's> {
    pub commands: Commands<'w, 's>,
    pub config: Res<'w, SessionConfig>,
    pub rng: ResMut<'w, SessionRng>,
    pub ledger: ResMut<'w, ChestLedger>,
}

impl ChestSpawner<'_, '_> {
    /// Roll a rarity and a position, then spawn the chest at full HP.
    pub fn spawn_chest(&mut self) -> Entity {
        let tier = roll_rarity(&self.config.rarity_table, &mut self.rng.0).clone();
        let min = self.config.playfield.inner_min();
        let max = self.config.playfield.inner_max();
        let position = Vec2::new(
            self.rng.0.gen_range(min.x..=max.x),
            self.rng.0.gen_range(min.y..=max.y),
        );
        self.spawn_chest_at(&tier, position)
    }

    pub fn spawn_initial(&mut self, count: usize) {
        for _ in 0..count {
            self.spawn_chest();
        }
        info!("[Chests] Spawned {} initial chests", count);
    }

    /// Spawn a chest of a given tier at a fixed position.
    pub fn spawn_chest_at(&mut self, tier: &RarityTier, position: Vec2) -> Entity {
        let position = self.config.playfield.clamp_inner(position);
        let chest = Chest::new(self.ledger.issue_id(), tier);
        self.ledger.spawned += 1;

        self.commands
            .spawn((
                Sprite::from_color(tier.rarity.color(), Vec2::splat(CHEST_SIZE)),
                Transform::from_xyz(position.x, position.y, 1.0),
                chest,
            ))
            .with_children(|parent| {
                parent.spawn((
                    ChestHpBar,
                    Sprite::from_color(HP_BAR_COLOR, Vec2::new(CHEST_SIZE, HP_BAR_HEIGHT)),
                    Transform::from_xyz(0.0, CHEST_SIZE * 0.5 + 6.0, 0.1),
                ));
            })
            .id()
    }
}

/// The live chest closest to `from`. Ties go to the first one seen.
pub fn nearest_chest<'a, I>(chests: I, from: Vec2) -> Option<ChestRef>
where
    I: IntoIterator<Item = (Entity, &'a Chest, Vec2)>,
{
    let mut best: Option<(f32, ChestRef)> = None;
    for (entity, chest, position) in chests {
        if !chest.is_alive() {
            continue;
        }
        let distance = from.distance_squared(position);
        if best.as_ref().map_or(true, |(d, _)| distance < *d) {
            best = Some((
                distance,
                ChestRef {
                    entity,
                    id: chest.id,
                    last_known: position,
                },
            ));
        }
    }
    best.map(|(_, found)| found)
}

/// A live chest whose center is within `tolerance` of `point`.
pub fn find_active_at<'a, I>(chests: I, point: Vec2, tolerance: f32) -> Option<ChestRef>
where
    I: IntoIterator<Item = (Entity, &'a Chest, Vec2)>,
{
    chests
        .into_iter()
        .find(|(_, chest, position)| chest.is_alive() && position.distance(point) <= tolerance)
        .map(|(entity, chest, position)| ChestRef {
            entity,
            id: chest.id,
            last_known: position,
        })
}

/// Re-validate a captured reference by its liveness token. Returns the
/// chest's current position when it is still the same, undamaged-to-zero
/// chest that was captured.
pub fn resolve_chest(chests: &Query<(Entity, &mut Chest, &Transform)>, target: &ChestRef) -> Option<Vec2> {
    let Ok((_, chest, transform)) = chests.get(target.entity) else {
        return None;
    };
    if chest.id != target.id || !chest.is_alive() {
        return None;
    }
    Some(transform.translation.truncate())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tier(rarity: Rarity) -> RarityTier {
        SessionConfig::default().tier(rarity).unwrap().clone()
    }

    fn chest(id: u64, rarity: Rarity) -> Chest {
        Chest::new(ChestId(id), &tier(rarity))
    }

    #[test]
    fn test_nearest_picks_minimum_distance() {
        let a = chest(1, Rarity::Common);
        let b = chest(2, Rarity::Legendary);
        let list = vec![
            (Entity::from_raw(1), &a, Vec2::new(300.0, 300.0)),
            (Entity::from_raw(2), &b, Vec2::new(110.0, 100.0)),
        ];
        let found = nearest_chest(list, Vec2::new(100.0, 100.0)).unwrap();
        assert_eq!(found.id, ChestId(2));
        assert_eq!(found.last_known, Vec2::new(110.0, 100.0));
    }

    #[test]
    fn test_nearest_tie_goes_to_first_seen() {
        let a = chest(1, Rarity::Common);
        let b = chest(2, Rarity::Epic);
        let list = vec![
            (Entity::from_raw(1), &a, Vec2::new(90.0, 100.0)),
            (Entity::from_raw(2), &b, Vec2::new(110.0, 100.0)),
        ];
        assert_eq!(nearest_chest(list, Vec2::new(100.0, 100.0)).unwrap().id, ChestId(1));
    }

    #[test]
    fn test_nearest_skips_destroyed_and_handles_empty() {
        let mut dead = chest(1, Rarity::Common);
        dead.current_hp = 0;
        let list = vec![(Entity::from_raw(1), &dead, Vec2::new(100.0, 100.0))];
        assert!(nearest_chest(list, Vec2::ZERO).is_none());
        assert!(nearest_chest(Vec::new(), Vec2::ZERO).is_none());
    }

    #[test]
    fn test_find_active_at_respects_tolerance() {
        let a = chest(7, Rarity::Rare);
        let list = vec![(Entity::from_raw(3), &a, Vec2::new(100.0, 100.0))];
        assert!(find_active_at(list.clone(), Vec2::new(110.0, 100.0), 24.0).is_some());
        assert!(find_active_at(list, Vec2::new(130.0, 100.0), 24.0).is_none());
    }

    #[test]
    fn test_find_active_at_ignores_destroyed() {
        let mut dead = chest(7, Rarity::Rare);
        dead.current_hp = 0;
        let list = vec![(Entity::from_raw(3), &dead, Vec2::new(100.0, 100.0))];
        assert!(find_active_at(list, Vec2::new(100.0, 100.0), 24.0).is_none());
    }
}
