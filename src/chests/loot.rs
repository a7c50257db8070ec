//! Loot table rolls: rarity, point payout, orb split, coupon drop.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::shared::*;

/// Outcome of a coupon roll against the pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CouponDrop {
    /// The chance roll failed.
    Missed,
    /// The roll succeeded; this coupon is now marked used.
    Dropped(String),
    /// The roll succeeded but every coupon is already used.
    Exhausted,
}

/// Pick a tier by relative weight. The table must be non-empty.
pub fn roll_rarity<'a>(table: &'a [RarityTier], rng: &mut impl Rng) -> &'a RarityTier {
    let total: f32 = table.iter().map(|tier| tier.weight.max(0.0)).sum();
    if total <= 0.0 {
        return &table[0];
    }

    let mut roll = rng.gen_range(0.0..total);
    for tier in table {
        let weight = tier.weight.max(0.0);
        if roll < weight {
            return tier;
        }
        roll -= weight;
    }
    // Float residue can leave the roll a hair past the last bucket.
    table
        .iter()
        .rev()
        .find(|tier| tier.weight > 0.0)
        .unwrap_or(&table[0])
}

/// Uniform point payout within the tier's inclusive range.
pub fn roll_points(tier: &RarityTier, rng: &mut impl Rng) -> u64 {
    if tier.points_max <= tier.points_min {
        return tier.points_min;
    }
    rng.gen_range(tier.points_min..=tier.points_max)
}

/// Split a payout across orbs: `min(cap, points / per_orb)` orbs, at least
/// one when there is anything to pay. The last orb takes the remainder so
/// the amounts always sum to `points`.
pub fn split_orbs(points: u64, cap: u32, per_orb: u64) -> Vec<u64> {
    if points == 0 {
        return Vec::new();
    }
    let count = (points / per_orb.max(1)).clamp(1, cap.max(1) as u64);
    let share = points / count;
    let mut orbs = vec![share; count as usize];
    if let Some(last) = orbs.last_mut() {
        *last = points - share * (count - 1);
    }
    orbs
}

impl CouponPool {
    /// Roll `chance` and, on success, hand out one unused coupon picked
    /// uniformly. Dropped coupons are marked used and never drop again.
    pub fn roll_drop(&mut self, chance: f64, rng: &mut impl Rng) -> CouponDrop {
        if !rng.gen_bool(chance.clamp(0.0, 1.0)) {
            return CouponDrop::Missed;
        }

        let unused: Vec<usize> = self
            .coupons
            .iter()
            .enumerate()
            .filter(|(_, coupon)| !coupon.used)
            .map(|(idx, _)| idx)
            .collect();
        let Some(&idx) = unused.choose(rng) else {
            return CouponDrop::Exhausted;
        };

        let coupon = &mut self.coupons[idx];
        coupon.used = true;
        CouponDrop::Dropped(coupon.id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn pool(size: usize) -> CouponPool {
        CouponPool::new(
            (0..size)
                .map(|i| Coupon {
                    id: format!("coupon-{i}"),
                    used: false,
                })
                .collect(),
        )
    }

    #[test]
    fn test_rarity_distribution_matches_weights() {
        let table = SessionConfig::default().rarity_table;
        let mut rng = StdRng::seed_from_u64(42);
        let mut counts = [0usize; 4];
        let rolls = 100_000;
        for _ in 0..rolls {
            counts[roll_rarity(&table, &mut rng).rarity.index()] += 1;
        }
        let expected = [0.60, 0.25, 0.10, 0.05];
        for (rarity, (&count, &want)) in Rarity::ALL.iter().zip(counts.iter().zip(expected.iter())) {
            let got = count as f64 / rolls as f64;
            assert!(
                (got - want).abs() < 0.01,
                "{} proportion {} too far from {}",
                rarity.label(),
                got,
                want
            );
        }
    }

    #[test]
    fn test_zero_weight_tier_never_rolls() {
        let mut table = SessionConfig::default().rarity_table;
        table[3].weight = 0.0;
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..10_000 {
            assert_ne!(roll_rarity(&table, &mut rng).rarity, Rarity::Legendary);
        }
    }

    #[test]
    fn test_points_stay_in_range() {
        let config = SessionConfig::default();
        let mut rng = StdRng::seed_from_u64(9);
        for tier in &config.rarity_table {
            for _ in 0..1_000 {
                let points = roll_points(tier, &mut rng);
                assert!(points >= tier.points_min && points <= tier.points_max);
            }
        }
    }

    #[test]
    fn test_split_orbs_absorbs_remainder_in_last_orb() {
        let orbs = split_orbs(47, 20, 5);
        assert_eq!(orbs.len(), 9);
        assert!(orbs[..8].iter().all(|&amount| amount == 5));
        assert_eq!(orbs[8], 7);
        assert_eq!(orbs.iter().sum::<u64>(), 47);
    }

    #[test]
    fn test_split_orbs_caps_orb_count() {
        let orbs = split_orbs(487, 20, 5);
        assert_eq!(orbs.len(), 20);
        assert_eq!(orbs.iter().sum::<u64>(), 487);
    }

    #[test]
    fn test_split_orbs_small_payout_still_spawns_one() {
        assert_eq!(split_orbs(3, 20, 5), vec![3]);
        assert!(split_orbs(0, 20, 5).is_empty());
    }

    #[test]
    fn test_split_orbs_is_lossless_across_ranges() {
        for points in 1..=600 {
            let orbs = split_orbs(points, 20, 5);
            assert_eq!(orbs.iter().sum::<u64>(), points, "lost points for {points}");
            assert!(orbs.len() <= 20);
        }
    }

    #[test]
    fn test_used_coupon_never_drops_again() {
        let mut pool = pool(3);
        let mut rng = StdRng::seed_from_u64(11);
        let mut dropped = HashSet::new();
        let mut exhausted = 0;
        for _ in 0..8 {
            match pool.roll_drop(1.0, &mut rng) {
                CouponDrop::Dropped(id) => assert!(dropped.insert(id), "coupon dropped twice"),
                CouponDrop::Exhausted => exhausted += 1,
                CouponDrop::Missed => panic!("a certain roll missed"),
            }
        }
        assert_eq!(dropped.len(), 3);
        assert_eq!(exhausted, 5);
        assert_eq!(pool.unused_count(), 0);
    }

    #[test]
    fn test_pre_used_coupons_are_ineligible() {
        let mut pool = pool(2);
        pool.coupons[0].used = true;
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(
            pool.roll_drop(1.0, &mut rng),
            CouponDrop::Dropped("coupon-1".to_string())
        );
        assert_eq!(pool.roll_drop(1.0, &mut rng), CouponDrop::Exhausted);
    }

    #[test]
    fn test_zero_chance_never_touches_pool() {
        let mut pool = pool(2);
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            assert_eq!(pool.roll_drop(0.0, &mut rng), CouponDrop::Missed);
        }
        assert_eq!(pool.unused_count(), 2);
    }
}
