use std::fs;
use std::path::Path;

use crate::shared::*;

pub const SESSION_CONFIG_PATH: &str = "assets/config/session.ron";

/// Read and validate a session config from a RON file.
pub fn load_session_config(path: &Path) -> Result<SessionConfig, String> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("Read failed for {}: {}", path.display(), e))?;
    let config: SessionConfig = ron::from_str(&text)
        .map_err(|e| format!("Parse failed for {}: {}", path.display(), e))?;
    config.validate()?;
    Ok(config)
}

impl SessionConfig {
    /// Every float the session does geometry or rolls with. NaN slips past
    /// ordinary comparisons, so these are screened first.
    fn float_fields(&self) -> Vec<(String, f32)> {
        let mut fields = vec![
            ("playfield width".to_string(), self.playfield.width),
            ("playfield height".to_string(), self.playfield.height),
            ("playfield margin".to_string(), self.playfield.margin),
            ("actor speed".to_string(), self.actor.speed),
            ("arrival threshold".to_string(), self.actor.arrival_threshold),
            ("standoff distance".to_string(), self.autoplay.standoff_distance),
            ("attack range".to_string(), self.autoplay.attack_range),
            ("orb speed".to_string(), self.orbs.speed),
            ("orb pickup radius".to_string(), self.orbs.pickup_radius),
            ("orb scatter radius".to_string(), self.orbs.scatter_radius),
            ("chest hit radius".to_string(), self.chest_hit_radius),
            ("toggle zone x".to_string(), self.autoplay_toggle_zone.x),
            ("toggle zone y".to_string(), self.autoplay_toggle_zone.y),
            ("toggle zone width".to_string(), self.autoplay_toggle_zone.width),
            ("toggle zone height".to_string(), self.autoplay_toggle_zone.height),
        ];
        fields.extend(
            self.rarity_table
                .iter()
                .map(|tier| (format!("{} weight", tier.rarity.label()), tier.weight)),
        );
        fields
    }

    pub fn validate(&self) -> Result<(), String> {
        if let Some((name, value)) = self
            .float_fields()
            .into_iter()
            .find(|(_, value)| !value.is_finite())
        {
            return Err(format!("{} is not a finite number ({})", name, value));
        }
        if self.rarity_table.is_empty() {
            return Err("rarity table is empty".to_string());
        }
        let total_weight: f32 = self.rarity_table.iter().map(|t| t.weight).sum();
        if !total_weight.is_finite() || total_weight <= 0.0 {
            return Err(format!("rarity weights sum to {}", total_weight));
        }
        for tier in &self.rarity_table {
            let name = tier.rarity.label();
            if tier.weight < 0.0 {
                return Err(format!("{} has negative weight {}", name, tier.weight));
            }
            if tier.hp == 0 {
                return Err(format!("{} has zero hp", name));
            }
            if tier.points_min > tier.points_max {
                return Err(format!(
                    "{} point range {}..{} is inverted",
                    name, tier.points_min, tier.points_max
                ));
            }
            if !(0.0..=1.0).contains(&tier.coupon_chance) {
                return Err(format!(
                    "{} coupon chance {} is outside [0, 1]",
                    name, tier.coupon_chance
                ));
            }
        }

        let field = &self.playfield;
        if field.margin < 0.0 || field.margin * 2.0 >= field.width.min(field.height) {
            return Err(format!(
                "playfield {}x{} cannot hold margin {}",
                field.width, field.height, field.margin
            ));
        }
        if self.actor.speed <= 0.0 || self.orbs.speed <= 0.0 {
            return Err("actor and orb speed must be positive".to_string());
        }
        if self.actor.attack_interval_ms == 0 {
            return Err("attack interval must be non-zero".to_string());
        }
        if self.orbs.points_per_orb == 0 || self.orbs.max_orbs == 0 {
            return Err("orb split needs a non-zero divisor and cap".to_string());
        }
        if self.autoplay.standoff_distance >= self.autoplay.attack_range {
            return Err(format!(
                "standoff {} must be inside attack range {}",
                self.autoplay.standoff_distance, self.autoplay.attack_range
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(SessionConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_default_table_matches_design() {
        let config = SessionConfig::default();
        let legendary = config.tier(Rarity::Legendary).unwrap();
        assert_eq!(legendary.hp, 150);
        assert_eq!((legendary.points_min, legendary.points_max), (300, 500));
        assert_eq!(config.tier(Rarity::Common).unwrap().weight, 60.0);
        assert_eq!(config.initial_chest_count, 4);
    }

    #[test]
    fn test_rejects_inverted_point_range() {
        let mut config = SessionConfig::default();
        config.rarity_table[1].points_min = 200;
        let err = config.validate().unwrap_err();
        assert!(err.contains("rare"), "unexpected error: {err}");
    }

    #[test]
    fn test_rejects_coupon_chance_above_one() {
        let mut config = SessionConfig::default();
        config.rarity_table[0].coupon_chance = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_all_zero_weights() {
        let mut config = SessionConfig::default();
        for tier in config.rarity_table.iter_mut() {
            tier.weight = 0.0;
        }
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_non_finite_floats() {
        let mut config = SessionConfig::default();
        config.playfield.margin = f32::NAN;
        let err = config.validate().unwrap_err();
        assert!(err.contains("playfield margin"), "unexpected error: {err}");

        let mut config = SessionConfig::default();
        config.rarity_table[3].weight = f32::INFINITY;
        let err = config.validate().unwrap_err();
        assert!(err.contains("legendary weight"), "unexpected error: {err}");

        let mut config = SessionConfig::default();
        config.autoplay.attack_range = f32::NAN;
        assert!(config.validate().is_err());

        let mut config = SessionConfig::default();
        config.actor.speed = f32::NEG_INFINITY;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_oversized_margin() {
        let mut config = SessionConfig::default();
        config.playfield.margin = 200.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_ron_round_trip_keeps_coupons() {
        let mut config = SessionConfig::default();
        config.coupons = vec![Coupon {
            id: "FREE-DRINK".to_string(),
            used: false,
        }];
        config.seed = Some(7);
        let text = ron::to_string(&config).unwrap();
        let parsed: SessionConfig = ron::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_shipped_config_parses() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(SESSION_CONFIG_PATH);
        let config = load_session_config(&path).unwrap();
        assert_eq!(config.rarity_table.len(), 4);
    }
}
