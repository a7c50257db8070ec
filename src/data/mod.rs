//! Data layer: installs the session configuration at startup.
//!
//! This plugin runs in OnEnter(GameState::Loading). It keeps a config the
//! host injected before startup, otherwise reads `assets/config/session.ron`
//! and falls back to the built-in defaults. It then seeds the session RNG,
//! fills the coupon pool, and transitions the game into GameState::Playing.

pub mod config;

use bevy::prelude::*;
use crate::bridge::SaveThrottle;
use crate::shared::*;

pub use config::{load_session_config, SESSION_CONFIG_PATH};

pub struct DataPlugin;

impl Plugin for DataPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::Loading), install_session_config);
    }
}

fn install_session_config(
    mut commands: Commands,
    injected: Option<Res<SessionConfig>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let config = match injected {
        Some(config) => {
            info!("[Data] Using host-supplied session config");
            config.clone()
        }
        None => read_config_or_default(),
    };

    let config = match config.validate() {
        Ok(()) => config,
        Err(reason) => {
            warn!("[Data] Session config rejected ({}). Using defaults.", reason);
            SessionConfig::default()
        }
    };

    info!(
        "[Data] Session: {} chests, {} rarity tiers, {} coupons, seed {:?}",
        config.initial_chest_count,
        config.rarity_table.len(),
        config.coupons.len(),
        config.seed
    );

    commands.insert_resource(SessionRng::from_seed(config.seed));
    commands.insert_resource(CouponPool::new(config.coupons.clone()));
    commands.insert_resource(SaveThrottle::new(config.save_throttle_ms));
    commands.insert_resource(config);

    next_state.set(GameState::Playing);
}

#[cfg(not(target_arch = "wasm32"))]
fn read_config_or_default() -> SessionConfig {
    let path = std::path::Path::new(SESSION_CONFIG_PATH);
    if !path.exists() {
        return SessionConfig::default();
    }
    match load_session_config(path) {
        Ok(config) => {
            info!("[Data] Loaded {}", path.display());
            config
        }
        Err(reason) => {
            warn!("[Data] {}. Using defaults.", reason);
            SessionConfig::default()
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn read_config_or_default() -> SessionConfig {
    SessionConfig::default()
}
