//! Event/reward bridge between the game and its host page.
//!
//! The host creates a `HostChannel`, keeps one clone, and hands the other to
//! the session. Outbound, the bridge turns score, coupon, and scene-ready
//! events into `HostMessage`s (plus throttled save requests). Inbound, it
//! applies `HostCommand`s: pause, resume, and autoplay on/off.

mod throttle;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::shared::*;

pub use throttle::Throttle;

pub const DEFAULT_OUTBOX_CAPACITY: usize = 256;

/// Messages the game posts to the host page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum HostMessage {
    ScoreUpdated { score: u64 },
    CouponCollected { coupon_id: String },
    SceneReady,
    SaveRequested { score: u64, coupons: Vec<String> },
}

impl HostMessage {
    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string(self).map_err(|e| format!("Serialization failed: {}", e))
    }
}

/// Commands the host page sends to the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum HostCommand {
    Pause,
    Resume,
    SetAutoplay(bool),
}

impl HostCommand {
    pub fn from_json(text: &str) -> Result<Self, String> {
        serde_json::from_str(text).map_err(|e| format!("Bad host command {:?}: {}", text, e))
    }
}

#[derive(Debug, Default)]
struct ChannelState {
    outbox: VecDeque<HostMessage>,
    inbox: VecDeque<HostCommand>,
    capacity: usize,
    dropped: u64,
}

/// Shared message channel owned by the session and the host.
#[derive(Resource, Debug, Clone)]
pub struct HostChannel {
    inner: Arc<Mutex<ChannelState>>,
}

impl Default for HostChannel {
    fn default() -> Self {
        Self::bounded(DEFAULT_OUTBOX_CAPACITY)
    }
}

impl HostChannel {
    pub fn bounded(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ChannelState {
                capacity: capacity.max(1),
                ..default()
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, ChannelState> {
        // A panic elsewhere while holding the lock leaves plain queues behind;
        // they are still usable.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Queue a message for the host. When the outbox is full the oldest
    /// message is dropped; returns false in that case.
    pub fn post(&self, message: HostMessage) -> bool {
        let mut state = self.state();
        let mut kept_all = true;
        if state.outbox.len() >= state.capacity {
            state.outbox.pop_front();
            state.dropped += 1;
            kept_all = false;
        }
        state.outbox.push_back(message);
        kept_all
    }

    /// Host side: take everything queued so far.
    pub fn drain(&self) -> Vec<HostMessage> {
        self.state().outbox.drain(..).collect()
    }

    pub fn dropped(&self) -> u64 {
        self.state().dropped
    }

    /// Host side: queue a command for the next frame.
    pub fn send_command(&self, command: HostCommand) {
        self.state().inbox.push_back(command);
    }

    fn take_commands(&self) -> Vec<HostCommand> {
        self.state().inbox.drain(..).collect()
    }
}

/// Throttles `saveRequested` messages to the host.
#[derive(Resource, Debug)]
pub struct SaveThrottle {
    throttle: Throttle,
}

impl SaveThrottle {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            throttle: Throttle::new(Duration::from_millis(interval_ms)),
        }
    }
}

impl Default for SaveThrottle {
    fn default() -> Self {
        Self::new(SessionConfig::default().save_throttle_ms)
    }
}

pub struct BridgePlugin {
    pub channel: HostChannel,
}

impl Plugin for BridgePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.channel.clone());
        app.init_resource::<SaveThrottle>();
        app.add_systems(Update, apply_host_commands.in_set(GameplaySet::Host));
        app.add_systems(Update, forward_to_host.in_set(GameplaySet::Bridge));
    }
}

/// System: apply inbound host commands. Pausing freezes virtual time, so
/// every gameplay timer stops where it is; resuming never replays the
/// paused span.
pub fn apply_host_commands(
    channel: Res<HostChannel>,
    mut time: ResMut<Time<Virtual>>,
    state: Res<State<GameState>>,
    mut next_state: ResMut<NextState<GameState>>,
    mode: Res<AutoplayMode>,
    mut toggles: EventWriter<ToggleAutoplayEvent>,
) {
    let mut autoplay = mode.enabled;
    for command in channel.take_commands() {
        match command {
            HostCommand::Pause => {
                if *state.get() != GameState::Playing || time.is_paused() {
                    continue;
                }
                time.pause();
                next_state.set(GameState::Paused);
                info!("[Bridge] Paused by host");
            }
            HostCommand::Resume => {
                if !time.is_paused() {
                    continue;
                }
                time.unpause();
                next_state.set(GameState::Playing);
                info!("[Bridge] Resumed by host");
            }
            HostCommand::SetAutoplay(enabled) => {
                if enabled != autoplay {
                    autoplay = enabled;
                    toggles.send(ToggleAutoplayEvent);
                }
            }
        }
    }
}

/// System: forward reward events to the host, plus at most one save
/// request per throttle window.
#[allow(clippy::too_many_arguments)]
pub fn forward_to_host(
    channel: Res<HostChannel>,
    real_time: Res<Time<Real>>,
    mut save: ResMut<SaveThrottle>,
    score: Res<Score>,
    coupons: Option<Res<CouponPool>>,
    mut ready_events: EventReader<SceneReadyEvent>,
    mut score_events: EventReader<ScoreUpdatedEvent>,
    mut coupon_events: EventReader<CouponCollectedEvent>,
) {
    let mut changed = false;
    for _ in ready_events.read() {
        post(&channel, HostMessage::SceneReady);
    }
    for event in score_events.read() {
        post(&channel, HostMessage::ScoreUpdated { score: event.score });
        changed = true;
    }
    for event in coupon_events.read() {
        post(
            &channel,
            HostMessage::CouponCollected {
                coupon_id: event.coupon_id.clone(),
            },
        );
        changed = true;
    }

    let now = real_time.elapsed();
    let fire = if changed {
        save.throttle.request(now)
    } else {
        save.throttle.poll(now)
    };
    if fire {
        let coupons = coupons.map(|pool| pool.used_ids()).unwrap_or_default();
        post(
            &channel,
            HostMessage::SaveRequested {
                score: score.total,
                coupons,
            },
        );
    }
}

fn post(channel: &HostChannel, message: HostMessage) {
    if !channel.post(message) {
        warn!(
            "[Bridge] Host outbox full; dropped oldest message ({} dropped so far)",
            channel.dropped()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_serialize_with_type_tag() {
        let json = HostMessage::CouponCollected {
            coupon_id: "FREE-DRINK".to_string(),
        }
        .to_json()
        .unwrap();
        assert_eq!(json, r#"{"type":"couponCollected","couponId":"FREE-DRINK"}"#);
        assert_eq!(
            HostMessage::SceneReady.to_json().unwrap(),
            r#"{"type":"sceneReady"}"#
        );
    }

    #[test]
    fn test_commands_parse_from_host_json() {
        assert_eq!(HostCommand::from_json(r#"{"type":"pause"}"#), Ok(HostCommand::Pause));
        assert_eq!(
            HostCommand::from_json(r#"{"type":"setAutoplay","value":true}"#),
            Ok(HostCommand::SetAutoplay(true))
        );
        assert!(HostCommand::from_json(r#"{"type":"explode"}"#).is_err());
    }

    #[test]
    fn test_full_outbox_drops_oldest() {
        let channel = HostChannel::bounded(2);
        assert!(channel.post(HostMessage::ScoreUpdated { score: 1 }));
        assert!(channel.post(HostMessage::ScoreUpdated { score: 2 }));
        assert!(!channel.post(HostMessage::ScoreUpdated { score: 3 }));
        assert_eq!(channel.dropped(), 1);
        assert_eq!(
            channel.drain(),
            vec![
                HostMessage::ScoreUpdated { score: 2 },
                HostMessage::ScoreUpdated { score: 3 },
            ]
        );
        assert!(channel.drain().is_empty());
    }

    #[test]
    fn test_clones_share_one_channel() {
        let host_side = HostChannel::default();
        let game_side = host_side.clone();
        game_side.post(HostMessage::SceneReady);
        host_side.send_command(HostCommand::Resume);
        assert_eq!(host_side.drain(), vec![HostMessage::SceneReady]);
        assert_eq!(game_side.take_commands(), vec![HostCommand::Resume]);
    }
}
