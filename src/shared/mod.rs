//! Shared components, resources, events, and states for Chest Rush.
//!
//! This is the type contract. Every domain plugin imports from here.
//! Cross-domain calls go through the helpers each domain re-exports from
//! its `mod.rs`.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════
// GAME STATE: top-level state machine
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, States, Default)]
pub enum GameState {
    #[default]
    Loading,
    Playing,
    Paused,
}

/// Frame ordering inside `Update`. Movement always resolves before any
/// attack is evaluated, and rewards are forwarded to the host last.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameplaySet {
    Host,
    Input,
    Autoplay,
    Movement,
    Combat,
    Rewards,
    Bridge,
}

// ═══════════════════════════════════════════════════════════════════════
// CONFIGURATION: supplied once per session
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub const ALL: [Rarity; 4] = [Rarity::Common, Rarity::Rare, Rarity::Epic, Rarity::Legendary];

    pub fn index(self) -> usize {
        match self {
            Rarity::Common => 0,
            Rarity::Rare => 1,
            Rarity::Epic => 2,
            Rarity::Legendary => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
            Rarity::Legendary => "legendary",
        }
    }

    pub fn color(self) -> Color {
        match self {
            Rarity::Common => Color::srgb(0.62, 0.45, 0.27),
            Rarity::Rare => Color::srgb(0.25, 0.50, 0.90),
            Rarity::Epic => Color::srgb(0.62, 0.30, 0.85),
            Rarity::Legendary => Color::srgb(0.95, 0.75, 0.20),
        }
    }
}

/// One row of the rarity tier table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RarityTier {
    pub rarity: Rarity,
    /// Relative spawn weight. Weights do not need to sum to 100.
    pub weight: f32,
    pub hp: u32,
    pub points_min: u64,
    pub points_max: u64,
    /// Probability in [0, 1] that a destroyed chest drops a coupon.
    pub coupon_chance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coupon {
    pub id: String,
    #[serde(default)]
    pub used: bool,
}

/// Playfield in world units. The origin is the bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayfieldConfig {
    pub width: f32,
    pub height: f32,
    /// Gap kept between any clamped point and the playfield edge.
    pub margin: f32,
}

impl PlayfieldConfig {
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }

    pub fn inner_min(&self) -> Vec2 {
        Vec2::splat(self.margin)
    }

    pub fn inner_max(&self) -> Vec2 {
        Vec2::new(self.width - self.margin, self.height - self.margin)
    }

    /// Clamp a point into the inner bounds. Never rejects a point.
    pub fn clamp_inner(&self, point: Vec2) -> Vec2 {
        point.clamp(self.inner_min(), self.inner_max())
    }
}

/// Axis-aligned rectangle in playfield coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitZone {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl HitZone {
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorConfig {
    pub speed: f32,
    pub attack_damage: u32,
    /// Cadence of the attack-acquisition timer.
    pub attack_interval_ms: u64,
    /// Movement ends once the actor is closer than this to its target.
    pub arrival_threshold: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoplayConfig {
    pub standoff_distance: f32,
    pub attack_range: f32,
    /// Wait before retrying when no chest is live.
    pub retry_delay_ms: u64,
    /// Wait before re-acquiring after the current target vanished.
    pub reacquire_delay_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbConfig {
    pub speed: f32,
    pub pickup_radius: f32,
    pub max_orbs: u32,
    pub points_per_orb: u64,
    pub scatter_radius: f32,
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub initial_chest_count: usize,
    pub rarity_table: Vec<RarityTier>,
    #[serde(default)]
    pub coupons: Vec<Coupon>,
    pub playfield: PlayfieldConfig,
    pub actor: ActorConfig,
    pub autoplay: AutoplayConfig,
    pub orbs: OrbConfig,
    /// Radius around a chest center that counts as a pointer hit.
    pub chest_hit_radius: f32,
    pub autoplay_toggle_zone: HitZone,
    #[serde(default)]
    pub seed: Option<u64>,
    pub save_throttle_ms: u64,
}

impl SessionConfig {
    pub fn tier(&self, rarity: Rarity) -> Option<&RarityTier> {
        self.rarity_table.iter().find(|tier| tier.rarity == rarity)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            initial_chest_count: 4,
            rarity_table: vec![
                RarityTier {
                    rarity: Rarity::Common,
                    weight: 60.0,
                    hp: 30,
                    points_min: 10,
                    points_max: 50,
                    coupon_chance: 0.10,
                },
                RarityTier {
                    rarity: Rarity::Rare,
                    weight: 25.0,
                    hp: 60,
                    points_min: 50,
                    points_max: 150,
                    coupon_chance: 0.25,
                },
                RarityTier {
                    rarity: Rarity::Epic,
                    weight: 10.0,
                    hp: 100,
                    points_min: 150,
                    points_max: 300,
                    coupon_chance: 0.50,
                },
                RarityTier {
                    rarity: Rarity::Legendary,
                    weight: 5.0,
                    hp: 150,
                    points_min: 300,
                    points_max: 500,
                    coupon_chance: 0.75,
                },
            ],
            coupons: Vec::new(),
            playfield: PlayfieldConfig {
                width: 360.0,
                height: 640.0,
                margin: 30.0,
            },
            actor: ActorConfig {
                speed: 160.0,
                attack_damage: 10,
                attack_interval_ms: 500,
                arrival_threshold: 5.0,
            },
            autoplay: AutoplayConfig {
                standoff_distance: 35.0,
                attack_range: 50.0,
                retry_delay_ms: 1_000,
                reacquire_delay_ms: 300,
            },
            orbs: OrbConfig {
                speed: 420.0,
                pickup_radius: 12.0,
                max_orbs: 20,
                points_per_orb: 5,
                scatter_radius: 18.0,
            },
            chest_hit_radius: 24.0,
            autoplay_toggle_zone: HitZone {
                x: 288.0,
                y: 568.0,
                width: 64.0,
                height: 64.0,
            },
            seed: None,
            save_throttle_ms: 2_000,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// ACTOR
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ActorPose {
    #[default]
    Idle,
    Walk,
    Attack,
}

/// The player-controlled actor. One per session.
#[derive(Component, Debug, Clone)]
pub struct Actor {
    pub attack_damage: u32,
    pub speed: f32,
}

/// Movement and attack flags for the actor. `is_moving` and `is_attacking`
/// are independent; callers check both before issuing a new action.
#[derive(Component, Debug, Clone, Default)]
pub struct ActorMotion {
    pub target: Option<Vec2>,
    pub velocity: Vec2,
    pub is_moving: bool,
    pub is_attacking: bool,
    pub facing: Facing,
    pub pose: ActorPose,
}

// ═══════════════════════════════════════════════════════════════════════
// CHESTS & REWARDS
// ═══════════════════════════════════════════════════════════════════════

/// Liveness token. Drawn from a session-wide counter, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChestId(pub u64);

#[derive(Component, Debug, Clone)]
pub struct Chest {
    pub id: ChestId,
    pub rarity: Rarity,
    pub current_hp: u32,
    pub max_hp: u32,
}

impl Chest {
    pub fn new(id: ChestId, tier: &RarityTier) -> Self {
        Self {
            id,
            rarity: tier.rarity,
            current_hp: tier.hp,
            max_hp: tier.hp,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.current_hp > 0
    }

    pub fn hp_ratio(&self) -> f32 {
        if self.max_hp == 0 {
            return 0.0;
        }
        self.current_hp as f32 / self.max_hp as f32
    }
}

/// A captured reference to a chest, validated again before every use.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChestRef {
    pub entity: Entity,
    pub id: ChestId,
    pub last_known: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SequenceOrigin {
    Manual,
    Autoplay,
}

/// A running attack-acquisition timer on the actor. Each firing
/// re-validates the target, then attacks it if it is in range.
/// Removing the component cancels the sequence.
#[derive(Component, Debug, Clone)]
pub struct AttackSequence {
    pub target: ChestRef,
    pub timer: Timer,
    pub origin: SequenceOrigin,
}

impl AttackSequence {
    pub fn new(target: ChestRef, interval_ms: u64, origin: SequenceOrigin) -> Self {
        Self {
            target,
            timer: Timer::new(
                std::time::Duration::from_millis(interval_ms),
                TimerMode::Repeating,
            ),
            origin,
        }
    }
}

/// Reward carrier flying from a destroyed chest to the actor.
#[derive(Component, Debug, Clone)]
pub struct PointOrb {
    pub amount: u64,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct Score {
    pub total: u64,
}

/// Externally supplied reward tokens. Used coupons never drop again.
#[derive(Resource, Debug, Clone, Default)]
pub struct CouponPool {
    pub coupons: Vec<Coupon>,
}

impl CouponPool {
    pub fn new(coupons: Vec<Coupon>) -> Self {
        Self { coupons }
    }

    pub fn unused_count(&self) -> usize {
        self.coupons.iter().filter(|c| !c.used).count()
    }

    pub fn used_ids(&self) -> Vec<String> {
        self.coupons
            .iter()
            .filter(|c| c.used)
            .map(|c| c.id.clone())
            .collect()
    }
}

/// Session counters for chests. Also the source of liveness tokens.
#[derive(Resource, Debug, Clone, Default)]
pub struct ChestLedger {
    pub next_id: u64,
    pub spawned: u64,
    pub destroyed: u64,
    pub hits: u64,
    pub points_rolled: u64,
}

impl ChestLedger {
    pub fn issue_id(&mut self) -> ChestId {
        self.next_id += 1;
        ChestId(self.next_id)
    }
}

#[derive(Resource, Debug, Clone, Default)]
pub struct AutoplayMode {
    pub enabled: bool,
}

#[derive(Resource)]
pub struct SessionRng(pub StdRng);

impl SessionRng {
    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self(StdRng::seed_from_u64(seed)),
            None => Self(StdRng::from_entropy()),
        }
    }
}

impl Default for SessionRng {
    fn default() -> Self {
        Self::from_seed(None)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Event, Debug, Clone)]
pub struct ScoreUpdatedEvent {
    pub score: u64,
}

#[derive(Event, Debug, Clone)]
pub struct CouponCollectedEvent {
    pub coupon_id: String,
}

#[derive(Event, Debug, Clone, Default)]
pub struct SceneReadyEvent;

#[derive(Event, Debug, Clone)]
pub struct ChestHitEvent {
    pub chest_id: ChestId,
    pub damage: u32,
    pub remaining_hp: u32,
}

#[derive(Event, Debug, Clone)]
pub struct ChestDestroyedEvent {
    pub chest_id: ChestId,
    pub rarity: Rarity,
    pub points: u64,
    pub position: Vec2,
}

#[derive(Event, Debug, Clone, Default)]
pub struct ToggleAutoplayEvent;

/// A pointer press, already converted to playfield coordinates.
#[derive(Event, Debug, Clone)]
pub struct PointerDownEvent {
    pub position: Vec2,
}
