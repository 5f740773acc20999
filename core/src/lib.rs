#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Gem Defence simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. Systems consume event streams,
//! query immutable snapshots such as [`EnemyView`], and respond exclusively
//! with new command batches.

pub mod catalog;
mod clock;
mod stats;
mod status;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use catalog::{
    ActiveGemKind, ArtifactKind, BossArtifactKind, CrewKind, EnemyTier, GemPattern, ItemTemplate,
    SupportGemKind,
};
pub use clock::{FixedStep, MAX_TICKS_PER_FRAME, TICKS_PER_SECOND, TICK_DURATION};
pub use stats::{
    CombatStats, StatDelta, StatKey, BASE_CRIT_MULTIPLIER, BASE_MAX_HEALTH, MAX_DAMAGE_REDUCTION,
};
pub use status::{Element, Rgb, StatusKind, StatusSet, SynergyKind};

/// Width of the playfield in world units.
pub const ARENA_WIDTH: f32 = 800.0;
/// Height of the playfield in world units.
pub const ARENA_HEIGHT: f32 = 600.0;
/// Row enemies cross to breach the defences.
pub const DEFENSE_LINE_Y: f32 = 560.0;
/// Row new enemies appear on.
pub const SPAWN_Y: f32 = -20.0;
/// Location of the turret and the point it defends.
pub const BASE_POSITION: Vec2 = Vec2::new(ARENA_WIDTH / 2.0, ARENA_HEIGHT);

/// Support slots available in each loadout.
pub const SUPPORT_SLOTS: u8 = 3;
/// Accessory slots available for artifacts.
pub const ACCESSORY_SLOTS: u8 = 4;
/// Relic slots available for boss artifacts.
pub const RELIC_SLOTS: u8 = 2;
/// Unequipped items the inventory may hold.
pub const INVENTORY_CAPACITY: usize = 20;

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident($repr:ty)) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name($repr);

        impl $name {
            /// Creates a new identifier with the provided numeric value.
            #[must_use]
            pub const fn new(value: $repr) -> Self {
                Self(value)
            }

            /// Retrieves the numeric representation of the identifier.
            #[must_use]
            pub const fn get(&self) -> $repr {
                self.0
            }
        }
    };
}

identifier! {
    /// Unique identifier assigned to an enemy.
    EnemyId(u32)
}

identifier! {
    /// Unique identifier assigned to a projectile.
    ProjectileId(u32)
}

identifier! {
    /// Unique identifier assigned to a zone effect.
    ZoneId(u32)
}

identifier! {
    /// Unique identity of an owned item instance.
    ItemId(u32)
}

identifier! {
    /// Identifier of a skill tree node.
    SkillNodeId(u16)
}

/// Weapon loadouts fired by the turret.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Loadout {
    /// Primary loadout firing at full cadence and damage.
    Main,
    /// Secondary loadout firing at half cadence and half damage.
    Alternate,
}

impl Loadout {
    /// Every loadout in firing order.
    pub const ALL: [Loadout; 2] = [Loadout::Main, Loadout::Alternate];

    /// Damage multiplier applied to shots from the loadout.
    #[must_use]
    pub const fn damage_factor(self) -> f32 {
        match self {
            Self::Main => 1.0,
            Self::Alternate => 0.5,
        }
    }

    /// Multiplier applied to the loadout's fire interval.
    #[must_use]
    pub const fn interval_factor(self) -> f32 {
        match self {
            Self::Main => 1.0,
            Self::Alternate => 2.0,
        }
    }
}

/// Equipment slot an item may occupy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Slot {
    /// Active gem slot of a loadout.
    Active(Loadout),
    /// Support slot of a loadout, indexed below [`SUPPORT_SLOTS`].
    Support(Loadout, u8),
    /// Artifact slot, indexed below [`ACCESSORY_SLOTS`].
    Accessory(u8),
    /// Boss relic slot, indexed below [`RELIC_SLOTS`].
    Relic(u8),
}

impl Slot {
    /// Reports whether the slot index lies within the configured slot counts.
    #[must_use]
    pub const fn in_range(self) -> bool {
        match self {
            Self::Active(_) => true,
            Self::Support(_, index) => index < SUPPORT_SLOTS,
            Self::Accessory(index) => index < ACCESSORY_SLOTS,
            Self::Relic(index) => index < RELIC_SLOTS,
        }
    }
}

/// Owned item: template plus per-instance level and identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemInstance {
    /// Unique identity of the instance.
    pub id: ItemId,
    /// Template the instance was created from.
    pub template: ItemTemplate,
    /// Level of the instance, starting at one.
    pub level: u32,
}

/// Origin of a damage instance, used for multipliers and presentation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DamageSource {
    /// Direct projectile or burst hit carrying an element.
    Hit(Element),
    /// Periodic damage from a status channel.
    Dot(StatusKind),
    /// Burst produced by a synergy reaction.
    Synergy(SynergyKind),
    /// Ice shard released by a shattering enemy.
    Shard,
    /// Periodic damage from a lingering zone.
    Zone,
    /// Shot fired by a support drone.
    SupportUnit,
    /// Blow struck by a confused enemy.
    Confusion,
}

impl DamageSource {
    /// Reports whether the damage counts as damage-over-time.
    #[must_use]
    pub const fn is_dot(self) -> bool {
        matches!(self, Self::Dot(_) | Self::Zone)
    }

    /// Colour of the floating damage number.
    #[must_use]
    pub const fn color(self) -> Rgb {
        match self {
            Self::Hit(element) => element.color(),
            Self::Dot(StatusKind::Burn) => Element::Fire.color(),
            Self::Dot(StatusKind::Poison) => Element::Poison.color(),
            Self::Dot(StatusKind::Leech) => Element::Plant.color(),
            Self::Dot(_) => Rgb::from_rgb(0xb0, 0xb0, 0xb0),
            Self::Synergy(_) => Rgb::from_rgb(0xff, 0x4f, 0xa8),
            Self::Shard => Element::Ice.color(),
            Self::Zone => Rgb::from_rgb(0x9a, 0x7b, 0xd8),
            Self::SupportUnit => Rgb::from_rgb(0x6c, 0xf0, 0xd2),
            Self::Confusion => Element::Psychic.color(),
        }
    }
}

/// Attack sub-state of a boss enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BossPhase {
    /// Walking toward its fight position.
    Enter,
    /// Holding position and attacking the base.
    Fight,
}

/// Phase of the wave scheduler mirrored into the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WavePhase {
    /// Normal spawn table is active.
    Normal,
    /// Boss composition is on the field.
    Boss,
    /// Bosses defeated; waiting for the next wave to start.
    Intermission,
}

/// Geometry of a single volley.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ShotPattern {
    /// Projectiles fanned around the aim direction; one projectile is a single shot.
    Spread {
        /// Projectiles in the volley.
        count: u32,
        /// Angle between neighbouring projectiles in radians.
        step_radians: f32,
    },
    /// Telegraphed impacts landing on the target after a delay.
    Meteor {
        /// Impacts in the volley.
        count: u32,
        /// Ticks between firing and impact.
        delay_ticks: u32,
    },
    /// One-shot traps placed on the target's position.
    Trap {
        /// Traps in the volley.
        count: u32,
    },
}

/// Fully resolved configuration of a volley about to be fired.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShotPlan {
    /// Gem that produced the volley.
    pub gem: ActiveGemKind,
    /// Element applied by hits.
    pub element: Element,
    /// Volley geometry.
    pub pattern: ShotPattern,
    /// Damage per hit after every modifier, before critical strikes.
    pub damage: f32,
    /// Damage baseline before hit-only multipliers, used for status power.
    pub raw_damage: f32,
    /// Chance in `[0, 1]` for each projectile to strike critically.
    pub crit_chance: f32,
    /// Multiplier applied on critical strikes.
    pub crit_multiplier: f32,
    /// Enemies each projectile passes through before stopping.
    pub pierce: u32,
    /// Retargets after pierce is exhausted.
    pub chain: u32,
    /// Search radius for chain retargets.
    pub chain_range: f32,
    /// Radius of terminal bursts and impacts for area-capable gems.
    pub area_radius: Option<f32>,
    /// Travel distance per tick.
    pub speed: f32,
    /// Projectiles steer toward their target.
    pub homing: bool,
    /// Projectiles rebound off the arena bounds.
    pub bounce: bool,
    /// Level used for status potency and chance gates.
    pub status_level: u32,
    /// Flat base integrity paid when firing.
    pub self_damage_flat: f32,
    /// Fraction of current base integrity paid when firing.
    pub self_damage_pct: f32,
}

/// Reason a reward offer was made.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OfferKind {
    /// Player reached a new level.
    LevelUp,
    /// Boss wave completed.
    BossReward,
}

/// Single pickable reward.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RewardChoice {
    /// Permanent-for-the-run bonus stat.
    BonusStat(StatDelta),
    /// Boss relic added to the inventory.
    BossArtifact(BossArtifactKind),
    /// Gold payout.
    Gold(u32),
}

/// Pending decision offered to the player.
#[derive(Clone, Debug, PartialEq)]
pub struct RewardOffer {
    /// Why the offer was made.
    pub kind: OfferKind,
    /// Options available to pick from.
    pub choices: Vec<RewardChoice>,
}

/// Terminal state of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RunOutcome {
    /// Final configured wave completed.
    Victory,
    /// Base integrity reached zero.
    Defeat,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation by one fixed tick.
    Tick,
    /// Discards all transient state and recreates the bootstrap state.
    Reset,
    /// Moves an owned item into a slot, swapping with any occupant.
    Equip {
        /// Item to equip.
        item: ItemId,
        /// Destination slot.
        slot: Slot,
    },
    /// Returns an equipped item to the inventory.
    Unequip {
        /// Item to unequip.
        item: ItemId,
    },
    /// Spends a skill point on a node.
    AllocateSkillNode {
        /// Node receiving the point.
        node: SkillNodeId,
    },
    /// Buys a new item instance at its catalog price.
    Purchase {
        /// Template to buy.
        template: ItemTemplate,
    },
    /// Replaces the selected crew.
    SelectCrew {
        /// Crew members joining the run.
        crew: Vec<CrewKind>,
    },
    /// Triggers a selected crew member's active ability.
    ActivateCrewAbility {
        /// Crew member whose ability fires.
        crew: CrewKind,
    },
    /// Raises or lowers the energy shield.
    SetShieldState {
        /// Desired shield state.
        active: bool,
    },
    /// Sets or clears the manually designated attack target.
    DesignateTarget {
        /// Target to prioritise, or `None` to clear.
        enemy: Option<EnemyId>,
    },
    /// Resolves the pending reward offer.
    ChooseReward {
        /// Index into the offer's choices.
        index: usize,
    },
    /// Requests that a new enemy enter the field.
    SpawnEnemy {
        /// Archetype of the enemy.
        tier: EnemyTier,
        /// Horizontal entry position.
        lane_x: f32,
        /// Multiplier applied to tier health.
        health_multiplier: f32,
        /// Multiplier applied to tier contact damage.
        damage_multiplier: f32,
    },
    /// Fires a resolved volley from a loadout at a target.
    FireWeapon {
        /// Loadout firing.
        loadout: Loadout,
        /// Enemy the volley is aimed at.
        target: EnemyId,
        /// Fully resolved volley configuration.
        plan: ShotPlan,
    },
    /// Starts the normal phase of a wave.
    StartWave {
        /// Wave number, starting at one.
        wave: u32,
    },
    /// Switches the current wave into its boss phase.
    BeginBossWave {
        /// Wave number whose bosses spawn.
        wave: u32,
    },
    /// Marks the current wave as completed.
    CompleteWave {
        /// Wave number completed.
        wave: u32,
    },
    /// Offers the post-boss reward.
    OfferReward {
        /// Wave whose completion earned the reward.
        wave: u32,
    },
    /// Ends the run victoriously.
    DeclareVictory,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Index of the tick that completed.
        tick: u64,
    },
    /// Confirms that an enemy entered the field.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Archetype of the enemy.
        tier: EnemyTier,
    },
    /// Reports a death and its one-shot payout.
    EnemyKilled {
        /// Enemy that died.
        enemy: EnemyId,
        /// Archetype of the enemy.
        tier: EnemyTier,
        /// Experience paid.
        xp: u32,
        /// Gold paid.
        gold: u32,
    },
    /// Reports that an enemy crossed the defended line.
    EnemyBreached {
        /// Enemy that breached.
        enemy: EnemyId,
        /// Archetype of the enemy.
        tier: EnemyTier,
    },
    /// Reports damage dealt to an enemy, for floating numbers.
    DamageDealt {
        /// Enemy damaged.
        enemy: EnemyId,
        /// Final amount subtracted from health.
        amount: f32,
        /// Whether the hit was a critical strike.
        critical: bool,
        /// Origin of the damage; determines the number's colour.
        source: DamageSource,
    },
    /// Reports that a status channel was applied.
    StatusApplied {
        /// Enemy affected.
        enemy: EnemyId,
        /// Channel applied.
        status: StatusKind,
    },
    /// Reports that a synergy reaction consumed two statuses.
    SynergyTriggered {
        /// Enemy the reaction happened on.
        enemy: EnemyId,
        /// Reaction triggered.
        synergy: SynergyKind,
    },
    /// Confirms that a loadout fired.
    ShotFired {
        /// Loadout that fired.
        loadout: Loadout,
        /// Entities spawned by the volley.
        spawned: u32,
    },
    /// Confirms that a zone effect was created.
    ZoneSpawned {
        /// Identifier assigned to the zone.
        zone: ZoneId,
    },
    /// Reports a change to base integrity from damage.
    BaseDamaged {
        /// Damage applied after reductions.
        amount: f32,
        /// Remaining integrity.
        health: f32,
    },
    /// Reports that the shield was raised or lowered.
    ShieldChanged {
        /// Current shield state.
        active: bool,
    },
    /// Reports that the shield dropped because energy ran out.
    ShieldDepleted,
    /// Confirms that an item joined the inventory.
    ItemAcquired {
        /// Identity of the new instance.
        item: ItemId,
        /// Template of the new instance.
        template: ItemTemplate,
    },
    /// Confirms that a pickup fused into an existing instance.
    ItemFused {
        /// Instance that absorbed the pickup.
        item: ItemId,
        /// Level after fusing.
        level: u32,
    },
    /// Reports that a pickup was dropped because the inventory was full.
    LootDiscarded {
        /// Template that was dropped.
        template: ItemTemplate,
    },
    /// Reports that the player reached a new level.
    LevelUp {
        /// Level reached.
        level: u32,
    },
    /// Reports a new pending decision.
    RewardOffered {
        /// Offer awaiting a choice.
        offer: RewardOffer,
    },
    /// Confirms that a reward was claimed.
    RewardChosen {
        /// Claimed reward.
        choice: RewardChoice,
    },
    /// Confirms that a crew ability fired.
    CrewAbilityActivated {
        /// Crew member whose ability fired.
        crew: CrewKind,
    },
    /// Reports that a timed crew effect ended.
    CrewAbilityExpired {
        /// Crew member whose effect ended.
        crew: CrewKind,
    },
    /// Announces the normal phase of a wave.
    WaveStarted {
        /// Wave number.
        wave: u32,
    },
    /// Announces the boss phase of a wave.
    BossWaveStarted {
        /// Wave number.
        wave: u32,
    },
    /// Announces that a wave's bosses were defeated.
    WaveCompleted {
        /// Wave number.
        wave: u32,
    },
    /// Announces the end of the run.
    RunEnded {
        /// Terminal state reached.
        outcome: RunOutcome,
    },
    /// Reports that the aggregated stats were recomputed.
    StatsRecomputed,
    /// Notifies presentation layers that player-visible state changed.
    StateRefreshed,
    /// Reports that a command was rejected; presentation shows a toast.
    CommandRejected {
        /// Reason for the rejection.
        error: CommandError,
    },
}

/// Reasons a command may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The item is not owned.
    #[error("unknown item {0:?}")]
    UnknownItem(ItemId),
    /// The item kind does not fit the slot.
    #[error("item {item:?} does not fit slot {slot:?}")]
    IncompatibleSlot {
        /// Item that was moved.
        item: ItemId,
        /// Slot that was requested.
        slot: Slot,
    },
    /// The slot index exceeds the configured slot count.
    #[error("slot {0:?} does not exist")]
    SlotOutOfRange(Slot),
    /// The item is not in any slot.
    #[error("item {0:?} is not equipped")]
    ItemNotEquipped(ItemId),
    /// The skill node does not exist.
    #[error("unknown skill node {0:?}")]
    UnknownSkillNode(SkillNodeId),
    /// The skill node is at its rank cap.
    #[error("skill node {0:?} is already at its rank cap")]
    SkillNodeCapped(SkillNodeId),
    /// No allocated node is adjacent to the skill node.
    #[error("skill node {0:?} is not connected to an allocated node")]
    SkillNodeUnconnected(SkillNodeId),
    /// No unspent skill points remain.
    #[error("no skill points available")]
    NoSkillPoints,
    /// The purchase costs more than the available gold.
    #[error("costs {price} gold but only {gold} is available")]
    InsufficientGold {
        /// Catalog price.
        price: u32,
        /// Gold available.
        gold: u32,
    },
    /// The inventory has no space and the item cannot fuse.
    #[error("inventory is full")]
    InventoryFull,
    /// The crew member is not part of the run.
    #[error("{0:?} is not in the crew")]
    CrewNotSelected(CrewKind),
    /// The crew selection is too large or repeats a member.
    #[error("crew selection is invalid")]
    InvalidCrew,
    /// The ability is still cooling down.
    #[error("ability ready in {remaining_ticks} ticks")]
    AbilityOnCooldown {
        /// Ticks until the ability is ready.
        remaining_ticks: u32,
    },
    /// Not enough energy for the request.
    #[error("insufficient energy")]
    InsufficientEnergy,
    /// No reward offer is pending.
    #[error("no reward offer is pending")]
    NoPendingOffer,
    /// The reward index is out of range.
    #[error("reward choice {0} does not exist")]
    InvalidChoice(usize),
    /// The enemy does not exist or is dead.
    #[error("unknown enemy {0:?}")]
    UnknownEnemy(EnemyId),
    /// The run has ended; only a reset is accepted.
    #[error("the run has ended")]
    RunEnded,
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Archetype of the enemy.
    pub tier: EnemyTier,
    /// Current position in world units.
    pub position: Vec2,
    /// Current health.
    pub health: f32,
    /// Maximum health.
    pub max_health: f32,
    /// Active status channels.
    pub statuses: StatusSet,
    /// Boss attack sub-state, for boss tier enemies.
    pub boss_phase: Option<BossPhase>,
}

impl EnemySnapshot {
    /// Distance from the enemy to the base.
    #[must_use]
    pub fn distance_to_base(&self) -> f32 {
        self.position.distance(BASE_POSITION)
    }
}

/// Read-only snapshot describing all living enemies.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Captured snapshots in deterministic order.
    #[must_use]
    pub fn as_slice(&self) -> &[EnemySnapshot] {
        &self.snapshots
    }

    /// Finds the snapshot of a specific enemy.
    #[must_use]
    pub fn get(&self, id: EnemyId) -> Option<&EnemySnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of captured enemies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no enemy was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Number of captured boss tier enemies.
    #[must_use]
    pub fn boss_count(&self) -> usize {
        self.snapshots
            .iter()
            .filter(|snapshot| snapshot.tier == EnemyTier::Boss)
            .count()
    }
}

/// Catalog entry tagged with an instance level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Leveled<K> {
    /// Catalog kind.
    pub kind: K,
    /// Instance level.
    pub level: u32,
}

/// Read-only description of one loadout's gems.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadoutSnapshot {
    /// Loadout described.
    pub loadout: Loadout,
    /// Active gem, if any.
    pub active: Option<Leveled<ActiveGemKind>>,
    /// Support gems in slot order.
    pub supports: Vec<Leveled<SupportGemKind>>,
}
