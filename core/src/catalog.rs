//! Static item, skill tree, crew and enemy tier definitions.
//!
//! Every table in this module is plain data. Balance constants are published
//! values and are deliberately not derived from one another.

use serde::{Deserialize, Serialize};

use crate::{Element, SkillNodeId, Slot, StatDelta, StatKey};

/// Firing behaviour of an active gem.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GemPattern {
    /// Travelling projectiles aimed at the target.
    Projectile,
    /// Telegraphed landing zone that bursts after a delay.
    Meteor,
    /// One-shot trap placed on the target's position.
    Trap,
}

/// Damage-dealing gems that occupy the active slot of a loadout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActiveGemKind {
    /// Basic kinetic bolt.
    Spark,
    /// Fire bolt that bursts on impact.
    Ember,
    /// Ice shard that freezes through a burst.
    Frost,
    /// Poison dart.
    Venom,
    /// Leeching thorn.
    Thorn,
    /// Soaking water bolt.
    Tide,
    /// Electric bolt that arcs once.
    Volt,
    /// Psychic bolt that confuses.
    Mind,
    /// Delayed fire impact.
    Meteor,
    /// Stunning trap.
    Snare,
}

/// Published base values of an active gem.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActiveGemProfile {
    /// Element applied by the gem's hits.
    pub element: Element,
    /// Damage at level one before modifiers.
    pub base_damage: f32,
    /// Ticks between shots at level one before modifiers.
    pub interval_ticks: u32,
    /// Projectile travel distance per tick.
    pub speed: f32,
    /// Radius of the terminal burst for area-capable gems.
    pub area_radius: Option<f32>,
    /// Firing behaviour.
    pub pattern: GemPattern,
    /// Pierce count before supports.
    pub base_pierce: u32,
    /// Chain count before supports.
    pub base_chain: u32,
    /// Shop price in gold.
    pub price: u32,
}

impl ActiveGemKind {
    /// Every active gem in catalog order.
    pub const ALL: [ActiveGemKind; 10] = [
        Self::Spark,
        Self::Ember,
        Self::Frost,
        Self::Venom,
        Self::Thorn,
        Self::Tide,
        Self::Volt,
        Self::Mind,
        Self::Meteor,
        Self::Snare,
    ];

    /// Published base values for the gem.
    #[must_use]
    pub const fn profile(self) -> ActiveGemProfile {
        const fn bolt(element: Element, base_damage: f32, interval_ticks: u32, price: u32) -> ActiveGemProfile {
            ActiveGemProfile {
                element,
                base_damage,
                interval_ticks,
                speed: 8.0,
                area_radius: None,
                pattern: GemPattern::Projectile,
                base_pierce: 0,
                base_chain: 0,
                price,
            }
        }

        match self {
            Self::Spark => ActiveGemProfile {
                speed: 9.0,
                ..bolt(Element::Physical, 10.0, 30, 40)
            },
            Self::Ember => ActiveGemProfile {
                area_radius: Some(40.0),
                ..bolt(Element::Fire, 8.0, 32, 60)
            },
            Self::Frost => ActiveGemProfile {
                speed: 7.0,
                area_radius: Some(50.0),
                ..bolt(Element::Ice, 6.0, 40, 60)
            },
            Self::Venom => bolt(Element::Poison, 6.0, 30, 60),
            Self::Thorn => bolt(Element::Plant, 7.0, 34, 60),
            Self::Tide => bolt(Element::Water, 7.0, 30, 60),
            Self::Volt => ActiveGemProfile {
                speed: 10.0,
                base_chain: 1,
                ..bolt(Element::Electric, 9.0, 36, 70)
            },
            Self::Mind => ActiveGemProfile {
                speed: 7.0,
                ..bolt(Element::Psychic, 5.0, 45, 80)
            },
            Self::Meteor => ActiveGemProfile {
                speed: 0.0,
                area_radius: Some(70.0),
                pattern: GemPattern::Meteor,
                ..bolt(Element::Fire, 30.0, 120, 120)
            },
            Self::Snare => ActiveGemProfile {
                speed: 0.0,
                area_radius: Some(25.0),
                pattern: GemPattern::Trap,
                ..bolt(Element::Physical, 20.0, 90, 90)
            },
        }
    }

    /// Damage multiplier granted by gem level.
    #[must_use]
    pub fn level_factor(level: u32) -> f32 {
        1.0 + 0.2 * level.saturating_sub(1) as f32
    }
}

/// Modifier gems that occupy the support slots of a loadout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SupportGemKind {
    /// Extra projectiles at reduced damage.
    Multishot,
    /// Extra pierce.
    Pierce,
    /// Extra chains.
    Chain,
    /// Faster attacks.
    Haste,
    /// More damage.
    Brutality,
    /// Larger bursts.
    Concentrate,
    /// Much more damage paid for with base integrity.
    Overcharge,
}

/// Level-resolved contribution of one support gem.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SupportModifiers {
    /// Additive damage percentage.
    pub damage_pct: f32,
    /// Multiplicative damage factor contribution (`1 + value`).
    pub damage_more: f32,
    /// Additive fire-rate percentage.
    pub rate_pct: f32,
    /// Extra projectiles per volley.
    pub extra_projectiles: u32,
    /// Extra pierce count.
    pub pierce: u32,
    /// Extra chain count.
    pub chain: u32,
    /// Additive area percentage.
    pub aoe_pct: f32,
    /// Flat base integrity paid per shot.
    pub self_damage_flat: f32,
}

impl SupportGemKind {
    /// Every support gem in catalog order.
    pub const ALL: [SupportGemKind; 7] = [
        Self::Multishot,
        Self::Pierce,
        Self::Chain,
        Self::Haste,
        Self::Brutality,
        Self::Concentrate,
        Self::Overcharge,
    ];

    /// Shop price in gold.
    #[must_use]
    pub const fn price(self) -> u32 {
        match self {
            Self::Multishot => 90,
            Self::Pierce | Self::Chain => 70,
            Self::Haste | Self::Brutality => 60,
            Self::Concentrate => 50,
            Self::Overcharge => 100,
        }
    }

    /// Contribution of the support at the given level.
    #[must_use]
    pub fn modifiers(self, level: u32) -> SupportModifiers {
        let bonus = level.saturating_sub(1);
        let steps = bonus as f32;
        match self {
            Self::Multishot => SupportModifiers {
                damage_more: -0.25,
                rate_pct: -0.1,
                extra_projectiles: 2 + bonus / 2,
                ..SupportModifiers::default()
            },
            Self::Pierce => SupportModifiers {
                pierce: 1 + bonus / 2,
                ..SupportModifiers::default()
            },
            Self::Chain => SupportModifiers {
                damage_more: -0.1,
                chain: 1 + bonus / 2,
                ..SupportModifiers::default()
            },
            Self::Haste => SupportModifiers {
                rate_pct: 0.2 + 0.05 * steps,
                ..SupportModifiers::default()
            },
            Self::Brutality => SupportModifiers {
                damage_more: 0.25 + 0.05 * steps,
                ..SupportModifiers::default()
            },
            Self::Concentrate => SupportModifiers {
                damage_pct: 0.1,
                aoe_pct: 0.3 + 0.05 * steps,
                ..SupportModifiers::default()
            },
            Self::Overcharge => SupportModifiers {
                damage_more: 0.5 + 0.1 * steps,
                self_damage_flat: 1.0,
                ..SupportModifiers::default()
            },
        }
    }
}

/// Equippable accessories contributing flat stats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArtifactKind {
    /// Critical strike focus.
    SharpLens,
    /// Bonus against heavy enemies.
    HunterMark,
    /// Bonus against distant enemies.
    Longbow,
    /// Bonus against status-afflicted enemies.
    Prism,
    /// Homing shots.
    SeekerCore,
    /// Rebounding shots.
    RubberCoil,
    /// Integrity on hit.
    VampireFang,
    /// Energy regeneration.
    Capacitor,
    /// Sturdier base.
    BastionPlate,
    /// Longer and more chains.
    ChainLink,
}

const SHARP_LENS: &[StatDelta] = &[
    StatDelta::new(StatKey::CritChance, 0.1),
    StatDelta::new(StatKey::CritDamage, 0.25),
];
const HUNTER_MARK: &[StatDelta] = &[StatDelta::new(StatKey::AntiTankPct, 0.3)];
const LONGBOW: &[StatDelta] = &[StatDelta::new(StatKey::DistanceBonusPct, 0.25)];
const PRISM: &[StatDelta] = &[StatDelta::new(StatKey::ElementalVulnPct, 0.2)];
const SEEKER_CORE: &[StatDelta] = &[StatDelta::new(StatKey::Homing, 1.0)];
const RUBBER_COIL: &[StatDelta] = &[StatDelta::new(StatKey::Bounce, 1.0)];
const VAMPIRE_FANG: &[StatDelta] = &[StatDelta::new(StatKey::LifeOnHit, 1.0)];
const CAPACITOR: &[StatDelta] = &[StatDelta::new(StatKey::EnergyRegenPct, 0.5)];
const BASTION_PLATE: &[StatDelta] = &[
    StatDelta::new(StatKey::DamageReduction, 0.15),
    StatDelta::new(StatKey::MaxHealth, 25.0),
];
const CHAIN_LINK: &[StatDelta] = &[
    StatDelta::new(StatKey::ChainRangePct, 0.3),
    StatDelta::new(StatKey::ChainBonus, 1.0),
];

impl ArtifactKind {
    /// Every artifact in catalog order.
    pub const ALL: [ArtifactKind; 10] = [
        Self::SharpLens,
        Self::HunterMark,
        Self::Longbow,
        Self::Prism,
        Self::SeekerCore,
        Self::RubberCoil,
        Self::VampireFang,
        Self::Capacitor,
        Self::BastionPlate,
        Self::ChainLink,
    ];

    /// Stat contributions at level one.
    #[must_use]
    pub const fn stats(self) -> &'static [StatDelta] {
        match self {
            Self::SharpLens => SHARP_LENS,
            Self::HunterMark => HUNTER_MARK,
            Self::Longbow => LONGBOW,
            Self::Prism => PRISM,
            Self::SeekerCore => SEEKER_CORE,
            Self::RubberCoil => RUBBER_COIL,
            Self::VampireFang => VAMPIRE_FANG,
            Self::Capacitor => CAPACITOR,
            Self::BastionPlate => BASTION_PLATE,
            Self::ChainLink => CHAIN_LINK,
        }
    }

    /// Shop price in gold.
    #[must_use]
    pub const fn price(self) -> u32 {
        match self {
            Self::SeekerCore | Self::RubberCoil => 150,
            Self::BastionPlate | Self::ChainLink => 120,
            _ => 100,
        }
    }

    /// Stat multiplier granted by artifact level.
    #[must_use]
    pub fn level_factor(level: u32) -> f32 {
        1.0 + 0.1 * level.saturating_sub(1) as f32
    }
}

/// Relics dropped by bosses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BossArtifactKind {
    /// Damage scaled by hoarded gold.
    MidasCrown,
    /// Executes frozen enemies.
    FrostHeart,
    /// Faster attacks.
    StormCrown,
    /// Extra projectiles.
    HydraTooth,
    /// Stronger statuses.
    CatalystShard,
    /// Much more damage paid for with base integrity.
    BloodPact,
}

/// Gold per step of the Midas Crown damage bonus.
pub const MIDAS_GOLD_STEP: u32 = 100;
/// Damage percentage granted per Midas Crown step.
pub const MIDAS_DAMAGE_PER_STEP: f32 = 0.01;

const FROST_HEART: &[StatDelta] = &[StatDelta::new(StatKey::FreezeExecuteChance, 0.05)];
const STORM_CROWN: &[StatDelta] = &[StatDelta::new(StatKey::RatePct, 0.2)];
const HYDRA_TOOTH: &[StatDelta] = &[StatDelta::new(StatKey::ProjectileBonus, 1.0)];
const CATALYST_SHARD: &[StatDelta] = &[
    StatDelta::new(StatKey::MultiStatusPct, 0.25),
    StatDelta::new(StatKey::StatusPowerPct, 0.2),
];
const BLOOD_PACT: &[StatDelta] = &[
    StatDelta::new(StatKey::DamageMore, 0.3),
    StatDelta::new(StatKey::SelfDamagePct, 0.01),
];

impl BossArtifactKind {
    /// Every boss artifact in catalog order.
    pub const ALL: [BossArtifactKind; 6] = [
        Self::MidasCrown,
        Self::FrostHeart,
        Self::StormCrown,
        Self::HydraTooth,
        Self::CatalystShard,
        Self::BloodPact,
    ];

    /// Static stat contributions.
    #[must_use]
    pub const fn stats(self) -> &'static [StatDelta] {
        match self {
            Self::MidasCrown => &[],
            Self::FrostHeart => FROST_HEART,
            Self::StormCrown => STORM_CROWN,
            Self::HydraTooth => HYDRA_TOOTH,
            Self::CatalystShard => CATALYST_SHARD,
            Self::BloodPact => BLOOD_PACT,
        }
    }

    /// Contribution recomputed from current state on every aggregation.
    #[must_use]
    pub fn dynamic_stat(self, gold: u32) -> Option<StatDelta> {
        match self {
            Self::MidasCrown => {
                let steps = gold / MIDAS_GOLD_STEP;
                Some(StatDelta::new(
                    StatKey::DamagePct,
                    MIDAS_DAMAGE_PER_STEP * steps as f32,
                ))
            }
            _ => None,
        }
    }

    /// Shop price in gold; relics are usually earned from bosses.
    #[must_use]
    pub const fn price(self) -> u32 {
        400
    }
}

/// Discriminated item template shared by gems, artifacts and relics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemTemplate {
    /// Damage-dealing gem.
    ActiveGem(ActiveGemKind),
    /// Modifier gem.
    SupportGem(SupportGemKind),
    /// Accessory.
    Artifact(ArtifactKind),
    /// Boss relic.
    BossArtifact(BossArtifactKind),
}

impl ItemTemplate {
    /// Shop price in gold.
    #[must_use]
    pub const fn price(self) -> u32 {
        match self {
            Self::ActiveGem(kind) => kind.profile().price,
            Self::SupportGem(kind) => kind.price(),
            Self::Artifact(kind) => kind.price(),
            Self::BossArtifact(kind) => kind.price(),
        }
    }

    /// Reports whether the template may occupy `slot`.
    #[must_use]
    pub const fn fits(self, slot: Slot) -> bool {
        matches!(
            (self, slot),
            (Self::ActiveGem(_), Slot::Active(_))
                | (Self::SupportGem(_), Slot::Support(..))
                | (Self::Artifact(_), Slot::Accessory(_))
                | (Self::BossArtifact(_), Slot::Relic(_))
        )
    }
}

/// Node of the rank-based skill tree.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SkillNode {
    /// Identifier referenced by edges and allocations.
    pub id: SkillNodeId,
    /// Display name.
    pub name: &'static str,
    /// Highest allocatable rank.
    pub max_rank: u8,
    /// High-impact trade-off node.
    pub keystone: bool,
    /// Contributions per allocated rank.
    pub deltas: &'static [StatDelta],
}

const fn node(
    id: u16,
    name: &'static str,
    max_rank: u8,
    keystone: bool,
    deltas: &'static [StatDelta],
) -> SkillNode {
    SkillNode {
        id: SkillNodeId::new(id),
        name,
        max_rank,
        keystone,
        deltas,
    }
}

/// Node allocated for free when a run starts.
pub const SKILL_ROOT: SkillNodeId = SkillNodeId::new(0);

/// Every node of the skill tree.
pub const SKILL_NODES: &[SkillNode] = &[
    node(0, "Origin", 1, false, &[]),
    node(1, "Sharpened", 5, false, &[StatDelta::new(StatKey::DamagePct, 0.05)]),
    node(2, "Quickdraw", 5, false, &[StatDelta::new(StatKey::RatePct, 0.04)]),
    node(
        3,
        "Fortify",
        5,
        false,
        &[
            StatDelta::new(StatKey::MaxHealth, 10.0),
            StatDelta::new(StatKey::DamageReduction, 0.02),
        ],
    ),
    node(4, "Precision", 5, false, &[StatDelta::new(StatKey::CritChance, 0.02)]),
    node(5, "Lethality", 5, false, &[StatDelta::new(StatKey::CritDamage, 0.1)]),
    node(6, "Reach", 3, false, &[StatDelta::new(StatKey::ChainRangePct, 0.1)]),
    node(7, "Ricochet", 2, false, &[StatDelta::new(StatKey::ChainBonus, 1.0)]),
    node(8, "Blast Radius", 5, false, &[StatDelta::new(StatKey::AoePct, 0.08)]),
    node(9, "Alchemy", 5, false, &[StatDelta::new(StatKey::StatusPowerPct, 0.08)]),
    node(
        10,
        "Prospector",
        3,
        false,
        &[
            StatDelta::new(StatKey::GoldGainPct, 0.1),
            StatDelta::new(StatKey::XpGainPct, 0.05),
        ],
    ),
    node(
        11,
        "Glass Cannon",
        1,
        true,
        &[
            StatDelta::new(StatKey::DamageMore, 0.5),
            StatDelta::new(StatKey::SelfDamagePct, 0.02),
        ],
    ),
    node(
        12,
        "Sniper's Creed",
        1,
        true,
        &[
            StatDelta::new(StatKey::HitMultiplier, 0.4),
            StatDelta::new(StatKey::DotMultiplier, -0.5),
        ],
    ),
    node(
        13,
        "Plague Lord",
        1,
        true,
        &[
            StatDelta::new(StatKey::DotMultiplier, 0.6),
            StatDelta::new(StatKey::HitMultiplier, -0.3),
        ],
    ),
    node(14, "Siphon", 3, false, &[StatDelta::new(StatKey::LifeOnHit, 0.5)]),
];

/// Undirected adjacency of the skill tree.
pub const SKILL_EDGES: &[(SkillNodeId, SkillNodeId)] = &[
    (SkillNodeId::new(0), SkillNodeId::new(1)),
    (SkillNodeId::new(0), SkillNodeId::new(2)),
    (SkillNodeId::new(0), SkillNodeId::new(3)),
    (SkillNodeId::new(1), SkillNodeId::new(4)),
    (SkillNodeId::new(4), SkillNodeId::new(5)),
    (SkillNodeId::new(2), SkillNodeId::new(6)),
    (SkillNodeId::new(6), SkillNodeId::new(7)),
    (SkillNodeId::new(1), SkillNodeId::new(8)),
    (SkillNodeId::new(2), SkillNodeId::new(9)),
    (SkillNodeId::new(3), SkillNodeId::new(10)),
    (SkillNodeId::new(5), SkillNodeId::new(11)),
    (SkillNodeId::new(4), SkillNodeId::new(12)),
    (SkillNodeId::new(9), SkillNodeId::new(13)),
    (SkillNodeId::new(3), SkillNodeId::new(14)),
];

/// Looks up a skill node by identifier.
#[must_use]
pub fn skill_node(id: SkillNodeId) -> Option<&'static SkillNode> {
    SKILL_NODES.iter().find(|node| node.id == id)
}

/// Enumerates the nodes sharing an edge with `id`, in either direction.
pub fn skill_neighbours(id: SkillNodeId) -> impl Iterator<Item = SkillNodeId> {
    SKILL_EDGES.iter().filter_map(move |&(from, to)| {
        if from == id {
            Some(to)
        } else if to == id {
            Some(from)
        } else {
            None
        }
    })
}

/// Special-ability characters that can join a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CrewKind {
    /// Fire-rate specialist.
    Gunner,
    /// Status specialist.
    Alchemist,
    /// Deploys support drones.
    Engineer,
    /// Critical strike specialist.
    Marksman,
    /// Restores base integrity.
    Medic,
}

/// Change an active ability makes to the aggregated stats.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StatOverride {
    /// Folds the delta into the channel.
    Add(StatDelta),
    /// Replaces the channel value.
    Set(StatDelta),
}

/// What happens when a crew ability activates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AbilityEffect {
    /// Timed stat overrides.
    Buff(&'static [StatOverride]),
    /// Temporary extra support drone.
    DeployDrone,
    /// Instantly restores a fraction of maximum base integrity.
    Heal(f32),
}

/// Active ability of a crew member.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CrewAbility {
    /// Display name.
    pub name: &'static str,
    /// Energy spent on activation.
    pub energy_cost: f32,
    /// Ticks before the ability may be used again.
    pub cooldown_ticks: u32,
    /// Ticks the effect lasts; zero for instant effects.
    pub duration_ticks: u32,
    /// Effect applied on activation.
    pub effect: AbilityEffect,
}

/// Most crew members that may join one run.
pub const MAX_CREW: usize = 3;

const GUNNER_PASSIVE: &[StatDelta] = &[StatDelta::new(StatKey::RatePct, 0.1)];
const ALCHEMIST_PASSIVE: &[StatDelta] = &[StatDelta::new(StatKey::StatusPowerPct, 0.15)];
const ENGINEER_PASSIVE: &[StatDelta] = &[StatDelta::new(StatKey::SupportDamagePct, 0.25)];
const MARKSMAN_PASSIVE: &[StatDelta] = &[StatDelta::new(StatKey::CritChance, 0.05)];
const MEDIC_PASSIVE: &[StatDelta] = &[StatDelta::new(StatKey::LifeOnHit, 0.5)];

const OVERCLOCK: &[StatOverride] = &[StatOverride::Add(StatDelta::new(StatKey::RatePct, 1.0))];
const CATALYST: &[StatOverride] = &[StatOverride::Add(StatDelta::new(
    StatKey::DotMultiplier,
    1.0,
))];
const DEADEYE: &[StatOverride] = &[StatOverride::Set(StatDelta::new(StatKey::CritChance, 1.0))];

impl CrewKind {
    /// Every crew member in roster order.
    pub const ALL: [CrewKind; 5] = [
        Self::Gunner,
        Self::Alchemist,
        Self::Engineer,
        Self::Marksman,
        Self::Medic,
    ];

    /// Stats granted while the member is selected.
    #[must_use]
    pub const fn passive(self) -> &'static [StatDelta] {
        match self {
            Self::Gunner => GUNNER_PASSIVE,
            Self::Alchemist => ALCHEMIST_PASSIVE,
            Self::Engineer => ENGINEER_PASSIVE,
            Self::Marksman => MARKSMAN_PASSIVE,
            Self::Medic => MEDIC_PASSIVE,
        }
    }

    /// Number of permanent support drones the member provides.
    #[must_use]
    pub const fn passive_drones(self) -> u32 {
        match self {
            Self::Engineer => 1,
            _ => 0,
        }
    }

    /// Active ability of the member.
    #[must_use]
    pub const fn ability(self) -> CrewAbility {
        match self {
            Self::Gunner => CrewAbility {
                name: "Overclock",
                energy_cost: 30.0,
                cooldown_ticks: 1_800,
                duration_ticks: 300,
                effect: AbilityEffect::Buff(OVERCLOCK),
            },
            Self::Alchemist => CrewAbility {
                name: "Catalyst",
                energy_cost: 30.0,
                cooldown_ticks: 1_800,
                duration_ticks: 300,
                effect: AbilityEffect::Buff(CATALYST),
            },
            Self::Engineer => CrewAbility {
                name: "Deploy Drone",
                energy_cost: 40.0,
                cooldown_ticks: 2_400,
                duration_ticks: 900,
                effect: AbilityEffect::DeployDrone,
            },
            Self::Marksman => CrewAbility {
                name: "Deadeye",
                energy_cost: 35.0,
                cooldown_ticks: 2_100,
                duration_ticks: 180,
                effect: AbilityEffect::Buff(DEADEYE),
            },
            Self::Medic => CrewAbility {
                name: "Patch Up",
                energy_cost: 25.0,
                cooldown_ticks: 1_800,
                duration_ticks: 0,
                effect: AbilityEffect::Heal(0.25),
            },
        }
    }
}

/// Enemy archetype controlling base stats and behaviour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EnemyTier {
    /// Baseline walker; the only tier confusion affects.
    Common,
    /// Fast and fragile.
    Swift,
    /// Slow and durable.
    Tank,
    /// Tiny and numerous.
    Swarm,
    /// Heavy named enemy of a boss wave.
    Boss,
}

/// Published base values of an enemy tier.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TierProfile {
    /// Health at wave one.
    pub health: f32,
    /// Distance travelled per tick.
    pub speed: f32,
    /// Damage dealt to the base on breach or per boss attack.
    pub contact_damage: f32,
    /// Collision radius.
    pub radius: f32,
    /// Experience paid on death.
    pub xp: u32,
    /// Gold paid on death.
    pub gold: u32,
    /// Chance in `[0, 1]` of a loot drop on death.
    pub loot_chance: f32,
}

impl EnemyTier {
    /// Published base values for the tier.
    #[must_use]
    pub const fn profile(self) -> TierProfile {
        match self {
            Self::Common => TierProfile {
                health: 30.0,
                speed: 0.8,
                contact_damage: 10.0,
                radius: 12.0,
                xp: 5,
                gold: 3,
                loot_chance: 0.02,
            },
            Self::Swift => TierProfile {
                health: 18.0,
                speed: 1.6,
                contact_damage: 6.0,
                radius: 9.0,
                xp: 4,
                gold: 2,
                loot_chance: 0.02,
            },
            Self::Tank => TierProfile {
                health: 120.0,
                speed: 0.45,
                contact_damage: 25.0,
                radius: 18.0,
                xp: 15,
                gold: 8,
                loot_chance: 0.08,
            },
            Self::Swarm => TierProfile {
                health: 10.0,
                speed: 1.1,
                contact_damage: 3.0,
                radius: 7.0,
                xp: 1,
                gold: 1,
                loot_chance: 0.005,
            },
            Self::Boss => TierProfile {
                health: 1_500.0,
                speed: 0.35,
                contact_damage: 20.0,
                radius: 32.0,
                xp: 200,
                gold: 100,
                loot_chance: 1.0,
            },
        }
    }

    /// Reports whether heavy-target bonuses apply.
    #[must_use]
    pub const fn is_heavy(self) -> bool {
        matches!(self, Self::Tank | Self::Boss)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Loadout;

    #[test]
    fn skill_node_ids_match_their_index() {
        for (index, node) in SKILL_NODES.iter().enumerate() {
            assert_eq!(usize::from(node.id.get()), index);
        }
    }

    #[test]
    fn every_edge_references_known_nodes() {
        for (from, to) in SKILL_EDGES {
            assert!(skill_node(*from).is_some());
            assert!(skill_node(*to).is_some());
        }
    }

    #[test]
    fn neighbours_follow_edges_in_both_directions() {
        let neighbours: Vec<_> = skill_neighbours(SkillNodeId::new(4)).collect();
        assert_eq!(
            neighbours,
            vec![SkillNodeId::new(1), SkillNodeId::new(5), SkillNodeId::new(12)]
        );
    }

    #[test]
    fn keystones_are_rank_one() {
        for node in SKILL_NODES.iter().filter(|node| node.keystone) {
            assert_eq!(node.max_rank, 1, "{} must be rank one", node.name);
        }
    }

    #[test]
    fn templates_fit_only_their_slot_class() {
        let gem = ItemTemplate::ActiveGem(ActiveGemKind::Spark);
        assert!(gem.fits(Slot::Active(Loadout::Main)));
        assert!(gem.fits(Slot::Active(Loadout::Alternate)));
        assert!(!gem.fits(Slot::Support(Loadout::Main, 0)));
        assert!(!gem.fits(Slot::Accessory(0)));

        let relic = ItemTemplate::BossArtifact(BossArtifactKind::MidasCrown);
        assert!(relic.fits(Slot::Relic(0)));
        assert!(!relic.fits(Slot::Accessory(0)));
    }

    #[test]
    fn midas_crown_scales_with_whole_steps_of_gold() {
        let delta = BossArtifactKind::MidasCrown.dynamic_stat(250).expect("dynamic");
        assert_eq!(delta.key, StatKey::DamagePct);
        assert!((delta.value - 0.02).abs() < 1e-6);
        assert!(BossArtifactKind::FrostHeart.dynamic_stat(10_000).is_none());
    }

    #[test]
    fn support_levels_raise_contribution() {
        let low = SupportGemKind::Haste.modifiers(1);
        let high = SupportGemKind::Haste.modifiers(3);
        assert!(high.rate_pct > low.rate_pct);
        assert_eq!(SupportGemKind::Multishot.modifiers(1).extra_projectiles, 2);
        assert_eq!(SupportGemKind::Multishot.modifiers(3).extra_projectiles, 3);
    }
}
