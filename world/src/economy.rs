//! Gold, experience, energy and the shield they feed.

use gem_defence_core::{
    BossArtifactKind, CombatStats, CommandError, OfferKind, RewardChoice, RewardOffer, StatDelta,
    StatKey,
};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

pub(crate) const STARTING_GOLD: u32 = 100;
pub(crate) const MAX_ENERGY: f32 = 100.0;
pub(crate) const ENERGY_REGEN_PER_TICK: f32 = 0.05;
pub(crate) const SHIELD_DRAIN_PER_TICK: f32 = 0.25;
/// Share of incoming base damage the raised shield absorbs.
pub(crate) const SHIELD_ABSORB: f32 = 0.5;
/// Choices presented by a level-up offer.
pub(crate) const LEVEL_UP_CHOICES: usize = 3;
pub(crate) const BOSS_GOLD_REWARD_BASE: u32 = 150;
pub(crate) const BOSS_GOLD_REWARD_PER_WAVE: u32 = 10;

const LEVEL_UP_POOL: [StatDelta; 8] = [
    StatDelta::new(StatKey::DamagePct, 0.08),
    StatDelta::new(StatKey::RatePct, 0.06),
    StatDelta::new(StatKey::CritChance, 0.03),
    StatDelta::new(StatKey::CritDamage, 0.15),
    StatDelta::new(StatKey::AoePct, 0.1),
    StatDelta::new(StatKey::StatusPowerPct, 0.1),
    StatDelta::new(StatKey::MaxHealth, 15.0),
    StatDelta::new(StatKey::LifeOnHit, 0.25),
];

/// Experience needed to advance from `level` to the next one.
pub(crate) fn xp_to_next(level: u32) -> u32 {
    25 * level.max(1)
}

/// Applies a percentage bonus to a payout, rounding to the nearest coin.
pub(crate) fn scaled_payout(base: u32, bonus_pct: f32) -> u32 {
    (base as f32 * (1.0 + bonus_pct).max(0.0)).round() as u32
}

#[derive(Clone, Debug)]
pub(crate) struct Economy {
    pub(crate) gold: u32,
    pub(crate) xp: u32,
    pub(crate) level: u32,
    pub(crate) energy: f32,
    pub(crate) shield_active: bool,
}

impl Default for Economy {
    fn default() -> Self {
        Self {
            gold: STARTING_GOLD,
            xp: 0,
            level: 1,
            energy: MAX_ENERGY,
            shield_active: false,
        }
    }
}

impl Economy {
    pub(crate) fn spend_gold(&mut self, price: u32) -> Result<(), CommandError> {
        if self.gold < price {
            return Err(CommandError::InsufficientGold {
                price,
                gold: self.gold,
            });
        }
        self.gold -= price;
        Ok(())
    }

    pub(crate) fn spend_energy(&mut self, cost: f32) -> Result<(), CommandError> {
        if self.energy < cost {
            return Err(CommandError::InsufficientEnergy);
        }
        self.energy -= cost;
        Ok(())
    }

    /// Adds experience and returns the levels reached, in order.
    pub(crate) fn gain_xp(&mut self, amount: u32) -> Vec<u32> {
        self.xp = self.xp.saturating_add(amount);
        let mut reached = Vec::new();
        while self.xp >= xp_to_next(self.level) {
            self.xp -= xp_to_next(self.level);
            self.level += 1;
            reached.push(self.level);
        }
        reached
    }

    /// Regenerates energy and drains the shield for one tick.
    ///
    /// Returns `true` when the shield dropped because energy ran out.
    pub(crate) fn tick(&mut self, stats: &CombatStats) -> bool {
        let regen = ENERGY_REGEN_PER_TICK * (1.0 + stats.energy_regen_pct).max(0.0);
        self.energy = (self.energy + regen).min(MAX_ENERGY);

        if !self.shield_active {
            return false;
        }
        self.energy -= SHIELD_DRAIN_PER_TICK;
        if self.energy <= 0.0 {
            self.energy = 0.0;
            self.shield_active = false;
            return true;
        }
        false
    }
}

/// Builds a level-up offer of distinct bonus stats.
pub(crate) fn level_up_offer(rng: &mut ChaCha8Rng) -> RewardOffer {
    let mut pool = LEVEL_UP_POOL.to_vec();
    let mut choices = Vec::with_capacity(LEVEL_UP_CHOICES);
    while choices.len() < LEVEL_UP_CHOICES && !pool.is_empty() {
        let index = rng.gen_range(0..pool.len());
        choices.push(RewardChoice::BonusStat(pool.swap_remove(index)));
    }
    RewardOffer {
        kind: OfferKind::LevelUp,
        choices,
    }
}

/// Builds the post-boss offer: a relic, a bonus stat or gold.
pub(crate) fn boss_offer(wave: u32, rng: &mut ChaCha8Rng) -> RewardOffer {
    let relic = BossArtifactKind::ALL[rng.gen_range(0..BossArtifactKind::ALL.len())];
    let stat = LEVEL_UP_POOL[rng.gen_range(0..LEVEL_UP_POOL.len())];
    RewardOffer {
        kind: OfferKind::BossReward,
        choices: vec![
            RewardChoice::BossArtifact(relic),
            RewardChoice::BonusStat(stat.scaled(2.0)),
            RewardChoice::Gold(BOSS_GOLD_REWARD_BASE + BOSS_GOLD_REWARD_PER_WAVE * wave),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn experience_rolls_over_multiple_levels() {
        let mut economy = Economy::default();
        let reached = economy.gain_xp(xp_to_next(1) + xp_to_next(2) + 5);
        assert_eq!(reached, vec![2, 3]);
        assert_eq!(economy.xp, 5);
    }

    #[test]
    fn shield_drops_when_energy_runs_out() {
        let mut economy = Economy {
            energy: 0.3,
            shield_active: true,
            ..Economy::default()
        };
        let stats = CombatStats::baseline();
        assert!(!economy.tick(&stats));
        assert!(economy.tick(&stats));
        assert!(!economy.shield_active);
        assert_eq!(economy.energy, 0.0);
    }

    #[test]
    fn spending_rejects_shortfalls() {
        let mut economy = Economy::default();
        assert_eq!(
            economy.spend_gold(STARTING_GOLD + 1),
            Err(CommandError::InsufficientGold {
                price: STARTING_GOLD + 1,
                gold: STARTING_GOLD
            })
        );
        assert!(economy.spend_gold(STARTING_GOLD).is_ok());
        assert_eq!(economy.gold, 0);
        assert_eq!(
            economy.spend_energy(MAX_ENERGY + 1.0),
            Err(CommandError::InsufficientEnergy)
        );
    }

    #[test]
    fn level_up_choices_are_distinct() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let offer = level_up_offer(&mut rng);
        assert_eq!(offer.choices.len(), LEVEL_UP_CHOICES);
        for (index, choice) in offer.choices.iter().enumerate() {
            assert!(!offer.choices[index + 1..].contains(choice));
        }
    }
}
