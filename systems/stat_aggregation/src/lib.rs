#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that folds every stat source into one [`CombatStats`] value.

use gem_defence_core::{
    catalog::{skill_node, AbilityEffect, StatOverride},
    ArtifactKind, BossArtifactKind, CombatStats, CrewKind, Leveled, SkillNodeId, StatDelta,
};

/// Borrowed view of every collection that contributes to the aggregated stats.
#[derive(Clone, Copy, Debug, Default)]
pub struct StatSources<'a> {
    /// Temporary picks made at level-up or from rewards.
    pub bonus_stats: &'a [StatDelta],
    /// Crew members selected for the run.
    pub crew: &'a [CrewKind],
    /// Crew members whose timed ability is currently active.
    pub active_buffs: &'a [CrewKind],
    /// Allocated skill ranks.
    pub skill_ranks: &'a [(SkillNodeId, u8)],
    /// Artifacts occupying accessory slots.
    pub artifacts: &'a [Leveled<ArtifactKind>],
    /// Boss artifacts occupying relic slots.
    pub boss_artifacts: &'a [BossArtifactKind],
    /// Gold currently held, feeding gold-scaled relics.
    pub gold: u32,
}

/// Stateless aggregator recomputing combat modifiers from scratch.
#[derive(Debug, Default)]
pub struct StatAggregator;

impl StatAggregator {
    /// Creates a new aggregator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Recomputes the aggregated stats from the provided sources.
    ///
    /// Every channel starts at its baseline and sources are folded in a fixed
    /// order: bonus stats, crew passives, crew ability overrides, skill tree,
    /// equipped artifacts, boss artifacts. Unknown skill nodes are ignored.
    #[must_use]
    pub fn recompute(&self, sources: &StatSources<'_>) -> CombatStats {
        let mut stats = CombatStats::baseline();

        for delta in sources.bonus_stats {
            stats.apply(*delta);
        }

        for crew in sources.crew {
            for delta in crew.passive() {
                stats.apply(*delta);
            }
        }

        for crew in sources.active_buffs {
            if let AbilityEffect::Buff(overrides) = crew.ability().effect {
                for change in overrides {
                    match change {
                        StatOverride::Add(delta) => stats.apply(*delta),
                        StatOverride::Set(delta) => stats.set(*delta),
                    }
                }
            }
        }

        for (node_id, rank) in sources.skill_ranks {
            let Some(node) = skill_node(*node_id) else {
                continue;
            };
            let rank = (*rank).min(node.max_rank);
            if rank == 0 {
                continue;
            }
            for delta in node.deltas {
                stats.apply(delta.scaled(f32::from(rank)));
            }
        }

        for artifact in sources.artifacts {
            let factor = ArtifactKind::level_factor(artifact.level);
            for delta in artifact.kind.stats() {
                stats.apply(delta.scaled(factor));
            }
        }

        for relic in sources.boss_artifacts {
            for delta in relic.stats() {
                stats.apply(*delta);
            }
            if let Some(delta) = relic.dynamic_stat(sources.gold) {
                stats.apply(delta);
            }
        }

        stats
    }
}
