use gem_defence_core::{
    ArtifactKind, BossArtifactKind, CombatStats, CrewKind, Leveled, SkillNodeId, StatDelta,
    StatKey,
};
use gem_defence_system_stat_aggregation::{StatAggregator, StatSources};

#[test]
fn single_rank_node_contributes_exactly_its_delta() {
    let ranks = [(SkillNodeId::new(0), 1), (SkillNodeId::new(1), 1)];
    let stats = StatAggregator::new().recompute(&StatSources {
        skill_ranks: &ranks,
        ..StatSources::default()
    });

    assert_eq!(stats.damage_pct, 0.05);
}

#[test]
fn recompute_is_pure() {
    let ranks = [(SkillNodeId::new(1), 3), (SkillNodeId::new(11), 1)];
    let artifacts = [Leveled {
        kind: ArtifactKind::SharpLens,
        level: 2,
    }];
    let bonus = [StatDelta::new(StatKey::GoldGainPct, 0.1)];
    let crew = [CrewKind::Gunner, CrewKind::Marksman];
    let relics = [BossArtifactKind::MidasCrown];
    let sources = StatSources {
        bonus_stats: &bonus,
        crew: &crew,
        active_buffs: &[],
        skill_ranks: &ranks,
        artifacts: &artifacts,
        boss_artifacts: &relics,
        gold: 420,
    };

    let aggregator = StatAggregator::new();
    assert_eq!(aggregator.recompute(&sources), aggregator.recompute(&sources));
}

#[test]
fn changing_one_rank_changes_only_that_nodes_stats() {
    let before_ranks = [(SkillNodeId::new(1), 1), (SkillNodeId::new(3), 2)];
    let after_ranks = [(SkillNodeId::new(1), 1), (SkillNodeId::new(3), 3)];
    let aggregator = StatAggregator::new();

    let before = aggregator.recompute(&StatSources {
        skill_ranks: &before_ranks,
        ..StatSources::default()
    });
    let after = aggregator.recompute(&StatSources {
        skill_ranks: &after_ranks,
        ..StatSources::default()
    });

    for key in StatKey::ALL {
        match key {
            StatKey::MaxHealth | StatKey::DamageReduction => {
                assert!(after.get(*key) > before.get(*key), "{key:?} should grow")
            }
            _ => assert_eq!(after.get(*key), before.get(*key), "{key:?} should not move"),
        }
    }
}

#[test]
fn ability_overrides_apply_before_skill_tree() {
    let ranks = [(SkillNodeId::new(4), 2)];
    let crew = [CrewKind::Marksman];
    let stats = StatAggregator::new().recompute(&StatSources {
        crew: &crew,
        active_buffs: &crew,
        skill_ranks: &ranks,
        ..StatSources::default()
    });

    // Deadeye pins crit chance to 1.0, then Precision adds on top.
    assert!((stats.crit_chance - 1.04).abs() < 1e-6);
}

#[test]
fn midas_crown_tracks_current_gold() {
    let relics = [BossArtifactKind::MidasCrown];
    let aggregator = StatAggregator::new();
    let poor = aggregator.recompute(&StatSources {
        boss_artifacts: &relics,
        gold: 99,
        ..StatSources::default()
    });
    let rich = aggregator.recompute(&StatSources {
        boss_artifacts: &relics,
        gold: 500,
        ..StatSources::default()
    });

    assert_eq!(poor.damage_pct, 0.0);
    assert!((rich.damage_pct - 0.05).abs() < 1e-6);
}

#[test]
fn artifact_levels_scale_numbers_but_not_flags() {
    let artifacts = [
        Leveled {
            kind: ArtifactKind::HunterMark,
            level: 3,
        },
        Leveled {
            kind: ArtifactKind::SeekerCore,
            level: 3,
        },
    ];
    let stats = StatAggregator::new().recompute(&StatSources {
        artifacts: &artifacts,
        ..StatSources::default()
    });

    assert!((stats.anti_tank_pct - 0.36).abs() < 1e-6);
    assert_eq!(stats.homing, 1.0);
}

#[test]
fn keystone_trade_offs_compound_multiplicatively() {
    let ranks = [(SkillNodeId::new(12), 1), (SkillNodeId::new(13), 1)];
    let stats = StatAggregator::new().recompute(&StatSources {
        skill_ranks: &ranks,
        ..StatSources::default()
    });

    assert!((stats.hit_multiplier - 1.4 * 0.7).abs() < 1e-6);
    assert!((stats.dot_multiplier - 0.5 * 1.6).abs() < 1e-6);
    assert_ne!(stats, CombatStats::baseline());
}
