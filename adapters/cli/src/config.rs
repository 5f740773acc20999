//! TOML description of a headless simulation run.

use std::{collections::BTreeMap, fs, path::Path};

use anyhow::{Context, Result};
use gem_defence_core::{ActiveGemKind, CrewKind, SkillNodeId, StatDelta, StatKey, SupportGemKind};
use gem_defence_world::{Bootstrap, DEFAULT_SEED};
use serde::Deserialize;
use tracing::debug;

/// Simulated seconds when neither the file nor the command line says otherwise.
pub(crate) const DEFAULT_SECONDS: f32 = 120.0;
/// Gold granted before the opening purchases.
pub(crate) const DEFAULT_STARTING_GOLD: u32 = 100;
/// Last wave of a configured run.
pub(crate) const DEFAULT_FINAL_WAVE: u32 = 20;

/// Gems bought and socketed into one loadout before the first tick.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct LoadoutConfig {
    pub(crate) active: Option<ActiveGemKind>,
    pub(crate) supports: Vec<SupportGemKind>,
}

/// Complete run description; every field has a default.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct SimulationConfig {
    pub(crate) seed: u64,
    pub(crate) seconds: f32,
    pub(crate) time_scale: f32,
    pub(crate) final_wave: u32,
    pub(crate) starting_gold: u32,
    pub(crate) shield: bool,
    pub(crate) crew: Vec<CrewKind>,
    pub(crate) main: LoadoutConfig,
    pub(crate) alternate: LoadoutConfig,
    /// Skill nodes allocated in order as skill points arrive.
    pub(crate) skills: Vec<u16>,
    /// Bonus stats keyed by stable stat name.
    pub(crate) bonus_stats: BTreeMap<String, f32>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            seconds: DEFAULT_SECONDS,
            time_scale: 1.0,
            final_wave: DEFAULT_FINAL_WAVE,
            starting_gold: DEFAULT_STARTING_GOLD,
            shield: false,
            crew: Vec::new(),
            main: LoadoutConfig {
                active: Some(ActiveGemKind::Spark),
                supports: Vec::new(),
            },
            alternate: LoadoutConfig::default(),
            skills: Vec::new(),
            bonus_stats: BTreeMap::new(),
        }
    }
}

impl SimulationConfig {
    /// Reads a configuration file from disk.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read simulation config at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid simulation config at {}", path.display()))
    }

    /// Parses configuration text.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse simulation config toml contents")
    }

    /// Bonus stats resolved by name; unknown names are skipped.
    pub(crate) fn bonus_deltas(&self) -> Vec<StatDelta> {
        self.bonus_stats
            .iter()
            .filter_map(|(name, value)| match StatKey::from_name(name) {
                Some(key) => Some(StatDelta::new(key, *value)),
                None => {
                    debug!(stat = %name, "ignoring unknown bonus stat");
                    None
                }
            })
            .collect()
    }

    /// Skill plan as node identifiers.
    pub(crate) fn skill_plan(&self) -> Vec<SkillNodeId> {
        self.skills.iter().copied().map(SkillNodeId::new).collect()
    }

    /// World bootstrap settings derived from the file.
    pub(crate) fn bootstrap(&self) -> Bootstrap {
        Bootstrap {
            seed: self.seed,
            starting_gold: self.starting_gold,
            bonus_stats: self.bonus_deltas(),
        }
    }
}
