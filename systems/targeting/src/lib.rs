#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that chooses the turret's attack target from world snapshots.
//!
//! Selection runs in three stages: a still-living manual designation, an
//! optional custom targeting script, and finally the nearest-to-base
//! strategy. Script errors and panics never escape the selector; they are
//! recorded and the next stage takes over.

use std::{
    cmp::Ordering,
    fmt,
    panic::{self, AssertUnwindSafe},
};

use gem_defence_core::{EnemyId, EnemySnapshot, EnemyView};
use thiserror::Error;

/// Named selection strategies available to the default path and to scripts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Enemy closest to the base.
    Nearest,
    /// Enemy with the most remaining health.
    HighestHealth,
    /// Enemy with the least remaining health.
    LowestHealth,
}

impl Strategy {
    /// Every strategy in library order.
    pub const ALL: [Strategy; 3] = [Self::Nearest, Self::HighestHealth, Self::LowestHealth];

    /// Name scripts use to look the strategy up.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Nearest => "nearest",
            Self::HighestHealth => "highest_health",
            Self::LowestHealth => "lowest_health",
        }
    }

    /// Resolves a strategy from its library name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|strategy| strategy.name() == name)
    }

    /// Applies the strategy to the enemies; ties go to the lowest identifier.
    #[must_use]
    pub fn pick(self, enemies: &EnemyView) -> Option<EnemyId> {
        let better = |candidate: &EnemySnapshot, best: &EnemySnapshot| -> bool {
            let ordering = match self {
                Self::Nearest => candidate
                    .distance_to_base()
                    .total_cmp(&best.distance_to_base()),
                Self::HighestHealth => best.health.total_cmp(&candidate.health),
                Self::LowestHealth => candidate.health.total_cmp(&best.health),
            };
            ordering == Ordering::Less
        };

        let mut best: Option<&EnemySnapshot> = None;
        for candidate in enemies.iter() {
            match best {
                Some(current) if !better(candidate, current) => {}
                _ => best = Some(candidate),
            }
        }
        best.map(|snapshot| snapshot.id)
    }
}

/// Library of named strategies handed to custom scripts.
#[derive(Clone, Copy, Debug, Default)]
pub struct StrategyLibrary;

impl StrategyLibrary {
    /// Runs the strategy registered under `name`.
    pub fn pick(&self, name: &str, enemies: &EnemyView) -> Result<Option<EnemyId>, ScriptError> {
        let strategy =
            Strategy::from_name(name).ok_or_else(|| ScriptError::UnknownStrategy(name.to_owned()))?;
        Ok(strategy.pick(enemies))
    }
}

/// Failure reported by, or detected around, a custom targeting script.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ScriptError {
    /// The script reported its own failure.
    #[error("targeting script failed: {0}")]
    Failed(String),
    /// The script asked for a strategy the library does not provide.
    #[error("unknown targeting strategy `{0}`")]
    UnknownStrategy(String),
    /// The script chose an enemy that is not alive.
    #[error("targeting script chose unknown enemy {0:?}")]
    UnknownEnemy(EnemyId),
    /// The script panicked.
    #[error("targeting script panicked")]
    Panicked,
}

/// Player supplied targeting logic.
pub type TargetScript =
    Box<dyn FnMut(&EnemyView, &StrategyLibrary) -> Result<Option<EnemyId>, ScriptError> + Send>;

/// Outcome of one selection pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Selection {
    /// Enemy to attack, if any enemy is alive.
    pub target: Option<EnemyId>,
    /// The manual designation referred to a dead enemy and must be cleared.
    pub clear_manual: bool,
}

/// Target selector holding the optional custom script.
#[derive(Default)]
pub struct TargetSelector {
    script: Option<TargetScript>,
    last_error: Option<ScriptError>,
}

impl fmt::Debug for TargetSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetSelector")
            .field("script", &self.script.is_some())
            .field("last_error", &self.last_error)
            .finish()
    }
}

impl TargetSelector {
    /// Creates a selector without a custom script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a custom targeting script, replacing any previous one.
    pub fn set_script<F>(&mut self, script: F)
    where
        F: FnMut(&EnemyView, &StrategyLibrary) -> Result<Option<EnemyId>, ScriptError>
            + Send
            + 'static,
    {
        self.script = Some(Box::new(script));
        self.last_error = None;
    }

    /// Removes the custom targeting script.
    pub fn clear_script(&mut self) {
        self.script = None;
        self.last_error = None;
    }

    /// Reports whether a custom script is installed.
    #[must_use]
    pub fn has_script(&self) -> bool {
        self.script.is_some()
    }

    /// Error raised by the most recent script invocation, if it failed.
    #[must_use]
    pub fn last_error(&self) -> Option<&ScriptError> {
        self.last_error.as_ref()
    }

    /// Chooses the attack target.
    pub fn select(&mut self, enemies: &EnemyView, manual: Option<EnemyId>) -> Selection {
        let mut clear_manual = false;
        if let Some(manual) = manual {
            if enemies.get(manual).is_some() {
                return Selection {
                    target: Some(manual),
                    clear_manual,
                };
            }
            clear_manual = true;
        }

        if enemies.is_empty() {
            return Selection {
                target: None,
                clear_manual,
            };
        }

        if let Some(target) = self.run_script(enemies) {
            return Selection {
                target: Some(target),
                clear_manual,
            };
        }

        Selection {
            target: Strategy::Nearest.pick(enemies),
            clear_manual,
        }
    }

    fn run_script(&mut self, enemies: &EnemyView) -> Option<EnemyId> {
        let script = self.script.as_mut()?;
        let library = StrategyLibrary;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| script(enemies, &library)));

        let result = match outcome {
            Ok(Ok(Some(target))) if enemies.get(target).is_none() => {
                Err(ScriptError::UnknownEnemy(target))
            }
            Ok(result) => result,
            Err(_) => Err(ScriptError::Panicked),
        };

        match result {
            Ok(target) => {
                self.last_error = None;
                target
            }
            Err(error) => {
                self.last_error = Some(error);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gem_defence_core::{EnemyTier, StatusSet};
    use glam::Vec2;

    fn enemy(id: u32, y: f32, health: f32) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(id),
            tier: EnemyTier::Common,
            position: Vec2::new(400.0, y),
            health,
            max_health: 50.0,
            statuses: StatusSet::empty(),
            boss_phase: None,
        }
    }

    fn view() -> EnemyView {
        EnemyView::from_snapshots(vec![
            enemy(1, 100.0, 40.0),
            enemy(2, 300.0, 10.0),
            enemy(3, 200.0, 45.0),
        ])
    }

    #[test]
    fn strategies_pick_by_their_criterion() {
        let enemies = view();
        assert_eq!(Strategy::Nearest.pick(&enemies), Some(EnemyId::new(2)));
        assert_eq!(Strategy::HighestHealth.pick(&enemies), Some(EnemyId::new(3)));
        assert_eq!(Strategy::LowestHealth.pick(&enemies), Some(EnemyId::new(2)));
        assert_eq!(Strategy::Nearest.pick(&EnemyView::default()), None);
    }

    #[test]
    fn ties_prefer_the_lowest_identifier() {
        let enemies = EnemyView::from_snapshots(vec![enemy(9, 200.0, 5.0), enemy(4, 200.0, 5.0)]);
        for strategy in Strategy::ALL {
            assert_eq!(strategy.pick(&enemies), Some(EnemyId::new(4)));
        }
    }

    #[test]
    fn names_round_trip_through_the_library() {
        for strategy in Strategy::ALL {
            assert_eq!(Strategy::from_name(strategy.name()), Some(strategy));
        }
        assert_eq!(
            StrategyLibrary.pick("furthest", &view()),
            Err(ScriptError::UnknownStrategy("furthest".to_owned()))
        );
    }
}
