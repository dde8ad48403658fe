use bon::Builder;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::approx::Approx;
use crate::attack::{AttackModifiers, AttackPool};
use crate::defense::{DefensePool, DefenseSurge};
use crate::results::{AttackResults, DefenseResults, WoundsResults};
use crate::rng::seeded;
use crate::util::Amount;
use crate::wounds::DefenseModifiers;
use crate::{exact, simulate, DEFAULT_RUNS, DEFAULT_SEED};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Enumerate every outcome; falls back to simulation when the outcome
    /// counts overflow.
    Exact,
    #[default]
    Simulate,
}

/// Entry point for callers. Every call starts a fresh RNG from `seed`, so
/// identical inputs always give identical results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Builder)]
pub struct Calculator {
    #[builder(default = DEFAULT_SEED)]
    seed: u64,
    #[builder(default = DEFAULT_RUNS)]
    runs: u32,
    #[builder(default)]
    strategy: Strategy,
}

impl Default for Calculator {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Calculator {
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[must_use]
    pub fn runs(&self) -> u32 {
        self.runs
    }

    #[must_use]
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    fn approx(&self) -> Approx {
        Approx::builder().runs(self.runs).build(seeded(self.seed))
    }

    #[must_use]
    pub fn attack(&self, pool: &AttackPool, mods: &AttackModifiers) -> AttackResults {
        debug!(?pool, strategy = ?self.strategy, runs = self.runs, "attack distribution");
        let dist = match self.strategy {
            Strategy::Exact => exact::attack(pool, mods).unwrap_or_else(|err| {
                debug!(%err, "exact attack failed, simulating");
                simulate::attack(&mut self.approx(), pool, mods)
            }),
            Strategy::Simulate => simulate::attack(&mut self.approx(), pool, mods),
        };
        let results = AttackResults::from(&dist);
        debug!(expected = results.expected_total, "attack distribution done");
        results
    }

    #[must_use]
    pub fn defense(
        &self,
        pool: &DefensePool,
        surge: DefenseSurge,
        tokens: impl Into<Amount>,
    ) -> DefenseResults {
        let tokens = tokens.into();
        debug!(?pool, strategy = ?self.strategy, runs = self.runs, "defense distribution");
        let dist = match self.strategy {
            Strategy::Exact => exact::defense(pool, surge, tokens).unwrap_or_else(|err| {
                debug!(%err, "exact defense failed, simulating");
                simulate::defense(&mut self.approx(), pool, surge, tokens)
            }),
            Strategy::Simulate => simulate::defense(&mut self.approx(), pool, surge, tokens),
        };
        DefenseResults::from(&dist)
    }

    #[must_use]
    pub fn wounds(&self, attack: &AttackResults, mods: &DefenseModifiers) -> WoundsResults {
        debug!(strategy = ?self.strategy, runs = self.runs, "wounds distribution");
        let results = match self.strategy {
            Strategy::Exact => exact::wounds(attack, mods).unwrap_or_else(|err| {
                debug!(%err, "exact wounds failed, simulating");
                WoundsResults::from(&simulate::wounds(&mut self.approx(), attack, mods))
            }),
            Strategy::Simulate => {
                WoundsResults::from(&simulate::wounds(&mut self.approx(), attack, mods))
            }
        };
        debug!(expected = results.expected_wounds, "wounds distribution done");
        results
    }

    /// Wounds straight from an attack pool. The exact strategy keeps rational
    /// masses through both stages.
    #[must_use]
    pub fn engagement(
        &self,
        pool: &AttackPool,
        attack: &AttackModifiers,
        defense: &DefenseModifiers,
    ) -> WoundsResults {
        debug!(?pool, strategy = ?self.strategy, runs = self.runs, "engagement");
        let enumerate = || exact::strike_wounds(&exact::attack(pool, attack)?, defense);
        let dist = match self.strategy {
            Strategy::Exact => enumerate().unwrap_or_else(|err| {
                debug!(%err, "exact engagement failed, simulating");
                simulate::engagement(&mut self.approx(), pool, attack, defense)
            }),
            Strategy::Simulate => simulate::engagement(&mut self.approx(), pool, attack, defense),
        };
        WoundsResults::from(&dist)
    }
}

/// Attack results with the default seed and run count.
#[must_use]
pub fn compute_attack_distribution(pool: &AttackPool, mods: &AttackModifiers) -> AttackResults {
    Calculator::default().attack(pool, mods)
}

/// Defense results; these are always exact.
#[must_use]
pub fn compute_defense_distribution(
    pool: &DefensePool,
    surge: DefenseSurge,
    tokens: impl Into<Amount>,
) -> DefenseResults {
    Calculator::builder()
        .strategy(Strategy::Exact)
        .build()
        .defense(pool, surge, tokens)
}

#[must_use]
pub fn compute_wounds_distribution(
    attack: &AttackResults,
    mods: &DefenseModifiers,
) -> WoundsResults {
    Calculator::default().wounds(attack, mods)
}
