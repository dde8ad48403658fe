//! Exact engine: every outcome is enumerated by convolution and carried
//! through the same per-roll rules the simulation uses. Any step whose outcome
//! counts would not fit a `u128` reports [`OverflowError`].

use std::collections::{BTreeMap, HashMap};

use tracing::trace;

use crate::attack::{AttackModifiers, AttackPool, RawRoll, Strike};
use crate::defense::{resolve_blocks, DefensePool, DefenseRoll, DefenseSurge};
use crate::defs::{AttackDie, DefenseDie, DEFENSE_SIDES};
use crate::dist::Dist;
use crate::results::{AttackResults, WoundsResults};
use crate::util::{Amount, Outcome, Result};
use crate::wounds::DefenseModifiers;

/// Face counts of the whole pool.
pub fn roll(pool: &AttackPool) -> Result<Dist<RawRoll>> {
    let mut acc = Dist::scalar(RawRoll::default());
    for die in AttackDie::ALL {
        let one = die.dist().map(|face| RawRoll::default().with(*face));
        let many = one.repeat(pool.count(die), RawRoll::default(), |a, b| *a + *b)?;
        acc = acc.apply_two(&many, |a, b| *a + *b)?;
    }
    trace!(outcomes = acc.values().len(), "attack roll convolved");
    Ok(acc)
}

pub fn attack(pool: &AttackPool, mods: &AttackModifiers) -> Result<Dist<Strike>> {
    let raw = roll(pool)?;
    let single = pool.reroll_dist(mods.surge);
    let mut cache: HashMap<u32, Dist<Strike>> = HashMap::new();

    raw.then(|roll| {
        let n = mods.rerolls(roll);
        let rerolled = match &single {
            Some(single) if n > 0 => rerolls(&mut cache, single, n)?,
            _ => Dist::scalar(Strike::default()),
        };
        Ok(rerolled.map(|extra| mods.settle(roll, *extra)))
    })
}

fn rerolls(
    cache: &mut HashMap<u32, Dist<Strike>>,
    single: &Dist<Strike>,
    n: u32,
) -> Result<Dist<Strike>> {
    if let Some(d) = cache.get(&n) {
        return Ok(d.clone());
    }
    let d = single.repeat(n, Strike::default(), |a, b| *a + *b)?;
    cache.insert(n, d.clone());
    Ok(d)
}

fn defense_rolls(die: DefenseDie, n: u32) -> Result<Dist<DefenseRoll>> {
    die.dist()
        .map(|face| DefenseRoll::default().with(*face))
        .repeat(n, DefenseRoll::default(), |a, b| *a + *b)
}

pub fn defense(
    pool: &DefensePool,
    surge: DefenseSurge,
    tokens: impl Into<Amount>,
) -> Result<Dist<u32>> {
    let tokens = tokens.into();
    let mut acc = Dist::scalar(DefenseRoll::default());
    for die in DefenseDie::ALL {
        acc = acc.apply_two(&defense_rolls(die, pool.count(die))?, |a, b| *a + *b)?;
    }
    Ok(acc.map(|roll| resolve_blocks(roll, surge, tokens)))
}

/// Wounds for single strikes, with defense rolls cached per dice count.
struct Wounds<'a> {
    mods: &'a DefenseModifiers,
    rolls: HashMap<u32, Dist<DefenseRoll>>,
}

impl<'a> Wounds<'a> {
    fn new(mods: &'a DefenseModifiers) -> Self {
        Self {
            mods,
            rolls: HashMap::new(),
        }
    }

    fn rolls(&mut self, n: u32) -> Result<Dist<DefenseRoll>> {
        if let Some(d) = self.rolls.get(&n) {
            return Ok(d.clone());
        }
        let d = defense_rolls(self.mods.die, n)?;
        self.rolls.insert(n, d.clone());
        Ok(d)
    }

    /// Hits left after the cover roll.
    fn covered(&self, screened: Strike) -> Result<Dist<u32>> {
        let dice = self.mods.cover_dice(screened);
        if dice == 0 {
            return Ok(Dist::scalar(screened.hits));
        }
        let cancel = self.mods.cover().cancel_faces();
        let one = Dist::weighted([
            (1u32, Outcome::from(cancel)),
            (0, Outcome::from(DEFENSE_SIDES - cancel)),
        ]);
        let cancelled = one.repeat(dice, 0, |a, b| a + b)?;
        Ok(cancelled.map(|c| screened.hits - c))
    }

    fn strike(&mut self, strike: Strike) -> Result<Dist<u32>> {
        let screened = self.mods.screen(strike);
        let extra = self.mods.extra_dice();
        self.covered(screened)?.then(|&hits| {
            let dice = self.mods.defense_dice(Strike::new(hits, screened.crits));
            let rolls = self.rolls(dice.saturating_add(extra))?;
            Ok(rolls.map(|roll| self.mods.wounds(dice, roll)))
        })
    }
}

/// Exact wounds for an exact attack distribution.
pub fn strike_wounds(attack: &Dist<Strike>, mods: &DefenseModifiers) -> Result<Dist<u32>> {
    let mut wounds = Wounds::new(mods);
    attack.then(|strike| wounds.strike(*strike))
}

/// Wounds for tabulated attack results. The attack masses are already
/// floating point, so the mixture is too; every defense step is exact.
pub fn wounds(attack: &AttackResults, mods: &DefenseModifiers) -> Result<WoundsResults> {
    let mut wounds = Wounds::new(mods);
    let mut mass: BTreeMap<u32, f64> = BTreeMap::new();
    for entry in attack.strikes() {
        let d = wounds.strike(entry.strike())?;
        for (total, p) in d.values().iter().zip(d.probabilities()) {
            *mass.entry(*total).or_insert(0.0) += entry.probability * p;
        }
    }
    trace!(strikes = attack.joint.len(), cached = wounds.rolls.len(), "wounds mixed");
    Ok(WoundsResults::from_mass(&mass))
}
