//! Simulation engine. Each trial rolls real dice, picks reroll dice at random
//! and rolls cover and defense dice, then applies the same per-roll rules as
//! the exact engine.

use rand::RngCore;

use crate::approx::Approx;
use crate::attack::{AttackModifiers, AttackPool, Strike};
use crate::defense::{resolve_blocks, DefensePool, DefenseSurge};
use crate::dist::Dist;
use crate::results::{AttackResults, JointEntry};
use crate::rng::unit;
use crate::util::Amount;
use crate::wounds::DefenseModifiers;

pub fn attack_trial<G>(pool: &AttackPool, mods: &AttackModifiers, rng: &mut G) -> Strike
where
    G: RngCore + ?Sized,
{
    let roll = pool.roll(rng);
    let rerolled = (0..mods.rerolls(&roll)).fold(Strike::default(), |acc, _| {
        acc + pool.reroll(rng, mods.surge)
    });
    mods.settle(&roll, rerolled)
}

pub fn attack<G>(approx: &mut Approx<G>, pool: &AttackPool, mods: &AttackModifiers) -> Dist<Strike>
where
    G: RngCore,
{
    approx.eval(|rng| attack_trial(pool, mods, rng))
}

pub fn defense<G>(
    approx: &mut Approx<G>,
    pool: &DefensePool,
    surge: DefenseSurge,
    tokens: impl Into<Amount>,
) -> Dist<u32>
where
    G: RngCore,
{
    let tokens = tokens.into();
    approx.eval(|rng| resolve_blocks(&pool.roll(rng), surge, tokens))
}

/// Wounds dealt by one resolved strike.
pub fn wounds_trial<G>(strike: Strike, mods: &DefenseModifiers, rng: &mut G) -> u32
where
    G: RngCore + ?Sized,
{
    let screened = mods.screen(strike);
    let covered = mods.take_cover(screened, rng);
    let dice = mods.defense_dice(covered);
    let pool = DefensePool::of(mods.die, dice.saturating_add(mods.extra_dice()));
    mods.wounds(dice, &pool.roll(rng))
}

/// Picks the strike whose cumulative mass first exceeds `roll`. Rounding can
/// leave the masses a hair short of one; the last strike absorbs that gap.
fn draw(strikes: &[&JointEntry], roll: f64) -> Strike {
    let mut acc = 0.0;
    for entry in strikes {
        acc += entry.probability;
        if roll < acc {
            return entry.strike();
        }
    }
    strikes.last().map(|e| e.strike()).unwrap_or_default()
}

pub fn wounds<G>(
    approx: &mut Approx<G>,
    attack: &AttackResults,
    mods: &DefenseModifiers,
) -> Dist<u32>
where
    G: RngCore,
{
    let strikes: Vec<&JointEntry> = attack.strikes().collect();
    if strikes.is_empty() {
        return Dist::scalar(0);
    }
    approx.eval(|rng| {
        let strike = draw(&strikes, unit(rng));
        wounds_trial(strike, mods, rng)
    })
}

/// Attack and defense in one trial, without tabulating the attack first.
pub fn engagement<G>(
    approx: &mut Approx<G>,
    pool: &AttackPool,
    attack: &AttackModifiers,
    defense: &DefenseModifiers,
) -> Dist<u32>
where
    G: RngCore,
{
    approx.eval(|rng| {
        let strike = attack_trial(pool, attack, rng);
        wounds_trial(strike, defense, rng)
    })
}
