use std::ops::Add;
use std::str::FromStr;

use bon::Builder;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::defs::{AttackDie, AttackFace};
use crate::dist::Dist;
use crate::util::{deserialize_count, Amount, Outcome, ParseError};
use crate::value::ComputableValue;

/// Number of attack dice per color.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackPool {
    #[serde(deserialize_with = "deserialize_count")]
    pub red: u32,
    #[serde(deserialize_with = "deserialize_count")]
    pub black: u32,
    #[serde(deserialize_with = "deserialize_count")]
    pub white: u32,
}

impl AttackPool {
    #[must_use]
    pub fn new(
        red: impl Into<Amount>,
        black: impl Into<Amount>,
        white: impl Into<Amount>,
    ) -> Self {
        Self {
            red: red.into().get(),
            black: black.into().get(),
            white: white.into().get(),
        }
    }

    #[must_use]
    pub fn of(die: AttackDie, n: impl Into<Amount>) -> Self {
        let mut pool = Self::default();
        *pool.count_mut(die) = n.into().get();
        pool
    }

    #[must_use]
    pub fn count(&self, die: AttackDie) -> u32 {
        match die {
            AttackDie::Red => self.red,
            AttackDie::Black => self.black,
            AttackDie::White => self.white,
        }
    }

    fn count_mut(&mut self, die: AttackDie) -> &mut u32 {
        match die {
            AttackDie::Red => &mut self.red,
            AttackDie::Black => &mut self.black,
            AttackDie::White => &mut self.white,
        }
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.red.saturating_add(self.black).saturating_add(self.white)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Every die in the pool, red first, then black, then white.
    pub fn dice(&self) -> impl Iterator<Item = AttackDie> + '_ {
        AttackDie::ALL
            .into_iter()
            .flat_map(|die| std::iter::repeat(die).take(self.count(die) as usize))
    }

    /// A die chosen uniformly from the whole pool.
    pub fn pick<G>(&self, rng: &mut G) -> Option<AttackDie>
    where
        G: RngCore + ?Sized,
    {
        let total = self.total();
        if total == 0 {
            return None;
        }
        let mut index = rng.gen_range(0..total);
        for die in AttackDie::ALL {
            let n = self.count(die);
            if index < n {
                return Some(die);
            }
            index -= n;
        }
        None
    }

    pub fn roll<G>(&self, rng: &mut G) -> RawRoll
    where
        G: RngCore + ?Sized,
    {
        self.dice()
            .fold(RawRoll::default(), |acc, die| acc.with(die.roll(rng)))
    }

    /// Outcome of one reroll: a die picked uniformly from the pool, rolled,
    /// and its face converted under `surge`. `None` for an empty pool.
    #[must_use]
    pub fn reroll_dist(&self, surge: SurgeMode) -> Option<Dist<Strike>> {
        if self.is_empty() {
            return None;
        }
        let weights = AttackDie::ALL.into_iter().flat_map(|die| {
            let n = Outcome::from(self.count(die));
            let faces = die.faces();
            AttackFace::ALL
                .into_iter()
                .map(move |face| (surge.convert(face), n * Outcome::from(faces.count(face))))
        });
        Some(Dist::weighted(weights))
    }

    pub fn reroll<G>(&self, rng: &mut G, surge: SurgeMode) -> Strike
    where
        G: RngCore + ?Sized,
    {
        match self.pick(rng) {
            Some(die) => surge.convert(die.roll(rng)),
            None => Strike::default(),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurgeMode {
    #[default]
    None,
    Hit,
    Crit,
}

impl SurgeMode {
    /// Value of a single face once surges follow this mode. Critical X and
    /// surge tokens never apply here.
    #[must_use]
    pub fn convert(self, face: AttackFace) -> Strike {
        match (face, self) {
            (AttackFace::Crit, _) | (AttackFace::Surge, SurgeMode::Crit) => Strike::crits(1),
            (AttackFace::Hit, _) | (AttackFace::Surge, SurgeMode::Hit) => Strike::hits(1),
            (AttackFace::Surge, SurgeMode::None) | (AttackFace::Blank, _) => Strike::default(),
        }
    }
}

impl FromStr for SurgeMode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(SurgeMode::None),
            "hit" => Ok(SurgeMode::Hit),
            "crit" => Ok(SurgeMode::Crit),
            _ => Err(ParseError::new("surge mode", s)),
        }
    }
}

/// Face counts of one attack roll before any conversion.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RawRoll {
    pub crit: u32,
    pub surge: u32,
    pub hit: u32,
    pub blank: u32,
}

impl RawRoll {
    #[must_use]
    pub fn with(mut self, face: AttackFace) -> Self {
        match face {
            AttackFace::Crit => self.crit += 1,
            AttackFace::Surge => self.surge += 1,
            AttackFace::Hit => self.hit += 1,
            AttackFace::Blank => self.blank += 1,
        }
        self
    }

    #[must_use]
    pub fn dice(&self) -> u32 {
        self.crit + self.surge + self.hit + self.blank
    }
}

impl Add for RawRoll {
    type Output = RawRoll;

    fn add(self, rhs: Self) -> Self::Output {
        RawRoll {
            crit: self.crit + rhs.crit,
            surge: self.surge + rhs.surge,
            hit: self.hit + rhs.hit,
            blank: self.blank + rhs.blank,
        }
    }
}

/// Successes of one attack.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Strike {
    pub hits: u32,
    pub crits: u32,
}

impl Strike {
    #[must_use]
    pub const fn new(hits: u32, crits: u32) -> Self {
        Self { hits, crits }
    }

    #[must_use]
    pub const fn hits(hits: u32) -> Self {
        Self { hits, crits: 0 }
    }

    #[must_use]
    pub const fn crits(crits: u32) -> Self {
        Self { hits: 0, crits }
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.hits + self.crits
    }
}

impl Add for Strike {
    type Output = Strike;

    fn add(self, rhs: Self) -> Self::Output {
        Strike {
            hits: self.hits + rhs.hits,
            crits: self.crits + rhs.crits,
        }
    }
}

impl ComputableValue for Strike {
    fn compute(&self) -> f64 {
        f64::from(self.total())
    }
}

/// Attacker keywords and tokens. Omitted counters are zero; `critical_x`
/// left unset behaves like `0`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AttackModifiers {
    #[builder(default)]
    pub surge: SurgeMode,
    #[builder(into)]
    pub critical_x: Option<Amount>,
    #[builder(default, into)]
    pub surge_tokens: Amount,
    #[builder(default, into)]
    pub aim_tokens: Amount,
    #[builder(default, into)]
    pub observe_tokens: Amount,
    #[builder(default, into)]
    pub precise_x: Amount,
    #[builder(default, into)]
    pub ram_x: Amount,
}

impl AttackModifiers {
    #[must_use]
    pub fn with_surge(surge: SurgeMode) -> Self {
        Self {
            surge,
            ..Self::default()
        }
    }

    /// Dice that may be rerolled: each aim token rerolls two (plus precise X),
    /// each observe token one.
    #[must_use]
    pub fn reroll_capacity(&self) -> u32 {
        let aim = self.aim_tokens.get();
        let precise = if aim > 0 { self.precise_x.get() } else { 0 };
        aim.saturating_mul(precise.saturating_add(2))
            .saturating_add(self.observe_tokens.get())
    }

    /// Critical X, then surge conversion (surge tokens only in `None` mode).
    #[must_use]
    pub fn resolve(&self, roll: &RawRoll) -> Strike {
        let critical = self.critical_x.unwrap_or_default().get().min(roll.surge);
        let surges = roll.surge - critical;
        let mut strike = Strike::new(roll.hit, roll.crit + critical);
        match self.surge {
            SurgeMode::Crit => strike.crits += surges,
            SurgeMode::Hit => strike.hits += surges,
            SurgeMode::None => strike.hits += self.surge_tokens.get().min(surges),
        }
        strike
    }

    #[must_use]
    pub fn rerolls(&self, roll: &RawRoll) -> u32 {
        self.reroll_capacity().min(roll.blank)
    }

    /// Combines the resolved roll with what its rerolls produced and applies
    /// ram to the blanks that were not rerolled.
    #[must_use]
    pub fn settle(&self, roll: &RawRoll, rerolled: Strike) -> Strike {
        let strike = self.resolve(roll) + rerolled;
        let blanks = roll.blank - self.rerolls(roll);
        ram(strike, blanks, self.ram_x.get())
    }
}

/// Ram X: blanks become crits first, then hits do.
#[must_use]
pub fn ram(strike: Strike, blanks: u32, x: u32) -> Strike {
    let from_blanks = x.min(blanks);
    let from_hits = (x - from_blanks).min(strike.hits);
    Strike {
        hits: strike.hits - from_hits,
        crits: strike.crits + from_blanks + from_hits,
    }
}

#[cfg(test)]
mod tests {
    use num::rational::Ratio;

    use super::*;
    use crate::rng::seeded;

    fn raw(crit: u32, surge: u32, hit: u32, blank: u32) -> RawRoll {
        RawRoll {
            crit,
            surge,
            hit,
            blank,
        }
    }

    #[test]
    fn critical_x_before_surge_mode() {
        let mods = AttackModifiers::builder()
            .critical_x(2)
            .surge(SurgeMode::Hit)
            .build();
        assert_eq!(mods.resolve(&raw(1, 3, 2, 0)), Strike::new(3, 3));

        let none = AttackModifiers::builder().critical_x(5).build();
        assert_eq!(none.resolve(&raw(0, 2, 0, 1)), Strike::crits(2));
    }

    #[test]
    fn surge_tokens_only_without_mode() {
        let tokens = AttackModifiers::builder().surge_tokens(1).build();
        assert_eq!(tokens.resolve(&raw(0, 3, 0, 0)), Strike::hits(1));

        let crit = AttackModifiers::builder()
            .surge(SurgeMode::Crit)
            .surge_tokens(1)
            .build();
        assert_eq!(crit.resolve(&raw(0, 3, 0, 0)), Strike::crits(3));
    }

    #[test]
    fn unset_critical_x_matches_zero() {
        let roll = raw(1, 2, 3, 4);
        let unset = AttackModifiers::default();
        let zero = AttackModifiers::builder().critical_x(0).build();
        assert_eq!(unset.critical_x, None);
        assert_eq!(zero.critical_x, Some(Amount::ZERO));
        assert_eq!(unset.resolve(&roll), zero.resolve(&roll));
    }

    #[test]
    fn reroll_capacity_counts_precise_only_with_aim() {
        let aim = AttackModifiers::builder()
            .aim_tokens(2)
            .precise_x(1)
            .observe_tokens(1)
            .build();
        assert_eq!(aim.reroll_capacity(), 7);

        let no_aim = AttackModifiers::builder()
            .precise_x(3)
            .observe_tokens(2)
            .build();
        assert_eq!(no_aim.reroll_capacity(), 2);

        let negative = AttackModifiers::builder().aim_tokens(-1).precise_x(-4).build();
        assert_eq!(negative.reroll_capacity(), 0);
    }

    #[test]
    fn rerolls_capped_by_blanks() {
        let mods = AttackModifiers::builder().aim_tokens(1).build();
        assert_eq!(mods.rerolls(&raw(0, 0, 0, 1)), 1);
        assert_eq!(mods.rerolls(&raw(0, 0, 0, 5)), 2);
    }

    #[test]
    fn ram_prefers_blanks() {
        assert_eq!(ram(Strike::new(2, 0), 1, 2), Strike::new(1, 2));
        assert_eq!(ram(Strike::new(2, 0), 3, 2), Strike::new(2, 2));
        assert_eq!(ram(Strike::new(1, 1), 0, 5), Strike::new(0, 2));
        assert_eq!(ram(Strike::new(1, 1), 4, 0), Strike::new(1, 1));
    }

    #[test]
    fn settle_rams_only_unrerolled_blanks() {
        let mods = AttackModifiers::builder().observe_tokens(1).ram_x(1).build();
        // one blank rerolled into a hit, the other rammed into a crit
        assert_eq!(mods.settle(&raw(0, 0, 0, 2), Strike::hits(1)), Strike::new(1, 1));
        // the only blank was rerolled into another blank: ram takes the hit
        assert_eq!(mods.settle(&raw(0, 0, 1, 1), Strike::default()), Strike::crits(1));
    }

    #[test]
    fn rerolled_surge_ignores_tokens() {
        assert_eq!(SurgeMode::None.convert(AttackFace::Surge), Strike::default());
        assert_eq!(SurgeMode::Hit.convert(AttackFace::Surge), Strike::hits(1));
        assert_eq!(SurgeMode::Crit.convert(AttackFace::Surge), Strike::crits(1));
        assert_eq!(SurgeMode::Crit.convert(AttackFace::Blank), Strike::default());
    }

    #[test]
    fn reroll_dist_mixes_the_pool() {
        let pool = AttackPool::new(1, 0, 1);
        let d = pool.reroll_dist(SurgeMode::None).unwrap();
        // red 5 hits, white 1 hit, over 16 faces
        assert_eq!(d.probability(&Strike::hits(1)), Ratio::new(6, 16));
        assert_eq!(d.probability(&Strike::crits(1)), Ratio::new(2, 16));
        assert_eq!(d.probability(&Strike::default()), Ratio::new(8, 16));
        assert!(AttackPool::default().reroll_dist(SurgeMode::Hit).is_none());
    }

    #[test]
    fn pool_normalizes_counts() {
        let pool = AttackPool::new(-2, 1.7, 3u8);
        assert_eq!(pool, AttackPool { red: 0, black: 1, white: 3 });
        assert_eq!(pool.total(), 4);
        assert_eq!(pool.dice().collect::<Vec<_>>().len(), 4);
        assert_eq!(AttackPool::of(AttackDie::Red, 2).red, 2);
    }

    #[test]
    fn roll_uses_every_die() {
        let pool = AttackPool::new(3, 2, 1);
        let mut rng = seeded(5);
        for _ in 0..100 {
            assert_eq!(pool.roll(&mut rng).dice(), 6);
        }
        assert_eq!(AttackPool::default().roll(&mut rng), RawRoll::default());
    }

    #[test]
    fn pick_is_uniform_over_dice() {
        let pool = AttackPool::new(1, 0, 3);
        let mut rng = seeded(17);
        let n = 40_000;
        let reds = (0..n)
            .filter(|_| pool.pick(&mut rng) == Some(AttackDie::Red))
            .count();
        let share = reds as f64 / f64::from(n);
        assert!((share - 0.25).abs() < 0.015, "share = {share}");
        assert_eq!(AttackPool::default().pick(&mut rng), None);
    }

    #[test]
    fn parse_surge_mode() {
        assert_eq!("crit".parse::<SurgeMode>(), Ok(SurgeMode::Crit));
        assert_eq!("None".parse::<SurgeMode>(), Ok(SurgeMode::None));
        assert!("block".parse::<SurgeMode>().is_err());
    }
}
