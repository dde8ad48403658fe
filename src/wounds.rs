use std::str::FromStr;

use bon::Builder;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::attack::Strike;
use crate::defense::{resolve_blocks, DefenseRoll, DefenseSurge};
use crate::defs::{DefenseDie, DefenseFace};
use crate::util::{Amount, ParseError};

/// Die rolled for every hit against a unit in cover.
pub const COVER_DIE: DefenseDie = DefenseDie::White;

/// Cover X never improves cover by more than this many steps.
pub const MAX_COVER_X: u32 = 2;

#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Cover {
    #[default]
    None,
    Light,
    Heavy,
}

impl Cover {
    const fn level(self) -> u32 {
        match self {
            Cover::None => 0,
            Cover::Light => 1,
            Cover::Heavy => 2,
        }
    }

    const fn from_level(level: u32) -> Self {
        match level {
            0 => Cover::None,
            1 => Cover::Light,
            _ => Cover::Heavy,
        }
    }

    #[must_use]
    pub const fn improve(self, steps: u32) -> Self {
        Self::from_level(self.level().saturating_add(steps))
    }

    #[must_use]
    pub const fn reduce(self, steps: u32) -> Self {
        Self::from_level(self.level().saturating_sub(steps))
    }

    /// Whether a cover die showing `face` cancels a hit.
    #[must_use]
    pub fn cancels(self, face: DefenseFace) -> bool {
        match (self, face) {
            (Cover::None, _) | (_, DefenseFace::Blank) => false,
            (Cover::Light, DefenseFace::Surge) => false,
            (_, DefenseFace::Block) | (Cover::Heavy, DefenseFace::Surge) => true,
        }
    }

    /// Faces of [`COVER_DIE`] that cancel a hit.
    #[must_use]
    pub fn cancel_faces(self) -> u32 {
        let faces = COVER_DIE.faces();
        DefenseFace::ALL
            .into_iter()
            .filter(|face| self.cancels(*face))
            .map(|face| faces.count(face))
            .sum()
    }
}

impl FromStr for Cover {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Cover::None),
            "light" => Ok(Cover::Light),
            "heavy" => Ok(Cover::Heavy),
            _ => Err(ParseError::new("cover", s)),
        }
    }
}

/// Suppression and cover X improve cover (up to heavy), then sharpshooter X
/// strips it back down.
#[must_use]
pub fn effective_cover(
    cover: Cover,
    suppressed: bool,
    cover_x: Amount,
    sharpshooter_x: Amount,
) -> Cover {
    let steps = u32::from(suppressed) + cover_x.get().min(MAX_COVER_X);
    cover.improve(steps).reduce(sharpshooter_x.get())
}

/// Defender dice, keywords and tokens.
#[derive(Debug, Default, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DefenseModifiers {
    #[builder(default)]
    pub die: DefenseDie,
    #[builder(default)]
    pub surge: DefenseSurge,
    #[builder(default, into)]
    pub surge_tokens: Amount,
    #[builder(default, into)]
    pub dodge_tokens: Amount,
    #[builder(default)]
    pub outmaneuver: bool,
    #[builder(default, into)]
    pub shield_tokens: Amount,
    #[builder(default)]
    pub cover: Cover,
    #[builder(default)]
    pub low_profile: bool,
    #[builder(default)]
    pub suppressed: bool,
    #[builder(default, into)]
    pub cover_x: Amount,
    #[builder(default, into)]
    pub sharpshooter_x: Amount,
    #[builder(default)]
    pub backup: bool,
    #[builder(default, into)]
    pub armor_x: Amount,
    #[builder(default, into)]
    pub impact_x: Amount,
    #[builder(default, into)]
    pub pierce_x: Amount,
    #[builder(default)]
    pub impervious: bool,
    #[builder(default, into)]
    pub suppression_tokens: Amount,
    #[builder(default, into)]
    pub danger_sense_x: Amount,
}

impl DefenseModifiers {
    #[must_use]
    pub fn cover(&self) -> Cover {
        effective_cover(self.cover, self.suppressed, self.cover_x, self.sharpshooter_x)
    }

    /// Low profile drops one hit before the cover roll whenever the unit has
    /// any base cover.
    #[must_use]
    pub fn screen(&self, strike: Strike) -> Strike {
        if self.low_profile && self.cover != Cover::None {
            Strike::new(strike.hits.saturating_sub(1), strike.crits)
        } else {
            strike
        }
    }

    /// Number of cover dice rolled against `strike`; zero when cover does
    /// not apply.
    #[must_use]
    pub fn cover_dice(&self, strike: Strike) -> u32 {
        if self.cover() == Cover::None {
            0
        } else {
            strike.hits
        }
    }

    pub fn take_cover<G>(&self, strike: Strike, rng: &mut G) -> Strike
    where
        G: RngCore + ?Sized,
    {
        let cover = self.cover();
        let cancelled = (0..self.cover_dice(strike))
            .filter(|_| cover.cancels(COVER_DIE.roll(rng)))
            .count() as u32;
        Strike::new(strike.hits - cancelled, strike.crits)
    }

    /// Armor, backup and shields. Shields cancel crits first and spend what
    /// is left on hits.
    #[must_use]
    pub fn mitigate(&self, covered: Strike) -> Strike {
        let armor = self.armor_x.get().saturating_sub(self.impact_x.get());
        let mut hits = covered.hits.saturating_sub(armor);
        if self.backup {
            hits = hits.saturating_sub(2);
        }
        let shields = self.shield_tokens.get();
        Strike {
            hits: hits.saturating_sub(shields.saturating_sub(covered.crits)),
            crits: covered.crits.saturating_sub(shields),
        }
    }

    /// Dice the defender must roll for the attack itself. Outmaneuver lets
    /// dodge cancel crits too.
    #[must_use]
    pub fn defense_dice(&self, covered: Strike) -> u32 {
        let Strike { hits, crits } = self.mitigate(covered);
        let dodge = self.dodge_tokens.get();
        if self.outmaneuver {
            (hits + crits).saturating_sub(dodge)
        } else {
            crits + hits.saturating_sub(dodge)
        }
    }

    /// Bonus dice from impervious and danger sense. They can block but never
    /// add wounds.
    #[must_use]
    pub fn extra_dice(&self) -> u32 {
        let impervious = if self.impervious {
            self.pierce_x.get()
        } else {
            0
        };
        let danger = self
            .suppression_tokens
            .get()
            .min(self.danger_sense_x.get());
        impervious.saturating_add(danger)
    }

    /// Wounds from `dice` defense dice once the roll (including extra dice)
    /// has been resolved and pierced.
    #[must_use]
    pub fn wounds(&self, dice: u32, roll: &DefenseRoll) -> u32 {
        let blocks = resolve_blocks(roll, self.surge, self.surge_tokens);
        let blocks = blocks.saturating_sub(self.pierce_x.get());
        dice.saturating_sub(blocks)
    }
}
