use std::ops::Add;
use std::str::FromStr;

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::defs::{DefenseDie, DefenseFace};
use crate::util::{deserialize_count, Amount, ParseError};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct DefensePool {
    #[serde(deserialize_with = "deserialize_count")]
    pub red: u32,
    #[serde(deserialize_with = "deserialize_count")]
    pub white: u32,
}

impl DefensePool {
    #[must_use]
    pub fn new(red: impl Into<Amount>, white: impl Into<Amount>) -> Self {
        Self {
            red: red.into().get(),
            white: white.into().get(),
        }
    }

    /// `n` dice of a single color.
    #[must_use]
    pub fn of(die: DefenseDie, n: impl Into<Amount>) -> Self {
        let n = n.into().get();
        match die {
            DefenseDie::Red => Self { red: n, white: 0 },
            DefenseDie::White => Self { red: 0, white: n },
        }
    }

    #[must_use]
    pub fn count(&self, die: DefenseDie) -> u32 {
        match die {
            DefenseDie::Red => self.red,
            DefenseDie::White => self.white,
        }
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.red.saturating_add(self.white)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn roll<G>(&self, rng: &mut G) -> DefenseRoll
    where
        G: RngCore + ?Sized,
    {
        let mut roll = DefenseRoll::default();
        for die in DefenseDie::ALL {
            for _ in 0..self.count(die) {
                roll = roll.with(die.roll(rng));
            }
        }
        roll
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefenseSurge {
    #[default]
    None,
    Block,
}

impl FromStr for DefenseSurge {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(DefenseSurge::None),
            "block" => Ok(DefenseSurge::Block),
            _ => Err(ParseError::new("defense surge", s)),
        }
    }
}

/// Block and surge faces of one defense roll; blanks are not tracked.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DefenseRoll {
    pub blocks: u32,
    pub surges: u32,
}

impl DefenseRoll {
    #[must_use]
    pub fn with(mut self, face: DefenseFace) -> Self {
        match face {
            DefenseFace::Block => self.blocks += 1,
            DefenseFace::Surge => self.surges += 1,
            DefenseFace::Blank => {}
        }
        self
    }
}

impl Add for DefenseRoll {
    type Output = DefenseRoll;

    fn add(self, rhs: Self) -> Self::Output {
        DefenseRoll {
            blocks: self.blocks + rhs.blocks,
            surges: self.surges + rhs.surges,
        }
    }
}

/// Blocks after surges: all of them with `Block`, otherwise as many as there
/// are surge tokens.
#[must_use]
pub fn resolve_blocks(roll: &DefenseRoll, surge: DefenseSurge, tokens: Amount) -> u32 {
    match surge {
        DefenseSurge::Block => roll.blocks + roll.surges,
        DefenseSurge::None => roll.blocks + tokens.get().min(roll.surges),
    }
}
