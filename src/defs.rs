use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::attack::SurgeMode;
use crate::defense::DefenseSurge;
use crate::dist::Dist;
use crate::util::{Outcome, ParseError};

pub const ATTACK_SIDES: u32 = 8;
pub const DEFENSE_SIDES: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttackDie {
    Red,
    Black,
    White,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttackFace {
    Crit,
    Surge,
    Hit,
    Blank,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttackFaces {
    pub crit: u32,
    pub surge: u32,
    pub hit: u32,
    pub blank: u32,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefenseDie {
    #[default]
    Red,
    White,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefenseFace {
    Block,
    Surge,
    Blank,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DefenseFaces {
    pub block: u32,
    pub surge: u32,
    pub blank: u32,
}

/// Per-die probabilities once surges are folded into hits, crits or blanks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectiveAttack {
    pub crit: f64,
    pub hit: f64,
    pub blank: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectiveDefense {
    pub block: f64,
    pub blank: f64,
}

const RED_ATTACK: AttackFaces = AttackFaces {
    crit: 1,
    surge: 1,
    hit: 5,
    blank: 1,
};

const BLACK_ATTACK: AttackFaces = AttackFaces {
    crit: 1,
    surge: 1,
    hit: 3,
    blank: 3,
};

const WHITE_ATTACK: AttackFaces = AttackFaces {
    crit: 1,
    surge: 1,
    hit: 1,
    blank: 5,
};

const RED_DEFENSE: DefenseFaces = DefenseFaces {
    block: 3,
    surge: 1,
    blank: 2,
};

const WHITE_DEFENSE: DefenseFaces = DefenseFaces {
    block: 1,
    surge: 1,
    blank: 4,
};

static RED: LazyLock<Dist<AttackFace>> = LazyLock::new(|| RED_ATTACK.dist());
static BLACK: LazyLock<Dist<AttackFace>> = LazyLock::new(|| BLACK_ATTACK.dist());
static WHITE: LazyLock<Dist<AttackFace>> = LazyLock::new(|| WHITE_ATTACK.dist());
static RED_DEF: LazyLock<Dist<DefenseFace>> = LazyLock::new(|| RED_DEFENSE.dist());
static WHITE_DEF: LazyLock<Dist<DefenseFace>> = LazyLock::new(|| WHITE_DEFENSE.dist());

impl AttackFaces {
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.crit + self.surge + self.hit + self.blank
    }

    /// Face showing at `index` in `0..ATTACK_SIDES`, faces laid out
    /// crit, surge, hit, blank.
    #[must_use]
    pub fn face_at(&self, index: u32) -> AttackFace {
        if index < self.crit {
            AttackFace::Crit
        } else if index < self.crit + self.surge {
            AttackFace::Surge
        } else if index < self.crit + self.surge + self.hit {
            AttackFace::Hit
        } else {
            AttackFace::Blank
        }
    }

    #[must_use]
    pub fn count(&self, face: AttackFace) -> u32 {
        match face {
            AttackFace::Crit => self.crit,
            AttackFace::Surge => self.surge,
            AttackFace::Hit => self.hit,
            AttackFace::Blank => self.blank,
        }
    }

    fn dist(&self) -> Dist<AttackFace> {
        Dist::weighted(
            AttackFace::ALL.map(|face| (face, Outcome::from(self.count(face)))),
        )
    }
}

impl AttackFace {
    pub const ALL: [AttackFace; 4] = [
        AttackFace::Crit,
        AttackFace::Surge,
        AttackFace::Hit,
        AttackFace::Blank,
    ];
}

impl AttackDie {
    pub const ALL: [AttackDie; 3] = [AttackDie::Red, AttackDie::Black, AttackDie::White];

    #[must_use]
    pub const fn faces(self) -> AttackFaces {
        match self {
            AttackDie::Red => RED_ATTACK,
            AttackDie::Black => BLACK_ATTACK,
            AttackDie::White => WHITE_ATTACK,
        }
    }

    #[must_use]
    pub fn dist(self) -> Dist<AttackFace> {
        match self {
            AttackDie::Red => RED.clone(),
            AttackDie::Black => BLACK.clone(),
            AttackDie::White => WHITE.clone(),
        }
    }

    pub fn roll<G>(self, rng: &mut G) -> AttackFace
    where
        G: RngCore + ?Sized,
    {
        self.faces().face_at(rng.gen_range(0..ATTACK_SIDES))
    }

    #[must_use]
    pub fn effective(self, surge: SurgeMode) -> EffectiveAttack {
        let faces = self.faces();
        let (mut crit, mut hit, mut blank) = (faces.crit, faces.hit, faces.blank);
        match surge {
            SurgeMode::Crit => crit += faces.surge,
            SurgeMode::Hit => hit += faces.surge,
            SurgeMode::None => blank += faces.surge,
        }
        let sides = f64::from(ATTACK_SIDES);
        EffectiveAttack {
            crit: f64::from(crit) / sides,
            hit: f64::from(hit) / sides,
            blank: f64::from(blank) / sides,
        }
    }
}

impl DefenseFaces {
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.block + self.surge + self.blank
    }

    #[must_use]
    pub fn face_at(&self, index: u32) -> DefenseFace {
        if index < self.block {
            DefenseFace::Block
        } else if index < self.block + self.surge {
            DefenseFace::Surge
        } else {
            DefenseFace::Blank
        }
    }

    #[must_use]
    pub fn count(&self, face: DefenseFace) -> u32 {
        match face {
            DefenseFace::Block => self.block,
            DefenseFace::Surge => self.surge,
            DefenseFace::Blank => self.blank,
        }
    }

    fn dist(&self) -> Dist<DefenseFace> {
        Dist::weighted(
            DefenseFace::ALL.map(|face| (face, Outcome::from(self.count(face)))),
        )
    }
}

impl DefenseFace {
    pub const ALL: [DefenseFace; 3] = [DefenseFace::Block, DefenseFace::Surge, DefenseFace::Blank];
}

impl DefenseDie {
    pub const ALL: [DefenseDie; 2] = [DefenseDie::Red, DefenseDie::White];

    #[must_use]
    pub const fn faces(self) -> DefenseFaces {
        match self {
            DefenseDie::Red => RED_DEFENSE,
            DefenseDie::White => WHITE_DEFENSE,
        }
    }

    #[must_use]
    pub fn dist(self) -> Dist<DefenseFace> {
        match self {
            DefenseDie::Red => RED_DEF.clone(),
            DefenseDie::White => WHITE_DEF.clone(),
        }
    }

    pub fn roll<G>(self, rng: &mut G) -> DefenseFace
    where
        G: RngCore + ?Sized,
    {
        self.faces().face_at(rng.gen_range(0..DEFENSE_SIDES))
    }

    #[must_use]
    pub fn effective(self, surge: DefenseSurge) -> EffectiveDefense {
        let faces = self.faces();
        let (block, blank) = match surge {
            DefenseSurge::Block => (faces.block + faces.surge, faces.blank),
            DefenseSurge::None => (faces.block, faces.blank + faces.surge),
        };
        let sides = f64::from(DEFENSE_SIDES);
        EffectiveDefense {
            block: f64::from(block) / sides,
            blank: f64::from(blank) / sides,
        }
    }
}

impl FromStr for AttackDie {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "red" => Ok(AttackDie::Red),
            "black" => Ok(AttackDie::Black),
            "white" => Ok(AttackDie::White),
            _ => Err(ParseError::new("attack die", s)),
        }
    }
}

impl FromStr for DefenseDie {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "red" => Ok(DefenseDie::Red),
            "white" => Ok(DefenseDie::White),
            _ => Err(ParseError::new("defense die", s)),
        }
    }
}

impl fmt::Display for AttackDie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttackDie::Red => write!(f, "red"),
            AttackDie::Black => write!(f, "black"),
            AttackDie::White => write!(f, "white"),
        }
    }
}

impl fmt::Display for DefenseDie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefenseDie::Red => write!(f, "red"),
            DefenseDie::White => write!(f, "white"),
        }
    }
}
