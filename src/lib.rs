mod approx;
pub mod attack;
pub mod calc;
pub mod defense;
pub mod defs;
mod dist;
pub mod exact;
pub mod prelude;
pub mod report;
pub mod results;
pub mod rng;
pub mod simulate;
mod util;
mod value;
pub mod wounds;

pub use approx::Approx;
pub use calc::{
    compute_attack_distribution, compute_defense_distribution, compute_wounds_distribution,
    Calculator, Strategy,
};
pub use dist::{Dist, Iter};
pub use util::{Amount, Outcome, OverflowError, ParseError};
pub use value::{ComputableValue, Value};

pub const DEFAULT_RUNS: u32 = 10_000;
pub const DEFAULT_SEED: u64 = 0x5eed_1e61;
