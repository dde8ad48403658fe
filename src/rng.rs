//! Seeded random source. The same seed always yields the same stream, which is
//! what lets the calculator behave as a pure function of its inputs.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub type SeededRng = ChaCha8Rng;

#[must_use]
pub fn seeded(seed: u64) -> SeededRng {
    SeededRng::seed_from_u64(seed)
}

/// Next value in `[0, 1)`.
pub fn unit<G>(rng: &mut G) -> f64
where
    G: Rng + ?Sized,
{
    rng.gen::<f64>()
}
