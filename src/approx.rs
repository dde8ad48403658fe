use bon::Builder;
use rand::RngCore;
use tracing::trace;

use crate::dist::Dist;
use crate::rng::{seeded, SeededRng};
use crate::util::{Map, Outcome};
use crate::value::Value;
use crate::{DEFAULT_RUNS, DEFAULT_SEED};

/// Monte Carlo evaluator: runs a trial `runs` times against one RNG stream and
/// turns the observed frequencies into a [`Dist`] over `runs`.
#[derive(Debug, Builder)]
pub struct Approx<G = SeededRng>
where
    G: RngCore,
{
    #[builder(finish_fn)]
    rng: G,
    #[builder(default = DEFAULT_RUNS)]
    runs: u32,
}

impl Default for Approx<SeededRng> {
    fn default() -> Self {
        Self::builder().build(seeded(DEFAULT_SEED))
    }
}

impl<G> Approx<G>
where
    G: RngCore,
{
    #[must_use]
    pub fn runs(&self) -> u32 {
        self.runs.max(1)
    }

    #[must_use]
    pub fn eval<T, F>(&mut self, mut op: F) -> Dist<T>
    where
        T: Value,
        F: FnMut(&mut G) -> T,
    {
        let runs = self.runs();
        let mut map = Map::new();

        for _ in 0..runs {
            *map.entry(op(&mut self.rng)).or_default() += 1;
        }

        trace!(runs, outcomes = map.len(), "simulation batch complete");
        Dist::from_map(map, Outcome::from(runs))
    }
}
