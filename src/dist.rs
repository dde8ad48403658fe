use std::collections::HashMap;
use std::fmt::Debug;
use std::iter::Zip;
use std::slice;

use itertools::Itertools;
use num::rational::Ratio;

use crate::util::{gcd, lcm, Map, Outcome, OverflowError, Result};
use crate::value::{ComputableValue, Value};

pub type Iter<'a, T> = Zip<slice::Iter<'a, T>, slice::Iter<'a, Outcome>>;

/// A discrete distribution stored as integer outcome counts over a common
/// denominator. Values are kept sorted and the counts always sum to `denom`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Dist<T>
where
    T: Value,
{
    denom: Outcome,
    outcomes: Vec<Outcome>,
    values: Vec<T>,
}

impl<T> Dist<T>
where
    T: Value,
{
    #[must_use]
    pub fn scalar(value: T) -> Self {
        Self {
            values: vec![value],
            outcomes: vec![1],
            denom: 1,
        }
    }

    /// Builds a distribution from `(value, weight)` pairs. Duplicate values are
    /// merged and zero weights dropped; the denominator is the weight total.
    #[must_use]
    pub fn weighted<I>(weights: I) -> Self
    where
        I: IntoIterator<Item = (T, Outcome)>,
    {
        let mut map = Map::new();
        let mut denom: Outcome = 0;
        for (value, weight) in weights {
            if weight == 0 {
                continue;
            }
            *map.entry(value).or_default() += weight;
            denom += weight;
        }
        debug_assert!(denom > 0, "weighted distribution needs a positive weight");
        Self::from_map(map, denom)
    }

    #[must_use]
    pub(crate) fn from_map(map: Map<T>, mut denom: Outcome) -> Self {
        let mut values = Vec::with_capacity(map.len());
        let mut outcomes = Vec::with_capacity(map.len());
        let mut acc = denom;
        for (value, outcome) in map {
            acc = gcd(acc, outcome);
            values.push(value);
            outcomes.push(outcome);
        }
        if acc > 1 {
            outcomes.iter_mut().for_each(|x| *x /= acc);
            denom /= acc;
        }
        Self {
            denom,
            outcomes,
            values,
        }
    }

    #[must_use]
    pub fn denom(&self) -> Outcome {
        self.denom
    }

    #[must_use]
    pub fn values(&self) -> &[T] {
        &self.values
    }

    #[must_use]
    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    pub fn iter(&self) -> Iter<'_, T> {
        self.values.iter().zip(self.outcomes.iter())
    }

    #[must_use]
    pub fn probabilities(&self) -> Vec<f64> {
        self.outcomes
            .iter()
            .map(|x| *x as f64 / self.denom as f64)
            .collect_vec()
    }

    /// Exact probability of `value`; zero when it is unreachable.
    #[must_use]
    pub fn probability(&self, value: &T) -> Ratio<Outcome> {
        match self.values.binary_search(value) {
            Ok(i) => Ratio::new(self.outcomes[i], self.denom),
            Err(_) => Ratio::new(0, 1),
        }
    }

    #[must_use]
    pub fn map<O, F>(&self, f: F) -> Dist<O>
    where
        O: Value,
        F: Fn(&T) -> O,
    {
        let mut map = Map::new();

        for (v1, o1) in self.iter() {
            *map.entry(f(v1)).or_default() += o1;
        }

        Dist::from_map(map, self.denom)
    }

    /// Joint distribution of two independent variables, reduced by `f`.
    pub fn apply_two<T2, O, F>(&self, other: &Dist<T2>, f: F) -> Result<Dist<O>>
    where
        T2: Value,
        O: Value,
        F: Fn(&T, &T2) -> O,
    {
        let denom = self.denom.checked_mul(other.denom).ok_or(OverflowError)?;
        let mut map = Map::new();

        for (v1, o1) in self.iter() {
            for (v2, o2) in other.iter() {
                *map.entry(f(v1, v2)).or_default() += o1 * o2;
            }
        }

        Ok(Dist::from_map(map, denom))
    }

    /// Distribution of `n` independent copies folded with `f`; `zero` is the
    /// result for `n == 0`. Uses repeated squaring, so `f` must be associative.
    pub fn repeat<F>(&self, n: u32, zero: T, f: F) -> Result<Self>
    where
        F: Fn(&T, &T) -> T,
    {
        match n {
            0 => return Ok(Self::scalar(zero)),
            1 => return Ok(self.clone()),
            _ => {}
        }

        let mut cache = HashMap::new();
        cache.insert(1, self.clone());

        let mut stack = vec![n];
        while let Some(&x) = stack.last() {
            let m = if x % 2 == 0 { x / 2 } else { x - 1 };
            let next = match cache.get(&m) {
                Some(d) if x % 2 == 0 => d.apply_two(d, &f)?,
                Some(d) => d.apply_two(self, &f)?,
                None => {
                    stack.push(m);
                    continue;
                }
            };
            cache.insert(x, next);
            stack.pop();
        }

        Ok(cache.remove(&n).expect("nth repeat to be calculated"))
    }

    /// Chains a dependent stage: every value selects the distribution of the
    /// next step, and the results are mixed by the value's probability.
    pub fn then<O, F>(&self, mut f: F) -> Result<Dist<O>>
    where
        O: Value,
        F: FnMut(&T) -> Result<Dist<O>>,
    {
        let children = self.values.iter().map(&mut f).collect::<Result<Vec<_>>>()?;
        let common = children
            .iter()
            .try_fold(1 as Outcome, |acc, x| lcm(acc, x.denom))
            .ok_or(OverflowError)?;
        let denom = self.denom.checked_mul(common).ok_or(OverflowError)?;

        let mut map = Map::new();
        for (o1, child) in self.outcomes.iter().zip(&children) {
            let scale = o1 * (common / child.denom);
            for (v2, o2) in child.iter() {
                *map.entry(v2.clone()).or_default() += scale * o2;
            }
        }

        Ok(Dist::from_map(map, denom))
    }
}

impl<T> Dist<T>
where
    T: ComputableValue,
{
    #[must_use]
    pub fn mean(&self) -> f64 {
        self.iter().fold(0.0, |acc, (v, o)| {
            acc + v.compute() * (*o as f64) / (self.denom as f64)
        })
    }
}

impl<T> Debug for Dist<T>
where
    T: Value,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dist")
            .field("denom", &self.denom)
            .field("values", &self.values)
            .field("outcomes", &self.outcomes)
            .finish()
    }
}
