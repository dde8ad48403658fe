use std::fmt::Debug;

pub trait Value: Sized + Send + Sync + Debug + Clone + PartialEq + Eq + PartialOrd + Ord {}

impl<T> Value for T where T: Sized + Send + Sync + Debug + Clone + PartialEq + Eq + Ord {}

/// A value with a numeric reading, used for expectations.
pub trait ComputableValue: Value {
    fn compute(&self) -> f64;
}

impl ComputableValue for u32 {
    fn compute(&self) -> f64 {
        f64::from(*self)
    }
}
