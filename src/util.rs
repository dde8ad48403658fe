use std::collections::BTreeMap;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

pub type Outcome = u128;
pub type Map<K> = BTreeMap<K, Outcome>;
pub type Result<T> = core::result::Result<T, OverflowError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("overflow in probabilities")]
pub struct OverflowError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value:?}")]
pub struct ParseError {
    kind: &'static str,
    value: String,
}

impl ParseError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

/// A modifier count. Every conversion floors fractions and maps negative or
/// non-finite input to zero, so any numeric form a caller holds is accepted.
/// Deserializing follows the same rules and reads `null` as zero.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Amount(u32);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    #[must_use]
    pub fn get(self) -> u32 {
        self.0
    }
}

macro_rules! impl_amount_from_lossless {
    ($typ:ty) => {
        impl From<$typ> for Amount {
            fn from(value: $typ) -> Self {
                Self(u32::from(value))
            }
        }
    };
}

macro_rules! impl_amount_from_int {
    ($typ:ty) => {
        impl From<$typ> for Amount {
            #[allow(unused_comparisons)]
            fn from(value: $typ) -> Self {
                if value <= 0 {
                    return Self::ZERO;
                }
                Self(u32::try_from(value).unwrap_or(u32::MAX))
            }
        }
    };
}

macro_rules! impl_amount_from_float {
    ($typ:ty) => {
        impl From<$typ> for Amount {
            fn from(value: $typ) -> Self {
                if value.is_finite() && value > 0.0 {
                    // `as` saturates at u32::MAX
                    Self(value.floor() as u32)
                } else {
                    Self::ZERO
                }
            }
        }
    };
}

impl_amount_from_lossless!(u8);
impl_amount_from_lossless!(u16);
impl_amount_from_lossless!(u32);
impl_amount_from_int!(u64);
impl_amount_from_int!(u128);
impl_amount_from_int!(usize);
impl_amount_from_int!(i8);
impl_amount_from_int!(i16);
impl_amount_from_int!(i32);
impl_amount_from_int!(i64);
impl_amount_from_int!(i128);
impl_amount_from_int!(isize);
impl_amount_from_float!(f32);
impl_amount_from_float!(f64);

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> core::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct AmountVisitor;

        impl<'de> Visitor<'de> for AmountVisitor {
            type Value = Amount;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a number or null")
            }

            fn visit_i64<E>(self, value: i64) -> core::result::Result<Amount, E>
            where
                E: de::Error,
            {
                Ok(Amount::from(value))
            }

            fn visit_u64<E>(self, value: u64) -> core::result::Result<Amount, E>
            where
                E: de::Error,
            {
                Ok(Amount::from(value))
            }

            fn visit_f64<E>(self, value: f64) -> core::result::Result<Amount, E>
            where
                E: de::Error,
            {
                Ok(Amount::from(value))
            }

            fn visit_unit<E>(self) -> core::result::Result<Amount, E>
            where
                E: de::Error,
            {
                Ok(Amount::ZERO)
            }

            fn visit_none<E>(self) -> core::result::Result<Amount, E>
            where
                E: de::Error,
            {
                Ok(Amount::ZERO)
            }

            fn visit_some<D>(self, deserializer: D) -> core::result::Result<Amount, D::Error>
            where
                D: Deserializer<'de>,
            {
                Amount::deserialize(deserializer)
            }
        }

        deserializer.deserialize_any(AmountVisitor)
    }
}

/// Reads a dice count through [`Amount`], for plain `u32` fields.
pub(crate) fn deserialize_count<'de, D>(
    deserializer: D,
) -> core::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Amount::deserialize(deserializer).map(Amount::get)
}

#[inline]
pub(crate) fn gcd(mut m: Outcome, mut n: Outcome) -> Outcome {
    // Stein's algorithm
    if m == 0 || n == 0 {
        return m | n;
    }

    let shift = (m | n).trailing_zeros();

    m >>= m.trailing_zeros();
    n >>= n.trailing_zeros();

    while m != n {
        if m > n {
            m -= n;
            m >>= m.trailing_zeros();
        } else {
            n -= m;
            n >>= n.trailing_zeros();
        }
    }
    m << shift
}

#[inline]
pub(crate) fn lcm(m: Outcome, n: Outcome) -> Option<Outcome> {
    if m == 0 || n == 0 {
        return Some(0);
    }
    (m / gcd(m, n)).checked_mul(n)
}
