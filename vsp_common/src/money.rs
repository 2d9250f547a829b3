use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Mul, Neg, Sub, SubAssign},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

//--------------------------------------       Money        ----------------------------------------------------------
/// A monetary amount in integer cents. All order totals, catalog prices and gateway amounts are expressed in this
/// type so that no floating point arithmetic ever touches a price.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct Money(i64);

op!(binary Money, Add, add);
op!(binary Money, Sub, sub);
op!(inplace Money, SubAssign, sub_assign);
op!(unary Money, Neg, neg);

impl Mul<i64> for Money {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self::from(self.value() * rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented as a monetary amount: {0}")]
pub struct MoneyConversionError(String);

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl PartialEq for Money {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Money {}

impl TryFrom<u64> for Money {
    type Error = MoneyConversionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value > i64::MAX as u64 {
            Err(MoneyConversionError(format!("Value {value} is too large to convert to Money")))
        } else {
            #[allow(clippy::cast_possible_wrap)]
            Ok(Self(value as i64))
        }
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "${}", self.to_decimal_string())
    }
}

impl FromStr for Money {
    type Err = MoneyConversionError;

    /// Parses a decimal string such as `"123.45"` (at most two fractional digits) into cents.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (sign, s) = match s.strip_prefix('-') {
            Some(rest) => (-1, rest),
            None => (1, s),
        };
        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };
        if frac.len() > 2 {
            return Err(MoneyConversionError(format!("Too many decimal places in {s}")));
        }
        let whole = whole.parse::<i64>().map_err(|e| MoneyConversionError(e.to_string()))?;
        let frac = if frac.is_empty() {
            0
        } else {
            let f = frac.parse::<i64>().map_err(|e| MoneyConversionError(e.to_string()))?;
            if frac.len() == 1 {
                f * 10
            } else {
                f
            }
        };
        Ok(Self(sign * (whole * 100 + frac)))
    }
}

impl Money {
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// The wire format expected by the gateway, e.g. `2550` cents → `"25.50"`.
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.abs();
        format!("{sign}{}.{:02}", abs / 100, abs % 100)
    }
}
