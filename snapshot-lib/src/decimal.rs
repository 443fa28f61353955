//! Fixed-point decimals with 18 fractional digits.
//!
//! Amounts coming from the chain carry 18 fractional digits and every product or
//! quotient is truncated back to that precision, so that totals computed here
//! can be compared digit by digit with ledgers produced by the chain tooling.
//! Values are stored as a 256-bit count of 10^-18 units, so the full precision
//! is kept whatever the magnitude of the amounts.

use crate::Error;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[allow(clippy::all)]
mod uints {
    uint::construct_uint! {
        pub struct U256(4);
    }
}

pub use uints::U256;

/// Number of fractional digits kept after every multiplication or division.
pub const PRECISION: usize = 18;

const FRACTIONAL: u64 = 1_000_000_000_000_000_000;

/// Non negative fixed-point number with [`PRECISION`] fractional digits.
///
/// Arithmetic is checked and truncates toward zero.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Decimal(U256);

impl Decimal {
    pub const ZERO: Decimal = Decimal(U256([0, 0, 0, 0]));
    pub const ONE: Decimal = Decimal(U256([FRACTIONAL, 0, 0, 0]));

    /// `n` hundredths, `percent(103)` is 1.03.
    pub const fn percent(n: u64) -> Self {
        Decimal(U256([n * (FRACTIONAL / 100), 0, 0, 0]))
    }

    /// Builds a value out of its number of 10^-18 units.
    pub fn from_atomics(atomics: u128) -> Self {
        Decimal(U256::from(atomics))
    }

    pub fn from_integer(value: u128) -> Self {
        // u128::MAX * 10^18 is well below 2^256
        Decimal(U256::from(value) * U256::from(FRACTIONAL))
    }

    pub fn atomics(&self) -> U256 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn checked_add(self, rhs: Self) -> Result<Self, Error> {
        self.0.checked_add(rhs.0).map(Decimal).ok_or(Error::Overflow)
    }

    pub fn checked_sub(self, rhs: Self) -> Result<Self, Error> {
        self.0.checked_sub(rhs.0).map(Decimal).ok_or(Error::Overflow)
    }

    /// Product truncated to [`PRECISION`] digits.
    pub fn checked_mul(self, rhs: Self) -> Result<Self, Error> {
        self.0
            .checked_mul(rhs.0)
            .map(|product| Decimal(product / U256::from(FRACTIONAL)))
            .ok_or(Error::Overflow)
    }

    /// Quotient truncated to [`PRECISION`] digits.
    pub fn checked_div(self, rhs: Self) -> Result<Self, Error> {
        if rhs.is_zero() {
            return Err(Error::DivisionByZero);
        }
        self.0
            .checked_mul(U256::from(FRACTIONAL))
            .map(|scaled| Decimal(scaled / rhs.0))
            .ok_or(Error::Overflow)
    }

    pub fn abs_diff(self, other: Self) -> Self {
        if self > other {
            Decimal(self.0 - other.0)
        } else {
            Decimal(other.0 - self.0)
        }
    }

    pub fn floor(self) -> Self {
        Decimal(self.0 - self.0 % U256::from(FRACTIONAL))
    }

    /// Integer part, `None` if it does not fit into a `u128`.
    pub fn to_uint_floor(self) -> Option<u128> {
        let integer = self.0 / U256::from(FRACTIONAL);
        (integer.bits() <= 128).then(|| integer.low_u128())
    }
}

/// Adds up `terms`, failing on overflow.
pub fn sum<I: IntoIterator<Item = Decimal>>(terms: I) -> Result<Decimal, Error> {
    terms
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, term| acc.checked_add(term))
}

/// Multiplies all `factors` left to right, truncating after each step.
pub fn product<I: IntoIterator<Item = Decimal>>(factors: I) -> Result<Decimal, Error> {
    let mut factors = factors.into_iter();
    match factors.next() {
        Some(first) => factors.try_fold(first, |acc, factor| acc.checked_mul(factor)),
        None => Ok(Decimal::ONE),
    }
}

/// Prints every significant fractional digit, or exactly as many as the
/// formatter precision asks for (truncated, not rounded).
impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let integer = self.0 / U256::from(FRACTIONAL);
        let fraction = format!(
            "{:0width$}",
            (self.0 % U256::from(FRACTIONAL)).low_u64(),
            width = PRECISION
        );
        let fraction = match f.precision() {
            Some(precision) if precision <= PRECISION => fraction[..precision].to_string(),
            Some(precision) => format!("{:0<width$}", fraction, width = precision),
            None => fraction.trim_end_matches('0').to_string(),
        };
        if fraction.is_empty() {
            write!(f, "{}", integer)
        } else {
            write!(f, "{}.{}", integer, fraction)
        }
    }
}

impl fmt::Debug for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Decimal({})", self)
    }
}

/// Parses `123`, `123.45` and the like. Digits past the 18th fractional one are
/// dropped.
impl FromStr for Decimal {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidDecimal(input.to_string());
        let (integer, fraction) = match input.split_once('.') {
            Some((_, "")) => return Err(invalid()),
            Some((integer, fraction)) => (integer, fraction),
            None => (input, ""),
        };
        let is_number = |digits: &str| digits.bytes().all(|b| b.is_ascii_digit());
        if integer.is_empty() || !is_number(integer) || !is_number(fraction) {
            return Err(invalid());
        }

        let integer = U256::from_dec_str(integer).map_err(|_| invalid())?;
        let fraction = &fraction[..fraction.len().min(PRECISION)];
        let fraction: u64 = format!("{:0<width$}", fraction, width = PRECISION)
            .parse()
            .map_err(|_| invalid())?;

        integer
            .checked_mul(U256::from(FRACTIONAL))
            .and_then(|atomics| atomics.checked_add(U256::from(fraction)))
            .map(Decimal)
            .ok_or_else(invalid)
    }
}

impl Serialize for Decimal {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

mod deser {
    use super::Decimal;
    use serde::de::{self, Visitor};
    use std::fmt;

    pub(super) struct DecimalVisitor;

    impl<'de> Visitor<'de> for DecimalVisitor {
        type Value = Decimal;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a non negative decimal string or an unsigned integer")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            v.parse().map_err(E::custom)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Decimal::from_integer(u128::from(v)))
        }
    }
}

impl<'de> Deserialize<'de> for Decimal {
    fn deserialize<D>(deserializer: D) -> Result<Decimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(deser::DecimalVisitor)
    }
}

/// Decimal literal, for tests: `dec!(1.03)`.
#[cfg(any(test, feature = "test-api"))]
#[macro_export]
macro_rules! dec {
    ($value:literal) => {
        <$crate::decimal::Decimal as ::std::str::FromStr>::from_str(stringify!($value))
            .expect("valid decimal literal")
    };
}

#[cfg(any(test, feature = "proptest"))]
mod arbitrary {
    use super::*;
    use proptest::prelude::*;

    impl Arbitrary for Decimal {
        type Parameters = ();
        type Strategy = BoxedStrategy<Decimal>;

        // up to 10^12 with all 18 fractional digits
        fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
            (0..10u128.pow(30)).prop_map(Decimal::from_atomics).boxed()
        }
    }
}
