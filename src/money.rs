//! Fixed-point currency type with 2 decimal places precision.
//!
//! Uses `rust_decimal` internally with scale enforcement so balances and
//! amounts never pick up floating-point drift. Also knows how to render
//! itself into the 8-character `00000.00` field shared by the accounts file
//! and the ATF.

use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::str::FromStr;
use thiserror::Error;

/// Width of a rendered money field (`00000.00`).
pub const FIELD_WIDTH: usize = 8;

/// Errors produced when parsing a monetary amount from text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseMoneyError {
    /// Text is not a decimal number.
    #[error("'{0}' is not a number")]
    NotANumber(String),

    /// More than two fractional digits were given.
    #[error("'{0}' has more than two decimal places")]
    TooPrecise(String),
}

/// A currency amount that maintains exactly 2 decimal places.
///
/// # Examples
///
/// ```
/// use std::str::FromStr;
/// use atm_frontend::Money;
///
/// let amount = Money::from_str("10.5").unwrap();
/// assert_eq!(amount.to_string(), "10.50");
/// assert_eq!(amount.to_field(), "00010.50");
/// ```
///
/// Serializes as a decimal string. The scale is held at 2 by every
/// constructor and operator, so the string always carries two places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Money(#[serde(with = "rust_decimal::serde::str")] Decimal);

impl Money {
    /// The number of decimal places to maintain.
    pub const SCALE: u32 = 2;

    /// Zero value.
    pub const ZERO: Self = Money(Decimal::from_parts(0, 0, 0, false, Self::SCALE));

    /// Largest amount, in cents, that fits the 8-character field.
    const MAX_CENTS: i64 = 9_999_999;

    /// Creates a new `Money` from a `Decimal`, normalizing to 2 decimal places.
    pub fn new(value: Decimal) -> Self {
        let mut normalized = value;
        normalized.rescale(Self::SCALE);
        Money(normalized)
    }

    /// Creates an amount from a whole number of cents.
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, Self::SCALE))
    }

    /// Creates an amount from whole currency units.
    pub fn from_units(units: i64) -> Self {
        Self::from_cents(units * 100)
    }

    /// The largest representable field value, `99999.99`.
    pub fn max() -> Self {
        Self::from_cents(Self::MAX_CENTS)
    }

    /// Returns `true` if this value is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns `true` if this value is strictly below zero.
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Returns `true` if the value fits the `00000.00` field.
    pub fn fits_field(&self) -> bool {
        !self.is_negative() && *self <= Self::max()
    }

    /// Renders the value as a zero-padded `00000.00` field.
    ///
    /// Only meaningful for values where [`Money::fits_field`] holds; callers
    /// validate that before encoding.
    pub fn to_field(&self) -> String {
        format!("{:0>width$}", format!("{:.2}", self.0), width = FIELD_WIDTH)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::ZERO
    }
}

impl FromStr for Money {
    type Err = ParseMoneyError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        let decimal = Decimal::from_str(trimmed)
            .map_err(|_| ParseMoneyError::NotANumber(trimmed.to_string()))?;
        if decimal.normalize().scale() > Self::SCALE {
            return Err(ParseMoneyError::TooPrecise(trimmed.to_string()));
        }
        Ok(Money::new(decimal))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Money::new(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
        self.0.rescale(Self::SCALE);
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Money::new(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
        self.0.rescale(Self::SCALE);
    }
}
