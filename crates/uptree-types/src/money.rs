//! Fixed-point money arithmetic.
//!
//! Balances and amounts are stored as integer **minor units** (paise/cents,
//! scale 2) so that repeated commission splits never accumulate float drift.
//! The external API speaks [`Decimal`] in major units; conversion rounds
//! half-up (midpoint away from zero) to the minor unit.

use std::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::{Result, UptreeError};

/// Minor units per major unit (scale 2).
const MINOR_PER_MAJOR: i64 = 100;

/// A monetary value in integer minor units.
///
/// `Money` is deliberately *not* `Add`/`Sub`: all arithmetic goes through the
/// checked methods so overflow surfaces as an error instead of a wrap.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Construct from raw minor units.
    #[must_use]
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Raw minor units.
    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Convert a major-unit decimal into minor units, rounding half-up.
    ///
    /// # Errors
    /// Returns [`UptreeError::InvalidAmount`] if the value is negative or
    /// does not fit in an `i64` of minor units.
    pub fn from_decimal(value: Decimal) -> Result<Self> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(UptreeError::InvalidAmount { value });
        }
        let minor = (value * Decimal::from(MINOR_PER_MAJOR))
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .ok_or(UptreeError::InvalidAmount { value })?;
        Ok(Self(minor))
    }

    /// Parse a caller-supplied amount: must be strictly positive.
    ///
    /// # Errors
    /// Returns [`UptreeError::InvalidAmount`] for zero, negative, or
    /// unrepresentable values.
    pub fn parse_amount(value: Decimal) -> Result<Self> {
        let money = Self::from_decimal(value)?;
        if money.is_zero() {
            return Err(UptreeError::InvalidAmount { value });
        }
        Ok(money)
    }

    /// Major-unit decimal representation (scale 2).
    #[must_use]
    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Checked addition.
    ///
    /// # Errors
    /// Returns [`UptreeError::BalanceOverflow`] on `i64` overflow.
    pub fn checked_add(self, other: Money) -> Result<Money> {
        self.0
            .checked_add(other.0)
            .map(Money)
            .ok_or(UptreeError::BalanceOverflow)
    }

    /// Checked subtraction. Callers enforce non-negativity *before* calling;
    /// a negative result here is an arithmetic bug, not a business rejection.
    ///
    /// # Errors
    /// Returns [`UptreeError::BalanceOverflow`] on `i64` overflow.
    pub fn checked_sub(self, other: Money) -> Result<Money> {
        self.0
            .checked_sub(other.0)
            .map(Money)
            .ok_or(UptreeError::BalanceOverflow)
    }

    /// Apply a fractional rate (e.g. a 0.02 commission rate), rounding
    /// half-up to the minor unit.
    ///
    /// # Errors
    /// Returns [`UptreeError::BalanceOverflow`] if the product does not fit.
    pub fn apply_rate(self, rate: Decimal) -> Result<Money> {
        let product = Decimal::from(self.0)
            .checked_mul(rate)
            .ok_or(UptreeError::BalanceOverflow)?;
        let minor = product
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .ok_or(UptreeError::BalanceOverflow)?;
        Ok(Money(minor))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn from_decimal_scales_to_minor_units() {
        assert_eq!(Money::from_decimal(dec("123.45")).unwrap().minor(), 12345);
        assert_eq!(Money::from_decimal(dec("0")).unwrap(), Money::ZERO);
    }

    #[test]
    fn from_decimal_rounds_half_up() {
        // 0.005 major = 0.5 minor -> rounds away from zero to 1 minor
        assert_eq!(Money::from_decimal(dec("0.005")).unwrap().minor(), 1);
        assert_eq!(Money::from_decimal(dec("0.004")).unwrap().minor(), 0);
        assert_eq!(Money::from_decimal(dec("1.995")).unwrap().minor(), 200);
    }

    #[test]
    fn from_decimal_rejects_negative() {
        let err = Money::from_decimal(dec("-1")).unwrap_err();
        assert!(matches!(err, UptreeError::InvalidAmount { .. }));
    }

    #[test]
    fn parse_amount_rejects_zero() {
        let err = Money::parse_amount(dec("0")).unwrap_err();
        assert!(matches!(err, UptreeError::InvalidAmount { .. }));
        // Sub-minor-unit positives round to zero and are rejected too.
        let err = Money::parse_amount(dec("0.001")).unwrap_err();
        assert!(matches!(err, UptreeError::InvalidAmount { .. }));
    }

    #[test]
    fn to_decimal_roundtrip() {
        let m = Money::from_minor(12345);
        assert_eq!(m.to_decimal(), dec("123.45"));
        assert_eq!(Money::from_decimal(m.to_decimal()).unwrap(), m);
    }

    #[test]
    fn apply_rate_rounds_half_up() {
        // 2% of 100.00 = 2.00
        let m = Money::from_minor(10_000);
        assert_eq!(m.apply_rate(dec("0.02")).unwrap().minor(), 200);
        // 2% of 0.25 = 0.005 -> rounds to 0.01
        let m = Money::from_minor(25);
        assert_eq!(m.apply_rate(dec("0.02")).unwrap().minor(), 1);
        // 2% of 0.24 = 0.0048 -> rounds to 0.00
        let m = Money::from_minor(24);
        assert_eq!(m.apply_rate(dec("0.02")).unwrap().minor(), 0);
    }

    #[test]
    fn checked_ops_catch_overflow() {
        let max = Money::from_minor(i64::MAX);
        let err = max.checked_add(Money::from_minor(1)).unwrap_err();
        assert!(matches!(err, UptreeError::BalanceOverflow));

        let min = Money::from_minor(i64::MIN);
        let err = min.checked_sub(Money::from_minor(1)).unwrap_err();
        assert!(matches!(err, UptreeError::BalanceOverflow));
    }

    #[test]
    fn display_formats_two_places() {
        assert_eq!(Money::from_minor(12345).to_string(), "123.45");
        assert_eq!(Money::from_minor(5).to_string(), "0.05");
        assert_eq!(Money::ZERO.to_string(), "0.00");
    }
}
