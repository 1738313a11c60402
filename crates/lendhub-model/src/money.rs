// SPDX-License-Identifier: Apache-2.0

use crate::ids::ParseError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Fallback rate applied when no active interest-rate record matches a term.
pub const DEFAULT_RATE: Decimal = Decimal::from_parts(3, 0, 0, false, 2);

pub const TERM_MAX_MONTHS: u32 = 360;

/// Currency amount, minor-unit-free. Non-negative by construction; internal
/// precision is kept in full and rounded to 2 decimal places only for display.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default, Hash,
)]
#[serde(transparent)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn parse(value: Decimal) -> Result<Self, ParseError> {
        if value.is_sign_negative() {
            return Err(ParseError::Negative("amount"));
        }
        Ok(Self(value))
    }

    #[must_use]
    pub fn value(self) -> Decimal {
        self.0
    }

    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    #[must_use]
    pub fn plus(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }

    /// Subtraction that refuses to go below zero.
    #[must_use]
    pub fn minus(self, other: Self) -> Option<Self> {
        if other.0 > self.0 {
            None
        } else {
            Some(Self(self.0 - other.0))
        }
    }

    /// 2-decimal display form used at every API boundary.
    #[must_use]
    pub fn display_value(self) -> Decimal {
        self.0.round_dp(2)
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_value())
    }
}

/// Interest rate as a decimal fraction (0.0290 = 2.90%). The wire format is
/// always the fraction; percentage forms exist only in UI display code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash)]
#[serde(transparent)]
pub struct Rate(Decimal);

impl Rate {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn parse(value: Decimal) -> Result<Self, ParseError> {
        if value.is_sign_negative() {
            return Err(ParseError::Negative("rate"));
        }
        if value >= Decimal::ONE {
            return Err(ParseError::OutOfRange("rate"));
        }
        Ok(Self(value))
    }

    #[must_use]
    pub fn fallback() -> Self {
        Self(DEFAULT_RATE)
    }

    #[must_use]
    pub fn value(self) -> Decimal {
        self.0
    }
}

impl Display for Rate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Loan duration in months; the lookup key into the interest-rate table.
/// Zero and negative terms are rejected at parse time so the payment division
/// downstream can never see them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash)]
#[serde(transparent)]
pub struct TermMonths(u32);

impl TermMonths {
    pub fn parse(months: i64) -> Result<Self, ParseError> {
        if months <= 0 {
            return Err(ParseError::OutOfRange("term"));
        }
        if months > i64::from(TERM_MAX_MONTHS) {
            return Err(ParseError::OutOfRange("term"));
        }
        Ok(Self(months as u32))
    }

    #[must_use]
    pub fn months(self) -> u32 {
        self.0
    }

    #[must_use]
    pub fn as_decimal(self) -> Decimal {
        Decimal::from(self.0)
    }
}

impl Display for TermMonths {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
