//! Type-safe price representation in integer minor currency units.
//!
//! All catalog prices are whole minor units (cents), so money is an `i64`
//! wrapper rather than a decimal type. Aggregation over a cart uses checked
//! arithmetic; an overflowing total is a programming error surfaced as `None`
//! rather than a silently wrapped amount.

use std::iter::Sum;
use std::ops::Add;

use serde::{Deserialize, Serialize};

/// A monetary amount in minor currency units (e.g. cents).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Price(i64);

impl Price {
    /// A zero amount.
    pub const ZERO: Self = Self(0);

    /// Create a price from minor currency units.
    #[must_use]
    pub const fn from_minor_units(units: i64) -> Self {
        Self(units)
    }

    /// Get the amount in minor currency units.
    #[must_use]
    pub const fn minor_units(&self) -> i64 {
        self.0
    }

    /// Multiply by a quantity, saturating at `i64::MAX`.
    ///
    /// Cart line totals are price times quantity; quantities are small but
    /// a hostile payload must not be able to wrap a total negative.
    #[must_use]
    pub const fn saturating_mul(&self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(quantity as i64))
    }

    /// Format for display in major units (e.g. `19.99`).
    #[must_use]
    pub fn display_major(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        format!("{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_major())
    }
}
