//! # Quantity Module
//!
//! Ingredient quantities as exact decimals, held to three places.
//!
//! ## Why Decimal?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Inventory: flour 1.0 kg        Recipe: 0.2 kg per Margherita          │
//! │                                                                         │
//! │  f64:     1.0 - 0.2 × 3 = 0.3999999999999999   ← boundary check lies   │
//! │  Decimal: 1.000 - 0.200 × 3 = 0.400            ← exact                 │
//! │                                                                         │
//! │  "available == required succeeds" only holds with exact arithmetic     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The value is signed so the same type carries negative ledger deltas
//! (a restock is a negative consumption). SQLite stores it as integer
//! thousandths (`*_milli` columns); every `Quantity` fits that column.

use std::fmt;
use std::ops::Neg;

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Decimal places kept on every quantity.
pub const DECIMAL_PLACES: u32 = 3;

// =============================================================================
// Quantity Type
// =============================================================================

/// An amount of an ingredient in its own unit (kg, litre, pcs, ...).
///
/// On the wire a quantity is a JSON number (`0.2`); it is rounded half away
/// from zero to the nearest thousandth on the way in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Quantity(Decimal);

impl Quantity {
    /// Rounds to three places and checks the result fits a `*_milli` column.
    fn bounded(value: Decimal) -> Option<Self> {
        let rounded =
            value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);
        rounded
            .checked_mul(Decimal::ONE_THOUSAND)?
            .to_i64()
            .map(|_| Quantity(rounded))
    }

    /// From a stored `*_milli` column value.
    #[inline]
    pub fn from_milli(milli: i64) -> Self {
        Quantity(Decimal::new(milli, DECIMAL_PLACES))
    }

    /// The `*_milli` column value.
    pub fn milli(&self) -> i64 {
        let mut scaled = self.0;
        scaled.rescale(DECIMAL_PLACES);
        // Fits by construction, see `bounded`
        scaled.mantissa() as i64
    }

    #[inline]
    pub const fn zero() -> Self {
        Quantity(Decimal::ZERO)
    }

    #[inline]
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// `None` when the sum leaves the storable range.
    pub fn checked_add(self, other: Quantity) -> Option<Self> {
        self.0.checked_add(other.0).and_then(Quantity::bounded)
    }

    /// Per-serving amount × servings. `None` when the product leaves the
    /// storable range.
    pub fn checked_mul(self, servings: i64) -> Option<Self> {
        self.0
            .checked_mul(Decimal::from(servings))
            .and_then(Quantity::bounded)
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl TryFrom<Decimal> for Quantity {
    type Error = ValidationError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Quantity::bounded(value).ok_or_else(|| ValidationError::TooLarge {
            field: "quantity".to_string(),
        })
    }
}

impl From<Quantity> for Decimal {
    fn from(q: Quantity) -> Decimal {
        q.0
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shortest decimal form: `0.6`, `5`, `-1.25`.
impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.normalize(), f)
    }
}

impl Neg for Quantity {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Quantity(-self.0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
