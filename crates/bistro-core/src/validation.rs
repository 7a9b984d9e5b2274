//! # Validation Module
//!
//! Field-level validators shared by the request types and the catalog.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Request shape (requests.rs)                                  │
//! │  ├── Missing fields, empty item lists                                  │
//! │  └── THIS MODULE: per-field rules                                      │
//! │           │                                                             │
//! │           ▼   (before any transaction is opened)                       │
//! │  Layer 2: Workflow (bistro-db)                                         │
//! │  ├── Table lookup, name resolution, stock checks                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (quantity_milli >= 0), CHECK (stock >= 0)                   │
//! │  ├── UNIQUE names and table numbers                                    │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{NaiveDate, NaiveTime};

use crate::error::ValidationError;
use crate::quantity::Quantity;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted name (menu item, ingredient, customer).
pub const MAX_NAME_LEN: usize = 200;

/// Highest accepted menu price (1,000,000.00).
pub const MAX_PRICE_CENTS: i64 = 100_000_000;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a display name and returns it trimmed.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most [`MAX_NAME_LEN`] characters
///
/// ## Example
/// ```rust
/// use bistro_core::validation::validate_name;
///
/// assert_eq!(validate_name("customer_name", "  Ada ").unwrap(), "Ada");
/// assert!(validate_name("customer_name", "   ").is_err());
/// ```
pub fn validate_name(field: &str, value: &str) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::required(field));
    }

    if value.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(value.to_string())
}

/// Validates a name used to look a catalog entry up.
///
/// Unlike [`validate_name`] the value is not trimmed: lookups are exact, so
/// `" Margherita "` must reach the resolver as sent and fail there.
pub fn validate_lookup_name(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::required(field));
    }

    if value.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a free-text status label.
pub fn validate_status_label(label: &str) -> ValidationResult<()> {
    validate_name("status", label).map(|_| ())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line-item quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed `max`
///
/// ## User Workflow
/// ```text
/// Request: { name: "Margherita", quantity: 3 }
///      │
///      ▼
/// validate_quantity(3, 999) ← THIS FUNCTION
///      │
///      ├── qty <= 0?  → "quantity must be positive"
///      ├── qty > max? → "quantity must be between 1 and 999"
///      └── OK → name resolution
/// ```
pub fn validate_quantity(qty: i64, max: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > max {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max,
        });
    }

    Ok(())
}

/// Validates a price in cents: `0..=MAX_PRICE_CENTS`.
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if !(0..=MAX_PRICE_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: MAX_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Validates a dish stock count. Zero is allowed.
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a table number or seat count.
pub fn validate_positive(field: &str, value: i64) -> ValidationResult<()> {
    if value <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates an inventory quantity or threshold (`>= 0`).
pub fn validate_non_negative_quantity(field: &str, value: Quantity) -> ValidationResult<()> {
    if value.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a per-serving recipe amount (`> 0`).
pub fn validate_per_serving(value: Quantity) -> ValidationResult<()> {
    if !value.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "perServing".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Reservation Validators
// =============================================================================

/// Parses a reservation date in strict `YYYY-MM-DD` form.
///
/// ## Example
/// ```rust
/// use bistro_core::validation::validate_date;
///
/// assert!(validate_date("2025-03-14").is_ok());
/// assert!(validate_date("14/03/2025").is_err());
/// assert!(validate_date("2025-3-14").is_err());
/// ```
pub fn validate_date(value: &str) -> ValidationResult<NaiveDate> {
    let invalid = || ValidationError::InvalidFormat {
        field: "date".to_string(),
        reason: "must be YYYY-MM-DD".to_string(),
    };
    if value.len() != 10 {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| invalid())
}

/// Parses a reservation time in strict 24-hour `HH:MM` form.
pub fn validate_time(value: &str) -> ValidationResult<NaiveTime> {
    let invalid = || ValidationError::InvalidFormat {
        field: "time".to_string(),
        reason: "must be HH:MM (24-hour)".to_string(),
    };
    if value.len() != 5 {
        return Err(invalid());
    }
    NaiveTime::parse_from_str(value, "%H:%M").map_err(|_| invalid())
}

// =============================================================================
// Unit Tests
// =============================================================================
