//! # Error Types
//!
//! Domain-specific error types for bistro-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  bistro-core errors (this file)                                        │
//! │  ├── CoreError        - Business rule violations                       │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  └── ErrorKind        - Client-facing category + status code           │
//! │                                                                         │
//! │  bistro-db errors (separate crate)                                     │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── ServiceError     - What the request boundary sees                 │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError ─┐                                  │
//! │                          DbError ───┴─► ServiceError → ErrorBody       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Every message names the offending entity (table number, item name,
//!    ingredient name) so the caller can fix the exact line item
//! 3. Errors are enum variants, never String

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::quantity::Quantity;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No table carries the requested table number.
    #[error("Table number {0} not found")]
    TableNotFound(i64),

    /// The table already hosts an order.
    ///
    /// ## When This Occurs
    /// - Creating an order for a table another order is using
    /// - Losing a race against a concurrent create for the same table
    #[error("Table number {0} is already occupied")]
    TableOccupied(i64),

    /// The table cannot be removed while an order is seated at it.
    #[error("Table number {0} is occupied and cannot be removed")]
    TableInUse(i64),

    /// A requested menu item name did not match any menu item.
    #[error("Menu item \"{0}\" not found")]
    MenuItemNotFound(String),

    /// A requested ingredient name did not match any inventory item.
    #[error("Ingredient \"{0}\" not found")]
    IngredientNotFound(String),

    /// The party does not fit at the booked table.
    #[error("Table number {table_number} seats {seats}, reservation is for {guests}")]
    TooManyGuests {
        table_number: i64,
        seats: i64,
        guests: i64,
    },

    /// Order id does not exist.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Any other record looked up by id.
    #[error("{entity} not found: {id}")]
    RecordNotFound { entity: String, id: String },

    /// Mutation attempted by someone other than the owner.
    #[error("User {user_id} is not allowed to modify {entity} {id}")]
    Forbidden {
        entity: String,
        id: String,
        user_id: String,
    },

    /// Inventory cannot cover the aggregated ingredient consumption.
    ///
    /// ## User Workflow
    /// ```text
    /// Order 3 × Margherita (0.2 kg flour each)
    ///      │
    ///      ▼
    /// Aggregate: flour 0.6 kg, on hand 0.5 kg
    ///      │
    ///      ▼
    /// InsufficientIngredient { ingredient: "flour", available: 0.5, required: 0.6 }
    ///      │
    ///      ▼
    /// Nothing is written, the whole order is rejected
    /// ```
    #[error(
        "Not enough {ingredient} in inventory: available {available}, required {required} (short by {})",
        ingredient_shortfall(.available, .required)
    )]
    InsufficientIngredient {
        ingredient: String,
        available: Quantity,
        required: Quantity,
    },

    /// The dish's own serving counter is below the requested quantity.
    #[error(
        "Insufficient stock for \"{dish}\": available {available}, requested {requested} (short by {})",
        dish_shortfall(.available, .requested)
    )]
    InsufficientDishStock {
        dish: String,
        available: i64,
        requested: i64,
    },

    /// A configured count limit (tables, menu items) has been reached.
    #[error("Maximum {what} limit of {max} reached")]
    LimitReached { what: String, max: usize },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

fn ingredient_shortfall(available: &Quantity, required: &Quantity) -> Decimal {
    (required.as_decimal() - available.as_decimal()).normalize()
}

fn dish_shortfall(available: &i64, requested: &i64) -> i64 {
    requested - available
}

impl CoreError {
    /// Creates a RecordNotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        CoreError::RecordNotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a Forbidden error for a non-owner mutation attempt.
    pub fn forbidden(
        entity: impl Into<String>,
        id: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        CoreError::Forbidden {
            entity: entity.into(),
            id: id.into(),
            user_id: user_id.into(),
        }
    }

    /// Returns the client-facing category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::TableNotFound(_)
            | CoreError::MenuItemNotFound(_)
            | CoreError::IngredientNotFound(_)
            | CoreError::OrderNotFound(_)
            | CoreError::RecordNotFound { .. } => ErrorKind::NotFound,
            CoreError::TableOccupied(_)
            | CoreError::TableInUse(_)
            | CoreError::TooManyGuests { .. }
            | CoreError::LimitReached { .. } => ErrorKind::Conflict,
            CoreError::Forbidden { .. } => ErrorKind::Forbidden,
            CoreError::InsufficientIngredient { .. } | CoreError::InsufficientDishStock { .. } => {
                ErrorKind::InsufficientStock
            }
            CoreError::Validation(e) => e.kind(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before any transaction is opened.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// A computed amount (order total, ingredient consumption) or an
    /// inbound quantity does not fit the stored range.
    #[error("{field} is too large")]
    TooLarge { field: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., a reservation date that is not `YYYY-MM-DD`).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., duplicate table number).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

impl ValidationError {
    /// Creates a Required error for the named field.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    /// Creates a TooLarge error.
    pub fn too_large(field: impl Into<String>) -> Self {
        ValidationError::TooLarge {
            field: field.into(),
        }
    }

    /// Creates a Duplicate error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        ValidationError::Duplicate {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Returns the client-facing category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ValidationError::Required { .. } => ErrorKind::MissingField,
            ValidationError::Duplicate { .. } => ErrorKind::Conflict,
            _ => ErrorKind::Invalid,
        }
    }
}

// =============================================================================
// Error Kind
// =============================================================================

/// Client-facing error category.
///
/// ## Status Mapping
/// ```text
/// MissingField       400   client input incomplete
/// Invalid            422   input present but unacceptable
/// NotFound           404   table / order / menu item / ingredient absent
/// Conflict           409   table occupied, duplicate key, limit reached
/// Forbidden          403   non-owner mutation
/// InsufficientStock  412   ingredient or dish cannot cover the request
/// Transient          503   commit conflict or lock timeout, safe to retry
/// Internal           500   anything else
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    MissingField,
    Invalid,
    NotFound,
    Conflict,
    Forbidden,
    InsufficientStock,
    Transient,
    Internal,
}

impl ErrorKind {
    /// HTTP-style status code for the request boundary.
    pub const fn status_code(self) -> u16 {
        match self {
            ErrorKind::MissingField => 400,
            ErrorKind::Invalid => 422,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::Forbidden => 403,
            ErrorKind::InsufficientStock => 412,
            ErrorKind::Transient => 503,
            ErrorKind::Internal => 500,
        }
    }

    /// Whether a caller may resubmit the same request unchanged.
    pub const fn is_retryable(self) -> bool {
        matches!(self, ErrorKind::Transient)
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
