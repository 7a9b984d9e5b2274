//! # bistro-core: Pure Business Logic for the Bistro Back-Office
//!
//! This crate holds the order-processing rules as pure functions with zero
//! I/O dependencies. Everything that touches SQLite lives in `bistro-db`.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Bistro Back-Office Architecture                     │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Request boundary (HTTP, outside this repo)         │   │
//! │  │   /orders  /reservations  /reports  /tables  /menu  /inventory  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ Principal + request body               │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │   bistro-db: OrderWorkflow, ReservationWorkflow, Catalog, ...   │   │
//! │  │          unit of work, resolver, stock ledger, SQL              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ bistro-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  money /  │  │  ledger   │  │ validation│  │   │
//! │  │   │ MenuItem  │  │ quantity  │  │ aggregate │  │  requests │  │   │
//! │  │   │  Order    │  │  Money    │  │  deltas   │  │   limits  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (MenuItem, InventoryItem, Table, Order, ...)
//! - [`money`] - Money type with integer cents
//! - [`quantity`] - Exact decimal ingredient quantities (thousandths)
//! - [`ledger`] - Ingredient aggregation, order deltas, sufficiency checks
//! - [`requests`] - Inbound request shapes and their validation
//! - [`limits`] - Injectable business limits
//! - [`error`] - Domain error types
//! - [`validation`] - Field-level validators
//!
//! ## Example Usage
//!
//! ```rust
//! use bistro_core::quantity::Quantity;
//!
//! // 0.2 kg of flour per pizza, three pizzas
//! let per_serving = Quantity::from_milli(200);
//! let needed = per_serving.checked_mul(3).unwrap();
//! assert_eq!(needed.to_string(), "0.6");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod ledger;
pub mod limits;
pub mod money;
pub mod quantity;
pub mod requests;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ErrorKind, ValidationError};
pub use limits::BusinessLimits;
pub use money::Money;
pub use quantity::Quantity;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Order status assigned by the create path.
pub const INITIAL_ORDER_STATUS: &str = "In Progress";

/// Default low-stock threshold for new inventory items (5 units).
pub const DEFAULT_LOW_STOCK_THRESHOLD_MILLI: i64 = 5_000;
