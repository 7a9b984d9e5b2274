//! # bistro-db: Persistence and Workflows for the Bistro Back-Office
//!
//! This crate owns every SQL statement and every transaction. It uses
//! SQLite through sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Bistro Back-Office Data Flow                       │
//! │                                                                         │
//! │  Request boundary (create order, restock, ...)                          │
//! │       │  Principal + request body                                       │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     bistro-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │ OrderWorkflow │    │   Resolver    │    │ StockLedger  │  │   │
//! │  │   │ Reservations  │───►│ names → ids   │    │ check, apply │  │   │
//! │  │   │ Catalog       │    │               │    │              │  │   │
//! │  │   │ Reports       │    │               │    │              │  │   │
//! │  │   └───────┬───────┘    └───────────────┘    └──────────────┘  │   │
//! │  │           │ UnitOfWork (write lock, commit / abort)            │   │
//! │  │   ┌───────▼───────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │ Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │◄───│ table, menu,  │    │  (embedded)  │  │   │
//! │  │   │  SqlitePool   │    │ inventory,    │    │ 001_init.sql │  │   │
//! │  │   │               │    │ order, report │    │ 002_reserv.. │  │   │
//! │  │   │               │    │ reservation   │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (or `:memory:` in tests)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`workflow`] - Order create / update / status / delete
//! - [`reservation`] - Table bookings that hold a table until cancelled
//! - [`report`] - Daily sales, popular dishes, table status
//! - [`catalog`] - Tables, inventory and menu maintenance
//! - [`resolver`] - Display names to catalog identifiers
//! - [`ledger`] - Stock validation and application
//! - [`unit_of_work`] - The transaction primitive
//! - [`repository`] - SQL per aggregate
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`config`] - Environment-driven configuration
//! - [`error`] - Database and service error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bistro_core::requests::{CreateOrderRequest, ItemRequest};
//! use bistro_db::{BistroConfig, Database, OrderWorkflow};
//!
//! let config = BistroConfig::load()?;
//! let db = Database::new(config.db_config()).await?;
//! let orders = OrderWorkflow::new(db, config.limits);
//!
//! let order = orders
//!     .create_order(&principal, CreateOrderRequest {
//!         customer_name: Some("Ada".into()),
//!         table_number: Some(4),
//!         items: Some(vec![ItemRequest::new("Margherita", 2)]),
//!     })
//!     .await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod config;
pub mod error;
pub mod ledger;
pub mod migrations;
pub mod pool;
pub mod report;
pub mod repository;
pub mod reservation;
pub mod resolver;
pub mod unit_of_work;
pub mod workflow;

// =============================================================================
// Re-exports
// =============================================================================

pub use catalog::Catalog;
pub use config::{BistroConfig, ConfigError};
pub use error::{DbError, DbResult, ErrorBody, ServiceError, ServiceResult};
pub use ledger::StockLedger;
pub use pool::{Database, DbConfig};
pub use report::Reports;
pub use reservation::ReservationWorkflow;
pub use unit_of_work::UnitOfWork;
pub use workflow::OrderWorkflow;

// Repository re-exports for convenience
pub use repository::{
    InventoryRepository, MenuRepository, OrderRepository, ReportRepository, ReservationRepository,
    TableRepository,
};
