//! # Repository Module
//!
//! SQL for each aggregate, isolated behind a small API.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  OrderWorkflow / ReservationWorkflow / Catalog                         │
//! │       │                                                                 │
//! │       │  uow.inventory().consume(id, amount)                           │
//! │       ▼                                                                 │
//! │  InventoryRepository<'c>  { conn: &'c mut SqliteConnection }           │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  A repository borrows one connection. Borrowed from a UnitOfWork it    │
//! │  writes inside that transaction; borrowed from a pooled connection it  │
//! │  serves plain reads.                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`TableRepository`] - Dining tables and their status transitions
//! - [`InventoryRepository`] - Ingredients, guarded decrements, low stock
//! - [`MenuRepository`] - Dishes, recipes, serving counters
//! - [`OrderRepository`] - Orders and snapshot line items
//! - [`ReservationRepository`] - Table reservations
//! - [`ReportRepository`] - Read-only aggregates over orders and tables

pub mod inventory;
pub mod menu;
pub mod order;
pub mod report;
pub mod reservation;
pub mod table;

pub use inventory::InventoryRepository;
pub use menu::MenuRepository;
pub use order::OrderRepository;
pub use report::ReportRepository;
pub use reservation::ReservationRepository;
pub use table::TableRepository;
