//! # Unit of Work
//!
//! The one transaction primitive every mutation goes through.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Database::begin()                                                     │
//! │       │  BEGIN; UPDATE write_lock ...   ← write lock taken up front    │
//! │       ▼                                                                 │
//! │  UnitOfWork                                                            │
//! │       │  uow.tables() / uow.menu() / uow.inventory() / uow.orders()    │
//! │       │  uow.reservations()                                            │
//! │       │  (all on the same connection, all inside the transaction)      │
//! │       │                                                                 │
//! │       ├── commit() ──► COMMIT    every write becomes visible at once   │
//! │       ├── abort()  ──► ROLLBACK  nothing happened                      │
//! │       └── dropped  ──► ROLLBACK  (early return, `?`, panic)            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Taking the write lock before the first read means two units of work
//! never interleave their check-then-decrement sequences. A second writer
//! waits up to `busy_timeout`, then fails with `DbError::Busy`.

use chrono::Utc;
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use std::time::Instant;
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use crate::repository::inventory::InventoryRepository;
use crate::repository::menu::MenuRepository;
use crate::repository::order::OrderRepository;
use crate::repository::reservation::ReservationRepository;
use crate::repository::table::TableRepository;

/// An open database transaction holding the write lock.
///
/// `commit` and `abort` consume it; there is no other way to end one
/// besides dropping it, which rolls back.
pub struct UnitOfWork {
    tx: Transaction<'static, Sqlite>,
    opened_at: Instant,
}

impl UnitOfWork {
    pub(crate) async fn begin(pool: &SqlitePool) -> DbResult<Self> {
        let opened_at = Instant::now();
        let mut tx = pool.begin().await?;

        sqlx::query("UPDATE write_lock SET acquired_at = ? WHERE id = 1")
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;

        debug!(
            waited_ms = opened_at.elapsed().as_millis() as u64,
            "Unit of work opened"
        );
        Ok(UnitOfWork { tx, opened_at })
    }

    /// The transaction's connection, for statements no repository covers.
    pub fn conn(&mut self) -> &mut SqliteConnection {
        &mut self.tx
    }

    pub fn tables(&mut self) -> TableRepository<'_> {
        TableRepository::new(&mut self.tx)
    }

    pub fn menu(&mut self) -> MenuRepository<'_> {
        MenuRepository::new(&mut self.tx)
    }

    pub fn inventory(&mut self) -> InventoryRepository<'_> {
        InventoryRepository::new(&mut self.tx)
    }

    pub fn orders(&mut self) -> OrderRepository<'_> {
        OrderRepository::new(&mut self.tx)
    }

    pub fn reservations(&mut self) -> ReservationRepository<'_> {
        ReservationRepository::new(&mut self.tx)
    }

    /// Makes every write visible atomically.
    pub async fn commit(self) -> DbResult<()> {
        let held_ms = self.opened_at.elapsed().as_millis() as u64;
        self.tx.commit().await.map_err(|e| match DbError::from(e) {
            transient @ (DbError::Busy(_) | DbError::PoolExhausted) => transient,
            other => DbError::TransactionFailed(other.to_string()),
        })?;
        debug!(held_ms, "Unit of work committed");
        Ok(())
    }

    /// Discards every write.
    pub async fn abort(self) -> DbResult<()> {
        let held_ms = self.opened_at.elapsed().as_millis() as u64;
        if let Err(e) = self.tx.rollback().await {
            warn!(error = %e, "Rollback failed");
            return Err(DbError::TransactionFailed(e.to_string()));
        }
        debug!(held_ms, "Unit of work aborted");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
