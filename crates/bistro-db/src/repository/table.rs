//! # Table Repository
//!
//! Database operations for dining tables.
//!
//! ## Status Transitions
//! ```text
//!             occupy()  (create order)
//!   available ─────────────────────────► occupied
//!       ▲                                    │
//!       └────────────────────────────────────┘
//!             release() (delete order)
//! ```
//! Both transitions are conditional updates: `occupy` only matches an
//! available row, so of two racing creates exactly one sees a row affected.

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::DbResult;
use bistro_core::{Table, TableStatus};

#[derive(Debug, Clone, sqlx::FromRow)]
struct TableRecord {
    id: String,
    table_number: i64,
    seats: i64,
    status: TableStatus,
    owner_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TableRecord> for Table {
    fn from(r: TableRecord) -> Self {
        Table {
            id: r.id,
            table_number: r.table_number,
            seats: r.seats,
            status: r.status,
            owner_id: r.owner_id,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

const SELECT_TABLE: &str = r#"
    SELECT id, table_number, seats, status, owner_id, created_at, updated_at
    FROM dining_tables
"#;

/// Repository for dining table operations.
pub struct TableRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> TableRepository<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        TableRepository { conn }
    }

    /// Looks a table up by its business key.
    pub async fn find_by_number(&mut self, table_number: i64) -> DbResult<Option<Table>> {
        let record = sqlx::query_as::<_, TableRecord>(&format!(
            "{} WHERE table_number = ?",
            SELECT_TABLE
        ))
        .bind(table_number)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(record.map(Table::from))
    }

    pub async fn find_by_id(&mut self, id: &str) -> DbResult<Option<Table>> {
        let record = sqlx::query_as::<_, TableRecord>(&format!("{} WHERE id = ?", SELECT_TABLE))
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?;

        Ok(record.map(Table::from))
    }

    /// All tables, by table number.
    pub async fn list(&mut self) -> DbResult<Vec<Table>> {
        let records = sqlx::query_as::<_, TableRecord>(&format!(
            "{} ORDER BY table_number",
            SELECT_TABLE
        ))
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(records.into_iter().map(Table::from).collect())
    }

    pub async fn count(&mut self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM dining_tables")
            .fetch_one(&mut *self.conn)
            .await?;
        Ok(count)
    }

    pub async fn insert(&mut self, table: &Table) -> DbResult<()> {
        debug!(table_number = table.table_number, "Inserting table");

        sqlx::query(
            r#"
            INSERT INTO dining_tables (
                id, table_number, seats, status, owner_id, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&table.id)
        .bind(table.table_number)
        .bind(table.seats)
        .bind(table.status)
        .bind(&table.owner_id)
        .bind(table.created_at)
        .bind(table.updated_at)
        .execute(&mut *self.conn)
        .await?;

        Ok(())
    }

    /// Returns `false` when no table has this id.
    pub async fn update_seats(&mut self, id: &str, seats: i64) -> DbResult<bool> {
        let result = sqlx::query("UPDATE dining_tables SET seats = ?, updated_at = ? WHERE id = ?")
            .bind(seats)
            .bind(Utc::now())
            .bind(id)
            .execute(&mut *self.conn)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Deletes an available table. Returns `false` when it is occupied or gone.
    pub async fn delete_available(&mut self, id: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM dining_tables WHERE id = ? AND status = ?")
            .bind(id)
            .bind(TableStatus::Available)
            .execute(&mut *self.conn)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    /// `available → occupied`. Returns `false` if the table was not available.
    pub async fn occupy(&mut self, table_number: i64) -> DbResult<bool> {
        self.transition(table_number, TableStatus::Available, TableStatus::Occupied)
            .await
    }

    /// `occupied → available`. Returns `false` if the table was not occupied.
    pub async fn release(&mut self, table_number: i64) -> DbResult<bool> {
        self.transition(table_number, TableStatus::Occupied, TableStatus::Available)
            .await
    }

    async fn transition(
        &mut self,
        table_number: i64,
        from: TableStatus,
        to: TableStatus,
    ) -> DbResult<bool> {
        let result = sqlx::query(
            "UPDATE dining_tables SET status = ?, updated_at = ? WHERE table_number = ? AND status = ?",
        )
        .bind(to)
        .bind(Utc::now())
        .bind(table_number)
        .bind(from)
        .execute(&mut *self.conn)
        .await?;

        let changed = result.rows_affected() == 1;
        debug!(table_number, ?from, ?to, changed, "Table status transition");
        Ok(changed)
    }
}
