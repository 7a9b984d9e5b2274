//! # Inventory Repository
//!
//! Database operations for raw ingredients.
//!
//! ## Guarded Decrement
//! ```text
//! UPDATE inventory_items
//!    SET quantity_milli = quantity_milli - :net
//!  WHERE id = :id AND quantity_milli >= :net
//!
//!  1 row  → consumed
//!  0 rows → not enough on hand (or the item vanished); nothing changed
//! ```
//! The check and the write are one statement, so a stale read can never
//! take a quantity below zero.

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::DbResult;
use bistro_core::{InventoryItem, Quantity, Unit};

#[derive(Debug, Clone, sqlx::FromRow)]
struct InventoryRecord {
    id: String,
    name: String,
    quantity_milli: i64,
    unit: Unit,
    threshold_milli: i64,
    owner_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<InventoryRecord> for InventoryItem {
    fn from(r: InventoryRecord) -> Self {
        InventoryItem {
            id: r.id,
            name: r.name,
            quantity: Quantity::from_milli(r.quantity_milli),
            unit: r.unit,
            threshold: Quantity::from_milli(r.threshold_milli),
            owner_id: r.owner_id,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

const SELECT_INVENTORY: &str = r#"
    SELECT id, name, quantity_milli, unit, threshold_milli, owner_id, created_at, updated_at
    FROM inventory_items
"#;

/// Repository for inventory operations.
pub struct InventoryRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> InventoryRepository<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        InventoryRepository { conn }
    }

    /// Exact, case-sensitive name match.
    pub async fn find_by_name(&mut self, name: &str) -> DbResult<Option<InventoryItem>> {
        let record = sqlx::query_as::<_, InventoryRecord>(&format!(
            "{} WHERE name = ? ORDER BY created_at LIMIT 1",
            SELECT_INVENTORY
        ))
        .bind(name)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(record.map(InventoryItem::from))
    }

    pub async fn find_by_id(&mut self, id: &str) -> DbResult<Option<InventoryItem>> {
        let record = sqlx::query_as::<_, InventoryRecord>(&format!(
            "{} WHERE id = ?",
            SELECT_INVENTORY
        ))
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(record.map(InventoryItem::from))
    }

    pub async fn list(&mut self) -> DbResult<Vec<InventoryItem>> {
        let records =
            sqlx::query_as::<_, InventoryRecord>(&format!("{} ORDER BY name", SELECT_INVENTORY))
                .fetch_all(&mut *self.conn)
                .await?;

        Ok(records.into_iter().map(InventoryItem::from).collect())
    }

    /// Items strictly below their threshold.
    pub async fn low_stock(&mut self) -> DbResult<Vec<InventoryItem>> {
        let records = sqlx::query_as::<_, InventoryRecord>(&format!(
            "{} WHERE quantity_milli < threshold_milli ORDER BY name",
            SELECT_INVENTORY
        ))
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(records.into_iter().map(InventoryItem::from).collect())
    }

    pub async fn insert(&mut self, item: &InventoryItem) -> DbResult<()> {
        debug!(name = %item.name, quantity = %item.quantity, "Inserting inventory item");

        sqlx::query(
            r#"
            INSERT INTO inventory_items (
                id, name, quantity_milli, unit, threshold_milli, owner_id, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&item.id)
        .bind(&item.name)
        .bind(item.quantity.milli())
        .bind(item.unit)
        .bind(item.threshold.milli())
        .bind(&item.owner_id)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&mut *self.conn)
        .await?;

        Ok(())
    }

    /// Guarded decrement. Returns `false` when less than `amount` is on hand.
    pub async fn consume(&mut self, id: &str, amount: Quantity) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE inventory_items
            SET quantity_milli = quantity_milli - ?1, updated_at = ?2
            WHERE id = ?3 AND quantity_milli >= ?1
            "#,
        )
        .bind(amount.milli())
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *self.conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Adds `amount` back. Returns `false` when the item does not exist.
    pub async fn restock(&mut self, id: &str, amount: Quantity) -> DbResult<bool> {
        let result = sqlx::query(
            "UPDATE inventory_items SET quantity_milli = quantity_milli + ?, updated_at = ? WHERE id = ?",
        )
        .bind(amount.milli())
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *self.conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn set_threshold(&mut self, id: &str, threshold: Quantity) -> DbResult<bool> {
        let result = sqlx::query(
            "UPDATE inventory_items SET threshold_milli = ?, updated_at = ? WHERE id = ?",
        )
        .bind(threshold.milli())
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *self.conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
