//! # Order Repository
//!
//! Database operations for orders and their line items.
//!
//! ## Snapshot Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Why we copy name, price and recipe into order_items:                  │
//! │                                                                         │
//! │  Day 1: Order 3 × Margherita at 12.50, 0.2 kg flour each               │
//! │         order_items: name="Margherita", price=1250,                    │
//! │                      ingredients=[{flour, 200}]                        │
//! │                                                                         │
//! │  Day 2: Margherita now costs 13.00 and takes 0.25 kg flour             │
//! │                                                                         │
//! │  The Day 1 order still totals 37.50, and reducing it to 1 pizza        │
//! │  returns 2 × 0.2 kg, the amount that was actually taken.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! The recipe snapshot is stored as JSON text with integer thousandths.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::DbResult;
use bistro_core::{IngredientRequirement, Order, OrderLine, OrderStatus, Quantity};

#[derive(Debug, Clone, sqlx::FromRow)]
struct OrderRecord {
    id: String,
    customer_name: String,
    table_number: i64,
    total_cents: i64,
    status: String,
    owner_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRecord {
    fn into_order(self, items: Vec<OrderLine>) -> Order {
        Order {
            id: self.id,
            customer_name: self.customer_name,
            table_number: self.table_number,
            items,
            total_cents: self.total_cents,
            status: OrderStatus::from(self.status),
            owner_id: self.owner_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct LineRecord {
    menu_item_id: String,
    name_snapshot: String,
    unit_price_cents: i64,
    quantity: i64,
    ingredients_snapshot: String,
}

/// Stored shape of one recipe line in `ingredients_snapshot`.
#[derive(Debug, Serialize, Deserialize)]
struct SnapshotEntry {
    ingredient_id: String,
    per_serving_milli: i64,
}

fn encode_snapshot(ingredients: &[IngredientRequirement]) -> DbResult<String> {
    let entries: Vec<SnapshotEntry> = ingredients
        .iter()
        .map(|r| SnapshotEntry {
            ingredient_id: r.ingredient_id.clone(),
            per_serving_milli: r.per_serving.milli(),
        })
        .collect();
    Ok(serde_json::to_string(&entries)?)
}

fn decode_snapshot(json: &str) -> DbResult<Vec<IngredientRequirement>> {
    let entries: Vec<SnapshotEntry> = serde_json::from_str(json)?;
    Ok(entries
        .into_iter()
        .map(|e| IngredientRequirement {
            ingredient_id: e.ingredient_id,
            per_serving: Quantity::from_milli(e.per_serving_milli),
        })
        .collect())
}

impl TryFrom<LineRecord> for OrderLine {
    type Error = crate::error::DbError;

    fn try_from(r: LineRecord) -> Result<Self, Self::Error> {
        Ok(OrderLine {
            ingredients_snapshot: decode_snapshot(&r.ingredients_snapshot)?,
            menu_item_id: r.menu_item_id,
            name_snapshot: r.name_snapshot,
            unit_price_cents: r.unit_price_cents,
            quantity: r.quantity,
        })
    }
}

const SELECT_ORDER: &str = r#"
    SELECT id, customer_name, table_number, total_cents, status, owner_id, created_at, updated_at
    FROM orders
"#;

/// Repository for order operations.
pub struct OrderRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> OrderRepository<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        OrderRepository { conn }
    }

    /// Loads an order with its lines in stored order.
    pub async fn find_by_id(&mut self, id: &str) -> DbResult<Option<Order>> {
        let record = sqlx::query_as::<_, OrderRecord>(&format!("{} WHERE id = ?", SELECT_ORDER))
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?;

        match record {
            Some(record) => {
                let lines = self.lines(&record.id).await?;
                Ok(Some(record.into_order(lines)))
            }
            None => Ok(None),
        }
    }

    /// Orders placed by one owner, newest first.
    pub async fn list_by_owner(&mut self, owner_id: &str) -> DbResult<Vec<Order>> {
        let records = sqlx::query_as::<_, OrderRecord>(&format!(
            "{} WHERE owner_id = ? ORDER BY created_at DESC",
            SELECT_ORDER
        ))
        .bind(owner_id)
        .fetch_all(&mut *self.conn)
        .await?;

        let mut orders = Vec::with_capacity(records.len());
        for record in records {
            let lines = self.lines(&record.id).await?;
            orders.push(record.into_order(lines));
        }
        Ok(orders)
    }

    async fn lines(&mut self, order_id: &str) -> DbResult<Vec<OrderLine>> {
        let rows = sqlx::query_as::<_, LineRecord>(
            r#"
            SELECT menu_item_id, name_snapshot, unit_price_cents, quantity, ingredients_snapshot
            FROM order_items
            WHERE order_id = ?
            ORDER BY position
            "#,
        )
        .bind(order_id)
        .fetch_all(&mut *self.conn)
        .await?;

        rows.into_iter().map(OrderLine::try_from).collect()
    }

    /// Inserts the order header and all of its lines.
    pub async fn insert(&mut self, order: &Order) -> DbResult<()> {
        debug!(
            order_id = %order.id,
            table_number = order.table_number,
            lines = order.items.len(),
            total_cents = order.total_cents,
            "Inserting order"
        );

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, customer_name, table_number, total_cents, status, owner_id,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&order.id)
        .bind(&order.customer_name)
        .bind(order.table_number)
        .bind(order.total_cents)
        .bind(order.status.as_str())
        .bind(&order.owner_id)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *self.conn)
        .await?;

        self.insert_lines(&order.id, &order.items).await
    }

    /// Swaps the full line set of an order.
    pub async fn replace_lines(&mut self, order_id: &str, lines: &[OrderLine]) -> DbResult<()> {
        sqlx::query("DELETE FROM order_items WHERE order_id = ?")
            .bind(order_id)
            .execute(&mut *self.conn)
            .await?;

        self.insert_lines(order_id, lines).await
    }

    async fn insert_lines(&mut self, order_id: &str, lines: &[OrderLine]) -> DbResult<()> {
        for (position, line) in lines.iter().enumerate() {
            let snapshot = encode_snapshot(&line.ingredients_snapshot)?;
            sqlx::query(
                r#"
                INSERT INTO order_items (
                    order_id, position, menu_item_id, name_snapshot,
                    unit_price_cents, quantity, ingredients_snapshot
                ) VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(order_id)
            .bind(position as i64)
            .bind(&line.menu_item_id)
            .bind(&line.name_snapshot)
            .bind(line.unit_price_cents)
            .bind(line.quantity)
            .bind(snapshot)
            .execute(&mut *self.conn)
            .await?;
        }
        Ok(())
    }

    /// Rewrites the mutable header fields.
    pub async fn update_header(
        &mut self,
        id: &str,
        customer_name: &str,
        total_cents: i64,
        status: &OrderStatus,
        updated_at: DateTime<Utc>,
    ) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET customer_name = ?, total_cents = ?, status = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(customer_name)
        .bind(total_cents)
        .bind(status.as_str())
        .bind(updated_at)
        .bind(id)
        .execute(&mut *self.conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn update_status(
        &mut self,
        id: &str,
        status: &OrderStatus,
        updated_at: DateTime<Utc>,
    ) -> DbResult<bool> {
        let result = sqlx::query("UPDATE orders SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(updated_at)
            .bind(id)
            .execute(&mut *self.conn)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Deletes the order; its lines go with it (ON DELETE CASCADE).
    pub async fn delete(&mut self, id: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM orders WHERE id = ?")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;

        Ok(result.rows_affected() == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_json_keeps_exact_thousandths() {
        let recipe = vec![IngredientRequirement {
            ingredient_id: "flour".to_string(),
            per_serving: Quantity::from_milli(200),
        }];
        let json = encode_snapshot(&recipe).unwrap();
        assert_eq!(json, r#"[{"ingredient_id":"flour","per_serving_milli":200}]"#);
        assert_eq!(decode_snapshot(&json).unwrap(), recipe);
    }

    #[test]
    fn test_corrupt_snapshot_is_reported() {
        assert!(matches!(
            decode_snapshot("not json"),
            Err(crate::error::DbError::Corrupt(_))
        ));
    }
}
