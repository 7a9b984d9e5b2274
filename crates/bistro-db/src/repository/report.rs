//! # Report Repository
//!
//! Read-only aggregates over orders, line items and tables.
//!
//! ```text
//! orders.created_at  "2024-06-01T19:42:10.5+00:00"
//!                     └──── day ───┘  substr(created_at, 1, 10)
//! ```
//! Days are UTC calendar days, compared as `YYYY-MM-DD` text.

use chrono::NaiveDate;
use sqlx::SqliteConnection;

use crate::error::DbResult;
use bistro_core::{PopularDish, SalesDay, TableStatus};

#[derive(Debug, sqlx::FromRow)]
struct SalesDayRecord {
    day: NaiveDate,
    total_cents: i64,
    order_count: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct PopularDishRecord {
    name: String,
    total_ordered: i64,
}

pub struct ReportRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> ReportRepository<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        ReportRepository { conn }
    }

    /// Totals per day for `start..=end`, oldest day first. Days without
    /// orders are absent.
    pub async fn sales_by_day(&mut self, start: NaiveDate, end: NaiveDate) -> DbResult<Vec<SalesDay>> {
        let records = sqlx::query_as::<_, SalesDayRecord>(
            r#"
            SELECT substr(created_at, 1, 10) AS day,
                   SUM(total_cents)          AS total_cents,
                   COUNT(*)                  AS order_count
            FROM orders
            WHERE substr(created_at, 1, 10) BETWEEN ? AND ?
            GROUP BY day
            ORDER BY day
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(records
            .into_iter()
            .map(|r| SalesDay {
                day: r.day,
                total_cents: r.total_cents,
                order_count: r.order_count,
            })
            .collect())
    }

    /// Dishes by servings ordered, most ordered first. Lines of dishes no
    /// longer on the menu are left out.
    pub async fn popular_dishes(&mut self, limit: i64) -> DbResult<Vec<PopularDish>> {
        let records = sqlx::query_as::<_, PopularDishRecord>(
            r#"
            SELECT m.name             AS name,
                   SUM(oi.quantity)   AS total_ordered
            FROM order_items oi
            JOIN menu_items m ON m.id = oi.menu_item_id
            GROUP BY m.id, m.name
            ORDER BY total_ordered DESC, m.name
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(records
            .into_iter()
            .map(|r| PopularDish {
                name: r.name,
                total_ordered: r.total_ordered,
            })
            .collect())
    }

    /// Table numbers currently in `status`, ascending.
    pub async fn table_numbers_with_status(&mut self, status: TableStatus) -> DbResult<Vec<i64>> {
        let numbers: Vec<i64> = sqlx::query_scalar(
            "SELECT table_number FROM dining_tables WHERE status = ? ORDER BY table_number",
        )
        .bind(status)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(numbers)
    }
}
