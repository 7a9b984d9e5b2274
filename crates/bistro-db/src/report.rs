//! # Reports
//!
//! Read-only views for the back-office: daily sales, most ordered dishes,
//! and which tables are in which state. Reports take a pooled connection
//! and no write lock; they cover every owner's data.

use tracing::debug;

use crate::error::ServiceResult;
use crate::pool::Database;
use crate::repository::ReportRepository;
use bistro_core::requests::SalesReportQuery;
use bistro_core::{PopularDish, SalesDay, TableStatus};

/// Size of the popular-dishes report when no limit is given.
pub const DEFAULT_POPULAR_LIMIT: i64 = 10;

#[derive(Debug, Clone)]
pub struct Reports {
    db: Database,
}

impl Reports {
    pub fn new(db: Database) -> Self {
        Reports { db }
    }

    /// Order totals and counts per day, both ends inclusive.
    ///
    /// ## Returns
    /// - `MissingField` when either date is absent
    /// - `Invalid` for a malformed date or an end before the start
    pub async fn sales_report(&self, query: SalesReportQuery) -> ServiceResult<Vec<SalesDay>> {
        let (start, end) = query.validate()?;

        let mut conn = self.db.acquire().await?;
        let days = ReportRepository::new(&mut *conn).sales_by_day(start, end).await?;
        debug!(%start, %end, days = days.len(), "Sales report");
        Ok(days)
    }

    /// Most ordered dishes, at most `limit` (default 10).
    pub async fn popular_dishes(&self, limit: Option<i64>) -> ServiceResult<Vec<PopularDish>> {
        let limit = limit.filter(|n| *n > 0).unwrap_or(DEFAULT_POPULAR_LIMIT);

        let mut conn = self.db.acquire().await?;
        let dishes = ReportRepository::new(&mut *conn).popular_dishes(limit).await?;
        Ok(dishes)
    }

    /// Numbers of the tables currently in `status`.
    pub async fn tables_with_status(&self, status: TableStatus) -> ServiceResult<Vec<i64>> {
        let mut conn = self.db.acquire().await?;
        let numbers = ReportRepository::new(&mut *conn)
            .table_numbers_with_status(status)
            .await?;
        Ok(numbers)
    }
}
