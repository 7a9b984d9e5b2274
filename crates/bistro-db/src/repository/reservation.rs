//! # Reservation Repository
//!
//! Database operations for table reservations.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::DbResult;
use bistro_core::Reservation;

#[derive(Debug, Clone, sqlx::FromRow)]
struct ReservationRecord {
    id: String,
    customer_name: String,
    guests: i64,
    table_number: i64,
    date: NaiveDate,
    time: NaiveTime,
    owner_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ReservationRecord> for Reservation {
    fn from(r: ReservationRecord) -> Self {
        Reservation {
            id: r.id,
            customer_name: r.customer_name,
            guests: r.guests,
            table_number: r.table_number,
            date: r.date,
            time: r.time,
            owner_id: r.owner_id,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

const SELECT_RESERVATION: &str = r#"
    SELECT id, customer_name, guests, table_number, date, time, owner_id, created_at, updated_at
    FROM reservations
"#;

/// Repository for reservation operations.
pub struct ReservationRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> ReservationRepository<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        ReservationRepository { conn }
    }

    pub async fn find_by_id(&mut self, id: &str) -> DbResult<Option<Reservation>> {
        let record = sqlx::query_as::<_, ReservationRecord>(&format!(
            "{} WHERE id = ?",
            SELECT_RESERVATION
        ))
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(record.map(Reservation::from))
    }

    /// One owner's reservations, soonest first.
    pub async fn list_by_owner(&mut self, owner_id: &str) -> DbResult<Vec<Reservation>> {
        let records = sqlx::query_as::<_, ReservationRecord>(&format!(
            "{} WHERE owner_id = ? ORDER BY date, time",
            SELECT_RESERVATION
        ))
        .bind(owner_id)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(records.into_iter().map(Reservation::from).collect())
    }

    pub async fn insert(&mut self, reservation: &Reservation) -> DbResult<()> {
        debug!(
            reservation_id = %reservation.id,
            table_number = reservation.table_number,
            "Inserting reservation"
        );

        sqlx::query(
            r#"
            INSERT INTO reservations (
                id, customer_name, guests, table_number, date, time,
                owner_id, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&reservation.id)
        .bind(&reservation.customer_name)
        .bind(reservation.guests)
        .bind(reservation.table_number)
        .bind(reservation.date)
        .bind(reservation.time)
        .bind(&reservation.owner_id)
        .bind(reservation.created_at)
        .bind(reservation.updated_at)
        .execute(&mut *self.conn)
        .await?;

        Ok(())
    }

    /// Rewrites the mutable fields. The table and owner never change.
    pub async fn update(&mut self, reservation: &Reservation) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE reservations
            SET customer_name = ?, guests = ?, date = ?, time = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&reservation.customer_name)
        .bind(reservation.guests)
        .bind(reservation.date)
        .bind(reservation.time)
        .bind(reservation.updated_at)
        .bind(&reservation.id)
        .execute(&mut *self.conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn delete(&mut self, id: &str) -> DbResult<bool> {
        debug!(reservation_id = %id, "Deleting reservation");

        let result = sqlx::query("DELETE FROM reservations WHERE id = ?")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;

        Ok(result.rows_affected() == 1)
    }
}
