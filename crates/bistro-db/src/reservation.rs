//! # Reservation Workflow
//!
//! Books tables ahead of time. A reservation holds its table from the
//! moment it is made until it is cancelled.
//!
//! ```text
//! CreateReservationRequest
//!      │ validate: all fields, date YYYY-MM-DD, time HH:MM
//!      ▼
//! begin ─► table by number ─► available? ─► guests ≤ seats?
//!       ─► table available → occupied ─► insert reservation ─► commit
//!
//! cancel: owner only ─► delete ─► table occupied → available ─► commit
//! ```

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};
use crate::pool::Database;
use crate::repository::ReservationRepository;
use crate::unit_of_work::UnitOfWork;
use crate::workflow::finish;
use bistro_core::requests::{CreateReservationRequest, ReservationUpdate, ValidReservation};
use bistro_core::{CoreError, Principal, Reservation, Table};

/// Reservation lifecycle operations.
#[derive(Debug, Clone)]
pub struct ReservationWorkflow {
    db: Database,
}

impl ReservationWorkflow {
    pub fn new(db: Database) -> Self {
        ReservationWorkflow { db }
    }

    /// Books an available table for a party that fits it.
    ///
    /// ## Returns
    /// - `MissingField` / `Invalid` for a malformed request (no transaction)
    /// - `TableNotFound` for an unknown table number
    /// - `TableOccupied` when the table hosts an order or another reservation
    /// - `TooManyGuests` when the party exceeds the table's seats
    pub async fn create_reservation(
        &self,
        principal: &Principal,
        request: CreateReservationRequest,
    ) -> ServiceResult<Reservation> {
        let request = request.validate()?;
        debug!(
            table_number = request.table_number,
            guests = request.guests,
            "create_reservation"
        );

        let mut uow = self.db.begin().await?;
        let outcome = book_table(&mut uow, principal, request).await;
        let reservation = finish(uow, outcome, "create_reservation").await?;

        info!(
            reservation_id = %reservation.id,
            table_number = reservation.table_number,
            date = %reservation.date,
            time = %reservation.time,
            "Reservation created"
        );
        Ok(reservation)
    }

    /// Changes name, party size, date or time. The table stays the same,
    /// and a larger party must still fit it.
    pub async fn update_reservation(
        &self,
        principal: &Principal,
        id: &str,
        update: ReservationUpdate,
    ) -> ServiceResult<Reservation> {
        let update = update.validate()?;

        let mut uow = self.db.begin().await?;
        let outcome = async {
            let mut reservation = load_owned(&mut uow, principal, id).await?;
            if let Some(guests) = update.guests {
                let table = table_of(&mut uow, reservation.table_number).await?;
                check_fits(&table, guests)?;
                reservation.guests = guests;
            }
            if let Some(customer_name) = update.customer_name {
                reservation.customer_name = customer_name;
            }
            if let Some(date) = update.date {
                reservation.date = date;
            }
            if let Some(time) = update.time {
                reservation.time = time;
            }
            reservation.updated_at = Utc::now();

            uow.reservations().update(&reservation).await?;
            Ok::<_, ServiceError>(reservation)
        }
        .await;
        let reservation = finish(uow, outcome, "update_reservation").await?;

        info!(reservation_id = %reservation.id, guests = reservation.guests, "Reservation updated");
        Ok(reservation)
    }

    /// Cancels a reservation and frees its table.
    pub async fn delete_reservation(&self, principal: &Principal, id: &str) -> ServiceResult<Reservation> {
        let mut uow = self.db.begin().await?;
        let outcome = async {
            let reservation = load_owned(&mut uow, principal, id).await?;
            uow.reservations().delete(&reservation.id).await?;
            if !uow.tables().release(reservation.table_number).await? {
                debug!(
                    table_number = reservation.table_number,
                    "Table was not occupied; nothing to release"
                );
            }
            Ok::<_, ServiceError>(reservation)
        }
        .await;
        let reservation = finish(uow, outcome, "delete_reservation").await?;

        info!(
            reservation_id = %reservation.id,
            table_number = reservation.table_number,
            "Reservation cancelled"
        );
        Ok(reservation)
    }

    pub async fn get_reservation(&self, id: &str) -> ServiceResult<Reservation> {
        let mut conn = self.db.acquire().await?;
        let reservation = ReservationRepository::new(&mut *conn)
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::not_found("Reservation", id))?;
        Ok(reservation)
    }

    /// Reservations made by the caller, soonest first.
    pub async fn list_reservations(&self, principal: &Principal) -> ServiceResult<Vec<Reservation>> {
        let mut conn = self.db.acquire().await?;
        let reservations = ReservationRepository::new(&mut *conn)
            .list_by_owner(&principal.user_id)
            .await?;
        Ok(reservations)
    }
}

async fn book_table(
    uow: &mut UnitOfWork,
    principal: &Principal,
    request: ValidReservation,
) -> ServiceResult<Reservation> {
    let table_number = request.table_number;
    let table = table_of(uow, table_number).await?;
    if !table.is_available() {
        return Err(CoreError::TableOccupied(table_number).into());
    }
    check_fits(&table, request.guests)?;

    if !uow.tables().occupy(table_number).await? {
        return Err(CoreError::TableOccupied(table_number).into());
    }

    let now = Utc::now();
    let reservation = Reservation {
        id: Uuid::new_v4().to_string(),
        customer_name: request.customer_name,
        guests: request.guests,
        table_number,
        date: request.date,
        time: request.time,
        owner_id: principal.user_id.clone(),
        created_at: now,
        updated_at: now,
    };
    uow.reservations().insert(&reservation).await?;

    Ok(reservation)
}

async fn table_of(uow: &mut UnitOfWork, table_number: i64) -> ServiceResult<Table> {
    let table = uow
        .tables()
        .find_by_number(table_number)
        .await?
        .ok_or(CoreError::TableNotFound(table_number))?;
    Ok(table)
}

fn check_fits(table: &Table, guests: i64) -> ServiceResult<()> {
    if guests > table.seats {
        return Err(CoreError::TooManyGuests {
            table_number: table.table_number,
            seats: table.seats,
            guests,
        }
        .into());
    }
    Ok(())
}

async fn load_owned(uow: &mut UnitOfWork, principal: &Principal, id: &str) -> ServiceResult<Reservation> {
    let reservation = uow
        .reservations()
        .find_by_id(id)
        .await?
        .ok_or_else(|| CoreError::not_found("Reservation", id))?;
    if !reservation.is_owned_by(principal) {
        return Err(CoreError::forbidden("Reservation", id, principal.user_id.as_str()).into());
    }
    Ok(reservation)
}
