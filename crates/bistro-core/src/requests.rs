//! # Request Types
//!
//! Inbound request bodies and their shape validation.
//!
//! Every request is validated here, before any transaction is opened:
//! a missing field never costs a database round trip. Validation returns
//! a normalised copy (defaults applied, dates parsed) that the workflows
//! consume. Names used to look something up (dish and ingredient names)
//! are passed through untouched: resolution is exact.
//!
//! Bodies use camelCase keys (`customerName`, `tableNumber`, ...).
//!
//! ```text
//! JSON body ──serde──► CreateOrderRequest ──validate()──► ValidCreateOrder
//!                           (Options)                      (no Options)
//! ```

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::limits::BusinessLimits;
use crate::quantity::Quantity;
use crate::types::{MenuCategory, OrderStatus, Unit};
use crate::validation::{
    validate_date, validate_lookup_name, validate_name, validate_non_negative_quantity,
    validate_per_serving, validate_positive, validate_price_cents, validate_quantity,
    validate_status_label, validate_stock, validate_time, ValidationResult,
};

// =============================================================================
// Order Requests
// =============================================================================

/// One requested line: a menu item addressed by its display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRequest {
    pub name: String,
    pub quantity: i64,
}

impl ItemRequest {
    pub fn new(name: impl Into<String>, quantity: i64) -> Self {
        Self {
            name: name.into(),
            quantity,
        }
    }
}

fn validate_items(items: &[ItemRequest], limits: &BusinessLimits) -> ValidationResult<Vec<ItemRequest>> {
    if items.len() > limits.max_order_lines {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: limits.max_order_lines as i64,
        });
    }

    items
        .iter()
        .map(|item| {
            validate_lookup_name("item name", &item.name)?;
            validate_quantity(item.quantity, limits.max_item_quantity)?;
            Ok(item.clone())
        })
        .collect()
}

/// Body of "create order".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub customer_name: Option<String>,
    pub table_number: Option<i64>,
    pub items: Option<Vec<ItemRequest>>,
}

/// A create request that passed shape validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidCreateOrder {
    pub customer_name: String,
    pub table_number: i64,
    pub items: Vec<ItemRequest>,
}

impl CreateOrderRequest {
    /// Checks required fields, then every line.
    ///
    /// ## Returns
    /// - `Required` for a missing/blank customer name, a missing table
    ///   number, or an absent/empty item list
    /// - `MustBePositive` / `OutOfRange` for a bad line quantity
    pub fn validate(&self, limits: &BusinessLimits) -> ValidationResult<ValidCreateOrder> {
        let customer_name = validate_name(
            "customerName",
            self.customer_name.as_deref().unwrap_or_default(),
        )?;
        let table_number = self
            .table_number
            .ok_or_else(|| ValidationError::required("tableNumber"))?;
        let items = match self.items.as_deref() {
            Some(items) if !items.is_empty() => validate_items(items, limits)?,
            _ => return Err(ValidationError::required("items")),
        };

        Ok(ValidCreateOrder {
            customer_name,
            table_number,
            items,
        })
    }
}

/// Body of "update order". `items` is the full replacement line set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    pub items: Option<Vec<ItemRequest>>,
    pub customer_name: Option<String>,
    pub status: Option<OrderStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidUpdateOrder {
    /// May be empty: the order then keeps no lines and everything is restocked.
    pub items: Vec<ItemRequest>,
    pub customer_name: Option<String>,
    pub status: Option<OrderStatus>,
}

impl UpdateOrderRequest {
    pub fn validate(&self, limits: &BusinessLimits) -> ValidationResult<ValidUpdateOrder> {
        let items = self
            .items
            .as_deref()
            .ok_or_else(|| ValidationError::required("items"))?;
        let items = validate_items(items, limits)?;

        let customer_name = self
            .customer_name
            .as_deref()
            .map(|name| validate_name("customerName", name))
            .transpose()?;
        if let Some(status) = &self.status {
            validate_status_label(status.as_str())?;
        }

        Ok(ValidUpdateOrder {
            items,
            customer_name,
            status: self.status.clone(),
        })
    }
}

// =============================================================================
// Catalog Requests
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTable {
    pub table_number: i64,
    pub seats: i64,
}

impl NewTable {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_positive("table_number", self.table_number)?;
        validate_positive("seats", self.seats)
    }
}

/// Writable table fields. Status is owned by the order workflow.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableUpdate {
    pub seats: Option<i64>,
}

impl TableUpdate {
    pub fn validate(&self) -> ValidationResult<()> {
        match self.seats {
            Some(seats) => validate_positive("seats", seats),
            None => Err(ValidationError::required("seats")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInventoryItem {
    pub name: String,
    pub quantity: Quantity,
    pub unit: Unit,
    /// Defaults to 5 units.
    pub threshold: Option<Quantity>,
}

impl NewInventoryItem {
    /// Returns the trimmed name.
    pub fn validate(&self) -> ValidationResult<String> {
        let name = validate_name("name", &self.name)?;
        validate_non_negative_quantity("quantity", self.quantity)?;
        if let Some(threshold) = self.threshold {
            validate_non_negative_quantity("threshold", threshold)?;
        }
        Ok(name)
    }
}

/// Recipe line on a new dish, addressed by ingredient name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientRequest {
    pub name: String,
    pub per_serving: Quantity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMenuItem {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: MenuCategory,
    pub price_cents: i64,
    #[serde(default)]
    pub ingredients: Vec<IngredientRequest>,
    #[serde(default)]
    pub stock: i64,
}

impl NewMenuItem {
    /// Returns the trimmed name.
    pub fn validate(&self) -> ValidationResult<String> {
        let name = validate_name("name", &self.name)?;
        validate_price_cents(self.price_cents)?;
        validate_stock(self.stock)?;
        for ingredient in &self.ingredients {
            validate_lookup_name("ingredient name", &ingredient.name)?;
            validate_per_serving(ingredient.per_serving)?;
        }
        Ok(name)
    }
}

/// Writable menu item fields. Name and recipe are fixed once created.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemUpdate {
    pub price_cents: Option<i64>,
    pub description: Option<String>,
    pub stock: Option<i64>,
}

impl MenuItemUpdate {
    pub fn validate(&self) -> ValidationResult<()> {
        if self.price_cents.is_none() && self.description.is_none() && self.stock.is_none() {
            return Err(ValidationError::required("priceCents, description or stock"));
        }
        if let Some(price) = self.price_cents {
            validate_price_cents(price)?;
        }
        if let Some(stock) = self.stock {
            validate_stock(stock)?;
        }
        Ok(())
    }
}

// =============================================================================
// Reservation Requests
// =============================================================================

/// Body of "create reservation". Date is `YYYY-MM-DD`, time is `HH:MM`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationRequest {
    pub customer_name: Option<String>,
    pub guests: Option<i64>,
    pub table_number: Option<i64>,
    pub date: Option<String>,
    pub time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidReservation {
    pub customer_name: String,
    pub guests: i64,
    pub table_number: i64,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

impl CreateReservationRequest {
    pub fn validate(&self) -> ValidationResult<ValidReservation> {
        let customer_name = validate_name(
            "customerName",
            self.customer_name.as_deref().unwrap_or_default(),
        )?;
        let guests = self.guests.ok_or_else(|| ValidationError::required("guests"))?;
        validate_positive("guests", guests)?;
        let table_number = self
            .table_number
            .ok_or_else(|| ValidationError::required("tableNumber"))?;
        let date = validate_date(
            self.date
                .as_deref()
                .ok_or_else(|| ValidationError::required("date"))?,
        )?;
        let time = validate_time(
            self.time
                .as_deref()
                .ok_or_else(|| ValidationError::required("time"))?,
        )?;

        Ok(ValidReservation {
            customer_name,
            guests,
            table_number,
            date,
            time,
        })
    }
}

/// Writable reservation fields. The table is fixed once booked.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationUpdate {
    pub customer_name: Option<String>,
    pub guests: Option<i64>,
    pub date: Option<String>,
    pub time: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidReservationUpdate {
    pub customer_name: Option<String>,
    pub guests: Option<i64>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
}

impl ReservationUpdate {
    pub fn validate(&self) -> ValidationResult<ValidReservationUpdate> {
        if self.customer_name.is_none()
            && self.guests.is_none()
            && self.date.is_none()
            && self.time.is_none()
        {
            return Err(ValidationError::required("customerName, guests, date or time"));
        }
        if let Some(guests) = self.guests {
            validate_positive("guests", guests)?;
        }

        Ok(ValidReservationUpdate {
            customer_name: self
                .customer_name
                .as_deref()
                .map(|name| validate_name("customerName", name))
                .transpose()?,
            guests: self.guests,
            date: self.date.as_deref().map(validate_date).transpose()?,
            time: self.time.as_deref().map(validate_time).transpose()?,
        })
    }
}

// =============================================================================
// Report Requests
// =============================================================================

/// Query of the sales report. Both days are inclusive.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesReportQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl SalesReportQuery {
    /// Returns `(start, end)`.
    pub fn validate(&self) -> ValidationResult<(NaiveDate, NaiveDate)> {
        let start = self
            .start_date
            .as_deref()
            .ok_or_else(|| ValidationError::required("startDate"))?;
        let end = self
            .end_date
            .as_deref()
            .ok_or_else(|| ValidationError::required("endDate"))?;
        let (start, end) = (validate_date(start)?, validate_date(end)?);
        if start > end {
            return Err(ValidationError::InvalidFormat {
                field: "endDate".to_string(),
                reason: "must not be before startDate".to_string(),
            });
        }
        Ok((start, end))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
