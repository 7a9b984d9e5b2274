//! # Domain Types
//!
//! Core domain types used throughout the Bistro back-office.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    MenuItem     │   │  InventoryItem  │   │     Table       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  name (unique)  │   │  name (unique)  │   │  table_number   │       │
//! │  │  price_cents    │   │  quantity       │   │  seats          │       │
//! │  │  ingredients ───┼──►│  unit           │   │  status         │       │
//! │  │  stock          │   │  threshold      │   └────────▲────────┘       │
//! │  └────────▲────────┘   └─────────────────┘            │                │
//! │           │ snapshot                                   │ table_number   │
//! │  ┌────────┴────────┐   ┌─────────────────┐            │                │
//! │  │    OrderLine    │◄──┤      Order      ├────────────┘                │
//! │  │  name_snapshot  │   │  total_cents    │                             │
//! │  │  unit_price     │   │  status (open)  │                             │
//! │  │  ingredients    │   │  owner_id       │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4, immutable, used for relations
//! - Business key: menu item name, ingredient name, table number

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money::Money;
use crate::quantity::Quantity;

// =============================================================================
// Principal
// =============================================================================

/// Role of the authenticated caller. Route gating by role happens outside
/// this workspace; the role travels along for logging and future checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    User,
}

/// The authenticated requester, as handed over by the identity layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: String,
    pub role: Role,
}

impl Principal {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }
}

// =============================================================================
// Table
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum TableStatus {
    Available,
    Occupied,
}

impl Default for TableStatus {
    fn default() -> Self {
        TableStatus::Available
    }
}

/// A dining table, addressed by its business key `table_number`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub id: String,
    pub table_number: i64,
    pub seats: i64,
    /// Only the order and reservation workflows move this between states.
    pub status: TableStatus,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Table {
    #[inline]
    pub fn is_available(&self) -> bool {
        self.status == TableStatus::Available
    }

    #[inline]
    pub fn is_owned_by(&self, principal: &Principal) -> bool {
        self.owner_id == principal.user_id
    }
}

// =============================================================================
// Inventory
// =============================================================================

/// Unit an inventory quantity is measured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Kg,
    G,
    Litre,
    Ml,
    Pcs,
}

impl Unit {
    pub const ALL: [Unit; 5] = [Unit::Kg, Unit::G, Unit::Litre, Unit::Ml, Unit::Pcs];

    pub const fn as_str(self) -> &'static str {
        match self {
            Unit::Kg => "kg",
            Unit::G => "g",
            Unit::Litre => "litre",
            Unit::Ml => "ml",
            Unit::Pcs => "pcs",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw ingredient with a counted quantity on hand.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: String,
    pub name: String,
    /// Never negative.
    pub quantity: Quantity,
    pub unit: Unit,
    /// Reporting threshold. Not a floor for deductions.
    pub threshold: Quantity,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InventoryItem {
    /// `quantity < threshold`.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.quantity < self.threshold
    }
}

// =============================================================================
// Menu
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
pub enum MenuCategory {
    Appetizer,
    #[serde(rename = "Main Course")]
    MainCourse,
    Pizza,
    Dessert,
    Beverage,
}

/// Amount of one ingredient consumed by one serving of a dish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientRequirement {
    pub ingredient_id: String,
    pub per_serving: Quantity,
}

/// A dish that can be ordered by name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: MenuCategory,
    pub price_cents: i64,
    /// Recipe, in declaration order. May be empty.
    pub ingredients: Vec<IngredientRequirement>,
    /// Servings left, independent of ingredient inventory.
    pub stock: i64,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MenuItem {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    #[inline]
    pub fn is_owned_by(&self, principal: &Principal) -> bool {
        self.owner_id == principal.user_id
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// Order status label.
///
/// The set is open: any non-empty label is accepted and stored as-is.
/// The named variants are the ones the back-office itself produces.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
    Other(String),
}

impl OrderStatus {
    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::InProgress => "In Progress",
            OrderStatus::Completed => "Completed",
            OrderStatus::Cancelled => "Cancelled",
            OrderStatus::Other(label) => label,
        }
    }
}

impl From<String> for OrderStatus {
    fn from(label: String) -> Self {
        match label.as_str() {
            "Pending" => OrderStatus::Pending,
            "In Progress" => OrderStatus::InProgress,
            "Completed" => OrderStatus::Completed,
            "Cancelled" => OrderStatus::Cancelled,
            _ => OrderStatus::Other(label),
        }
    }
}

impl From<&str> for OrderStatus {
    fn from(label: &str) -> Self {
        OrderStatus::from(label.to_string())
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> String {
        match status {
            OrderStatus::Other(label) => label,
            named => named.as_str().to_string(),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Order
// =============================================================================

/// A line item as persisted on an order.
/// Uses the snapshot pattern to freeze menu data at time of ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub menu_item_id: String,
    /// Menu item name at time of ordering (frozen).
    pub name_snapshot: String,
    /// Unit price in cents at time of ordering (frozen).
    pub unit_price_cents: i64,
    pub quantity: i64,
    /// Recipe at time of ordering (frozen). Restocks use this, not the
    /// current recipe.
    pub ingredients_snapshot: Vec<IngredientRequirement>,
}

/// A customer order seated at a table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub customer_name: String,
    pub table_number: i64,
    pub items: Vec<OrderLine>,
    /// Σ unit_price × quantity over `items`.
    pub total_cents: i64,
    pub status: OrderStatus,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    #[inline]
    pub fn is_owned_by(&self, principal: &Principal) -> bool {
        self.owner_id == principal.user_id
    }
}

// =============================================================================
// Reservation
// =============================================================================

/// A booked table. Creating one occupies the table, cancelling it frees
/// the table again.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: String,
    pub customer_name: String,
    pub guests: i64,
    pub table_number: i64,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    #[inline]
    pub fn is_owned_by(&self, principal: &Principal) -> bool {
        self.owner_id == principal.user_id
    }
}

// =============================================================================
// Reports
// =============================================================================

/// Sales of one calendar day (UTC).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesDay {
    pub day: NaiveDate,
    pub total_cents: i64,
    pub order_count: i64,
}

impl SalesDay {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// Servings ordered of one dish across all orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopularDish {
    pub name: String,
    pub total_ordered: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================
