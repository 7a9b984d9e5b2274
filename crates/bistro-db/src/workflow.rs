//! # Order Workflow
//!
//! Creates, changes and removes orders. Every mutation runs inside one
//! unit of work: either all of its effects (stock, table status, order
//! rows) become visible together, or none do.
//!
//! ## Create
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CreateOrderRequest                                                     │
//! │       │ validate (no transaction yet)                                   │
//! │       ▼                                                                 │
//! │  begin ─► table by number ─► resolve names ─► stock ledger (+deltas)   │
//! │       ─► total ─► table available → occupied ─► insert order ─► commit │
//! │                                                                         │
//! │  Any error on the way: abort, nothing was written.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Update
//! ```text
//! stored lines (snapshots)      replacement items
//!   Margherita × 3                Margherita × 1
//!          └────────── compute_deltas ──────────┘
//!                           │
//!                 Margherita −2 (restock 2 × recipe, 2 servings)
//! ```

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};
use crate::ledger::StockLedger;
use crate::pool::Database;
use crate::repository::OrderRepository;
use crate::resolver::resolve_menu_items;
use crate::unit_of_work::UnitOfWork;
use bistro_core::ledger::{compute_deltas, consumption_lines, merge_lines, order_total};
use bistro_core::requests::{CreateOrderRequest, UpdateOrderRequest, ValidCreateOrder, ValidUpdateOrder};
use bistro_core::validation::validate_status_label;
use bistro_core::{BusinessLimits, CoreError, Order, OrderLine, OrderStatus, Principal};

/// Commits on success, aborts on failure.
pub(crate) async fn finish<T>(
    uow: UnitOfWork,
    outcome: ServiceResult<T>,
    operation: &'static str,
) -> ServiceResult<T> {
    match outcome {
        Ok(value) => {
            uow.commit().await?;
            Ok(value)
        }
        Err(err) => {
            warn!(operation, kind = ?err.kind(), error = %err, "Unit of work aborted");
            if let Err(rollback) = uow.abort().await {
                warn!(operation, error = %rollback, "Abort failed; connection discarded");
            }
            Err(err)
        }
    }
}

/// Order lifecycle operations.
#[derive(Debug, Clone)]
pub struct OrderWorkflow {
    db: Database,
    limits: BusinessLimits,
}

impl OrderWorkflow {
    pub fn new(db: Database, limits: BusinessLimits) -> Self {
        OrderWorkflow { db, limits }
    }

    pub fn limits(&self) -> &BusinessLimits {
        &self.limits
    }

    // =========================================================================
    // Create
    // =========================================================================

    /// Places a new order on an available table.
    ///
    /// ## Returns
    /// - `MissingField` / `Invalid` for a malformed request (no transaction)
    /// - `TableNotFound`, `MenuItemNotFound` when a reference does not resolve
    /// - `TableOccupied` when the table is taken, including by a concurrent
    ///   create that committed first
    /// - `InsufficientIngredient` / `InsufficientDishStock` on a shortfall
    pub async fn create_order(
        &self,
        principal: &Principal,
        request: CreateOrderRequest,
    ) -> ServiceResult<Order> {
        let request = request.validate(&self.limits)?;
        debug!(
            table_number = request.table_number,
            lines = request.items.len(),
            "create_order"
        );

        let mut uow = self.db.begin().await?;
        let outcome = place_order(&mut uow, principal, request).await;
        let order = finish(uow, outcome, "create_order").await?;

        info!(
            order_id = %order.id,
            table_number = order.table_number,
            total = %order.total(),
            lines = order.items.len(),
            "Order created"
        );
        Ok(order)
    }

    // =========================================================================
    // Update
    // =========================================================================

    /// Replaces the line set of an order and settles the stock difference.
    ///
    /// `items` is the full replacement: lines left out are restocked in full.
    /// `customer_name` and `status` are taken as given when present.
    pub async fn update_order(
        &self,
        principal: &Principal,
        order_id: &str,
        request: UpdateOrderRequest,
    ) -> ServiceResult<Order> {
        let request = request.validate(&self.limits)?;
        debug!(order_id, lines = request.items.len(), "update_order");

        let mut uow = self.db.begin().await?;
        let outcome = revise_order(&mut uow, principal, order_id, request).await;
        let order = finish(uow, outcome, "update_order").await?;

        info!(
            order_id = %order.id,
            total = %order.total(),
            lines = order.items.len(),
            status = %order.status,
            "Order updated"
        );
        Ok(order)
    }

    /// Replaces the status label. No stock side effects.
    pub async fn update_status(
        &self,
        principal: &Principal,
        order_id: &str,
        status: OrderStatus,
    ) -> ServiceResult<Order> {
        validate_status_label(status.as_str())?;

        let mut uow = self.db.begin().await?;
        let outcome = async {
            let mut order = load_owned(&mut uow, principal, order_id).await?;
            order.status = status;
            order.updated_at = Utc::now();
            uow.orders()
                .update_status(&order.id, &order.status, order.updated_at)
                .await?;
            Ok::<_, ServiceError>(order)
        }
        .await;
        let order = finish(uow, outcome, "update_status").await?;

        info!(order_id = %order.id, status = %order.status, "Order status changed");
        Ok(order)
    }

    // =========================================================================
    // Delete
    // =========================================================================

    /// Removes an order and frees its table.
    ///
    /// Consumed stock is not returned: the dishes are assumed to have been
    /// served. Reduce the order to no lines first to restock.
    pub async fn delete_order(&self, principal: &Principal, order_id: &str) -> ServiceResult<Order> {
        let mut uow = self.db.begin().await?;
        let outcome = async {
            let order = load_owned(&mut uow, principal, order_id).await?;
            if !uow.tables().release(order.table_number).await? {
                debug!(
                    table_number = order.table_number,
                    "Table was not occupied; nothing to release"
                );
            }
            uow.orders().delete(&order.id).await?;
            Ok::<_, ServiceError>(order)
        }
        .await;
        let order = finish(uow, outcome, "delete_order").await?;

        info!(order_id = %order.id, table_number = order.table_number, "Order deleted");
        Ok(order)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub async fn get_order(&self, order_id: &str) -> ServiceResult<Order> {
        let mut conn = self.db.acquire().await?;
        let order = OrderRepository::new(&mut *conn)
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))?;
        Ok(order)
    }

    /// Orders owned by the caller, newest first.
    pub async fn list_orders(&self, principal: &Principal) -> ServiceResult<Vec<Order>> {
        let mut conn = self.db.acquire().await?;
        let orders = OrderRepository::new(&mut *conn)
            .list_by_owner(&principal.user_id)
            .await?;
        Ok(orders)
    }
}

async fn place_order(
    uow: &mut UnitOfWork,
    principal: &Principal,
    request: ValidCreateOrder,
) -> ServiceResult<Order> {
    let table_number = request.table_number;
    let table = uow
        .tables()
        .find_by_number(table_number)
        .await?
        .ok_or(CoreError::TableNotFound(table_number))?;
    if !table.is_available() {
        return Err(CoreError::TableOccupied(table_number).into());
    }

    let lines = merge_lines(resolve_menu_items(uow.conn(), &request.items).await?);
    StockLedger::validate_and_apply(uow, &consumption_lines(&lines)).await?;
    let total = order_total(&lines)?;

    if !uow.tables().occupy(table_number).await? {
        return Err(CoreError::TableOccupied(table_number).into());
    }

    let now = Utc::now();
    let order = Order {
        id: Uuid::new_v4().to_string(),
        customer_name: request.customer_name,
        table_number,
        items: lines.iter().map(|line| line.to_order_line()).collect(),
        total_cents: total.cents(),
        status: OrderStatus::InProgress,
        owner_id: principal.user_id.clone(),
        created_at: now,
        updated_at: now,
    };
    uow.orders().insert(&order).await?;

    Ok(order)
}

async fn revise_order(
    uow: &mut UnitOfWork,
    principal: &Principal,
    order_id: &str,
    request: ValidUpdateOrder,
) -> ServiceResult<Order> {
    let mut order = load_owned(uow, principal, order_id).await?;

    let replacement = merge_lines(resolve_menu_items(uow.conn(), &request.items).await?);
    let deltas = compute_deltas(&order.items, &replacement);
    StockLedger::validate_and_apply(uow, &deltas).await?;

    let items: Vec<OrderLine> = replacement.iter().map(|line| line.to_order_line()).collect();
    uow.orders().replace_lines(&order.id, &items).await?;

    order.items = items;
    order.total_cents = order_total(&replacement)?.cents();
    if let Some(customer_name) = request.customer_name {
        order.customer_name = customer_name;
    }
    if let Some(status) = request.status {
        order.status = status;
    }
    order.updated_at = Utc::now();

    uow.orders()
        .update_header(
            &order.id,
            &order.customer_name,
            order.total_cents,
            &order.status,
            order.updated_at,
        )
        .await?;

    Ok(order)
}

/// Loads an order the caller may change.
async fn load_owned(
    uow: &mut UnitOfWork,
    principal: &Principal,
    order_id: &str,
) -> ServiceResult<Order> {
    let order = uow
        .orders()
        .find_by_id(order_id)
        .await?
        .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))?;
    if !order.is_owned_by(principal) {
        return Err(CoreError::forbidden("Order", order_id, principal.user_id.as_str()).into());
    }
    Ok(order)
}
