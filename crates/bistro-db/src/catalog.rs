//! # Catalog
//!
//! Maintenance of the reference data orders point at: dining tables,
//! inventory and the menu.
//!
//! Writes go through a unit of work like the order workflow, so a catalog
//! change never interleaves with an order's check-then-decrement.
//! Duplicate keys are checked up front for a readable error; the UNIQUE
//! constraints still catch anything that slips past.

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};
use crate::pool::Database;
use crate::repository::{InventoryRepository, MenuRepository, TableRepository};
use crate::resolver::resolve_ingredients;
use crate::unit_of_work::UnitOfWork;
use crate::workflow::finish;
use bistro_core::requests::{MenuItemUpdate, NewInventoryItem, NewMenuItem, NewTable, TableUpdate};
use bistro_core::validation::validate_non_negative_quantity;
use bistro_core::{
    BusinessLimits, CoreError, InventoryItem, MenuItem, Principal, Quantity, Table, TableStatus,
    ValidationError, DEFAULT_LOW_STOCK_THRESHOLD_MILLI,
};

/// Tables, inventory and menu maintenance.
#[derive(Debug, Clone)]
pub struct Catalog {
    db: Database,
    limits: BusinessLimits,
}

impl Catalog {
    pub fn new(db: Database, limits: BusinessLimits) -> Self {
        Catalog { db, limits }
    }

    // =========================================================================
    // Tables
    // =========================================================================

    /// Adds a dining table. New tables are always available.
    pub async fn create_table(&self, principal: &Principal, new: NewTable) -> ServiceResult<Table> {
        new.validate()?;
        let max = self.limits.max_tables;

        let mut uow = self.db.begin().await?;
        let outcome = async {
            if uow.tables().count().await? >= max as i64 {
                return Err(CoreError::LimitReached {
                    what: "tables".to_string(),
                    max,
                }
                .into());
            }
            if uow.tables().find_by_number(new.table_number).await?.is_some() {
                return Err(
                    ValidationError::duplicate("tableNumber", new.table_number.to_string()).into(),
                );
            }

            let now = Utc::now();
            let table = Table {
                id: Uuid::new_v4().to_string(),
                table_number: new.table_number,
                seats: new.seats,
                status: TableStatus::Available,
                owner_id: principal.user_id.clone(),
                created_at: now,
                updated_at: now,
            };
            uow.tables().insert(&table).await?;
            Ok::<_, ServiceError>(table)
        }
        .await;
        let table = finish(uow, outcome, "create_table").await?;

        info!(table_number = table.table_number, seats = table.seats, "Table created");
        Ok(table)
    }

    /// Changes the seat count. Status belongs to the order workflow.
    pub async fn update_table(
        &self,
        principal: &Principal,
        id: &str,
        update: TableUpdate,
    ) -> ServiceResult<Table> {
        update.validate()?;

        let mut uow = self.db.begin().await?;
        let outcome = async {
            let mut table = load_owned_table(&mut uow, principal, id).await?;
            if let Some(seats) = update.seats {
                uow.tables().update_seats(id, seats).await?;
                table.seats = seats;
                table.updated_at = Utc::now();
            }
            Ok::<_, ServiceError>(table)
        }
        .await;
        let table = finish(uow, outcome, "update_table").await?;

        debug!(table_number = table.table_number, seats = table.seats, "Table updated");
        Ok(table)
    }

    /// Removes a table that has no open order.
    ///
    /// ## Returns
    /// - `TableInUse` while the table is occupied
    pub async fn delete_table(&self, principal: &Principal, id: &str) -> ServiceResult<Table> {
        let mut uow = self.db.begin().await?;
        let outcome = async {
            let table = load_owned_table(&mut uow, principal, id).await?;
            if !uow.tables().delete_available(id).await? {
                return Err(CoreError::TableInUse(table.table_number).into());
            }
            Ok::<_, ServiceError>(table)
        }
        .await;
        let table = finish(uow, outcome, "delete_table").await?;

        info!(table_number = table.table_number, "Table deleted");
        Ok(table)
    }

    pub async fn get_table(&self, id: &str) -> ServiceResult<Table> {
        let mut conn = self.db.acquire().await?;
        let table = TableRepository::new(&mut *conn)
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::not_found("Table", id))?;
        Ok(table)
    }

    pub async fn list_tables(&self) -> ServiceResult<Vec<Table>> {
        let mut conn = self.db.acquire().await?;
        Ok(TableRepository::new(&mut *conn).list().await?)
    }

    // =========================================================================
    // Inventory
    // =========================================================================

    /// Adds an ingredient. The threshold defaults to 5 units.
    pub async fn create_inventory_item(
        &self,
        principal: &Principal,
        new: NewInventoryItem,
    ) -> ServiceResult<InventoryItem> {
        let name = new.validate()?;

        let mut uow = self.db.begin().await?;
        let outcome = async {
            if uow.inventory().find_by_name(&name).await?.is_some() {
                return Err(ValidationError::duplicate("name", name.as_str()).into());
            }

            let now = Utc::now();
            let item = InventoryItem {
                id: Uuid::new_v4().to_string(),
                name: name.clone(),
                quantity: new.quantity,
                unit: new.unit,
                threshold: new
                    .threshold
                    .unwrap_or(Quantity::from_milli(DEFAULT_LOW_STOCK_THRESHOLD_MILLI)),
                owner_id: principal.user_id.clone(),
                created_at: now,
                updated_at: now,
            };
            uow.inventory().insert(&item).await?;
            Ok::<_, ServiceError>(item)
        }
        .await;
        let item = finish(uow, outcome, "create_inventory_item").await?;

        info!(name = %item.name, quantity = %item.quantity, unit = %item.unit, "Ingredient created");
        Ok(item)
    }

    /// Adds a delivery to an ingredient's quantity.
    pub async fn restock_inventory(&self, id: &str, amount: Quantity) -> ServiceResult<InventoryItem> {
        if !amount.is_positive() {
            return Err(ValidationError::MustBePositive {
                field: "amount".to_string(),
            }
            .into());
        }

        let mut uow = self.db.begin().await?;
        let outcome = async {
            let current = reload_inventory_item(&mut uow, id).await?;
            if current.quantity.checked_add(amount).is_none() {
                return Err(ValidationError::too_large("quantity").into());
            }
            if !uow.inventory().restock(id, amount).await? {
                return Err(CoreError::not_found("Ingredient", id).into());
            }
            reload_inventory_item(&mut uow, id).await
        }
        .await;
        let item = finish(uow, outcome, "restock_inventory").await?;

        info!(name = %item.name, added = %amount, quantity = %item.quantity, "Ingredient restocked");
        Ok(item)
    }

    pub async fn set_threshold(&self, id: &str, threshold: Quantity) -> ServiceResult<InventoryItem> {
        validate_non_negative_quantity("threshold", threshold)?;

        let mut uow = self.db.begin().await?;
        let outcome = async {
            if !uow.inventory().set_threshold(id, threshold).await? {
                return Err(CoreError::not_found("Ingredient", id).into());
            }
            reload_inventory_item(&mut uow, id).await
        }
        .await;
        let item = finish(uow, outcome, "set_threshold").await?;

        debug!(name = %item.name, threshold = %item.threshold, "Low-stock threshold set");
        Ok(item)
    }

    /// Ingredients strictly below their threshold.
    pub async fn low_stock(&self) -> ServiceResult<Vec<InventoryItem>> {
        let mut conn = self.db.acquire().await?;
        Ok(InventoryRepository::new(&mut *conn).low_stock().await?)
    }

    pub async fn get_inventory_item(&self, id: &str) -> ServiceResult<InventoryItem> {
        let mut conn = self.db.acquire().await?;
        let item = InventoryRepository::new(&mut *conn)
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::not_found("Ingredient", id))?;
        Ok(item)
    }

    pub async fn list_inventory(&self) -> ServiceResult<Vec<InventoryItem>> {
        let mut conn = self.db.acquire().await?;
        Ok(InventoryRepository::new(&mut *conn).list().await?)
    }

    // =========================================================================
    // Menu
    // =========================================================================

    /// Adds a dish. Recipe lines name ingredients, which must already exist.
    ///
    /// ## Returns
    /// - `LimitReached` when the menu already holds `max_menu_items` dishes
    /// - `IngredientNotFound` for the first unknown recipe ingredient
    pub async fn create_menu_item(
        &self,
        principal: &Principal,
        new: NewMenuItem,
    ) -> ServiceResult<MenuItem> {
        let name = new.validate()?;
        let max = self.limits.max_menu_items;

        let mut uow = self.db.begin().await?;
        let outcome = async {
            if uow.menu().count().await? >= max as i64 {
                return Err(CoreError::LimitReached {
                    what: "menu items".to_string(),
                    max,
                }
                .into());
            }
            if uow.menu().find_by_name(&name).await?.is_some() {
                return Err(ValidationError::duplicate("name", name.as_str()).into());
            }
            let ingredients = resolve_ingredients(uow.conn(), &new.ingredients).await?;

            let now = Utc::now();
            let item = MenuItem {
                id: Uuid::new_v4().to_string(),
                name: name.clone(),
                description: new.description.trim().to_string(),
                category: new.category,
                price_cents: new.price_cents,
                ingredients,
                stock: new.stock,
                owner_id: principal.user_id.clone(),
                created_at: now,
                updated_at: now,
            };
            uow.menu().insert(&item).await?;
            Ok::<_, ServiceError>(item)
        }
        .await;
        let item = finish(uow, outcome, "create_menu_item").await?;

        info!(
            name = %item.name,
            price = %item.price(),
            stock = item.stock,
            ingredients = item.ingredients.len(),
            "Menu item created"
        );
        Ok(item)
    }

    /// Changes price, description or stock. Orders already placed keep
    /// the price and recipe they were placed with.
    pub async fn update_menu_item(
        &self,
        principal: &Principal,
        id: &str,
        update: MenuItemUpdate,
    ) -> ServiceResult<MenuItem> {
        update.validate()?;

        let mut uow = self.db.begin().await?;
        let outcome = async {
            let item = uow
                .menu()
                .find_by_id(id)
                .await?
                .ok_or_else(|| CoreError::not_found("Menu item", id))?;
            if !item.is_owned_by(principal) {
                return Err(CoreError::forbidden("Menu item", id, principal.user_id.as_str()).into());
            }

            uow.menu()
                .update_fields(
                    id,
                    update.price_cents,
                    update.description.as_deref().map(str::trim),
                    update.stock,
                )
                .await?;
            let item = uow
                .menu()
                .find_by_id(id)
                .await?
                .ok_or_else(|| CoreError::not_found("Menu item", id))?;
            Ok::<_, ServiceError>(item)
        }
        .await;
        let item = finish(uow, outcome, "update_menu_item").await?;

        info!(name = %item.name, price = %item.price(), stock = item.stock, "Menu item updated");
        Ok(item)
    }

    pub async fn get_menu_item(&self, id: &str) -> ServiceResult<MenuItem> {
        let mut conn = self.db.acquire().await?;
        let item = MenuRepository::new(&mut *conn)
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::not_found("Menu item", id))?;
        Ok(item)
    }

    pub async fn list_menu(&self) -> ServiceResult<Vec<MenuItem>> {
        let mut conn = self.db.acquire().await?;
        Ok(MenuRepository::new(&mut *conn).list().await?)
    }
}

async fn load_owned_table(
    uow: &mut UnitOfWork,
    principal: &Principal,
    id: &str,
) -> ServiceResult<Table> {
    let table = uow
        .tables()
        .find_by_id(id)
        .await?
        .ok_or_else(|| CoreError::not_found("Table", id))?;
    if !table.is_owned_by(principal) {
        return Err(CoreError::forbidden("Table", id, principal.user_id.as_str()).into());
    }
    Ok(table)
}

async fn reload_inventory_item(uow: &mut UnitOfWork, id: &str) -> ServiceResult<InventoryItem> {
    let item = uow
        .inventory()
        .find_by_id(id)
        .await?
        .ok_or_else(|| CoreError::not_found("Ingredient", id))?;
    Ok(item)
}
