//! # Stock Ledger
//!
//! Validates and applies the stock movements of one order change inside
//! the caller's unit of work.
//!
//! ## Two Phases
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  LedgerLine[]                                                           │
//! │       │                                                                 │
//! │       ▼  aggregate (pure, bistro-core)                                 │
//! │  flour +0.6 kg, cheese +0.3 kg, Margherita +3                          │
//! │       │                                                                 │
//! │       ▼  PHASE 1: validate every positive net, write nothing           │
//! │  flour: 1.0 on hand ≥ 0.6 ✓   cheese: 0.2 < 0.3 ✗ → InsufficientStock  │
//! │       │                                                                 │
//! │       ▼  PHASE 2: apply (only reached when phase 1 passed)             │
//! │  guarded decrements for positive nets, increments for negative nets   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! Phase 2 repeats the check in SQL (`WHERE quantity_milli >= net`), so it
//! cannot overdraw even if phase 1 read a stale value.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, warn};

use crate::error::ServiceResult;
use crate::unit_of_work::UnitOfWork;
use bistro_core::ledger::{
    aggregate_consumption, aggregate_dishes, check_dish, check_ingredient, DishDelta, LedgerLine,
};
use bistro_core::{CoreError, Quantity};

/// Net movements of one change.
struct StockMovement {
    /// ingredient id → net consumption (negative = returned)
    ingredients: BTreeMap<String, Quantity>,
    dishes: Vec<DishDelta>,
}

impl StockMovement {
    fn is_empty(&self) -> bool {
        self.ingredients.is_empty() && self.dishes.is_empty()
    }
}

/// Applies ledger lines against inventory and dish counters.
pub struct StockLedger;

impl StockLedger {
    /// Validates every consumption, then applies every movement.
    ///
    /// ## Returns
    /// - `InsufficientIngredient` / `InsufficientDishStock` for the first
    ///   shortfall; nothing has been written when this is returned from
    ///   phase 1, and the caller's unit of work must be dropped otherwise
    /// - `TooLarge` when the aggregated consumption overflows
    pub async fn validate_and_apply(uow: &mut UnitOfWork, lines: &[LedgerLine]) -> ServiceResult<()> {
        let movement = StockMovement {
            ingredients: aggregate_consumption(lines)?,
            dishes: aggregate_dishes(lines),
        };
        if movement.is_empty() {
            debug!("No stock movement");
            return Ok(());
        }

        let names = Self::validate(uow, &movement).await?;
        Self::apply(uow, &movement, &names).await?;

        debug!(
            ingredients = movement.ingredients.len(),
            dishes = movement.dishes.len(),
            "Stock movement applied"
        );
        Ok(())
    }

    /// Phase 1. Returns ingredient id → name for error reporting.
    async fn validate(
        uow: &mut UnitOfWork,
        movement: &StockMovement,
    ) -> ServiceResult<HashMap<String, String>> {
        let mut names = HashMap::new();

        for (ingredient_id, net) in &movement.ingredients {
            let item = uow
                .inventory()
                .find_by_id(ingredient_id)
                .await?
                .ok_or_else(|| CoreError::not_found("Ingredient", ingredient_id.as_str()))?;
            if net.is_positive() {
                check_ingredient(&item.name, item.quantity, *net)?;
            }
            names.insert(item.id, item.name);
        }

        for dish in movement.dishes.iter().filter(|d| d.delta > 0) {
            let stock = uow
                .menu()
                .stock_of(&dish.menu_item_id)
                .await?
                .ok_or_else(|| CoreError::MenuItemNotFound(dish.dish_name.clone()))?;
            check_dish(&dish.dish_name, stock, dish.delta)?;
        }

        Ok(names)
    }

    /// Phase 2.
    async fn apply(
        uow: &mut UnitOfWork,
        movement: &StockMovement,
        names: &HashMap<String, String>,
    ) -> ServiceResult<()> {
        for (ingredient_id, net) in &movement.ingredients {
            let name = names
                .get(ingredient_id)
                .map(String::as_str)
                .unwrap_or(ingredient_id.as_str());

            if net.is_positive() {
                if !uow.inventory().consume(ingredient_id, *net).await? {
                    let available = uow
                        .inventory()
                        .find_by_id(ingredient_id)
                        .await?
                        .map(|item| item.quantity)
                        .unwrap_or_default();
                    return Err(CoreError::InsufficientIngredient {
                        ingredient: name.to_string(),
                        available,
                        required: *net,
                    }
                    .into());
                }
            } else if !uow.inventory().restock(ingredient_id, -*net).await? {
                return Err(CoreError::IngredientNotFound(name.to_string()).into());
            }
        }

        for dish in &movement.dishes {
            if dish.delta > 0 {
                if !uow.menu().consume_stock(&dish.menu_item_id, dish.delta).await? {
                    let available = uow.menu().stock_of(&dish.menu_item_id).await?.unwrap_or(0);
                    return Err(CoreError::InsufficientDishStock {
                        dish: dish.dish_name.clone(),
                        available,
                        requested: dish.delta,
                    }
                    .into());
                }
            } else if !uow.menu().restock(&dish.menu_item_id, -dish.delta).await? {
                // The dish left the menu; its servings have nowhere to go
                warn!(dish = %dish.dish_name, servings = -dish.delta, "Restock skipped for missing dish");
            }
        }

        Ok(())
    }
}
