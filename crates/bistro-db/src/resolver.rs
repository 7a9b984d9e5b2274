//! # Name Resolver
//!
//! Turns display names from a request into catalog identifiers.
//!
//! ```text
//! [{ name: "Margherita", quantity: 3 }, { name: "Tiramisu", quantity: 1 }]
//!      │
//!      ▼  exact, case-sensitive lookup, one query per distinct name
//! [ResolvedLine { menu_item_id, price, recipe, quantity: 3 }, ...]
//!      │
//!      └── any unknown name → MenuItemNotFound("<name>"), nothing returned
//! ```
//!
//! Resolution runs on the caller's connection so it sees the same snapshot
//! as the stock checks that follow.

use std::collections::HashMap;

use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::ServiceResult;
use crate::repository::{InventoryRepository, MenuRepository};
use bistro_core::ledger::ResolvedLine;
use bistro_core::requests::{IngredientRequest, ItemRequest};
use bistro_core::{CoreError, IngredientRequirement, MenuItem};

/// Resolves every requested line to a menu item, in input order.
///
/// ## Returns
/// - One `ResolvedLine` per input line (duplicates are not merged here)
/// - `CoreError::MenuItemNotFound` naming the first unknown name
pub async fn resolve_menu_items(
    conn: &mut SqliteConnection,
    items: &[ItemRequest],
) -> ServiceResult<Vec<ResolvedLine>> {
    let mut seen: HashMap<&str, MenuItem> = HashMap::new();
    let mut resolved = Vec::with_capacity(items.len());

    for item in items {
        if !seen.contains_key(item.name.as_str()) {
            let found = MenuRepository::new(&mut *conn)
                .find_by_name(&item.name)
                .await?
                .ok_or_else(|| CoreError::MenuItemNotFound(item.name.clone()))?;
            seen.insert(item.name.as_str(), found);
        }
        let menu_item = &seen[item.name.as_str()];

        resolved.push(ResolvedLine {
            menu_item_id: menu_item.id.clone(),
            name: menu_item.name.clone(),
            unit_price_cents: menu_item.price_cents,
            quantity: item.quantity,
            ingredients: menu_item.ingredients.clone(),
        });
    }

    debug!(
        requested = items.len(),
        distinct = seen.len(),
        "Resolved menu item names"
    );
    Ok(resolved)
}

/// Resolves recipe lines to inventory identifiers, in input order.
///
/// ## Returns
/// - `CoreError::IngredientNotFound` naming the first unknown ingredient
pub async fn resolve_ingredients(
    conn: &mut SqliteConnection,
    ingredients: &[IngredientRequest],
) -> ServiceResult<Vec<IngredientRequirement>> {
    let mut ids: HashMap<&str, String> = HashMap::new();
    let mut resolved = Vec::with_capacity(ingredients.len());

    for ingredient in ingredients {
        let name = ingredient.name.as_str();
        let ingredient_id = match ids.get(name) {
            Some(id) => id.clone(),
            None => {
                let item = InventoryRepository::new(&mut *conn)
                    .find_by_name(name)
                    .await?
                    .ok_or_else(|| CoreError::IngredientNotFound(name.to_string()))?;
                ids.insert(name, item.id.clone());
                item.id
            }
        };

        resolved.push(IngredientRequirement {
            ingredient_id,
            per_serving: ingredient.per_serving,
        });
    }

    Ok(resolved)
}
