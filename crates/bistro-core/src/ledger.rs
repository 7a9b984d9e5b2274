//! # Stock Ledger Math
//!
//! Pure computations behind every stock movement an order causes.
//! Nothing here reads or writes inventory; `bistro-db` applies the results
//! inside a unit of work.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  create:  ResolvedLine[] ──consumption_lines()──┐                      │
//! │                                                 │                      │
//! │  update:  OrderLine[] (old) ─┐                  ▼                      │
//! │           ResolvedLine[] ────┴─compute_deltas()─► LedgerLine[]         │
//! │                                                 │                      │
//! │                  ┌──────────────────────────────┼───────────────┐      │
//! │                  ▼                              ▼               │      │
//! │        aggregate_consumption()        aggregate_dishes()        │      │
//! │        ingredient_id → net Quantity   menu_item_id → net count  │      │
//! │                  │                              │               │      │
//! │                  ▼                              ▼               │      │
//! │        check_ingredient() for net > 0   check_dish() for > 0    │      │
//! │                                                                         │
//! │  A positive net is a consumption, a negative net is a restock.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::quantity::Quantity;
use crate::types::{IngredientRequirement, OrderLine};

// =============================================================================
// Line Types
// =============================================================================

/// A requested line after name resolution, carrying the current menu data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedLine {
    pub menu_item_id: String,
    pub name: String,
    pub unit_price_cents: i64,
    pub quantity: i64,
    pub ingredients: Vec<IngredientRequirement>,
}

impl ResolvedLine {
    /// Freezes the line into its persisted snapshot form.
    pub fn to_order_line(&self) -> OrderLine {
        OrderLine {
            menu_item_id: self.menu_item_id.clone(),
            name_snapshot: self.name.clone(),
            unit_price_cents: self.unit_price_cents,
            quantity: self.quantity,
            ingredients_snapshot: self.ingredients.clone(),
        }
    }
}

/// A signed movement of servings for one dish.
///
/// `delta > 0` consumes ingredients and dish stock, `delta < 0` returns them.
/// `ingredients` is the recipe the movement is priced against: the current
/// recipe for new servings, the order's snapshot for returned ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerLine {
    pub menu_item_id: String,
    pub dish_name: String,
    pub ingredients: Vec<IngredientRequirement>,
    pub delta: i64,
}

/// Net serving change for one dish after aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DishDelta {
    pub menu_item_id: String,
    pub dish_name: String,
    pub delta: i64,
}

// =============================================================================
// Line Construction
// =============================================================================

/// Collapses repeated requests for the same dish into one line.
///
/// The merged line keeps the position of the first occurrence.
pub fn merge_lines(lines: Vec<ResolvedLine>) -> Vec<ResolvedLine> {
    let mut merged: Vec<ResolvedLine> = Vec::with_capacity(lines.len());
    let mut index: HashMap<String, usize> = HashMap::new();

    for line in lines {
        match index.get(&line.menu_item_id) {
            Some(&pos) => merged[pos].quantity += line.quantity,
            None => {
                index.insert(line.menu_item_id.clone(), merged.len());
                merged.push(line);
            }
        }
    }

    merged
}

/// Ledger lines for a brand new order: every line is a full consumption.
pub fn consumption_lines(lines: &[ResolvedLine]) -> Vec<LedgerLine> {
    lines
        .iter()
        .map(|line| LedgerLine {
            menu_item_id: line.menu_item_id.clone(),
            dish_name: line.name.clone(),
            ingredients: line.ingredients.clone(),
            delta: line.quantity,
        })
        .collect()
}

/// Signed movements that turn `previous` into `replacement`.
///
/// ## Rules
/// - New dish: `+quantity` against the current recipe
/// - Kept dish, same recipe: one line with `new - old`
/// - Kept dish, recipe changed since ordering: the old servings go back
///   against the snapshot and the new servings come out against the
///   current recipe (two lines, same dish)
/// - Dish dropped from the order: `-old` against the snapshot
///
/// ## Example
/// ```rust
/// use bistro_core::ledger::{compute_deltas, ResolvedLine};
/// use bistro_core::types::OrderLine;
///
/// let previous = vec![OrderLine {
///     menu_item_id: "m1".into(),
///     name_snapshot: "Margherita".into(),
///     unit_price_cents: 1250,
///     quantity: 3,
///     ingredients_snapshot: vec![],
/// }];
/// let replacement = vec![ResolvedLine {
///     menu_item_id: "m1".into(),
///     name: "Margherita".into(),
///     unit_price_cents: 1250,
///     quantity: 1,
///     ingredients: vec![],
/// }];
/// let deltas = compute_deltas(&previous, &replacement);
/// assert_eq!(deltas.len(), 1);
/// assert_eq!(deltas[0].delta, -2);
/// ```
pub fn compute_deltas(previous: &[OrderLine], replacement: &[ResolvedLine]) -> Vec<LedgerLine> {
    let mut baseline: Vec<(&OrderLine, i64)> = Vec::new();
    let mut baseline_index: HashMap<&str, usize> = HashMap::new();
    for line in previous {
        match baseline_index.get(line.menu_item_id.as_str()) {
            Some(&pos) => baseline[pos].1 += line.quantity,
            None => {
                baseline_index.insert(line.menu_item_id.as_str(), baseline.len());
                baseline.push((line, line.quantity));
            }
        }
    }

    let mut deltas = Vec::new();

    for line in replacement {
        let prior = baseline_index
            .get(line.menu_item_id.as_str())
            .map(|&pos| baseline[pos]);

        match prior {
            None => deltas.push(LedgerLine {
                menu_item_id: line.menu_item_id.clone(),
                dish_name: line.name.clone(),
                ingredients: line.ingredients.clone(),
                delta: line.quantity,
            }),
            Some((old, old_qty)) if old.ingredients_snapshot == line.ingredients => {
                let delta = line.quantity - old_qty;
                if delta != 0 {
                    deltas.push(LedgerLine {
                        menu_item_id: line.menu_item_id.clone(),
                        dish_name: line.name.clone(),
                        ingredients: line.ingredients.clone(),
                        delta,
                    });
                }
            }
            Some((old, old_qty)) => {
                deltas.push(LedgerLine {
                    menu_item_id: old.menu_item_id.clone(),
                    dish_name: old.name_snapshot.clone(),
                    ingredients: old.ingredients_snapshot.clone(),
                    delta: -old_qty,
                });
                deltas.push(LedgerLine {
                    menu_item_id: line.menu_item_id.clone(),
                    dish_name: line.name.clone(),
                    ingredients: line.ingredients.clone(),
                    delta: line.quantity,
                });
            }
        }
    }

    for (old, old_qty) in baseline {
        let still_ordered = replacement
            .iter()
            .any(|line| line.menu_item_id == old.menu_item_id);
        if !still_ordered {
            deltas.push(LedgerLine {
                menu_item_id: old.menu_item_id.clone(),
                dish_name: old.name_snapshot.clone(),
                ingredients: old.ingredients_snapshot.clone(),
                delta: -old_qty,
            });
        }
    }

    deltas
}

// =============================================================================
// Aggregation
// =============================================================================

/// Net ingredient consumption: Σ per_serving × delta, keyed by ingredient id.
///
/// Entries that net to zero are dropped.
///
/// ## Returns
/// - `TooLarge` when a product or a running sum leaves the storable range
pub fn aggregate_consumption(lines: &[LedgerLine]) -> CoreResult<BTreeMap<String, Quantity>> {
    let mut totals: BTreeMap<String, Quantity> = BTreeMap::new();

    for line in lines {
        for requirement in &line.ingredients {
            let net = totals
                .entry(requirement.ingredient_id.clone())
                .or_insert_with(Quantity::zero);
            let running = *net;
            *net = requirement
                .per_serving
                .checked_mul(line.delta)
                .and_then(|amount| running.checked_add(amount))
                .ok_or_else(|| ValidationError::too_large("ingredient consumption"))?;
        }
    }

    totals.retain(|_, net| !net.is_zero());
    Ok(totals)
}

/// Net serving change per dish, in first-appearance order. Zero nets are dropped.
pub fn aggregate_dishes(lines: &[LedgerLine]) -> Vec<DishDelta> {
    let mut dishes: Vec<DishDelta> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for line in lines {
        match index.get(line.menu_item_id.as_str()) {
            Some(&pos) => dishes[pos].delta += line.delta,
            None => {
                index.insert(line.menu_item_id.as_str(), dishes.len());
                dishes.push(DishDelta {
                    menu_item_id: line.menu_item_id.clone(),
                    dish_name: line.dish_name.clone(),
                    delta: line.delta,
                });
            }
        }
    }

    dishes.retain(|d| d.delta != 0);
    dishes
}

/// Σ unit_price × quantity over the lines.
///
/// ## Returns
/// - `TooLarge` when the total does not fit in cents
pub fn order_total(lines: &[ResolvedLine]) -> CoreResult<Money> {
    lines
        .iter()
        .try_fold(Money::zero(), |total, line| {
            Money::from_cents(line.unit_price_cents)
                .checked_mul(line.quantity)
                .and_then(|line_total| total.checked_add(line_total))
        })
        .ok_or_else(|| ValidationError::too_large("order total").into())
}

// =============================================================================
// Sufficiency Checks
// =============================================================================

/// Fails when `available` cannot cover `required`. Equality passes.
pub fn check_ingredient(name: &str, available: Quantity, required: Quantity) -> CoreResult<()> {
    if available >= required {
        return Ok(());
    }
    Err(CoreError::InsufficientIngredient {
        ingredient: name.to_string(),
        available,
        required,
    })
}

/// Fails when the dish's serving counter is below `requested`. Equality passes.
pub fn check_dish(name: &str, available: i64, requested: i64) -> CoreResult<()> {
    if available >= requested {
        return Ok(());
    }
    Err(CoreError::InsufficientDishStock {
        dish: name.to_string(),
        available,
        requested,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn flour(per_serving_milli: i64) -> Vec<IngredientRequirement> {
        vec![IngredientRequirement {
            ingredient_id: "flour".to_string(),
            per_serving: Quantity::from_milli(per_serving_milli),
        }]
    }

    fn resolved(id: &str, qty: i64, ingredients: Vec<IngredientRequirement>) -> ResolvedLine {
        ResolvedLine {
            menu_item_id: id.to_string(),
            name: format!("dish {}", id),
            unit_price_cents: 1250,
            quantity: qty,
            ingredients,
        }
    }

    fn persisted(id: &str, qty: i64, ingredients: Vec<IngredientRequirement>) -> OrderLine {
        resolved(id, qty, ingredients).to_order_line()
    }

    #[test]
    fn test_aggregate_sums_across_dishes() {
        let mut cheese = flour(100);
        cheese.push(IngredientRequirement {
            ingredient_id: "cheese".to_string(),
            per_serving: Quantity::from_milli(50),
        });
        let lines = consumption_lines(&[resolved("pizza", 3, flour(200)), resolved("calzone", 2, cheese)]);

        let totals = aggregate_consumption(&lines).unwrap();
        assert_eq!(totals["flour"], Quantity::from_milli(800));
        assert_eq!(totals["cheese"], Quantity::from_milli(100));
    }

    #[test]
    fn test_aggregate_ignores_dishes_without_recipe() {
        let lines = consumption_lines(&[resolved("water", 4, vec![])]);
        assert!(aggregate_consumption(&lines).unwrap().is_empty());
        assert_eq!(aggregate_dishes(&lines)[0].delta, 4);
    }

    #[test]
    fn test_reducing_quantity_restocks_the_difference() {
        let previous = vec![persisted("pizza", 3, flour(200))];
        let deltas = compute_deltas(&previous, &[resolved("pizza", 1, flour(200))]);

        assert_eq!(deltas.len(), 1);
        assert_eq!(aggregate_consumption(&deltas).unwrap()["flour"], Quantity::from_milli(-400));
        assert_eq!(aggregate_dishes(&deltas)[0].delta, -2);
    }

    #[test]
    fn test_unchanged_line_moves_nothing() {
        let previous = vec![persisted("pizza", 2, flour(200))];
        let deltas = compute_deltas(&previous, &[resolved("pizza", 2, flour(200))]);
        assert!(deltas.is_empty());
    }

    #[test]
    fn test_dropped_line_is_fully_restocked_from_snapshot() {
        let previous = vec![
            persisted("pizza", 2, flour(200)),
            persisted("salad", 1, vec![]),
        ];
        let deltas = compute_deltas(&previous, &[resolved("salad", 1, vec![])]);

        assert_eq!(deltas.len(), 1);
        assert_eq!(deltas[0].menu_item_id, "pizza");
        assert_eq!(deltas[0].delta, -2);
        assert_eq!(aggregate_consumption(&deltas).unwrap()["flour"], Quantity::from_milli(-400));
    }

    #[test]
    fn test_recipe_change_returns_old_and_charges_new() {
        // Ordered at 0.2 kg per serving, recipe is now 0.25 kg
        let previous = vec![persisted("pizza", 2, flour(200))];
        let deltas = compute_deltas(&previous, &[resolved("pizza", 2, flour(250))]);

        assert_eq!(deltas.len(), 2);
        assert_eq!(aggregate_consumption(&deltas).unwrap()["flour"], Quantity::from_milli(100));
        assert!(aggregate_dishes(&deltas).is_empty());
    }

    #[test]
    fn test_merge_lines_keeps_first_position() {
        let merged = merge_lines(vec![
            resolved("pizza", 1, vec![]),
            resolved("salad", 2, vec![]),
            resolved("pizza", 2, vec![]),
        ]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].menu_item_id, "pizza");
        assert_eq!(merged[0].quantity, 3);
        assert_eq!(merged[1].quantity, 2);
    }

    #[test]
    fn test_order_total() {
        let lines = vec![resolved("pizza", 3, vec![]), resolved("salad", 1, vec![])];
        assert_eq!(order_total(&lines).unwrap().to_string(), "50.00");
    }

    #[test]
    fn test_order_total_overflow_is_an_error() {
        let mut pricey = resolved("caviar", 2, vec![]);
        pricey.unit_price_cents = i64::MAX;
        assert!(matches!(
            order_total(&[pricey]),
            Err(CoreError::Validation(ValidationError::TooLarge { .. }))
        ));
    }

    #[test]
    fn test_consumption_overflow_is_an_error() {
        let lines = consumption_lines(&[resolved("pizza", 2, flour(i64::MAX / 2 + 1))]);
        assert!(matches!(
            aggregate_consumption(&lines),
            Err(CoreError::Validation(ValidationError::TooLarge { .. }))
        ));
    }

    #[test]
    fn test_checks_are_inclusive() {
        assert!(check_ingredient("flour", Quantity::from_milli(600), Quantity::from_milli(600)).is_ok());
        assert!(matches!(
            check_ingredient("flour", Quantity::from_milli(599), Quantity::from_milli(600)),
            Err(CoreError::InsufficientIngredient { .. })
        ));
        assert!(check_dish("pizza", 3, 3).is_ok());
        assert!(matches!(
            check_dish("pizza", 2, 3),
            Err(CoreError::InsufficientDishStock { available: 2, requested: 3, .. })
        ));
    }
}
