//! End-to-end tests for the order workflow against in-memory SQLite.

use bistro_core::requests::{
    CreateOrderRequest, IngredientRequest, ItemRequest, MenuItemUpdate, NewInventoryItem,
    NewMenuItem, NewTable, UpdateOrderRequest,
};
use bistro_core::{
    BusinessLimits, CoreError, ErrorKind, InventoryItem, MenuCategory, MenuItem, OrderStatus,
    Principal, Quantity, Role, TableStatus, Unit,
};
use bistro_db::{Catalog, Database, DbConfig, OrderWorkflow, ServiceError};

// =============================================================================
// Fixture
// =============================================================================

struct Bistro {
    db: Database,
    catalog: Catalog,
    orders: OrderWorkflow,
    owner: Principal,
    flour: InventoryItem,
    margherita: MenuItem,
    tiramisu: MenuItem,
}

/// Tables 1-3, 1 kg of flour, Margherita (0.2 kg flour, 5 servings, 12.50)
/// and Tiramisu (no recipe, 2 servings, 7.50).
async fn bistro() -> Bistro {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let limits = BusinessLimits::default();
    let catalog = Catalog::new(db.clone(), limits);
    let orders = OrderWorkflow::new(db.clone(), limits);
    let owner = Principal::new("waiter-1", Role::User);

    for table_number in 1..=3 {
        catalog
            .create_table(&owner, NewTable { table_number, seats: 4 })
            .await
            .unwrap();
    }

    let flour = catalog
        .create_inventory_item(
            &owner,
            NewInventoryItem {
                name: "flour".to_string(),
                quantity: Quantity::from_milli(1_000),
                unit: Unit::Kg,
                threshold: None,
            },
        )
        .await
        .unwrap();

    let margherita = catalog
        .create_menu_item(
            &owner,
            NewMenuItem {
                name: "Margherita".to_string(),
                description: "Tomato, mozzarella, basil".to_string(),
                category: MenuCategory::Pizza,
                price_cents: 1250,
                ingredients: vec![IngredientRequest {
                    name: "flour".to_string(),
                    per_serving: Quantity::from_milli(200),
                }],
                stock: 5,
            },
        )
        .await
        .unwrap();

    let tiramisu = catalog
        .create_menu_item(
            &owner,
            NewMenuItem {
                name: "Tiramisu".to_string(),
                description: String::new(),
                category: MenuCategory::Dessert,
                price_cents: 750,
                ingredients: vec![],
                stock: 2,
            },
        )
        .await
        .unwrap();

    Bistro {
        db,
        catalog,
        orders,
        owner,
        flour,
        margherita,
        tiramisu,
    }
}

fn create(table_number: i64, items: &[(&str, i64)]) -> CreateOrderRequest {
    CreateOrderRequest {
        customer_name: Some("Ada".to_string()),
        table_number: Some(table_number),
        items: Some(
            items
                .iter()
                .map(|(name, quantity)| ItemRequest::new(*name, *quantity))
                .collect(),
        ),
    }
}

fn replace(items: &[(&str, i64)]) -> UpdateOrderRequest {
    UpdateOrderRequest {
        items: Some(
            items
                .iter()
                .map(|(name, quantity)| ItemRequest::new(*name, *quantity))
                .collect(),
        ),
        customer_name: None,
        status: None,
    }
}

impl Bistro {
    async fn flour_left(&self) -> Quantity {
        self.catalog
            .get_inventory_item(&self.flour.id)
            .await
            .unwrap()
            .quantity
    }

    async fn servings_left(&self, dish: &MenuItem) -> i64 {
        self.catalog.get_menu_item(&dish.id).await.unwrap().stock
    }

    async fn table_status(&self, table_number: i64) -> TableStatus {
        self.catalog
            .list_tables()
            .await
            .unwrap()
            .into_iter()
            .find(|t| t.table_number == table_number)
            .unwrap()
            .status
    }

    async fn order_count(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(self.db.pool())
            .await
            .unwrap()
    }

    /// Nothing moved since the fixture was built.
    async fn assert_untouched(&self) {
        assert_eq!(self.flour_left().await, Quantity::from_milli(1_000));
        assert_eq!(self.servings_left(&self.margherita).await, 5);
        assert_eq!(self.servings_left(&self.tiramisu).await, 2);
        for table_number in 1..=3 {
            assert_eq!(self.table_status(table_number).await, TableStatus::Available);
        }
        assert_eq!(self.order_count().await, 0);
    }
}

// =============================================================================
// Create
// =============================================================================

#[tokio::test]
async fn test_create_consumes_stock_and_occupies_table() {
    let b = bistro().await;

    let order = b
        .orders
        .create_order(&b.owner, create(1, &[("Margherita", 3)]))
        .await
        .unwrap();

    assert_eq!(order.status, OrderStatus::InProgress);
    assert_eq!(order.total_cents, 3750);
    assert_eq!(order.owner_id, "waiter-1");
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].menu_item_id, b.margherita.id);
    assert_eq!(order.items[0].ingredients_snapshot, b.margherita.ingredients);

    assert_eq!(b.flour_left().await, Quantity::from_milli(400));
    assert_eq!(b.servings_left(&b.margherita).await, 2);
    assert_eq!(b.table_status(1).await, TableStatus::Occupied);

    let stored = b.orders.get_order(&order.id).await.unwrap();
    assert_eq!(stored.items, order.items);
    assert_eq!(stored.status.as_str(), "In Progress");
}

#[tokio::test]
async fn test_create_rejects_incomplete_requests_before_any_write() {
    let b = bistro().await;

    let mut request = create(1, &[("Margherita", 1)]);
    request.customer_name = Some("   ".to_string());
    let err = b.orders.create_order(&b.owner, request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingField);

    let mut request = create(1, &[("Margherita", 1)]);
    request.table_number = None;
    let err = b.orders.create_order(&b.owner, request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingField);

    let err = b
        .orders
        .create_order(&b.owner, create(1, &[]))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingField);
    assert_eq!(err.status_code(), 400);

    let err = b
        .orders
        .create_order(&b.owner, create(1, &[("Margherita", 0)]))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Invalid);

    b.assert_untouched().await;
}

#[tokio::test]
async fn test_create_on_unknown_table_leaves_no_trace() {
    let b = bistro().await;

    let err = b
        .orders
        .create_order(&b.owner, create(9, &[("Margherita", 1)]))
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Domain(CoreError::TableNotFound(9))));
    assert_eq!(err.status_code(), 404);
    b.assert_untouched().await;
}

#[tokio::test]
async fn test_create_with_unknown_dish_names_it() {
    let b = bistro().await;

    let err = b
        .orders
        .create_order(&b.owner, create(1, &[("Margherita", 1), ("Calzone", 1)]))
        .await
        .unwrap_err();

    match err {
        ServiceError::Domain(CoreError::MenuItemNotFound(name)) => assert_eq!(name, "Calzone"),
        other => panic!("expected MenuItemNotFound, got {other:?}"),
    }
    b.assert_untouched().await;
}

#[tokio::test]
async fn test_dish_names_are_case_sensitive() {
    let b = bistro().await;

    let err = b
        .orders
        .create_order(&b.owner, create(1, &[("margherita", 1)]))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    b.assert_untouched().await;
}

#[tokio::test]
async fn test_padded_dish_name_does_not_match() {
    let b = bistro().await;

    let err = b
        .orders
        .create_order(&b.owner, create(1, &[(" Margherita ", 1)]))
        .await
        .unwrap_err();

    match err {
        ServiceError::Domain(CoreError::MenuItemNotFound(name)) => assert_eq!(name, " Margherita "),
        other => panic!("expected MenuItemNotFound, got {other:?}"),
    }
    b.assert_untouched().await;
}

#[tokio::test]
async fn test_create_on_occupied_table_conflicts() {
    let b = bistro().await;
    b.orders
        .create_order(&b.owner, create(1, &[("Margherita", 1)]))
        .await
        .unwrap();

    let err = b
        .orders
        .create_order(&b.owner, create(1, &[("Margherita", 1)]))
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Domain(CoreError::TableOccupied(1))));
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(b.flour_left().await, Quantity::from_milli(800));
    assert_eq!(b.order_count().await, 1);
}

#[tokio::test]
async fn test_ingredient_shortfall_names_the_ingredient() {
    let b = bistro().await;

    let err = b
        .orders
        .create_order(&b.owner, create(1, &[("Margherita", 6)]))
        .await
        .unwrap_err();

    match &err {
        ServiceError::Domain(CoreError::InsufficientIngredient {
            ingredient,
            available,
            required,
        }) => {
            assert_eq!(ingredient, "flour");
            assert_eq!(*available, Quantity::from_milli(1_000));
            assert_eq!(*required, Quantity::from_milli(1_200));
        }
        other => panic!("expected InsufficientIngredient, got {other:?}"),
    }
    assert_eq!(err.kind(), ErrorKind::InsufficientStock);
    assert_eq!(err.status_code(), 412);
    b.assert_untouched().await;
}

#[tokio::test]
async fn test_dish_stock_shortfall_rolls_back_other_lines() {
    let b = bistro().await;

    let err = b
        .orders
        .create_order(&b.owner, create(1, &[("Margherita", 2), ("Tiramisu", 3)]))
        .await
        .unwrap_err();

    match err {
        ServiceError::Domain(CoreError::InsufficientDishStock {
            dish,
            available,
            requested,
        }) => {
            assert_eq!(dish, "Tiramisu");
            assert_eq!(available, 2);
            assert_eq!(requested, 3);
        }
        other => panic!("expected InsufficientDishStock, got {other:?}"),
    }
    b.assert_untouched().await;
}

#[tokio::test]
async fn test_stock_boundary_is_inclusive() {
    let b = bistro().await;

    b.orders
        .create_order(&b.owner, create(1, &[("Margherita", 5)]))
        .await
        .unwrap();
    assert_eq!(b.flour_left().await, Quantity::zero());
    assert_eq!(b.servings_left(&b.margherita).await, 0);

    let err = b
        .orders
        .create_order(&b.owner, create(2, &[("Margherita", 1)]))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientStock);
    assert_eq!(b.flour_left().await, Quantity::zero());
    assert_eq!(b.table_status(2).await, TableStatus::Available);
}

#[tokio::test]
async fn test_one_thousandth_short_rejects_everything() {
    let b = bistro().await;
    sqlx::query("UPDATE inventory_items SET quantity_milli = 999 WHERE id = ?")
        .bind(&b.flour.id)
        .execute(b.db.pool())
        .await
        .unwrap();

    let err = b
        .orders
        .create_order(&b.owner, create(1, &[("Margherita", 5)]))
        .await
        .unwrap_err();

    match &err {
        ServiceError::Domain(CoreError::InsufficientIngredient {
            ingredient,
            available,
            required,
        }) => {
            assert_eq!(ingredient, "flour");
            assert_eq!(*available, Quantity::from_milli(999));
            assert_eq!(*required, Quantity::from_milli(1_000));
        }
        other => panic!("expected InsufficientIngredient, got {other:?}"),
    }
    assert_eq!(
        err.to_string(),
        "Not enough flour in inventory: available 0.999, required 1 (short by 0.001)"
    );
    assert_eq!(b.flour_left().await, Quantity::from_milli(999));
    assert_eq!(b.servings_left(&b.margherita).await, 5);
    assert_eq!(b.table_status(1).await, TableStatus::Available);
    assert_eq!(b.order_count().await, 0);
}

#[tokio::test]
async fn test_consumption_overflow_is_rejected_without_writes() {
    let b = bistro().await;
    b.catalog
        .create_menu_item(
            &b.owner,
            NewMenuItem {
                name: "Flour Tower".to_string(),
                description: String::new(),
                category: MenuCategory::MainCourse,
                price_cents: 100,
                ingredients: vec![IngredientRequest {
                    name: "flour".to_string(),
                    per_serving: Quantity::from_milli(i64::MAX / 2 + 1),
                }],
                stock: 5,
            },
        )
        .await
        .unwrap();

    let err = b
        .orders
        .create_order(&b.owner, create(1, &[("Flour Tower", 2)]))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Invalid);
    assert_eq!(err.status_code(), 422);
    b.assert_untouched().await;
}

#[tokio::test]
async fn test_repeated_names_resolve_to_one_line() {
    let b = bistro().await;

    let order = b
        .orders
        .create_order(&b.owner, create(1, &[("Margherita", 1), ("Margherita", 2)]))
        .await
        .unwrap();

    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].quantity, 3);
    assert_eq!(order.total_cents, 3750);
    assert_eq!(b.flour_left().await, Quantity::from_milli(400));
}

// =============================================================================
// Update
// =============================================================================

#[tokio::test]
async fn test_reducing_quantity_restocks_the_difference() {
    let b = bistro().await;
    let order = b
        .orders
        .create_order(&b.owner, create(1, &[("Margherita", 3)]))
        .await
        .unwrap();

    let updated = b
        .orders
        .update_order(&b.owner, &order.id, replace(&[("Margherita", 1)]))
        .await
        .unwrap();

    assert_eq!(updated.items.len(), 1);
    assert_eq!(updated.items[0].quantity, 1);
    assert_eq!(updated.total_cents, 1250);
    assert_eq!(b.flour_left().await, Quantity::from_milli(800));
    assert_eq!(b.servings_left(&b.margherita).await, 4);
    assert_eq!(b.table_status(1).await, TableStatus::Occupied);
}

#[tokio::test]
async fn test_dropped_line_is_restocked_in_full() {
    let b = bistro().await;
    let order = b
        .orders
        .create_order(&b.owner, create(1, &[("Margherita", 2), ("Tiramisu", 2)]))
        .await
        .unwrap();
    assert_eq!(b.servings_left(&b.tiramisu).await, 0);

    let updated = b
        .orders
        .update_order(&b.owner, &order.id, replace(&[("Margherita", 2)]))
        .await
        .unwrap();

    assert_eq!(updated.items.len(), 1);
    assert_eq!(updated.total_cents, 2500);
    assert_eq!(b.servings_left(&b.tiramisu).await, 2);
    assert_eq!(b.flour_left().await, Quantity::from_milli(600));
}

#[tokio::test]
async fn test_empty_replacement_returns_everything() {
    let b = bistro().await;
    let order = b
        .orders
        .create_order(&b.owner, create(1, &[("Margherita", 3), ("Tiramisu", 1)]))
        .await
        .unwrap();

    let updated = b
        .orders
        .update_order(&b.owner, &order.id, replace(&[]))
        .await
        .unwrap();

    assert!(updated.items.is_empty());
    assert_eq!(updated.total_cents, 0);
    assert_eq!(b.flour_left().await, Quantity::from_milli(1_000));
    assert_eq!(b.servings_left(&b.margherita).await, 5);
    assert_eq!(b.servings_left(&b.tiramisu).await, 2);
}

#[tokio::test]
async fn test_update_requires_items() {
    let b = bistro().await;
    let order = b
        .orders
        .create_order(&b.owner, create(1, &[("Margherita", 1)]))
        .await
        .unwrap();

    let request = UpdateOrderRequest {
        items: None,
        customer_name: Some("Grace".to_string()),
        status: None,
    };
    let err = b
        .orders
        .update_order(&b.owner, &order.id, request)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::MissingField);
    let stored = b.orders.get_order(&order.id).await.unwrap();
    assert_eq!(stored.customer_name, "Ada");
}

#[tokio::test]
async fn test_update_merges_name_and_status() {
    let b = bistro().await;
    let order = b
        .orders
        .create_order(&b.owner, create(1, &[("Margherita", 1)]))
        .await
        .unwrap();

    let request = UpdateOrderRequest {
        items: Some(vec![ItemRequest::new("Margherita", 1)]),
        customer_name: Some("Grace".to_string()),
        status: Some(OrderStatus::from("Served")),
    };
    let updated = b
        .orders
        .update_order(&b.owner, &order.id, request)
        .await
        .unwrap();

    assert_eq!(updated.customer_name, "Grace");
    assert_eq!(updated.status.as_str(), "Served");
    assert_eq!(b.flour_left().await, Quantity::from_milli(800));

    let stored = b.orders.get_order(&order.id).await.unwrap();
    assert_eq!(stored.customer_name, "Grace");
    assert_eq!(stored.status, OrderStatus::Other("Served".to_string()));
}

#[tokio::test]
async fn test_failed_update_keeps_the_order_as_it_was() {
    let b = bistro().await;
    let order = b
        .orders
        .create_order(&b.owner, create(1, &[("Margherita", 2)]))
        .await
        .unwrap();

    let err = b
        .orders
        .update_order(&b.owner, &order.id, replace(&[("Margherita", 6), ("Tiramisu", 1)]))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientStock);

    let stored = b.orders.get_order(&order.id).await.unwrap();
    assert_eq!(stored.items, order.items);
    assert_eq!(stored.total_cents, 2500);
    assert_eq!(b.flour_left().await, Quantity::from_milli(600));
    assert_eq!(b.servings_left(&b.tiramisu).await, 2);
}

#[tokio::test]
async fn test_unknown_order_is_not_found() {
    let b = bistro().await;

    let err = b
        .orders
        .update_order(&b.owner, "no-such-order", replace(&[("Margherita", 1)]))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Domain(CoreError::OrderNotFound(ref id)) if id == "no-such-order"));

    let err = b.orders.get_order("no-such-order").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_existing_order_keeps_price_snapshot() {
    let b = bistro().await;
    let order = b
        .orders
        .create_order(&b.owner, create(1, &[("Margherita", 2)]))
        .await
        .unwrap();

    b.catalog
        .update_menu_item(
            &b.owner,
            &b.margherita.id,
            MenuItemUpdate {
                price_cents: Some(1300),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let stored = b.orders.get_order(&order.id).await.unwrap();
    assert_eq!(stored.total_cents, 2500);
    assert_eq!(stored.items[0].unit_price_cents, 1250);
    assert_eq!(stored.items[0].name_snapshot, "Margherita");
}

// =============================================================================
// Status, Delete, Ownership
// =============================================================================

#[tokio::test]
async fn test_status_change_has_no_stock_effect() {
    let b = bistro().await;
    let order = b
        .orders
        .create_order(&b.owner, create(1, &[("Margherita", 2)]))
        .await
        .unwrap();

    let updated = b
        .orders
        .update_status(&b.owner, &order.id, OrderStatus::Completed)
        .await
        .unwrap();

    assert_eq!(updated.status, OrderStatus::Completed);
    assert_eq!(updated.items, order.items);
    assert_eq!(b.flour_left().await, Quantity::from_milli(600));

    let err = b
        .orders
        .update_status(&b.owner, &order.id, OrderStatus::from(""))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingField);
}

#[tokio::test]
async fn test_delete_frees_table_without_restocking() {
    let b = bistro().await;
    let order = b
        .orders
        .create_order(&b.owner, create(1, &[("Margherita", 2)]))
        .await
        .unwrap();

    let deleted = b.orders.delete_order(&b.owner, &order.id).await.unwrap();

    assert_eq!(deleted.id, order.id);
    assert_eq!(b.table_status(1).await, TableStatus::Available);
    assert_eq!(b.flour_left().await, Quantity::from_milli(600));
    assert_eq!(b.servings_left(&b.margherita).await, 3);
    assert_eq!(b.order_count().await, 0);

    let err = b.orders.get_order(&order.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::Domain(CoreError::OrderNotFound(_))));

    // The table takes a new order straight away
    b.orders
        .create_order(&b.owner, create(1, &[("Margherita", 1)]))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_only_the_owner_can_change_an_order() {
    let b = bistro().await;
    let stranger = Principal::new("waiter-2", Role::Manager);
    let order = b
        .orders
        .create_order(&b.owner, create(1, &[("Margherita", 2)]))
        .await
        .unwrap();

    let err = b
        .orders
        .update_order(&stranger, &order.id, replace(&[("Margherita", 1)]))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);
    assert_eq!(err.status_code(), 403);

    let err = b
        .orders
        .update_status(&stranger, &order.id, OrderStatus::Cancelled)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    let err = b
        .orders
        .delete_order(&stranger, &order.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    let stored = b.orders.get_order(&order.id).await.unwrap();
    assert_eq!(stored.items, order.items);
    assert_eq!(stored.status, OrderStatus::InProgress);
    assert_eq!(b.flour_left().await, Quantity::from_milli(600));
    assert_eq!(b.table_status(1).await, TableStatus::Occupied);

    assert_eq!(b.orders.list_orders(&b.owner).await.unwrap().len(), 1);
    assert!(b.orders.list_orders(&stranger).await.unwrap().is_empty());
}

// =============================================================================
// End to End
// =============================================================================

#[tokio::test]
async fn test_margherita_lifecycle() {
    let b = bistro().await;

    // 3 pizzas at 0.2 kg each
    let order = b
        .orders
        .create_order(&b.owner, create(1, &[("Margherita", 3)]))
        .await
        .unwrap();
    assert_eq!(order.total().to_string(), "37.50");
    assert_eq!(b.flour_left().await.to_string(), "0.4");
    assert_eq!(b.servings_left(&b.margherita).await, 2);

    // Down to one: 0.4 kg and two servings come back
    let order = b
        .orders
        .update_order(&b.owner, &order.id, replace(&[("Margherita", 1)]))
        .await
        .unwrap();
    assert_eq!(order.total().to_string(), "12.50");
    assert_eq!(b.flour_left().await.to_string(), "0.8");
    assert_eq!(b.servings_left(&b.margherita).await, 4);

    let order = b
        .orders
        .update_status(&b.owner, &order.id, OrderStatus::Completed)
        .await
        .unwrap();
    assert_eq!(order.status.to_string(), "Completed");

    b.orders.delete_order(&b.owner, &order.id).await.unwrap();
    assert_eq!(b.table_status(1).await, TableStatus::Available);
    assert_eq!(b.flour_left().await.to_string(), "0.8");
}

// =============================================================================
// Concurrency
// =============================================================================

#[tokio::test]
async fn test_concurrent_creates_on_one_table_admit_exactly_one() {
    let b = bistro().await;

    let (first, second) = tokio::join!(
        b.orders.create_order(&b.owner, create(1, &[("Margherita", 1)])),
        b.orders.create_order(&b.owner, create(1, &[("Margherita", 1)])),
    );

    let outcomes = [first, second];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    let loser = outcomes.into_iter().find_map(Result::err).unwrap();
    assert!(matches!(loser, ServiceError::Domain(CoreError::TableOccupied(1))));

    assert_eq!(b.order_count().await, 1);
    assert_eq!(b.flour_left().await, Quantity::from_milli(800));
}
