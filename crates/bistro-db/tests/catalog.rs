//! Catalog maintenance: tables, inventory, menu.

use bistro_core::requests::{
    CreateOrderRequest, IngredientRequest, ItemRequest, MenuItemUpdate, NewInventoryItem,
    NewMenuItem, NewTable, TableUpdate,
};
use bistro_core::{
    BusinessLimits, CoreError, ErrorKind, MenuCategory, Principal, Quantity, Role, TableStatus,
    Unit,
};
use bistro_db::{Catalog, Database, DbConfig, OrderWorkflow, ServiceError};

async fn catalog_with(limits: BusinessLimits) -> (Catalog, OrderWorkflow, Principal) {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    (
        Catalog::new(db.clone(), limits),
        OrderWorkflow::new(db, limits),
        Principal::new("manager-1", Role::Manager),
    )
}

fn ingredient(name: &str, milli: i64, unit: Unit) -> NewInventoryItem {
    NewInventoryItem {
        name: name.to_string(),
        quantity: Quantity::from_milli(milli),
        unit,
        threshold: None,
    }
}

fn dish(name: &str, recipe: &[(&str, i64)]) -> NewMenuItem {
    NewMenuItem {
        name: name.to_string(),
        description: String::new(),
        category: MenuCategory::MainCourse,
        price_cents: 1800,
        ingredients: recipe
            .iter()
            .map(|(name, milli)| IngredientRequest {
                name: name.to_string(),
                per_serving: Quantity::from_milli(*milli),
            })
            .collect(),
        stock: 10,
    }
}

// =============================================================================
// Tables
// =============================================================================

#[tokio::test]
async fn test_new_tables_start_available() {
    let (catalog, _, manager) = catalog_with(BusinessLimits::default()).await;

    let table = catalog
        .create_table(&manager, NewTable { table_number: 7, seats: 4 })
        .await
        .unwrap();

    assert_eq!(table.status, TableStatus::Available);
    assert_eq!(table.owner_id, "manager-1");
    assert_eq!(catalog.get_table(&table.id).await.unwrap().seats, 4);
}

#[tokio::test]
async fn test_table_limit_and_duplicates() {
    let (catalog, _, manager) = catalog_with(BusinessLimits::default().with_max_tables(2)).await;

    catalog
        .create_table(&manager, NewTable { table_number: 1, seats: 2 })
        .await
        .unwrap();

    let err = catalog
        .create_table(&manager, NewTable { table_number: 1, seats: 6 })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    catalog
        .create_table(&manager, NewTable { table_number: 2, seats: 2 })
        .await
        .unwrap();
    let err = catalog
        .create_table(&manager, NewTable { table_number: 3, seats: 2 })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Domain(CoreError::LimitReached { max: 2, .. })
    ));
    assert_eq!(catalog.list_tables().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_table_fields_are_validated() {
    let (catalog, _, manager) = catalog_with(BusinessLimits::default()).await;

    let err = catalog
        .create_table(&manager, NewTable { table_number: 0, seats: 2 })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Invalid);

    let table = catalog
        .create_table(&manager, NewTable { table_number: 1, seats: 2 })
        .await
        .unwrap();
    let err = catalog
        .update_table(&manager, &table.id, TableUpdate { seats: None })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingField);

    let updated = catalog
        .update_table(&manager, &table.id, TableUpdate { seats: Some(8) })
        .await
        .unwrap();
    assert_eq!(updated.seats, 8);
    assert_eq!(updated.status, TableStatus::Available);
}

#[tokio::test]
async fn test_occupied_table_cannot_be_deleted() {
    let (catalog, orders, manager) = catalog_with(BusinessLimits::default()).await;
    let table = catalog
        .create_table(&manager, NewTable { table_number: 4, seats: 2 })
        .await
        .unwrap();
    catalog
        .create_menu_item(&manager, dish("Risotto", &[]))
        .await
        .unwrap();
    let order = orders
        .create_order(
            &manager,
            CreateOrderRequest {
                customer_name: Some("Lin".to_string()),
                table_number: Some(4),
                items: Some(vec![ItemRequest::new("Risotto", 1)]),
            },
        )
        .await
        .unwrap();

    let err = catalog.delete_table(&manager, &table.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::Domain(CoreError::TableInUse(4))));

    orders.delete_order(&manager, &order.id).await.unwrap();
    catalog.delete_table(&manager, &table.id).await.unwrap();
    assert!(catalog.list_tables().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_only_the_owner_edits_a_table() {
    let (catalog, _, manager) = catalog_with(BusinessLimits::default()).await;
    let other = Principal::new("manager-2", Role::Manager);
    let table = catalog
        .create_table(&manager, NewTable { table_number: 1, seats: 2 })
        .await
        .unwrap();

    let err = catalog
        .update_table(&other, &table.id, TableUpdate { seats: Some(3) })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    let err = catalog.delete_table(&other, &table.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);
    assert_eq!(catalog.get_table(&table.id).await.unwrap().seats, 2);
}

// =============================================================================
// Inventory
// =============================================================================

#[tokio::test]
async fn test_inventory_defaults_and_duplicates() {
    let (catalog, _, manager) = catalog_with(BusinessLimits::default()).await;

    let rice = catalog
        .create_inventory_item(&manager, ingredient("arborio rice", 12_500, Unit::Kg))
        .await
        .unwrap();
    assert_eq!(rice.threshold, Quantity::from_milli(5_000));
    assert_eq!(rice.unit, Unit::Kg);

    let err = catalog
        .create_inventory_item(&manager, ingredient("arborio rice", 1_000, Unit::Kg))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let err = catalog
        .create_inventory_item(&manager, ingredient("stock", -1, Unit::Litre))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Invalid);
}

#[tokio::test]
async fn test_restock_and_low_stock_report() {
    let (catalog, _, manager) = catalog_with(BusinessLimits::default()).await;
    let saffron = catalog
        .create_inventory_item(&manager, ingredient("saffron", 20_000, Unit::G))
        .await
        .unwrap();
    let butter = catalog
        .create_inventory_item(&manager, ingredient("butter", 4_999, Unit::Kg))
        .await
        .unwrap();
    catalog
        .create_inventory_item(&manager, ingredient("parmesan", 5_000, Unit::Kg))
        .await
        .unwrap();

    // Strictly below the threshold: exactly 5 is not low
    let low: Vec<String> = catalog
        .low_stock()
        .await
        .unwrap()
        .into_iter()
        .map(|item| item.name)
        .collect();
    assert_eq!(low, vec!["butter".to_string()]);

    let butter = catalog
        .restock_inventory(&butter.id, Quantity::from_milli(1))
        .await
        .unwrap();
    assert_eq!(butter.quantity, Quantity::from_milli(5_000));
    assert!(catalog.low_stock().await.unwrap().is_empty());

    let saffron = catalog
        .set_threshold(&saffron.id, Quantity::from_milli(25_000))
        .await
        .unwrap();
    assert!(saffron.is_low_stock());
    assert_eq!(catalog.low_stock().await.unwrap().len(), 1);

    let err = catalog
        .restock_inventory(&saffron.id, Quantity::zero())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Invalid);

    let err = catalog
        .restock_inventory("missing", Quantity::from_milli(1_000))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_restock_past_the_storable_range_is_rejected() {
    let (catalog, _, manager) = catalog_with(BusinessLimits::default()).await;
    let salt = catalog
        .create_inventory_item(&manager, ingredient("salt", 1_000, Unit::Kg))
        .await
        .unwrap();

    let err = catalog
        .restock_inventory(&salt.id, Quantity::from_milli(i64::MAX))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Invalid);
    let salt = catalog.get_inventory_item(&salt.id).await.unwrap();
    assert_eq!(salt.quantity, Quantity::from_milli(1_000));
}

// =============================================================================
// Menu
// =============================================================================

#[tokio::test]
async fn test_menu_item_recipe_resolves_ingredient_names() {
    let (catalog, _, manager) = catalog_with(BusinessLimits::default()).await;
    let rice = catalog
        .create_inventory_item(&manager, ingredient("arborio rice", 5_000, Unit::Kg))
        .await
        .unwrap();
    let saffron = catalog
        .create_inventory_item(&manager, ingredient("saffron", 50_000, Unit::G))
        .await
        .unwrap();

    let risotto = catalog
        .create_menu_item(
            &manager,
            dish("Risotto alla Milanese", &[("arborio rice", 90), ("saffron", 250)]),
        )
        .await
        .unwrap();

    assert_eq!(risotto.ingredients.len(), 2);
    assert_eq!(risotto.ingredients[0].ingredient_id, rice.id);
    assert_eq!(risotto.ingredients[1].ingredient_id, saffron.id);
    assert_eq!(risotto.ingredients[1].per_serving, Quantity::from_milli(250));

    let stored = catalog.get_menu_item(&risotto.id).await.unwrap();
    assert_eq!(stored.ingredients, risotto.ingredients);
    assert_eq!(stored.category, MenuCategory::MainCourse);
}

#[tokio::test]
async fn test_unknown_recipe_ingredient_creates_nothing() {
    let (catalog, _, manager) = catalog_with(BusinessLimits::default()).await;
    catalog
        .create_inventory_item(&manager, ingredient("arborio rice", 5_000, Unit::Kg))
        .await
        .unwrap();

    let err = catalog
        .create_menu_item(&manager, dish("Risotto", &[("arborio rice", 90), ("truffle", 10)]))
        .await
        .unwrap_err();

    match err {
        ServiceError::Domain(CoreError::IngredientNotFound(name)) => assert_eq!(name, "truffle"),
        other => panic!("expected IngredientNotFound, got {other:?}"),
    }
    assert!(catalog.list_menu().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_menu_limit_and_duplicate_names() {
    let (catalog, _, manager) = catalog_with(BusinessLimits::default().with_max_menu_items(2)).await;

    catalog.create_menu_item(&manager, dish("Soup", &[])).await.unwrap();
    let err = catalog
        .create_menu_item(&manager, dish("Soup", &[]))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    catalog.create_menu_item(&manager, dish("Salad", &[])).await.unwrap();
    let err = catalog
        .create_menu_item(&manager, dish("Stew", &[]))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Domain(CoreError::LimitReached { max: 2, .. })
    ));
}

#[tokio::test]
async fn test_menu_price_is_capped() {
    let (catalog, _, manager) = catalog_with(BusinessLimits::default()).await;

    let mut pricey = dish("Gold Leaf Risotto", &[]);
    pricey.price_cents = i64::MAX;
    let err = catalog.create_menu_item(&manager, pricey).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Invalid);
    assert!(catalog.list_menu().await.unwrap().is_empty());

    let soup = catalog.create_menu_item(&manager, dish("Soup", &[])).await.unwrap();
    let err = catalog
        .update_menu_item(
            &manager,
            &soup.id,
            MenuItemUpdate {
                price_cents: Some(100_000_001),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Invalid);
}

#[tokio::test]
async fn test_recipe_ingredient_names_are_exact() {
    let (catalog, _, manager) = catalog_with(BusinessLimits::default()).await;
    catalog
        .create_inventory_item(&manager, ingredient("arborio rice", 5_000, Unit::Kg))
        .await
        .unwrap();

    let err = catalog
        .create_menu_item(&manager, dish("Risotto", &[(" arborio rice", 90)]))
        .await
        .unwrap_err();

    match err {
        ServiceError::Domain(CoreError::IngredientNotFound(name)) => {
            assert_eq!(name, " arborio rice")
        }
        other => panic!("expected IngredientNotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn test_menu_update_is_narrow_and_owner_only() {
    let (catalog, _, manager) = catalog_with(BusinessLimits::default()).await;
    let soup = catalog.create_menu_item(&manager, dish("Soup", &[])).await.unwrap();

    let err = catalog
        .update_menu_item(&manager, &soup.id, MenuItemUpdate::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingField);

    let err = catalog
        .update_menu_item(
            &manager,
            &soup.id,
            MenuItemUpdate {
                stock: Some(-1),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Invalid);

    let other = Principal::new("manager-2", Role::Admin);
    let err = catalog
        .update_menu_item(
            &other,
            &soup.id,
            MenuItemUpdate {
                price_cents: Some(1),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    let updated = catalog
        .update_menu_item(
            &manager,
            &soup.id,
            MenuItemUpdate {
                description: Some("Minestrone".to_string()),
                stock: Some(3),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.price_cents, 1800);
    assert_eq!(updated.description, "Minestrone");
    assert_eq!(updated.stock, 3);
}
