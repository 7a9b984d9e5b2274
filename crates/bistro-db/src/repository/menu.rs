//! # Menu Repository
//!
//! Database operations for dishes and their recipes.
//!
//! A dish is spread over two tables:
//! ```text
//! menu_items             menu_item_ingredients
//! ┌────────────────┐     ┌──────────────┬──────────┬───────────────┬───────────────────┐
//! │ id             │◄────│ menu_item_id │ position │ ingredient_id │ per_serving_milli │
//! │ name, price    │     └──────────────┴──────────┴───────────────┴───────────────────┘
//! │ stock          │      recipe lines, in declaration order
//! └────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::DbResult;
use bistro_core::{IngredientRequirement, MenuCategory, MenuItem, Quantity};

#[derive(Debug, Clone, sqlx::FromRow)]
struct MenuRecord {
    id: String,
    name: String,
    description: String,
    category: MenuCategory,
    price_cents: i64,
    stock: i64,
    owner_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl MenuRecord {
    fn into_menu_item(self, ingredients: Vec<IngredientRequirement>) -> MenuItem {
        MenuItem {
            id: self.id,
            name: self.name,
            description: self.description,
            category: self.category,
            price_cents: self.price_cents,
            ingredients,
            stock: self.stock,
            owner_id: self.owner_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct RecipeRecord {
    ingredient_id: String,
    per_serving_milli: i64,
}

const SELECT_MENU: &str = r#"
    SELECT id, name, description, category, price_cents, stock, owner_id, created_at, updated_at
    FROM menu_items
"#;

/// Repository for menu operations.
pub struct MenuRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> MenuRepository<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        MenuRepository { conn }
    }

    /// Exact, case-sensitive name match. First match wins.
    pub async fn find_by_name(&mut self, name: &str) -> DbResult<Option<MenuItem>> {
        let record = sqlx::query_as::<_, MenuRecord>(&format!(
            "{} WHERE name = ? ORDER BY created_at LIMIT 1",
            SELECT_MENU
        ))
        .bind(name)
        .fetch_optional(&mut *self.conn)
        .await?;

        match record {
            Some(record) => {
                let recipe = self.recipe(&record.id).await?;
                Ok(Some(record.into_menu_item(recipe)))
            }
            None => Ok(None),
        }
    }

    pub async fn find_by_id(&mut self, id: &str) -> DbResult<Option<MenuItem>> {
        let record = sqlx::query_as::<_, MenuRecord>(&format!("{} WHERE id = ?", SELECT_MENU))
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?;

        match record {
            Some(record) => {
                let recipe = self.recipe(&record.id).await?;
                Ok(Some(record.into_menu_item(recipe)))
            }
            None => Ok(None),
        }
    }

    pub async fn list(&mut self) -> DbResult<Vec<MenuItem>> {
        let records = sqlx::query_as::<_, MenuRecord>(&format!("{} ORDER BY name", SELECT_MENU))
            .fetch_all(&mut *self.conn)
            .await?;

        let mut items = Vec::with_capacity(records.len());
        for record in records {
            let recipe = self.recipe(&record.id).await?;
            items.push(record.into_menu_item(recipe));
        }
        Ok(items)
    }

    pub async fn count(&mut self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM menu_items")
            .fetch_one(&mut *self.conn)
            .await?;
        Ok(count)
    }

    /// Current serving counter, `None` if the dish is gone.
    pub async fn stock_of(&mut self, id: &str) -> DbResult<Option<i64>> {
        let stock: Option<i64> = sqlx::query_scalar("SELECT stock FROM menu_items WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?;
        Ok(stock)
    }

    async fn recipe(&mut self, menu_item_id: &str) -> DbResult<Vec<IngredientRequirement>> {
        let rows = sqlx::query_as::<_, RecipeRecord>(
            r#"
            SELECT ingredient_id, per_serving_milli
            FROM menu_item_ingredients
            WHERE menu_item_id = ?
            ORDER BY position
            "#,
        )
        .bind(menu_item_id)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| IngredientRequirement {
                ingredient_id: r.ingredient_id,
                per_serving: Quantity::from_milli(r.per_serving_milli),
            })
            .collect())
    }

    /// Inserts the dish and its recipe lines.
    pub async fn insert(&mut self, item: &MenuItem) -> DbResult<()> {
        debug!(
            name = %item.name,
            price_cents = item.price_cents,
            ingredients = item.ingredients.len(),
            "Inserting menu item"
        );

        sqlx::query(
            r#"
            INSERT INTO menu_items (
                id, name, description, category, price_cents, stock, owner_id, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&item.id)
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.category)
        .bind(item.price_cents)
        .bind(item.stock)
        .bind(&item.owner_id)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&mut *self.conn)
        .await?;

        for (position, requirement) in item.ingredients.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO menu_item_ingredients (
                    menu_item_id, position, ingredient_id, per_serving_milli
                ) VALUES (?, ?, ?, ?)
                "#,
            )
            .bind(&item.id)
            .bind(position as i64)
            .bind(&requirement.ingredient_id)
            .bind(requirement.per_serving.milli())
            .execute(&mut *self.conn)
            .await?;
        }

        Ok(())
    }

    /// Writes the narrow set of editable fields. `None` keeps the stored value.
    pub async fn update_fields(
        &mut self,
        id: &str,
        price_cents: Option<i64>,
        description: Option<&str>,
        stock: Option<i64>,
    ) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE menu_items
            SET price_cents = COALESCE(?, price_cents),
                description = COALESCE(?, description),
                stock = COALESCE(?, stock),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(price_cents)
        .bind(description)
        .bind(stock)
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *self.conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Guarded decrement of the serving counter.
    /// Returns `false` when fewer than `servings` are left.
    pub async fn consume_stock(&mut self, id: &str, servings: i64) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE menu_items
            SET stock = stock - ?1, updated_at = ?2
            WHERE id = ?3 AND stock >= ?1
            "#,
        )
        .bind(servings)
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *self.conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Returns servings to the counter. `false` when the dish is gone.
    pub async fn restock(&mut self, id: &str, servings: i64) -> DbResult<bool> {
        let result =
            sqlx::query("UPDATE menu_items SET stock = stock + ?, updated_at = ? WHERE id = ?")
                .bind(servings)
                .bind(Utc::now())
                .bind(id)
                .execute(&mut *self.conn)
                .await?;

        Ok(result.rows_affected() == 1)
    }
}
