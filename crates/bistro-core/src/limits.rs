//! # Business Limits
//!
//! Count caps for the catalog and size caps for orders. They are plain
//! values handed to the workflows at construction time, so a deployment
//! (or a test) can raise or lower them without touching code.

use serde::{Deserialize, Serialize};

/// Injectable count and size limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessLimits {
    /// Maximum number of tables in the registry.
    pub max_tables: usize,
    /// Maximum number of dishes on the menu.
    pub max_menu_items: usize,
    /// Maximum quantity on a single order line.
    pub max_item_quantity: i64,
    /// Maximum number of lines in one order request.
    pub max_order_lines: usize,
}

impl BusinessLimits {
    pub const DEFAULT_MAX_TABLES: usize = 10;
    pub const DEFAULT_MAX_MENU_ITEMS: usize = 10;
    pub const DEFAULT_MAX_ITEM_QUANTITY: i64 = 999;
    pub const DEFAULT_MAX_ORDER_LINES: usize = 100;

    pub fn with_max_tables(mut self, max: usize) -> Self {
        self.max_tables = max;
        self
    }

    pub fn with_max_menu_items(mut self, max: usize) -> Self {
        self.max_menu_items = max;
        self
    }
}

impl Default for BusinessLimits {
    fn default() -> Self {
        Self {
            max_tables: Self::DEFAULT_MAX_TABLES,
            max_menu_items: Self::DEFAULT_MAX_MENU_ITEMS,
            max_item_quantity: Self::DEFAULT_MAX_ITEM_QUANTITY,
            max_order_lines: Self::DEFAULT_MAX_ORDER_LINES,
        }
    }
}
