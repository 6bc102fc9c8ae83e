//! Shopping list module
//!
//! Unit standardization and per-category aggregation of shopping list lines.

pub mod aggregator;
pub mod categorize;
pub mod units;

pub use aggregator::{aggregate, CategoryGroup, GroupedShoppingList, ShoppingItem};
pub use categorize::{categorize_food, Category};
pub use units::{measure_kind, standardize, MeasureKind, StandardQuantity};
