//! Data models
//!
//! Rust structs representing database entities.

mod shopping_list;
mod shopping_list_item;

pub use shopping_list::{ShoppingList, ShoppingListCreate, ShoppingListUpdate};
pub use shopping_list_item::{ShoppingListItem, ShoppingListItemCreate, ShoppingListItemUpdate};
