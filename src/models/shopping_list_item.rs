//! Shopping List Item model
//!
//! One raw line on a shopping list, stored as entered. Unit standardization
//! and merging happen when the list is read.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;
use crate::shopping::ShoppingItem;

/// A stored shopping list line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShoppingListItem {
    pub id: i64,
    pub list_id: i64,
    pub food: String,
    pub quantity: f64,
    pub measure: String,
    pub category: String,
    pub checked: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for adding an item to a list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShoppingListItemCreate {
    pub list_id: i64,
    pub food: String,
    pub quantity: f64,
    pub measure: String,
    pub category: String,
    #[serde(default)]
    pub checked: bool,
}

/// Data for updating an item
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShoppingListItemUpdate {
    pub food: Option<String>,
    pub quantity: Option<f64>,
    pub measure: Option<String>,
    pub category: Option<String>,
    pub checked: Option<bool>,
}

impl ShoppingListItem {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            list_id: row.get("list_id")?,
            food: row.get("food")?,
            quantity: row.get("quantity")?,
            measure: row.get("measure")?,
            category: row.get("category")?,
            checked: row.get("checked")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// The aggregation view of this line
    pub fn to_shopping_item(&self) -> ShoppingItem {
        ShoppingItem {
            food: self.food.clone(),
            quantity: self.quantity,
            measure: self.measure.clone(),
            category: self.category.clone(),
            checked: self.checked,
        }
    }

    pub fn create(conn: &Connection, data: &ShoppingListItemCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO shopping_list_items (list_id, food, quantity, measure, category, checked)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                data.list_id,
                data.food,
                data.quantity,
                data.measure,
                data.category,
                data.checked,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM shopping_list_items WHERE id = ?1")?;

        match stmt.query_row([id], Self::from_row) {
            Ok(item) => Ok(Some(item)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All items on a list in insertion order
    pub fn list_for_list(conn: &Connection, list_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM shopping_list_items WHERE list_id = ?1 ORDER BY id ASC",
        )?;

        let items = stmt
            .query_map([list_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }

    /// Returns (total, checked)
    pub fn count_for_list(conn: &Connection, list_id: i64) -> DbResult<(i64, i64)> {
        let counts = conn.query_row(
            r#"
            SELECT COUNT(*), COALESCE(SUM(checked), 0)
            FROM shopping_list_items WHERE list_id = ?1
            "#,
            [list_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(counts)
    }

    /// Update provided fields; `Ok(None)` if the item does not exist
    pub fn update(conn: &Connection, id: i64, data: &ShoppingListItemUpdate) -> DbResult<Option<Self>> {
        let mut updates = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        macro_rules! add_update {
            ($field:ident, $col:expr) => {
                if let Some(ref val) = data.$field {
                    updates.push(format!("{} = ?{}", $col, params_vec.len() + 1));
                    params_vec.push(Box::new(val.clone()));
                }
            };
        }

        add_update!(food, "food");
        add_update!(quantity, "quantity");
        add_update!(measure, "measure");
        add_update!(category, "category");
        add_update!(checked, "checked");

        if updates.is_empty() {
            return Self::get_by_id(conn, id);
        }

        updates.push("updated_at = datetime('now')".to_string());

        let sql = format!(
            "UPDATE shopping_list_items SET {} WHERE id = ?{}",
            updates.join(", "),
            params_vec.len() + 1
        );
        params_vec.push(Box::new(id));

        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_refs.as_slice())?;

        Self::get_by_id(conn, id)
    }

    pub fn set_checked(conn: &Connection, id: i64, checked: bool) -> DbResult<Option<Self>> {
        Self::update(
            conn,
            id,
            &ShoppingListItemUpdate { checked: Some(checked), ..Default::default() },
        )
    }

    /// `Ok(false)` if not found
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM shopping_list_items WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }

    /// Remove every checked item on a list; returns how many were removed
    pub fn delete_checked(conn: &Connection, list_id: i64) -> DbResult<usize> {
        let rows = conn.execute(
            "DELETE FROM shopping_list_items WHERE list_id = ?1 AND checked = 1",
            [list_id],
        )?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::{ShoppingList, ShoppingListCreate};

    fn setup() -> (Connection, i64) {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        run_migrations(&conn).unwrap();
        let list = ShoppingList::create(
            &conn,
            &ShoppingListCreate { name: "Groceries".to_string(), notes: None },
        )
        .unwrap();
        (conn, list.id)
    }

    fn add(conn: &Connection, list_id: i64, food: &str, quantity: f64, measure: &str) -> ShoppingListItem {
        ShoppingListItem::create(
            conn,
            &ShoppingListItemCreate {
                list_id,
                food: food.to_string(),
                quantity,
                measure: measure.to_string(),
                category: "Produce".to_string(),
                checked: false,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_create_and_list_in_order() {
        let (conn, list_id) = setup();
        add(&conn, list_id, "Onion", 2.0, "whole");
        add(&conn, list_id, "Garlic", 3.0, "cloves");

        let items = ShoppingListItem::list_for_list(&conn, list_id).unwrap();
        let foods: Vec<&str> = items.iter().map(|i| i.food.as_str()).collect();
        assert_eq!(foods, vec!["Onion", "Garlic"]);
        assert!(!items[0].checked);
    }

    #[test]
    fn test_set_checked_and_delete_checked() {
        let (conn, list_id) = setup();
        let onion = add(&conn, list_id, "Onion", 2.0, "whole");
        add(&conn, list_id, "Garlic", 3.0, "cloves");

        let checked = ShoppingListItem::set_checked(&conn, onion.id, true).unwrap().unwrap();
        assert!(checked.checked);
        assert_eq!(ShoppingListItem::count_for_list(&conn, list_id).unwrap(), (2, 1));

        assert_eq!(ShoppingListItem::delete_checked(&conn, list_id).unwrap(), 1);
        assert_eq!(ShoppingListItem::count_for_list(&conn, list_id).unwrap(), (1, 0));
    }

    #[test]
    fn test_update_fields() {
        let (conn, list_id) = setup();
        let item = add(&conn, list_id, "Milk", 1.0, "cup");

        let updated = ShoppingListItem::update(
            &conn,
            item.id,
            &ShoppingListItemUpdate {
                quantity: Some(2.0),
                category: Some("Dairy".to_string()),
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();

        assert_eq!(updated.quantity, 2.0);
        assert_eq!(updated.category, "Dairy");
        assert_eq!(updated.measure, "cup");
    }

    #[test]
    fn test_items_cascade_with_list() {
        let (conn, list_id) = setup();
        let item = add(&conn, list_id, "Onion", 2.0, "whole");

        ShoppingList::delete(&conn, list_id).unwrap();

        assert!(ShoppingListItem::get_by_id(&conn, item.id).unwrap().is_none());
    }

    #[test]
    fn test_empty_list_counts() {
        let (conn, list_id) = setup();
        assert_eq!(ShoppingListItem::count_for_list(&conn, list_id).unwrap(), (0, 0));
    }
}
