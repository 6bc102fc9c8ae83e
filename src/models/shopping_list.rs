//! Shopping List model
//!
//! A named container for shopping list items.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

/// A stored shopping list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShoppingList {
    pub id: i64,
    pub name: String,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating a shopping list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShoppingListCreate {
    pub name: String,
    pub notes: Option<String>,
}

/// Data for updating a shopping list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShoppingListUpdate {
    pub name: Option<String>,
    pub notes: Option<String>,
}

impl ShoppingList {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            notes: row.get("notes")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    pub fn create(conn: &Connection, data: &ShoppingListCreate) -> DbResult<Self> {
        conn.execute(
            "INSERT INTO shopping_lists (name, notes) VALUES (?1, ?2)",
            params![data.name, data.notes],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM shopping_lists WHERE id = ?1")?;

        match stmt.query_row([id], Self::from_row) {
            Ok(list) => Ok(Some(list)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Most recently updated first
    pub fn list(conn: &Connection, limit: i64, offset: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM shopping_lists
            ORDER BY updated_at DESC, id DESC
            LIMIT ?1 OFFSET ?2
            "#,
        )?;

        let lists = stmt
            .query_map(params![limit, offset], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(lists)
    }

    pub fn count(conn: &Connection) -> DbResult<i64> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM shopping_lists", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Update provided fields; `Ok(None)` if the list does not exist
    pub fn update(conn: &Connection, id: i64, data: &ShoppingListUpdate) -> DbResult<Option<Self>> {
        let mut updates = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref name) = data.name {
            updates.push(format!("name = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(name.clone()));
        }
        if let Some(ref notes) = data.notes {
            updates.push(format!("notes = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(notes.clone()));
        }

        if updates.is_empty() {
            return Self::get_by_id(conn, id);
        }

        updates.push("updated_at = datetime('now')".to_string());

        let sql = format!(
            "UPDATE shopping_lists SET {} WHERE id = ?{}",
            updates.join(", "),
            params_vec.len() + 1
        );
        params_vec.push(Box::new(id));

        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_refs.as_slice())?;

        Self::get_by_id(conn, id)
    }

    /// Bump `updated_at` after item changes
    pub fn touch(conn: &Connection, id: i64) -> DbResult<()> {
        conn.execute(
            "UPDATE shopping_lists SET updated_at = datetime('now') WHERE id = ?1",
            [id],
        )?;
        Ok(())
    }

    /// Delete a list and (by cascade) its items. `Ok(false)` if not found.
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM shopping_lists WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn create(conn: &Connection, name: &str) -> ShoppingList {
        ShoppingList::create(
            conn,
            &ShoppingListCreate { name: name.to_string(), notes: None },
        )
        .unwrap()
    }

    #[test]
    fn test_create_and_get() {
        let conn = setup();
        let list = create(&conn, "Week 1");

        let fetched = ShoppingList::get_by_id(&conn, list.id).unwrap().unwrap();
        assert_eq!(fetched.name, "Week 1");
        assert_eq!(fetched.notes, None);
        assert!(ShoppingList::get_by_id(&conn, list.id + 1).unwrap().is_none());
    }

    #[test]
    fn test_update_partial() {
        let conn = setup();
        let list = create(&conn, "Week 1");

        let updated = ShoppingList::update(
            &conn,
            list.id,
            &ShoppingListUpdate { name: None, notes: Some("bulk buy".to_string()) },
        )
        .unwrap()
        .unwrap();

        assert_eq!(updated.name, "Week 1");
        assert_eq!(updated.notes.as_deref(), Some("bulk buy"));
        assert!(ShoppingList::update(&conn, 999, &ShoppingListUpdate::default()).unwrap().is_none());
    }

    #[test]
    fn test_list_count_delete() {
        let conn = setup();
        let a = create(&conn, "A");
        create(&conn, "B");

        assert_eq!(ShoppingList::count(&conn).unwrap(), 2);
        assert_eq!(ShoppingList::list(&conn, 10, 0).unwrap().len(), 2);
        assert_eq!(ShoppingList::list(&conn, 1, 1).unwrap().len(), 1);

        assert!(ShoppingList::delete(&conn, a.id).unwrap());
        assert!(!ShoppingList::delete(&conn, a.id).unwrap());
        assert_eq!(ShoppingList::count(&conn).unwrap(), 1);
    }
}
