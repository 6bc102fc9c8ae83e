//! Database migrations
//!
//! Schema creation and versioning.

use rusqlite::Connection;

use super::connection::DbResult;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// Bring the database up to `SCHEMA_VERSION`
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
        tracing::info!("Applied schema migration v1");
    }

    Ok(())
}

/// Migration v1: shopping lists and their items
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- SHOPPING LISTS
        -- ============================================
        CREATE TABLE shopping_lists (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            notes TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_shopping_lists_name ON shopping_lists(name);

        -- ============================================
        -- SHOPPING LIST ITEMS
        -- Raw lines as entered; aggregation happens on read
        -- ============================================
        CREATE TABLE shopping_list_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            list_id INTEGER NOT NULL REFERENCES shopping_lists(id) ON DELETE CASCADE,
            food TEXT NOT NULL,
            quantity REAL NOT NULL,
            measure TEXT NOT NULL DEFAULT '',     -- free-form, e.g. "cup", "lb"
            category TEXT NOT NULL DEFAULT 'Other',
            checked INTEGER NOT NULL DEFAULT 0,   -- boolean
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_shopping_list_items_list ON shopping_list_items(list_id);
        "#,
    )?;

    Ok(())
}

pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

pub fn needs_migration(conn: &Connection) -> DbResult<bool> {
    Ok(get_schema_version(conn)? < SCHEMA_VERSION)
}
