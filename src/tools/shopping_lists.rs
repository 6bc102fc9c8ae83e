//! Shopping List Tools
//!
//! Tools for managing stored shopping lists and for standardizing and
//! aggregating ad-hoc item collections.

use serde::{Deserialize, Serialize};

use crate::db::Database;
use crate::models::{
    ShoppingList, ShoppingListCreate, ShoppingListItem, ShoppingListItemCreate,
    ShoppingListItemUpdate, ShoppingListUpdate,
};
use crate::shopping::{
    aggregate, categorize_food, measure_kind, standardize, GroupedShoppingList, MeasureKind,
    ShoppingItem,
};

// ============================================================================
// Input Types
// ============================================================================

/// An item to add to a stored list
#[derive(Debug, Clone, Deserialize)]
pub struct NewShoppingItem {
    pub food: String,
    pub quantity: f64,
    #[serde(default)]
    pub measure: Option<String>,
    /// Falls back to the default grocery category for `food`
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub checked: bool,
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct CreateShoppingListResponse {
    pub id: i64,
    pub name: String,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct ShoppingListSummary {
    pub id: i64,
    pub name: String,
    pub notes: Option<String>,
    pub item_count: i64,
    pub checked_count: i64,
    pub updated_at: String,
}

#[derive(Debug, Serialize)]
pub struct ListShoppingListsResponse {
    pub lists: Vec<ShoppingListSummary>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Full list with raw items and, optionally, the merged per-category view
#[derive(Debug, Serialize)]
pub struct ShoppingListDetail {
    pub id: i64,
    pub name: String,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub item_count: usize,
    pub checked_count: usize,
    pub items: Vec<ShoppingListItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregated: Option<GroupedShoppingList>,
}

#[derive(Debug, Serialize)]
pub struct AddShoppingItemsResponse {
    pub list_id: i64,
    pub added: Vec<ShoppingListItem>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub deleted_id: i64,
}

#[derive(Debug, Serialize)]
pub struct ClearCheckedResponse {
    pub list_id: i64,
    pub removed: usize,
}

#[derive(Debug, Serialize)]
pub struct StandardizeResponse {
    pub input_quantity: f64,
    pub input_measure: String,
    pub quantity: f64,
    pub measure: String,
    pub kind: MeasureKind,
}

#[derive(Debug, Serialize)]
pub struct AggregateResponse {
    pub input_count: usize,
    pub category_count: usize,
    pub item_count: usize,
    pub grouped: GroupedShoppingList,
}

// ============================================================================
// Validation
// ============================================================================

fn validate_name(name: &str) -> Result<String, String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Shopping list name cannot be empty".to_string());
    }
    Ok(name.to_string())
}

fn validate_food(food: &str) -> Result<String, String> {
    let food = food.trim();
    if food.is_empty() {
        return Err("food cannot be empty".to_string());
    }
    Ok(food.to_string())
}

fn validate_quantity(quantity: f64) -> Result<f64, String> {
    if !quantity.is_finite() {
        return Err("quantity must be a finite number".to_string());
    }
    if quantity < 0.0 {
        return Err("quantity cannot be negative".to_string());
    }
    Ok(quantity)
}

fn resolve_category(food: &str, category: Option<&str>) -> String {
    match category.map(str::trim) {
        Some(c) if !c.is_empty() => c.to_string(),
        _ => categorize_food(food).as_str().to_string(),
    }
}

fn require_list(db: &Database, list_id: i64) -> Result<ShoppingList, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    ShoppingList::get_by_id(&conn, list_id)
        .map_err(|e| format!("Failed to get shopping list: {}", e))?
        .ok_or_else(|| format!("Shopping list {} not found", list_id))
}

// ============================================================================
// Shopping Lists
// ============================================================================

pub fn create_shopping_list(
    db: &Database,
    name: &str,
    notes: Option<String>,
) -> Result<CreateShoppingListResponse, String> {
    let name = validate_name(name)?;
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let list = ShoppingList::create(&conn, &ShoppingListCreate { name, notes })
        .map_err(|e| format!("Failed to create shopping list: {}", e))?;

    tracing::info!(id = list.id, name = %list.name, "Created shopping list");

    Ok(CreateShoppingListResponse {
        id: list.id,
        name: list.name,
        created_at: list.created_at,
    })
}

pub fn list_shopping_lists(
    db: &Database,
    limit: i64,
    offset: i64,
) -> Result<ListShoppingListsResponse, String> {
    let limit = limit.clamp(1, 200);
    let offset = offset.max(0);
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let lists = ShoppingList::list(&conn, limit, offset)
        .map_err(|e| format!("Failed to list shopping lists: {}", e))?;
    let total = ShoppingList::count(&conn).map_err(|e| format!("Failed to count shopping lists: {}", e))?;

    let mut summaries = Vec::with_capacity(lists.len());
    for list in lists {
        let (item_count, checked_count) = ShoppingListItem::count_for_list(&conn, list.id)
            .map_err(|e| format!("Failed to count items: {}", e))?;
        summaries.push(ShoppingListSummary {
            id: list.id,
            name: list.name,
            notes: list.notes,
            item_count,
            checked_count,
            updated_at: list.updated_at,
        });
    }

    Ok(ListShoppingListsResponse { lists: summaries, total, limit, offset })
}

/// Get a list with its items; `aggregated` adds the merged per-category view
pub fn get_shopping_list(
    db: &Database,
    id: i64,
    aggregated: bool,
) -> Result<Option<ShoppingListDetail>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let list = match ShoppingList::get_by_id(&conn, id)
        .map_err(|e| format!("Failed to get shopping list: {}", e))?
    {
        Some(list) => list,
        None => return Ok(None),
    };

    let items = ShoppingListItem::list_for_list(&conn, id)
        .map_err(|e| format!("Failed to list items: {}", e))?;

    let grouped = aggregated.then(|| {
        let flat: Vec<ShoppingItem> = items.iter().map(ShoppingListItem::to_shopping_item).collect();
        aggregate(&flat)
    });

    Ok(Some(ShoppingListDetail {
        id: list.id,
        name: list.name,
        notes: list.notes,
        created_at: list.created_at,
        updated_at: list.updated_at,
        item_count: items.len(),
        checked_count: items.iter().filter(|i| i.checked).count(),
        items,
        aggregated: grouped,
    }))
}

/// Load a list and its merged view; used by the exporters
pub fn load_grouped_list(db: &Database, id: i64) -> Result<(ShoppingList, GroupedShoppingList), String> {
    let list = require_list(db, id)?;
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let items: Vec<ShoppingItem> = ShoppingListItem::list_for_list(&conn, id)
        .map_err(|e| format!("Failed to list items: {}", e))?
        .iter()
        .map(ShoppingListItem::to_shopping_item)
        .collect();

    Ok((list, aggregate(&items)))
}

pub fn update_shopping_list(
    db: &Database,
    id: i64,
    name: Option<String>,
    notes: Option<String>,
) -> Result<Option<ShoppingList>, String> {
    let name = name.as_deref().map(validate_name).transpose()?;
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    ShoppingList::update(&conn, id, &ShoppingListUpdate { name, notes })
        .map_err(|e| format!("Failed to update shopping list: {}", e))
}

pub fn delete_shopping_list(db: &Database, id: i64) -> Result<DeleteResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let deleted = ShoppingList::delete(&conn, id)
        .map_err(|e| format!("Failed to delete shopping list: {}", e))?;

    if deleted {
        tracing::info!(id, "Deleted shopping list");
    }

    Ok(DeleteResponse { success: deleted, deleted_id: id })
}

// ============================================================================
// Shopping List Items
// ============================================================================

/// Add items to a list. All items are validated before any is inserted, and
/// the inserts share one transaction.
pub fn add_shopping_items(
    db: &Database,
    list_id: i64,
    items: Vec<NewShoppingItem>,
) -> Result<AddShoppingItemsResponse, String> {
    if items.is_empty() {
        return Err("items cannot be empty".to_string());
    }

    let mut creates = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        let food = validate_food(&item.food).map_err(|e| format!("item {}: {}", i, e))?;
        let quantity = validate_quantity(item.quantity).map_err(|e| format!("item {}: {}", i, e))?;
        let category = resolve_category(&food, item.category.as_deref());
        creates.push(ShoppingListItemCreate {
            list_id,
            food,
            quantity,
            measure: item.measure.map(|m| m.trim().to_string()).unwrap_or_default(),
            category,
            checked: item.checked,
        });
    }

    require_list(db, list_id)?;

    let added = db
        .with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let mut added = Vec::with_capacity(creates.len());
            for create in &creates {
                added.push(ShoppingListItem::create(&tx, create)?);
            }
            ShoppingList::touch(&tx, list_id)?;
            tx.commit()?;
            Ok(added)
        })
        .map_err(|e| format!("Failed to add shopping items: {}", e))?;

    tracing::debug!(list_id, count = added.len(), "Added shopping items");

    Ok(AddShoppingItemsResponse { list_id, added })
}

pub fn update_shopping_item(
    db: &Database,
    id: i64,
    data: ShoppingListItemUpdate,
) -> Result<Option<ShoppingListItem>, String> {
    let food = data.food.as_deref().map(validate_food).transpose()?;
    let quantity = data.quantity.map(validate_quantity).transpose()?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    // A blank category is re-derived from the (new or stored) food, as on add
    let category = match data.category {
        Some(c) if c.trim().is_empty() => {
            let food = match food {
                Some(ref f) => f.clone(),
                None => match ShoppingListItem::get_by_id(&conn, id)
                    .map_err(|e| format!("Failed to get shopping item: {}", e))?
                {
                    Some(existing) => existing.food,
                    None => return Ok(None),
                },
            };
            Some(resolve_category(&food, None))
        }
        other => other.map(|c| c.trim().to_string()),
    };

    let data = ShoppingListItemUpdate {
        food,
        quantity,
        measure: data.measure.map(|m| m.trim().to_string()),
        category,
        checked: data.checked,
    };

    let item = ShoppingListItem::update(&conn, id, &data)
        .map_err(|e| format!("Failed to update shopping item: {}", e))?;

    if let Some(ref item) = item {
        ShoppingList::touch(&conn, item.list_id).map_err(|e| format!("Failed to update shopping list: {}", e))?;
    }

    Ok(item)
}

pub fn set_shopping_item_checked(
    db: &Database,
    id: i64,
    checked: bool,
) -> Result<Option<ShoppingListItem>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let item = ShoppingListItem::set_checked(&conn, id, checked)
        .map_err(|e| format!("Failed to update shopping item: {}", e))?;

    if let Some(ref item) = item {
        ShoppingList::touch(&conn, item.list_id).map_err(|e| format!("Failed to update shopping list: {}", e))?;
    }

    Ok(item)
}

pub fn remove_shopping_item(db: &Database, id: i64) -> Result<DeleteResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let item = ShoppingListItem::get_by_id(&conn, id)
        .map_err(|e| format!("Failed to get shopping item: {}", e))?;

    let deleted = ShoppingListItem::delete(&conn, id)
        .map_err(|e| format!("Failed to remove shopping item: {}", e))?;

    if let (true, Some(item)) = (deleted, item) {
        ShoppingList::touch(&conn, item.list_id).map_err(|e| format!("Failed to update shopping list: {}", e))?;
    }

    Ok(DeleteResponse { success: deleted, deleted_id: id })
}

pub fn clear_checked_items(db: &Database, list_id: i64) -> Result<ClearCheckedResponse, String> {
    require_list(db, list_id)?;
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let removed = ShoppingListItem::delete_checked(&conn, list_id)
        .map_err(|e| format!("Failed to clear checked items: {}", e))?;

    if removed > 0 {
        ShoppingList::touch(&conn, list_id).map_err(|e| format!("Failed to update shopping list: {}", e))?;
    }

    Ok(ClearCheckedResponse { list_id, removed })
}

// ============================================================================
// Stateless
// ============================================================================

pub fn standardize_quantity(quantity: f64, measure: &str) -> StandardizeResponse {
    let standard = standardize(quantity, measure);
    StandardizeResponse {
        input_quantity: quantity,
        input_measure: measure.to_string(),
        quantity: standard.quantity,
        measure: standard.measure,
        kind: measure_kind(measure),
    }
}

pub fn aggregate_shopping_items(items: &[ShoppingItem]) -> AggregateResponse {
    let grouped = aggregate(items);
    AggregateResponse {
        input_count: items.len(),
        category_count: grouped.len(),
        item_count: grouped.item_count(),
        grouped,
    }
}
