//! FitPlan MCP Server Implementation
//!
//! Exposes the shopping list, export and health tools over MCP.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::db::Database;
use crate::models::ShoppingListItemUpdate;
use crate::rate_limit::RateLimitStore;
use crate::shopping::ShoppingItem;
use crate::tools::export;
use crate::tools::health;
use crate::tools::shopping_lists::{self, NewShoppingItem};
use crate::tools::status::StatusTracker;

/// FitPlan MCP Service
#[derive(Clone)]
pub struct FitPlanService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    rate_limiter: Arc<dyn RateLimitStore>,
    tool_router: ToolRouter<FitPlanService>,
}

impl FitPlanService {
    pub fn new(
        database_path: PathBuf,
        database: Database,
        rate_limiter: Arc<dyn RateLimitStore>,
        rate_limit_description: String,
    ) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(
                database_path,
                rate_limit_description,
            ))),
            database,
            rate_limiter,
            tool_router: Self::tool_router(),
        }
    }

    /// Consult the rate limiter for a mutating tool
    fn check_rate(&self, key: &str) -> Result<(), McpError> {
        if self.rate_limiter.check(key) {
            Ok(())
        } else {
            tracing::warn!(tool = key, "Rate limit exceeded");
            Err(McpError::invalid_request(format!("Rate limit exceeded for {}", key), None))
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn not_found(what: &str, id: i64) -> Result<CallToolResult, McpError> {
    let json = format!(r#"{{"error": "{} not found", "id": {}}}"#, what, id);
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

// ============================================================================
// Shopping List Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateShoppingListParams {
    /// Name of the list (e.g., "Week of 2026-03-02")
    pub name: String,
    /// Optional notes
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListShoppingListsParams {
    /// Maximum results (default 50, max 200)
    #[serde(default = "default_list_limit")]
    pub limit: i64,
    /// Offset for pagination (default 0)
    #[serde(default)]
    pub offset: i64,
}

fn default_list_limit() -> i64 { 50 }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetShoppingListParams {
    /// Shopping list ID
    pub id: i64,
    /// Include the merged per-category view (default true)
    #[serde(default = "default_true")]
    pub aggregated: bool,
}

fn default_true() -> bool { true }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateShoppingListParams {
    /// Shopping list ID
    pub id: i64,
    /// New name (optional)
    pub name: Option<String>,
    /// New notes (optional)
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ShoppingListIdParams {
    /// Shopping list ID
    pub list_id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteShoppingListParams {
    /// Shopping list ID to delete (items are deleted with it)
    pub id: i64,
}

/// Single item for add_shopping_items
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ShoppingItemParam {
    /// Ingredient name (e.g., "Garlic")
    pub food: String,
    /// Amount in the given measure, zero or more
    pub quantity: f64,
    /// Unit as written in the recipe (e.g., "cloves", "cup", "lb"); optional
    pub measure: Option<String>,
    /// Grocery category; inferred from the food name when omitted
    pub category: Option<String>,
    /// Already bought (default false)
    #[serde(default)]
    pub checked: bool,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddShoppingItemsParams {
    /// Shopping list ID
    pub list_id: i64,
    /// Items to add
    pub items: Vec<ShoppingItemParam>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateShoppingItemParams {
    /// Shopping list item ID
    pub id: i64,
    pub food: Option<String>,
    pub quantity: Option<f64>,
    pub measure: Option<String>,
    pub category: Option<String>,
    pub checked: Option<bool>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetShoppingItemCheckedParams {
    /// Shopping list item ID
    pub id: i64,
    /// Checked state
    pub checked: bool,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RemoveShoppingItemParams {
    /// Shopping list item ID
    pub id: i64,
}

// ============================================================================
// Stateless / Export / Health Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct StandardizeQuantityParams {
    pub quantity: f64,
    /// Unit to standardize (e.g., "cup", "lb", "cloves")
    pub measure: String,
}

/// Single item for aggregate_shopping_items
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AggregateItemParam {
    pub food: String,
    pub quantity: f64,
    #[serde(default)]
    pub measure: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub checked: bool,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AggregateShoppingItemsParams {
    /// Items to standardize and merge (nothing is stored)
    pub items: Vec<AggregateItemParam>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ExportShoppingListPdfParams {
    /// Shopping list ID
    pub list_id: i64,
    /// Full output path for the PDF file
    pub output_path: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CalculateBmiParams {
    /// Body weight in kilograms
    pub weight_kg: f64,
    /// Height in centimeters
    pub height_cm: f64,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl FitPlanService {
    // --- Status ---

    #[tool(description = "Get the current status of the FitPlan service including build info, database status, rate limit policy and process information")]
    async fn fitplan_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        to_json(&tracker.get_status())
    }

    #[tool(description = "Get instructions for building and using shopping lists. Call this before working with shopping lists.")]
    fn shopping_list_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::SHOPPING_LIST_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(SHOPPING_LIST_INSTRUCTIONS)]))
    }

    // --- Shopping Lists ---

    #[tool(description = "Create a new, empty shopping list")]
    fn create_shopping_list(&self, Parameters(p): Parameters<CreateShoppingListParams>) -> Result<CallToolResult, McpError> {
        self.check_rate("create_shopping_list")?;
        let result = shopping_lists::create_shopping_list(&self.database, &p.name, p.notes)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "List shopping lists, most recently updated first, with item and checked counts")]
    fn list_shopping_lists(&self, Parameters(p): Parameters<ListShoppingListsParams>) -> Result<CallToolResult, McpError> {
        let result = shopping_lists::list_shopping_lists(&self.database, p.limit, p.offset)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Get a shopping list with its raw items and (by default) the merged per-category view with standardized units")]
    fn get_shopping_list(&self, Parameters(p): Parameters<GetShoppingListParams>) -> Result<CallToolResult, McpError> {
        let result = shopping_lists::get_shopping_list(&self.database, p.id, p.aggregated)
            .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(detail) => to_json(&detail),
            None => not_found("Shopping list", p.id),
        }
    }

    #[tool(description = "Rename a shopping list or change its notes")]
    fn update_shopping_list(&self, Parameters(p): Parameters<UpdateShoppingListParams>) -> Result<CallToolResult, McpError> {
        self.check_rate("update_shopping_list")?;
        let result = shopping_lists::update_shopping_list(&self.database, p.id, p.name, p.notes)
            .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(list) => to_json(&list),
            None => not_found("Shopping list", p.id),
        }
    }

    #[tool(description = "Delete a shopping list and all of its items")]
    fn delete_shopping_list(&self, Parameters(p): Parameters<DeleteShoppingListParams>) -> Result<CallToolResult, McpError> {
        self.check_rate("delete_shopping_list")?;
        let result = shopping_lists::delete_shopping_list(&self.database, p.id)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    // --- Shopping List Items ---

    #[tool(description = "Add one or more ingredient lines to a shopping list. Pass quantities and units exactly as in the recipe; they are standardized when the list is read.")]
    fn add_shopping_items(&self, Parameters(p): Parameters<AddShoppingItemsParams>) -> Result<CallToolResult, McpError> {
        self.check_rate("add_shopping_items")?;
        let items: Vec<NewShoppingItem> = p.items.into_iter().map(|i| NewShoppingItem {
            food: i.food,
            quantity: i.quantity,
            measure: i.measure,
            category: i.category,
            checked: i.checked,
        }).collect();
        let result = shopping_lists::add_shopping_items(&self.database, p.list_id, items)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Update a shopping list item's food, quantity, measure, category or checked state")]
    fn update_shopping_item(&self, Parameters(p): Parameters<UpdateShoppingItemParams>) -> Result<CallToolResult, McpError> {
        self.check_rate("update_shopping_item")?;
        let data = ShoppingListItemUpdate {
            food: p.food, quantity: p.quantity, measure: p.measure, category: p.category, checked: p.checked,
        };
        let result = shopping_lists::update_shopping_item(&self.database, p.id, data)
            .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(item) => to_json(&item),
            None => not_found("Shopping list item", p.id),
        }
    }

    #[tool(description = "Check or uncheck a shopping list item")]
    fn set_shopping_item_checked(&self, Parameters(p): Parameters<SetShoppingItemCheckedParams>) -> Result<CallToolResult, McpError> {
        self.check_rate("set_shopping_item_checked")?;
        let result = shopping_lists::set_shopping_item_checked(&self.database, p.id, p.checked)
            .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(item) => to_json(&item),
            None => not_found("Shopping list item", p.id),
        }
    }

    #[tool(description = "Remove an item from a shopping list")]
    fn remove_shopping_item(&self, Parameters(p): Parameters<RemoveShoppingItemParams>) -> Result<CallToolResult, McpError> {
        self.check_rate("remove_shopping_item")?;
        let result = shopping_lists::remove_shopping_item(&self.database, p.id)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Remove all checked items from a shopping list")]
    fn clear_checked_items(&self, Parameters(p): Parameters<ShoppingListIdParams>) -> Result<CallToolResult, McpError> {
        self.check_rate("clear_checked_items")?;
        let result = shopping_lists::clear_checked_items(&self.database, p.list_id)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    // --- Stateless ---

    #[tool(description = "Standardize a single quantity and unit (weights to g/kg, volumes to ml/litre, counts to pieces)")]
    fn standardize_quantity(&self, Parameters(p): Parameters<StandardizeQuantityParams>) -> Result<CallToolResult, McpError> {
        to_json(&shopping_lists::standardize_quantity(p.quantity, &p.measure))
    }

    #[tool(description = "Standardize and merge an ad-hoc list of items by category without storing anything")]
    fn aggregate_shopping_items(&self, Parameters(p): Parameters<AggregateShoppingItemsParams>) -> Result<CallToolResult, McpError> {
        let items: Vec<ShoppingItem> = p.items.into_iter().map(|i| ShoppingItem {
            food: i.food,
            quantity: i.quantity,
            measure: i.measure,
            category: i.category,
            checked: i.checked,
        }).collect();
        to_json(&shopping_lists::aggregate_shopping_items(&items))
    }

    // --- Export ---

    #[tool(description = "Export a shopping list (merged by category) as a Markdown checklist")]
    fn export_shopping_list_markdown(&self, Parameters(p): Parameters<ShoppingListIdParams>) -> Result<CallToolResult, McpError> {
        let result = export::export_shopping_list_markdown(&self.database, p.list_id)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Export a shopping list (merged by category) to a printable PDF file")]
    fn export_shopping_list_pdf(&self, Parameters(p): Parameters<ExportShoppingListPdfParams>) -> Result<CallToolResult, McpError> {
        let result = export::export_shopping_list_pdf(&self.database, p.list_id, &p.output_path)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    // --- Health ---

    #[tool(description = "Calculate body mass index from weight (kg) and height (cm) and classify it")]
    fn calculate_bmi(&self, Parameters(p): Parameters<CalculateBmiParams>) -> Result<CallToolResult, McpError> {
        let result = health::bmi(p.weight_kg, p.height_cm)
            .map_err(|e| McpError::invalid_params(e, None))?;
        to_json(&result)
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for FitPlanService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "fitplan".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("FitPlan".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "FitPlan - meal plan shopping lists and fitness helpers. \
                 IMPORTANT: Call shopping_list_instructions before working with shopping lists. \
                 Lists: create/get/list/update/delete_shopping_list. \
                 Items: add_shopping_items, update_shopping_item, set_shopping_item_checked, \
                 remove_shopping_item, clear_checked_items. \
                 Units: standardize_quantity, aggregate_shopping_items (no storage). \
                 Export: export_shopping_list_markdown, export_shopping_list_pdf. \
                 Health: calculate_bmi. Status: fitplan_status."
                    .into(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::rate_limit::{FixedWindowStore, NoopStore};
    use std::time::Duration;

    fn service(rate_limiter: Arc<dyn RateLimitStore>) -> FitPlanService {
        let database = Database::open_in_memory().unwrap();
        database.with_conn(|conn| run_migrations(conn)).unwrap();
        FitPlanService::new(PathBuf::from(":memory:"), database, rate_limiter, "test".to_string())
    }

    fn create_params(name: &str) -> Parameters<CreateShoppingListParams> {
        Parameters(CreateShoppingListParams { name: name.to_string(), notes: None })
    }

    #[test]
    fn test_mutating_tools_are_rate_limited() {
        let svc = service(Arc::new(FixedWindowStore::new(0, Duration::from_secs(60))));

        let err = svc.create_shopping_list(create_params("Week 12")).unwrap_err();
        assert!(err.message.contains("Rate limit exceeded for create_shopping_list"));

        let err = svc
            .clear_checked_items(Parameters(ShoppingListIdParams { list_id: 1 }))
            .unwrap_err();
        assert!(err.message.contains("Rate limit exceeded for clear_checked_items"));
    }

    #[test]
    fn test_read_only_tools_skip_rate_limit() {
        let svc = service(Arc::new(FixedWindowStore::new(0, Duration::from_secs(60))));

        assert!(svc
            .get_shopping_list(Parameters(GetShoppingListParams { id: 1, aggregated: true }))
            .is_ok());
        assert!(svc
            .standardize_quantity(Parameters(StandardizeQuantityParams {
                quantity: 5.0,
                measure: "cup".to_string(),
            }))
            .is_ok());
        assert!(svc
            .list_shopping_lists(Parameters(ListShoppingListsParams { limit: 50, offset: 0 }))
            .is_ok());
    }

    #[test]
    fn test_limit_is_per_tool() {
        let svc = service(Arc::new(FixedWindowStore::new(1, Duration::from_secs(60))));

        assert!(svc.create_shopping_list(create_params("A")).is_ok());
        assert!(svc.create_shopping_list(create_params("B")).is_err());
        assert!(svc
            .update_shopping_list(Parameters(UpdateShoppingListParams {
                id: 1,
                name: Some("A2".to_string()),
                notes: None,
            }))
            .is_ok());
    }

    #[test]
    fn test_noop_store_allows_mutations() {
        let svc = service(Arc::new(NoopStore));
        for i in 0..5 {
            assert!(svc.create_shopping_list(create_params(&format!("List {}", i))).is_ok());
        }
    }
}
