//! FitPlan Tools module
//!
//! Tool implementations behind the MCP server.

pub mod export;
pub mod health;
pub mod shopping_lists;
pub mod status;
