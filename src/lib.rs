//! FitPlan Library
//!
//! Shopping list standardization and aggregation for meal plans, plus the
//! storage, export and health helpers served by the FitPlan MCP server.

pub mod build_info;
pub mod config;
pub mod db;
pub mod health;
pub mod mcp;
pub mod models;
pub mod rate_limit;
pub mod shopping;
pub mod tools;
