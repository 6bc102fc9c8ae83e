//! FitPlan
//!
//! An MCP server for meal plan shopping lists.

use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tracing_subscriber::EnvFilter;

use fitplan::build_info;
use fitplan::config::Config;
use fitplan::db;
use fitplan::mcp::FitPlanService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr; stdout carries the MCP transport
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("fitplan=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    build_info::print_startup_banner();
    tracing::info!("Starting {} on stdio", build_info::BuildInfo::current().summary());

    let config = Config::from_env()?;
    let db_path = config.database_path.clone();
    eprintln!("Database path: {}", db_path.display());

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    eprintln!("Initializing database...");
    let database = db::Database::new(&db_path)?;

    database.with_conn(|conn| {
        db::migrations::run_migrations(conn)?;
        let version = db::migrations::get_schema_version(conn)?;
        eprintln!("Database schema version: {}", version);
        Ok(())
    })?;

    let rate_limit = config.rate_limit.describe();
    tracing::info!(rate_limit = %rate_limit, "Rate limiting configured");

    let service = FitPlanService::new(
        db_path,
        database,
        config.rate_limit.build_store(),
        rate_limit,
    );

    let transport = (stdin(), stdout());
    let server = service.serve(transport).await?;
    server.waiting().await?;

    Ok(())
}
