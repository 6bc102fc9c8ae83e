//! Export a shopping list from the command line
//! Usage: cargo run --bin export_shopping_list -- <list_id> [--pdf <path>]
//!
//! Prints the Markdown checklist to stdout, or writes a PDF when `--pdf` is given.

use fitplan::config::Config;
use fitplan::db::{migrations, Database};
use fitplan::tools::export;

fn usage() -> ! {
    eprintln!("Usage: export_shopping_list <list_id> [--pdf <path>]");
    std::process::exit(2);
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let list_id: i64 = match args.first().and_then(|s| s.parse().ok()) {
        Some(id) => id,
        None => usage(),
    };

    let pdf_path = match args.get(1).map(|s| s.as_str()) {
        None => None,
        Some("--pdf") => match args.get(2) {
            Some(path) => Some(path.clone()),
            None => usage(),
        },
        Some(_) => usage(),
    };

    let config = Config::from_env()?;
    eprintln!("Database: {}", config.database_path.display());

    let database = Database::new(&config.database_path)?;
    database.with_conn(|conn| migrations::run_migrations(conn))?;

    match pdf_path {
        Some(path) => {
            let result = export::export_shopping_list_pdf(&database, list_id, &path)?;
            eprintln!("{}", result.message);
        }
        None => {
            let result = export::export_shopping_list_markdown(&database, list_id)?;
            println!("{}", result.markdown);
        }
    }

    Ok(())
}
