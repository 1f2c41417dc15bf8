//! # Seed Data Loader
//!
//! Populates a database with the sample customers, products and sales.
//!
//! ## Usage
//! ```bash
//! # Database from SALESTRACK_DB_PATH (default ./salestrack.db)
//! cargo run -p salestrack-db --bin seed
//!
//! # Specify database path
//! cargo run -p salestrack-db --bin seed -- --db ./data/salestrack.db
//! ```
//!
//! Does nothing if the database already holds customers or products.

use std::env;
use std::process::ExitCode;

use salestrack_db::seed::seed_sample_data;
use salestrack_db::{Database, DbConfig};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,salestrack=debug,sqlx=warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Seeding failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = DbConfig::from_env()?;

    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" => {
                let path = args.get(i + 1).ok_or("--db requires a path")?;
                config.database_path = path.into();
                i += 2;
            }
            other => return Err(format!("unknown argument: {other}").into()),
        }
    }

    info!(path = %config.database_path.display(), "Seeding database");

    let db = Database::new(config).await?;

    match seed_sample_data(&db).await? {
        Some(summary) => info!(
            customers = summary.customers,
            products = summary.products,
            sales = summary.sales,
            line_items = summary.line_items,
            "Done"
        ),
        None => info!("Database not empty, nothing inserted"),
    }

    db.close().await;
    Ok(())
}
