//! Applies or rolls back the pantry ledger schema outside the `pantry` CLI.
//!
//! The target database is `DATABASE_URL` when set. Otherwise it is the same
//! SQLite file the CLI uses: `PANTRY_DATABASE__PATH`, falling back to
//! `pantry.db` in the working directory.
use sea_orm::Database;
use sea_orm_migration::prelude::*;

const DEFAULT_PANTRY_DB: &str = "pantry.db";

const USAGE: &str = "\
Usage: migration [up|down|fresh|status]

Manages the categories, items and transactions tables of the pantry ledger.
Target: DATABASE_URL, else sqlite:<PANTRY_DATABASE__PATH or pantry.db>?mode=rwc";

fn database_url(database_url: Option<String>, pantry_path: Option<String>) -> String {
    match database_url {
        Some(url) if !url.trim().is_empty() => url,
        _ => {
            let path = pantry_path
                .filter(|path| !path.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_PANTRY_DB.to_string());
            format!("sqlite:{path}?mode=rwc")
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut args = std::env::args().skip(1);
    let cmd = args.next().unwrap_or_else(|| "up".to_string());

    let db_url = database_url(
        std::env::var("DATABASE_URL").ok(),
        std::env::var("PANTRY_DATABASE__PATH").ok(),
    );

    match cmd.as_str() {
        "up" | "down" | "fresh" | "status" => {}
        _ => {
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    }

    let db = Database::connect(&db_url).await?;
    match cmd.as_str() {
        "up" => migration::Migrator::up(&db, None).await?,
        "down" => migration::Migrator::down(&db, None).await?,
        "fresh" => migration::Migrator::fresh(&db).await?,
        _ => migration::Migrator::status(&db).await?,
    }
    println!("pantry schema {cmd}: done ({db_url})");

    Ok(())
}
