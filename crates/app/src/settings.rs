//! Handles settings for the application.
//!
//! Values come from defaults, then an optional `settings.toml` in the working
//! directory, then `PANTRY_*` environment variables (nested keys use `__`,
//! e.g. `PANTRY_DATABASE__PATH=/srv/pantry.db`).
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
    /// Recorded as `created_by` on ledger rows written from the command line.
    pub operator: String,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseKind {
    Sqlite,
    Memory,
}

#[derive(Debug, Deserialize)]
pub struct DatabaseSettings {
    pub kind: DatabaseKind,
    pub path: String,
}

pub enum Database {
    Memory,
    Sqlite(String),
}

impl DatabaseSettings {
    pub fn database(&self) -> Database {
        match self.kind {
            DatabaseKind::Memory => Database::Memory,
            DatabaseKind::Sqlite => Database::Sqlite(self.path.clone()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub database: DatabaseSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("app.level", "info")?
            .set_default("app.operator", engine::SYSTEM_USER)?
            .set_default("database.kind", "sqlite")?
            .set_default("database.path", "pantry.db")?
            .add_source(File::with_name("settings").required(false))
            .add_source(
                Environment::with_prefix("PANTRY")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        settings.try_deserialize()
    }
}
