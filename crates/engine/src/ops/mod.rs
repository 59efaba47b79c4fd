use sea_orm::{DatabaseConnection, DatabaseTransaction, prelude::*};
use uuid::Uuid;

use crate::{Category, EngineError, Item, ResultEngine};

mod categories;
mod items;
mod transactions;

pub use transactions::{TransactionListFilter, VoidOutcome};

/// Run a block inside a DB transaction, committing on success.
///
/// Any early return (`?` or `return Err(..)`) drops the transaction, which
/// rolls it back.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// The ledger engine.
///
/// Holds no state besides the injected connection: the database is the
/// single source of truth for item aggregates and the ledger.
#[derive(Debug, Clone)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    async fn require_item(&self, db_tx: &DatabaseTransaction, item_id: Uuid) -> ResultEngine<Item> {
        let model = crate::items::Entity::find_by_id(item_id)
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("item not exists".to_string()))?;
        Ok(Item::from(model))
    }

    /// Like `require_item`, but deactivated items are rejected.
    async fn require_active_item(
        &self,
        db_tx: &DatabaseTransaction,
        item_id: Uuid,
    ) -> ResultEngine<Item> {
        let item = self.require_item(db_tx, item_id).await?;
        if !item.is_active {
            return Err(EngineError::InvalidInput(format!(
                "item '{}' is deactivated",
                item.sku
            )));
        }
        Ok(item)
    }

    async fn require_category(
        &self,
        db_tx: &DatabaseTransaction,
        category_id: Uuid,
    ) -> ResultEngine<Category> {
        let model = crate::categories::Entity::find_by_id(category_id)
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))?;
        Ok(Category::from(model))
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: Option<DatabaseConnection>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = Some(db);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        let database = self
            .database
            .ok_or_else(|| EngineError::InvalidInput("database is required".to_string()))?;
        database.ping().await?;
        Ok(Engine { database })
    }
}
