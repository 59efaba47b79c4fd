use chrono::Utc;
use uuid::Uuid;

use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    Category, EngineError, ResultEngine, categories,
    util::{normalize_optional_text, normalize_required_text},
};

use super::{Engine, with_tx};

impl Engine {
    /// Creates a category. Names are unique ignoring case.
    pub async fn create_category(
        &self,
        name: &str,
        parent_id: Option<Uuid>,
        description: Option<&str>,
    ) -> ResultEngine<Category> {
        let name = normalize_required_text(name, "category name")?;
        let description = normalize_optional_text(description);

        let created: ResultEngine<Category> = with_tx!(self, |db_tx| {
            let exists = categories::Entity::find()
                .filter(categories::Column::NameNorm.eq(name.to_lowercase()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(name));
            }
            if let Some(parent_id) = parent_id {
                self.require_category(&db_tx, parent_id).await?;
            }

            let category = Category {
                id: Uuid::now_v7(),
                name,
                parent_id,
                description,
                created_at: Utc::now(),
            };
            categories::ActiveModel::from(&category)
                .insert(&db_tx)
                .await?;
            Ok(category)
        });
        let category = created?;
        tracing::info!(category_id = %category.id, name = %category.name, "category created");
        Ok(category)
    }

    /// Lists all categories ordered by name.
    pub async fn list_categories(&self) -> ResultEngine<Vec<Category>> {
        let models = categories::Entity::find()
            .order_by_asc(categories::Column::NameNorm)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Category::from).collect())
    }
}
