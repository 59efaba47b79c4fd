use chrono::Utc;
use uuid::Uuid;

use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::Expr};

use crate::{
    CreateItemCmd, EngineError, Item, ResultEngine, UpdateItemCmd, items,
    util::{normalize_required_text, validate_reorder_threshold},
};

use super::{Engine, with_tx};

impl Engine {
    /// Creates an item with zero stock and zero cost basis.
    ///
    /// Fails with `ExistingKey` when the SKU is already taken (deactivated
    /// items keep their SKU).
    pub async fn create_item(&self, cmd: CreateItemCmd) -> ResultEngine<Item> {
        let sku = normalize_required_text(&cmd.sku, "sku")?;
        let name = normalize_required_text(&cmd.name, "item name")?;
        validate_reorder_threshold(cmd.reorder_threshold)?;

        let created: ResultEngine<Item> = with_tx!(self, |db_tx| {
            let exists = items::Entity::find()
                .filter(items::Column::Sku.eq(sku.clone()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(sku));
            }
            if let Some(category_id) = cmd.category_id {
                self.require_category(&db_tx, category_id).await?;
            }

            let item = Item::new(sku, name, cmd.category_id, cmd.reorder_threshold, Utc::now());
            items::ActiveModel::from(&item).insert(&db_tx).await?;
            Ok(item)
        });
        let item = created?;
        tracing::info!(item_id = %item.id, sku = %item.sku, "item created");
        Ok(item)
    }

    /// Return an item snapshot from DB.
    pub async fn item(&self, item_id: Uuid) -> ResultEngine<Item> {
        let model = items::Entity::find_by_id(item_id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("item not exists".to_string()))?;
        Ok(Item::from(model))
    }

    /// Return an item snapshot looked up by SKU.
    pub async fn item_by_sku(&self, sku: &str) -> ResultEngine<Item> {
        let model = items::Entity::find()
            .filter(items::Column::Sku.eq(sku.trim()))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(sku.trim().to_string()))?;
        Ok(Item::from(model))
    }

    /// Lists items ordered by name.
    pub async fn list_items(&self, active_only: bool) -> ResultEngine<Vec<Item>> {
        let mut query = items::Entity::find();
        if active_only {
            query = query.filter(items::Column::IsActive.eq(true));
        }
        let models = query
            .order_by_asc(items::Column::Name)
            .order_by_asc(items::Column::Sku)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Item::from).collect())
    }

    /// Active items whose quantity is strictly below their reorder threshold.
    pub async fn items_below_threshold(&self) -> ResultEngine<Vec<Item>> {
        let models = items::Entity::find()
            .filter(items::Column::IsActive.eq(true))
            .filter(
                Expr::col(items::Column::QuantityOnHand)
                    .lt(Expr::col(items::Column::ReorderThreshold)),
            )
            .order_by_asc(items::Column::Name)
            .order_by_asc(items::Column::Sku)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Item::from).collect())
    }

    /// Edits name, category or reorder threshold.
    ///
    /// SKU, quantity and cost basis cannot be changed here.
    pub async fn update_item(&self, item_id: Uuid, cmd: UpdateItemCmd) -> ResultEngine<Item> {
        if cmd.is_empty() {
            return Err(EngineError::InvalidInput("no updates provided".to_string()));
        }
        let name = cmd
            .name
            .as_deref()
            .map(|name| normalize_required_text(name, "item name"))
            .transpose()?;
        if let Some(threshold) = cmd.reorder_threshold {
            validate_reorder_threshold(threshold)?;
        }

        let updated: ResultEngine<Item> = with_tx!(self, |db_tx| {
            let mut item = self.require_item(&db_tx, item_id).await?;
            if let Some(category_id) = cmd.category_id {
                self.require_category(&db_tx, category_id).await?;
                item.category_id = Some(category_id);
            }
            if let Some(name) = name {
                item.name = name;
            }
            if let Some(threshold) = cmd.reorder_threshold {
                item.reorder_threshold = threshold;
            }
            item.updated_at = Utc::now();

            let model = items::ActiveModel {
                id: ActiveValue::Unchanged(item.id),
                name: ActiveValue::Set(item.name.clone()),
                category_id: ActiveValue::Set(item.category_id),
                reorder_threshold: ActiveValue::Set(item.reorder_threshold),
                updated_at: ActiveValue::Set(item.updated_at),
                ..Default::default()
            };
            model.update(&db_tx).await?;
            Ok(item)
        });
        let item = updated?;
        tracing::info!(item_id = %item.id, "item updated");
        Ok(item)
    }

    /// Soft-deletes an item.
    ///
    /// The row stays so ledger references remain valid; new purchases,
    /// donations and distributions are refused afterwards.
    pub async fn deactivate_item(&self, item_id: Uuid) -> ResultEngine<Item> {
        let deactivated: ResultEngine<Item> = with_tx!(self, |db_tx| {
            let mut item = self.require_item(&db_tx, item_id).await?;
            item.is_active = false;
            item.updated_at = Utc::now();

            let model = items::ActiveModel {
                id: ActiveValue::Unchanged(item.id),
                is_active: ActiveValue::Set(false),
                updated_at: ActiveValue::Set(item.updated_at),
                ..Default::default()
            };
            model.update(&db_tx).await?;
            Ok(item)
        });
        let item = deactivated?;
        tracing::info!(item_id = %item.id, sku = %item.sku, "item deactivated");
        Ok(item)
    }
}
