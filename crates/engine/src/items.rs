//! The module contains the `Item` aggregate and its storage model.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    MoneyCents, ResultEngine,
    cost::{self, StockLevel},
};

/// An inventory item.
///
/// One row per SKU holding the current aggregate: quantity on hand and the
/// total money invested in that quantity. Only the engine's write
/// operations change `quantity_on_hand` and `total_cost_basis`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Surrogate key (UUIDv7).
    pub id: Uuid,
    /// Human-facing identifier, unique and immutable after creation.
    pub sku: String,
    pub name: String,
    pub category_id: Option<Uuid>,
    /// Fractional quantities are allowed (e.g. weight).
    pub quantity_on_hand: f64,
    pub total_cost_basis: MoneyCents,
    pub reorder_threshold: f64,
    /// Soft-delete flag.
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    pub(crate) fn new(
        sku: String,
        name: String,
        category_id: Option<Uuid>,
        reorder_threshold: f64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            sku,
            name,
            category_id,
            quantity_on_hand: 0.0,
            total_cost_basis: MoneyCents::ZERO,
            reorder_threshold,
            is_active: true,
            created_at,
            updated_at: created_at,
        }
    }

    /// Current `(quantity, basis)` pair.
    #[must_use]
    pub fn stock(&self) -> StockLevel {
        StockLevel::new(self.quantity_on_hand, self.total_cost_basis)
    }

    /// Weighted-average unit cost, zero when nothing is on hand.
    pub fn current_unit_cost(&self) -> ResultEngine<MoneyCents> {
        cost::unit_cost(self.total_cost_basis, self.quantity_on_hand)
    }

    /// Value of the stock on hand, which is the cost basis itself.
    #[must_use]
    pub fn total_inventory_value(&self) -> MoneyCents {
        self.total_cost_basis
    }

    #[must_use]
    pub fn is_below_threshold(&self) -> bool {
        self.quantity_on_hand < self.reorder_threshold
    }

    #[must_use]
    pub fn can_distribute(&self, quantity: f64) -> bool {
        self.quantity_on_hand >= quantity
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub sku: String,
    pub name: String,
    pub category_id: Option<Uuid>,
    pub quantity_on_hand: f64,
    pub total_cost_basis_cents: i64,
    pub reorder_threshold: f64,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Category,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Item> for ActiveModel {
    fn from(item: &Item) -> Self {
        Self {
            id: ActiveValue::Set(item.id),
            sku: ActiveValue::Set(item.sku.clone()),
            name: ActiveValue::Set(item.name.clone()),
            category_id: ActiveValue::Set(item.category_id),
            quantity_on_hand: ActiveValue::Set(item.quantity_on_hand),
            total_cost_basis_cents: ActiveValue::Set(item.total_cost_basis.cents()),
            reorder_threshold: ActiveValue::Set(item.reorder_threshold),
            is_active: ActiveValue::Set(item.is_active),
            created_at: ActiveValue::Set(item.created_at),
            updated_at: ActiveValue::Set(item.updated_at),
        }
    }
}

impl From<Model> for Item {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            sku: model.sku,
            name: model.name,
            category_id: model.category_id,
            quantity_on_hand: model.quantity_on_hand,
            total_cost_basis: MoneyCents::new(model.total_cost_basis_cents),
            reorder_threshold: model.reorder_threshold,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
