//! Ledger primitives.
//!
//! A `Transaction` records one accounting event against an item. Rows are
//! append-only: the only column ever updated after insert is `is_voided`.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Purchase,
    Donation,
    Distribution,
    /// Reversal of a prior transaction, written by a void.
    Correction,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Purchase => "PURCHASE",
            Self::Donation => "DONATION",
            Self::Distribution => "DISTRIBUTION",
            Self::Correction => "CORRECTION",
        }
    }

    /// Check the sign rule for `quantity_change`.
    pub(crate) fn validate_quantity_change(self, quantity_change: f64) -> ResultEngine<()> {
        let valid = match self {
            Self::Purchase | Self::Donation => quantity_change > 0.0,
            Self::Distribution => quantity_change < 0.0,
            Self::Correction => quantity_change.is_finite(),
        };
        if !valid {
            return Err(EngineError::InvalidInput(format!(
                "invalid quantity change {quantity_change} for {}",
                self.as_str()
            )));
        }
        Ok(())
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "PURCHASE" => Ok(Self::Purchase),
            "DONATION" => Ok(Self::Donation),
            "DISTRIBUTION" => Ok(Self::Distribution),
            "CORRECTION" => Ok(Self::Correction),
            other => Err(EngineError::InvalidInput(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

/// Why stock left (distributions) or why a row exists (corrections).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    /// Handed out to clients.
    Client,
    /// Spoiled or expired.
    Spoilage,
    /// Internal use.
    Internal,
    /// Written on correction rows only.
    Void,
}

impl ReasonCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Client => "CLIENT",
            Self::Spoilage => "SPOILAGE",
            Self::Internal => "INTERNAL",
            Self::Void => "VOID",
        }
    }

}

impl TryFrom<&str> for ReasonCode {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "CLIENT" => Ok(Self::Client),
            "SPOILAGE" => Ok(Self::Spoilage),
            "INTERNAL" => Ok(Self::Internal),
            "VOID" => Ok(Self::Void),
            other => Err(EngineError::InvalidInput(format!(
                "invalid reason code: {other}"
            ))),
        }
    }
}

/// The subset of [`ReasonCode`] a caller may give a distribution.
///
/// `Void` is reserved for correction rows and has no counterpart here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DistributionReason {
    Client,
    Spoilage,
    Internal,
}

impl DistributionReason {
    pub fn as_str(self) -> &'static str {
        ReasonCode::from(self).as_str()
    }
}

impl From<DistributionReason> for ReasonCode {
    fn from(reason: DistributionReason) -> Self {
        match reason {
            DistributionReason::Client => Self::Client,
            DistributionReason::Spoilage => Self::Spoilage,
            DistributionReason::Internal => Self::Internal,
        }
    }
}

impl TryFrom<&str> for DistributionReason {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match ReasonCode::try_from(value)? {
            ReasonCode::Client => Ok(Self::Client),
            ReasonCode::Spoilage => Ok(Self::Spoilage),
            ReasonCode::Internal => Ok(Self::Internal),
            ReasonCode::Void => Err(EngineError::InvalidInput(
                "VOID is not a distribution reason".to_string(),
            )),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub item_id: Uuid,
    pub kind: TransactionKind,
    /// Signed: positive for intake, negative for distributions.
    pub quantity_change: f64,
    pub unit_cost: MoneyCents,
    /// Total fair market value of a donation. Reporting only.
    pub fair_market_value: MoneyCents,
    /// COGS for a distribution; signed basis change for a correction.
    pub total_financial_impact: MoneyCents,
    pub reason_code: Option<ReasonCode>,
    pub supplier: Option<String>,
    pub donor: Option<String>,
    pub notes: Option<String>,
    pub transaction_date: DateTime<Utc>,
    pub created_by: String,
    pub is_voided: bool,
    /// Set on correction rows: the transaction being reversed.
    pub ref_transaction_id: Option<Uuid>,
}

impl Transaction {
    pub(crate) fn new(
        item_id: Uuid,
        kind: TransactionKind,
        quantity_change: f64,
        transaction_date: DateTime<Utc>,
        created_by: String,
    ) -> ResultEngine<Self> {
        kind.validate_quantity_change(quantity_change)?;
        Ok(Self {
            id: Uuid::now_v7(),
            item_id,
            kind,
            quantity_change,
            unit_cost: MoneyCents::ZERO,
            fair_market_value: MoneyCents::ZERO,
            total_financial_impact: MoneyCents::ZERO,
            reason_code: None,
            supplier: None,
            donor: None,
            notes: None,
            transaction_date,
            created_by,
            is_voided: false,
            ref_transaction_id: None,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub item_id: Uuid,
    pub kind: String,
    pub quantity_change: f64,
    pub unit_cost_cents: i64,
    pub fair_market_value_cents: i64,
    pub total_financial_impact_cents: i64,
    pub reason_code: Option<String>,
    pub supplier: Option<String>,
    pub donor: Option<String>,
    pub notes: Option<String>,
    pub transaction_date: DateTimeUtc,
    pub created_by: String,
    pub is_voided: bool,
    pub ref_transaction_id: Option<Uuid>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::items::Entity",
        from = "Column::ItemId",
        to = "super::items::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Item,
}

impl Related<super::items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id),
            item_id: ActiveValue::Set(tx.item_id),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            quantity_change: ActiveValue::Set(tx.quantity_change),
            unit_cost_cents: ActiveValue::Set(tx.unit_cost.cents()),
            fair_market_value_cents: ActiveValue::Set(tx.fair_market_value.cents()),
            total_financial_impact_cents: ActiveValue::Set(tx.total_financial_impact.cents()),
            reason_code: ActiveValue::Set(tx.reason_code.map(|r| r.as_str().to_string())),
            supplier: ActiveValue::Set(tx.supplier.clone()),
            donor: ActiveValue::Set(tx.donor.clone()),
            notes: ActiveValue::Set(tx.notes.clone()),
            transaction_date: ActiveValue::Set(tx.transaction_date),
            created_by: ActiveValue::Set(tx.created_by.clone()),
            is_voided: ActiveValue::Set(tx.is_voided),
            ref_transaction_id: ActiveValue::Set(tx.ref_transaction_id),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            item_id: model.item_id,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            quantity_change: model.quantity_change,
            unit_cost: MoneyCents::new(model.unit_cost_cents),
            fair_market_value: MoneyCents::new(model.fair_market_value_cents),
            total_financial_impact: MoneyCents::new(model.total_financial_impact_cents),
            reason_code: model
                .reason_code
                .as_deref()
                .map(ReasonCode::try_from)
                .transpose()?,
            supplier: model.supplier,
            donor: model.donor,
            notes: model.notes,
            transaction_date: model.transaction_date,
            created_by: model.created_by,
            is_voided: model.is_voided,
            ref_transaction_id: model.ref_transaction_id,
        })
    }
}
