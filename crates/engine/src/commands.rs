//! Command structs for engine operations.
//!
//! These types group parameters for write operations (create item, purchase,
//! donation, distribution, void), keeping call sites readable and avoiding
//! long argument lists.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{DistributionReason, MoneyCents};

/// Default `created_by` recorded on ledger rows.
pub const SYSTEM_USER: &str = "system";

/// Common metadata for ledger rows.
#[derive(Clone, Debug)]
pub struct TxMeta {
    pub notes: Option<String>,
    pub created_by: String,
    pub transaction_date: DateTime<Utc>,
}

impl TxMeta {
    #[must_use]
    pub fn new(transaction_date: DateTime<Utc>) -> Self {
        Self {
            notes: None,
            created_by: SYSTEM_USER.to_string(),
            transaction_date,
        }
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    #[must_use]
    pub fn created_by(mut self, created_by: impl Into<String>) -> Self {
        self.created_by = created_by.into();
        self
    }
}

impl Default for TxMeta {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

/// Create a new item with zero stock.
#[derive(Clone, Debug)]
pub struct CreateItemCmd {
    pub sku: String,
    pub name: String,
    pub category_id: Option<Uuid>,
    pub reorder_threshold: f64,
}

impl CreateItemCmd {
    /// Reorder threshold used when none is given.
    pub const DEFAULT_REORDER_THRESHOLD: f64 = 10.0;

    #[must_use]
    pub fn new(sku: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            sku: sku.into(),
            name: name.into(),
            category_id: None,
            reorder_threshold: Self::DEFAULT_REORDER_THRESHOLD,
        }
    }

    #[must_use]
    pub fn category_id(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn reorder_threshold(mut self, reorder_threshold: f64) -> Self {
        self.reorder_threshold = reorder_threshold;
        self
    }
}

/// Edit the descriptive fields of an item. `None` leaves a field as is.
#[derive(Clone, Debug, Default)]
pub struct UpdateItemCmd {
    pub name: Option<String>,
    pub category_id: Option<Uuid>,
    pub reorder_threshold: Option<f64>,
}

impl UpdateItemCmd {
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn category_id(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn reorder_threshold(mut self, reorder_threshold: f64) -> Self {
        self.reorder_threshold = Some(reorder_threshold);
        self
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.name.is_none() && self.category_id.is_none() && self.reorder_threshold.is_none()
    }
}

/// Record bought stock.
#[derive(Clone, Debug)]
pub struct PurchaseCmd {
    pub item_id: Uuid,
    pub quantity: f64,
    pub unit_cost: MoneyCents,
    pub supplier: Option<String>,
    pub meta: TxMeta,
}

impl PurchaseCmd {
    #[must_use]
    pub fn new(item_id: Uuid, quantity: f64, unit_cost: MoneyCents) -> Self {
        Self {
            item_id,
            quantity,
            unit_cost,
            supplier: None,
            meta: TxMeta::default(),
        }
    }

    #[must_use]
    pub fn supplier(mut self, supplier: impl Into<String>) -> Self {
        self.supplier = Some(supplier.into());
        self
    }

    #[must_use]
    pub fn meta(mut self, meta: TxMeta) -> Self {
        self.meta = meta;
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.meta.notes = Some(notes.into());
        self
    }
}

/// Record donated stock.
#[derive(Clone, Debug)]
pub struct DonationCmd {
    pub item_id: Uuid,
    pub quantity: f64,
    /// Estimated value per unit, for impact reporting.
    pub fair_market_value_per_unit: MoneyCents,
    pub donor: Option<String>,
    pub meta: TxMeta,
}

impl DonationCmd {
    #[must_use]
    pub fn new(item_id: Uuid, quantity: f64, fair_market_value_per_unit: MoneyCents) -> Self {
        Self {
            item_id,
            quantity,
            fair_market_value_per_unit,
            donor: None,
            meta: TxMeta::default(),
        }
    }

    #[must_use]
    pub fn donor(mut self, donor: impl Into<String>) -> Self {
        self.donor = Some(donor.into());
        self
    }

    #[must_use]
    pub fn meta(mut self, meta: TxMeta) -> Self {
        self.meta = meta;
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.meta.notes = Some(notes.into());
        self
    }
}

/// Record stock leaving the pantry.
#[derive(Clone, Debug)]
pub struct DistributionCmd {
    pub item_id: Uuid,
    pub quantity: f64,
    pub reason: DistributionReason,
    pub meta: TxMeta,
}

impl DistributionCmd {
    #[must_use]
    pub fn new(item_id: Uuid, quantity: f64, reason: DistributionReason) -> Self {
        Self {
            item_id,
            quantity,
            reason,
            meta: TxMeta::default(),
        }
    }

    #[must_use]
    pub fn meta(mut self, meta: TxMeta) -> Self {
        self.meta = meta;
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.meta.notes = Some(notes.into());
        self
    }
}

/// Reverse a prior transaction with a correction row.
#[derive(Clone, Debug)]
pub struct VoidCmd {
    pub transaction_id: Uuid,
    pub reason: String,
    pub created_by: String,
    pub voided_at: DateTime<Utc>,
}

impl VoidCmd {
    #[must_use]
    pub fn new(transaction_id: Uuid, reason: impl Into<String>) -> Self {
        Self {
            transaction_id,
            reason: reason.into(),
            created_by: SYSTEM_USER.to_string(),
            voided_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn created_by(mut self, created_by: impl Into<String>) -> Self {
        self.created_by = created_by.into();
        self
    }

    #[must_use]
    pub fn voided_at(mut self, voided_at: DateTime<Utc>) -> Self {
        self.voided_at = voided_at;
        self
    }
}
