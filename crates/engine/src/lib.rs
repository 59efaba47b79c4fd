//! Inventory ledger engine for a food pantry.
//!
//! Each item keeps a running `(quantity_on_hand, total_cost_basis)` pair that
//! is derived from an append-only ledger of purchases, donations and
//! distributions. Costs follow the weighted-average method and every amount
//! is stored as integer cents.
//!
//! All writes go through [`Engine`]: each call is a single database
//! transaction that updates the item and appends the ledger row together.
//! Mistakes are undone with [`Engine::void_transaction`], which records a
//! `Correction` row instead of editing history.

pub use categories::Category;
pub use commands::{
    CreateItemCmd, DistributionCmd, DonationCmd, PurchaseCmd, SYSTEM_USER, TxMeta, UpdateItemCmd,
    VoidCmd,
};
pub use cost::{Distribution, StockLevel};
pub use error::EngineError;
pub use items::Item;
pub use money::MoneyCents;
pub use ops::{Engine, EngineBuilder, TransactionListFilter, VoidOutcome};
pub use transactions::{DistributionReason, ReasonCode, Transaction, TransactionKind};

mod categories;
mod commands;
pub mod cost;
mod error;
mod items;
mod money;
mod ops;
mod transactions;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
