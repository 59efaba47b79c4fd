//! The module contains the errors the engine can return.
//!
//! Every failure is a caller-input problem or a storage error; the engine
//! never retries. The main business errors are:
//!
//! - [`InsufficientInventory`] when a distribution asks for more than is on hand.
//! - [`InsufficientStockForVoid`] when a purchase/donation cannot be reversed
//!   because its stock already left.
//! - [`AlreadyVoided`] when a transaction was voided before.
//!
//!  [`InsufficientInventory`]: EngineError::InsufficientInventory
//!  [`InsufficientStockForVoid`]: EngineError::InsufficientStockForVoid
//!  [`AlreadyVoided`]: EngineError::AlreadyVoided
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Insufficient inventory: {0}")]
    InsufficientInventory(String),
    #[error("Insufficient stock for void: {0}")]
    InsufficientStockForVoid(String),
    #[error("Transaction already voided: {0}")]
    AlreadyVoided(String),
    #[error("Unsupported void type: {0}")]
    UnsupportedVoidType(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidInput(a), Self::InvalidInput(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InsufficientInventory(a), Self::InsufficientInventory(b)) => a == b,
            (Self::InsufficientStockForVoid(a), Self::InsufficientStockForVoid(b)) => a == b,
            (Self::AlreadyVoided(a), Self::AlreadyVoided(b)) => a == b,
            (Self::UnsupportedVoidType(a), Self::UnsupportedVoidType(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
