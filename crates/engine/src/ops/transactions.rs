//! Ledger writes and reads.
//!
//! Every write follows the same shape inside one DB transaction: load the
//! item, compute the new stock with [`crate::cost`], update the item row and
//! append the ledger row. Nothing is written when any step fails.

use chrono::Utc;
use sea_orm::{ActiveValue, DatabaseTransaction, prelude::*};

use crate::{Item, ResultEngine, StockLevel, Transaction, items, transactions};

use super::Engine;

mod list;
mod void;
mod write;

pub use list::TransactionListFilter;
pub use void::VoidOutcome;

impl Engine {
    /// Persist the new stock of `item` and append `tx` to the ledger.
    ///
    /// Must run inside the caller's DB transaction.
    async fn record_movement(
        &self,
        db_tx: &DatabaseTransaction,
        mut item: Item,
        stock: StockLevel,
        tx: Transaction,
    ) -> ResultEngine<(Item, Transaction)> {
        item.quantity_on_hand = stock.quantity;
        item.total_cost_basis = stock.cost_basis;
        item.updated_at = Utc::now();

        let item_model = items::ActiveModel {
            id: ActiveValue::Unchanged(item.id),
            quantity_on_hand: ActiveValue::Set(item.quantity_on_hand),
            total_cost_basis_cents: ActiveValue::Set(item.total_cost_basis.cents()),
            updated_at: ActiveValue::Set(item.updated_at),
            ..Default::default()
        };
        item_model.update(db_tx).await?;

        let model = transactions::ActiveModel::from(&tx).insert(db_tx).await?;
        let tx = Transaction::try_from(model)?;

        tracing::debug!(
            item_id = %item.id,
            transaction_id = %tx.id,
            quantity = item.quantity_on_hand,
            cost_basis_cents = item.total_cost_basis.cents(),
            "ledger row staged"
        );
        Ok((item, tx))
    }
}

fn log_committed(item: &Item, tx: &Transaction) {
    tracing::info!(
        item_id = %item.id,
        transaction_id = %tx.id,
        kind = tx.kind.as_str(),
        quantity_change = tx.quantity_change,
        quantity = item.quantity_on_hand,
        cost_basis_cents = item.total_cost_basis.cents(),
        "transaction committed"
    );
}
