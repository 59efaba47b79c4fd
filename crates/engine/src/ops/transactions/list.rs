use uuid::Uuid;

use sea_orm::{QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*};

use crate::{EngineError, ResultEngine, Transaction, TransactionKind, transactions};

use super::super::{Engine, with_tx};

/// Filters for listing an item's ledger.
#[derive(Clone, Debug)]
pub struct TransactionListFilter {
    /// Maximum number of rows, newest first.
    pub limit: Option<u64>,
    /// If present, acts as an allow-list of kinds to return.
    pub kinds: Option<Vec<TransactionKind>>,
    /// If true, includes voided transactions (default: true, the audit view).
    pub include_voided: bool,
}

impl Default for TransactionListFilter {
    fn default() -> Self {
        Self {
            limit: None,
            kinds: None,
            include_voided: true,
        }
    }
}

fn validate_list_filter(filter: &TransactionListFilter) -> ResultEngine<()> {
    if filter.limit == Some(0) {
        return Err(EngineError::InvalidInput(
            "limit must be > 0".to_string(),
        ));
    }
    if filter.kinds.as_ref().is_some_and(|k| k.is_empty()) {
        return Err(EngineError::InvalidInput(
            "kinds must not be empty".to_string(),
        ));
    }
    Ok(())
}

impl Engine {
    /// Return a single ledger row.
    pub async fn transaction(&self, transaction_id: Uuid) -> ResultEngine<Transaction> {
        let model = transactions::Entity::find_by_id(transaction_id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))?;
        Transaction::try_from(model)
    }

    /// The full ledger of an item, newest first, voided rows included.
    pub async fn transactions_for_item(&self, item_id: Uuid) -> ResultEngine<Vec<Transaction>> {
        self.list_transactions_for_item(item_id, &TransactionListFilter::default())
            .await
    }

    /// Lists an item's ledger, newest first.
    ///
    /// Ordering is `(transaction_date DESC, id DESC)`; ids are time-ordered,
    /// so rows sharing a date come back in reverse insertion order.
    pub async fn list_transactions_for_item(
        &self,
        item_id: Uuid,
        filter: &TransactionListFilter,
    ) -> ResultEngine<Vec<Transaction>> {
        validate_list_filter(filter)?;

        with_tx!(self, |db_tx| {
            self.require_item(&db_tx, item_id).await?;

            let mut query =
                transactions::Entity::find().filter(transactions::Column::ItemId.eq(item_id));
            if !filter.include_voided {
                query = query.filter(transactions::Column::IsVoided.eq(false));
            }
            if let Some(kinds) = &filter.kinds {
                let kinds: Vec<&str> = kinds.iter().map(|k| k.as_str()).collect();
                query = query.filter(transactions::Column::Kind.is_in(kinds));
            }
            query = query
                .order_by_desc(transactions::Column::TransactionDate)
                .order_by_desc(transactions::Column::Id);
            if let Some(limit) = filter.limit {
                query = query.limit(limit);
            }

            let models = query.all(&db_tx).await?;
            models
                .into_iter()
                .map(Transaction::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }
}
