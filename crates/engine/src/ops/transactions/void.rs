use sea_orm::{QueryFilter, TransactionTrait, prelude::*, sea_query::Expr};

use crate::{
    EngineError, Item, MoneyCents, ReasonCode, ResultEngine, StockLevel, Transaction,
    TransactionKind, TxMeta, VoidCmd, cost, transactions,
    util::{normalize_required_text, normalize_tx_meta},
};

use super::{
    super::{Engine, with_tx},
    log_committed,
};

/// Everything a void produced.
#[derive(Clone, Debug, PartialEq)]
pub struct VoidOutcome {
    /// The item after the reversal.
    pub item: Item,
    /// The original transaction, now flagged as voided.
    pub voided: Transaction,
    /// The correction row that reverses it.
    pub correction: Transaction,
}

/// Reversal computed for a transaction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct VoidPlan {
    pub(crate) stock: StockLevel,
    /// Signed quantity delta written on the correction row.
    pub(crate) quantity_change: f64,
    /// Signed change actually applied to the cost basis.
    pub(crate) basis_change: MoneyCents,
}

fn insufficient_stock(original: &Transaction, current: StockLevel) -> EngineError {
    EngineError::InsufficientStockForVoid(format!(
        "on hand {}, transaction added {}",
        current.quantity, original.quantity_change
    ))
}

/// Compute how voiding `original` changes `current`.
///
/// - purchase: remove its quantity and `quantity * unit_cost` of basis
///   (floored at zero); needs the quantity still on hand
/// - donation: remove its quantity, basis untouched; needs the quantity
///   still on hand
/// - distribution: put the quantity back and restore the recorded COGS
/// - correction: never voidable
pub(crate) fn plan_void(original: &Transaction, current: StockLevel) -> ResultEngine<VoidPlan> {
    match original.kind {
        TransactionKind::Purchase => {
            if current.quantity < original.quantity_change {
                return Err(insufficient_stock(original, current));
            }
            let value_to_remove =
                cost::extended_cost(original.quantity_change, original.unit_cost)?;
            let cost_basis = (current.cost_basis - value_to_remove).floor_zero();
            Ok(VoidPlan {
                stock: StockLevel::new(current.quantity - original.quantity_change, cost_basis),
                quantity_change: -original.quantity_change,
                basis_change: cost_basis - current.cost_basis,
            })
        }
        TransactionKind::Donation => {
            if current.quantity < original.quantity_change {
                return Err(insufficient_stock(original, current));
            }
            Ok(VoidPlan {
                stock: StockLevel::new(
                    current.quantity - original.quantity_change,
                    current.cost_basis,
                ),
                quantity_change: -original.quantity_change,
                basis_change: MoneyCents::ZERO,
            })
        }
        TransactionKind::Distribution => {
            let restore_quantity = original.quantity_change.abs();
            let restore_cost = original.total_financial_impact;
            let cost_basis = current
                .cost_basis
                .checked_add(restore_cost)
                .ok_or_else(|| EngineError::InvalidInput("cost basis overflow".to_string()))?;
            Ok(VoidPlan {
                stock: StockLevel::new(current.quantity + restore_quantity, cost_basis),
                quantity_change: restore_quantity,
                basis_change: restore_cost,
            })
        }
        TransactionKind::Correction => Err(EngineError::UnsupportedVoidType(format!(
            "{} cannot be voided",
            original.kind.as_str()
        ))),
    }
}

impl Engine {
    /// Voids a transaction by recording a correction.
    ///
    /// This:
    /// - applies the reversal of the original to the item
    /// - appends a `Correction` row pointing at the original, with reason
    ///   code `VOID` and the void reason as notes
    /// - sets `is_voided` on the original row
    ///
    /// History is never deleted or edited otherwise. A transaction can be
    /// voided at most once, and corrections themselves cannot be voided.
    /// Voids are allowed on deactivated items.
    pub async fn void_transaction(&self, cmd: VoidCmd) -> ResultEngine<VoidOutcome> {
        let reason = normalize_required_text(&cmd.reason, "void reason")?;
        let meta = normalize_tx_meta(
            TxMeta::new(cmd.voided_at)
                .created_by(cmd.created_by)
                .notes(reason),
        )?;
        let transaction_id = cmd.transaction_id;

        let voided: ResultEngine<VoidOutcome> = with_tx!(self, |db_tx| {
            let model = transactions::Entity::find_by_id(transaction_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))?;
            let mut original = Transaction::try_from(model)?;
            if original.is_voided {
                tracing::warn!(%transaction_id, "void rejected: already voided");
                return Err(EngineError::AlreadyVoided(transaction_id.to_string()));
            }

            let item = self.require_item(&db_tx, original.item_id).await?;
            let plan = plan_void(&original, item.stock()).inspect_err(|err| {
                tracing::warn!(%transaction_id, item_id = %item.id, "void rejected: {err}");
            })?;

            // Conditional flip: a concurrent void of the same row updates nothing here.
            let flipped = transactions::Entity::update_many()
                .col_expr(transactions::Column::IsVoided, Expr::value(true))
                .filter(transactions::Column::Id.eq(transaction_id))
                .filter(transactions::Column::IsVoided.eq(false))
                .exec(&db_tx)
                .await?;
            if flipped.rows_affected != 1 {
                return Err(EngineError::AlreadyVoided(transaction_id.to_string()));
            }
            original.is_voided = true;

            let mut correction = Transaction::new(
                item.id,
                TransactionKind::Correction,
                plan.quantity_change,
                meta.transaction_date,
                meta.created_by,
            )?;
            correction.unit_cost = original.unit_cost;
            correction.total_financial_impact = plan.basis_change;
            correction.reason_code = Some(ReasonCode::Void);
            correction.notes = meta.notes;
            correction.ref_transaction_id = Some(original.id);

            let (item, correction) = self
                .record_movement(&db_tx, item, plan.stock, correction)
                .await?;
            Ok(VoidOutcome {
                item,
                voided: original,
                correction,
            })
        });
        let outcome = voided?;
        log_committed(&outcome.item, &outcome.correction);
        tracing::info!(
            transaction_id = %outcome.voided.id,
            correction_id = %outcome.correction.id,
            "transaction voided"
        );
        Ok(outcome)
    }
}
