use sea_orm::TransactionTrait;

use crate::{
    DistributionCmd, DonationCmd, Item, PurchaseCmd, ResultEngine, Transaction, TransactionKind,
    cost::{self, validate_non_negative, validate_quantity},
    util::{normalize_optional_text, normalize_tx_meta},
};

use super::{
    super::{Engine, with_tx},
    log_committed,
};

impl Engine {
    /// Records a purchase: quantity and cost basis both increase.
    ///
    /// The basis grows by `quantity * unit_cost`, rounded half to even.
    pub async fn process_purchase(&self, cmd: PurchaseCmd) -> ResultEngine<(Item, Transaction)> {
        validate_quantity(cmd.quantity, "purchase")?;
        validate_non_negative(cmd.unit_cost, "unit cost")?;
        let meta = normalize_tx_meta(cmd.meta)?;
        let supplier = normalize_optional_text(cmd.supplier.as_deref());
        let in_cost = cost::extended_cost(cmd.quantity, cmd.unit_cost)?;

        let recorded: ResultEngine<(Item, Transaction)> = with_tx!(self, |db_tx| {
            let item = self.require_active_item(&db_tx, cmd.item_id).await?;
            let stock = cost::apply_purchase(item.stock(), cmd.quantity, in_cost)?;

            let mut tx = Transaction::new(
                item.id,
                TransactionKind::Purchase,
                cmd.quantity,
                meta.transaction_date,
                meta.created_by,
            )?;
            tx.unit_cost = cmd.unit_cost;
            tx.supplier = supplier;
            tx.notes = meta.notes;

            self.record_movement(&db_tx, item, stock, tx).await
        });
        let (item, tx) = recorded?;
        log_committed(&item, &tx);
        Ok((item, tx))
    }

    /// Records a donation: quantity increases, cost basis does not.
    ///
    /// `fair_market_value` on the ledger row is the total for the whole
    /// quantity and is never added to the basis.
    pub async fn process_donation(&self, cmd: DonationCmd) -> ResultEngine<(Item, Transaction)> {
        validate_quantity(cmd.quantity, "donation")?;
        validate_non_negative(cmd.fair_market_value_per_unit, "fair market value")?;
        let meta = normalize_tx_meta(cmd.meta)?;
        let donor = normalize_optional_text(cmd.donor.as_deref());
        let fair_market_value =
            cost::extended_cost(cmd.quantity, cmd.fair_market_value_per_unit)?;

        let recorded: ResultEngine<(Item, Transaction)> = with_tx!(self, |db_tx| {
            let item = self.require_active_item(&db_tx, cmd.item_id).await?;
            let stock = cost::apply_donation(item.stock(), cmd.quantity)?;

            let mut tx = Transaction::new(
                item.id,
                TransactionKind::Donation,
                cmd.quantity,
                meta.transaction_date,
                meta.created_by,
            )?;
            tx.fair_market_value = fair_market_value;
            tx.donor = donor;
            tx.notes = meta.notes;

            self.record_movement(&db_tx, item, stock, tx).await
        });
        let (item, tx) = recorded?;
        log_committed(&item, &tx);
        Ok((item, tx))
    }

    /// Records stock leaving the pantry at weighted-average cost.
    ///
    /// The ledger row carries the unit cost used and the COGS in
    /// `total_financial_impact`. Fails with `InsufficientInventory`, leaving
    /// everything untouched, when less than `quantity` is on hand.
    pub async fn process_distribution(
        &self,
        cmd: DistributionCmd,
    ) -> ResultEngine<(Item, Transaction)> {
        validate_quantity(cmd.quantity, "distribution")?;
        let meta = normalize_tx_meta(cmd.meta)?;

        let recorded: ResultEngine<(Item, Transaction)> = with_tx!(self, |db_tx| {
            let item = self.require_active_item(&db_tx, cmd.item_id).await?;
            let out = cost::apply_distribution(item.stock(), cmd.quantity).inspect_err(|err| {
                tracing::warn!(item_id = %item.id, "distribution rejected: {err}");
            })?;

            let mut tx = Transaction::new(
                item.id,
                TransactionKind::Distribution,
                -cmd.quantity,
                meta.transaction_date,
                meta.created_by,
            )?;
            tx.unit_cost = out.unit_cost;
            tx.total_financial_impact = out.cogs;
            tx.reason_code = Some(cmd.reason.into());
            tx.notes = meta.notes;

            self.record_movement(&db_tx, item, out.stock, tx).await
        });
        let (item, tx) = recorded?;
        log_committed(&item, &tx);
        Ok((item, tx))
    }
}
