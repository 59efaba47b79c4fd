//! Weighted-average cost arithmetic.
//!
//! Pure functions over a `(quantity, cost basis)` pair. Nothing here touches
//! storage; the write operations load an item, call into this module, and
//! persist whatever comes back.
//!
//! ## Rounding
//!
//! Unit cost and COGS are rounded to the nearest cent with ties going to the
//! even neighbour. Truncation is not used anywhere: it drifts the basis
//! downwards on every distribution.
//!
//! ## Stuck basis
//!
//! A distribution subtracts `round(out_qty * unit_cost)` from the basis and
//! floors the result at zero. After many partial distributions the rounding
//! residue can leave a few cents of basis on an item whose quantity reaches
//! zero (or absorb a few cents too many, hitting the floor). Both are
//! accepted in exchange for a basis that can never go negative.

use crate::{EngineError, MoneyCents, ResultEngine};

/// Quantity and cost basis of an item at a point in time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StockLevel {
    pub quantity: f64,
    pub cost_basis: MoneyCents,
}

impl StockLevel {
    #[must_use]
    pub const fn new(quantity: f64, cost_basis: MoneyCents) -> Self {
        Self {
            quantity,
            cost_basis,
        }
    }

    /// Weighted-average unit cost of this stock.
    pub fn unit_cost(&self) -> ResultEngine<MoneyCents> {
        unit_cost(self.cost_basis, self.quantity)
    }
}

/// Result of taking stock out at weighted-average cost.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Distribution {
    pub stock: StockLevel,
    /// Unit cost the COGS was computed with.
    pub unit_cost: MoneyCents,
    pub cogs: MoneyCents,
}

/// Round a cent amount to an integer, half to even.
///
/// Fails on NaN, infinities and anything that does not fit in `i64`.
fn round_cents(value: f64) -> ResultEngine<MoneyCents> {
    let rounded = value.round_ties_even();
    // `i64::MAX as f64` is 2^63, one past the largest representable value.
    if !rounded.is_finite() || rounded < i64::MIN as f64 || rounded >= i64::MAX as f64 {
        return Err(overflow());
    }
    Ok(MoneyCents::new(rounded as i64))
}

/// Weighted-average unit cost: `basis / quantity`, rounded half to even.
///
/// Returns zero when there is nothing on hand.
pub fn unit_cost(basis: MoneyCents, quantity: f64) -> ResultEngine<MoneyCents> {
    if !(quantity > 0.0) {
        return Ok(MoneyCents::ZERO);
    }
    round_cents(basis.cents() as f64 / quantity)
}

/// Value of `quantity` units at `unit_cost`, rounded half to even.
pub fn extended_cost(quantity: f64, unit_cost: MoneyCents) -> ResultEngine<MoneyCents> {
    round_cents(quantity * unit_cost.cents() as f64)
}

/// Reject non-finite and non-positive quantities.
pub(crate) fn validate_quantity(quantity: f64, label: &str) -> ResultEngine<()> {
    if !quantity.is_finite() || quantity <= 0.0 {
        return Err(EngineError::InvalidInput(format!(
            "{label} quantity must be > 0"
        )));
    }
    Ok(())
}

pub(crate) fn validate_non_negative(amount: MoneyCents, label: &str) -> ResultEngine<()> {
    if amount.is_negative() {
        return Err(EngineError::InvalidInput(format!(
            "{label} cannot be negative"
        )));
    }
    Ok(())
}

fn overflow() -> EngineError {
    EngineError::InvalidInput("cost basis overflow".to_string())
}

/// Add purchased stock: quantity and basis both grow.
pub fn apply_purchase(
    current: StockLevel,
    in_quantity: f64,
    in_cost: MoneyCents,
) -> ResultEngine<StockLevel> {
    validate_quantity(in_quantity, "purchase")?;
    validate_non_negative(in_cost, "purchase cost")?;

    let cost_basis = current
        .cost_basis
        .checked_add(in_cost)
        .ok_or_else(overflow)?;
    Ok(StockLevel::new(current.quantity + in_quantity, cost_basis))
}

/// Add donated stock at zero cost.
///
/// The basis is unchanged, which dilutes the weighted-average unit cost.
/// Fair market value never enters the basis.
pub fn apply_donation(current: StockLevel, in_quantity: f64) -> ResultEngine<StockLevel> {
    validate_quantity(in_quantity, "donation")?;
    Ok(StockLevel::new(
        current.quantity + in_quantity,
        current.cost_basis,
    ))
}

/// Take stock out at the current weighted-average unit cost.
pub fn apply_distribution(current: StockLevel, out_quantity: f64) -> ResultEngine<Distribution> {
    validate_quantity(out_quantity, "distribution")?;
    if out_quantity > current.quantity {
        return Err(EngineError::InsufficientInventory(format!(
            "available {}, requested {}",
            current.quantity, out_quantity
        )));
    }

    let unit_cost = current.unit_cost()?;
    let cogs = extended_cost(out_quantity, unit_cost)?;
    let cost_basis = (current.cost_basis - cogs).floor_zero();

    Ok(Distribution {
        stock: StockLevel::new(current.quantity - out_quantity, cost_basis),
        unit_cost,
        cogs,
    })
}
