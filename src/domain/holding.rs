//! Single-symbol position with weighted-average cost basis.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::error::LedgerSimError;
use crate::domain::numeric::{to_money, to_quantity};

/// A position in one symbol: quantity held and the weighted-average price
/// paid for it.
///
/// A holding never has a negative quantity, and its average cost resets to
/// zero exactly when the quantity reaches zero. Mutation goes through
/// `&mut self`, which in practice means through the owning portfolio's lock;
/// the portfolio hands out snapshot copies, never live references.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Holding {
    symbol: String,
    quantity: Decimal,
    average_cost: Decimal,
    currency: String,
}

impl Holding {
    /// Empty position: zero quantity, zero cost basis.
    pub fn new(symbol: &str, currency: &str) -> Result<Self, LedgerSimError> {
        Self::with_position(symbol, Decimal::ZERO, Decimal::ZERO, currency)
    }

    /// Position with explicit quantity and average cost, both normalized.
    pub fn with_position(
        symbol: &str,
        quantity: Decimal,
        average_cost: Decimal,
        currency: &str,
    ) -> Result<Self, LedgerSimError> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(LedgerSimError::UnsupportedSymbol {
                symbol: symbol.to_string(),
            });
        }
        let quantity = to_quantity(quantity);
        if quantity < Decimal::ZERO {
            return Err(LedgerSimError::InvalidQuantity {
                reason: format!("holding quantity cannot be negative: {quantity}"),
            });
        }
        let average_cost = to_money(average_cost);
        if average_cost < Decimal::ZERO {
            return Err(LedgerSimError::InvalidAmount {
                reason: format!("average cost cannot be negative: {average_cost}"),
            });
        }
        Ok(Self {
            symbol: symbol.to_string(),
            quantity,
            average_cost,
            currency: currency.to_string(),
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    pub fn average_cost(&self) -> Decimal {
        self.average_cost
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Buy `quantity` units at `price`, recomputing the weighted-average
    /// cost basis. Returns the new quantity.
    ///
    /// `new_avg = (old_qty * old_avg + qty * price) / (old_qty + qty)`,
    /// quantized to cents.
    pub fn buy(&mut self, quantity: Decimal, price: Decimal) -> Result<Decimal, LedgerSimError> {
        let quantity = positive_quantity(quantity)?;
        let price = positive_price(price)?;

        let old_cost = self.quantity * self.average_cost;
        let new_quantity = to_quantity(self.quantity + quantity);
        self.average_cost = to_money((old_cost + quantity * price) / new_quantity);
        self.quantity = new_quantity;
        Ok(self.quantity)
    }

    /// Sell `quantity` units at `price`. Returns the realized profit/loss,
    /// `(price - average_cost) * quantity` quantized to cents.
    ///
    /// The average cost is unchanged while some quantity remains and resets
    /// to zero exactly when the position closes.
    pub fn sell(&mut self, quantity: Decimal, price: Decimal) -> Result<Decimal, LedgerSimError> {
        let quantity = positive_quantity(quantity)?;
        let price = positive_price(price)?;
        if quantity > self.quantity {
            return Err(LedgerSimError::InsufficientHoldings {
                requested: quantity,
                available: self.quantity,
            });
        }

        let realized = to_money((price - self.average_cost) * quantity);
        self.quantity = to_quantity(self.quantity - quantity);
        if self.quantity == Decimal::ZERO {
            self.average_cost = to_money(Decimal::ZERO);
        }
        Ok(realized)
    }

    /// Market value of the position at `price`: `quantity * price`,
    /// quantized to cents.
    pub fn market_value(&self, price: Decimal) -> Decimal {
        to_money(self.quantity * to_money(price))
    }

    /// True once the position is fully closed.
    pub fn is_closed(&self) -> bool {
        self.quantity == Decimal::ZERO
    }
}

fn positive_quantity(quantity: Decimal) -> Result<Decimal, LedgerSimError> {
    let quantity = to_quantity(quantity);
    if quantity <= Decimal::ZERO {
        return Err(LedgerSimError::InvalidQuantity {
            reason: format!("quantity must be positive: {quantity}"),
        });
    }
    Ok(quantity)
}

fn positive_price(price: Decimal) -> Result<Decimal, LedgerSimError> {
    let price = to_money(price);
    if price <= Decimal::ZERO {
        return Err(LedgerSimError::InvalidPrice {
            reason: format!("price must be positive: {price}"),
        });
    }
    Ok(price)
}
