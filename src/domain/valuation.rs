//! Market valuation and profit/loss computation.

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::error::LedgerSimError;
use crate::domain::holding::Holding;
use crate::domain::numeric::to_money;
use crate::domain::transaction::Transaction;
use crate::ports::price_port::PriceOracle;

/// Computes market values and realized/unrealized P/L for holdings.
///
/// Constructed with or without a price oracle; when no oracle is configured,
/// every valuation needs an explicit price or a per-symbol override.
/// Read-only: consumes holding snapshots (`Portfolio::list_holdings`) and
/// ledger entries, never live aggregates.
pub struct ValuationEngine {
    oracle: Option<Arc<dyn PriceOracle>>,
}

/// Per-holding valuation row. Price-dependent cells are `None` when the
/// price could not be resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownRow {
    pub symbol: String,
    pub quantity: Decimal,
    pub average_cost: Decimal,
    pub market_price: Option<Decimal>,
    pub market_value: Option<Decimal>,
    pub unrealized_pl: Option<Decimal>,
}

/// Full per-holding breakdown with aggregates over the priced rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioBreakdown {
    pub rows: Vec<BreakdownRow>,
    pub total_market_value: Decimal,
    pub total_unrealized_pl: Decimal,
}

impl ValuationEngine {
    pub fn new(oracle: Arc<dyn PriceOracle>) -> Self {
        Self {
            oracle: Some(oracle),
        }
    }

    /// Engine without a price source; all prices must be supplied
    /// explicitly.
    pub fn without_oracle() -> Self {
        Self { oracle: None }
    }

    fn price_for(&self, symbol: &str) -> Result<Decimal, LedgerSimError> {
        let oracle = self
            .oracle
            .as_ref()
            .ok_or_else(|| LedgerSimError::Valuation {
                reason: "no price oracle configured; explicit price required".into(),
            })?;
        oracle
            .quote(symbol)
            .map(to_money)
            .map_err(|err| LedgerSimError::Valuation {
                reason: format!("failed to obtain price for {symbol}: {err}"),
            })
    }

    fn resolve(
        &self,
        symbol: &str,
        explicit: Option<Decimal>,
    ) -> Result<Decimal, LedgerSimError> {
        match explicit {
            Some(price) => Ok(to_money(price)),
            None => self.price_for(symbol),
        }
    }

    /// Market value of one holding: quantity × price, quantized to cents.
    /// With no explicit price the oracle is queried.
    pub fn holding_market_value(
        &self,
        holding: &Holding,
        price: Option<Decimal>,
    ) -> Result<Decimal, LedgerSimError> {
        let price = self.resolve(holding.symbol(), price)?;
        Ok(holding.market_value(price))
    }

    /// Unrealized P/L of one holding:
    /// (market price − average cost) × quantity, quantized to cents.
    pub fn holding_unrealized_pl(
        &self,
        holding: &Holding,
        price: Option<Decimal>,
    ) -> Result<Decimal, LedgerSimError> {
        let price = self.resolve(holding.symbol(), price)?;
        Ok(to_money((price - holding.average_cost()) * holding.quantity()))
    }

    /// Total market value over a set of holdings. Per-symbol overrides take
    /// precedence over the oracle; a price missing everywhere fails the
    /// whole call.
    pub fn portfolio_market_value(
        &self,
        holdings: &[Holding],
        price_overrides: &HashMap<String, Decimal>,
    ) -> Result<Decimal, LedgerSimError> {
        let mut total = Decimal::ZERO;
        for holding in holdings {
            let override_price = price_overrides.get(holding.symbol()).copied();
            total += self.holding_market_value(holding, override_price)?;
        }
        Ok(to_money(total))
    }

    /// Aggregate unrealized P/L over a set of holdings.
    pub fn portfolio_unrealized_pl(
        &self,
        holdings: &[Holding],
        price_overrides: &HashMap<String, Decimal>,
    ) -> Result<Decimal, LedgerSimError> {
        let mut total = Decimal::ZERO;
        for holding in holdings {
            let override_price = price_overrides.get(holding.symbol()).copied();
            total += self.holding_unrealized_pl(holding, override_price)?;
        }
        Ok(to_money(total))
    }

    /// Sum of realized profit/loss across ledger entries. Entries without a
    /// recorded `profit_loss` are skipped; recorded values are already
    /// quantized at construction.
    pub fn realized_pl(&self, entries: &[Transaction]) -> Decimal {
        let total: Decimal = entries.iter().filter_map(Transaction::profit_loss).sum();
        to_money(total)
    }

    /// Per-holding breakdown tolerating partially missing prices.
    ///
    /// Rows whose price cannot be resolved carry `None` for the
    /// price-dependent cells and are excluded from the aggregates; a single
    /// missing price never aborts the whole breakdown.
    pub fn breakdown(
        &self,
        holdings: &[Holding],
        price_overrides: &HashMap<String, Decimal>,
    ) -> PortfolioBreakdown {
        let mut rows = Vec::with_capacity(holdings.len());
        let mut total_market_value = Decimal::ZERO;
        let mut total_unrealized_pl = Decimal::ZERO;

        for holding in holdings {
            let price = match price_overrides.get(holding.symbol()).copied() {
                Some(override_price) => Some(to_money(override_price)),
                None => self.price_for(holding.symbol()).ok(),
            };

            let (market_value, unrealized_pl) = match price {
                Some(price) => {
                    let market_value = holding.market_value(price);
                    let unrealized_pl =
                        to_money((price - holding.average_cost()) * holding.quantity());
                    total_market_value += market_value;
                    total_unrealized_pl += unrealized_pl;
                    (Some(market_value), Some(unrealized_pl))
                }
                None => (None, None),
            };

            rows.push(BreakdownRow {
                symbol: holding.symbol().to_string(),
                quantity: holding.quantity(),
                average_cost: holding.average_cost(),
                market_price: price,
                market_value,
                unrealized_pl,
            });
        }

        PortfolioBreakdown {
            rows,
            total_market_value: to_money(total_market_value),
            total_unrealized_pl: to_money(total_unrealized_pl),
        }
    }
}
