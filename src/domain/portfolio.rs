//! Portfolio: holdings keyed by symbol, guarded by a single lock.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Mutex, MutexGuard};

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::error::LedgerSimError;
use crate::domain::holding::Holding;
use crate::domain::numeric::to_money;

/// Price lookup used by [`Portfolio::market_value`].
///
/// One explicit interface instead of "a map or a callable": maps implement
/// it directly, closures go through [`PriceFn`], and oracle-backed lookups
/// wrap their `quote` in a `PriceFn` at the call site.
pub trait PriceResolver {
    fn resolve(&self, symbol: &str) -> Result<Decimal, LedgerSimError>;
}

impl PriceResolver for HashMap<String, Decimal> {
    fn resolve(&self, symbol: &str) -> Result<Decimal, LedgerSimError> {
        self.get(symbol)
            .copied()
            .ok_or_else(|| LedgerSimError::UnsupportedSymbol {
                symbol: symbol.to_string(),
            })
    }
}

/// Adapter turning a closure into a [`PriceResolver`].
pub struct PriceFn<F>(pub F);

impl<F> PriceResolver for PriceFn<F>
where
    F: Fn(&str) -> Result<Decimal, LedgerSimError>,
{
    fn resolve(&self, symbol: &str) -> Result<Decimal, LedgerSimError> {
        (self.0)(symbol)
    }
}

/// Tracks holdings for an owner and updates positions/cost basis on trades.
///
/// All holding mutations share one lock per portfolio, so buy, sell, removal
/// and listing are mutually exclusive. Holdings never leave the portfolio as
/// live references; every accessor returns a copy.
#[derive(Debug)]
pub struct Portfolio {
    portfolio_id: String,
    owner: String,
    account_id: Option<String>,
    currency: String,
    holdings: Mutex<HashMap<String, Holding>>,
}

/// Serializable read model of a portfolio at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSnapshot {
    pub portfolio_id: String,
    pub owner: String,
    pub account_id: Option<String>,
    pub currency: String,
    pub holdings: Vec<Holding>,
}

impl Portfolio {
    pub fn new(
        portfolio_id: &str,
        owner: &str,
        account_id: Option<&str>,
        currency: &str,
    ) -> Result<Self, LedgerSimError> {
        if portfolio_id.trim().is_empty() {
            return Err(LedgerSimError::InvalidIdentifier {
                reason: "portfolio_id must be a non-empty string".into(),
            });
        }
        if owner.trim().is_empty() {
            return Err(LedgerSimError::InvalidIdentifier {
                reason: "owner must be a non-empty string".into(),
            });
        }
        Ok(Self {
            portfolio_id: portfolio_id.to_string(),
            owner: owner.to_string(),
            account_id: account_id.map(str::to_string),
            currency: currency.to_string(),
            holdings: Mutex::new(HashMap::new()),
        })
    }

    pub fn portfolio_id(&self) -> &str {
        &self.portfolio_id
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn account_id(&self) -> Option<&str> {
        self.account_id.as_deref()
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Add or replace a holding, keyed by its symbol.
    pub fn add_holding(&self, holding: Holding) {
        let mut holdings = self.lock_holdings();
        holdings.insert(holding.symbol().to_string(), holding);
    }

    /// Holding for `symbol`, or `None` when not present. Returns a copy.
    pub fn holding(&self, symbol: &str) -> Result<Option<Holding>, LedgerSimError> {
        let symbol = normalize_symbol(symbol)?;
        Ok(self.lock_holdings().get(&symbol).cloned())
    }

    /// All holdings as snapshot copies. No ordering guarantee.
    pub fn list_holdings(&self) -> Vec<Holding> {
        self.lock_holdings().values().cloned().collect()
    }

    /// Remove a holding by symbol, failing when it does not exist.
    pub fn remove_holding(&self, symbol: &str) -> Result<(), LedgerSimError> {
        let symbol = normalize_symbol(symbol)?;
        let mut holdings = self.lock_holdings();
        match holdings.remove(&symbol) {
            Some(_) => Ok(()),
            None => Err(LedgerSimError::HoldingNotFound { symbol }),
        }
    }

    pub fn holding_count(&self) -> usize {
        self.lock_holdings().len()
    }

    /// Buy `quantity` of `symbol` at `price`, creating a zero-quantity
    /// holding on first reference. Returns the mutated holding as a copy.
    pub fn buy(
        &self,
        symbol: &str,
        quantity: Decimal,
        price: Decimal,
    ) -> Result<Holding, LedgerSimError> {
        let symbol = normalize_symbol(symbol)?;
        let mut holdings = self.lock_holdings();
        let holding = match holdings.entry(symbol.clone()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(Holding::new(&symbol, &self.currency)?),
        };
        holding.buy(quantity, price)?;
        Ok(holding.clone())
    }

    /// Sell `quantity` of `symbol` at `price`. Returns realized P/L.
    ///
    /// The holding is removed from the portfolio when the sale closes it
    /// (quantity exactly zero).
    pub fn sell(
        &self,
        symbol: &str,
        quantity: Decimal,
        price: Decimal,
    ) -> Result<Decimal, LedgerSimError> {
        let symbol = normalize_symbol(symbol)?;
        let mut holdings = self.lock_holdings();
        let holding = holdings
            .get_mut(&symbol)
            .ok_or_else(|| LedgerSimError::HoldingNotFound {
                symbol: symbol.clone(),
            })?;
        let realized = holding.sell(quantity, price)?;
        if holding.is_closed() {
            holdings.remove(&symbol);
        }
        Ok(realized)
    }

    /// Total market value across all holdings, quantized to cents at the
    /// end. A missing price for any held symbol fails the whole call.
    pub fn market_value(&self, prices: &dyn PriceResolver) -> Result<Decimal, LedgerSimError> {
        let holdings = self.lock_holdings();
        let mut total = Decimal::ZERO;
        for (symbol, holding) in holdings.iter() {
            let price = prices.resolve(symbol)?;
            total += holding.market_value(price);
        }
        Ok(to_money(total))
    }

    /// Point-in-time read model for serialization and reporting.
    pub fn snapshot(&self) -> PortfolioSnapshot {
        PortfolioSnapshot {
            portfolio_id: self.portfolio_id.clone(),
            owner: self.owner.clone(),
            account_id: self.account_id.clone(),
            currency: self.currency.clone(),
            holdings: self.list_holdings(),
        }
    }

    fn lock_holdings(&self) -> MutexGuard<'_, HashMap<String, Holding>> {
        self.holdings.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn normalize_symbol(symbol: &str) -> Result<String, LedgerSimError> {
    let trimmed = symbol.trim();
    if trimmed.is_empty() {
        return Err(LedgerSimError::UnsupportedSymbol {
            symbol: symbol.to_string(),
        });
    }
    Ok(trimmed.to_string())
}
