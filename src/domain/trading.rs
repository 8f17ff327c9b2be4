//! Trade orchestration across accounts, portfolios, ledger, and prices.
//!
//! There is no cross-aggregate atomic commit: each buy/sell is a linear
//! pipeline of short, independently-locked steps with compensating rollback
//! when a downstream step fails after an upstream step committed. The step
//! ordering is part of the contract: cash is spent before holdings are
//! credited on buy, and holdings are debited before cash is credited on
//! sell, so the compensations always reverse an already-applied side effect.

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::warn;

use crate::domain::account::CashAccount;
use crate::domain::error::LedgerSimError;
use crate::domain::holding::Holding;
use crate::domain::numeric::to_quantity;
use crate::domain::portfolio::Portfolio;
use crate::domain::symbols::SymbolPolicy;
use crate::domain::transaction::{Transaction, TransactionKind};
use crate::ports::id_port::IdGenerator;
use crate::ports::price_port::PriceOracle;
use crate::ports::store_port::{AccountStore, PortfolioStore, TransactionStore};

/// Price instruction for an order: resolve from the oracle, or use the
/// given limit price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrderPrice {
    Market,
    Limit(Decimal),
}

/// Executes buy and sell orders, mutating cash and holdings and recording
/// ledger entries.
///
/// All collaborators are injected at construction; there are no hidden
/// in-memory defaults.
pub struct TradingEngine {
    accounts: Arc<dyn AccountStore>,
    portfolios: Arc<dyn PortfolioStore>,
    transactions: Arc<dyn TransactionStore>,
    oracle: Arc<dyn PriceOracle>,
    ids: Arc<dyn IdGenerator>,
    policy: SymbolPolicy,
}

impl TradingEngine {
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        portfolios: Arc<dyn PortfolioStore>,
        transactions: Arc<dyn TransactionStore>,
        oracle: Arc<dyn PriceOracle>,
        ids: Arc<dyn IdGenerator>,
        policy: SymbolPolicy,
    ) -> Self {
        Self {
            accounts,
            portfolios,
            transactions,
            oracle,
            ids,
            policy,
        }
    }

    /// Execute a buy: resolve the price, validate funds, withdraw cash,
    /// credit holdings, and append the ledger entry. Returns the committed
    /// entry.
    pub fn buy(
        &self,
        account_id: &str,
        portfolio_id: &str,
        symbol: &str,
        quantity: Decimal,
        price: OrderPrice,
    ) -> Result<Transaction, LedgerSimError> {
        let symbol = self.policy.validate(symbol)?;
        let resolved_price = self.resolve_price(&symbol, price)?;

        // Construct the candidate entry first: it validates quantity/price
        // and fixes the required cash amount. Not yet appended.
        let entry = Transaction::builder(
            TransactionKind::Buy,
            &self.ids.transaction_id(),
            account_id,
        )
        .quantity(quantity)
        .price(resolved_price)
        .metadata(symbol_metadata(&symbol))
        .build()?;

        let account = self.load_account(account_id)?;
        let available = account.balance();
        if entry.amount() > available {
            return Err(LedgerSimError::InsufficientFunds {
                requested: entry.amount(),
                available,
            });
        }

        // Committed from here on: every later failure must refund.
        account.withdraw(entry.amount())?;
        if let Err(err) = self.accounts.save(Arc::clone(&account)) {
            return Err(self.refund(&account, entry.amount(), "buy", err));
        }

        let portfolio = match self.portfolios.get(portfolio_id) {
            Ok(Some(portfolio)) => portfolio,
            Ok(None) => {
                let cause = LedgerSimError::PortfolioNotFound {
                    portfolio_id: portfolio_id.to_string(),
                };
                return Err(self.refund(&account, entry.amount(), "buy", cause));
            }
            Err(err) => return Err(self.refund(&account, entry.amount(), "buy", err)),
        };

        if let Err(err) = portfolio
            .buy(&symbol, quantity, resolved_price)
            .and_then(|_| self.portfolios.save(Arc::clone(&portfolio)))
        {
            return Err(self.refund(&account, entry.amount(), "buy", err));
        }

        if let Err(err) = self.transactions.save(entry.clone()) {
            let cause = LedgerSimError::Trading {
                reason: format!("failed to record buy entry: {err}"),
            };
            warn!(
                account = account_id,
                portfolio = portfolio_id,
                symbol = %symbol,
                "ledger append failed after buy, compensating"
            );
            // Sell back the just-bought quantity, then refund the cash.
            // Best effort: the original failure propagates either way.
            let sell_back = portfolio
                .sell(&symbol, quantity, resolved_price)
                .map(|_| ())
                .and_then(|_| self.portfolios.save(Arc::clone(&portfolio)));
            let refund = account
                .deposit(entry.amount())
                .map(|_| ())
                .and_then(|_| self.accounts.save(Arc::clone(&account)));
            return Err(combine("buy", cause, [sell_back, refund]));
        }

        Ok(entry)
    }

    /// Execute a sell: validate holdings, debit them (realizing P/L),
    /// deposit the proceeds, and append the ledger entry. Returns the
    /// committed entry.
    pub fn sell(
        &self,
        account_id: &str,
        portfolio_id: &str,
        symbol: &str,
        quantity: Decimal,
        price: OrderPrice,
    ) -> Result<Transaction, LedgerSimError> {
        let symbol = self.policy.validate(symbol)?;
        let resolved_price = self.resolve_price(&symbol, price)?;

        let portfolio = self.portfolios.get(portfolio_id)?.ok_or_else(|| {
            LedgerSimError::PortfolioNotFound {
                portfolio_id: portfolio_id.to_string(),
            }
        })?;
        let requested = to_quantity(quantity);
        let held = match portfolio.holding(&symbol)? {
            Some(holding) => holding.quantity(),
            None => {
                return Err(LedgerSimError::InsufficientHoldings {
                    requested,
                    available: Decimal::ZERO,
                });
            }
        };
        if requested > held {
            return Err(LedgerSimError::InsufficientHoldings {
                requested,
                available: held,
            });
        }

        // Committed from here on: every later failure must buy back.
        let realized = portfolio.sell(&symbol, quantity, resolved_price)?;
        self.portfolios.save(Arc::clone(&portfolio))?;

        let entry = match Transaction::builder(
            TransactionKind::Sell,
            &self.ids.transaction_id(),
            account_id,
        )
        .quantity(quantity)
        .price(resolved_price)
        .profit_loss(realized)
        .metadata(symbol_metadata(&symbol))
        .build()
        {
            Ok(entry) => entry,
            Err(cause) => {
                return Err(self.buy_back(&portfolio, &symbol, quantity, resolved_price, cause));
            }
        };

        let account = match self.accounts.get(account_id) {
            Ok(Some(account)) => account,
            Ok(None) => {
                let cause = LedgerSimError::AccountNotFound {
                    account_id: account_id.to_string(),
                };
                return Err(self.buy_back(&portfolio, &symbol, quantity, resolved_price, cause));
            }
            Err(err) => {
                return Err(self.buy_back(&portfolio, &symbol, quantity, resolved_price, err));
            }
        };
        if let Err(err) = account
            .deposit(entry.amount())
            .map(|_| ())
            .and_then(|_| self.accounts.save(Arc::clone(&account)))
        {
            return Err(self.buy_back(&portfolio, &symbol, quantity, resolved_price, err));
        }

        if let Err(err) = self.transactions.save(entry.clone()) {
            let cause = LedgerSimError::Trading {
                reason: format!("failed to record sell entry: {err}"),
            };
            warn!(
                account = account_id,
                portfolio = portfolio_id,
                symbol = %symbol,
                "ledger append failed after sell, compensating"
            );
            let clawback = account
                .withdraw(entry.amount())
                .map(|_| ())
                .and_then(|_| self.accounts.save(Arc::clone(&account)));
            let buy_back = portfolio
                .buy(&symbol, quantity, resolved_price)
                .map(|_| ())
                .and_then(|_| self.portfolios.save(Arc::clone(&portfolio)));
            return Err(combine("sell", cause, [clawback, buy_back]));
        }

        Ok(entry)
    }

    /// Deposit cash into an account and record the matching ledger entry.
    pub fn deposit(
        &self,
        account_id: &str,
        amount: Decimal,
    ) -> Result<Transaction, LedgerSimError> {
        let entry = Transaction::deposit(&self.ids.transaction_id(), account_id, amount)?;
        let account = self.load_account(account_id)?;
        account.deposit(entry.amount())?;
        if let Err(err) = self.accounts.save(Arc::clone(&account)) {
            return Err(self.claw_back_deposit(&account, entry.amount(), "deposit", err));
        }
        if let Err(err) = self.transactions.save(entry.clone()) {
            let cause = LedgerSimError::Trading {
                reason: format!("failed to record deposit entry: {err}"),
            };
            return Err(self.claw_back_deposit(&account, entry.amount(), "deposit", cause));
        }
        Ok(entry)
    }

    /// Withdraw cash from an account and record the matching ledger entry.
    pub fn withdraw(
        &self,
        account_id: &str,
        amount: Decimal,
    ) -> Result<Transaction, LedgerSimError> {
        let entry = Transaction::withdrawal(&self.ids.transaction_id(), account_id, amount)?;
        let account = self.load_account(account_id)?;
        account.withdraw(entry.amount())?;
        if let Err(err) = self.accounts.save(Arc::clone(&account)) {
            return Err(self.refund(&account, entry.amount(), "withdraw", err));
        }
        if let Err(err) = self.transactions.save(entry.clone()) {
            let cause = LedgerSimError::Trading {
                reason: format!("failed to record withdrawal entry: {err}"),
            };
            return Err(self.refund(&account, entry.amount(), "withdraw", cause));
        }
        Ok(entry)
    }

    /// Ledger entries referencing the given account, in insertion order.
    pub fn transactions_for_account(
        &self,
        account_id: &str,
    ) -> Result<Vec<Transaction>, LedgerSimError> {
        self.transactions.list_for_account(account_id)
    }

    /// Holding snapshots of the given portfolio.
    pub fn portfolio_holdings(
        &self,
        portfolio_id: &str,
    ) -> Result<Vec<Holding>, LedgerSimError> {
        let portfolio = self.portfolios.get(portfolio_id)?.ok_or_else(|| {
            LedgerSimError::PortfolioNotFound {
                portfolio_id: portfolio_id.to_string(),
            }
        })?;
        Ok(portfolio.list_holdings())
    }

    fn resolve_price(
        &self,
        symbol: &str,
        price: OrderPrice,
    ) -> Result<Decimal, LedgerSimError> {
        match price {
            OrderPrice::Market => {
                self.oracle
                    .quote(symbol)
                    .map_err(|err| LedgerSimError::Trading {
                        reason: format!("failed to obtain market price for {symbol}: {err}"),
                    })
            }
            OrderPrice::Limit(price) => Ok(price),
        }
    }

    fn load_account(&self, account_id: &str) -> Result<Arc<CashAccount>, LedgerSimError> {
        self.accounts
            .get(account_id)?
            .ok_or_else(|| LedgerSimError::AccountNotFound {
                account_id: account_id.to_string(),
            })
    }

    /// Re-deposit an amount that was withdrawn by a step that later had to
    /// be unwound. Returns the error to propagate: the original cause, or
    /// `Inconsistent` when the refund itself failed.
    fn refund(
        &self,
        account: &Arc<CashAccount>,
        amount: Decimal,
        operation: &str,
        cause: LedgerSimError,
    ) -> LedgerSimError {
        warn!(account = account.account_id(), %amount, %cause, "compensating cash refund");
        let outcome = account
            .deposit(amount)
            .map(|_| ())
            .and_then(|_| self.accounts.save(Arc::clone(account)));
        combine(operation, cause, [outcome])
    }

    /// Withdraw back a deposit that was applied by a step that later had to
    /// be unwound.
    fn claw_back_deposit(
        &self,
        account: &Arc<CashAccount>,
        amount: Decimal,
        operation: &str,
        cause: LedgerSimError,
    ) -> LedgerSimError {
        warn!(account = account.account_id(), %amount, %cause, "compensating deposit claw-back");
        let outcome = account
            .withdraw(amount)
            .map(|_| ())
            .and_then(|_| self.accounts.save(Arc::clone(account)));
        combine(operation, cause, [outcome])
    }

    /// Buy back a quantity that a failed sell pipeline already debited.
    /// This restores the quantity, not necessarily the prior average cost.
    fn buy_back(
        &self,
        portfolio: &Arc<Portfolio>,
        symbol: &str,
        quantity: Decimal,
        price: Decimal,
        cause: LedgerSimError,
    ) -> LedgerSimError {
        warn!(
            portfolio = portfolio.portfolio_id(),
            symbol,
            %quantity,
            %cause,
            "compensating holding buy-back"
        );
        let outcome = portfolio
            .buy(symbol, quantity, price)
            .map(|_| ())
            .and_then(|_| self.portfolios.save(Arc::clone(portfolio)));
        combine("sell", cause, [outcome])
    }
}

fn symbol_metadata(symbol: &str) -> HashMap<String, String> {
    let mut metadata = HashMap::new();
    metadata.insert("symbol".to_string(), symbol.to_string());
    metadata
}

/// Fold compensation outcomes into the error to propagate: the original
/// cause when every compensation succeeded, `Inconsistent` (carrying both
/// failures) otherwise.
fn combine<const N: usize>(
    operation: &str,
    cause: LedgerSimError,
    outcomes: [Result<(), LedgerSimError>; N],
) -> LedgerSimError {
    for outcome in outcomes {
        if let Err(compensation) = outcome {
            warn!(%compensation, "compensation failed; state may be inconsistent");
            return LedgerSimError::Inconsistent {
                operation: operation.to_string(),
                cause: cause.to_string(),
                compensation: compensation.to_string(),
            };
        }
    }
    cause
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::fixed_price_adapter::FixedPriceOracle;
    use crate::adapters::memory_store::{
        InMemoryAccountStore, InMemoryPortfolioStore, InMemoryTransactionStore,
    };
    use crate::adapters::uuid_id_adapter::UuidIdGenerator;
    use rust_decimal_macros::dec;

    /// Transaction store that refuses every save, for compensation tests.
    struct FailingTransactionStore;

    impl TransactionStore for FailingTransactionStore {
        fn save(&self, _entry: Transaction) -> Result<(), LedgerSimError> {
            Err(LedgerSimError::Storage {
                reason: "simulated persist failure".into(),
            })
        }

        fn get(&self, _id: &str) -> Result<Option<Transaction>, LedgerSimError> {
            Ok(None)
        }

        fn delete(&self, id: &str) -> Result<(), LedgerSimError> {
            Err(LedgerSimError::TransactionNotFound {
                transaction_id: id.to_string(),
            })
        }

        fn list(&self) -> Result<Vec<Transaction>, LedgerSimError> {
            Ok(Vec::new())
        }

        fn exists(&self, _id: &str) -> Result<bool, LedgerSimError> {
            Ok(false)
        }

        fn list_for_account(&self, _id: &str) -> Result<Vec<Transaction>, LedgerSimError> {
            Ok(Vec::new())
        }
    }

    struct Fixture {
        accounts: Arc<InMemoryAccountStore>,
        portfolios: Arc<InMemoryPortfolioStore>,
        transactions: Arc<InMemoryTransactionStore>,
    }

    impl Fixture {
        fn new(balance: Decimal) -> Self {
            let fixture = Fixture {
                accounts: Arc::new(InMemoryAccountStore::new()),
                portfolios: Arc::new(InMemoryPortfolioStore::new()),
                transactions: Arc::new(InMemoryTransactionStore::new()),
            };
            fixture
                .accounts
                .save(Arc::new(
                    CashAccount::new("acct-1", "alice", balance, "USD").unwrap(),
                ))
                .unwrap();
            fixture
                .portfolios
                .save(Arc::new(
                    Portfolio::new("p-1", "alice", Some("acct-1"), "USD").unwrap(),
                ))
                .unwrap();
            fixture
        }

        fn engine(&self) -> TradingEngine {
            TradingEngine::new(
                Arc::clone(&self.accounts) as Arc<dyn AccountStore>,
                Arc::clone(&self.portfolios) as Arc<dyn PortfolioStore>,
                Arc::clone(&self.transactions) as Arc<dyn TransactionStore>,
                Arc::new(FixedPriceOracle::with_default_symbols()),
                Arc::new(UuidIdGenerator::new()),
                SymbolPolicy::unrestricted(),
            )
        }

        fn engine_with_failing_ledger(&self) -> TradingEngine {
            TradingEngine::new(
                Arc::clone(&self.accounts) as Arc<dyn AccountStore>,
                Arc::clone(&self.portfolios) as Arc<dyn PortfolioStore>,
                Arc::new(FailingTransactionStore),
                Arc::new(FixedPriceOracle::with_default_symbols()),
                Arc::new(UuidIdGenerator::new()),
                SymbolPolicy::unrestricted(),
            )
        }

        fn balance(&self) -> Decimal {
            self.accounts.get("acct-1").unwrap().unwrap().balance()
        }

        fn holding(&self, symbol: &str) -> Option<Holding> {
            self.portfolios
                .get("p-1")
                .unwrap()
                .unwrap()
                .holding(symbol)
                .unwrap()
        }
    }

    #[test]
    fn buy_at_market_price_moves_cash_and_credits_holding() {
        let fixture = Fixture::new(dec!(1000.00));
        let engine = fixture.engine();

        let entry = engine
            .buy("acct-1", "p-1", "AAPL", dec!(2), OrderPrice::Market)
            .unwrap();

        assert_eq!(entry.kind(), TransactionKind::Buy);
        assert_eq!(entry.amount(), dec!(300.00));
        assert_eq!(entry.price(), Some(dec!(150.00)));
        assert_eq!(fixture.balance(), dec!(700.00));

        let holding = fixture.holding("AAPL").unwrap();
        assert_eq!(holding.quantity(), dec!(2.00000000));
        assert_eq!(holding.average_cost(), dec!(150.00));

        let ledger = fixture.transactions.list_for_account("acct-1").unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].metadata().unwrap()["symbol"], "AAPL");
    }

    #[test]
    fn buy_normalizes_symbol_case() {
        let fixture = Fixture::new(dec!(1000.00));
        let engine = fixture.engine();
        engine
            .buy("acct-1", "p-1", " aapl ", dec!(1), OrderPrice::Market)
            .unwrap();
        assert!(fixture.holding("AAPL").is_some());
    }

    #[test]
    fn buy_with_limit_price_skips_the_oracle() {
        let fixture = Fixture::new(dec!(1000.00));
        let engine = fixture.engine();
        let entry = engine
            .buy(
                "acct-1",
                "p-1",
                "UNLISTED",
                dec!(4),
                OrderPrice::Limit(dec!(25.00)),
            )
            .unwrap();
        assert_eq!(entry.amount(), dec!(100.00));
        assert_eq!(fixture.balance(), dec!(900.00));
    }

    #[test]
    fn buy_with_insufficient_funds_changes_nothing() {
        let fixture = Fixture::new(dec!(10.00));
        let engine = fixture.engine();

        let err = engine
            .buy("acct-1", "p-1", "AAPL", dec!(1), OrderPrice::Market)
            .unwrap_err();
        assert!(matches!(err, LedgerSimError::InsufficientFunds { .. }));

        assert_eq!(fixture.balance(), dec!(10.00));
        assert!(fixture.holding("AAPL").is_none());
        assert!(fixture.transactions.list().unwrap().is_empty());
    }

    #[test]
    fn buy_unknown_market_symbol_fails_before_any_mutation() {
        let fixture = Fixture::new(dec!(1000.00));
        let engine = fixture.engine();
        let err = engine
            .buy("acct-1", "p-1", "ZZZZ", dec!(1), OrderPrice::Market)
            .unwrap_err();
        assert!(matches!(err, LedgerSimError::Trading { .. }));
        assert_eq!(fixture.balance(), dec!(1000.00));
    }

    #[test]
    fn buy_rejected_by_symbol_policy() {
        let fixture = Fixture::new(dec!(1000.00));
        let engine = TradingEngine::new(
            Arc::clone(&fixture.accounts) as Arc<dyn AccountStore>,
            Arc::clone(&fixture.portfolios) as Arc<dyn PortfolioStore>,
            Arc::clone(&fixture.transactions) as Arc<dyn TransactionStore>,
            Arc::new(FixedPriceOracle::with_default_symbols()),
            Arc::new(UuidIdGenerator::new()),
            SymbolPolicy::restricted(["TSLA"]),
        );
        assert!(matches!(
            engine.buy("acct-1", "p-1", "AAPL", dec!(1), OrderPrice::Market),
            Err(LedgerSimError::UnsupportedSymbol { .. })
        ));
    }

    #[test]
    fn buy_into_missing_portfolio_refunds_the_withdrawal() {
        let fixture = Fixture::new(dec!(500.00));
        let engine = fixture.engine();

        let err = engine
            .buy("acct-1", "missing-p", "AAPL", dec!(1), OrderPrice::Market)
            .unwrap_err();
        assert!(matches!(err, LedgerSimError::PortfolioNotFound { .. }));
        assert_eq!(fixture.balance(), dec!(500.00));
    }

    #[test]
    fn buy_ledger_append_failure_restores_cash_and_holding() {
        let fixture = Fixture::new(dec!(1000.00));
        let engine = fixture.engine_with_failing_ledger();

        let err = engine
            .buy("acct-1", "p-1", "AAPL", dec!(2), OrderPrice::Market)
            .unwrap_err();
        assert!(matches!(err, LedgerSimError::Trading { .. }));

        // compensating sell removed the holding, refund restored the cash
        assert_eq!(fixture.balance(), dec!(1000.00));
        assert!(fixture.holding("AAPL").is_none());
    }

    #[test]
    fn sell_realizes_pnl_and_credits_proceeds() {
        let fixture = Fixture::new(dec!(1000.00));
        let engine = fixture.engine();
        engine
            .buy(
                "acct-1",
                "p-1",
                "AAPL",
                dec!(5),
                OrderPrice::Limit(dec!(10.00)),
            )
            .unwrap();

        let entry = engine
            .sell(
                "acct-1",
                "p-1",
                "AAPL",
                dec!(2),
                OrderPrice::Limit(dec!(12.35)),
            )
            .unwrap();

        assert_eq!(entry.kind(), TransactionKind::Sell);
        assert_eq!(entry.amount(), dec!(24.70));
        assert_eq!(entry.profit_loss(), Some(dec!(4.70)));
        // 1000 - 50 + 24.70
        assert_eq!(fixture.balance(), dec!(974.70));
        assert_eq!(
            fixture.holding("AAPL").unwrap().quantity(),
            dec!(3.00000000)
        );
    }

    #[test]
    fn sell_everything_removes_the_holding() {
        let fixture = Fixture::new(dec!(1000.00));
        let engine = fixture.engine();
        engine
            .buy(
                "acct-1",
                "p-1",
                "AAPL",
                dec!(2),
                OrderPrice::Limit(dec!(10.00)),
            )
            .unwrap();
        engine
            .sell(
                "acct-1",
                "p-1",
                "AAPL",
                dec!(2),
                OrderPrice::Limit(dec!(11.00)),
            )
            .unwrap();
        assert!(fixture.holding("AAPL").is_none());
    }

    #[test]
    fn sell_without_holding_is_insufficient() {
        let fixture = Fixture::new(dec!(1000.00));
        let engine = fixture.engine();
        let err = engine
            .sell("acct-1", "p-1", "AAPL", dec!(1), OrderPrice::Market)
            .unwrap_err();
        match err {
            LedgerSimError::InsufficientHoldings { available, .. } => {
                assert_eq!(available, Decimal::ZERO);
            }
            other => panic!("expected InsufficientHoldings, got {other:?}"),
        }
    }

    #[test]
    fn sell_more_than_held_changes_nothing() {
        let fixture = Fixture::new(dec!(1000.00));
        let engine = fixture.engine();
        engine
            .buy(
                "acct-1",
                "p-1",
                "AAPL",
                dec!(1),
                OrderPrice::Limit(dec!(10.00)),
            )
            .unwrap();
        let balance_before = fixture.balance();

        assert!(matches!(
            engine.sell("acct-1", "p-1", "AAPL", dec!(2), OrderPrice::Market),
            Err(LedgerSimError::InsufficientHoldings { .. })
        ));
        assert_eq!(fixture.balance(), balance_before);
        assert_eq!(
            fixture.holding("AAPL").unwrap().quantity(),
            dec!(1.00000000)
        );
    }

    #[test]
    fn sell_from_missing_portfolio_fails() {
        let fixture = Fixture::new(dec!(1000.00));
        let engine = fixture.engine();
        assert!(matches!(
            engine.sell("acct-1", "missing-p", "AAPL", dec!(1), OrderPrice::Market),
            Err(LedgerSimError::PortfolioNotFound { .. })
        ));
    }

    #[test]
    fn sell_ledger_append_failure_claws_back_and_buys_back() {
        let fixture = Fixture::new(dec!(1000.00));
        fixture.engine().buy(
            "acct-1",
            "p-1",
            "AAPL",
            dec!(3),
            OrderPrice::Limit(dec!(10.00)),
        )
        .unwrap();
        let balance_before = fixture.balance();

        let err = fixture
            .engine_with_failing_ledger()
            .sell(
                "acct-1",
                "p-1",
                "AAPL",
                dec!(2),
                OrderPrice::Limit(dec!(12.00)),
            )
            .unwrap_err();
        assert!(matches!(err, LedgerSimError::Trading { .. }));

        assert_eq!(fixture.balance(), balance_before);
        assert_eq!(
            fixture.holding("AAPL").unwrap().quantity(),
            dec!(3.00000000)
        );
    }

    #[test]
    fn deposit_records_a_ledger_entry() {
        let fixture = Fixture::new(dec!(0.00));
        let engine = fixture.engine();
        let entry = engine.deposit("acct-1", dec!(100.00)).unwrap();
        assert_eq!(entry.kind(), TransactionKind::Deposit);
        assert_eq!(fixture.balance(), dec!(100.00));
        assert_eq!(fixture.transactions.list().unwrap().len(), 1);
    }

    #[test]
    fn withdraw_records_a_ledger_entry() {
        let fixture = Fixture::new(dec!(100.00));
        let engine = fixture.engine();
        let entry = engine.withdraw("acct-1", dec!(40.00)).unwrap();
        assert_eq!(entry.kind(), TransactionKind::Withdrawal);
        assert_eq!(fixture.balance(), dec!(60.00));
    }

    #[test]
    fn deposit_ledger_failure_claws_the_cash_back() {
        let fixture = Fixture::new(dec!(0.00));
        let engine = fixture.engine_with_failing_ledger();
        assert!(matches!(
            engine.deposit("acct-1", dec!(100.00)),
            Err(LedgerSimError::Trading { .. })
        ));
        assert_eq!(fixture.balance(), dec!(0.00));
    }

    #[test]
    fn withdraw_ledger_failure_refunds() {
        let fixture = Fixture::new(dec!(100.00));
        let engine = fixture.engine_with_failing_ledger();
        assert!(matches!(
            engine.withdraw("acct-1", dec!(40.00)),
            Err(LedgerSimError::Trading { .. })
        ));
        assert_eq!(fixture.balance(), dec!(100.00));
    }

    #[test]
    fn transactions_for_account_lists_in_order() {
        let fixture = Fixture::new(dec!(1000.00));
        let engine = fixture.engine();
        engine.deposit("acct-1", dec!(50.00)).unwrap();
        engine
            .buy(
                "acct-1",
                "p-1",
                "AAPL",
                dec!(1),
                OrderPrice::Limit(dec!(10.00)),
            )
            .unwrap();
        let entries = engine.transactions_for_account("acct-1").unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].kind(), TransactionKind::Deposit);
        assert_eq!(entries[1].kind(), TransactionKind::Buy);
    }

    #[test]
    fn portfolio_holdings_returns_snapshots() {
        let fixture = Fixture::new(dec!(1000.00));
        let engine = fixture.engine();
        engine
            .buy(
                "acct-1",
                "p-1",
                "AAPL",
                dec!(1),
                OrderPrice::Limit(dec!(10.00)),
            )
            .unwrap();
        let holdings = engine.portfolio_holdings("p-1").unwrap();
        assert_eq!(holdings.len(), 1);
        assert_eq!(holdings[0].symbol(), "AAPL");
    }
}
