//! Storage port traits.
//!
//! The engine only relies on these contracts and their failure semantics:
//! `get` returns `Ok(None)` for an absent id, `delete` fails with the
//! matching not-found error, `save` overwrites. How they are implemented
//! (memory, disk, network) is an adapter concern.

use std::sync::Arc;

use crate::domain::account::CashAccount;
use crate::domain::error::LedgerSimError;
use crate::domain::portfolio::Portfolio;
use crate::domain::transaction::Transaction;

/// Store for cash accounts. Accounts are shared aggregates, so the store
/// traffics in `Arc` handles.
pub trait AccountStore: Send + Sync {
    fn save(&self, account: Arc<CashAccount>) -> Result<(), LedgerSimError>;

    fn get(&self, account_id: &str) -> Result<Option<Arc<CashAccount>>, LedgerSimError>;

    /// Fails with `AccountNotFound` when the id is absent.
    fn delete(&self, account_id: &str) -> Result<(), LedgerSimError>;

    fn list(&self) -> Result<Vec<Arc<CashAccount>>, LedgerSimError>;

    fn exists(&self, account_id: &str) -> Result<bool, LedgerSimError>;
}

/// Store for portfolios.
pub trait PortfolioStore: Send + Sync {
    fn save(&self, portfolio: Arc<Portfolio>) -> Result<(), LedgerSimError>;

    fn get(&self, portfolio_id: &str) -> Result<Option<Arc<Portfolio>>, LedgerSimError>;

    /// Fails with `PortfolioNotFound` when the id is absent.
    fn delete(&self, portfolio_id: &str) -> Result<(), LedgerSimError>;

    fn list(&self) -> Result<Vec<Arc<Portfolio>>, LedgerSimError>;

    fn exists(&self, portfolio_id: &str) -> Result<bool, LedgerSimError>;

    fn list_by_owner(&self, owner: &str) -> Result<Vec<Arc<Portfolio>>, LedgerSimError>;
}

/// Append-oriented store for ledger entries. Entries are immutable values;
/// they are stored and listed by copy.
pub trait TransactionStore: Send + Sync {
    fn save(&self, entry: Transaction) -> Result<(), LedgerSimError>;

    fn get(&self, transaction_id: &str) -> Result<Option<Transaction>, LedgerSimError>;

    /// Fails with `TransactionNotFound` when the id is absent.
    fn delete(&self, transaction_id: &str) -> Result<(), LedgerSimError>;

    fn list(&self) -> Result<Vec<Transaction>, LedgerSimError>;

    fn exists(&self, transaction_id: &str) -> Result<bool, LedgerSimError>;

    /// Entries referencing the given account, in insertion order.
    fn list_for_account(&self, account_id: &str) -> Result<Vec<Transaction>, LedgerSimError>;
}
