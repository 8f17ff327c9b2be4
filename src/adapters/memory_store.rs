//! Thread-safe in-memory store adapters.
//!
//! Map-backed implementations of the storage ports, one lock per store.
//! Meant for tests and single-process simulation runs; anything durable
//! lives behind the same port traits elsewhere.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::account::CashAccount;
use crate::domain::error::LedgerSimError;
use crate::domain::portfolio::Portfolio;
use crate::domain::transaction::Transaction;
use crate::ports::store_port::{AccountStore, PortfolioStore, TransactionStore};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// In-memory [`AccountStore`].
#[derive(Default)]
pub struct InMemoryAccountStore {
    accounts: Mutex<HashMap<String, Arc<CashAccount>>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AccountStore for InMemoryAccountStore {
    fn save(&self, account: Arc<CashAccount>) -> Result<(), LedgerSimError> {
        lock(&self.accounts).insert(account.account_id().to_string(), account);
        Ok(())
    }

    fn get(&self, account_id: &str) -> Result<Option<Arc<CashAccount>>, LedgerSimError> {
        Ok(lock(&self.accounts).get(account_id).cloned())
    }

    fn delete(&self, account_id: &str) -> Result<(), LedgerSimError> {
        match lock(&self.accounts).remove(account_id) {
            Some(_) => Ok(()),
            None => Err(LedgerSimError::AccountNotFound {
                account_id: account_id.to_string(),
            }),
        }
    }

    fn list(&self) -> Result<Vec<Arc<CashAccount>>, LedgerSimError> {
        Ok(lock(&self.accounts).values().cloned().collect())
    }

    fn exists(&self, account_id: &str) -> Result<bool, LedgerSimError> {
        Ok(lock(&self.accounts).contains_key(account_id))
    }
}

/// In-memory [`PortfolioStore`].
#[derive(Default)]
pub struct InMemoryPortfolioStore {
    portfolios: Mutex<HashMap<String, Arc<Portfolio>>>,
}

impl InMemoryPortfolioStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PortfolioStore for InMemoryPortfolioStore {
    fn save(&self, portfolio: Arc<Portfolio>) -> Result<(), LedgerSimError> {
        lock(&self.portfolios).insert(portfolio.portfolio_id().to_string(), portfolio);
        Ok(())
    }

    fn get(&self, portfolio_id: &str) -> Result<Option<Arc<Portfolio>>, LedgerSimError> {
        Ok(lock(&self.portfolios).get(portfolio_id).cloned())
    }

    fn delete(&self, portfolio_id: &str) -> Result<(), LedgerSimError> {
        match lock(&self.portfolios).remove(portfolio_id) {
            Some(_) => Ok(()),
            None => Err(LedgerSimError::PortfolioNotFound {
                portfolio_id: portfolio_id.to_string(),
            }),
        }
    }

    fn list(&self) -> Result<Vec<Arc<Portfolio>>, LedgerSimError> {
        Ok(lock(&self.portfolios).values().cloned().collect())
    }

    fn exists(&self, portfolio_id: &str) -> Result<bool, LedgerSimError> {
        Ok(lock(&self.portfolios).contains_key(portfolio_id))
    }

    fn list_by_owner(&self, owner: &str) -> Result<Vec<Arc<Portfolio>>, LedgerSimError> {
        Ok(lock(&self.portfolios)
            .values()
            .filter(|p| p.owner() == owner)
            .cloned()
            .collect())
    }
}

/// In-memory [`TransactionStore`] preserving insertion order.
#[derive(Default)]
pub struct InMemoryTransactionStore {
    entries: Mutex<Vec<Transaction>>,
}

impl InMemoryTransactionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TransactionStore for InMemoryTransactionStore {
    fn save(&self, entry: Transaction) -> Result<(), LedgerSimError> {
        let mut entries = lock(&self.entries);
        match entries
            .iter()
            .position(|e| e.transaction_id() == entry.transaction_id())
        {
            Some(index) => entries[index] = entry,
            None => entries.push(entry),
        }
        Ok(())
    }

    fn get(&self, transaction_id: &str) -> Result<Option<Transaction>, LedgerSimError> {
        Ok(lock(&self.entries)
            .iter()
            .find(|e| e.transaction_id() == transaction_id)
            .cloned())
    }

    fn delete(&self, transaction_id: &str) -> Result<(), LedgerSimError> {
        let mut entries = lock(&self.entries);
        match entries
            .iter()
            .position(|e| e.transaction_id() == transaction_id)
        {
            Some(index) => {
                entries.remove(index);
                Ok(())
            }
            None => Err(LedgerSimError::TransactionNotFound {
                transaction_id: transaction_id.to_string(),
            }),
        }
    }

    fn list(&self) -> Result<Vec<Transaction>, LedgerSimError> {
        Ok(lock(&self.entries).clone())
    }

    fn exists(&self, transaction_id: &str) -> Result<bool, LedgerSimError> {
        Ok(lock(&self.entries)
            .iter()
            .any(|e| e.transaction_id() == transaction_id))
    }

    fn list_for_account(&self, account_id: &str) -> Result<Vec<Transaction>, LedgerSimError> {
        Ok(lock(&self.entries)
            .iter()
            .filter(|e| e.account_id() == account_id)
            .cloned()
            .collect())
    }
}
