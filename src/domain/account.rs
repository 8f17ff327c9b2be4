//! Cash account with a lock-guarded, never-negative balance.

use std::sync::Mutex;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::error::LedgerSimError;
use crate::domain::numeric::to_money;

/// A user account holding a cash balance in a single currency.
///
/// The balance is guarded by a per-account lock; `deposit` and `withdraw`
/// hold it for the full validate+mutate sequence, so no partial state is
/// ever observable. Reads return value copies, never aliases into the
/// guarded state.
#[derive(Debug)]
pub struct CashAccount {
    account_id: String,
    owner: String,
    currency: String,
    balance: Mutex<Decimal>,
}

/// Serializable read model of an account at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountSnapshot {
    pub account_id: String,
    pub owner: String,
    pub balance: Decimal,
    pub currency: String,
}

impl CashAccount {
    /// Create an account with an initial balance.
    ///
    /// The balance is quantized to cents and must be non-negative; owner and
    /// account id must be non-empty.
    pub fn new(
        account_id: &str,
        owner: &str,
        initial_balance: Decimal,
        currency: &str,
    ) -> Result<Self, LedgerSimError> {
        if account_id.trim().is_empty() {
            return Err(LedgerSimError::InvalidIdentifier {
                reason: "account_id must be a non-empty string".into(),
            });
        }
        if owner.trim().is_empty() {
            return Err(LedgerSimError::InvalidIdentifier {
                reason: "owner must be a non-empty string".into(),
            });
        }
        let balance = to_money(initial_balance);
        if balance < Decimal::ZERO {
            return Err(LedgerSimError::InvalidAmount {
                reason: format!("initial balance cannot be negative: {initial_balance}"),
            });
        }
        Ok(Self {
            account_id: account_id.to_string(),
            owner: owner.to_string(),
            currency: currency.to_string(),
            balance: Mutex::new(balance),
        })
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Current balance, already quantized to cents. Returns a copy.
    pub fn balance(&self) -> Decimal {
        *self.lock_balance()
    }

    /// Deposit a positive amount. Returns the new balance.
    pub fn deposit(&self, amount: Decimal) -> Result<Decimal, LedgerSimError> {
        let amount = to_money(amount);
        if amount <= Decimal::ZERO {
            return Err(LedgerSimError::InvalidAmount {
                reason: format!("deposit amount must be positive: {amount}"),
            });
        }
        let mut balance = self.lock_balance();
        *balance = to_money(*balance + amount);
        Ok(*balance)
    }

    /// Withdraw a positive amount, failing with `InsufficientFunds` when the
    /// requested amount exceeds the available balance. Returns the new
    /// balance.
    pub fn withdraw(&self, amount: Decimal) -> Result<Decimal, LedgerSimError> {
        let amount = to_money(amount);
        if amount <= Decimal::ZERO {
            return Err(LedgerSimError::InvalidAmount {
                reason: format!("withdrawal amount must be positive: {amount}"),
            });
        }
        let mut balance = self.lock_balance();
        if amount > *balance {
            return Err(LedgerSimError::InsufficientFunds {
                requested: amount,
                available: *balance,
            });
        }
        *balance = to_money(*balance - amount);
        Ok(*balance)
    }

    /// Point-in-time read model for serialization and reporting.
    pub fn snapshot(&self) -> AccountSnapshot {
        AccountSnapshot {
            account_id: self.account_id.clone(),
            owner: self.owner.clone(),
            balance: self.balance(),
            currency: self.currency.clone(),
        }
    }

    fn lock_balance(&self) -> std::sync::MutexGuard<'_, Decimal> {
        // Mutations are validate-then-assign on a single Decimal, so a
        // poisoned lock cannot hold a torn value; recover the guard.
        self.balance.lock().unwrap_or_else(|e| e.into_inner())
    }
}
