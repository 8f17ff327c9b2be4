//! Account lifecycle management over an account store.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::warn;

use crate::domain::account::CashAccount;
use crate::domain::error::LedgerSimError;
use crate::ports::id_port::IdGenerator;
use crate::ports::store_port::AccountStore;

/// Opens, looks up, and closes cash accounts, and moves cash between them.
///
/// Collaborators are injected at construction; there are no hidden default
/// stores.
pub struct AccountService {
    accounts: Arc<dyn AccountStore>,
    ids: Arc<dyn IdGenerator>,
}

impl AccountService {
    pub fn new(accounts: Arc<dyn AccountStore>, ids: Arc<dyn IdGenerator>) -> Self {
        Self { accounts, ids }
    }

    /// Open an account with an initial deposit (which may be zero).
    ///
    /// An explicit id must not collide with an existing account; with no id
    /// given, one is generated.
    pub fn open_account(
        &self,
        owner: &str,
        initial_deposit: Decimal,
        currency: &str,
        account_id: Option<&str>,
    ) -> Result<Arc<CashAccount>, LedgerSimError> {
        let account_id = match account_id {
            Some(id) => {
                if self.accounts.exists(id)? {
                    return Err(LedgerSimError::AccountAlreadyExists {
                        account_id: id.to_string(),
                    });
                }
                id.to_string()
            }
            None => self.ids.account_id(),
        };
        let account = Arc::new(CashAccount::new(
            &account_id,
            owner,
            initial_deposit,
            currency,
        )?);
        self.accounts.save(Arc::clone(&account))?;
        Ok(account)
    }

    pub fn account(&self, account_id: &str) -> Result<Arc<CashAccount>, LedgerSimError> {
        self.accounts
            .get(account_id)?
            .ok_or_else(|| LedgerSimError::AccountNotFound {
                account_id: account_id.to_string(),
            })
    }

    pub fn list_accounts(&self) -> Result<Vec<Arc<CashAccount>>, LedgerSimError> {
        self.accounts.list()
    }

    pub fn close_account(&self, account_id: &str) -> Result<(), LedgerSimError> {
        self.accounts.delete(account_id)
    }

    /// Deposit into an account and persist it. Returns the new balance.
    pub fn deposit(&self, account_id: &str, amount: Decimal) -> Result<Decimal, LedgerSimError> {
        let account = self.account(account_id)?;
        let balance = account.deposit(amount)?;
        self.accounts.save(account)?;
        Ok(balance)
    }

    /// Withdraw from an account and persist it. Returns the new balance.
    pub fn withdraw(&self, account_id: &str, amount: Decimal) -> Result<Decimal, LedgerSimError> {
        let account = self.account(account_id)?;
        let balance = account.withdraw(amount)?;
        self.accounts.save(account)?;
        Ok(balance)
    }

    /// Move cash between two accounts. Returns the new (source, destination)
    /// balances.
    ///
    /// The debit happens first; if the credit side then fails, the debit is
    /// compensated by re-depositing into the source. A failed compensation
    /// surfaces as `Inconsistent`.
    pub fn transfer(
        &self,
        from_account_id: &str,
        to_account_id: &str,
        amount: Decimal,
    ) -> Result<(Decimal, Decimal), LedgerSimError> {
        let from = self.account(from_account_id)?;
        let to = self.account(to_account_id)?;

        let from_balance = from.withdraw(amount)?;
        let to_balance = match to.deposit(amount).and_then(|balance| {
            self.accounts.save(Arc::clone(&to))?;
            Ok(balance)
        }) {
            Ok(balance) => balance,
            Err(cause) => {
                warn!(
                    from = from_account_id,
                    to = to_account_id,
                    %amount,
                    "transfer credit failed, compensating debit"
                );
                return Err(match from.deposit(amount) {
                    Ok(_) => cause,
                    Err(compensation) => LedgerSimError::Inconsistent {
                        operation: "transfer".into(),
                        cause: cause.to_string(),
                        compensation: compensation.to_string(),
                    },
                });
            }
        };
        self.accounts.save(from)?;
        Ok((from_balance, to_balance))
    }
}
