//! UUID-backed identifier generation adapter.

use uuid::Uuid;

use crate::ports::id_port::IdGenerator;

/// Generates prefixed, UUID4-based identifiers (`acct-…`, `port-…`,
/// `txn-…`). Uniqueness comes from the UUID; the prefixes are for human
/// readability only.
pub struct UuidIdGenerator {
    account_prefix: String,
    portfolio_prefix: String,
    transaction_prefix: String,
}

impl UuidIdGenerator {
    pub fn new() -> Self {
        Self::with_prefixes("acct", "port", "txn")
    }

    pub fn with_prefixes(account: &str, portfolio: &str, transaction: &str) -> Self {
        Self {
            account_prefix: account.to_string(),
            portfolio_prefix: portfolio.to_string(),
            transaction_prefix: transaction.to_string(),
        }
    }

    fn generate(prefix: &str) -> String {
        format!("{prefix}-{}", Uuid::new_v4().simple())
    }
}

impl Default for UuidIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for UuidIdGenerator {
    fn account_id(&self) -> String {
        Self::generate(&self.account_prefix)
    }

    fn portfolio_id(&self) -> String {
        Self::generate(&self.portfolio_prefix)
    }

    fn transaction_id(&self) -> String {
        Self::generate(&self.transaction_prefix)
    }
}
