//! Domain error types.

use rust_decimal::Decimal;

/// Top-level error type for ledgersim.
///
/// Variants fall into five groups with distinct recovery semantics:
/// validation errors (raised before any mutation), insufficiency errors
/// (validated against live state, still no mutation), not-found errors,
/// configuration errors, and orchestration errors (`Trading`,
/// `Inconsistent`) which may leave visible side effects.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LedgerSimError {
    #[error("invalid amount: {reason}")]
    InvalidAmount { reason: String },

    #[error("invalid quantity: {reason}")]
    InvalidQuantity { reason: String },

    #[error("invalid price: {reason}")]
    InvalidPrice { reason: String },

    #[error("invalid or unsupported symbol: {symbol:?}")]
    UnsupportedSymbol { symbol: String },

    #[error("invalid transaction: {reason}")]
    InvalidTransaction { reason: String },

    #[error("invalid identifier: {reason}")]
    InvalidIdentifier { reason: String },

    #[error("insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds {
        requested: Decimal,
        available: Decimal,
    },

    #[error("insufficient holdings: requested {requested}, available {available}")]
    InsufficientHoldings {
        requested: Decimal,
        available: Decimal,
    },

    #[error("account not found: {account_id}")]
    AccountNotFound { account_id: String },

    #[error("account already exists: {account_id}")]
    AccountAlreadyExists { account_id: String },

    #[error("portfolio not found: {portfolio_id}")]
    PortfolioNotFound { portfolio_id: String },

    #[error("no holding for symbol: {symbol}")]
    HoldingNotFound { symbol: String },

    #[error("transaction not found: {transaction_id}")]
    TransactionNotFound { transaction_id: String },

    #[error("valuation failed: {reason}")]
    Valuation { reason: String },

    #[error("trading failed: {reason}")]
    Trading { reason: String },

    /// A downstream step failed after an upstream step already committed and
    /// the compensating rollback failed too. Both failures are preserved;
    /// callers must treat this as non-recoverable.
    #[error("{operation} failed: {cause}; compensation also failed: {compensation}; state may be inconsistent")]
    Inconsistent {
        operation: String,
        cause: String,
        compensation: String,
    },

    #[error("storage error: {reason}")]
    Storage { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },
}

impl From<&LedgerSimError> for std::process::ExitCode {
    fn from(err: &LedgerSimError) -> Self {
        let code: u8 = match err {
            LedgerSimError::ConfigParse { .. }
            | LedgerSimError::ConfigMissing { .. }
            | LedgerSimError::ConfigInvalid { .. } => 2,
            LedgerSimError::InvalidAmount { .. }
            | LedgerSimError::InvalidQuantity { .. }
            | LedgerSimError::InvalidPrice { .. }
            | LedgerSimError::UnsupportedSymbol { .. }
            | LedgerSimError::InvalidTransaction { .. }
            | LedgerSimError::InvalidIdentifier { .. } => 3,
            LedgerSimError::InsufficientFunds { .. }
            | LedgerSimError::InsufficientHoldings { .. } => 4,
            LedgerSimError::AccountNotFound { .. }
            | LedgerSimError::AccountAlreadyExists { .. }
            | LedgerSimError::PortfolioNotFound { .. }
            | LedgerSimError::HoldingNotFound { .. }
            | LedgerSimError::TransactionNotFound { .. } => 5,
            LedgerSimError::Storage { .. } => 6,
            LedgerSimError::Valuation { .. } | LedgerSimError::Trading { .. } => 7,
            LedgerSimError::Inconsistent { .. } => 8,
        };
        std::process::ExitCode::from(code)
    }
}
