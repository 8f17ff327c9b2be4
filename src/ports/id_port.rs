//! Identifier generation port trait.

/// Supplies unique string ids when the caller does not provide one
/// explicitly. The engine only requires global uniqueness, not a specific
/// format.
pub trait IdGenerator: Send + Sync {
    fn account_id(&self) -> String;

    fn portfolio_id(&self) -> String;

    fn transaction_id(&self) -> String;
}
