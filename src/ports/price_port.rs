//! Price oracle port trait.

use rust_decimal::Decimal;

use crate::domain::error::LedgerSimError;

/// Stateless price source.
///
/// Symbol lookup is case-insensitive; unknown symbols fail with
/// `UnsupportedSymbol`. Returned prices are quantized to cents.
pub trait PriceOracle: Send + Sync {
    fn quote(&self, symbol: &str) -> Result<Decimal, LedgerSimError>;

    fn is_supported(&self, symbol: &str) -> bool;
}
