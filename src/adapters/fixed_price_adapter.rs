//! Static price-table oracle adapter.

use std::collections::HashMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::domain::error::LedgerSimError;
use crate::domain::numeric::{parse_money, to_money};
use crate::ports::config_port::ConfigPort;
use crate::ports::price_port::PriceOracle;

/// Deterministic price provider backed by a fixed symbol→price table.
///
/// Lookups are case-insensitive; stored prices are quantized to cents.
pub struct FixedPriceOracle {
    prices: HashMap<String, Decimal>,
}

impl FixedPriceOracle {
    pub fn new<I, S>(prices: I) -> Self
    where
        I: IntoIterator<Item = (S, Decimal)>,
        S: AsRef<str>,
    {
        Self {
            prices: prices
                .into_iter()
                .map(|(symbol, price)| {
                    (symbol.as_ref().trim().to_uppercase(), to_money(price))
                })
                .collect(),
        }
    }

    /// The built-in demo symbol table.
    pub fn with_default_symbols() -> Self {
        Self::new([
            ("AAPL", dec!(150.00)),
            ("TSLA", dec!(720.50)),
            ("GOOGL", dec!(2800.75)),
        ])
    }

    /// Build the table from a `[prices]` config section.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, LedgerSimError> {
        let mut prices = HashMap::new();
        for symbol in config.section_keys("prices") {
            let raw = config.get_string("prices", &symbol).unwrap_or_default();
            let price = parse_money(&raw).map_err(|_| LedgerSimError::ConfigInvalid {
                section: "prices".to_string(),
                key: symbol.clone(),
                reason: format!("not a monetary amount: {raw:?}"),
            })?;
            if price <= Decimal::ZERO {
                return Err(LedgerSimError::ConfigInvalid {
                    section: "prices".to_string(),
                    key: symbol,
                    reason: "price must be positive".to_string(),
                });
            }
            prices.insert(symbol.to_uppercase(), price);
        }
        Ok(Self { prices })
    }

    /// Supported symbols, sorted.
    pub fn supported_symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.prices.keys().cloned().collect();
        symbols.sort();
        symbols
    }
}

impl PriceOracle for FixedPriceOracle {
    fn quote(&self, symbol: &str) -> Result<Decimal, LedgerSimError> {
        let normalized = symbol.trim().to_uppercase();
        if normalized.is_empty() {
            return Err(LedgerSimError::UnsupportedSymbol {
                symbol: symbol.to_string(),
            });
        }
        self.prices
            .get(&normalized)
            .copied()
            .ok_or_else(|| LedgerSimError::UnsupportedSymbol {
                symbol: symbol.to_string(),
            })
    }

    fn is_supported(&self, symbol: &str) -> bool {
        self.prices.contains_key(&symbol.trim().to_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    #[test]
    fn default_table_quotes_known_symbols() {
        let oracle = FixedPriceOracle::with_default_symbols();
        assert_eq!(oracle.quote("AAPL").unwrap(), dec!(150.00));
        assert_eq!(oracle.quote("TSLA").unwrap(), dec!(720.50));
        assert_eq!(oracle.quote("GOOGL").unwrap(), dec!(2800.75));
    }

    #[test]
    fn lookup_is_case_insensitive_and_trimmed() {
        let oracle = FixedPriceOracle::with_default_symbols();
        assert_eq!(oracle.quote(" aapl ").unwrap(), dec!(150.00));
        assert!(oracle.is_supported("tsla"));
    }

    #[test]
    fn unknown_symbol_fails() {
        let oracle = FixedPriceOracle::with_default_symbols();
        assert!(matches!(
            oracle.quote("ZZZZ"),
            Err(LedgerSimError::UnsupportedSymbol { .. })
        ));
        assert!(!oracle.is_supported("ZZZZ"));
    }

    #[test]
    fn empty_symbol_fails() {
        let oracle = FixedPriceOracle::with_default_symbols();
        assert!(matches!(
            oracle.quote("  "),
            Err(LedgerSimError::UnsupportedSymbol { .. })
        ));
    }

    #[test]
    fn prices_are_quantized_to_cents() {
        let oracle = FixedPriceOracle::new([("X", dec!(1.005))]);
        assert_eq!(oracle.quote("X").unwrap(), dec!(1.01));
    }

    #[test]
    fn from_config_reads_the_price_section() {
        let config = FileConfigAdapter::from_string(
            "[prices]\nAAPL = 150.00\nmsft = 99.995\n",
        )
        .unwrap();
        let oracle = FixedPriceOracle::from_config(&config).unwrap();
        assert_eq!(oracle.quote("AAPL").unwrap(), dec!(150.00));
        assert_eq!(oracle.quote("MSFT").unwrap(), dec!(100.00));
        assert_eq!(oracle.supported_symbols(), vec!["AAPL", "MSFT"]);
    }

    #[test]
    fn from_config_rejects_bad_prices() {
        let config = FileConfigAdapter::from_string("[prices]\nAAPL = cheap\n").unwrap();
        assert!(matches!(
            FixedPriceOracle::from_config(&config),
            Err(LedgerSimError::ConfigInvalid { .. })
        ));

        let config = FileConfigAdapter::from_string("[prices]\nAAPL = 0\n").unwrap();
        assert!(matches!(
            FixedPriceOracle::from_config(&config),
            Err(LedgerSimError::ConfigInvalid { .. })
        ));
    }
}
