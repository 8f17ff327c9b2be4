//! Symbol validation policy.

use std::collections::HashSet;

use crate::domain::error::LedgerSimError;

/// Validates and normalizes instrument symbols, optionally against a
/// restricted set.
///
/// Normalization is trim + uppercase; lookups are case-insensitive. With no
/// restriction set, any non-empty symbol passes.
#[derive(Debug, Clone, Default)]
pub struct SymbolPolicy {
    supported: Option<HashSet<String>>,
}

impl SymbolPolicy {
    /// Accept any non-empty symbol.
    pub fn unrestricted() -> Self {
        Self { supported: None }
    }

    /// Accept only the given symbols (case-insensitive).
    pub fn restricted<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            supported: Some(
                symbols
                    .into_iter()
                    .map(|s| s.as_ref().trim().to_uppercase())
                    .filter(|s| !s.is_empty())
                    .collect(),
            ),
        }
    }

    /// True when the symbol would pass [`SymbolPolicy::validate`].
    pub fn is_supported(&self, symbol: &str) -> bool {
        self.validate(symbol).is_ok()
    }

    /// Validate a symbol, returning its normalized (uppercased) form.
    pub fn validate(&self, symbol: &str) -> Result<String, LedgerSimError> {
        let normalized = symbol.trim().to_uppercase();
        if normalized.is_empty() {
            return Err(LedgerSimError::UnsupportedSymbol {
                symbol: symbol.to_string(),
            });
        }
        if let Some(supported) = &self.supported
            && !supported.contains(&normalized)
        {
            return Err(LedgerSimError::UnsupportedSymbol {
                symbol: symbol.to_string(),
            });
        }
        Ok(normalized)
    }

    /// The restriction set, or `None` when unrestricted.
    pub fn supported_symbols(&self) -> Option<Vec<String>> {
        self.supported.as_ref().map(|set| {
            let mut symbols: Vec<String> = set.iter().cloned().collect();
            symbols.sort();
            symbols
        })
    }
}
