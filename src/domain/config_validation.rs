//! Simulation configuration validation.
//!
//! Validates all config fields before a simulation session runs.

use rust_decimal::Decimal;

use crate::domain::error::LedgerSimError;
use crate::domain::numeric::parse_money;
use crate::domain::session::parse_orders;
use crate::ports::config_port::ConfigPort;

pub fn validate_simulation_config(config: &dyn ConfigPort) -> Result<(), LedgerSimError> {
    validate_owner(config)?;
    validate_initial_deposit(config)?;
    validate_price_table(config)?;
    validate_session_orders(config)?;
    Ok(())
}

fn validate_owner(config: &dyn ConfigPort) -> Result<(), LedgerSimError> {
    match config.get_string("account", "owner") {
        Some(owner) if !owner.trim().is_empty() => Ok(()),
        Some(_) => Err(LedgerSimError::ConfigInvalid {
            section: "account".to_string(),
            key: "owner".to_string(),
            reason: "owner must not be empty".to_string(),
        }),
        None => Err(LedgerSimError::ConfigMissing {
            section: "account".to_string(),
            key: "owner".to_string(),
        }),
    }
}

fn validate_initial_deposit(config: &dyn ConfigPort) -> Result<(), LedgerSimError> {
    let Some(raw) = config.get_string("account", "initial_deposit") else {
        // optional, defaults to zero
        return Ok(());
    };
    let amount = parse_money(&raw).map_err(|_| LedgerSimError::ConfigInvalid {
        section: "account".to_string(),
        key: "initial_deposit".to_string(),
        reason: format!("not a monetary amount: {raw:?}"),
    })?;
    if amount < Decimal::ZERO {
        return Err(LedgerSimError::ConfigInvalid {
            section: "account".to_string(),
            key: "initial_deposit".to_string(),
            reason: "initial_deposit must be non-negative".to_string(),
        });
    }
    Ok(())
}

fn validate_price_table(config: &dyn ConfigPort) -> Result<(), LedgerSimError> {
    let symbols = config.section_keys("prices");
    if symbols.is_empty() {
        return Err(LedgerSimError::ConfigInvalid {
            section: "prices".to_string(),
            key: "symbols".to_string(),
            reason: "at least one `SYMBOL = price` entry is required".to_string(),
        });
    }
    for symbol in symbols {
        let raw = config
            .get_string("prices", &symbol)
            .unwrap_or_default();
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
    }
    Ok(())
}

fn validate_session_orders(config: &dyn ConfigPort) -> Result<(), LedgerSimError> {
    if let Some(raw) = config.get_string("session", "orders") {
        parse_orders(&raw)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn config_from(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    const VALID: &str = "\
[account]
owner = alice
initial_deposit = 1000.00

[prices]
AAPL = 150.00

[session]
orders = deposit 10.00, buy AAPL 1
";

    #[test]
    fn valid_config_passes() {
        let config = config_from(VALID);
        assert!(validate_simulation_config(&config).is_ok());
    }

    #[test]
    fn missing_owner_fails() {
        let config = config_from("[account]\n[prices]\nAAPL = 1.00\n");
        assert!(matches!(
            validate_simulation_config(&config),
            Err(LedgerSimError::ConfigMissing { .. })
        ));
    }

    #[test]
    fn negative_initial_deposit_fails() {
        let config =
            config_from("[account]\nowner = alice\ninitial_deposit = -5\n[prices]\nAAPL = 1.00\n");
        assert!(matches!(
            validate_simulation_config(&config),
            Err(LedgerSimError::ConfigInvalid { .. })
        ));
    }

    #[test]
    fn missing_initial_deposit_defaults_to_zero() {
        let config = config_from("[account]\nowner = alice\n[prices]\nAAPL = 1.00\n");
        assert!(validate_simulation_config(&config).is_ok());
    }

    #[test]
    fn empty_price_table_fails() {
        let config = config_from("[account]\nowner = alice\n");
        assert!(matches!(
            validate_simulation_config(&config),
            Err(LedgerSimError::ConfigInvalid { .. })
        ));
    }

    #[test]
    fn non_positive_price_fails() {
        let config = config_from("[account]\nowner = alice\n[prices]\nAAPL = 0\n");
        assert!(matches!(
            validate_simulation_config(&config),
            Err(LedgerSimError::ConfigInvalid { .. })
        ));
    }

    #[test]
    fn malformed_orders_fail() {
        let config = config_from(
            "[account]\nowner = alice\n[prices]\nAAPL = 1.00\n[session]\norders = lend AAPL 5\n",
        );
        assert!(matches!(
            validate_simulation_config(&config),
            Err(LedgerSimError::ConfigInvalid { .. })
        ));
    }
}
