//! CLI definition and dispatch.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::fixed_price_adapter::FixedPriceOracle;
use crate::adapters::memory_store::{
    InMemoryAccountStore, InMemoryPortfolioStore, InMemoryTransactionStore,
};
use crate::adapters::uuid_id_adapter::UuidIdGenerator;
use crate::domain::accounts_service::AccountService;
use crate::domain::config_validation::validate_simulation_config;
use crate::domain::error::LedgerSimError;
use crate::domain::portfolio::Portfolio;
use crate::domain::session::{SessionOrder, parse_orders};
use crate::domain::symbols::SymbolPolicy;
use crate::domain::trading::TradingEngine;
use crate::domain::valuation::ValuationEngine;
use crate::ports::config_port::ConfigPort;
use crate::ports::id_port::IdGenerator;
use crate::ports::price_port::PriceOracle;
use crate::ports::store_port::{AccountStore, PortfolioStore, TransactionStore};

#[derive(Parser, Debug)]
#[command(name = "ledgersim", about = "Single-node trading simulator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a scripted simulation session
    Simulate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Look up one price from the configured oracle
    Quote {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: String,
    },
    /// Validate a simulation configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Simulate { config } => run_simulate(&config),
        Command::Quote { config, symbol } => run_quote(&config, &symbol),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = LedgerSimError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn run_simulate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    if let Err(e) = validate_simulation_config(&config) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let owner = config.get_string("account", "owner").unwrap_or_default();
    let currency = config
        .get_string("account", "currency")
        .unwrap_or_else(|| "USD".to_string());
    let initial_deposit = config
        .get_decimal("account", "initial_deposit")
        .unwrap_or(Decimal::ZERO);
    let orders = match config.get_string("session", "orders") {
        Some(raw) => match parse_orders(&raw) {
            Ok(orders) => orders,
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        },
        None => Vec::new(),
    };

    let oracle = match FixedPriceOracle::from_config(&config) {
        Ok(oracle) => Arc::new(oracle),
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Wire the engine: in-memory stores, config-driven oracle, uuid ids.
    let accounts = Arc::new(InMemoryAccountStore::new());
    let portfolios = Arc::new(InMemoryPortfolioStore::new());
    let transactions = Arc::new(InMemoryTransactionStore::new());
    let ids = Arc::new(UuidIdGenerator::new());

    let service = AccountService::new(
        Arc::clone(&accounts) as Arc<dyn AccountStore>,
        Arc::clone(&ids) as Arc<dyn IdGenerator>,
    );
    let account = match service.open_account(&owner, initial_deposit, &currency, None) {
        Ok(account) => account,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let portfolio = match Portfolio::new(
        &ids.portfolio_id(),
        &owner,
        Some(account.account_id()),
        &currency,
    ) {
        Ok(portfolio) => Arc::new(portfolio),
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    if let Err(e) = portfolios.save(Arc::clone(&portfolio)) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let engine = TradingEngine::new(
        Arc::clone(&accounts) as Arc<dyn AccountStore>,
        Arc::clone(&portfolios) as Arc<dyn PortfolioStore>,
        Arc::clone(&transactions) as Arc<dyn TransactionStore>,
        Arc::clone(&oracle) as Arc<dyn PriceOracle>,
        Arc::clone(&ids) as Arc<dyn IdGenerator>,
        SymbolPolicy::unrestricted(),
    );

    eprintln!(
        "Opened account {} for {} with {} {}",
        account.account_id(),
        owner,
        account.balance(),
        currency,
    );

    // Execute the scripted session.
    for order in &orders {
        let result = match order {
            SessionOrder::Deposit(amount) => engine
                .deposit(account.account_id(), *amount)
                .map(|entry| format!("deposit {}", entry.amount())),
            SessionOrder::Withdraw(amount) => engine
                .withdraw(account.account_id(), *amount)
                .map(|entry| format!("withdraw {}", entry.amount())),
            SessionOrder::Buy {
                symbol,
                quantity,
                price,
            } => engine
                .buy(
                    account.account_id(),
                    portfolio.portfolio_id(),
                    symbol,
                    *quantity,
                    *price,
                )
                .map(|entry| {
                    format!(
                        "buy {} {} @ {} = {}",
                        entry.quantity().unwrap_or_default(),
                        symbol,
                        entry.price().unwrap_or_default(),
                        entry.amount(),
                    )
                }),
            SessionOrder::Sell {
                symbol,
                quantity,
                price,
            } => engine
                .sell(
                    account.account_id(),
                    portfolio.portfolio_id(),
                    symbol,
                    *quantity,
                    *price,
                )
                .map(|entry| {
                    format!(
                        "sell {} {} @ {} = {} (P/L {})",
                        entry.quantity().unwrap_or_default(),
                        symbol,
                        entry.price().unwrap_or_default(),
                        entry.amount(),
                        entry.profit_loss().unwrap_or_default(),
                    )
                }),
        };
        match result {
            Ok(line) => eprintln!("  {line}"),
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        }
    }

    // Print the session summary.
    let valuation = ValuationEngine::new(Arc::clone(&oracle) as Arc<dyn PriceOracle>);
    let holdings = match engine.portfolio_holdings(portfolio.portfolio_id()) {
        Ok(holdings) => holdings,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let entries = match engine.transactions_for_account(account.account_id()) {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let breakdown = valuation.breakdown(&holdings, &HashMap::new());

    println!("=== Session Summary ===");
    println!("Account:        {} ({})", account.account_id(), owner);
    println!("Cash balance:   {} {}", account.balance(), currency);
    println!("Market value:   {}", breakdown.total_market_value);
    println!("Unrealized P/L: {}", breakdown.total_unrealized_pl);
    println!("Realized P/L:   {}", valuation.realized_pl(&entries));

    if !breakdown.rows.is_empty() {
        println!("\n=== Holdings ===");
        for row in &breakdown.rows {
            let price = fmt_opt(row.market_price);
            let value = fmt_opt(row.market_value);
            let unrealized = fmt_opt(row.unrealized_pl);
            println!(
                "  {}: qty {}, avg {}, price {}, value {}, unrealized {}",
                row.symbol, row.quantity, row.average_cost, price, value, unrealized,
            );
        }
    }

    if !entries.is_empty() {
        println!("\n=== Ledger ===");
        for entry in &entries {
            let symbol = entry
                .metadata()
                .and_then(|m| m.get("symbol").cloned())
                .unwrap_or_default();
            println!(
                "  {} {} {} amount {}",
                entry.transaction_id(),
                entry.kind(),
                symbol,
                entry.amount(),
            );
        }
    }

    ExitCode::SUCCESS
}

fn fmt_opt(value: Option<Decimal>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn run_quote(config_path: &PathBuf, symbol: &str) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let oracle = match FixedPriceOracle::from_config(&config) {
        Ok(oracle) => oracle,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    match oracle.quote(symbol) {
        Ok(price) => {
            println!("{}: {}", symbol.trim().to_uppercase(), price);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    match validate_simulation_config(&config) {
        Ok(()) => {
            eprintln!("Configuration is valid");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}
