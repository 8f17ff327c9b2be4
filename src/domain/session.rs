//! Scripted session orders for the simulator CLI.

use rust_decimal::Decimal;

use crate::domain::error::LedgerSimError;
use crate::domain::numeric::{parse_money, parse_quantity};
use crate::domain::trading::OrderPrice;

/// One scripted operation from a `[session] orders` list.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOrder {
    Deposit(Decimal),
    Withdraw(Decimal),
    Buy {
        symbol: String,
        quantity: Decimal,
        price: OrderPrice,
    },
    Sell {
        symbol: String,
        quantity: Decimal,
        price: OrderPrice,
    },
}

/// Parse a comma-separated order list.
///
/// Grammar per order: `deposit <amount>`, `withdraw <amount>`,
/// `buy <SYMBOL> <quantity> [price]`, `sell <SYMBOL> <quantity> [price]`.
/// A trade without a price executes at the market price.
pub fn parse_orders(raw: &str) -> Result<Vec<SessionOrder>, LedgerSimError> {
    raw.split(',')
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .map(parse_order)
        .collect()
}

fn parse_order(chunk: &str) -> Result<SessionOrder, LedgerSimError> {
    let tokens: Vec<&str> = chunk.split_whitespace().collect();
    match tokens.as_slice() {
        ["deposit", amount] => Ok(SessionOrder::Deposit(parse_money(amount)?)),
        ["withdraw", amount] => Ok(SessionOrder::Withdraw(parse_money(amount)?)),
        ["buy", symbol, rest @ ..] => parse_trade(chunk, symbol, rest, true),
        ["sell", symbol, rest @ ..] => parse_trade(chunk, symbol, rest, false),
        _ => Err(invalid_order(chunk, "expected deposit/withdraw/buy/sell")),
    }
}

fn parse_trade(
    chunk: &str,
    symbol: &str,
    rest: &[&str],
    is_buy: bool,
) -> Result<SessionOrder, LedgerSimError> {
    let (quantity, price) = match rest {
        [quantity] => (parse_quantity(quantity)?, OrderPrice::Market),
        [quantity, price] => (
            parse_quantity(quantity)?,
            OrderPrice::Limit(parse_money(price)?),
        ),
        _ => return Err(invalid_order(chunk, "expected <symbol> <quantity> [price]")),
    };
    let symbol = symbol.to_string();
    Ok(if is_buy {
        SessionOrder::Buy {
            symbol,
            quantity,
            price,
        }
    } else {
        SessionOrder::Sell {
            symbol,
            quantity,
            price,
        }
    })
}

fn invalid_order(chunk: &str, reason: &str) -> LedgerSimError {
    LedgerSimError::ConfigInvalid {
        section: "session".to_string(),
        key: "orders".to_string(),
        reason: format!("{reason}: {chunk:?}"),
    }
}
