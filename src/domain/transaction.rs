//! Immutable ledger entries for completed cash and trade events.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::error::LedgerSimError;
use crate::domain::numeric::{to_money, to_quantity};

/// The four recorded event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    Buy,
    Sell,
}

impl TransactionKind {
    pub fn is_trade(self) -> bool {
        matches!(self, TransactionKind::Buy | TransactionKind::Sell)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::Deposit => "deposit",
            TransactionKind::Withdrawal => "withdrawal",
            TransactionKind::Buy => "buy",
            TransactionKind::Sell => "sell",
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Interpret a zone-less timestamp as UTC.
pub fn assume_utc(naive: NaiveDateTime) -> DateTime<Utc> {
    naive.and_utc()
}

/// Immutable record of one completed cash or trade event.
///
/// All fields are private and set exactly once through
/// [`TransactionBuilder::build`], which runs the kind-dependent validation;
/// no mutation surface exists after construction. Monetary fields carry a
/// scale of 2, quantities a scale of 8.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    transaction_id: String,
    kind: TransactionKind,
    account_id: String,
    from_account: Option<String>,
    to_account: Option<String>,
    quantity: Option<Decimal>,
    price: Option<Decimal>,
    amount: Decimal,
    profit_loss: Option<Decimal>,
    created_at: DateTime<Utc>,
    executed_at: Option<DateTime<Utc>>,
    metadata: Option<HashMap<String, String>>,
}

impl Transaction {
    /// Start building an entry of the given kind.
    pub fn builder(
        kind: TransactionKind,
        transaction_id: &str,
        account_id: &str,
    ) -> TransactionBuilder {
        TransactionBuilder {
            kind,
            transaction_id: transaction_id.to_string(),
            account_id: account_id.to_string(),
            from_account: None,
            to_account: None,
            quantity: None,
            price: None,
            amount: None,
            profit_loss: None,
            created_at: None,
            executed_at: None,
            metadata: None,
        }
    }

    /// Cash deposit entry.
    pub fn deposit(
        transaction_id: &str,
        account_id: &str,
        amount: Decimal,
    ) -> Result<Self, LedgerSimError> {
        Self::builder(TransactionKind::Deposit, transaction_id, account_id)
            .amount(amount)
            .build()
    }

    /// Cash withdrawal entry.
    pub fn withdrawal(
        transaction_id: &str,
        account_id: &str,
        amount: Decimal,
    ) -> Result<Self, LedgerSimError> {
        Self::builder(TransactionKind::Withdrawal, transaction_id, account_id)
            .amount(amount)
            .build()
    }

    /// Trade entry (buy or sell); the amount is computed as
    /// quantity × price, quantized to cents.
    pub fn trade(
        transaction_id: &str,
        account_id: &str,
        kind: TransactionKind,
        quantity: Decimal,
        price: Decimal,
        profit_loss: Option<Decimal>,
    ) -> Result<Self, LedgerSimError> {
        if !kind.is_trade() {
            return Err(LedgerSimError::InvalidTransaction {
                reason: format!("trade entries must be buy or sell, got {kind}"),
            });
        }
        let mut builder = Self::builder(kind, transaction_id, account_id)
            .quantity(quantity)
            .price(price);
        if let Some(pl) = profit_loss {
            builder = builder.profit_loss(pl);
        }
        builder.build()
    }

    pub fn transaction_id(&self) -> &str {
        &self.transaction_id
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn from_account(&self) -> Option<&str> {
        self.from_account.as_deref()
    }

    pub fn to_account(&self) -> Option<&str> {
        self.to_account.as_deref()
    }

    pub fn quantity(&self) -> Option<Decimal> {
        self.quantity
    }

    pub fn price(&self) -> Option<Decimal> {
        self.price
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn profit_loss(&self) -> Option<Decimal> {
        self.profit_loss
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn executed_at(&self) -> Option<DateTime<Utc>> {
        self.executed_at
    }

    pub fn metadata(&self) -> Option<&HashMap<String, String>> {
        self.metadata.as_ref()
    }
}

/// One-shot builder; `build` validates per-kind invariants and produces the
/// immutable entry, or fails with `InvalidTransaction` leaving nothing
/// behind.
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    kind: TransactionKind,
    transaction_id: String,
    account_id: String,
    from_account: Option<String>,
    to_account: Option<String>,
    quantity: Option<Decimal>,
    price: Option<Decimal>,
    amount: Option<Decimal>,
    profit_loss: Option<Decimal>,
    created_at: Option<DateTime<Utc>>,
    executed_at: Option<DateTime<Utc>>,
    metadata: Option<HashMap<String, String>>,
}

impl TransactionBuilder {
    /// Reserved for transfers: source account.
    pub fn from_account(mut self, account: &str) -> Self {
        self.from_account = Some(account.to_string());
        self
    }

    /// Reserved for transfers: destination account.
    pub fn to_account(mut self, account: &str) -> Self {
        self.to_account = Some(account.to_string());
        self
    }

    pub fn quantity(mut self, quantity: Decimal) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn price(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }

    /// Cash amount; only valid for deposit/withdrawal entries (trade amounts
    /// are computed).
    pub fn amount(mut self, amount: Decimal) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn profit_loss(mut self, profit_loss: Decimal) -> Self {
        self.profit_loss = Some(profit_loss);
        self
    }

    /// Creation timestamp; defaults to now (UTC). Zone-less inputs go
    /// through [`assume_utc`] first.
    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }

    pub fn executed_at(mut self, at: DateTime<Utc>) -> Self {
        self.executed_at = Some(at);
        self
    }

    pub fn metadata(mut self, metadata: HashMap<String, String>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn build(self) -> Result<Transaction, LedgerSimError> {
        if self.transaction_id.trim().is_empty() {
            return Err(LedgerSimError::InvalidTransaction {
                reason: "transaction_id must be a non-empty string".into(),
            });
        }
        if self.account_id.trim().is_empty() {
            return Err(LedgerSimError::InvalidTransaction {
                reason: format!("{} requires account_id", self.kind),
            });
        }

        let (quantity, price, amount, profit_loss) = if self.kind.is_trade() {
            self.validate_trade_fields()?
        } else {
            self.validate_cash_fields()?
        };

        Ok(Transaction {
            transaction_id: self.transaction_id,
            kind: self.kind,
            account_id: self.account_id,
            from_account: self.from_account,
            to_account: self.to_account,
            quantity,
            price,
            amount,
            profit_loss,
            created_at: self.created_at.unwrap_or_else(Utc::now),
            executed_at: self.executed_at,
            metadata: self.metadata,
        })
    }

    fn validate_cash_fields(
        &self,
    ) -> Result<(Option<Decimal>, Option<Decimal>, Decimal, Option<Decimal>), LedgerSimError> {
        if self.quantity.is_some() || self.price.is_some() {
            return Err(LedgerSimError::InvalidTransaction {
                reason: format!("{} must not have quantity or price", self.kind),
            });
        }
        if self.profit_loss.is_some() {
            return Err(LedgerSimError::InvalidTransaction {
                reason: format!("{} must not have profit_loss", self.kind),
            });
        }
        let amount = self
            .amount
            .ok_or_else(|| LedgerSimError::InvalidTransaction {
                reason: format!("{} requires amount", self.kind),
            })?;
        let amount = to_money(amount);
        if amount <= Decimal::ZERO {
            return Err(LedgerSimError::InvalidTransaction {
                reason: format!("amount must be positive for {}", self.kind),
            });
        }
        Ok((None, None, amount, None))
    }

    fn validate_trade_fields(
        &self,
    ) -> Result<(Option<Decimal>, Option<Decimal>, Decimal, Option<Decimal>), LedgerSimError> {
        if self.amount.is_some() {
            return Err(LedgerSimError::InvalidTransaction {
                reason: format!("amount is computed for {} entries", self.kind),
            });
        }
        let quantity = self
            .quantity
            .ok_or_else(|| LedgerSimError::InvalidTransaction {
                reason: format!("{} requires quantity", self.kind),
            })?;
        let price = self
            .price
            .ok_or_else(|| LedgerSimError::InvalidTransaction {
                reason: format!("{} requires price", self.kind),
            })?;

        let quantity = to_quantity(quantity);
        if quantity <= Decimal::ZERO {
            return Err(LedgerSimError::InvalidTransaction {
                reason: format!("quantity must be positive for {}", self.kind),
            });
        }
        let price = to_money(price);
        if price <= Decimal::ZERO {
            return Err(LedgerSimError::InvalidTransaction {
                reason: format!("price must be positive for {}", self.kind),
            });
        }

        let amount = to_money(quantity * price);
        let profit_loss = self.profit_loss.map(to_money);
        Ok((Some(quantity), Some(price), amount, profit_loss))
    }
}
