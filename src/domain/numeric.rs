//! Monetary and quantity quantization.
//!
//! Every monetary amount in the engine is a `Decimal` quantized to 2
//! fractional digits (cents); every quantity is a `Decimal` quantized to 8
//! fractional digits. Both round half-up (ties away from zero). All other
//! modules compose their validation from these functions; nothing else in
//! the crate re-implements rounding.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::domain::error::LedgerSimError;

/// Fractional digits carried by monetary amounts.
pub const MONEY_SCALE: u32 = 2;

/// Fractional digits carried by quantities (fractional shares/units).
pub const QUANTITY_SCALE: u32 = 8;

/// Quantize a monetary amount to cents, rounding half-up.
///
/// The result always carries a scale of exactly [`MONEY_SCALE`], so repeated
/// quantization is a no-op and display/serialization is stable.
pub fn to_money(value: Decimal) -> Decimal {
    let mut quantized =
        value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    quantized.rescale(MONEY_SCALE);
    quantized
}

/// Quantize a quantity to 8 fractional digits, rounding half-up.
pub fn to_quantity(value: Decimal) -> Decimal {
    let mut quantized =
        value.round_dp_with_strategy(QUANTITY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    quantized.rescale(QUANTITY_SCALE);
    quantized
}

/// Parse a monetary amount from its string form and quantize it.
///
/// This is the string-boundary counterpart of [`to_money`], used by the
/// config and CLI layers. Fails with `InvalidAmount` when the input is not a
/// number.
pub fn parse_money(raw: &str) -> Result<Decimal, LedgerSimError> {
    Decimal::from_str(raw.trim())
        .map(to_money)
        .map_err(|_| LedgerSimError::InvalidAmount {
            reason: format!("invalid monetary amount: {raw:?}"),
        })
}

/// Parse a quantity from its string form and quantize it.
///
/// Fails with `InvalidQuantity` when the input is not a number.
pub fn parse_quantity(raw: &str) -> Result<Decimal, LedgerSimError> {
    Decimal::from_str(raw.trim())
        .map(to_quantity)
        .map_err(|_| LedgerSimError::InvalidQuantity {
            reason: format!("invalid quantity value: {raw:?}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn to_money_rounds_half_up() {
        assert_eq!(to_money(dec!(12.345)), dec!(12.35));
        assert_eq!(to_money(dec!(12.344)), dec!(12.34));
        assert_eq!(to_money(dec!(3.333)), dec!(3.33));
    }

    #[test]
    fn to_money_ties_go_away_from_zero() {
        assert_eq!(to_money(dec!(2.675)), dec!(2.68));
        assert_eq!(to_money(dec!(-2.675)), dec!(-2.68));
    }

    #[test]
    fn to_money_pads_scale_to_cents() {
        let quantized = to_money(dec!(5));
        assert_eq!(quantized, dec!(5.00));
        assert_eq!(quantized.scale(), MONEY_SCALE);
        assert_eq!(quantized.to_string(), "5.00");
    }

    #[test]
    fn to_money_is_idempotent() {
        let once = to_money(dec!(1.005));
        assert_eq!(to_money(once), once);
    }

    #[test]
    fn to_quantity_rounds_at_eight_places() {
        assert_eq!(to_quantity(dec!(1.234567891)), dec!(1.23456789));
        assert_eq!(to_quantity(dec!(0.000000015)), dec!(0.00000002));
    }

    #[test]
    fn to_quantity_pads_scale() {
        let quantized = to_quantity(dec!(2.5));
        assert_eq!(quantized.scale(), QUANTITY_SCALE);
        assert_eq!(quantized.to_string(), "2.50000000");
    }

    #[test]
    fn parse_money_accepts_plain_numbers() {
        assert_eq!(parse_money("10").unwrap(), dec!(10.00));
        assert_eq!(parse_money(" 10.125 ").unwrap(), dec!(10.13));
        assert_eq!(parse_money("-3.5").unwrap(), dec!(-3.50));
    }

    #[test]
    fn parse_money_rejects_garbage() {
        assert!(matches!(
            parse_money("ten dollars"),
            Err(LedgerSimError::InvalidAmount { .. })
        ));
        assert!(matches!(
            parse_money(""),
            Err(LedgerSimError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn parse_quantity_rejects_garbage() {
        assert!(matches!(
            parse_quantity("1.2.3"),
            Err(LedgerSimError::InvalidQuantity { .. })
        ));
    }
}
