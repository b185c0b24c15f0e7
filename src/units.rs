//! Conversion between raw on-chain integer amounts and human units.

use std::str::FromStr;

use alloy::primitives::U256;
use alloy::primitives::utils::format_units;
use rust_decimal::Decimal;

#[derive(Debug, thiserror::Error)]
pub enum UnitsError {
    #[error("invalid unit: {0}")]
    Unit(#[from] alloy::primitives::utils::UnitsError),
    #[error("amount does not fit a decimal: {0}")]
    Decimal(#[from] rust_decimal::Error),
    #[error("negative amount: {0}")]
    NegativeAmount(Decimal),
    #[error("amount overflow when scaling to {decimals} decimals")]
    AmountOverflow { decimals: u8 },
    #[error("failed to parse scaled amount as U256")]
    Parse(#[from] alloy::primitives::ruint::ParseError),
}

/// Divides a raw amount by `10^decimals`.
pub fn to_decimal(amount: U256, decimals: u8) -> Result<Decimal, UnitsError> {
    let formatted = format_units(amount, decimals)?;
    Ok(Decimal::from_str(&formatted)?.normalize())
}

/// Scales a human amount up to raw units, truncating extra precision.
pub fn from_decimal(amount: Decimal, decimals: u8) -> Result<U256, UnitsError> {
    if amount.is_sign_negative() {
        return Err(UnitsError::NegativeAmount(amount));
    }

    let scale = Decimal::from(
        10u64
            .checked_pow(u32::from(decimals))
            .ok_or(UnitsError::AmountOverflow { decimals })?,
    );
    let scaled = amount
        .checked_mul(scale)
        .ok_or(UnitsError::AmountOverflow { decimals })?;

    Ok(U256::from_str_radix(&scaled.trunc().to_string(), 10)?)
}
