use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use std::str::FromStr;

// Fracciones (fee rates, APR) llegan como strings decimales: "0.02", "1.35"
pub fn parse_fraction(value: &str) -> Result<f64, ConversionError> {
    let trimmed = value.trim();
    let parsed = f64::from_str(trimmed)
        .map_err(|e| ConversionError::InvalidNumber(format!("{}: {}", trimmed, e)))?;
    if !parsed.is_finite() {
        return Err(ConversionError::InvalidNumber(trimmed.to_string()));
    }
    Ok(parsed)
}

/// Uint128 amount as a `Decimal`; fails above `Decimal::MAX` (~7.9e28).
pub fn amount_to_decimal(amount: u128) -> Result<Decimal, ConversionError> {
    Decimal::from_u128(amount).ok_or(ConversionError::Overflow)
}

pub fn decimal_to_f64(value: Decimal) -> Result<f64, ConversionError> {
    value.to_f64().ok_or(ConversionError::Overflow)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    #[error("Invalid number: {0}")]
    InvalidNumber(String),
    #[error("Overflow in conversion")]
    Overflow,
}
