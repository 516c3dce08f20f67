//! Pricing
//!
//! Prices travel through the storefront as formatted strings (`"R$ 1.234,56"`). This module
//! turns them into [`Money`] in the store currency and back again, and computes line and
//! cart totals in minor units.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use thiserror::Error;
use tracing::debug;

/// Currency every price in the store is quoted in.
pub const CURRENCY: &Currency = iso::BRL;

/// Prefix used by the formatted price strings.
const CURRENCY_PREFIX: &str = "R$";

/// An amount in the store currency.
pub type Price = Money<'static, Currency>;

/// Errors that can occur while parsing a formatted price.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// The price string was empty or only whitespace.
    #[error("price is empty")]
    Empty,

    /// The price string could not be read as an amount.
    #[error("invalid price format: {0}")]
    InvalidFormat(String),

    /// The amount does not fit in minor units.
    #[error("price out of range: {0}")]
    OutOfRange(String),
}

/// A zero amount in the store currency.
pub fn zero() -> Price {
    Money::from_minor(0, CURRENCY)
}

/// Builds a price from minor units (centavos).
pub fn from_minor(minor: i64) -> Price {
    Money::from_minor(minor, CURRENCY)
}

/// Parse a formatted price string (e.g. `"R$ 1.234,56"`) into the store currency.
///
/// `.` is read as the thousands separator and `,` as the decimal separator; the `R$`
/// prefix and any whitespace (including non-breaking spaces) are optional. Amounts are
/// rounded half away from zero to whole centavos.
///
/// # Errors
///
/// - [`PricingError::Empty`]: nothing but whitespace was given.
/// - [`PricingError::InvalidFormat`]: the amount is not a non-negative decimal number.
/// - [`PricingError::OutOfRange`]: the amount overflows minor units.
pub fn parse_price(s: &str) -> Result<Price, PricingError> {
    let trimmed = s.trim();

    if trimmed.is_empty() {
        return Err(PricingError::Empty);
    }

    let unprefixed = trimmed.strip_prefix(CURRENCY_PREFIX).unwrap_or(trimmed);

    let normalized: String = unprefixed
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '.')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    let amount = Decimal::from_str(&normalized)
        .map_err(|_err| PricingError::InvalidFormat(s.to_string()))?;

    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(PricingError::InvalidFormat(s.to_string()));
    }

    let minor_units = amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .map(|value| value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|value| value.to_i64())
        .ok_or_else(|| PricingError::OutOfRange(s.to_string()))?;

    Ok(from_minor(minor_units))
}

/// Parse a formatted price, treating anything missing or malformed as zero.
pub fn parse_price_or_zero(s: &str) -> Price {
    parse_price(s).unwrap_or_else(|error| {
        debug!(price = s, %error, "unreadable price treated as zero");

        zero()
    })
}

/// Format a price the way the storefront displays it: `R$ 1.234,56`.
pub fn format_price(price: &Price) -> String {
    let minor = price.to_minor_units();
    let sign = if minor < 0 { "-" } else { "" };
    let magnitude = minor.unsigned_abs();

    let digits = (magnitude / 100).to_string();
    let cents = magnitude % 100;

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push('.');
        }

        grouped.push(ch);
    }

    format!("{sign}{CURRENCY_PREFIX} {grouped},{cents:02}")
}

/// Price of `quantity` units at `unit_price`.
pub fn line_total(unit_price: &Price, quantity: u32) -> Price {
    from_minor(
        unit_price
            .to_minor_units()
            .saturating_mul(i64::from(quantity)),
    )
}

/// Sum a sequence of prices; an empty sequence totals zero.
pub fn total_price(prices: impl IntoIterator<Item = Price>) -> Price {
    let minor = prices
        .into_iter()
        .fold(0_i64, |acc, price| acc.saturating_add(price.to_minor_units()));

    from_minor(minor)
}
