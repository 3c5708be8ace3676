//! Catalogue Fixtures

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rustc_hash::FxHashMap;
use rusty_money::iso::{Currency, EUR, GBP, USD};
use serde::Deserialize;

use crate::fixtures::FixtureError;

/// Wrapper for catalogue prices in YAML
#[derive(Debug, Deserialize)]
pub struct CatalogueFixture {
    /// Map of product name -> price (e.g., "2.99 GBP")
    pub products: FxHashMap<String, String>,
}

/// Parse price string (e.g., "2.99 GBP") into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY", if
/// the amount is negative or finer than a penny, or if the currency code is not
/// recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    if parts.len() != 2 {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    }

    let amount = parts
        .first()
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    if amount.is_sign_negative() {
        return Err(FixtureError::InvalidPrice(format!(
            "Price must not be negative, got: {s}"
        )));
    }

    let minor = amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    if !minor.fract().is_zero() {
        return Err(FixtureError::InvalidPrice(format!(
            "Price has more precision than the currency allows: {s}"
        )));
    }

    let minor_units = minor
        .to_i64()
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let currency_code = parts
        .get(1)
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let currency = match *currency_code {
        "GBP" => GBP,
        "USD" => USD,
        "EUR" => EUR,
        other => return Err(FixtureError::UnknownCurrency(other.to_string())),
    };

    Ok((minor_units, currency))
}
