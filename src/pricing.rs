//! Prices

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

/// Errors that can occur while pricing basket lines.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// The price source has no price for a product the basket holds.
    #[error("no price for product {0}")]
    UnknownProduct(String),

    /// A product is priced in a different currency (product, price currency, expected currency).
    #[error("product {0} is priced in {1}, expected {2}")]
    CurrencyMismatch(String, &'static str, &'static str),

    /// Unit price times quantity does not fit in minor units.
    #[error("line total overflowed for product {0}")]
    Overflow(String),

    /// A unit price is finer than the currency's minor unit (product, price).
    #[error("product {0} is priced at {1}, finer than one minor unit")]
    SubMinorPrice(String, Decimal),
}

/// A pure lookup from product identifier to unit price.
///
/// Lookups may happen several times per calculation (once for the subtotal and
/// once per offer), so implementations must be cheap and repeatable.
pub trait PriceSource<'a> {
    /// Unit price of `product`, or `None` when it is not catalogued.
    fn price(&self, product: &str) -> Option<Money<'a, Currency>>;
}

impl<'a, F> PriceSource<'a> for F
where
    F: Fn(&str) -> Option<Money<'a, Currency>>,
{
    fn price(&self, product: &str) -> Option<Money<'a, Currency>> {
        self(product)
    }
}

/// Catalogue of unit prices keyed by product name.
#[derive(Debug, Clone, Default)]
pub struct Catalogue<'a> {
    prices: FxHashMap<String, Money<'a, Currency>>,
}

impl<'a> Catalogue<'a> {
    /// Create a new, empty catalogue.
    pub fn new() -> Self {
        Self {
            prices: FxHashMap::default(),
        }
    }

    /// Create a catalogue from `(product, price)` pairs. Later entries win.
    pub fn with_prices<I, S>(prices: I) -> Self
    where
        I: IntoIterator<Item = (S, Money<'a, Currency>)>,
        S: Into<String>,
    {
        Self {
            prices: prices
                .into_iter()
                .map(|(product, price)| (product.into(), price))
                .collect(),
        }
    }

    /// Set the unit price of a product, returning the previous price if any.
    pub fn insert(
        &mut self,
        product: impl Into<String>,
        price: Money<'a, Currency>,
    ) -> Option<Money<'a, Currency>> {
        self.prices.insert(product.into(), price)
    }

    /// Get the number of catalogued products.
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    /// Check if the catalogue is empty.
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

impl<'a> PriceSource<'a> for Catalogue<'a> {
    fn price(&self, product: &str) -> Option<Money<'a, Currency>> {
        self.prices.get(product).copied()
    }
}

/// Look up the unit price of `product`, requiring it to be priced in `currency`.
///
/// # Errors
///
/// - [`PricingError::UnknownProduct`]: the source has no price for `product`.
/// - [`PricingError::CurrencyMismatch`]: the price is in another currency.
/// - [`PricingError::SubMinorPrice`]: the price cannot be held in whole minor units.
pub fn unit_price<'a, P>(
    prices: &P,
    product: &str,
    currency: &'a Currency,
) -> Result<Money<'a, Currency>, PricingError>
where
    P: PriceSource<'a> + ?Sized,
{
    let price = prices
        .price(product)
        .ok_or_else(|| PricingError::UnknownProduct(product.to_string()))?;

    if price.currency() != currency {
        return Err(PricingError::CurrencyMismatch(
            product.to_string(),
            price.currency().iso_alpha_code,
            currency.iso_alpha_code,
        ));
    }

    let amount = *price.amount();

    if amount.normalize().scale() > currency.exponent {
        return Err(PricingError::SubMinorPrice(product.to_string(), amount));
    }

    Ok(price)
}

/// Unit price times quantity, in minor units.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] if the product does not fit in an `i64`.
pub fn line_total_minor(
    product: &str,
    price: &Money<'_, Currency>,
    quantity: u32,
) -> Result<i64, PricingError> {
    price
        .to_minor_units()
        .checked_mul(i64::from(quantity))
        .ok_or_else(|| PricingError::Overflow(product.to_string()))
}
