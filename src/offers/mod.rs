//! Offers
//!
//! An offer is a self-contained promotional rule: given a basket and a price
//! source it returns the discount it grants. Offers are configured once at
//! construction, hold no state between calls, and never see each other's effect
//! on the basket.

use std::fmt;

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    basket::BasketView,
    offers::eligible::EligibleProducts,
    pricing::{PriceSource, PricingError, line_total_minor, unit_price},
};

pub mod buy_n;
pub mod eligible;
pub mod percentage;

/// Errors raised while configuring or evaluating an offer.
#[derive(Debug, Error, PartialEq)]
pub enum OfferError {
    /// Percentage points outside `0..=100`.
    #[error("percentage must be between 0 and 100, got {0}")]
    InvalidPercentage(Decimal),

    /// A buy-N group size of zero.
    #[error("group size must be at least 1")]
    InvalidGroupSize,

    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// Discount arithmetic overflowed.
    #[error("discount overflowed")]
    Overflow,

    /// Pricing an eligible basket line failed.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// A promotional rule that computes a discount for a basket.
pub trait Offer<'a>: fmt::Debug + Send + Sync {
    /// Display name of the offer.
    fn name(&self) -> &str;

    /// Calculate the discount this offer grants on `basket`.
    ///
    /// The result is never negative. Calling this twice with the same basket and
    /// prices yields the same amount.
    ///
    /// # Errors
    ///
    /// Returns an `OfferError` if an eligible product cannot be priced in
    /// `currency`, or if discount arithmetic overflows.
    fn discount(
        &self,
        basket: &dyn BasketView,
        prices: &dyn PriceSource<'a>,
        currency: &'a Currency,
    ) -> Result<Money<'a, Currency>, OfferError>;
}

/// A priced basket line matched by an offer's eligible set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct EligibleLine<'b, 'a> {
    pub(crate) product: &'b str,
    pub(crate) price: Money<'a, Currency>,
    pub(crate) quantity: u32,
}

impl EligibleLine<'_, '_> {
    pub(crate) fn unit_minor(&self) -> i64 {
        self.price.to_minor_units()
    }

    pub(crate) fn total_minor(&self) -> Result<i64, OfferError> {
        Ok(line_total_minor(self.product, &self.price, self.quantity)?)
    }
}

/// Collect the priced lines of `basket` that are in `eligible`, skipping zero quantities.
///
/// Lines come back in basket order; callers that care about order sort them.
pub(crate) fn eligible_lines<'b, 'a>(
    eligible: &EligibleProducts,
    basket: &'b dyn BasketView,
    prices: &dyn PriceSource<'a>,
    currency: &'a Currency,
) -> Result<SmallVec<[EligibleLine<'b, 'a>; 8]>, OfferError> {
    let mut lines = SmallVec::new();

    for product in basket.products() {
        if !eligible.contains(product) {
            continue;
        }

        let quantity = basket.quantity(product);

        if quantity == 0 {
            continue;
        }

        lines.push(EligibleLine {
            product,
            price: unit_price(prices, product, currency)?,
            quantity,
        });
    }

    Ok(lines)
}

/// Calculate a percentage of a minor unit amount, rounded half away from zero.
///
/// # Errors
///
/// Returns [`OfferError::PercentConversion`] if the calculation overflows.
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, OfferError> {
    let minor = Decimal::from_i64(minor).ok_or(OfferError::PercentConversion)?;

    // `Percentage` does not expose its inner `Decimal`
    (*percent * Decimal::ONE)
        .checked_mul(minor)
        .ok_or(OfferError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(OfferError::PercentConversion)
}

/// Join eligible product names for generated offer names.
fn describe_products(products: &EligibleProducts) -> String {
    products.iter().collect::<Vec<_>>().join(", ")
}
