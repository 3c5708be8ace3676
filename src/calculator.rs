//! Calculator
//!
//! Prices a basket and applies every configured offer to it. Each offer sees the
//! original basket; discounts are simply summed.

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, prelude::FromPrimitive};
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;
use tracing::{debug, trace};

use crate::{
    basket::BasketView,
    offers::{Offer, OfferError},
    pricing::{PriceSource, PricingError, line_total_minor, unit_price},
};

/// Errors that can occur while calculating a basket total.
#[derive(Debug, Error, PartialEq)]
pub enum CalcError {
    /// A basket line could not be priced.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// An offer failed to evaluate (offer name, cause).
    #[error("offer {0} failed: {1}")]
    Offer(String, #[source] OfferError),

    /// Subtotal or discount accumulation overflowed.
    #[error("basket total overflowed")]
    Overflow,
}

/// Basket totals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Total<'a> {
    /// Sum of every line's unit price times quantity.
    pub subtotal: Money<'a, Currency>,

    /// Sum of every offer's discount.
    pub discount: Money<'a, Currency>,

    /// Subtotal minus discount. Not clamped at zero.
    pub total: Money<'a, Currency>,
}

impl<'a> Total<'a> {
    /// All-zero totals in `currency`.
    pub fn zero(currency: &'a Currency) -> Self {
        let zero = Money::from_minor(0, currency);

        Self {
            subtotal: zero,
            discount: zero,
            total: zero,
        }
    }

    /// Discount as a fraction of the subtotal; zero when the subtotal is zero.
    pub fn savings_percent(&self) -> Percentage {
        let subtotal_minor = self.subtotal.to_minor_units();

        if subtotal_minor == 0 {
            return Percentage::from(Decimal::ZERO);
        }

        let discount = Decimal::from_i64(self.discount.to_minor_units()).unwrap_or(Decimal::ZERO);
        let subtotal = Decimal::from_i64(subtotal_minor).unwrap_or(Decimal::ONE);

        Percentage::from(discount / subtotal)
    }
}

/// The discount one offer granted on one basket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppliedOffer<'c, 'a> {
    /// Offer name
    pub name: &'c str,

    /// Discount granted
    pub discount: Money<'a, Currency>,
}

/// Prices baskets against a fixed price source and offer list.
#[derive(Debug)]
pub struct Calculator<'a, P> {
    currency: &'a Currency,
    prices: P,
    offers: Vec<Box<dyn Offer<'a>>>,
}

impl<'a, P: PriceSource<'a>> Calculator<'a, P> {
    /// Create a new calculator with no offers.
    pub fn new(currency: &'a Currency, prices: P) -> Self {
        Self {
            currency,
            prices,
            offers: Vec::new(),
        }
    }

    /// Create a new calculator with the given offers, evaluated in order.
    pub fn from_offers(
        currency: &'a Currency,
        prices: P,
        offers: impl IntoIterator<Item = Box<dyn Offer<'a>>>,
    ) -> Self {
        Self {
            currency,
            prices,
            offers: offers.into_iter().collect(),
        }
    }

    /// Add another offer.
    #[must_use]
    pub fn with_offer(mut self, offer: impl Offer<'a> + 'static) -> Self {
        self.offers.push(Box::new(offer));
        self
    }

    /// Get the calculator's currency.
    pub fn currency(&self) -> &'a Currency {
        self.currency
    }

    /// Get the price source.
    pub fn prices(&self) -> &P {
        &self.prices
    }

    /// Get the configured offers, in evaluation order.
    pub fn offers(&self) -> &[Box<dyn Offer<'a>>] {
        &self.offers
    }

    /// Calculate the subtotal, discount and total of `basket`.
    ///
    /// # Errors
    ///
    /// Returns a `CalcError` if a basket product has no price (or a price in
    /// another currency), if an offer fails, or if the totals overflow.
    pub fn calc(&self, basket: &dyn BasketView) -> Result<Total<'a>, CalcError> {
        let (total, _applied) = self.evaluate(basket)?;

        Ok(total)
    }

    /// Calculate the totals of `basket` together with the discount each offer
    /// granted, evaluating every offer exactly once.
    ///
    /// # Errors
    ///
    /// Returns a `CalcError` under the same conditions as [`Calculator::calc`].
    #[tracing::instrument(
        name = "calculator.calc",
        skip_all,
        fields(
            offers = self.offers.len(),
            subtotal = tracing::field::Empty,
            discount = tracing::field::Empty
        )
    )]
    pub fn evaluate(
        &self,
        basket: &dyn BasketView,
    ) -> Result<(Total<'a>, SmallVec<[AppliedOffer<'_, 'a>; 4]>), CalcError> {
        let subtotal = self.subtotal(basket)?;
        let applied = self.apply_offers(basket)?;

        let discount_minor = applied
            .iter()
            .try_fold(0_i64, |acc, offer| {
                acc.checked_add(offer.discount.to_minor_units())
            })
            .ok_or(CalcError::Overflow)?;

        let total_minor = subtotal
            .to_minor_units()
            .checked_sub(discount_minor)
            .ok_or(CalcError::Overflow)?;

        let span = tracing::Span::current();
        span.record("subtotal", subtotal.to_minor_units());
        span.record("discount", discount_minor);

        debug!(total = total_minor, "calculated basket total");

        let total = Total {
            subtotal,
            discount: Money::from_minor(discount_minor, self.currency),
            total: Money::from_minor(total_minor, self.currency),
        };

        Ok((total, applied))
    }

    /// Sum of unit price times quantity over every distinct basket product.
    ///
    /// # Errors
    ///
    /// Returns a `CalcError` if a product cannot be priced or the sum overflows.
    pub fn subtotal(&self, basket: &dyn BasketView) -> Result<Money<'a, Currency>, CalcError> {
        let mut subtotal_minor = 0_i64;

        for product in basket.products() {
            let quantity = basket.quantity(product);
            let price = unit_price(&self.prices, product, self.currency)?;
            let line_minor = line_total_minor(product, &price, quantity)?;

            trace!(product, quantity, line = line_minor, "priced basket line");

            subtotal_minor = subtotal_minor
                .checked_add(line_minor)
                .ok_or(CalcError::Overflow)?;
        }

        Ok(Money::from_minor(subtotal_minor, self.currency))
    }

    /// Evaluate every offer against `basket`, in configuration order.
    ///
    /// # Errors
    ///
    /// Returns [`CalcError::Offer`] naming the first offer that fails.
    pub fn apply_offers(
        &self,
        basket: &dyn BasketView,
    ) -> Result<SmallVec<[AppliedOffer<'_, 'a>; 4]>, CalcError> {
        let mut applied = SmallVec::new();

        for offer in &self.offers {
            let discount = offer
                .discount(basket, &self.prices, self.currency)
                .map_err(|error| CalcError::Offer(offer.name().to_string(), error))?;

            debug!(offer = offer.name(), discount = %discount, "applied offer");

            applied.push(AppliedOffer {
                name: offer.name(),
                discount,
            });
        }

        Ok(applied)
    }
}
