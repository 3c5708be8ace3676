//! Percentage Discount
//!
//! A percentage off every eligible basket line. Each line's discount is rounded
//! to whole minor units, half away from zero, before the lines are summed.

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};

use crate::{
    basket::BasketView,
    offers::{
        Offer, OfferError, describe_products, eligible::EligibleProducts, eligible_lines,
        percent_of_minor,
    },
    pricing::PriceSource,
};

/// "X% off" a set of products
#[derive(Debug, Clone)]
pub struct PercentageDiscount {
    name: String,
    products: EligibleProducts,
    percentage: Percentage,
}

impl PercentageDiscount {
    /// Create a new percentage discount of `percent` percentage points (`25` is 25% off).
    ///
    /// # Errors
    ///
    /// Returns [`OfferError::InvalidPercentage`] if `percent` is negative or above 100.
    pub fn new<I, S>(products: I, percent: Decimal) -> Result<Self, OfferError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if percent < Decimal::ZERO || percent > Decimal::ONE_HUNDRED {
            return Err(OfferError::InvalidPercentage(percent));
        }

        let products = EligibleProducts::new(products);
        let name = format!("{}% off {}", percent.normalize(), describe_products(&products));

        Ok(Self {
            name,
            products,
            percentage: Percentage::from(percent / Decimal::ONE_HUNDRED),
        })
    }

    /// Replace the generated display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Return the eligible products
    pub fn products(&self) -> &EligibleProducts {
        &self.products
    }

    /// Return the discount as a fraction (`0.25` for 25% off)
    pub fn percentage(&self) -> Percentage {
        self.percentage
    }
}

impl<'a> Offer<'a> for PercentageDiscount {
    fn name(&self) -> &str {
        &self.name
    }

    fn discount(
        &self,
        basket: &dyn BasketView,
        prices: &dyn PriceSource<'a>,
        currency: &'a Currency,
    ) -> Result<Money<'a, Currency>, OfferError> {
        if (self.percentage * Decimal::ONE).is_zero() {
            return Ok(Money::from_minor(0, currency));
        }

        let mut discount_minor = 0_i64;

        for line in eligible_lines(&self.products, basket, prices, currency)? {
            let line_discount = percent_of_minor(&self.percentage, line.total_minor()?)?;

            discount_minor = discount_minor
                .checked_add(line_discount)
                .ok_or(OfferError::Overflow)?;
        }

        Ok(Money::from_minor(discount_minor, currency))
    }
}
