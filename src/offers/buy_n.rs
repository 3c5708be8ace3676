//! Buy N, Get the Cheapest Free
//!
//! For every `n` eligible units in the basket (counted across all eligible
//! products combined) one unit is free. Which unit is free, and so how much it
//! is worth, depends on the [`Allocation`] policy.

use std::{cmp::Ordering, num::NonZeroU32};

use rusty_money::{Money, iso::Currency};

use crate::{
    basket::BasketView,
    offers::{
        EligibleLine, Offer, OfferError, describe_products, eligible::EligibleProducts,
        eligible_lines,
    },
    pricing::PriceSource,
};

/// How a buy-N offer picks the free units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Allocation {
    /// Walk lines most expensive first, carrying leftover units into the next
    /// line. Each completed group is discounted at the unit price of the line
    /// that completed it.
    #[default]
    CarryOver,

    /// Count every eligible unit, then discount that many of the cheapest units.
    CheapestFirst,
}

/// "Buy N, get the cheapest free" on a set of products
#[derive(Debug, Clone)]
pub struct BuyNGetCheapestFree {
    name: String,
    products: EligibleProducts,
    group_size: NonZeroU32,
    allocation: Allocation,
}

impl BuyNGetCheapestFree {
    /// Create a new offer making one unit in every `n` free.
    ///
    /// # Errors
    ///
    /// Returns [`OfferError::InvalidGroupSize`] if `n` is zero.
    pub fn new<I, S>(products: I, n: u32) -> Result<Self, OfferError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let group_size = NonZeroU32::new(n).ok_or(OfferError::InvalidGroupSize)?;
        let products = EligibleProducts::new(products);
        let name = format!(
            "Buy {n} get cheapest free on {}",
            describe_products(&products)
        );

        Ok(Self {
            name,
            products,
            group_size,
            allocation: Allocation::default(),
        })
    }

    /// Use a different allocation policy.
    #[must_use]
    pub fn with_allocation(mut self, allocation: Allocation) -> Self {
        self.allocation = allocation;
        self
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

    /// Return the group size
    pub fn group_size(&self) -> u32 {
        self.group_size.get()
    }

    /// Return the allocation policy
    pub fn allocation(&self) -> Allocation {
        self.allocation
    }
}

impl<'a> Offer<'a> for BuyNGetCheapestFree {
    fn name(&self) -> &str {
        &self.name
    }

    fn discount(
        &self,
        basket: &dyn BasketView,
        prices: &dyn PriceSource<'a>,
        currency: &'a Currency,
    ) -> Result<Money<'a, Currency>, OfferError> {
        let mut lines = eligible_lines(&self.products, basket, prices, currency)?;
        let group_size = u64::from(self.group_size.get());

        let discount_minor = match self.allocation {
            Allocation::CarryOver => carry_over(&mut lines, group_size)?,
            Allocation::CheapestFirst => cheapest_first(&mut lines, group_size)?,
        };

        Ok(Money::from_minor(discount_minor, currency))
    }
}

/// Most expensive first; equal prices fall back to product name so the walk is
/// independent of basket iteration order.
fn by_price_descending(a: &EligibleLine<'_, '_>, b: &EligibleLine<'_, '_>) -> Ordering {
    b.unit_minor()
        .cmp(&a.unit_minor())
        .then_with(|| a.product.cmp(b.product))
}

/// Cheapest first; equal prices ordered by product name.
fn by_price_ascending(a: &EligibleLine<'_, '_>, b: &EligibleLine<'_, '_>) -> Ordering {
    a.unit_minor()
        .cmp(&b.unit_minor())
        .then_with(|| a.product.cmp(b.product))
}

fn carry_over(lines: &mut [EligibleLine<'_, '_>], group_size: u64) -> Result<i64, OfferError> {
    lines.sort_by(by_price_descending);

    let mut remainder = 0_u64;
    let mut discount = 0_i64;

    for line in &*lines {
        let pool = u64::from(line.quantity) + remainder;
        let free = pool / group_size;

        if free > 0 {
            discount = discount
                .checked_add(units_cost(line, free)?)
                .ok_or(OfferError::Overflow)?;
        }

        remainder = pool % group_size;
    }

    Ok(discount)
}

fn cheapest_first(lines: &mut [EligibleLine<'_, '_>], group_size: u64) -> Result<i64, OfferError> {
    lines.sort_by(by_price_ascending);

    let eligible_units: u64 = lines.iter().map(|line| u64::from(line.quantity)).sum();
    let mut free = eligible_units / group_size;
    let mut discount = 0_i64;

    for line in &*lines {
        if free == 0 {
            break;
        }

        let taken = free.min(u64::from(line.quantity));

        discount = discount
            .checked_add(units_cost(line, taken)?)
            .ok_or(OfferError::Overflow)?;

        free -= taken;
    }

    Ok(discount)
}

/// Cost of `units` units at the line's unit price, in minor units.
fn units_cost(line: &EligibleLine<'_, '_>, units: u64) -> Result<i64, OfferError> {
    let units = i64::try_from(units).map_err(|_err| OfferError::Overflow)?;

    line.unit_minor()
        .checked_mul(units)
        .ok_or(OfferError::Overflow)
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::GBP;
    use testresult::TestResult;

    use crate::{basket::Basket, pricing::Catalogue};

    use super::*;

    const BRIES: [&str; 3] = ["Brie (Large)", "Brie (Medium)", "Brie (Small)"];

    fn cheeses<'a>() -> Catalogue<'a> {
        Catalogue::with_prices([
            ("Cheddar", Money::from_minor(100, GBP)),
            ("Brie (Small)", Money::from_minor(130, GBP)),
            ("Brie (Medium)", Money::from_minor(289, GBP)),
            ("Brie (Large)", Money::from_minor(350, GBP)),
            ("Wensleydale", Money::from_minor(289, GBP)),
        ])
    }

    fn discount_minor(offer: &BuyNGetCheapestFree, basket: &Basket) -> Result<i64, OfferError> {
        Ok(offer.discount(basket, &cheeses(), GBP)?.to_minor_units())
    }

    #[test]
    fn new_rejects_zero_group_size() {
        let result = BuyNGetCheapestFree::new(["Cheddar"], 0);

        assert_eq!(result.err(), Some(OfferError::InvalidGroupSize));
    }

    #[test]
    fn new_defaults_to_carry_over() -> TestResult {
        let offer = BuyNGetCheapestFree::new(["Cheddar"], 3)?;

        assert_eq!(offer.allocation(), Allocation::CarryOver);
        assert_eq!(offer.group_size(), 3);
        assert_eq!(offer.name(), "Buy 3 get cheapest free on Cheddar");

        Ok(())
    }

    #[test]
    fn fewer_than_n_units_are_not_discounted() -> TestResult {
        let offer = BuyNGetCheapestFree::new(["Cheddar"], 3)?;

        for quantity in [0, 1, 2] {
            let basket = Basket::with_items([("Cheddar", quantity)])?;

            assert_eq!(discount_minor(&offer, &basket)?, 0);
        }

        Ok(())
    }

    #[test]
    fn exactly_n_units_frees_one_unit() -> TestResult {
        let offer = BuyNGetCheapestFree::new(["Cheddar"], 3)?;
        let basket = Basket::with_items([("Cheddar", 3)])?;

        assert_eq!(discount_minor(&offer, &basket)?, 100);

        Ok(())
    }

    #[test]
    fn partial_groups_are_not_discounted() -> TestResult {
        let offer = BuyNGetCheapestFree::new(["Cheddar"], 3)?;
        let basket = Basket::with_items([("Cheddar", 7)])?;

        assert_eq!(discount_minor(&offer, &basket)?, 200);

        Ok(())
    }

    #[test]
    fn group_size_of_one_makes_everything_free() -> TestResult {
        let offer = BuyNGetCheapestFree::new(BRIES, 1)?;
        let basket = Basket::with_items([("Brie (Large)", 2), ("Brie (Small)", 1)])?;

        assert_eq!(discount_minor(&offer, &basket)?, 830);

        Ok(())
    }

    #[test]
    fn units_are_counted_across_the_eligible_set() -> TestResult {
        let basket = Basket::with_items([
            ("Brie (Large)", 1),
            ("Brie (Medium)", 1),
            ("Brie (Small)", 1),
        ])?;

        let carry_over = BuyNGetCheapestFree::new(BRIES, 3)?;
        let cheapest_first = carry_over.clone().with_allocation(Allocation::CheapestFirst);

        assert_eq!(discount_minor(&carry_over, &basket)?, 130);
        assert_eq!(discount_minor(&cheapest_first, &basket)?, 130);

        Ok(())
    }

    #[test]
    fn carry_over_discounts_at_the_completing_line_price() -> TestResult {
        let offer = BuyNGetCheapestFree::new(BRIES, 3)?;
        let basket = Basket::with_items([
            ("Brie (Large)", 2),
            ("Brie (Medium)", 2),
            ("Brie (Small)", 2),
        ])?;

        // Large x2 carries 2; Medium completes a group (2.89) and carries 1;
        // Small completes the second group (1.30).
        assert_eq!(discount_minor(&offer, &basket)?, 419);

        Ok(())
    }

    #[test]
    fn cheapest_first_discounts_the_cheapest_units() -> TestResult {
        let offer = BuyNGetCheapestFree::new(BRIES, 3)?.with_allocation(Allocation::CheapestFirst);
        let basket = Basket::with_items([
            ("Brie (Large)", 2),
            ("Brie (Medium)", 2),
            ("Brie (Small)", 2),
        ])?;

        assert_eq!(discount_minor(&offer, &basket)?, 260);

        Ok(())
    }

    #[test]
    fn cheapest_first_spills_into_the_next_line() -> TestResult {
        let offer = BuyNGetCheapestFree::new(BRIES, 2)?.with_allocation(Allocation::CheapestFirst);
        let basket = Basket::with_items([("Brie (Large)", 5), ("Brie (Small)", 1)])?;

        // Three free units: the single Small, then two Large.
        assert_eq!(discount_minor(&offer, &basket)?, 130 + 2 * 350);

        Ok(())
    }

    #[test]
    fn equal_prices_break_ties_by_product_name() -> TestResult {
        let offer = BuyNGetCheapestFree::new(["Brie (Medium)", "Wensleydale", "Cheddar"], 2)?;
        let basket = Basket::with_items([
            ("Wensleydale", 1),
            ("Brie (Medium)", 1),
            ("Cheddar", 1),
        ])?;

        // Brie (Medium) then Wensleydale (both 2.89) complete the only group.
        assert_eq!(discount_minor(&offer, &basket)?, 289);

        Ok(())
    }

    #[test]
    fn ineligible_products_are_ignored() -> TestResult {
        let offer = BuyNGetCheapestFree::new(["Cheddar"], 2)?;
        let basket = Basket::with_items([("Cheddar", 1), ("Brie (Large)", 5)])?;

        assert_eq!(discount_minor(&offer, &basket)?, 0);

        Ok(())
    }

    #[test]
    fn repeated_calls_are_identical() -> TestResult {
        let offer = BuyNGetCheapestFree::new(BRIES, 3)?;
        let basket = Basket::with_items([("Brie (Large)", 4), ("Brie (Small)", 5)])?;

        assert_eq!(discount_minor(&offer, &basket)?, discount_minor(&offer, &basket)?);

        Ok(())
    }
}
