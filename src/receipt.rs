//! Receipt

use std::io;

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};
use thiserror::Error;

use crate::{
    basket::BasketView,
    calculator::{CalcError, Calculator, Total},
    pricing::{PriceSource, PricingError, line_total_minor, unit_price},
};

/// Errors that can occur when building or writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Error calculating the basket total.
    #[error(transparent)]
    Calc(#[from] CalcError),

    /// Error pricing a basket line.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// IO error
    #[error("IO error")]
    IO,
}

/// One purchased basket line.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptLine<'a> {
    /// Product name
    pub product: String,

    /// Units purchased
    pub quantity: u32,

    /// Price per unit
    pub unit_price: Money<'a, Currency>,

    /// Unit price times quantity
    pub line_total: Money<'a, Currency>,
}

/// Final receipt for a priced basket.
#[derive(Debug, Clone)]
pub struct Receipt<'a> {
    /// Purchased lines, ordered by product name.
    lines: Vec<ReceiptLine<'a>>,

    /// Offers that granted a discount, in evaluation order.
    offers: Vec<(String, Money<'a, Currency>)>,

    /// Basket totals
    total: Total<'a>,
}

impl<'a> Receipt<'a> {
    /// Build a receipt for `basket`.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if the basket cannot be priced or an offer fails.
    pub fn new<P: PriceSource<'a>>(
        calculator: &Calculator<'a, P>,
        basket: &dyn BasketView,
    ) -> Result<Self, ReceiptError> {
        let mut products = basket.products();
        products.sort_unstable();

        let mut lines = Vec::with_capacity(products.len());

        for product in products {
            let quantity = basket.quantity(product);

            if quantity == 0 {
                continue;
            }

            let price = unit_price(calculator.prices(), product, calculator.currency())?;
            let line_minor = line_total_minor(product, &price, quantity)?;

            lines.push(ReceiptLine {
                product: product.to_string(),
                quantity,
                unit_price: price,
                line_total: Money::from_minor(line_minor, calculator.currency()),
            });
        }

        let (total, applied) = calculator.evaluate(basket)?;

        let offers = applied
            .into_iter()
            .filter(|offer| offer.discount.to_minor_units() != 0)
            .map(|offer| (offer.name.to_string(), offer.discount))
            .collect();

        Ok(Self {
            lines,
            offers,
            total,
        })
    }

    /// Purchased lines, ordered by product name
    pub fn lines(&self) -> &[ReceiptLine<'a>] {
        &self.lines
    }

    /// Offers that granted a discount, with the amount each granted
    pub fn offers(&self) -> &[(String, Money<'a, Currency>)] {
        &self.offers
    }

    /// Basket totals
    pub fn total(&self) -> Total<'a> {
        self.total
    }

    /// Write the receipt as a table followed by a summary.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiptError::IO`] if writing fails.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record(["Item", "Qty", "Unit Price", "Line Total"]);

        for line in &self.lines {
            builder.push_record([
                line.product.clone(),
                line.quantity.to_string(),
                line.unit_price.to_string(),
                line.line_total.to_string(),
            ]);
        }

        let mut table = builder.build();
        table.with(Style::modern_rounded());
        table.modify(Columns::new(1..4), Alignment::right());

        writeln!(out, "{table}").map_err(|_err| ReceiptError::IO)?;

        for (name, discount) in &self.offers {
            writeln!(out, " {name}: -{discount}").map_err(|_err| ReceiptError::IO)?;
        }

        let savings_points =
            (self.total.savings_percent() * Decimal::ONE * Decimal::ONE_HUNDRED).round_dp(2);

        writeln!(out, " Subtotal: {}", self.total.subtotal).map_err(|_err| ReceiptError::IO)?;
        writeln!(out, " Discount: {}", self.total.discount).map_err(|_err| ReceiptError::IO)?;
        writeln!(out, " Total: {}", self.total.total).map_err(|_err| ReceiptError::IO)?;
        writeln!(out, " Savings: {savings_points}%").map_err(|_err| ReceiptError::IO)
    }
}
