//! Basket

use rustc_hash::FxHashMap;
use thiserror::Error;

/// Errors related to basket construction.
#[derive(Debug, Error, PartialEq)]
pub enum BasketError {
    /// Adding to a line would overflow its quantity (product name).
    #[error("quantity overflow for product {0}")]
    QuantityOverflow(String),
}

/// Read-only view over a basket snapshot.
///
/// Implementations must present a consistent snapshot for the duration of a
/// calculation; the calculator and every offer read it independently.
pub trait BasketView {
    /// Distinct product identifiers present in the basket, in no particular order.
    fn products(&self) -> Vec<&str>;

    /// Quantity held for `product`, or zero when it is absent.
    fn quantity(&self, product: &str) -> u32;

    /// Whether the basket holds no products at all.
    fn is_empty(&self) -> bool {
        self.products().is_empty()
    }
}

impl<T: BasketView + ?Sized> BasketView for &T {
    fn products(&self) -> Vec<&str> {
        (**self).products()
    }

    fn quantity(&self, product: &str) -> u32 {
        (**self).quantity(product)
    }
}

/// Basket
///
/// Product name to quantity. Zero quantities are kept, so a product can be
/// present without contributing to any total.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Basket {
    items: FxHashMap<String, u32>,
}

impl Basket {
    /// Create a new, empty basket.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new basket with the given product quantities.
    ///
    /// Repeated products have their quantities summed.
    ///
    /// # Errors
    ///
    /// Returns a `BasketError` if a summed quantity overflows.
    pub fn with_items<I, S>(items: I) -> Result<Self, BasketError>
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        let mut basket = Self::new();

        for (product, quantity) in items {
            basket.add(product, quantity)?;
        }

        Ok(basket)
    }

    /// Add `quantity` units of `product`.
    ///
    /// # Errors
    ///
    /// Returns a `BasketError` if the line quantity overflows.
    pub fn add(
        &mut self,
        product: impl Into<String>,
        quantity: u32,
    ) -> Result<&mut Self, BasketError> {
        let product = product.into();
        let line = self.items.entry(product.clone()).or_default();

        *line = line
            .checked_add(quantity)
            .ok_or(BasketError::QuantityOverflow(product))?;

        Ok(self)
    }

    /// Get the number of distinct products in the basket.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the basket is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate over `(product, quantity)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.items
            .iter()
            .map(|(product, quantity)| (product.as_str(), *quantity))
    }
}

impl BasketView for Basket {
    fn products(&self) -> Vec<&str> {
        self.items.keys().map(String::as_str).collect()
    }

    fn quantity(&self, product: &str) -> u32 {
        self.items.get(product).copied().unwrap_or_default()
    }

    fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn new_basket_is_empty() {
        let basket = Basket::new();

        assert!(basket.is_empty());
        assert_eq!(basket.len(), 0);
        assert!(BasketView::products(&basket).is_empty());
    }

    #[test]
    fn with_items_sums_repeated_products() -> TestResult {
        let basket = Basket::with_items([("Cheddar", 2), ("Edam", 1), ("Cheddar", 3)])?;

        assert_eq!(basket.len(), 2);
        assert_eq!(basket.quantity("Cheddar"), 5);
        assert_eq!(basket.quantity("Edam"), 1);

        Ok(())
    }

    #[test]
    fn quantity_of_absent_product_is_zero() -> TestResult {
        let basket = Basket::with_items([("Cheddar", 2)])?;

        assert_eq!(basket.quantity("Camembert"), 0);

        Ok(())
    }

    #[test]
    fn zero_quantity_lines_are_reported() -> TestResult {
        let basket = Basket::with_items([("Cheddar", 0)])?;

        assert_eq!(basket.products(), vec!["Cheddar"]);
        assert_eq!(basket.quantity("Cheddar"), 0);

        Ok(())
    }

    #[test]
    fn add_rejects_quantity_overflow() -> TestResult {
        let mut basket = Basket::with_items([("Cheddar", u32::MAX)])?;

        let result = basket.add("Cheddar", 1);

        assert_eq!(
            result.err(),
            Some(BasketError::QuantityOverflow("Cheddar".to_string()))
        );

        Ok(())
    }

    #[test]
    fn products_are_distinct() -> TestResult {
        let mut basket = Basket::new();

        basket.add("Edam", 1)?.add("Edam", 1)?.add("Brie (Small)", 4)?;

        let mut products = basket.products();
        products.sort_unstable();

        assert_eq!(products, vec!["Brie (Small)", "Edam"]);

        Ok(())
    }

    #[test]
    fn references_delegate_to_the_basket() -> TestResult {
        let basket = Basket::with_items([("Edam", 2)])?;
        let view: &dyn BasketView = &basket;

        assert_eq!((&view).quantity("Edam"), 2);
        assert!(!(&view).is_empty());

        Ok(())
    }
}
