//! Eligible Products
//!
//! The set of product identifiers an offer applies to, kept sorted and
//! de-duplicated so membership is a binary search.

use std::string::ToString;

use smallvec::SmallVec;

/// A normalised set of eligible product identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EligibleProducts {
    products: SmallVec<[String; 5]>,
}

impl EligibleProducts {
    /// Create a new eligible set, sorting and de-duplicating `products`.
    pub fn new<I, S>(products: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut products: SmallVec<[String; 5]> = products
            .into_iter()
            .map(|product| product.as_ref().to_string())
            .collect();

        products.sort();
        products.dedup();

        Self { products }
    }

    /// Whether `product` is in the set.
    pub fn contains(&self, product: &str) -> bool {
        self.products
            .binary_search_by(|candidate| candidate.as_str().cmp(product))
            .is_ok()
    }

    /// Iterate over the products in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.products.iter().map(String::as_str)
    }

    /// Number of distinct products in the set.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Convert the set to owned strings, in ascending order.
    #[must_use]
    pub fn to_strs(&self) -> SmallVec<[String; 5]> {
        self.products.iter().map(ToString::to_string).collect()
    }
}

impl<S: AsRef<str>> FromIterator<S> for EligibleProducts {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}
