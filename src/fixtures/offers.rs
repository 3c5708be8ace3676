//! Offer Fixtures

use rust_decimal::{Decimal, prelude::FromPrimitive};
use serde::Deserialize;

use crate::{
    fixtures::FixtureError,
    offers::{
        Offer,
        buy_n::{Allocation, BuyNGetCheapestFree},
        percentage::PercentageDiscount,
    },
};

/// Wrapper for offers in YAML
#[derive(Debug, Deserialize)]
pub struct OffersFixture {
    /// Offers, in evaluation order
    pub offers: Vec<OfferFixture>,
}

/// Offer fixture from YAML
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OfferFixture {
    /// Percentage off every eligible line
    PercentageDiscount {
        /// Display name; generated from the offer when omitted
        #[serde(default)]
        name: Option<String>,

        /// Eligible product names
        products: Vec<String>,

        /// Percentage points off (`25` is 25% off)
        percent: f64,
    },

    /// Buy N, get the cheapest free
    BuyNGetCheapestFree {
        /// Display name; generated from the offer when omitted
        #[serde(default)]
        name: Option<String>,

        /// Eligible product names
        products: Vec<String>,

        /// Group size
        n: u32,

        /// Free unit allocation policy
        #[serde(default)]
        allocation: AllocationFixture,
    },
}

/// Allocation policy from YAML
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AllocationFixture {
    /// See [`Allocation::CarryOver`]
    #[default]
    CarryOver,

    /// See [`Allocation::CheapestFirst`]
    CheapestFirst,
}

impl From<AllocationFixture> for Allocation {
    fn from(fixture: AllocationFixture) -> Self {
        match fixture {
            AllocationFixture::CarryOver => Allocation::CarryOver,
            AllocationFixture::CheapestFirst => Allocation::CheapestFirst,
        }
    }
}

impl OfferFixture {
    /// Convert to a boxed [`Offer`]
    ///
    /// # Errors
    ///
    /// Returns an error if the percentage is not a finite number or the offer
    /// rejects its configuration.
    pub fn try_into_offer(self) -> Result<Box<dyn Offer<'static>>, FixtureError> {
        match self {
            OfferFixture::PercentageDiscount {
                name,
                products,
                percent,
            } => {
                let percent = Decimal::from_f64(percent).ok_or_else(|| {
                    FixtureError::InvalidOfferData(format!("percent is not a number: {percent}"))
                })?;

                let mut offer = PercentageDiscount::new(&products, percent)?;

                if let Some(name) = name {
                    offer = offer.with_name(name);
                }

                Ok(Box::new(offer))
            }
            OfferFixture::BuyNGetCheapestFree {
                name,
                products,
                n,
                allocation,
            } => {
                let mut offer =
                    BuyNGetCheapestFree::new(&products, n)?.with_allocation(allocation.into());

                if let Some(name) = name {
                    offer = offer.with_name(name);
                }

                Ok(Box::new(offer))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::offers::OfferError;

    use super::*;

    #[test]
    fn offer_fixture_parses_percentage_discount() -> Result<(), FixtureError> {
        let yaml = r"
type: percentage_discount
name: Edam Week
products: [Edam]
percent: 25
";
        let fixture: OfferFixture = serde_norway::from_str(yaml)?;
        let offer = fixture.try_into_offer()?;

        assert_eq!(offer.name(), "Edam Week");

        Ok(())
    }

    #[test]
    fn offer_fixture_generates_missing_names() -> Result<(), FixtureError> {
        let yaml = r"
type: buy_n_get_cheapest_free
products: [Cheddar]
n: 3
";
        let fixture: OfferFixture = serde_norway::from_str(yaml)?;

        assert!(matches!(
            fixture,
            OfferFixture::BuyNGetCheapestFree {
                allocation: AllocationFixture::CarryOver,
                ..
            }
        ));

        let offer = fixture.try_into_offer()?;

        assert_eq!(offer.name(), "Buy 3 get cheapest free on Cheddar");

        Ok(())
    }

    #[test]
    fn offer_fixture_parses_allocation() -> Result<(), FixtureError> {
        let yaml = r"
type: buy_n_get_cheapest_free
products: [Brie (Small), Brie (Large)]
n: 3
allocation: cheapest_first
";
        let fixture: OfferFixture = serde_norway::from_str(yaml)?;

        assert!(matches!(
            fixture,
            OfferFixture::BuyNGetCheapestFree {
                allocation: AllocationFixture::CheapestFirst,
                ..
            }
        ));

        Ok(())
    }

    #[test]
    fn offer_fixture_rejects_unknown_type() {
        let yaml = r"
type: buy_one_get_two
products: [Cheddar]
";
        let result: Result<OfferFixture, _> = serde_norway::from_str(yaml);

        assert!(result.is_err());
    }

    #[test]
    fn offer_fixture_rejects_unknown_allocation() {
        let yaml = r"
type: buy_n_get_cheapest_free
products: [Cheddar]
n: 3
allocation: most_expensive_first
";
        let result: Result<OfferFixture, _> = serde_norway::from_str(yaml);

        assert!(result.is_err());
    }

    #[test]
    fn offer_fixture_propagates_offer_validation() {
        let fixture = OfferFixture::BuyNGetCheapestFree {
            name: None,
            products: vec!["Cheddar".to_string()],
            n: 0,
            allocation: AllocationFixture::default(),
        };

        let result = fixture.try_into_offer();

        assert!(matches!(
            result,
            Err(FixtureError::Offer(OfferError::InvalidGroupSize))
        ));
    }

    #[test]
    fn offer_fixture_rejects_non_finite_percent() {
        let fixture = OfferFixture::PercentageDiscount {
            name: None,
            products: vec!["Edam".to_string()],
            percent: f64::NAN,
        };

        let result = fixture.try_into_offer();

        assert!(matches!(result, Err(FixtureError::InvalidOfferData(_))));
    }
}
