//! Slicer prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    basket::{Basket, BasketError, BasketView},
    calculator::{AppliedOffer, CalcError, Calculator, Total},
    fixtures::{Fixture, FixtureError},
    offers::{
        Offer, OfferError,
        buy_n::{Allocation, BuyNGetCheapestFree},
        eligible::EligibleProducts,
        percentage::PercentageDiscount,
    },
    pricing::{Catalogue, PriceSource, PricingError},
    receipt::{Receipt, ReceiptError, ReceiptLine},
};
