//! Fixtures
//!
//! Catalogues, baskets and offer sets described in YAML. A fixture directory
//! holds one sub-directory per kind:
//!
//! ```text
//! fixtures/
//!   catalogues/<name>.yml
//!   baskets/<name>.yml
//!   offers/<name>.yml
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::debug;

use crate::{
    basket::{Basket, BasketError},
    calculator::Calculator,
    fixtures::{catalogue::CatalogueFixture, offers::OffersFixture},
    offers::{Offer, OfferError},
    pricing::Catalogue,
};

pub mod catalogue;
pub mod offers;

/// Wrapper for basket quantities in YAML
#[derive(Debug, Deserialize)]
pub struct BasketFixture {
    /// Map of product name -> quantity
    pub items: FxHashMap<String, u32>,
}

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file {}: {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Currency mismatch between products
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// No catalogue loaded yet
    #[error("No catalogue loaded yet; currency unknown")]
    NoCurrency,

    /// Invalid offer data
    #[error("Invalid offer data: {0}")]
    InvalidOfferData(String),

    /// Offer construction error
    #[error("Invalid offer: {0}")]
    Offer(#[from] OfferError),

    /// Basket creation error
    #[error("Failed to create basket: {0}")]
    Basket(#[from] BasketError),
}

/// Fixture
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Loaded unit prices
    catalogue: Catalogue<'static>,

    /// Loaded basket quantities
    basket: Basket,

    /// Loaded offers, in evaluation order
    offers: Vec<Box<dyn Offer<'static>>>,

    /// Currency for the fixture set
    currency: Option<&'static Currency>,
}

impl Fixture {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            catalogue: Catalogue::new(),
            basket: Basket::new(),
            offers: Vec::new(),
            currency: None,
        }
    }

    /// Load catalogue prices from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if its prices
    /// are not all in the currency already loaded.
    #[tracing::instrument(skip(self))]
    pub fn load_catalogue(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: CatalogueFixture = self.read("catalogues", name)?;

        for (product, price) in fixture.products {
            let (minor_units, currency) = catalogue::parse_price(&price)?;

            if let Some(existing_currency) = self.currency {
                if existing_currency != currency {
                    return Err(FixtureError::CurrencyMismatch(
                        existing_currency.iso_alpha_code.to_string(),
                        currency.iso_alpha_code.to_string(),
                    ));
                }
            } else {
                self.currency = Some(currency);
            }

            self.catalogue
                .insert(product, Money::from_minor(minor_units, currency));
        }

        debug!(products = self.catalogue.len(), "loaded catalogue");

        Ok(self)
    }

    /// Load basket quantities from a YAML fixture file, adding to any already loaded
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if a quantity overflows.
    #[tracing::instrument(skip(self))]
    pub fn load_basket(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: BasketFixture = self.read("baskets", name)?;

        for (product, quantity) in fixture.items {
            self.basket.add(product, quantity)?;
        }

        debug!(products = self.basket.len(), "loaded basket");

        Ok(self)
    }

    /// Load offers from a YAML fixture file, appending to any already loaded
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if an offer is invalid.
    #[tracing::instrument(skip(self))]
    pub fn load_offers(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: OffersFixture = self.read("offers", name)?;

        for offer_fixture in fixture.offers {
            let offer = offer_fixture.try_into_offer()?;

            debug!(offer = offer.name(), "loaded offer");

            self.offers.push(offer);
        }

        Ok(self)
    }

    /// Load a catalogue, basket and offer set sharing one name
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn load_set(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        self.load_catalogue(name)?
            .load_basket(name)?
            .load_offers(name)
    }

    /// Load a complete fixture set from the default base path
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture.load_set(name)?;

        Ok(fixture)
    }

    /// Get the base path
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Get the loaded catalogue
    pub fn catalogue(&self) -> &Catalogue<'static> {
        &self.catalogue
    }

    /// Get the loaded basket
    pub fn basket(&self) -> &Basket {
        &self.basket
    }

    /// Get the loaded offers
    pub fn offers(&self) -> &[Box<dyn Offer<'static>>] {
        &self.offers
    }

    /// Get the currency
    ///
    /// # Errors
    ///
    /// Returns an error if no catalogue has been loaded yet.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        self.currency.ok_or(FixtureError::NoCurrency)
    }

    /// Build a calculator from the loaded catalogue and offers, returning it
    /// alongside the loaded basket.
    ///
    /// # Errors
    ///
    /// Returns an error if no catalogue has been loaded yet.
    pub fn into_parts(
        self,
    ) -> Result<(Calculator<'static, Catalogue<'static>>, Basket), FixtureError> {
        let currency = self.currency()?;
        let calculator = Calculator::from_offers(currency, self.catalogue, self.offers);

        Ok((calculator, self.basket))
    }

    fn read<T: DeserializeOwned>(&self, kind: &str, name: &str) -> Result<T, FixtureError> {
        let file_path = self.base_path.join(kind).join(format!("{name}.yml"));
        let contents =
            fs::read_to_string(&file_path).map_err(|err| FixtureError::Io(file_path, err))?;

        Ok(serde_norway::from_str(&contents)?)
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}
