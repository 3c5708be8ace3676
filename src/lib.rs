//! Slicer
//!
//! Slicer prices a basket of products against a catalogue and applies a set of
//! promotional offers, producing a subtotal, total discount and final total.

pub mod basket;
pub mod calculator;
pub mod fixtures;
pub mod offers;
pub mod prelude;
pub mod pricing;
pub mod receipt;
