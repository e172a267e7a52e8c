//! Client for the product-pricing data source.
//!
//! Two capabilities are consumed: listing deal candidates matching a
//! filter profile, and fetching full product detail (offers, summary
//! statistics, optional price history) for one identifier.

pub mod client;
pub mod error;
pub mod filter;
pub mod types;

pub use client::*;
pub use error::*;
pub use filter::*;
pub use types::*;
