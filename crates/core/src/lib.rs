//! Core data types for the deal watch pipeline.

pub mod deal;
pub mod price;
pub mod tier;

pub use deal::*;
pub use price::*;
pub use tier::*;
