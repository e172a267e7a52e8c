//! Deal evaluation engine.
//!
//! Re-prices each candidate from authoritative product detail, computes
//! the acted-on discount, routes it to a tier, and renders the
//! price-history chart attached to the notification.

pub mod chart;
pub mod evaluator;
pub mod lookup;

pub use chart::*;
pub use evaluator::*;
pub use lookup::*;
