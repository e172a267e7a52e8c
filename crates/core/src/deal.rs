//! Deal records flowing through the pipeline.

use crate::Price;
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// A raw item surfaced by the source's deal search, pending verification.
///
/// The source's own discount estimate (`reported_discount`) is carried
/// for log context but the pipeline recomputes the discount from
/// authoritative detail before acting on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    /// Catalog identifier (ASIN).
    pub asin: CompactString,
    /// Display title.
    pub title: String,
    /// Discount percent as estimated by the source.
    pub reported_discount: Option<i32>,
    /// Sales/order count reported by the source.
    pub order_count: Option<u32>,
    /// Per-customer order limit reported by the source.
    pub order_limit: Option<u32>,
}

/// A verified deal, ready for rendering and dispatch.
///
/// Only constructed once both prices are present and the recomputed
/// discount clears the announcement floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatedDeal {
    pub asin: CompactString,
    pub title: String,
    /// Authoritative current price.
    pub current: Price,
    /// Reference average price the discount was computed against.
    pub average: Price,
    /// Recomputed discount percent.
    pub discount: i32,
    pub order_count: Option<u32>,
    pub order_limit: Option<u32>,
    /// Primary product image reference, for the notification thumbnail.
    pub image: Option<String>,
}
