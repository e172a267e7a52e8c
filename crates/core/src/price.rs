//! Price representation and discount math.

use serde::{Deserialize, Serialize};

/// Fixed-point price in cents (minor currency units).
/// Used instead of floats so price comparisons and dedup records are exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Price(pub i64);

impl Price {
    /// Scale factor: cents per whole currency unit.
    pub const SCALE: i64 = 100;

    /// Convert a raw minor-unit value from the source into a price.
    ///
    /// The source encodes "no data" as a negative sentinel (typically -1),
    /// so any negative value is treated as unavailable.
    pub fn from_minor_units(raw: i64) -> Option<Self> {
        if raw < 0 {
            return None;
        }
        Some(Self(raw))
    }

    /// Normalize an optional raw minor-unit value. Missing or sentinel
    /// values degrade to `None`, never to an error.
    pub fn normalize(raw: Option<i64>) -> Option<Self> {
        raw.and_then(Self::from_minor_units)
    }

    /// Create from f64 dollars, rounded to the nearest cent.
    /// Display/persistence convenience, not used in the hot path.
    pub fn from_f64(value: f64) -> Self {
        Self((value * Self::SCALE as f64).round() as i64)
    }

    /// Convert to f64 dollars (for display and the dedup record).
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / Self::SCALE as f64
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.to_f64())
    }
}

/// Render an optional price as `"$12.34"`, or `"N/A"` when unavailable.
/// Display path only; the result never feeds back into arithmetic.
pub fn money_or_na(price: Option<Price>) -> String {
    match price {
        Some(p) => format!("${p}"),
        None => "N/A".to_string(),
    }
}

/// Discount percent of `current` against `average`:
/// `round(((A - C) / A) * 100)`.
///
/// Returns `None` when the average is zero or negative: the division
/// is uncomputable and the caller skips the item. The result is not
/// clamped: a current price above average yields a negative percent
/// (filtered later by the tier floor), and > 100 passes through.
pub fn discount_percent(current: Price, average: Price) -> Option<i32> {
    if average.0 <= 0 {
        return None;
    }
    let pct = ((average.0 - current.0) as f64 / average.0 as f64) * 100.0;
    Some(pct.round() as i32)
}
