//! Discount tier routing.
//!
//! Maps a computed discount percent to one of four delivery tiers.
//! Bands are half-open and evaluated descending, so a boundary value
//! (exactly 90) resolves to the higher tier.

use serde::{Deserialize, Serialize};

/// Minimum discount percent worth announcing. Anything below is suppressed.
pub const MIN_DISCOUNT_PERCENT: i32 = 20;

/// Delivery tier for a qualifying discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiscountTier {
    /// 90% and up.
    Tier90,
    /// [80, 90)
    Tier80,
    /// [70, 80)
    Tier70,
    /// [20, 70)
    Tier20,
}

impl DiscountTier {
    /// Route a discount percent to its tier. Uncomputable (`None`) input
    /// and anything below the floor route to no tier.
    pub fn route(percent: Option<i32>) -> Option<Self> {
        let pct = percent?;
        if pct >= 90 {
            Some(Self::Tier90)
        } else if pct >= 80 {
            Some(Self::Tier80)
        } else if pct >= 70 {
            Some(Self::Tier70)
        } else if pct >= MIN_DISCOUNT_PERCENT {
            Some(Self::Tier20)
        } else {
            None
        }
    }

    /// Inclusive lower bound of this tier's band.
    pub fn threshold(self) -> i32 {
        match self {
            Self::Tier90 => 90,
            Self::Tier80 => 80,
            Self::Tier70 => 70,
            Self::Tier20 => MIN_DISCOUNT_PERCENT,
        }
    }

    /// Short label used in logs.
    pub fn label(self) -> &'static str {
        match self {
            Self::Tier90 => "90%+",
            Self::Tier80 => "80%+",
            Self::Tier70 => "70%+",
            Self::Tier20 => "20%+",
        }
    }
}

impl std::fmt::Display for DiscountTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
