//! Wire types for the pricing API.
//!
//! Prices arrive as integer minor units with -1 meaning "no data".
//! Timestamps arrive in keepa minutes: minutes since epoch, offset by
//! a fixed constant to fit smaller integers on the wire.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Offset added to keepa minutes to recover unix minutes.
pub const KEEPA_EPOCH_OFFSET_MINUTES: i64 = 21_564_000;

/// Convert a keepa-minute timestamp to UTC.
pub fn keepa_minutes_to_utc(minutes: i64) -> DateTime<Utc> {
    let unix_ms = (minutes + KEEPA_EPOCH_OFFSET_MINUTES) * 60_000;
    Utc.timestamp_millis_opt(unix_ms).single().unwrap_or_default()
}

/// History series indices in the `csv` array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum SeriesIndex {
    /// Marketplace (Amazon) price history.
    Amazon = 0,
    /// New-condition price history.
    New = 1,
    /// Used-condition price history.
    Used = 2,
}

/// Summary statistics block of a product.
///
/// `avg` is kept as raw JSON: it should be an object keyed by offer
/// condition (`NEW`, `NEW_FBA`, `NEW_FBM`) but the source is known to
/// occasionally ship it as a bare list, which callers must reject.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Stats {
    /// Buy-box price in minor units, -1 when no buy box exists.
    #[serde(rename = "buyBoxPrice")]
    pub buy_box_price: Option<i64>,
    /// Average price per offer condition over the stats window.
    pub avg: Option<serde_json::Value>,
}

/// A live marketplace offer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
    /// Offer price in minor units, -1 when unknown.
    #[serde(default = "sentinel_price")]
    pub price: i64,
    /// Whether the offer is currently live.
    #[serde(default)]
    pub live: bool,
}

fn sentinel_price() -> i64 {
    -1
}

/// Full record for one identifier: live offers, summary statistics,
/// and (when requested) raw price history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductDetail {
    pub asin: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub stats: Option<Stats>,
    #[serde(default)]
    pub offers: Option<Vec<Offer>>,
    /// Price history per series index. Each present series is an
    /// interleaved `[keepa_minute, price, keepa_minute, price, ...]` row.
    #[serde(default)]
    pub csv: Option<Vec<Option<Vec<i64>>>>,
    /// Comma-separated image references, primary first.
    #[serde(rename = "imagesCSV", default)]
    pub images_csv: Option<String>,
}

impl ProductDetail {
    /// Primary image reference, if any.
    pub fn primary_image(&self) -> Option<&str> {
        self.images_csv
            .as_deref()
            .and_then(|csv| csv.split(',').next())
            .filter(|s| !s.is_empty())
    }

    /// The raw history row for one series index, if present and non-empty.
    pub fn series(&self, index: SeriesIndex) -> Option<&[i64]> {
        self.series_at(index as usize)
    }

    /// The raw history row at an arbitrary csv position.
    pub fn series_at(&self, index: usize) -> Option<&[i64]> {
        self.csv
            .as_ref()?
            .get(index)?
            .as_deref()
            .filter(|row| !row.is_empty())
    }
}

/// Knobs for a product detail fetch.
#[derive(Debug, Clone, Copy)]
pub struct DetailOptions {
    /// Number of live offers to include.
    pub offers: u8,
    /// Statistics window in days.
    pub stats_days: u16,
    /// Whether to include the bulk price history.
    pub history: bool,
}

impl Default for DetailOptions {
    fn default() -> Self {
        Self {
            offers: 20,
            stats_days: 90,
            history: false,
        }
    }
}

impl DetailOptions {
    /// Options for a history fetch (chart rendering).
    pub fn with_history() -> Self {
        Self {
            history: true,
            ..Self::default()
        }
    }
}
