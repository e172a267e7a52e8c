//! Ordered-preference price lookup over a JSON object view.

use dealwatch_core::Price;
use serde_json::{Map, Value};

/// Return the first usable price among `keys`, in order. Missing keys,
/// nulls, non-numeric values, and the source's negative "no data"
/// sentinel all fall through to the next preference.
pub fn first_usable_price(view: &Map<String, Value>, keys: &[&str]) -> Option<Price> {
    keys.iter().find_map(|key| {
        view.get(*key)
            .and_then(Value::as_i64)
            .and_then(Price::from_minor_units)
    })
}
