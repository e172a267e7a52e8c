//! Deal search filter profile.

use serde::{Deserialize, Serialize};
use serde_json::json;

/// Offer condition codes accepted in a deal search.
pub const CONDITION_NEW: u8 = 1;

/// Filter profile sent with a deal search.
///
/// The poll cycle runs a single fixed profile; the fields mirror the
/// source's selection document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealFilter {
    /// Marketplace/domain identifier.
    pub domain_id: u8,
    /// Category IDs excluded from results.
    pub excluded_categories: Vec<u64>,
    /// Maximum current price in minor units.
    pub price_ceiling: Option<i64>,
    /// Minimum drop against the average, in percent.
    pub min_delta_percent: i32,
    /// Offer condition codes to include.
    pub conditions: Vec<u8>,
    /// Collapse variations to a single representative item.
    pub single_variation: bool,
}

impl Default for DealFilter {
    fn default() -> Self {
        Self {
            domain_id: 1,
            // Gift cards and digital content produce noise deals
            excluded_categories: vec![2_238_192_011, 9_013_971_011],
            price_ceiling: Some(50_000),
            min_delta_percent: 20,
            conditions: vec![CONDITION_NEW],
            single_variation: true,
        }
    }
}

impl DealFilter {
    /// Build the JSON selection document the deal endpoint expects.
    pub fn to_selection(&self, page: u32) -> serde_json::Value {
        let mut selection = json!({
            "page": page,
            "domainId": self.domain_id,
            "excludeCategories": self.excluded_categories,
            "deltaPercentRange": [self.min_delta_percent, 100],
            "filterErotic": true,
            "singleVariation": self.single_variation,
            "isRangeEnabled": true,
        });
        if !self.conditions.is_empty() {
            selection["material"] = json!(self.conditions);
        }
        if let Some(ceiling) = self.price_ceiling {
            selection["currentRange"] = json!([0, ceiling]);
        }
        selection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_selection_carries_profile() {
        let filter = DealFilter::default();
        let selection = filter.to_selection(0);

        assert_eq!(selection["domainId"], 1);
        assert_eq!(selection["deltaPercentRange"][0], 20);
        assert_eq!(selection["currentRange"][1], 50_000);
        assert_eq!(selection["singleVariation"], true);
        assert!(selection["excludeCategories"].as_array().unwrap().len() >= 2);
    }

    #[test]
    fn test_selection_omits_absent_ceiling() {
        let filter = DealFilter {
            price_ceiling: None,
            ..Default::default()
        };
        let selection = filter.to_selection(0);
        assert!(selection.get("currentRange").is_none());
    }
}
