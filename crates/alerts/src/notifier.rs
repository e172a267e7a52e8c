//! Deal notification formatting and dispatch.

use crate::webhook::{
    DispatchError, Embed, EmbedField, EmbedThumbnail, WebhookClient, WebhookPayload,
};
use async_trait::async_trait;
use dealwatch_core::{money_or_na, DiscountTier, EvaluatedDeal};
use std::path::Path;
use tracing::info;

const PRODUCT_URL_PREFIX: &str = "https://www.amazon.com/dp/";
const IMAGE_URL_PREFIX: &str = "https://images-na.ssl-images-amazon.com/images/I/";
const EMBED_COLOR: u32 = 0x2E_CC71;

/// Delivery seam between the poll cycle and the webhook transport.
#[async_trait]
pub trait DealNotifier: Send + Sync {
    /// Deliver one deal to its tier endpoint, optionally with a chart
    /// attachment. A failed delivery returns an error; the caller does
    /// not retry within the cycle.
    async fn notify(
        &self,
        deal: &EvaluatedDeal,
        tier: DiscountTier,
        chart: Option<&Path>,
    ) -> Result<(), DispatchError>;
}

/// Webhook endpoint per discount tier.
#[derive(Debug, Clone)]
pub struct TierEndpoints {
    pub tier90: String,
    pub tier80: String,
    pub tier70: String,
    pub tier20: String,
}

impl TierEndpoints {
    pub fn endpoint(&self, tier: DiscountTier) -> &str {
        match tier {
            DiscountTier::Tier90 => &self.tier90,
            DiscountTier::Tier80 => &self.tier80,
            DiscountTier::Tier70 => &self.tier70,
            DiscountTier::Tier20 => &self.tier20,
        }
    }
}

/// Production notifier: formats an embed and posts it to the tier's
/// webhook endpoint.
pub struct Dispatcher {
    client: WebhookClient,
    endpoints: TierEndpoints,
}

impl Dispatcher {
    pub fn new(endpoints: TierEndpoints) -> Self {
        Self {
            client: WebhookClient::new(),
            endpoints,
        }
    }
}

/// Build the embed payload for one deal.
pub fn build_payload(deal: &EvaluatedDeal) -> WebhookPayload {
    let description = format!(
        "Current: **{}**\nAverage: **{}**\nDiscount: **{}%**",
        money_or_na(Some(deal.current)),
        money_or_na(Some(deal.average)),
        deal.discount,
    );

    let fields = vec![
        EmbedField::inline("ASIN", deal.asin.to_string()),
        EmbedField::inline("Orders", count_or_na(deal.order_count)),
        EmbedField::inline("Order limit", count_or_na(deal.order_limit)),
    ];

    let embed = Embed {
        title: Some(deal.title.clone()),
        url: Some(format!("{PRODUCT_URL_PREFIX}{}", deal.asin)),
        description: Some(description),
        color: Some(EMBED_COLOR),
        fields,
        thumbnail: deal.image.as_ref().map(|image| EmbedThumbnail {
            url: format!("{IMAGE_URL_PREFIX}{image}"),
        }),
        image: None,
    };

    WebhookPayload {
        username: Some("dealwatch".to_string()),
        embeds: vec![embed],
    }
}

fn count_or_na(count: Option<u32>) -> String {
    count.map_or_else(|| "N/A".to_string(), |n| n.to_string())
}

#[async_trait]
impl DealNotifier for Dispatcher {
    async fn notify(
        &self,
        deal: &EvaluatedDeal,
        tier: DiscountTier,
        chart: Option<&Path>,
    ) -> Result<(), DispatchError> {
        let payload = build_payload(deal);
        let endpoint = self.endpoints.endpoint(tier);
        self.client.send(endpoint, payload, chart).await?;
        info!(
            asin = %deal.asin,
            discount = deal.discount,
            tier = %tier,
            with_chart = chart.is_some(),
            "deal dispatched"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dealwatch_core::Price;
    use pretty_assertions::assert_eq;

    fn deal() -> EvaluatedDeal {
        EvaluatedDeal {
            asin: "B01ABCDEFG".into(),
            title: "Widget".to_string(),
            current: Price(1000),
            average: Price(10_000),
            discount: 90,
            order_count: Some(5),
            order_limit: None,
            image: Some("71abc.jpg".to_string()),
        }
    }

    #[test]
    fn test_description_formats_prices_and_discount() {
        let payload = build_payload(&deal());
        let description = payload.embeds[0].description.as_deref().unwrap();
        assert!(description.contains("Current: **$10.00**"));
        assert!(description.contains("Average: **$100.00**"));
        assert!(description.contains("Discount: **90%**"));
    }

    #[test]
    fn test_fields_fall_back_to_na() {
        let payload = build_payload(&deal());
        let fields = &payload.embeds[0].fields;
        assert_eq!(fields[0].value, "B01ABCDEFG");
        assert_eq!(fields[1].value, "5");
        assert_eq!(fields[2].value, "N/A");
    }

    #[test]
    fn test_link_and_thumbnail() {
        let payload = build_payload(&deal());
        let embed = &payload.embeds[0];
        assert_eq!(
            embed.url.as_deref(),
            Some("https://www.amazon.com/dp/B01ABCDEFG")
        );
        assert_eq!(
            embed.thumbnail.as_ref().unwrap().url,
            "https://images-na.ssl-images-amazon.com/images/I/71abc.jpg"
        );
    }

    #[test]
    fn test_no_thumbnail_without_image() {
        let mut no_image = deal();
        no_image.image = None;
        let payload = build_payload(&no_image);
        assert!(payload.embeds[0].thumbnail.is_none());
    }

    #[test]
    fn test_tier_endpoint_table() {
        let endpoints = TierEndpoints {
            tier90: "https://hook/90".to_string(),
            tier80: "https://hook/80".to_string(),
            tier70: "https://hook/70".to_string(),
            tier20: "https://hook/20".to_string(),
        };
        assert_eq!(endpoints.endpoint(DiscountTier::Tier90), "https://hook/90");
        assert_eq!(endpoints.endpoint(DiscountTier::Tier20), "https://hook/20");
    }
}
