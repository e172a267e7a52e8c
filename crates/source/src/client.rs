//! HTTP client for the pricing API.

use crate::{DealFilter, DetailOptions, ProductDetail, SourceError};
use async_trait::async_trait;
use dealwatch_core::Candidate;
use serde::Deserialize;
use tracing::debug;

/// The two source capabilities the pipeline consumes.
#[async_trait]
pub trait DealSource: Send + Sync {
    /// List deal candidates matching a filter profile.
    async fn find_deals(&self, filter: &DealFilter) -> Result<Vec<Candidate>, SourceError>;

    /// Fetch full detail for one identifier. `Ok(None)` when the source
    /// has no record for it.
    async fn product_detail(
        &self,
        asin: &str,
        options: &DetailOptions,
    ) -> Result<Option<ProductDetail>, SourceError>;
}

/// Keepa-backed implementation of [`DealSource`].
pub struct KeepaClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

const DEFAULT_BASE_URL: &str = "https://api.keepa.com";

#[derive(Debug, Deserialize)]
struct DealResponse {
    #[serde(default)]
    deals: Option<DealPage>,
}

#[derive(Debug, Deserialize)]
struct DealPage {
    #[serde(default)]
    dr: Vec<WireDeal>,
}

#[derive(Debug, Deserialize)]
struct WireDeal {
    asin: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(rename = "deltaPercent", default)]
    delta_percent: Option<i32>,
    #[serde(rename = "orderCount", default)]
    order_count: Option<u32>,
    #[serde(rename = "orderLimit", default)]
    order_limit: Option<u32>,
}

impl From<WireDeal> for Candidate {
    fn from(deal: WireDeal) -> Self {
        Candidate {
            asin: deal.asin.into(),
            title: deal.title.unwrap_or_default(),
            reported_discount: deal.delta_percent,
            order_count: deal.order_count,
            order_limit: deal.order_limit,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProductResponse {
    #[serde(default)]
    products: Vec<ProductDetail>,
}

impl KeepaClient {
    /// Create a client against the production API.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a client against a custom base URL (tests, proxies).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }

    fn deal_url(&self) -> Result<url::Url, SourceError> {
        let mut url = url::Url::parse(&self.base_url)?.join("/deal")?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }

    fn product_url(&self, asin: &str, options: &DetailOptions) -> Result<url::Url, SourceError> {
        let mut url = url::Url::parse(&self.base_url)?.join("/product")?;
        url.query_pairs_mut()
            .append_pair("key", &self.api_key)
            .append_pair("domain", "1")
            .append_pair("asin", asin)
            .append_pair("offers", &options.offers.to_string())
            .append_pair("stats", &options.stats_days.to_string())
            .append_pair("history", if options.history { "1" } else { "0" });
        Ok(url)
    }
}

#[async_trait]
impl DealSource for KeepaClient {
    async fn find_deals(&self, filter: &DealFilter) -> Result<Vec<Candidate>, SourceError> {
        let url = self.deal_url()?;
        let response = self
            .http
            .post(url)
            .json(&filter.to_selection(0))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        let body: DealResponse = response.json().await?;
        let candidates: Vec<Candidate> = body
            .deals
            .map(|page| page.dr.into_iter().map(Candidate::from).collect())
            .unwrap_or_default();
        debug!(count = candidates.len(), "deal search returned candidates");
        Ok(candidates)
    }

    async fn product_detail(
        &self,
        asin: &str,
        options: &DetailOptions,
    ) -> Result<Option<ProductDetail>, SourceError> {
        let url = self.product_url(asin, options)?;
        let response = self.http.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        let body: ProductResponse = response.json().await?;
        Ok(body.products.into_iter().next())
    }
}
