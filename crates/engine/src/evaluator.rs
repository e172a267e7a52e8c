//! Per-candidate deal evaluation.
//!
//! Each fallible step (detail fetch, current price, average price,
//! discount) yields a value the caller inspects; nothing here aborts a
//! cycle. The source's own discount estimate is never consulted; the
//! figure acted on is recomputed from authoritative detail.

use crate::lookup::first_usable_price;
use dealwatch_core::{
    discount_percent, Candidate, DiscountTier, EvaluatedDeal, Price, MIN_DISCOUNT_PERCENT,
};
use dealwatch_source::{DealSource, DetailOptions, ProductDetail, Stats};
use tracing::debug;

/// Average-price preference by offer condition.
const AVG_PREFERENCE: [&str; 3] = ["NEW", "NEW_FBA", "NEW_FBM"];

/// Why a candidate was not turned into a deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Detail fetch failed or the source has no record.
    DetailUnavailable,
    /// No buy box and no live offer with a usable price.
    NoCurrentPrice,
    /// The average-price block was not a key-value mapping.
    MalformedStats,
    /// No average price for any preferred condition.
    NoAveragePrice,
    /// Discount division was uncomputable (zero average).
    DiscountUncomputable,
    /// Recomputed discount below the announcement floor.
    BelowFloor(i32),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DetailUnavailable => write!(f, "detail unavailable"),
            Self::NoCurrentPrice => write!(f, "no current price"),
            Self::MalformedStats => write!(f, "malformed stats block"),
            Self::NoAveragePrice => write!(f, "no average price"),
            Self::DiscountUncomputable => write!(f, "discount uncomputable"),
            Self::BelowFloor(pct) => write!(f, "discount {pct}% below floor"),
        }
    }
}

/// Outcome of evaluating one candidate.
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    Deal {
        deal: EvaluatedDeal,
        tier: DiscountTier,
    },
    Skip(SkipReason),
}

/// Result of the average-price lookup, kept separate from [`SkipReason`]
/// so the malformed-mapping case stays distinguishable.
enum AverageLookup {
    Found(Price),
    Missing,
    Malformed,
}

/// Evaluates candidates against fresh product detail.
#[derive(Debug, Clone)]
pub struct DealEvaluator {
    detail_options: DetailOptions,
}

impl Default for DealEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl DealEvaluator {
    pub fn new() -> Self {
        Self {
            // Offers and stats only; history is fetched separately when
            // a chart is actually going to be rendered.
            detail_options: DetailOptions::default(),
        }
    }

    /// Evaluate one candidate. Fetch failures degrade to a skip; the
    /// cycle never errors because of a single bad item.
    pub async fn evaluate<S: DealSource + ?Sized>(
        &self,
        source: &S,
        candidate: &Candidate,
    ) -> Evaluation {
        let asin = candidate.asin.as_str();
        let detail = match source.product_detail(asin, &self.detail_options).await {
            Ok(Some(detail)) => detail,
            Ok(None) => {
                debug!(asin, "skipping: source has no record");
                return Evaluation::Skip(SkipReason::DetailUnavailable);
            }
            Err(err) => {
                debug!(asin, error = %err, "skipping: detail fetch failed");
                return Evaluation::Skip(SkipReason::DetailUnavailable);
            }
        };

        let Some(current) = current_price(&detail) else {
            debug!(asin, "skipping: no current price");
            return Evaluation::Skip(SkipReason::NoCurrentPrice);
        };

        let average = match average_price(detail.stats.as_ref()) {
            AverageLookup::Found(price) => price,
            AverageLookup::Malformed => {
                debug!(asin, "skipping: avg block is not a mapping");
                return Evaluation::Skip(SkipReason::MalformedStats);
            }
            AverageLookup::Missing => {
                debug!(asin, "skipping: no average price");
                return Evaluation::Skip(SkipReason::NoAveragePrice);
            }
        };

        let Some(discount) = discount_percent(current, average) else {
            debug!(asin, "skipping: discount uncomputable");
            return Evaluation::Skip(SkipReason::DiscountUncomputable);
        };
        if discount < MIN_DISCOUNT_PERCENT {
            debug!(asin, discount, "skipping: below floor");
            return Evaluation::Skip(SkipReason::BelowFloor(discount));
        }

        // Floor check above guarantees a tier here.
        let Some(tier) = DiscountTier::route(Some(discount)) else {
            return Evaluation::Skip(SkipReason::BelowFloor(discount));
        };

        let title = detail
            .title
            .clone()
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| candidate.title.clone());

        debug!(
            asin,
            discount,
            reported = ?candidate.reported_discount,
            tier = %tier,
            "candidate qualified"
        );

        Evaluation::Deal {
            deal: EvaluatedDeal {
                asin: candidate.asin.clone(),
                title,
                current,
                average,
                discount,
                order_count: candidate.order_count,
                order_limit: candidate.order_limit,
                image: detail.primary_image().map(str::to_string),
            },
            tier,
        }
    }
}

/// Authoritative current price: buy-box statistic first, else the first
/// live offer with a non-negative, non-sentinel price, in list order.
fn current_price(detail: &ProductDetail) -> Option<Price> {
    let buy_box = detail
        .stats
        .as_ref()
        .and_then(|stats| Price::normalize(stats.buy_box_price));
    if buy_box.is_some() {
        return buy_box;
    }

    detail
        .offers
        .as_ref()?
        .iter()
        .filter(|offer| offer.live)
        .find_map(|offer| Price::from_minor_units(offer.price))
}

/// Ordered-preference average-price lookup over the stats `avg` block.
/// An unusable value at an earlier preference (null or sentinel) falls
/// through to the next condition. A non-mapping block is a known
/// source-data inconsistency and is reported distinctly from a
/// simply-missing average.
fn average_price(stats: Option<&Stats>) -> AverageLookup {
    let Some(avg) = stats.and_then(|stats| stats.avg.as_ref()) else {
        return AverageLookup::Missing;
    };
    let Some(view) = avg.as_object() else {
        return AverageLookup::Malformed;
    };
    match first_usable_price(view, &AVG_PREFERENCE) {
        Some(price) => AverageLookup::Found(price),
        None => AverageLookup::Missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dealwatch_source::{DealFilter, Offer, SourceError};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    /// Canned source: one product, or an error.
    struct CannedSource {
        detail: Option<ProductDetail>,
        fail: bool,
    }

    impl CannedSource {
        fn with(detail: ProductDetail) -> Self {
            Self {
                detail: Some(detail),
                fail: false,
            }
        }

        fn empty() -> Self {
            Self {
                detail: None,
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                detail: None,
                fail: true,
            }
        }
    }

    #[async_trait]
    impl DealSource for CannedSource {
        async fn find_deals(&self, _filter: &DealFilter) -> Result<Vec<Candidate>, SourceError> {
            Ok(Vec::new())
        }

        async fn product_detail(
            &self,
            _asin: &str,
            _options: &DetailOptions,
        ) -> Result<Option<ProductDetail>, SourceError> {
            if self.fail {
                return Err(SourceError::Status(503));
            }
            Ok(self.detail.clone())
        }
    }

    fn candidate() -> Candidate {
        Candidate {
            asin: "B01ABCDEFG".into(),
            title: "Widget".to_string(),
            reported_discount: Some(55),
            order_count: Some(3),
            order_limit: Some(2),
        }
    }

    fn detail(buy_box: Option<i64>, avg: serde_json::Value) -> ProductDetail {
        ProductDetail {
            asin: "B01ABCDEFG".to_string(),
            title: Some("Widget, full title".to_string()),
            stats: Some(Stats {
                buy_box_price: buy_box,
                avg: Some(avg),
            }),
            offers: None,
            csv: None,
            images_csv: Some("71abc.jpg".to_string()),
        }
    }

    #[tokio::test]
    async fn test_buy_box_price_qualifies() {
        // $10 buy box against $100 NEW average: 90%, top tier
        let source = CannedSource::with(detail(Some(1000), json!({"NEW": 10_000})));
        let evaluation = DealEvaluator::new().evaluate(&source, &candidate()).await;

        match evaluation {
            Evaluation::Deal { deal, tier } => {
                assert_eq!(tier, DiscountTier::Tier90);
                assert_eq!(deal.current, Price(1000));
                assert_eq!(deal.average, Price(10_000));
                assert_eq!(deal.discount, 90);
                assert_eq!(deal.order_count, Some(3));
                assert_eq!(deal.image.as_deref(), Some("71abc.jpg"));
                assert_eq!(deal.title, "Widget, full title");
            }
            other => panic!("expected deal, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_offer_fallback_when_no_buy_box() {
        let mut product = detail(Some(-1), json!({"NEW": 10_000}));
        product.offers = Some(vec![
            Offer {
                price: -1,
                live: true,
            },
            Offer {
                price: 2500,
                live: false,
            },
            Offer {
                price: 3000,
                live: true,
            },
        ]);
        let source = CannedSource::with(product);
        let evaluation = DealEvaluator::new().evaluate(&source, &candidate()).await;

        match evaluation {
            Evaluation::Deal { deal, tier } => {
                // first live offer with a valid price, not the dead $25 one
                assert_eq!(deal.current, Price(3000));
                assert_eq!(deal.discount, 70);
                assert_eq!(tier, DiscountTier::Tier70);
            }
            other => panic!("expected deal, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_no_price_anywhere_skips() {
        // Scenario B: no buy box, no live offers
        let mut product = detail(Some(-1), json!({"NEW": 10_000}));
        product.offers = Some(vec![Offer {
            price: 2500,
            live: false,
        }]);
        let source = CannedSource::with(product);
        let evaluation = DealEvaluator::new().evaluate(&source, &candidate()).await;
        assert_eq!(evaluation, Evaluation::Skip(SkipReason::NoCurrentPrice));
    }

    #[tokio::test]
    async fn test_list_shaped_avg_block_skips() {
        let source = CannedSource::with(detail(Some(1000), json!([10_000, 9000])));
        let evaluation = DealEvaluator::new().evaluate(&source, &candidate()).await;
        assert_eq!(evaluation, Evaluation::Skip(SkipReason::MalformedStats));
    }

    #[tokio::test]
    async fn test_missing_average_skips() {
        let source = CannedSource::with(detail(Some(1000), json!({"USED": 5000})));
        let evaluation = DealEvaluator::new().evaluate(&source, &candidate()).await;
        assert_eq!(evaluation, Evaluation::Skip(SkipReason::NoAveragePrice));
    }

    #[tokio::test]
    async fn test_below_floor_skips() {
        // $90 against $100: 10%, under the 20% floor
        let source = CannedSource::with(detail(Some(9000), json!({"NEW": 10_000})));
        let evaluation = DealEvaluator::new().evaluate(&source, &candidate()).await;
        assert_eq!(evaluation, Evaluation::Skip(SkipReason::BelowFloor(10)));
    }

    #[tokio::test]
    async fn test_fetch_failure_and_empty_result_skip() {
        let evaluator = DealEvaluator::new();
        let evaluation = evaluator.evaluate(&CannedSource::failing(), &candidate()).await;
        assert_eq!(evaluation, Evaluation::Skip(SkipReason::DetailUnavailable));

        let evaluation = evaluator.evaluate(&CannedSource::empty(), &candidate()).await;
        assert_eq!(evaluation, Evaluation::Skip(SkipReason::DetailUnavailable));
    }

    #[tokio::test]
    async fn test_evaluation_is_idempotent() {
        let source = CannedSource::with(detail(Some(1000), json!({"NEW": 10_000})));
        let evaluator = DealEvaluator::new();
        let first = evaluator.evaluate(&source, &candidate()).await;
        let second = evaluator.evaluate(&source, &candidate()).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_null_new_average_falls_through_to_fba() {
        let source = CannedSource::with(detail(
            Some(1000),
            json!({"NEW": null, "NEW_FBA": 10_000}),
        ));
        let evaluation = DealEvaluator::new().evaluate(&source, &candidate()).await;
        match evaluation {
            Evaluation::Deal { deal, .. } => {
                assert_eq!(deal.average, Price(10_000));
                assert_eq!(deal.discount, 90);
            }
            other => panic!("expected deal, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_sentinel_new_average_falls_through_to_fba() {
        let source = CannedSource::with(detail(
            Some(1000),
            json!({"NEW": -1, "NEW_FBA": 10_000}),
        ));
        let evaluation = DealEvaluator::new().evaluate(&source, &candidate()).await;
        match evaluation {
            Evaluation::Deal { deal, .. } => assert_eq!(deal.average, Price(10_000)),
            other => panic!("expected deal, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fba_average_preferred_over_fbm() {
        let source = CannedSource::with(detail(
            Some(1000),
            json!({"NEW_FBM": 20_000, "NEW_FBA": 10_000}),
        ));
        let evaluation = DealEvaluator::new().evaluate(&source, &candidate()).await;
        match evaluation {
            Evaluation::Deal { deal, .. } => assert_eq!(deal.average, Price(10_000)),
            other => panic!("expected deal, got {other:?}"),
        }
    }
}
