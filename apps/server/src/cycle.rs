//! One fetch-evaluate-dispatch pass.

use dealwatch_alerts::{DealNotifier, DedupStore};
use dealwatch_engine::{ChartOutcome, ChartRenderer, DealEvaluator, Evaluation};
use dealwatch_source::{DealFilter, DealSource, DetailOptions, SourceError};
use tracing::{debug, error, info, warn};

/// Counters for one completed pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleStats {
    pub candidates: usize,
    pub dispatched: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Run one poll pass: fetch candidates, evaluate each in order, render
/// and dispatch qualifying deals, and record successes in the dedup
/// store (flushed immediately, so a crash loses at most nothing).
///
/// A whole-cycle fetch failure is returned to the caller; per-candidate
/// failures only bump counters.
pub async fn run_cycle<S, N>(
    source: &S,
    evaluator: &DealEvaluator,
    renderer: &ChartRenderer,
    notifier: &N,
    dedup: &mut DedupStore,
    filter: &DealFilter,
) -> Result<CycleStats, SourceError>
where
    S: DealSource + ?Sized,
    N: DealNotifier + ?Sized,
{
    let candidates = source.find_deals(filter).await?;
    let mut stats = CycleStats {
        candidates: candidates.len(),
        ..Default::default()
    };

    for candidate in &candidates {
        let asin = candidate.asin.as_str();
        let (deal, tier) = match evaluator.evaluate(source, candidate).await {
            Evaluation::Deal { deal, tier } => (deal, tier),
            Evaluation::Skip(reason) => {
                debug!(asin, %reason, "candidate skipped");
                stats.skipped += 1;
                continue;
            }
        };

        // History is only worth fetching once a deal is actually going
        // out; a failed fetch just means no chart.
        let chart = match source
            .product_detail(asin, &DetailOptions::with_history())
            .await
        {
            Ok(Some(detail)) => renderer.render(&detail),
            Ok(None) => ChartOutcome::Unavailable,
            Err(err) => {
                debug!(asin, error = %err, "history fetch failed, dispatching without chart");
                ChartOutcome::Unavailable
            }
        };

        match notifier.notify(&deal, tier, chart.path()).await {
            Ok(()) => {
                dedup.record(asin, deal.current);
                if let Err(err) = dedup.flush() {
                    warn!(asin, error = %err, "dedup flush failed");
                }
                stats.dispatched += 1;
            }
            Err(err) => {
                // Not recorded: the item will be re-evaluated next cycle.
                error!(asin, error = %err, "dispatch failed");
                stats.failed += 1;
            }
        }
    }

    info!(
        candidates = stats.candidates,
        dispatched = stats.dispatched,
        skipped = stats.skipped,
        failed = stats.failed,
        "cycle complete"
    );
    Ok(stats)
}
