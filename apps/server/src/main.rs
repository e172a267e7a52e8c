//! dealwatch - deal evaluation and notification daemon.
//!
//! Polls the pricing source for discounted items, re-derives each
//! discount from authoritative product statistics, and announces
//! qualifying deals to tier-specific webhook endpoints.

mod config;
mod cycle;

use clap::Parser;
use config::AppConfig;
use cycle::run_cycle;
use dealwatch_alerts::{DedupStore, Dispatcher};
use dealwatch_engine::{ChartRenderer, DealEvaluator};
use dealwatch_source::{DealFilter, KeepaClient};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Deal watch daemon CLI
#[derive(Parser, Debug)]
#[command(name = "dealwatch")]
#[command(about = "Deal evaluation and notification daemon", long_about = None)]
struct Args {
    /// Poll interval in seconds (overrides the environment)
    #[arg(short, long)]
    interval: Option<u64>,

    /// Dedup file path
    #[arg(long, default_value = "dedup.json")]
    dedup_file: PathBuf,

    /// Directory for rendered chart images
    #[arg(long, default_value = "charts")]
    chart_dir: PathBuf,

    /// Log level: trace, debug, info, warn, error
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn init_logging(level: &str) {
    let level = match level {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(&args.log_level);
    dotenvy::dotenv().ok();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "configuration error");
            std::process::exit(1);
        }
    };

    let interval_secs = args.interval.unwrap_or(config.poll_interval_secs);
    info!(
        interval_secs,
        dedup_file = %args.dedup_file.display(),
        "starting dealwatch"
    );

    let source = KeepaClient::new(config.api_key.clone());
    let evaluator = DealEvaluator::new();
    let renderer = ChartRenderer::new(&args.chart_dir);
    let notifier = Dispatcher::new(config.endpoints.clone());
    let mut dedup = DedupStore::load(&args.dedup_file);
    let filter = DealFilter::default();

    info!(known_deals = dedup.len(), "dedup store loaded");

    // First tick fires immediately; a slow cycle delays the next tick
    // instead of bursting to catch up.
    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("shutdown signal received, stopping");
                break;
            }
            _ = ticker.tick() => {
                match run_cycle(&source, &evaluator, &renderer, &notifier, &mut dedup, &filter).await {
                    Ok(_stats) => {}
                    Err(err) => {
                        // Source unreachable or rejecting us: abandon the
                        // cycle, keep the process alive.
                        error!(error = %err, transient = err.is_transient(), "poll cycle failed");
                    }
                }
            }
        }
    }
}
