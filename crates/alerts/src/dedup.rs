//! Durable record of announced deals.
//!
//! A single JSON object mapping identifier to the last price announced
//! for it, rewritten in full after every successful dispatch. A missing
//! or corrupt file is treated as empty state, never as a fatal error.

use dealwatch_core::Price;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Identifier -> last-announced price store.
#[derive(Debug)]
pub struct DedupStore {
    path: PathBuf,
    entries: BTreeMap<String, f64>,
}

impl DedupStore {
    /// Load the store from disk. Missing or unparseable state yields an
    /// empty mapping.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<BTreeMap<String, f64>>(&raw) {
                Ok(entries) => entries,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "dedup file corrupt, starting empty");
                    BTreeMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no dedup file yet, starting empty");
                BTreeMap::new()
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "dedup file unreadable, starting empty");
                BTreeMap::new()
            }
        };
        Self { path, entries }
    }

    /// Record the price a deal was announced at.
    pub fn record(&mut self, asin: &str, price: Price) {
        self.entries.insert(asin.to_string(), price.to_f64());
    }

    /// Last price announced for an identifier, if any.
    pub fn last_price(&self, asin: &str) -> Option<Price> {
        self.entries.get(asin).map(|dollars| Price::from_f64(*dollars))
    }

    /// Rewrite the whole file. Called after every successful dispatch;
    /// the write amplification is accepted for durability.
    pub fn flush(&self) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let raw = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, raw)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
