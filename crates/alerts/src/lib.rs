//! Notification dispatch and dedup persistence.
//!
//! Formats evaluated deals into webhook embed payloads, delivers them
//! to the tier-bound endpoint (with an optional chart attachment), and
//! records what has been announced in a flat dedup file.

pub mod dedup;
pub mod notifier;
pub mod webhook;

pub use dedup::*;
pub use notifier::*;
pub use webhook::*;
