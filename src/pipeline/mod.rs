//! Trade delivery pipeline.
//!
//! One feed = one platform account + league filter + chat destination. Each
//! enabled feed runs on its own fixed interval, dedups against a persisted
//! ledger, and is watched by a slower watchdog that force-restarts a stalled
//! schedule.

pub mod delivery;
pub mod flags;
pub mod ledger;
pub mod manager;

pub use delivery::{FeedWorker, TickReport};
pub use flags::FeedStatusStore;
pub use ledger::TradeLedger;
pub use manager::{DeliveryManager, FeedStatus};
