//! Notification seam.
//!
//! The chat surface itself is a collaborator; the pipeline only ever talks to
//! the [`Notifier`] trait with pre-formatted text and the reaction tokens the
//! destination may attach.

pub mod format;
pub mod webhook;

pub use format::{format_trade, reactions_for_trade_size};
pub use webhook::WebhookNotifier;

use async_trait::async_trait;

use crate::error::Result;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Hand one formatted message to the chat surface. A returned error means
    /// the message was not delivered and the caller must not mark it done.
    async fn deliver(&self, text: &str, reactions: &[&'static str]) -> Result<()>;
}
