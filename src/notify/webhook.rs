//! Chat webhook notifications.
//!
//! Posts trade digests to a Discord-compatible webhook.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, error};

use super::Notifier;
use crate::error::{HuddleError, Result};

/// Webhook notification client
#[derive(Clone)]
pub struct WebhookNotifier {
    client: Client,
    webhook_url: String,
}

#[derive(Serialize)]
struct WebhookMessage<'a> {
    content: &'a str,
}

impl WebhookNotifier {
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            webhook_url: webhook_url.into(),
        }
    }

    async fn send_message(&self, text: &str) -> Result<()> {
        let message = WebhookMessage { content: text };

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&message)
            .send()
            .await?;

        if response.status().is_success() {
            debug!("webhook notification sent");
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("webhook notification failed: {} - {}", status, body);
            Err(HuddleError::UpstreamUnavailable(format!(
                "webhook returned {}: {}",
                status, body
            )))
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn deliver(&self, text: &str, reactions: &[&'static str]) -> Result<()> {
        // A bare webhook has no way to attach reactions to its own message;
        // richer surfaces implement the trait themselves.
        if !reactions.is_empty() {
            debug!(count = reactions.len(), "reactions not supported over webhook");
        }

        self.send_message(text).await
    }
}
