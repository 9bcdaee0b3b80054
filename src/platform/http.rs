//! Shared HTTP plumbing for the platform adapters.
//!
//! Both upstreams are unauthenticated JSON-over-GET APIs that occasionally
//! return an empty or truncated body under load. Those responses are treated
//! as transient: the request is retried exactly once after a fixed backoff,
//! after which the call fails with `UpstreamUnavailable`.

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{HuddleError, Result};

const RETRY_BACKOFF: Duration = Duration::from_millis(500);

pub(crate) fn build_client(user_agent: &str) -> Result<Client> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| HuddleError::Internal(format!("failed to build HTTP client: {}", e)))
}

/// GET `url` and decode the JSON body, retrying once on transient failure.
///
/// A 404 is a `NotFound` and is never retried; any other non-success status,
/// connection error, or undecodable body counts as transient.
pub(crate) async fn get_json<T: DeserializeOwned>(client: &Client, url: &str) -> Result<T> {
    match fetch_once(client, url).await {
        Ok(value) => Ok(value),
        Err(HuddleError::NotFound(msg)) => Err(HuddleError::NotFound(msg)),
        Err(first) => {
            warn!(%url, error = %first, "transient upstream failure, retrying once");
            tokio::time::sleep(RETRY_BACKOFF).await;

            fetch_once(client, url).await.map_err(|e| match e {
                HuddleError::NotFound(msg) => HuddleError::NotFound(msg),
                other => HuddleError::UpstreamUnavailable(format!("{}: {}", url, other)),
            })
        }
    }
}

async fn fetch_once<T: DeserializeOwned>(client: &Client, url: &str) -> Result<T> {
    let response = client.get(url).send().await?;
    let status = response.status();

    if status == StatusCode::NOT_FOUND {
        return Err(HuddleError::NotFound(url.to_string()));
    }
    if !status.is_success() {
        return Err(HuddleError::UpstreamUnavailable(format!(
            "{} returned {}",
            url, status
        )));
    }

    let body = response.text().await?;
    if body.trim().is_empty() || body.trim() == "null" {
        return Err(HuddleError::UpstreamUnavailable(format!(
            "{} returned an empty body",
            url
        )));
    }

    debug!(%url, bytes = body.len(), "upstream response");
    serde_json::from_str(&body).map_err(HuddleError::Json)
}
