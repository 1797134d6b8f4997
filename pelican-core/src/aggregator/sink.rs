use crate::auth::Credentials;
use crate::filter::{FilterId, ResultRecord};
use crate::ingest::format_batch;
use reqwest::blocking::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("supervisor answered with status {0}")]
    Status(u16),

    #[error("supervisor rejected batch: {0}")]
    Rejected(String),

    #[error("invalid supervisor url '{0}'")]
    InvalidUrl(String),
}

/// Destination for flushed batches. One call per filter per flush.
pub trait FlushSink {
    fn deliver(&self, filter_id: &FilterId, records: &[ResultRecord]) -> Result<(), DeliveryError>;
}

/// Sends batches to the supervisor's merge endpoint.
///
/// Delivery is at-most-once: the caller drops a batch on any error.
#[derive(Debug, Clone)]
pub struct HttpFlushSink {
    client: Client,
    base_url: Url,
    authorization: String,
}

impl HttpFlushSink {
    pub fn new(
        base_url: &str,
        credentials: &Credentials,
        timeout: Duration,
    ) -> Result<Self, DeliveryError> {
        let base_url = match Url::parse(base_url) {
            Ok(url) if !url.cannot_be_a_base() => url,
            _ => return Err(DeliveryError::InvalidUrl(base_url.to_owned())),
        };
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            authorization: credentials.header_value(),
        })
    }

    /// The merge endpoint for a filter, with the id percent-encoded as one segment.
    fn url_for(&self, filter_id: &FilterId) -> Result<Url, DeliveryError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| DeliveryError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(["filter", filter_id.as_str(), "result"]);
        Ok(url)
    }
}

impl FlushSink for HttpFlushSink {
    fn deliver(&self, filter_id: &FilterId, records: &[ResultRecord]) -> Result<(), DeliveryError> {
        let resp = self
            .client
            .put(self.url_for(filter_id)?)
            .header(reqwest::header::AUTHORIZATION, &self.authorization)
            .body(format_batch(records))
            .send()?;

        let status = resp.status();
        let body = resp.text()?;

        if let Ok(envelope) = serde_json::from_str::<Value>(&body) {
            if envelope.get("status").and_then(Value::as_str) == Some("error") {
                let message = envelope
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("<no message>");
                return Err(DeliveryError::Rejected(message.to_owned()));
            }
        }

        if !status.is_success() {
            return Err(DeliveryError::Status(status.as_u16()));
        }

        Ok(())
    }
}

/// Logs batches instead of sending them. Used by `worker --dry-run`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl FlushSink for TracingSink {
    fn deliver(&self, filter_id: &FilterId, records: &[ResultRecord]) -> Result<(), DeliveryError> {
        for r in records {
            tracing::info!(
                filter_id = %filter_id,
                metric = %r.metric,
                bucket = %r.bucket,
                count = r.delta,
                "flush"
            );
        }
        Ok(())
    }
}
