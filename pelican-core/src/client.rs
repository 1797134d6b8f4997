//! Blocking client for the registry HTTP surface, used by the CLI and workers.

use crate::auth::Credentials;
use crate::filter::{FilterId, FilterResults, FilterSummary};
use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("supervisor returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("invalid supervisor url '{0}'")]
    InvalidUrl(String),
}

pub struct RegistryClient {
    client: Client,
    base_url: Url,
    authorization: String,
}

impl RegistryClient {
    pub fn new(
        base_url: &str,
        credentials: &Credentials,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let base_url = match Url::parse(base_url) {
            Ok(url) if !url.cannot_be_a_base() => url,
            _ => return Err(ClientError::InvalidUrl(base_url.to_owned())),
        };
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            authorization: credentials.header_value(),
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Append path segments to the base url. Each segment is percent-encoded,
    /// so an id containing `/` or `?` stays a single segment.
    fn url(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send a request and unwrap the `{status, ...}` envelope.
    fn call(&self, req: RequestBuilder) -> Result<Value, ClientError> {
        let resp = req
            .header(reqwest::header::AUTHORIZATION, &self.authorization)
            .send()?;
        let status = resp.status();
        let text = resp.text()?;

        let envelope: Value = match serde_json::from_str(&text) {
            Ok(v) => v,
            Err(_) => {
                return Err(ClientError::Api {
                    status: status.as_u16(),
                    message: format!("non-JSON response: {}", text.trim()),
                });
            }
        };

        if !status.is_success() || envelope["status"] != "ok" {
            let message = envelope["message"]
                .as_str()
                .unwrap_or("<no message>")
                .to_owned();
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(envelope)
    }

    fn field<T: DeserializeOwned>(envelope: &mut Value, key: &str) -> Result<T, ClientError> {
        let value = envelope.get_mut(key).map(Value::take).unwrap_or(Value::Null);
        serde_json::from_value(value).map_err(|e| ClientError::Api {
            status: 200,
            message: format!("malformed '{key}' field: {e}"),
        })
    }

    /// The supervisor banner.
    pub fn health(&self) -> Result<String, ClientError> {
        let mut env = self.call(self.client.get(self.base_url.clone()))?;
        Self::field(&mut env, "hello")
    }

    pub fn create(&self, name: &str, regex: &str) -> Result<FilterId, ClientError> {
        let req = self
            .client
            .post(self.url(&["filter"])?)
            .query(&[("name", name), ("regex", regex)]);
        let mut env = self.call(req)?;
        Self::field(&mut env, "filter_id")
    }

    pub fn list(&self) -> Result<Vec<FilterSummary>, ClientError> {
        let mut env = self.call(self.client.get(self.url(&["filter"])?))?;
        Self::field(&mut env, "filters")
    }

    pub fn results(&self, id: &FilterId) -> Result<FilterResults, ClientError> {
        let req = self.client.get(self.url(&["filter", id.as_str(), "result"])?);
        let mut env = self.call(req)?;
        Self::field(&mut env, "results")
    }

    /// Returns whether the filter existed.
    pub fn delete(&self, id: &FilterId) -> Result<bool, ClientError> {
        let req = self.client.delete(self.url(&["filter", id.as_str()])?);
        let mut env = self.call(req)?;
        Self::field(&mut env, "deleted")
    }
}
