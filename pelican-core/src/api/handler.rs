use crate::api::endpoint::RegistryEndpoint;
use crate::api::envelope::{ApiResponse, Envelope};
use crate::auth::{AuthError, Credentials};
use crate::filter::{FilterId, FilterStore, RegistryError};
use crate::ingest::ingest_batch;
use http::{Method, StatusCode, header};
use std::sync::Arc;

pub const BANNER: &str = "This is the Pelican supervisor";

/// Everything the handler needs from an inbound request.
#[derive(Debug, Clone)]
pub struct ApiRequest<'a> {
    pub method: &'a Method,
    pub path: &'a str,
    pub query: Option<&'a str>,
    /// Raw header bytes; not necessarily valid text.
    pub authorization: Option<&'a [u8]>,
    pub remote_addr: Option<String>,
    pub body: &'a [u8],
}

/// Registry operations behind the shared-secret gate.
pub struct RegistryHandler {
    store: Arc<FilterStore>,
    credentials: Credentials,
}

impl RegistryHandler {
    pub fn new(store: Arc<FilterStore>, credentials: Credentials) -> Self {
        Self { store, credentials }
    }

    #[cfg(test)]
    pub(crate) fn store(&self) -> &Arc<FilterStore> {
        &self.store
    }

    pub fn handle(&self, req: &ApiRequest<'_>) -> ApiResponse {
        if let Err(e) = self.credentials.verify_raw(req.authorization) {
            tracing::warn!(
                path = req.path,
                remote_addr = req.remote_addr.as_deref().unwrap_or("-"),
                error = %e,
                "rejected registry request"
            );
            return auth_failure(e);
        }

        let endpoint = match req.path.parse::<RegistryEndpoint>() {
            Ok(endpoint) => endpoint,
            Err(_) => {
                return ApiResponse::error(
                    StatusCode::NOT_FOUND,
                    format!("Unknown endpoint {}", req.path),
                );
            }
        };

        let result = match (&endpoint, req.method) {
            (RegistryEndpoint::Health, &Method::GET) => Ok(Envelope::ok().with("hello", BANNER)),
            (RegistryEndpoint::Filters, &Method::POST) => self.create_filter(req),
            (RegistryEndpoint::Filters, &Method::GET) => {
                Ok(Envelope::ok().with("filters", self.store.list()))
            }
            (RegistryEndpoint::FilterResult(id), &Method::GET) => self.get_results(id),
            (RegistryEndpoint::FilterResult(id), &Method::PUT) => self.put_results(id, req.body),
            (RegistryEndpoint::Filter(id), &Method::DELETE) => self.delete_filter(id),
            _ => {
                return ApiResponse::error(
                    StatusCode::METHOD_NOT_ALLOWED,
                    format!("Method {} not allowed on {}", req.method, req.path),
                )
                .with_header(header::ALLOW, endpoint.allowed_methods());
            }
        };

        match result {
            Ok(envelope) => ApiResponse::ok(envelope),
            Err(e) => registry_failure(e),
        }
    }

    fn create_filter(&self, req: &ApiRequest<'_>) -> Result<Envelope, RegistryError> {
        let mut name = String::new();
        let mut regex = String::new();
        if let Some(query) = req.query {
            for (k, v) in url::form_urlencoded::parse(query.as_bytes()) {
                match k.as_ref() {
                    "name" => name = v.into_owned(),
                    "regex" => regex = v.into_owned(),
                    _ => {}
                }
            }
        }

        let owner = req.remote_addr.as_deref().unwrap_or("unknown");
        let id = self.store.create(&name, owner, &regex)?;
        Ok(Envelope::ok().with("filter_id", id))
    }

    fn get_results(&self, id: &FilterId) -> Result<Envelope, RegistryError> {
        require_id(id)?;
        let filter = self.store.get(id)?;
        Ok(Envelope::ok().with("results", filter.results))
    }

    fn put_results(&self, id: &FilterId, body: &[u8]) -> Result<Envelope, RegistryError> {
        require_id(id)?;
        let body = String::from_utf8_lossy(body);
        let ack = ingest_batch(&self.store, id, &body)?;
        Ok(Envelope::ok().with("ack", ack.ack).with("lines", ack.lines))
    }

    fn delete_filter(&self, id: &FilterId) -> Result<Envelope, RegistryError> {
        require_id(id)?;
        Ok(Envelope::ok().with("deleted", self.store.delete(id)))
    }
}

fn require_id(id: &FilterId) -> Result<(), RegistryError> {
    if id.as_str().is_empty() {
        return Err(RegistryError::validation("Please provide an ID"));
    }
    Ok(())
}

fn auth_failure(e: AuthError) -> ApiResponse {
    match e {
        AuthError::BadCredentialSyntax(_) => ApiResponse::error(StatusCode::BAD_REQUEST, e.to_string()),
        AuthError::Unauthorized => ApiResponse::error(StatusCode::UNAUTHORIZED, e.to_string())
            .with_header(header::WWW_AUTHENTICATE, "Basic realm=\"pelican\""),
    }
}

fn registry_failure(e: RegistryError) -> ApiResponse {
    let status = match &e {
        RegistryError::Validation(_) => StatusCode::BAD_REQUEST,
        RegistryError::NotFound(_) => StatusCode::NOT_FOUND,
        RegistryError::Persistence { .. } | RegistryError::CorruptSnapshot { .. } => {
            tracing::error!(error = %e, "registry failure");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    ApiResponse::error(status, e.to_string())
}
