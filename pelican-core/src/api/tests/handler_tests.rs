use crate::api::{ApiRequest, ApiResponse, BANNER, RegistryHandler};
use crate::auth::Credentials;
use crate::filter::{BucketId, FilterId, FilterStore, MetricId};
use http::{Method, StatusCode, header};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::sync::Arc;

//-----------------------------------------------------------------------------
// Test helpers
//-----------------------------------------------------------------------------

struct Harness {
    handler: RegistryHandler,
    auth: String,
}

impl Harness {
    fn new() -> Self {
        let creds = Credentials::new("cloud", "pelican");
        Self {
            auth: creds.header_value(),
            handler: RegistryHandler::new(Arc::new(FilterStore::new()), creds),
        }
    }

    fn call(&self, method: Method, target: &str, body: &str) -> (ApiResponse, Value) {
        self.call_with_auth(method, target, body, Some(self.auth.as_bytes()))
    }

    fn call_with_auth(
        &self,
        method: Method,
        target: &str,
        body: &str,
        auth: Option<&[u8]>,
    ) -> (ApiResponse, Value) {
        let (path, query) = match target.split_once('?') {
            Some((p, q)) => (p, Some(q)),
            None => (target, None),
        };
        let resp = self.handler.handle(&ApiRequest {
            method: &method,
            path,
            query,
            authorization: auth,
            remote_addr: Some("1.2.3.4:5555".into()),
            body: body.as_bytes(),
        });
        let json: Value = serde_json::from_slice(&resp.body()).expect("body is json");
        (resp, json)
    }

    fn create(&self, name: &str, regex: &str) -> String {
        let (resp, json) = self.call(
            Method::POST,
            &format!("/filter?name={name}&regex={regex}"),
            "",
        );
        assert_eq!(resp.status, StatusCode::OK, "{json}");
        json["filter_id"].as_str().unwrap().to_owned()
    }
}

//-----------------------------------------------------------------------------
// Access control
//-----------------------------------------------------------------------------

#[test]
fn missing_credentials_are_unauthorized() {
    let h = Harness::new();
    let (resp, json) = h.call_with_auth(Method::GET, "/", "", None);

    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["status"], "error");
    assert!(
        resp.headers
            .iter()
            .any(|(name, _)| *name == header::WWW_AUTHENTICATE)
    );
}

#[test]
fn wrong_credentials_are_unauthorized() {
    let h = Harness::new();
    let other = Credentials::new("cloud", "wrong").header_value();
    let (resp, _) = h.call_with_auth(Method::GET, "/filter", "", Some(other.as_bytes()));
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
}

#[test]
fn malformed_credentials_are_bad_request() {
    let h = Harness::new();
    let (resp, json) = h.call_with_auth(Method::GET, "/", "", Some(&b"Token abc"[..]));
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], "error");
}

#[test]
fn non_ascii_credentials_are_bad_request() {
    let h = Harness::new();
    let raw: &[u8] = b"Basic \xc3\xa9t\xc3\xa9";
    let (resp, json) = h.call_with_auth(Method::GET, "/", "", Some(raw));
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], "error");
}

#[test]
fn auth_runs_before_routing() {
    let h = Harness::new();
    let (resp, _) = h.call_with_auth(Method::GET, "/nowhere", "", None);
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
}

//-----------------------------------------------------------------------------
// Routes
//-----------------------------------------------------------------------------

#[test]
fn health_returns_banner() {
    let h = Harness::new();
    let (resp, json) = h.call(Method::GET, "/", "");
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(json, json!({"status": "ok", "hello": BANNER}));
}

#[test]
fn create_records_owner_and_decodes_query() {
    let h = Harness::new();
    let id = h.create("web+errors", "status%3D5%5Cd%5Cd");

    let f = h.handler.store().get(&FilterId::from(id.as_str())).unwrap();
    assert_eq!(f.name, "web errors");
    assert_eq!(f.pattern, r"status=5\d\d");
    assert_eq!(f.owner, "1.2.3.4:5555");
}

#[test]
fn create_without_name_or_regex_is_validation_error() {
    let h = Harness::new();

    let (resp, json) = h.call(Method::POST, "/filter?name=errors", "");
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], "error");
    assert_eq!(json["message"], "Please provide a regex");

    let (resp, json) = h.call(Method::POST, "/filter?regex=ERROR&name=%20", "");
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Please provide a name");
    assert!(h.handler.store().is_empty());
}

#[test]
fn list_omits_results() {
    let h = Harness::new();
    let id = h.create("errors", "ERROR");
    h.call(Method::PUT, &format!("/filter/{id}/result"), "1 60 5\n");

    let (_, json) = h.call(Method::GET, "/filter", "");
    let filters = json["filters"].as_array().unwrap();
    assert_eq!(filters.len(), 1);
    assert_eq!(filters[0]["id"], id.as_str());
    assert_eq!(filters[0]["name"], "errors");
    assert!(filters[0].get("results").is_none());
}

#[test]
fn put_then_get_results() {
    let h = Harness::new();
    let id = h.create("errors", "ERROR");
    let path = format!("/filter/{id}/result");

    let (resp, json) = h.call(Method::PUT, &path, "1 60 5\n1 60 3\nbogus\n2 60 1\n");
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(json, json!({"status": "ok", "ack": 3, "lines": 4}));

    let (_, json) = h.call(Method::GET, &path, "");
    assert_eq!(
        json,
        json!({"status": "ok", "results": {"1": {"60": 8}, "2": {"60": 1}}})
    );

    let stored = h.handler.store().get(&FilterId::from(id.as_str())).unwrap();
    assert_eq!(stored.result(MetricId::MATCHES, BucketId(60)), 8);
}

#[test]
fn unknown_filter_is_not_found() {
    let h = Harness::new();

    let (resp, json) = h.call(Method::GET, "/filter/missing/result", "");
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "Filter missing not found");

    let (resp, _) = h.call(Method::PUT, "/filter/missing/result", "1 60 1\n");
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[test]
fn empty_id_is_validation_error() {
    let h = Harness::new();
    let (resp, json) = h.call(Method::GET, "/filter//result", "");
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Please provide an ID");
}

#[test]
fn delete_reports_whether_removed() {
    let h = Harness::new();
    let id = h.create("errors", "ERROR");
    let path = format!("/filter/{id}");

    let (_, json) = h.call(Method::DELETE, &path, "");
    assert_eq!(json, json!({"status": "ok", "deleted": true}));

    let (_, json) = h.call(Method::DELETE, &path, "");
    assert_eq!(json, json!({"status": "ok", "deleted": false}));

    let (resp, _) = h.call(Method::GET, &format!("{path}/result"), "");
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[test]
fn wrong_method_lists_allowed() {
    let h = Harness::new();
    let (resp, json) = h.call(Method::POST, "/filter/abc", "");

    assert_eq!(resp.status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(json["status"], "error");
    assert_eq!(
        resp.headers,
        vec![(header::ALLOW, "DELETE".to_owned())]
    );
}

#[test]
fn unknown_path_is_not_found() {
    let h = Harness::new();
    let (resp, _) = h.call(Method::GET, "/metrics", "");
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}
