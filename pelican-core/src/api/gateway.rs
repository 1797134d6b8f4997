use crate::api::envelope::ApiResponse;
use crate::api::handler::{ApiRequest, RegistryHandler};
use async_trait::async_trait;
use bytes::Bytes;
use http::{StatusCode, header};
use pingora::prelude::{HttpPeer, ProxyHttp, Session};
use pingora::{Custom, Error};
use pingora_http::ResponseHeader;

/// Upper bound for a flushed batch body.
const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

/// Terminal pingora service: every request is answered by the registry handler.
pub struct RegistryGateway {
    handler: RegistryHandler,
}

impl RegistryGateway {
    pub fn new(handler: RegistryHandler) -> Self {
        Self { handler }
    }

    async fn read_body(session: &mut Session) -> pingora::Result<Option<Vec<u8>>> {
        let mut body = Vec::new();
        while let Some(chunk) = session.read_request_body().await? {
            if body.len() + chunk.len() > MAX_BODY_BYTES {
                return Ok(None);
            }
            body.extend_from_slice(&chunk);
        }
        Ok(Some(body))
    }

    async fn send_response(&self, session: &mut Session, resp: ApiResponse) -> pingora::Result<()> {
        let body = resp.body();

        let mut header = ResponseHeader::build(resp.status, None)?;
        header.insert_header(header::CONTENT_TYPE, "application/json")?;
        header.insert_header(header::CONTENT_LENGTH, body.len().to_string())?;
        for (name, value) in resp.headers {
            header.insert_header(name, value)?;
        }

        session.write_response_header(Box::new(header), false).await?;
        session.write_response_body(Some(Bytes::from(body)), true).await?;

        Ok(())
    }
}

#[async_trait]
impl ProxyHttp for RegistryGateway {
    type CTX = ();

    fn new_ctx(&self) -> Self::CTX {}

    async fn upstream_peer(
        &self,
        _session: &mut Session,
        _ctx: &mut Self::CTX,
    ) -> pingora::Result<Box<HttpPeer>> {
        // request_filter always answers, nothing is ever proxied.
        Err(Error::new(Custom(
            "RegistryGateway attempted to proxy upstream (bug)",
        )))
    }

    async fn request_filter(
        &self,
        session: &mut Session,
        _ctx: &mut Self::CTX,
    ) -> pingora::Result<bool> {
        let req_header = session.req_header();
        let method = req_header.method.clone();
        let path = req_header.uri.path().to_owned();
        let query = req_header.uri.query().map(str::to_owned);
        let authorization = req_header
            .headers
            .get(header::AUTHORIZATION)
            .map(|v| v.as_bytes().to_vec());
        let remote_addr = session.client_addr().map(|a| a.to_string());

        let Some(body) = Self::read_body(session).await? else {
            let resp = ApiResponse::error(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large");
            self.send_response(session, resp).await?;
            return Ok(true);
        };

        let resp = self.handler.handle(&ApiRequest {
            method: &method,
            path: &path,
            query: query.as_deref(),
            authorization: authorization.as_deref(),
            remote_addr,
            body: &body,
        });

        tracing::info!(
            method = %method,
            path,
            status = resp.status.as_u16(),
            "registry request"
        );

        self.send_response(session, resp).await?;
        Ok(true)
    }
}
