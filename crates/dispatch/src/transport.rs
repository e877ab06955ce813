use std::sync::Arc;

use async_trait::async_trait;
use endpoint_relay_domain::model::{TransportError, TransportResponse};
use reqwest::{header::HeaderMap, redirect, Client, Method};
use tracing::warn;

/// Redirects followed by `ReqwestTransport` before giving up.
pub const MAX_REDIRECTS: usize = 10;

/// One outbound call. Redirects are always followed, up to `MAX_REDIRECTS`.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub url: String,
    pub method: Method,
    pub headers: HeaderMap,
    pub body: String,
}

/// Generic fetch capability. Errors are reserved for failures that happen
/// before a response exists; any HTTP status comes back as a response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: OutboundRequest) -> Result<TransportResponse, TransportError>;
}

#[async_trait]
impl<T> Transport for Arc<T>
where
    T: Transport + ?Sized,
{
    async fn send(&self, request: OutboundRequest) -> Result<TransportResponse, TransportError> {
        self.as_ref().send(request).await
    }
}

/// `reqwest`-backed transport with a bounded redirect policy.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, TransportError> {
        let client = Client::builder()
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(TransportError::from_source)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: OutboundRequest) -> Result<TransportResponse, TransportError> {
        let response = self
            .client
            .request(request.method, &request.url)
            .headers(request.headers)
            .body(request.body)
            .send()
            .await
            .map_err(TransportError::from_source)?;

        let status = response.status();
        let status_text = status.canonical_reason().unwrap_or_default().to_string();
        // The status line already arrived, so a broken body must not turn the
        // outcome into a transport failure.
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => {
                warn!(status = status.as_u16(), error = %err, "response body unreadable");
                String::new()
            }
        };

        Ok(TransportResponse {
            status: status.as_u16(),
            status_text,
            ok: status.is_success(),
            body,
        })
    }
}
