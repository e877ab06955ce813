use endpoint_relay_domain::model::{RequestOutcome, ResolvedEndpoint};
use metrics::counter;
use reqwest::{
    header::{HeaderMap, HeaderValue, CONTENT_TYPE},
    Method,
};
use serde_json::Value;
use tracing::{info, warn};

use crate::transport::{OutboundRequest, Transport};

/// POST with a JSON content type and `payload` as body.
pub fn build_request(endpoint: &ResolvedEndpoint, payload: &Value) -> OutboundRequest {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    OutboundRequest {
        url: endpoint.as_str().to_string(),
        method: Method::POST,
        headers,
        body: payload.to_string(),
    }
}

/// Sends exactly one request and classifies what came back. There is no
/// retry; the transport's own defaults bound how long this takes.
pub async fn dispatch<T>(
    transport: &T,
    endpoint: &ResolvedEndpoint,
    payload: &Value,
) -> RequestOutcome
where
    T: Transport + ?Sized,
{
    let outcome = match transport.send(build_request(endpoint, payload)).await {
        Ok(response) if response.ok => RequestOutcome::Success(response),
        Ok(response) => RequestOutcome::Failure {
            status: response.status,
            status_text: response.status_text,
        },
        Err(err) => RequestOutcome::TransportError(err),
    };

    match &outcome {
        RequestOutcome::Success(response) => {
            info!(%endpoint, status = response.status, "request succeeded");
        }
        RequestOutcome::Failure {
            status,
            status_text,
        } => {
            warn!(
                %endpoint,
                status,
                status_text = status_text.as_str(),
                "request rejected"
            );
        }
        RequestOutcome::TransportError(err) => {
            warn!(%endpoint, error = %err, "request could not be sent");
        }
    }
    let result_tag = outcome.as_ref().to_owned();
    counter!("relay_dispatch_total", "result" => result_tag).increment(1);

    outcome
}
