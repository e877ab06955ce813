//! Data structures read or produced while resolving and calling an endpoint.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum_macros::AsRefStr;
use thiserror::Error;

use crate::error::RelayError;

/// Opaque identifier of a configuration definition record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DefinitionId(String);

impl DefinitionId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for DefinitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDefinition {
    pub id: DefinitionId,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValue {
    pub definition_id: DefinitionId,
    pub raw_text: String,
}

/// One `environment -> endpoint` association inside the configuration payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointEntry {
    pub environment: String,
    pub endpoint: String,
}

/// Decoded `rawText` payload. Entry order is preserved from the JSON array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointMap {
    #[serde(rename = "Endpoints")]
    pub endpoints: Vec<EndpointEntry>,
}

impl EndpointMap {
    pub fn parse(raw_text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw_text)
    }

    /// First entry whose environment matches exactly.
    pub fn find(&self, environment: &str) -> Option<&EndpointEntry> {
        self.endpoints
            .iter()
            .find(|entry| entry.environment == environment)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedEndpoint(String);

impl ResolvedEndpoint {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ResolvedEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Response as reported by the transport, including its own ok/not-ok call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub status_text: String,
    pub ok: bool,
    pub body: String,
}

/// Failure raised before any response existed (DNS, connect, TLS, ...).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct TransportError(String);

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn from_source(err: impl fmt::Display) -> Self {
        Self(err.to_string())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum RequestOutcome {
    Success(TransportResponse),
    Failure { status: u16, status_text: String },
    TransportError(TransportError),
}

impl RequestOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Collapses the outcome into the relay error taxonomy.
    pub fn into_result(self) -> Result<TransportResponse, RelayError> {
        match self {
            Self::Success(response) => Ok(response),
            Self::Failure {
                status,
                status_text,
            } => Err(RelayError::RequestFailed {
                status,
                reason: status_text,
            }),
            Self::TransportError(err) => Err(RelayError::Transport(err)),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("identifier is empty")]
    Empty,
    #[error("identifier `{0}` contains only brace delimiters")]
    OnlyDelimiters(String),
}

/// Strips the `{...}` wrapping some hosts put around record identifiers.
pub fn normalize_identifier(id: &str) -> Result<String, IdentifierError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(IdentifierError::Empty);
    }

    let stripped = trimmed
        .trim_start_matches('{')
        .trim_end_matches('}')
        .trim();
    if stripped.is_empty() {
        return Err(IdentifierError::OnlyDelimiters(trimmed.to_string()));
    }

    Ok(stripped.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_braces() {
        assert_eq!(normalize_identifier("{123-abc}").unwrap(), "123-abc");
        assert_eq!(normalize_identifier("123-abc").unwrap(), "123-abc");
        assert_eq!(normalize_identifier(" {ABC} ").unwrap(), "ABC");
    }

    #[test]
    fn normalize_rejects_empty_and_bare_delimiters() {
        assert_eq!(normalize_identifier(""), Err(IdentifierError::Empty));
        assert_eq!(normalize_identifier("   "), Err(IdentifierError::Empty));
        assert_eq!(
            normalize_identifier("{}"),
            Err(IdentifierError::OnlyDelimiters("{}".to_string()))
        );
    }

    #[test]
    fn endpoint_map_preserves_order() {
        let map = EndpointMap::parse(
            r#"{"Endpoints":[{"environment":"E1","endpoint":"https://first"},{"environment":"E1","endpoint":"https://second"}]}"#,
        )
        .unwrap();
        assert_eq!(map.endpoints.len(), 2);
        assert_eq!(map.find("E1").unwrap().endpoint, "https://first");
    }

    #[test]
    fn outcome_labels_are_snake_case() {
        let failure = RequestOutcome::Failure {
            status: 500,
            status_text: "Internal Server Error".into(),
        };
        assert_eq!(failure.as_ref(), "failure");
        let transport = RequestOutcome::TransportError(TransportError::new("refused"));
        assert_eq!(transport.as_ref(), "transport_error");
    }

    #[test]
    fn failure_outcome_maps_to_request_failed() {
        let err = RequestOutcome::Failure {
            status: 503,
            status_text: "Service Unavailable".into(),
        }
        .into_result()
        .unwrap_err();
        assert!(matches!(
            err,
            RelayError::RequestFailed { status: 503, ref reason } if reason == "Service Unavailable"
        ));
    }
}
