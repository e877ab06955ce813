use crate::error::RelayError;
use crate::model::{EndpointMap, ResolvedEndpoint};

/// Picks the endpoint configured for `current_environment`.
///
/// Returns `Ok(None)` when the payload is well formed but has no usable
/// entry for the environment; malformed payloads are `MalformedConfig`.
/// Duplicate environments resolve to the first occurrence, and a first
/// occurrence with an empty endpoint counts as no match.
pub fn select_endpoint(
    raw_text: &str,
    current_environment: &str,
) -> Result<Option<ResolvedEndpoint>, RelayError> {
    let map = EndpointMap::parse(raw_text)?;
    Ok(map
        .find(current_environment)
        .filter(|entry| !entry.endpoint.is_empty())
        .map(|entry| ResolvedEndpoint::new(entry.endpoint.clone())))
}
