//! One user-triggered action: resolve the endpoint for the current
//! environment, post the record id to it, and report the outcome.

use endpoint_relay_domain::{
    error::RelayError,
    model::{normalize_identifier, TransportResponse},
    services::{
        resolve_config, select_endpoint, BusyGuard, EnvironmentContext, ProgressSink,
        BUSY_MESSAGE,
    },
    storage::RecordStore,
};
use metrics::counter;
use serde_json::json;
use tracing::{debug, info};

use crate::{dispatcher::dispatch, transport::Transport};

/// Context passed to `ProgressSink::log_error` when an action fails.
pub const ACTION_ERROR_CONTEXT: &str = "endpoint action failed";

/// Everything an action talks to, passed in explicitly.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub store: &'a dyn RecordStore,
    pub transport: &'a dyn Transport,
    pub environment: &'a dyn EnvironmentContext,
    pub progress: &'a dyn ProgressSink,
}

/// Runs the action for `record_id` against the configuration named
/// `config_name`. The busy indicator is shown first and cleared on every
/// exit; failures are logged once here and returned unchanged.
pub async fn run_action(
    collaborators: Collaborators<'_>,
    config_name: &str,
    record_id: &str,
) -> Result<TransportResponse, RelayError> {
    // Shown before any work; cleared when `_busy` drops, however this exits.
    let _busy = BusyGuard::show(collaborators.progress, BUSY_MESSAGE);

    let result = execute(&collaborators, config_name, record_id).await;
    // Single reporting point: nothing below this function logs failures.
    match &result {
        Ok(response) => {
            info!(config_name, status = response.status, "endpoint action succeeded");
            counter!("relay_actions_total", "result" => "ok").increment(1);
        }
        Err(err) => {
            collaborators.progress.log_error(ACTION_ERROR_CONTEXT, err);
            counter!("relay_actions_total", "result" => "error").increment(1);
        }
    }

    result
}

async fn execute(
    collaborators: &Collaborators<'_>,
    config_name: &str,
    record_id: &str,
) -> Result<TransportResponse, RelayError> {
    // 1. Reject bad identifiers before touching the store.
    let id = normalize_identifier(record_id)?;

    // 2. Definition, then value. Either lookup stops the action on a
    //    count other than one.
    let value = resolve_config(collaborators.store, config_name).await?;

    // 3. Pick the endpoint for where we run. No match means nothing is sent.
    let environment = collaborators.environment.current_environment();
    let endpoint = select_endpoint(&value.raw_text, &environment)?
        .ok_or(RelayError::NoEndpointForEnvironment { environment })?;
    debug!(config_name, %endpoint, "endpoint selected");

    // 4. One POST, no retry. A non-2xx status becomes `RequestFailed`.
    dispatch(collaborators.transport, &endpoint, &json!({ "id": id }))
        .await
        .into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use endpoint_relay_domain::model::TransportError;
    use endpoint_relay_domain::services::StaticEnvironment;
    use endpoint_relay_domain::storage::{
        fields, Record, RecordQuery, StorageResult, DEFINITION_TABLE,
    };
    use std::error::Error as StdError;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    };

    use crate::transport::OutboundRequest;

    const MAP: &str = r#"{"Endpoints":[{"environment":"E1","endpoint":"https://a"},{"environment":"E2","endpoint":"https://b"}]}"#;
    const CONFIG_NAME: &str = "Demo - Endpoint Addresses";

    struct StubStore {
        map: &'static str,
        queries: AtomicUsize,
    }

    impl StubStore {
        fn new(map: &'static str) -> Self {
            Self {
                map,
                queries: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl RecordStore for StubStore {
        async fn query(&self, query: &RecordQuery) -> StorageResult<Vec<Record>> {
            self.queries.fetch_add(1, Ordering::SeqCst);
            if query.table_name() == DEFINITION_TABLE {
                Ok(vec![Record::new()
                    .with_field(fields::ID, "def-1")
                    .with_field(fields::DISPLAY_NAME, CONFIG_NAME)])
            } else {
                Ok(vec![Record::new().with_field(fields::RAW_TEXT, self.map)])
            }
        }
    }

    struct StubTransport {
        reply: Result<TransportResponse, TransportError>,
        requests: Mutex<Vec<OutboundRequest>>,
    }

    impl StubTransport {
        fn status(status: u16, status_text: &str) -> Self {
            Self {
                reply: Ok(TransportResponse {
                    status,
                    status_text: status_text.to_string(),
                    ok: (200..300).contains(&status),
                    body: "accepted".to_string(),
                }),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Transport for StubTransport {
        async fn send(
            &self,
            request: OutboundRequest,
        ) -> Result<TransportResponse, TransportError> {
            self.requests.lock().unwrap().push(request);
            self.reply.clone()
        }
    }

    #[derive(Default)]
    struct RecordingProgress {
        events: Mutex<Vec<String>>,
    }

    impl RecordingProgress {
        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }

        fn count(&self, event: &str) -> usize {
            self.events().iter().filter(|e| e.as_str() == event).count()
        }
    }

    impl ProgressSink for RecordingProgress {
        fn show_busy(&self, _message: &str) {
            self.events.lock().unwrap().push("show".into());
        }

        fn clear_busy(&self) {
            self.events.lock().unwrap().push("clear".into());
        }

        fn log_error(&self, _context: &str, _error: &(dyn StdError + 'static)) {
            self.events.lock().unwrap().push("error".into());
        }
    }

    struct Harness {
        store: StubStore,
        transport: StubTransport,
        environment: StaticEnvironment,
        progress: RecordingProgress,
    }

    impl Harness {
        fn new(environment: &str, transport: StubTransport) -> Self {
            Self::with_map(MAP, environment, transport)
        }

        fn with_map(map: &'static str, environment: &str, transport: StubTransport) -> Self {
            Self {
                store: StubStore::new(map),
                transport,
                environment: StaticEnvironment::new(environment),
                progress: RecordingProgress::default(),
            }
        }

        fn collaborators(&self) -> Collaborators<'_> {
            Collaborators {
                store: &self.store,
                transport: &self.transport,
                environment: &self.environment,
                progress: &self.progress,
            }
        }

        async fn run(&self, record_id: &str) -> Result<TransportResponse, RelayError> {
            run_action(self.collaborators(), CONFIG_NAME, record_id).await
        }
    }

    #[tokio::test]
    async fn successful_flow_posts_normalized_id() {
        let harness = Harness::new("E1", StubTransport::status(200, "OK"));

        let response = harness.run("{123-abc}").await.expect("action succeeds");
        assert_eq!(response.body, "accepted");

        assert_eq!(harness.progress.events(), vec!["show", "clear"]);
        let requests = harness.transport.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "https://a");
        assert_eq!(requests[0].body, r#"{"id":"123-abc"}"#);
        assert_eq!(harness.store.queries.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn server_error_is_request_failed_without_retry() {
        let harness = Harness::new("E1", StubTransport::status(500, "Internal Server Error"));

        let err = harness.run("123").await.unwrap_err();
        assert!(matches!(err, RelayError::RequestFailed { status: 500, .. }));
        assert_eq!(harness.transport.calls(), 1);
        assert_eq!(harness.progress.events(), vec!["show", "error", "clear"]);
    }

    #[tokio::test]
    async fn unknown_environment_never_contacts_an_endpoint() {
        let harness = Harness::new("E3", StubTransport::status(200, "OK"));

        let err = harness.run("123").await.unwrap_err();
        assert!(matches!(
            err,
            RelayError::NoEndpointForEnvironment { ref environment } if environment == "E3"
        ));
        assert_eq!(harness.transport.calls(), 0);
        assert_eq!(harness.progress.count("show"), 1);
        assert_eq!(harness.progress.count("clear"), 1);
    }

    #[tokio::test]
    async fn empty_endpoint_is_treated_as_unconfigured() {
        let map = r#"{"Endpoints":[{"environment":"E1","endpoint":""}]}"#;
        let harness = Harness::with_map(map, "E1", StubTransport::status(200, "OK"));

        let err = harness.run("123").await.unwrap_err();
        assert!(matches!(err, RelayError::NoEndpointForEnvironment { .. }));
        assert_eq!(harness.transport.calls(), 0);
        assert_eq!(harness.progress.events(), vec!["show", "error", "clear"]);
    }

    #[tokio::test]
    async fn invalid_identifier_is_rejected_before_any_query() {
        let harness = Harness::new("E1", StubTransport::status(200, "OK"));

        let err = harness.run("").await.unwrap_err();
        assert!(matches!(err, RelayError::InvalidIdentifier(_)));
        assert_eq!(harness.store.queries.load(Ordering::SeqCst), 0);
        assert_eq!(harness.transport.calls(), 0);
        assert_eq!(harness.progress.events(), vec!["show", "error", "clear"]);
    }

    #[tokio::test]
    async fn transport_failures_propagate() {
        let transport = StubTransport {
            reply: Err(TransportError::new("connection refused")),
            requests: Mutex::new(Vec::new()),
        };
        let harness = Harness::new("E2", transport);

        let err = harness.run("123").await.unwrap_err();
        assert!(matches!(err, RelayError::Transport(_)));
        assert_eq!(harness.transport.requests.lock().unwrap()[0].url, "https://b");
        assert_eq!(harness.progress.count("clear"), 1);
    }
}
