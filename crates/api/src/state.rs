use std::sync::Arc;

use endpoint_relay_dispatch::{Collaborators, Transport};
use endpoint_relay_domain::services::{
    telemetry::TelemetryGuard, EnvironmentContext, ProgressSink,
};
use endpoint_relay_domain::storage::RecordStore;

#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn RecordStore>,
    transport: Arc<dyn Transport>,
    environment: Arc<dyn EnvironmentContext>,
    progress: Arc<dyn ProgressSink>,
    config_name: Arc<str>,
    telemetry: TelemetryGuard,
}

impl AppState {
    pub fn new(
        store: Arc<dyn RecordStore>,
        transport: Arc<dyn Transport>,
        environment: Arc<dyn EnvironmentContext>,
        progress: Arc<dyn ProgressSink>,
        config_name: impl Into<Arc<str>>,
        telemetry: TelemetryGuard,
    ) -> Self {
        Self {
            store,
            transport,
            environment,
            progress,
            config_name: config_name.into(),
            telemetry,
        }
    }

    pub fn collaborators(&self) -> Collaborators<'_> {
        Collaborators {
            store: self.store.as_ref(),
            transport: self.transport.as_ref(),
            environment: self.environment.as_ref(),
            progress: self.progress.as_ref(),
        }
    }

    pub fn config_name(&self) -> &str {
        &self.config_name
    }

    pub fn telemetry(&self) -> &TelemetryGuard {
        &self.telemetry
    }
}
