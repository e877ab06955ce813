/// Accessor for the caller's present execution environment (typically the
/// host's base URL).
pub trait EnvironmentContext: Send + Sync {
    fn current_environment(&self) -> String;
}

/// Environment fixed at startup, e.g. from `RELAY_CURRENT_ENVIRONMENT`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticEnvironment(String);

impl StaticEnvironment {
    pub fn new(environment: impl Into<String>) -> Self {
        Self(environment.into())
    }
}

impl EnvironmentContext for StaticEnvironment {
    fn current_environment(&self) -> String {
        self.0.clone()
    }
}
