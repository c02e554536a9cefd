//! Shared application state handed to every HTTP handler and middleware.

use std::sync::Arc;

use apiary_bus::EventPublisher;
use apiary_persistence::PersistenceService;
use metrics_exporter_prometheus::PrometheusHandle;

use super::config::Configuration;

pub struct AppState {
    pub configuration: Configuration,
    pub persistence: Arc<dyn PersistenceService>,
    pub publisher: Arc<dyn EventPublisher>,
    /// Render handle for `/metrics`; absent when no recorder was installed
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(
        configuration: Configuration,
        persistence: Arc<dyn PersistenceService>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            configuration,
            persistence,
            publisher,
            prometheus: None,
        }
    }

    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }

    pub fn persistence(&self) -> &dyn PersistenceService {
        self.persistence.as_ref()
    }

    pub fn publisher(&self) -> &dyn EventPublisher {
        self.publisher.as_ref()
    }

    pub fn token_secret_key(&self) -> String {
        self.configuration.token_secret_key()
    }
}
