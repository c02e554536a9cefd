//! Shared fixtures for the HTTP integration tests.
//!
//! The store is an `ExternalDbPersistService` over a sea-orm `MockDatabase`,
//! so each test scripts the rows its requests will read, in order.

#![allow(dead_code)]

use std::sync::Arc;

use apiary_auth::service::token::encode_jwt_token;
use apiary_bus::{BusError, EventPublisher};
use apiary_persistence::ExternalDbPersistService;
use apiary_persistence::sea_orm::DatabaseConnection;
use apiary_server::{AppState, Configuration};
use async_trait::async_trait;
use parking_lot::Mutex;

pub const SECRET: &str = "integration-test-secret";

/// Keeps every published message instead of talking to a broker
#[derive(Default)]
pub struct RecordingPublisher {
    messages: Mutex<Vec<(String, serde_json::Value)>>,
    fail: bool,
}

impl RecordingPublisher {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn messages(&self) -> Vec<(String, serde_json::Value)> {
        self.messages.lock().clone()
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, queue: &str, body: Vec<u8>) -> Result<(), BusError> {
        if self.fail {
            return Err(BusError::NotConfirmed(queue.to_string()));
        }
        let value = serde_json::from_slice(&body)?;
        self.messages.lock().push((queue.to_string(), value));
        Ok(())
    }
}

pub fn configuration() -> Configuration {
    let config = config::Config::builder()
        .set_override("jwt_secret", SECRET)
        .and_then(|builder| builder.set_override("jwt_expire_seconds", 3600))
        .and_then(|builder| builder.build())
        .unwrap();
    Configuration::from_config(config)
}

pub fn app_state(db: DatabaseConnection, publisher: Arc<RecordingPublisher>) -> Arc<AppState> {
    Arc::new(AppState::new(
        configuration(),
        Arc::new(ExternalDbPersistService::new(db)),
        publisher,
    ))
}

/// Like [`app_state`], but the caller keeps a handle on the store so the
/// statements it ran can be inspected with [`statements`].
pub fn shared_state(
    store: Arc<ExternalDbPersistService>,
    publisher: Arc<RecordingPublisher>,
) -> Arc<AppState> {
    Arc::new(AppState::new(configuration(), store, publisher))
}

/// Debug dump of every statement the mock store ran, in order. Drop the app
/// and its state first so the store is no longer shared.
pub fn statements(store: Arc<ExternalDbPersistService>) -> String {
    let store = Arc::try_unwrap(store)
        .ok()
        .expect("store is still shared by the app");
    format!("{:?}", store.into_db().into_transaction_log())
}

pub fn bearer(user_id: i32, role: &str) -> String {
    let token = encode_jwt_token(user_id, role, SECRET, 3600).unwrap();
    format!("Bearer {}", token)
}

/// Build the full route table around `$state`, optionally wrapped in extra middleware
#[macro_export]
macro_rules! init_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::from($state))
                .configure(apiary_server::api::configure),
        )
        .await
    };
    ($state:expr, $middleware:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap($middleware)
                .app_data(actix_web::web::Data::from($state))
                .configure(apiary_server::api::configure),
        )
        .await
    };
}
