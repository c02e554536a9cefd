//! SQL persistence backend (PostgreSQL via SeaORM)
//!
//! `ExternalDbPersistService` implements every persistence trait on top of a
//! pooled `DatabaseConnection`. All values are bound as parameters; nothing is
//! interpolated into SQL text.

mod activity;
mod apiary;
mod crud;
mod iot;
mod procedure;
mod region;
mod report;
mod user;
mod veterinary;

use async_trait::async_trait;
use sea_orm::DatabaseConnection;

use crate::traits::PersistenceService;

pub(crate) use crud::store_error;

/// External database persistence service
///
/// Owns the connection pool. The supervisor takes it back with `into_db` and
/// closes it last on shutdown.
pub struct ExternalDbPersistService {
    db: DatabaseConnection,
}

impl ExternalDbPersistService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn into_db(self) -> DatabaseConnection {
        self.db
    }
}

#[async_trait]
impl PersistenceService for ExternalDbPersistService {
    async fn health_check(&self) -> anyhow::Result<()> {
        self.db
            .ping()
            .await
            .map_err(|e| store_error(e, "database ping failed"))
    }
}
