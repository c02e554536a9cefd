//! Persistence traits grouped by domain.
//!
//! Every operation returns `anyhow::Result`. A missing row surfaces as
//! `ApiaryError::NotFound`, a uniqueness or foreign-key violation as
//! `ApiaryError::Conflict`; both are carried inside the anyhow chain.

pub mod activity;
pub mod apiary;
pub mod iot;
pub mod procedure;
pub mod region;
pub mod report;
pub mod user;
pub mod veterinary;

pub use activity::ActivityPersistence;
pub use apiary::ApiaryPersistence;
pub use iot::IotPersistence;
pub use procedure::ProcedurePersistence;
pub use region::RegionPersistence;
pub use report::ReportPersistence;
pub use user::UserPersistence;
pub use veterinary::VeterinaryPersistence;

use async_trait::async_trait;

/// Unified persistence service trait
///
/// The single handle shared by HTTP handlers, gRPC handlers and workers.
#[async_trait]
pub trait PersistenceService:
    ApiaryPersistence
    + ActivityPersistence
    + VeterinaryPersistence
    + IotPersistence
    + RegionPersistence
    + UserPersistence
    + ReportPersistence
    + ProcedurePersistence
    + Send
    + Sync
{
    /// Liveness ping against the store
    async fn health_check(&self) -> anyhow::Result<()>;
}
