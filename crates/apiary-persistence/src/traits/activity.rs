//! Field activity persistence trait
//!
//! Observation logs, maintenance plans and incidents.

use async_trait::async_trait;

use crate::model::{Incident, MaintenancePlan, ObservationLog};

#[async_trait]
pub trait ActivityPersistence: Send + Sync {
    // ==================== Observation Operations ====================

    async fn observation_get(&self, log_id: i32) -> anyhow::Result<ObservationLog>;

    async fn observation_list(&self) -> anyhow::Result<Vec<ObservationLog>>;

    async fn observation_create(&self, log: ObservationLog) -> anyhow::Result<ObservationLog>;

    async fn observation_update(&self, log: ObservationLog) -> anyhow::Result<ObservationLog>;

    async fn observation_delete(&self, log_id: i32) -> anyhow::Result<()>;

    // ==================== Maintenance Plan Operations ====================

    async fn maintenance_get(&self, plan_id: i32) -> anyhow::Result<MaintenancePlan>;

    async fn maintenance_list(&self) -> anyhow::Result<Vec<MaintenancePlan>>;

    async fn maintenance_create(&self, plan: MaintenancePlan) -> anyhow::Result<MaintenancePlan>;

    async fn maintenance_update(&self, plan: MaintenancePlan) -> anyhow::Result<MaintenancePlan>;

    /// Read-modify-write of the status label only
    async fn maintenance_update_status(
        &self,
        plan_id: i32,
        status: &str,
    ) -> anyhow::Result<MaintenancePlan>;

    async fn maintenance_delete(&self, plan_id: i32) -> anyhow::Result<()>;

    // ==================== Incident Operations ====================

    async fn incident_get(&self, incident_id: i32) -> anyhow::Result<Incident>;

    async fn incident_list(&self) -> anyhow::Result<Vec<Incident>>;

    async fn incident_create(&self, incident: Incident) -> anyhow::Result<Incident>;

    async fn incident_update(&self, incident: Incident) -> anyhow::Result<Incident>;

    /// Read-modify-write of the severity label only
    async fn incident_update_severity(
        &self,
        incident_id: i32,
        severity: &str,
    ) -> anyhow::Result<Incident>;

    async fn incident_delete(&self, incident_id: i32) -> anyhow::Result<()>;
}
