use async_trait::async_trait;
use sea_orm::*;

use super::{ExternalDbPersistService, crud};
use crate::entity::{incident, maintenance_plan, observation_log};
use crate::model::{Incident, MaintenancePlan, ObservationLog};
use crate::traits::ActivityPersistence;

#[async_trait]
impl ActivityPersistence for ExternalDbPersistService {
    // ==================== Observation Operations ====================

    async fn observation_get(&self, log_id: i32) -> anyhow::Result<ObservationLog> {
        crud::find_by_id::<_, observation_log::Entity>(&self.db, "observation", log_id).await
    }

    async fn observation_list(&self) -> anyhow::Result<Vec<ObservationLog>> {
        crud::find_all::<_, observation_log::Entity>(&self.db, "observations").await
    }

    async fn observation_create(&self, log: ObservationLog) -> anyhow::Result<ObservationLog> {
        let mut active = log.into_active_model().reset_all();
        active.log_id = NotSet;
        crud::insert(&self.db, "observation", active).await
    }

    async fn observation_update(&self, log: ObservationLog) -> anyhow::Result<ObservationLog> {
        let id = log.log_id;
        crud::update(&self.db, "observation", id, log.into_active_model().reset_all()).await
    }

    async fn observation_delete(&self, log_id: i32) -> anyhow::Result<()> {
        crud::delete_by_id::<_, observation_log::Entity>(&self.db, "observation", log_id).await
    }

    // ==================== Maintenance Plan Operations ====================

    async fn maintenance_get(&self, plan_id: i32) -> anyhow::Result<MaintenancePlan> {
        crud::find_by_id::<_, maintenance_plan::Entity>(&self.db, "maintenance plan", plan_id)
            .await
    }

    async fn maintenance_list(&self) -> anyhow::Result<Vec<MaintenancePlan>> {
        crud::find_all::<_, maintenance_plan::Entity>(&self.db, "maintenance plans").await
    }

    async fn maintenance_create(&self, plan: MaintenancePlan) -> anyhow::Result<MaintenancePlan> {
        let mut active = plan.into_active_model().reset_all();
        active.plan_id = NotSet;
        crud::insert(&self.db, "maintenance plan", active).await
    }

    async fn maintenance_update(&self, plan: MaintenancePlan) -> anyhow::Result<MaintenancePlan> {
        let id = plan.plan_id;
        crud::update(
            &self.db,
            "maintenance plan",
            id,
            plan.into_active_model().reset_all(),
        )
        .await
    }

    async fn maintenance_update_status(
        &self,
        plan_id: i32,
        status: &str,
    ) -> anyhow::Result<MaintenancePlan> {
        let mut plan = self.maintenance_get(plan_id).await?;
        plan.status = status.to_string();
        self.maintenance_update(plan).await
    }

    async fn maintenance_delete(&self, plan_id: i32) -> anyhow::Result<()> {
        crud::delete_by_id::<_, maintenance_plan::Entity>(&self.db, "maintenance plan", plan_id)
            .await
    }

    // ==================== Incident Operations ====================

    async fn incident_get(&self, incident_id: i32) -> anyhow::Result<Incident> {
        crud::find_by_id::<_, incident::Entity>(&self.db, "incident", incident_id).await
    }

    async fn incident_list(&self) -> anyhow::Result<Vec<Incident>> {
        crud::find_all::<_, incident::Entity>(&self.db, "incidents").await
    }

    async fn incident_create(&self, incident: Incident) -> anyhow::Result<Incident> {
        let mut active = incident.into_active_model().reset_all();
        active.incident_id = NotSet;
        crud::insert(&self.db, "incident", active).await
    }

    async fn incident_update(&self, incident: Incident) -> anyhow::Result<Incident> {
        let id = incident.incident_id;
        crud::update(&self.db, "incident", id, incident.into_active_model().reset_all()).await
    }

    async fn incident_update_severity(
        &self,
        incident_id: i32,
        severity: &str,
    ) -> anyhow::Result<Incident> {
        let mut incident = self.incident_get(incident_id).await?;
        incident.severity = severity.to_string();
        self.incident_update(incident).await
    }

    async fn incident_delete(&self, incident_id: i32) -> anyhow::Result<()> {
        crud::delete_by_id::<_, incident::Entity>(&self.db, "incident", incident_id).await
    }
}
