//! Store-side functions and procedures.
//!
//! Thin wrappers over `SELECT fn(..)` / `CALL proc(..)`; the gRPC facade is
//! their only caller.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::model::LatestSensorReading;

#[async_trait]
pub trait ProcedurePersistence: Send + Sync {
    async fn total_honey_harvested(
        &self,
        hive_id: i32,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<f64>;

    async fn add_observation(
        &self,
        hive_id: i32,
        observation_date: DateTime<Utc>,
        description: &str,
        recommendations: &str,
    ) -> anyhow::Result<()>;

    async fn community_health_status(&self, community_id: i32) -> anyhow::Result<String>;

    async fn update_hive_status(&self, hive_id: i32, new_status: &str) -> anyhow::Result<()>;

    async fn avg_temperature(&self, region_id: i32, days: i32) -> anyhow::Result<f64>;

    async fn assign_maintenance_plan(&self, plan_id: i32, user_id: i32) -> anyhow::Result<()>;

    async fn has_region_access(&self, user_id: i32, region_id: i32) -> anyhow::Result<bool>;

    async fn register_incident(
        &self,
        hive_id: i32,
        incident_date: DateTime<Utc>,
        description: &str,
        severity: &str,
    ) -> anyhow::Result<()>;

    /// `None` when the hive has no sensor of that type with a reading
    async fn latest_sensor_reading(
        &self,
        hive_id: i32,
        sensor_type: &str,
    ) -> anyhow::Result<Option<LatestSensorReading>>;

    async fn create_production_report(
        &self,
        apiary_id: i32,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<()>;
}
