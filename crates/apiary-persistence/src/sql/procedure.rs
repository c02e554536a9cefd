use apiary_common::ApiaryError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, DbBackend, QueryResult, Statement, Value};

use super::{ExternalDbPersistService, store_error};
use crate::model::LatestSensorReading;
use crate::traits::ProcedurePersistence;

impl ExternalDbPersistService {
    async fn call_procedure<I>(&self, name: &str, sql: &str, values: I) -> anyhow::Result<()>
    where
        I: IntoIterator<Item = Value>,
    {
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, values);
        self.db
            .execute(stmt)
            .await
            .map_err(|e| store_error(e, format!("failed to call {}", name)))?;
        Ok(())
    }

    async fn select_function<I>(
        &self,
        name: &str,
        sql: &str,
        values: I,
    ) -> anyhow::Result<Option<QueryResult>>
    where
        I: IntoIterator<Item = Value>,
    {
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, values);
        self.db
            .query_one(stmt)
            .await
            .map_err(|e| store_error(e, format!("failed to call {}", name)))
    }

    async fn select_scalar<T, I>(&self, name: &str, sql: &str, values: I) -> anyhow::Result<T>
    where
        T: sea_orm::TryGetable,
        I: IntoIterator<Item = Value>,
    {
        let row = self
            .select_function(name, sql, values)
            .await?
            .ok_or_else(|| anyhow::anyhow!("{} returned no row", name))?;
        row.try_get::<T>("", "result")
            .map_err(|e| store_error(e, format!("failed to read result of {}", name)))
    }
}

#[async_trait]
impl ProcedurePersistence for ExternalDbPersistService {
    async fn total_honey_harvested(
        &self,
        hive_id: i32,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<f64> {
        self.select_scalar(
            "get_total_honey_harvested",
            "SELECT get_total_honey_harvested($1, $2, $3)::float8 AS result",
            [hive_id.into(), start.into(), end.into()],
        )
        .await
    }

    async fn add_observation(
        &self,
        hive_id: i32,
        observation_date: DateTime<Utc>,
        description: &str,
        recommendations: &str,
    ) -> anyhow::Result<()> {
        self.call_procedure(
            "add_observation",
            "CALL add_observation($1, $2, $3, $4)",
            [
                hive_id.into(),
                observation_date.into(),
                description.into(),
                recommendations.into(),
            ],
        )
        .await
    }

    async fn community_health_status(&self, community_id: i32) -> anyhow::Result<String> {
        let status: Option<String> = self
            .select_scalar(
                "get_community_health_status",
                "SELECT get_community_health_status($1)::text AS result",
                [community_id.into()],
            )
            .await?;
        status.ok_or_else(|| ApiaryError::not_found("bee community", community_id).into())
    }

    async fn update_hive_status(&self, hive_id: i32, new_status: &str) -> anyhow::Result<()> {
        self.call_procedure(
            "update_hive_status",
            "CALL update_hive_status($1, $2)",
            [hive_id.into(), new_status.into()],
        )
        .await
    }

    async fn avg_temperature(&self, region_id: i32, days: i32) -> anyhow::Result<f64> {
        self.select_scalar(
            "get_avg_temperature",
            "SELECT get_avg_temperature($1, $2)::float8 AS result",
            [region_id.into(), days.into()],
        )
        .await
    }

    async fn assign_maintenance_plan(&self, plan_id: i32, user_id: i32) -> anyhow::Result<()> {
        self.call_procedure(
            "assign_maintenance_plan",
            "CALL assign_maintenance_plan($1, $2)",
            [plan_id.into(), user_id.into()],
        )
        .await
    }

    async fn has_region_access(&self, user_id: i32, region_id: i32) -> anyhow::Result<bool> {
        self.select_scalar(
            "has_region_access",
            "SELECT has_region_access($1, $2) AS result",
            [user_id.into(), region_id.into()],
        )
        .await
    }

    async fn register_incident(
        &self,
        hive_id: i32,
        incident_date: DateTime<Utc>,
        description: &str,
        severity: &str,
    ) -> anyhow::Result<()> {
        self.call_procedure(
            "register_incident",
            "CALL register_incident($1, $2, $3, $4)",
            [
                hive_id.into(),
                incident_date.into(),
                description.into(),
                severity.into(),
            ],
        )
        .await
    }

    async fn latest_sensor_reading(
        &self,
        hive_id: i32,
        sensor_type: &str,
    ) -> anyhow::Result<Option<LatestSensorReading>> {
        let row = self
            .select_function(
                "get_latest_sensor_reading",
                r#"SELECT value, "timestamp" FROM get_latest_sensor_reading($1, $2)"#,
                [hive_id.into(), sensor_type.into()],
            )
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let value: Vec<u8> = row
            .try_get("", "value")
            .map_err(|e| store_error(e, "failed to read latest sensor reading value"))?;
        let timestamp: Option<DateTime<Utc>> = row
            .try_get("", "timestamp")
            .map_err(|e| store_error(e, "failed to read latest sensor reading timestamp"))?;
        Ok(Some(LatestSensorReading { value, timestamp }))
    }

    async fn create_production_report(
        &self,
        apiary_id: i32,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        self.call_procedure(
            "create_production_report",
            "CALL create_production_report($1, $2, $3)",
            [apiary_id.into(), start.into(), end.into()],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    use super::*;

    #[tokio::test]
    async fn test_total_honey_reads_scalar() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![BTreeMap::from([(
                "result",
                Into::<Value>::into(42.5f64),
            )])]])
            .into_connection();
        let service = ExternalDbPersistService::new(db);

        let start = Utc::now();
        let total = service
            .total_honey_harvested(1, start, start)
            .await
            .unwrap();
        assert_eq!(total, 42.5);

        let log = format!("{:?}", service.into_db().into_transaction_log());
        assert!(log.contains("get_total_honey_harvested($1, $2, $3)"), "{}", log);
    }

    #[tokio::test]
    async fn test_latest_sensor_reading_absent_row() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<BTreeMap<&str, Value>>::new()])
            .into_connection();
        let service = ExternalDbPersistService::new(db);

        let reading = service.latest_sensor_reading(1, "humidity").await.unwrap();
        assert!(reading.is_none());
    }

    #[tokio::test]
    async fn test_latest_sensor_reading_without_timestamp() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![BTreeMap::from([
                ("value", Into::<Value>::into(vec![1u8])),
                ("timestamp", Value::ChronoDateTimeUtc(None)),
            ])]])
            .into_connection();
        let service = ExternalDbPersistService::new(db);

        let reading = service
            .latest_sensor_reading(1, "humidity")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reading.value, vec![1u8]);
        assert!(reading.timestamp.is_none());
    }

    #[tokio::test]
    async fn test_procedures_bind_parameters() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let service = ExternalDbPersistService::new(db);

        service
            .update_hive_status(5, "'; DROP TABLE hive; --")
            .await
            .unwrap();

        let log = format!("{:?}", service.into_db().into_transaction_log());
        assert!(log.contains("CALL update_hive_status($1, $2)"), "{}", log);
        assert!(!log.contains("update_hive_status(5"), "{}", log);
    }
}
