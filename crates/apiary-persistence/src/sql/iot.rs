use async_trait::async_trait;
use sea_orm::*;

use super::{ExternalDbPersistService, crud, store_error};
use crate::entity::{sensor, sensor_reading};
use crate::model::{Sensor, SensorReading};
use crate::traits::IotPersistence;

#[async_trait]
impl IotPersistence for ExternalDbPersistService {
    // ==================== Sensor Operations ====================

    async fn sensor_get(&self, sensor_id: i32) -> anyhow::Result<Sensor> {
        crud::find_by_id::<_, sensor::Entity>(&self.db, "sensor", sensor_id).await
    }

    async fn sensor_list(&self) -> anyhow::Result<Vec<Sensor>> {
        crud::find_all::<_, sensor::Entity>(&self.db, "sensors").await
    }

    async fn sensor_list_by_hive(&self, hive_id: i32) -> anyhow::Result<Vec<Sensor>> {
        sensor::Entity::find()
            .filter(sensor::Column::HiveId.eq(hive_id))
            .order_by_asc(sensor::Column::SensorId)
            .all(&self.db)
            .await
            .map_err(|e| store_error(e, format!("failed to list sensors of hive {}", hive_id)))
    }

    async fn sensor_create(&self, sensor: Sensor) -> anyhow::Result<Sensor> {
        let mut active = sensor.into_active_model().reset_all();
        active.sensor_id = NotSet;
        crud::insert(&self.db, "sensor", active).await
    }

    async fn sensor_update(&self, sensor: Sensor) -> anyhow::Result<Sensor> {
        let id = sensor.sensor_id;
        crud::update(&self.db, "sensor", id, sensor.into_active_model().reset_all()).await
    }

    async fn sensor_delete(&self, sensor_id: i32) -> anyhow::Result<()> {
        crud::delete_by_id::<_, sensor::Entity>(&self.db, "sensor", sensor_id).await
    }

    // ==================== Sensor Reading Operations ====================

    async fn sensor_reading_get(&self, reading_id: i32) -> anyhow::Result<SensorReading> {
        crud::find_by_id::<_, sensor_reading::Entity>(&self.db, "sensor reading", reading_id).await
    }

    async fn sensor_reading_list(&self) -> anyhow::Result<Vec<SensorReading>> {
        crud::find_all::<_, sensor_reading::Entity>(&self.db, "sensor readings").await
    }

    async fn sensor_reading_latest(&self, limit: u64) -> anyhow::Result<Vec<SensorReading>> {
        sensor_reading::Entity::find()
            .order_by_desc(sensor_reading::Column::ReadingId)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(|e| store_error(e, "failed to list latest sensor readings"))
    }

    async fn sensor_reading_create(&self, reading: SensorReading) -> anyhow::Result<SensorReading> {
        let mut active = reading.into_active_model().reset_all();
        active.reading_id = NotSet;
        crud::insert(&self.db, "sensor reading", active).await
    }

    async fn sensor_reading_update(&self, reading: SensorReading) -> anyhow::Result<SensorReading> {
        let id = reading.reading_id;
        crud::update(
            &self.db,
            "sensor reading",
            id,
            reading.into_active_model().reset_all(),
        )
        .await
    }

    async fn sensor_reading_delete(&self, reading_id: i32) -> anyhow::Result<()> {
        crud::delete_by_id::<_, sensor_reading::Entity>(&self.db, "sensor reading", reading_id)
            .await
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    use super::*;

    #[tokio::test]
    async fn test_sensor_create_keeps_payload_bytes() {
        let stored = Sensor {
            sensor_id: 11,
            hive_id: 3,
            sensor_type: "temperature".to_string(),
            last_reading: Some(vec![0x01, 0x02]),
            last_reading_time: None,
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![stored.clone()]])
            .into_connection();
        let service = ExternalDbPersistService::new(db);

        let created = service
            .sensor_create(Sensor {
                sensor_id: 0,
                ..stored.clone()
            })
            .await
            .unwrap();
        assert_eq!(created, stored);
    }

    #[tokio::test]
    async fn test_sensor_delete_missing_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();
        let service = ExternalDbPersistService::new(db);

        let err = service.sensor_delete(77).await.unwrap_err();
        let kind = apiary_common::find_apiary_error(&err);
        assert_eq!(
            kind,
            Some(&apiary_common::ApiaryError::NotFound("sensor 77".to_string()))
        );
    }
}
