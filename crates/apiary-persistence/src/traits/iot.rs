//! IoT persistence trait
//!
//! Sensors and their readings. The bus worker reconciles both through this
//! trait, so it is kept narrow enough to fake in tests.

use async_trait::async_trait;

use crate::model::{Sensor, SensorReading};

#[async_trait]
pub trait IotPersistence: Send + Sync {
    // ==================== Sensor Operations ====================

    async fn sensor_get(&self, sensor_id: i32) -> anyhow::Result<Sensor>;

    async fn sensor_list(&self) -> anyhow::Result<Vec<Sensor>>;

    /// Sensors attached to the given hive
    async fn sensor_list_by_hive(&self, hive_id: i32) -> anyhow::Result<Vec<Sensor>>;

    async fn sensor_create(&self, sensor: Sensor) -> anyhow::Result<Sensor>;

    async fn sensor_update(&self, sensor: Sensor) -> anyhow::Result<Sensor>;

    async fn sensor_delete(&self, sensor_id: i32) -> anyhow::Result<()>;

    // ==================== Sensor Reading Operations ====================

    async fn sensor_reading_get(&self, reading_id: i32) -> anyhow::Result<SensorReading>;

    async fn sensor_reading_list(&self) -> anyhow::Result<Vec<SensorReading>>;

    /// The `limit` most recently inserted readings, newest first
    async fn sensor_reading_latest(&self, limit: u64) -> anyhow::Result<Vec<SensorReading>>;

    async fn sensor_reading_create(&self, reading: SensorReading) -> anyhow::Result<SensorReading>;

    async fn sensor_reading_update(&self, reading: SensorReading) -> anyhow::Result<SensorReading>;

    async fn sensor_reading_delete(&self, reading_id: i32) -> anyhow::Result<()>;
}
