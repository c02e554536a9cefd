//! Applies consumed bus events to the relational store.
//!
//! Every failure maps to [`Disposition::Reject`]: the worker negatively
//! acknowledges without requeue so a poison message cannot loop.

use std::sync::Arc;

use apiary_common::{ApiaryError, find_apiary_error};
use apiary_persistence::{IotPersistence, Sensor, SensorReading};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use crate::message::DeleteSensorMessage;
use crate::queue::{SENSOR_DELETE_QUEUE, SENSOR_QUEUE, SENSOR_READING_QUEUE};

/// What the worker should tell the broker about a delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Ack,
    Reject,
}

impl Disposition {
    pub fn as_str(self) -> &'static str {
        match self {
            Disposition::Ack => "ack",
            Disposition::Reject => "reject",
        }
    }
}

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("failed to decode message: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{0:#}")]
    Store(#[from] anyhow::Error),

    #[error("no handler for queue {0}")]
    UnknownQueue(String),
}

pub struct Reconciler {
    store: Arc<dyn IotPersistence>,
}

impl Reconciler {
    pub fn new(store: Arc<dyn IotPersistence>) -> Self {
        Self { store }
    }

    /// Handle one delivery and decide its acknowledgement
    pub async fn process(&self, queue: &str, body: &[u8]) -> Disposition {
        let outcome = match queue {
            SENSOR_QUEUE => self.apply_sensor(body).await,
            SENSOR_READING_QUEUE => self.apply_reading(body).await,
            SENSOR_DELETE_QUEUE => self.apply_sensor_delete(body).await,
            other => Err(ReconcileError::UnknownQueue(other.to_string())),
        };

        let disposition = match outcome {
            Ok(()) => Disposition::Ack,
            Err(e) => {
                warn!(queue, "Rejecting message: {}", e);
                Disposition::Reject
            }
        };
        metrics::counter!(
            "apiary_bus_consumed_total",
            "queue" => queue.to_string(),
            "outcome" => disposition.as_str()
        )
        .increment(1);
        disposition
    }

    /// Upsert a sensor: a non-zero id updates, zero creates.
    pub async fn apply_sensor(&self, body: &[u8]) -> Result<(), ReconcileError> {
        let sensor: Sensor = decode(body)?;
        if sensor.sensor_id != 0 {
            let updated = self.store.sensor_update(sensor).await?;
            debug!(sensor_id = updated.sensor_id, "Updated sensor from bus");
        } else {
            let created = self.store.sensor_create(sensor).await?;
            debug!(sensor_id = created.sensor_id, "Created sensor from bus");
        }
        Ok(())
    }

    /// Insert a reading, then copy its value and time onto the sensor row.
    pub async fn apply_reading(&self, body: &[u8]) -> Result<(), ReconcileError> {
        let reading: SensorReading = decode(body)?;
        let created = self.store.sensor_reading_create(reading).await?;

        let mut sensor = self.store.sensor_get(created.sensor_id).await?;
        sensor.last_reading = Some(created.value.clone());
        sensor.last_reading_time = created.timestamp;
        self.store.sensor_update(sensor).await?;

        debug!(
            reading_id = created.reading_id,
            sensor_id = created.sensor_id,
            "Stored sensor reading"
        );
        Ok(())
    }

    /// Delete the sensor if it still exists. An already-absent row is done.
    pub async fn apply_sensor_delete(&self, body: &[u8]) -> Result<(), ReconcileError> {
        let message: DeleteSensorMessage = decode(body)?;
        match self.store.sensor_delete(message.sensor_id).await {
            Ok(()) => {
                debug!(
                    hive_id = message.hive_id,
                    sensor_id = message.sensor_id,
                    "Deleted sensor from bus"
                );
                Ok(())
            }
            Err(e) if matches!(find_apiary_error(&e), Some(ApiaryError::NotFound(_))) => {
                debug!(sensor_id = message.sensor_id, "Sensor already gone");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, ReconcileError> {
    Ok(serde_json::from_slice(body)?)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::BTreeMap;

    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use parking_lot::Mutex;

    use super::*;

    /// In-memory IoT store
    #[derive(Default)]
    pub(crate) struct MemoryIot {
        pub sensors: Mutex<BTreeMap<i32, Sensor>>,
        pub readings: Mutex<Vec<SensorReading>>,
        pub fail_writes: bool,
    }

    impl MemoryIot {
        pub fn with_sensor(sensor: Sensor) -> Self {
            let store = Self::default();
            store.sensors.lock().insert(sensor.sensor_id, sensor);
            store
        }

        fn check_writable(&self) -> anyhow::Result<()> {
            if self.fail_writes {
                anyhow::bail!("connection refused");
            }
            Ok(())
        }
    }

    #[async_trait]
    impl IotPersistence for MemoryIot {
        async fn sensor_get(&self, sensor_id: i32) -> anyhow::Result<Sensor> {
            self.sensors
                .lock()
                .get(&sensor_id)
                .cloned()
                .ok_or_else(|| ApiaryError::not_found("sensor", sensor_id).into())
        }

        async fn sensor_list(&self) -> anyhow::Result<Vec<Sensor>> {
            Ok(self.sensors.lock().values().cloned().collect())
        }

        async fn sensor_list_by_hive(&self, hive_id: i32) -> anyhow::Result<Vec<Sensor>> {
            Ok(self
                .sensors
                .lock()
                .values()
                .filter(|s| s.hive_id == hive_id)
                .cloned()
                .collect())
        }

        async fn sensor_create(&self, mut sensor: Sensor) -> anyhow::Result<Sensor> {
            self.check_writable()?;
            let mut sensors = self.sensors.lock();
            sensor.sensor_id = sensors.keys().max().copied().unwrap_or(0) + 1;
            sensors.insert(sensor.sensor_id, sensor.clone());
            Ok(sensor)
        }

        async fn sensor_update(&self, sensor: Sensor) -> anyhow::Result<Sensor> {
            self.check_writable()?;
            let mut sensors = self.sensors.lock();
            if !sensors.contains_key(&sensor.sensor_id) {
                return Err(ApiaryError::not_found("sensor", sensor.sensor_id).into());
            }
            sensors.insert(sensor.sensor_id, sensor.clone());
            Ok(sensor)
        }

        async fn sensor_delete(&self, sensor_id: i32) -> anyhow::Result<()> {
            self.check_writable()?;
            self.sensors
                .lock()
                .remove(&sensor_id)
                .map(|_| ())
                .ok_or_else(|| ApiaryError::not_found("sensor", sensor_id).into())
        }

        async fn sensor_reading_get(&self, reading_id: i32) -> anyhow::Result<SensorReading> {
            self.readings
                .lock()
                .iter()
                .find(|r| r.reading_id == reading_id)
                .cloned()
                .ok_or_else(|| ApiaryError::not_found("sensor reading", reading_id).into())
        }

        async fn sensor_reading_list(&self) -> anyhow::Result<Vec<SensorReading>> {
            Ok(self.readings.lock().clone())
        }

        async fn sensor_reading_latest(&self, limit: u64) -> anyhow::Result<Vec<SensorReading>> {
            let mut readings = self.readings.lock().clone();
            readings.sort_by(|a, b| b.reading_id.cmp(&a.reading_id));
            readings.truncate(limit as usize);
            Ok(readings)
        }

        async fn sensor_reading_create(
            &self,
            mut reading: SensorReading,
        ) -> anyhow::Result<SensorReading> {
            self.check_writable()?;
            let mut readings = self.readings.lock();
            reading.reading_id = readings.len() as i32 + 1;
            readings.push(reading.clone());
            Ok(reading)
        }

        async fn sensor_reading_update(
            &self,
            reading: SensorReading,
        ) -> anyhow::Result<SensorReading> {
            self.check_writable()?;
            Ok(reading)
        }

        async fn sensor_reading_delete(&self, reading_id: i32) -> anyhow::Result<()> {
            self.check_writable()?;
            self.readings.lock().retain(|r| r.reading_id != reading_id);
            Ok(())
        }
    }

    fn sensor(id: i32) -> Sensor {
        Sensor {
            sensor_id: id,
            hive_id: 7,
            sensor_type: "temp".to_string(),
            last_reading: None,
            last_reading_time: None,
        }
    }

    fn reconciler(store: Arc<MemoryIot>) -> Reconciler {
        Reconciler::new(store)
    }

    #[tokio::test]
    async fn test_reading_updates_sensor_last_reading() {
        let store = Arc::new(MemoryIot::with_sensor(sensor(3)));
        let time = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let body = serde_json::to_vec(&SensorReading {
            reading_id: 0,
            sensor_id: 3,
            value: vec![0x10, 0x20],
            timestamp: Some(time),
        })
        .unwrap();

        let disposition = reconciler(store.clone())
            .process(SENSOR_READING_QUEUE, &body)
            .await;

        assert_eq!(disposition, Disposition::Ack);
        assert_eq!(store.readings.lock().len(), 1);
        let updated = store.sensors.lock().get(&3).cloned().unwrap();
        assert_eq!(updated.last_reading, Some(vec![0x10, 0x20]));
        assert_eq!(updated.last_reading_time, Some(time));
    }

    #[tokio::test]
    async fn test_reading_for_missing_sensor_is_rejected() {
        let store = Arc::new(MemoryIot::default());
        let body = br#"{"sensor_id":99,"value":"AQ==","timestamp":null}"#;

        let disposition = reconciler(store).process(SENSOR_READING_QUEUE, body).await;
        assert_eq!(disposition, Disposition::Reject);
    }

    #[tokio::test]
    async fn test_sensor_zero_id_creates_nonzero_updates() {
        let store = Arc::new(MemoryIot::with_sensor(sensor(1)));
        let r = reconciler(store.clone());

        let create = serde_json::to_vec(&sensor(0)).unwrap();
        assert_eq!(r.process(SENSOR_QUEUE, &create).await, Disposition::Ack);
        assert_eq!(store.sensors.lock().len(), 2);

        let mut changed = sensor(1);
        changed.sensor_type = "humidity".to_string();
        let update = serde_json::to_vec(&changed).unwrap();
        assert_eq!(r.process(SENSOR_QUEUE, &update).await, Disposition::Ack);
        assert_eq!(store.sensors.lock()[&1].sensor_type, "humidity");
    }

    #[tokio::test]
    async fn test_malformed_body_is_rejected() {
        let store = Arc::new(MemoryIot::default());
        let r = reconciler(store.clone());

        assert_eq!(r.process(SENSOR_QUEUE, b"{not json").await, Disposition::Reject);
        assert!(store.sensors.lock().is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_is_rejected() {
        let store = Arc::new(MemoryIot {
            fail_writes: true,
            ..Default::default()
        });
        let body = serde_json::to_vec(&sensor(0)).unwrap();

        let disposition = reconciler(store).process(SENSOR_QUEUE, &body).await;
        assert_eq!(disposition, Disposition::Reject);
    }

    #[tokio::test]
    async fn test_delete_of_absent_sensor_is_acked() {
        let store = Arc::new(MemoryIot::with_sensor(sensor(4)));
        let r = reconciler(store.clone());

        let body = br#"{"hive_id":7,"sensor_id":4}"#;
        assert_eq!(r.process(SENSOR_DELETE_QUEUE, body).await, Disposition::Ack);
        assert!(store.sensors.lock().is_empty());

        assert_eq!(r.process(SENSOR_DELETE_QUEUE, body).await, Disposition::Ack);
    }

    #[tokio::test]
    async fn test_unknown_queue_is_rejected() {
        let store = Arc::new(MemoryIot::default());
        let disposition = reconciler(store).process("hive_queue", b"{}").await;
        assert_eq!(disposition, Disposition::Reject);
    }
}
