//! Read and evict API over cached snapshots

use std::sync::Arc;

use apiary_persistence::{ProductionReport, SensorReading};
use serde::de::DeserializeOwned;

use crate::kv::KvStore;

const SENSOR_READING_PREFIX: &str = "sensor_reading:";
const PRODUCTION_REPORT_PREFIX: &str = "production_report:";

pub fn sensor_reading_key(reading_id: i32) -> String {
    format!("{}{}", SENSOR_READING_PREFIX, reading_id)
}

pub fn production_report_key(report_id: i32) -> String {
    format!("{}{}", PRODUCTION_REPORT_PREFIX, report_id)
}

#[derive(Clone)]
pub struct SnapshotCache {
    kv: Arc<dyn KvStore>,
}

impl SnapshotCache {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    /// Cached readings for `ids`; ids that are not cached are skipped.
    pub async fn sensor_readings(&self, ids: &[i32]) -> anyhow::Result<Vec<SensorReading>> {
        let keys: Vec<String> = ids.iter().copied().map(sensor_reading_key).collect();
        self.fetch(&keys).await
    }

    /// Cached reports for `ids`; ids that are not cached are skipped.
    pub async fn production_reports(&self, ids: &[i32]) -> anyhow::Result<Vec<ProductionReport>> {
        let keys: Vec<String> = ids.iter().copied().map(production_report_key).collect();
        self.fetch(&keys).await
    }

    pub async fn evict_sensor_readings(&self, ids: &[i32]) -> anyhow::Result<()> {
        let keys: Vec<String> = ids.iter().copied().map(sensor_reading_key).collect();
        self.kv.batch_delete(&keys).await
    }

    pub async fn evict_production_reports(&self, ids: &[i32]) -> anyhow::Result<()> {
        let keys: Vec<String> = ids.iter().copied().map(production_report_key).collect();
        self.kv.batch_delete(&keys).await
    }

    async fn fetch<T: DeserializeOwned>(&self, keys: &[String]) -> anyhow::Result<Vec<T>> {
        let values = self.kv.batch_get(keys).await?;
        let mut decoded = Vec::with_capacity(values.len());
        for (key, value) in keys.iter().zip(values) {
            let Some(bytes) = value else {
                continue;
            };
            let item = serde_json::from_slice(&bytes)
                .map_err(|e| anyhow::anyhow!(e).context(format!("failed to decode {}", key)))?;
            decoded.push(item);
        }
        Ok(decoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MokaKvStore;

    fn reading(id: i32) -> SensorReading {
        SensorReading {
            reading_id: id,
            sensor_id: 1,
            value: vec![id as u8],
            timestamp: None,
        }
    }

    #[test]
    fn test_key_format() {
        assert_eq!(sensor_reading_key(12), "sensor_reading:12");
        assert_eq!(production_report_key(3), "production_report:3");
    }

    #[tokio::test]
    async fn test_read_skips_absent_and_evict_removes() {
        let kv = Arc::new(MokaKvStore::default());
        kv.batch_put(vec![
            (sensor_reading_key(1), serde_json::to_vec(&reading(1)).unwrap()),
            (sensor_reading_key(3), serde_json::to_vec(&reading(3)).unwrap()),
        ])
        .await
        .unwrap();
        let cache = SnapshotCache::new(kv);

        let found = cache.sensor_readings(&[1, 2, 3]).await.unwrap();
        assert_eq!(found, vec![reading(1), reading(3)]);

        cache.evict_sensor_readings(&[1]).await.unwrap();
        let found = cache.sensor_readings(&[1, 3]).await.unwrap();
        assert_eq!(found, vec![reading(3)]);
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_an_error() {
        let kv = Arc::new(MokaKvStore::default());
        kv.batch_put(vec![(production_report_key(5), b"garbage".to_vec())])
            .await
            .unwrap();
        let cache = SnapshotCache::new(kv);

        let err = cache.production_reports(&[5]).await.unwrap_err();
        assert!(err.to_string().contains("production_report:5"));
    }
}
