//! Periodic snapshot refresh
//!
//! Two independent loops, one per cadence. A failed tick is reported on the
//! error channel and the loop carries on with the next tick.

use std::sync::Arc;
use std::time::Duration;

use apiary_persistence::{IotPersistence, ProductionReport, ReportPersistence, SensorReading};
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::kv::KvStore;
use crate::snapshot::{production_report_key, sensor_reading_key};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSettings {
    pub reading_interval: Duration,
    pub reading_limit: u64,
    pub reading_ttl: Duration,
    pub report_interval: Duration,
    pub report_limit: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            reading_interval: Duration::from_secs(5 * 60),
            reading_limit: 100,
            reading_ttl: Duration::from_secs(3600),
            report_interval: Duration::from_secs(30 * 60),
            report_limit: 50,
        }
    }
}

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("failed to load {kind}: {source:#}")]
    Load {
        kind: &'static str,
        source: anyhow::Error,
    },

    #[error("failed to encode {key}: {source}")]
    Encode {
        key: String,
        source: serde_json::Error,
    },

    #[error("failed to write {kind}: {source:#}")]
    Write {
        kind: &'static str,
        source: anyhow::Error,
    },
}

/// Where snapshots come from
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn recent_sensor_readings(&self, limit: u64) -> anyhow::Result<Vec<SensorReading>>;

    async fn recent_production_reports(&self, limit: u64)
    -> anyhow::Result<Vec<ProductionReport>>;
}

#[async_trait]
impl<T: IotPersistence + ReportPersistence + ?Sized> SnapshotSource for T {
    async fn recent_sensor_readings(&self, limit: u64) -> anyhow::Result<Vec<SensorReading>> {
        self.sensor_reading_latest(limit).await
    }

    async fn recent_production_reports(
        &self,
        limit: u64,
    ) -> anyhow::Result<Vec<ProductionReport>> {
        self.production_report_recent(limit).await
    }
}

#[derive(Debug, Clone, Copy)]
enum SnapshotKind {
    SensorReadings,
    ProductionReports,
}

impl SnapshotKind {
    fn label(self) -> &'static str {
        match self {
            SnapshotKind::SensorReadings => "sensor_readings",
            SnapshotKind::ProductionReports => "production_reports",
        }
    }
}

pub struct CacheWorker<S: SnapshotSource + ?Sized> {
    source: Arc<S>,
    kv: Arc<dyn KvStore>,
    settings: CacheSettings,
    errors: mpsc::UnboundedSender<CacheError>,
}

impl<S: SnapshotSource + ?Sized + 'static> CacheWorker<S> {
    /// Build a worker and the receiving end of its error channel
    pub fn new(
        source: Arc<S>,
        kv: Arc<dyn KvStore>,
        settings: CacheSettings,
    ) -> (Self, mpsc::UnboundedReceiver<CacheError>) {
        let (errors, receiver) = mpsc::unbounded_channel();
        (
            Self {
                source,
                kv,
                settings,
                errors,
            },
            receiver,
        )
    }

    /// Snapshot the latest readings with a TTL. Returns how many keys were written.
    pub async fn refresh_sensor_readings(&self) -> Result<usize, CacheError> {
        let kind = SnapshotKind::SensorReadings.label();
        let readings = self
            .source
            .recent_sensor_readings(self.settings.reading_limit)
            .await
            .map_err(|source| CacheError::Load { kind, source })?;

        let entries = self.encode_all(readings, |r| sensor_reading_key(r.reading_id));
        let written = entries.len();
        self.kv
            .batch_put_with_ttl(entries, self.settings.reading_ttl)
            .await
            .map_err(|source| CacheError::Write { kind, source })?;
        Ok(written)
    }

    /// Snapshot the most recent production reports. Returns how many keys were written.
    pub async fn refresh_production_reports(&self) -> Result<usize, CacheError> {
        let kind = SnapshotKind::ProductionReports.label();
        let reports = self
            .source
            .recent_production_reports(self.settings.report_limit)
            .await
            .map_err(|source| CacheError::Load { kind, source })?;

        let entries = self.encode_all(reports, |r| production_report_key(r.report_id));
        let written = entries.len();
        self.kv
            .batch_put(entries)
            .await
            .map_err(|source| CacheError::Write { kind, source })?;
        Ok(written)
    }

    fn encode_all<T, K>(&self, items: Vec<T>, key_of: K) -> Vec<(String, Vec<u8>)>
    where
        T: serde::Serialize,
        K: Fn(&T) -> String,
    {
        let mut entries = Vec::with_capacity(items.len());
        for item in items {
            let key = key_of(&item);
            match serde_json::to_vec(&item) {
                Ok(bytes) => entries.push((key, bytes)),
                Err(source) => self.report(CacheError::Encode { key, source }),
            }
        }
        entries
    }

    fn report(&self, err: CacheError) {
        metrics::counter!("apiary_cache_errors_total").increment(1);
        if self.errors.send(err).is_err() {
            debug!("Cache error channel closed");
        }
    }

    async fn refresh_loop(self: Arc<Self>, kind: SnapshotKind, token: CancellationToken) {
        let period = match kind {
            SnapshotKind::SensorReadings => self.settings.reading_interval,
            SnapshotKind::ProductionReports => self.settings.report_interval,
        };
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = interval.tick() => {}
            }

            let result = match kind {
                SnapshotKind::SensorReadings => self.refresh_sensor_readings().await,
                SnapshotKind::ProductionReports => self.refresh_production_reports().await,
            };
            match result {
                Ok(written) => {
                    metrics::counter!("apiary_cache_refresh_total", "kind" => kind.label())
                        .increment(1);
                    debug!(kind = kind.label(), written, "Cache refreshed");
                }
                Err(e) => self.report(e),
            }
        }
    }

    /// Run both refresh loops until cancelled, then close the KV store.
    pub async fn run(self, token: CancellationToken) -> anyhow::Result<()> {
        let worker = Arc::new(self);
        info!(
            reading_interval = ?worker.settings.reading_interval,
            report_interval = ?worker.settings.report_interval,
            "Cache worker started"
        );

        let readings = tokio::spawn(
            worker
                .clone()
                .refresh_loop(SnapshotKind::SensorReadings, token.clone()),
        );
        let reports = tokio::spawn(
            worker
                .clone()
                .refresh_loop(SnapshotKind::ProductionReports, token.clone()),
        );

        for handle in [readings, reports] {
            if let Err(e) = handle.await {
                warn!("Cache refresh task failed: {}", e);
            }
        }

        worker.kv.close().await?;
        info!("Cache worker stopped");
        Ok(())
    }
}
