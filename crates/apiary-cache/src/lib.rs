//! Apiary Cache - advisory snapshot cache
//!
//! A background worker periodically copies the most recent sensor readings and
//! production reports into a TTL'd key-value store under
//! `sensor_reading:{id}` and `production_report:{id}`. Readers treat a missing
//! key as "not cached", never as "does not exist".

pub mod kv;
pub mod snapshot;
pub mod worker;

pub use kv::{KvStore, MokaKvStore};
pub use snapshot::{SnapshotCache, production_report_key, sensor_reading_key};
pub use worker::{CacheError, CacheSettings, CacheWorker, SnapshotSource};
