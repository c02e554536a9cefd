//! Key-value store abstraction and the in-process implementation

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;

/// Batch-oriented KV operations used by the cache worker and readers
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn batch_put(&self, entries: Vec<(String, Vec<u8>)>) -> anyhow::Result<()>;

    async fn batch_put_with_ttl(
        &self,
        entries: Vec<(String, Vec<u8>)>,
        ttl: Duration,
    ) -> anyhow::Result<()>;

    /// One slot per key, `None` where the key is absent or expired
    async fn batch_get(&self, keys: &[String]) -> anyhow::Result<Vec<Option<Vec<u8>>>>;

    async fn batch_delete(&self, keys: &[String]) -> anyhow::Result<()>;

    /// Remaining lifetime of a key; `None` when absent or stored without TTL
    async fn ttl(&self, key: &str) -> anyhow::Result<Option<Duration>>;

    async fn close(&self) -> anyhow::Result<()>;
}

#[derive(Clone, Debug)]
struct StoredValue {
    bytes: Vec<u8>,
    ttl: Option<Duration>,
    written_at: Instant,
}

struct PerEntryExpiry;

impl Expiry<String, StoredValue> for PerEntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &StoredValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        value.ttl
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &StoredValue,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        value.ttl
    }
}

/// moka-backed store with per-entry TTL
pub struct MokaKvStore {
    cache: Cache<String, StoredValue>,
    closed: AtomicBool,
}

impl MokaKvStore {
    pub fn new(max_capacity: u64) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(max_capacity)
                .expire_after(PerEntryExpiry)
                .build(),
            closed: AtomicBool::new(false),
        }
    }

    fn ensure_open(&self) -> anyhow::Result<()> {
        if self.closed.load(Ordering::Acquire) {
            anyhow::bail!("kv store is closed");
        }
        Ok(())
    }

    async fn put_all(
        &self,
        entries: Vec<(String, Vec<u8>)>,
        ttl: Option<Duration>,
    ) -> anyhow::Result<()> {
        self.ensure_open()?;
        let written_at = Instant::now();
        for (key, bytes) in entries {
            self.cache
                .insert(
                    key,
                    StoredValue {
                        bytes,
                        ttl,
                        written_at,
                    },
                )
                .await;
        }
        Ok(())
    }
}

impl Default for MokaKvStore {
    fn default() -> Self {
        Self::new(10_000)
    }
}

#[async_trait]
impl KvStore for MokaKvStore {
    async fn batch_put(&self, entries: Vec<(String, Vec<u8>)>) -> anyhow::Result<()> {
        self.put_all(entries, None).await
    }

    async fn batch_put_with_ttl(
        &self,
        entries: Vec<(String, Vec<u8>)>,
        ttl: Duration,
    ) -> anyhow::Result<()> {
        self.put_all(entries, Some(ttl)).await
    }

    async fn batch_get(&self, keys: &[String]) -> anyhow::Result<Vec<Option<Vec<u8>>>> {
        self.ensure_open()?;
        let mut values = Vec::with_capacity(keys.len());
        for key in keys {
            values.push(self.cache.get(key).await.map(|v| v.bytes));
        }
        Ok(values)
    }

    async fn batch_delete(&self, keys: &[String]) -> anyhow::Result<()> {
        self.ensure_open()?;
        for key in keys {
            self.cache.invalidate(key).await;
        }
        Ok(())
    }

    async fn ttl(&self, key: &str) -> anyhow::Result<Option<Duration>> {
        self.ensure_open()?;
        Ok(self.cache.get(key).await.and_then(|v| {
            v.ttl
                .map(|ttl| ttl.saturating_sub(v.written_at.elapsed()))
        }))
    }

    async fn close(&self) -> anyhow::Result<()> {
        self.closed.store(true, Ordering::Release);
        self.cache.invalidate_all();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: &str, value: &[u8]) -> (String, Vec<u8>) {
        (key.to_string(), value.to_vec())
    }

    #[tokio::test]
    async fn test_batch_get_marks_absent_keys() {
        let kv = MokaKvStore::default();
        kv.batch_put(vec![entry("a", b"1"), entry("c", b"3")])
            .await
            .unwrap();

        let keys = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let values = kv.batch_get(&keys).await.unwrap();
        assert_eq!(values, vec![Some(b"1".to_vec()), None, Some(b"3".to_vec())]);
    }

    #[tokio::test]
    async fn test_ttl_reported_only_for_ttl_entries() {
        let kv = MokaKvStore::default();
        kv.batch_put_with_ttl(vec![entry("t", b"x")], Duration::from_secs(3600))
            .await
            .unwrap();
        kv.batch_put(vec![entry("p", b"y")]).await.unwrap();

        let ttl = kv.ttl("t").await.unwrap().unwrap();
        assert!(ttl <= Duration::from_secs(3600));
        assert!(ttl > Duration::from_secs(3590));
        assert_eq!(kv.ttl("p").await.unwrap(), None);
        assert_eq!(kv.ttl("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_short_ttl_expires() {
        let kv = MokaKvStore::default();
        kv.batch_put_with_ttl(vec![entry("k", b"v")], Duration::from_millis(50))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(150)).await;
        let values = kv.batch_get(&["k".to_string()]).await.unwrap();
        assert_eq!(values, vec![None]);
    }

    #[tokio::test]
    async fn test_delete_and_close() {
        let kv = MokaKvStore::default();
        kv.batch_put(vec![entry("a", b"1"), entry("b", b"2")])
            .await
            .unwrap();
        kv.batch_delete(&["a".to_string()]).await.unwrap();

        let values = kv
            .batch_get(&["a".to_string(), "b".to_string()])
            .await
            .unwrap();
        assert_eq!(values, vec![None, Some(b"2".to_vec())]);

        kv.close().await.unwrap();
        assert!(kv.batch_get(&["b".to_string()]).await.is_err());
    }
}
