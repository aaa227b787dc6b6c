//! In-memory cache cell with optional expiry
//!
//! Used for the auxiliary collections the API proxies: brokers are kept for
//! the lifetime of the process once fetched, lease spaces for a fixed TTL.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

#[derive(Debug)]
struct Entry<T> {
    value: Arc<T>,
    stored_at: Instant,
}

/// Holds at most one value, optionally expiring after a fixed TTL
#[derive(Debug)]
pub struct TtlCell<T> {
    ttl: Option<Duration>,
    slot: RwLock<Option<Entry<T>>>,
}

impl<T> TtlCell<T> {
    /// A cell whose value never expires
    pub fn lifetime() -> Self {
        Self {
            ttl: None,
            slot: RwLock::new(None),
        }
    }

    /// A cell whose value expires `ttl` after it was stored
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl: Some(ttl),
            slot: RwLock::new(None),
        }
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    fn live(&self, slot: &Option<Entry<T>>) -> Option<Arc<T>> {
        let entry = slot.as_ref()?;
        match self.ttl {
            Some(ttl) if entry.stored_at.elapsed() >= ttl => None,
            _ => Some(Arc::clone(&entry.value)),
        }
    }

    /// Returns the stored value if it has not expired
    pub async fn get(&self) -> Option<Arc<T>> {
        self.live(&*self.slot.read().await)
    }

    /// Returns the stored value, or runs `fetch` and stores its result
    ///
    /// Concurrent callers that miss share one fetch: the first holds the
    /// write lock while fetching and the rest find its value on recheck.
    /// Errors are returned without touching the slot.
    pub async fn get_or_try_fetch<F, Fut, E>(&self, fetch: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.get().await {
            return Ok(value);
        }

        let mut slot = self.slot.write().await;
        if let Some(value) = self.live(&slot) {
            return Ok(value);
        }

        let value = Arc::new(fetch().await?);
        *slot = Some(Entry {
            value: Arc::clone(&value),
            stored_at: Instant::now(),
        });
        Ok(value)
    }

    /// Stores a value, replacing whatever was there
    pub async fn put(&self, value: T) -> Arc<T> {
        let value = Arc::new(value);
        *self.slot.write().await = Some(Entry {
            value: Arc::clone(&value),
            stored_at: Instant::now(),
        });
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_empty_cell_returns_none() {
        let cell: TtlCell<Vec<u32>> = TtlCell::lifetime();
        assert!(cell.get().await.is_none());
    }

    #[tokio::test]
    async fn test_lifetime_cell_keeps_value() {
        let cell = TtlCell::lifetime();
        cell.put(vec![1, 2, 3]).await;

        assert_eq!(cell.get().await.as_deref(), Some(&vec![1, 2, 3]));
        assert!(cell.ttl().is_none());
    }

    #[tokio::test]
    async fn test_zero_ttl_expires_immediately() {
        let cell = TtlCell::with_ttl(Duration::ZERO);
        cell.put("stale").await;

        assert!(cell.get().await.is_none());
    }

    #[tokio::test]
    async fn test_put_replaces_value() {
        let cell = TtlCell::with_ttl(Duration::from_secs(600));
        cell.put(1).await;
        cell.put(2).await;

        assert_eq!(cell.get().await.as_deref(), Some(&2));
    }

    #[tokio::test]
    async fn test_fetch_on_miss_then_serve_cached() {
        let cell = TtlCell::lifetime();
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let fetch = move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, String>(vec![7])
        };

        assert_eq!(*cell.get_or_try_fetch(fetch).await.unwrap(), vec![7]);
        assert_eq!(*cell.get_or_try_fetch(fetch).await.unwrap(), vec![7]);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_cell_empty() {
        let cell: TtlCell<u32> = TtlCell::lifetime();

        let err = cell
            .get_or_try_fetch(|| async { Err::<u32, _>("down") })
            .await
            .unwrap_err();

        assert_eq!(err, "down");
        assert!(cell.get().await.is_none());
    }

    #[tokio::test]
    async fn test_concurrent_misses_share_one_fetch() {
        let cell = Arc::new(TtlCell::with_ttl(Duration::from_secs(600)));
        let calls = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let cell = Arc::clone(&cell);
                let calls = Arc::clone(&calls);
                tokio::spawn(async move {
                    cell.get_or_try_fetch(move || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Ok::<_, String>("spaces")
                    })
                    .await
                })
            })
            .collect();

        for task in tasks {
            assert_eq!(*task.await.unwrap().unwrap(), "spaces");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
