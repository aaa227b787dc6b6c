//! Listing snapshot refresh
//!
//! The scheduler owns the in-memory snapshot and is the only writer of it and
//! of the persisted file. It populates the snapshot on boot, on a fixed
//! interval and on manual request, walking an explicit fallback chain when the
//! provider is unreachable. Each refresh also reloads the broker and lease
//! space caches the API serves from.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{mpsc, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::{CacheSnapshot, SnapshotStore, StoreError, TtlCell};
use crate::data::{Broker, ListingsProvider, UpstreamError};

/// Default time-to-live of the lease space cache
pub const LEASE_SPACES_TTL: Duration = Duration::from_secs(15 * 60);

/// Configuration for the refresh interval
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// Time between scheduled refreshes, also the max age of a persisted
    /// snapshot that is served on boot without refetching
    pub interval: Duration,
    /// Whether the interval timer runs
    pub enabled: bool,
    /// How long fetched lease spaces are served before refetching
    pub lease_spaces_ttl: Duration,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3600), // 1 hour
            enabled: true,
            lease_spaces_ttl: LEASE_SPACES_TTL,
        }
    }
}

/// Lifecycle phase of the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Booting,
    Serving,
    Refreshing,
}

/// One step of the fallback chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Fallback {
    /// Fetch from the provider and persist
    Upstream,
    /// Keep the current in-memory snapshot if it holds data
    Retained,
    /// Load the persisted file
    Persisted,
    /// Serve an explicit empty snapshot
    Empty,
}

/// Order in which a refresh tries its sources
pub const REFRESH_CHAIN: [Fallback; 4] = [
    Fallback::Upstream,
    Fallback::Retained,
    Fallback::Persisted,
    Fallback::Empty,
];

/// Result of a boot or refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshReport {
    /// Step of the chain that produced the snapshot now being served
    pub source: Fallback,
    pub count: usize,
}

/// Snapshot metadata for status reporting
#[derive(Debug, Clone, Serialize)]
pub struct SchedulerStatus {
    pub phase: Phase,
    pub count: usize,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Raised while a refresh holds the lock; lowered on drop, including when
/// the refreshing future is cancelled
struct RefreshingFlag<'a>(&'a AtomicBool);

impl<'a> RefreshingFlag<'a> {
    fn raise(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        Self(flag)
    }
}

impl Drop for RefreshingFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Owns the listing snapshot and the auxiliary caches, and serializes refreshes
pub struct RefreshScheduler {
    provider: Arc<dyn ListingsProvider>,
    store: SnapshotStore,
    config: RefreshConfig,
    snapshot: RwLock<Arc<CacheSnapshot>>,
    /// Kept for the process lifetime, replaced by each refresh
    brokers: TtlCell<Vec<Broker>>,
    /// Raw provider records, expiring after `lease_spaces_ttl`
    lease_spaces: TtlCell<Vec<Value>>,
    booted: AtomicBool,
    refreshing: AtomicBool,
    /// Held for the duration of boot and of every refresh
    refresh_lock: Mutex<()>,
}

impl RefreshScheduler {
    pub fn new(provider: Arc<dyn ListingsProvider>, store: SnapshotStore, config: RefreshConfig) -> Self {
        Self {
            provider,
            store,
            brokers: TtlCell::lifetime(),
            lease_spaces: TtlCell::with_ttl(config.lease_spaces_ttl),
            config,
            snapshot: RwLock::new(Arc::new(CacheSnapshot::empty())),
            booted: AtomicBool::new(false),
            refreshing: AtomicBool::new(false),
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &RefreshConfig {
        &self.config
    }

    /// The snapshot currently being served
    pub async fn current(&self) -> Arc<CacheSnapshot> {
        Arc::clone(&*self.snapshot.read().await)
    }

    pub fn phase(&self) -> Phase {
        if self.refreshing.load(Ordering::Acquire) {
            Phase::Refreshing
        } else if self.booted.load(Ordering::Acquire) {
            Phase::Serving
        } else {
            Phase::Booting
        }
    }

    pub async fn status(&self) -> SchedulerStatus {
        let snapshot = self.current().await;
        SchedulerStatus {
            phase: self.phase(),
            count: snapshot.count(),
            last_updated: snapshot.last_updated,
        }
    }

    /// Brokers from the cache, if any fetch has succeeded yet
    pub async fn cached_brokers(&self) -> Option<Arc<Vec<Broker>>> {
        self.brokers.get().await
    }

    /// Cached brokers, fetching them on a miss
    pub async fn brokers(&self) -> Result<Arc<Vec<Broker>>, UpstreamError> {
        self.brokers
            .get_or_try_fetch(|| self.provider.fetch_brokers())
            .await
    }

    /// Cached lease spaces, fetching them when missing or expired
    pub async fn lease_spaces(&self) -> Result<Arc<Vec<Value>>, UpstreamError> {
        self.lease_spaces
            .get_or_try_fetch(|| self.provider.fetch_lease_spaces())
            .await
    }

    /// Populates the snapshot at startup
    ///
    /// A persisted snapshot younger than the refresh interval is served as is.
    /// Anything else (missing, corrupt, stale) triggers an immediate refresh.
    /// Manual refreshes issued meanwhile wait until boot is done.
    pub async fn boot(&self) -> RefreshReport {
        let _guard = self.refresh_lock.lock().await;

        let report = match self.store.load() {
            Ok(snapshot) if snapshot.is_fresh(self.config.interval, Utc::now()) => {
                info!(
                    count = snapshot.count(),
                    last_updated = ?snapshot.last_updated,
                    "serving fresh persisted snapshot"
                );
                let count = snapshot.count();
                self.install(Arc::new(snapshot)).await;
                RefreshReport {
                    source: Fallback::Persisted,
                    count,
                }
            }
            Ok(snapshot) => {
                info!(last_updated = ?snapshot.last_updated, "persisted snapshot is stale, refreshing");
                self.run_chain(&REFRESH_CHAIN).await
            }
            Err(StoreError::NotFound(path)) => {
                info!(path = %path.display(), "no persisted snapshot, refreshing");
                self.run_chain(&REFRESH_CHAIN).await
            }
            Err(e) => {
                warn!(error = %e, "could not read persisted snapshot, refreshing");
                self.run_chain(&REFRESH_CHAIN).await
            }
        };

        self.booted.store(true, Ordering::Release);
        report
    }

    /// Runs a refresh, waiting for any in-flight refresh to finish first
    pub async fn refresh(&self) -> RefreshReport {
        let _guard = self.refresh_lock.lock().await;
        let _flag = RefreshingFlag::raise(&self.refreshing);
        self.run_chain(&REFRESH_CHAIN).await
    }

    /// Runs a refresh unless one is already in flight
    pub async fn try_refresh(&self) -> Option<RefreshReport> {
        let _guard = match self.refresh_lock.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                debug!("refresh already in progress, skipping");
                return None;
            }
        };
        let _flag = RefreshingFlag::raise(&self.refreshing);
        Some(self.run_chain(&REFRESH_CHAIN).await)
    }

    /// Tries each step in order and installs the first snapshot produced.
    /// Callers hold `refresh_lock`.
    async fn run_chain(&self, chain: &[Fallback]) -> RefreshReport {
        for &step in chain {
            if let Some(snapshot) = self.attempt(step).await {
                let report = RefreshReport {
                    source: step,
                    count: snapshot.count(),
                };
                info!(source = ?step, count = report.count, "snapshot refreshed");
                self.install(snapshot).await;
                return report;
            }
        }

        // Chain did not end in Empty
        self.install(Arc::new(CacheSnapshot::empty())).await;
        RefreshReport {
            source: Fallback::Empty,
            count: 0,
        }
    }

    async fn attempt(&self, step: Fallback) -> Option<Arc<CacheSnapshot>> {
        match step {
            Fallback::Upstream => {
                let (listings, brokers, lease_spaces) = futures::join!(
                    self.provider.fetch_listings(),
                    self.provider.fetch_brokers(),
                    self.provider.fetch_lease_spaces()
                );
                self.reload_auxiliary(brokers, lease_spaces).await;

                match listings {
                    Ok(listings) => {
                        let snapshot = CacheSnapshot::populated(listings, Utc::now());
                        if let Err(e) = self.store.save(&snapshot) {
                            warn!(error = %e, "failed to persist snapshot");
                        }
                        Some(Arc::new(snapshot))
                    }
                    Err(e) => {
                        warn!(error = %e, "upstream fetch failed");
                        None
                    }
                }
            }
            Fallback::Retained => {
                let current = self.current().await;
                current.has_data().then_some(current)
            }
            Fallback::Persisted => match self.store.load() {
                Ok(snapshot) => Some(Arc::new(snapshot)),
                Err(e) => {
                    warn!(error = %e, "persisted snapshot unavailable");
                    None
                }
            },
            Fallback::Empty => {
                warn!("no listing data available, serving empty snapshot");
                Some(Arc::new(CacheSnapshot::empty()))
            }
        }
    }

    /// Replaces the broker and lease space caches; failed fetches keep what is cached
    async fn reload_auxiliary(
        &self,
        brokers: Result<Vec<Broker>, UpstreamError>,
        lease_spaces: Result<Vec<Value>, UpstreamError>,
    ) {
        match brokers {
            Ok(brokers) => {
                debug!(count = brokers.len(), "brokers reloaded");
                self.brokers.put(brokers).await;
            }
            Err(e) => warn!(error = %e, "broker fetch failed, keeping cached brokers"),
        }
        match lease_spaces {
            Ok(spaces) => {
                debug!(count = spaces.len(), "lease spaces reloaded");
                self.lease_spaces.put(spaces).await;
            }
            Err(e) => warn!(error = %e, "lease space fetch failed, keeping cached lease spaces"),
        }
    }

    async fn install(&self, snapshot: Arc<CacheSnapshot>) {
        *self.snapshot.write().await = snapshot;
    }

    /// Starts the interval timer
    ///
    /// The first tick fires one interval from now; boot has already populated
    /// the snapshot. Ticks that land on an in-flight refresh are skipped.
    pub fn spawn_interval(self: Arc<Self>) -> RefreshHandle {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let interval_period = self.config.interval;
        let enabled = self.config.enabled;

        let task = tokio::spawn(async move {
            if !enabled {
                return;
            }

            let mut interval = tokio::time::interval(interval_period);
            // Skip the first tick (immediate)
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        debug!("scheduled refresh");
                        self.try_refresh().await;
                    }
                    _ = shutdown_rx.recv() => {
                        break;
                    }
                }
            }
        });

        RefreshHandle { shutdown_tx, task }
    }
}

/// Handle for stopping the interval timer
pub struct RefreshHandle {
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl RefreshHandle {
    /// Stops the timer and waits for the task to exit
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        let _ = self.task.await;
    }
}
