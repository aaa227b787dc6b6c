//! Cache module for listing snapshots and proxied collections
//!
//! The listing snapshot is persisted to disk with an atomic rename so the last
//! good copy survives restarts. Brokers and lease spaces are only held in memory,
//! in cells that either never expire or expire after a fixed TTL.

mod snapshot;
mod store;
mod ttl;

pub use snapshot::CacheSnapshot;
pub use store::{SnapshotStore, StoreError, SNAPSHOT_FILE};
pub use ttl::TtlCell;
