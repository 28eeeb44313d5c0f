//! Per-key lock registry
//!
//! Maps a key (the user ID) to its own async mutex. Entries are created lazily
//! on first acquisition and live for the lifetime of the registry.

use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use common::error::{Error, Result};
use common::model::point::UserId;
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{trace, warn};

/// Registry of one mutex per key
pub struct KeyLockRegistry<K = UserId> {
    /// Lock table, sharded so unrelated keys rarely touch the same shard
    locks: DashMap<K, Arc<Mutex<()>>>,
    /// Upper bound on how long `acquire` waits, unbounded when `None`
    timeout: Option<Duration>,
}

/// Held lock for a single key, released on drop
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct KeyLockGuard<K: Debug> {
    key: K,
    _guard: OwnedMutexGuard<()>,
}

impl<K: Debug> Drop for KeyLockGuard<K> {
    fn drop(&mut self) {
        trace!("Releasing lock for key {:?}", self.key);
    }
}

impl<K> KeyLockRegistry<K>
where
    K: Eq + Hash + Clone + Debug,
{
    /// Create a registry that waits indefinitely for contended keys
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
            timeout: None,
        }
    }

    /// Create a registry whose acquisitions fail after `timeout`
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            locks: DashMap::new(),
            timeout: Some(timeout),
        }
    }

    /// Get the mutex for `key`, inserting it if this is the first use.
    ///
    /// The shard write lock taken by `entry` makes insert-if-absent atomic, so
    /// concurrent first callers all observe the same mutex.
    fn lock_for(&self, key: &K) -> Arc<Mutex<()>> {
        self.locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Acquire the lock for `key`, waiting for any current holder to release it
    pub async fn acquire(&self, key: K) -> Result<KeyLockGuard<K>> {
        let lock = self.lock_for(&key);

        let guard = match self.timeout {
            Some(timeout) => match tokio::time::timeout(timeout, lock.lock_owned()).await {
                Ok(guard) => guard,
                Err(_) => {
                    warn!("Timed out after {:?} waiting for lock on key {:?}", timeout, key);
                    return Err(Error::LockTimeout(format!(
                        "waited {:?} for lock on key {:?}",
                        timeout, key
                    )));
                }
            },
            None => lock.lock_owned().await,
        };

        trace!("Acquired lock for key {:?}", key);
        Ok(KeyLockGuard { key, _guard: guard })
    }

    /// Number of keys that have ever been locked
    pub(crate) fn len(&self) -> usize {
        self.locks.len()
    }
}

impl<K> Default for KeyLockRegistry<K>
where
    K: Eq + Hash + Clone + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}
