// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Per-object lock manager.
//!
//! Multi-key sequences (an engine transition touches state + aggregate +
//! timeline) must not interleave with feedback or sweeper writes to the
//! same object. Callers acquire the object's lock for the duration of the
//! sequence; distinct objects proceed in parallel.

use ahash::AHashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use gridwell_types::ObjectKey;

/// Guard held for the duration of a multi-key write sequence.
pub type ObjectGuard = OwnedMutexGuard<()>;

/// Hands out one async mutex per object key.
///
/// Lock entries are created on first use and kept for the process lifetime;
/// the population is bounded by observed object cardinality.
#[derive(Default)]
pub struct ObjectLockManager {
    locks: Mutex<AHashMap<ObjectKey, Arc<AsyncMutex<()>>>>,
}

impl ObjectLockManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for one object, waiting if another caller holds it.
    pub async fn acquire(&self, key: &ObjectKey) -> ObjectGuard {
        let lock = {
            let mut locks = self.locks.lock();
            locks
                .entry(key.clone())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    /// Number of objects a lock has been created for.
    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn lock_is_exclusive_per_object() {
        let manager = ObjectLockManager::new();
        let key = ObjectKey::new("c", "cam", "A");

        let guard = manager.acquire(&key).await;
        let second = tokio::time::timeout(Duration::from_millis(20), manager.acquire(&key)).await;
        assert!(second.is_err(), "second acquire should block while held");

        drop(guard);
        let third = tokio::time::timeout(Duration::from_millis(20), manager.acquire(&key)).await;
        assert!(third.is_ok(), "lock should be free after release");
    }

    #[tokio::test]
    async fn distinct_objects_do_not_contend() {
        let manager = ObjectLockManager::new();
        let _a = manager.acquire(&ObjectKey::new("c", "cam", "A")).await;
        let b = tokio::time::timeout(
            Duration::from_millis(20),
            manager.acquire(&ObjectKey::new("c", "cam", "B")),
        )
        .await;
        assert!(b.is_ok());
        assert_eq!(manager.len(), 2);
    }
}
