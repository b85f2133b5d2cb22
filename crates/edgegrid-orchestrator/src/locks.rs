//! Per-instance serialization of remote lifecycle calls.
//!
//! Entries are created on demand. Whoever leaves an entry last removes it,
//! whether it held the lock or gave up waiting, so the map only ever holds
//! instances with calls in flight.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Key = (String, String);

#[derive(Default)]
pub(crate) struct InstanceLocks {
    entries: Mutex<HashMap<Key, Arc<AsyncMutex<()>>>>,
}

/// Held for the duration of one call against one instance.
pub(crate) struct InstanceGuard<'a> {
    locks: &'a InstanceLocks,
    key: Key,
    guard: Option<OwnedMutexGuard<()>>,
}

impl InstanceLocks {
    /// Wait until no other call holds `(node_id, instance_id)`.
    pub(crate) async fn lock(&self, node_id: &str, instance_id: &str) -> InstanceGuard<'_> {
        let key = (node_id.to_string(), instance_id.to_string());
        let entry = self
            .entries()
            .entry(key.clone())
            .or_default()
            .clone();

        // Built before waiting so a cancelled wait still cleans up.
        let mut guard = InstanceGuard {
            locks: self,
            key,
            guard: None,
        };
        guard.guard = Some(entry.lock_owned().await);
        guard
    }

    // The map lock is never held across an await.
    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<Key, Arc<AsyncMutex<()>>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries().len()
    }
}

impl Drop for InstanceGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());

        let mut entries = self.locks.entries();
        // Clones are only taken under the map lock, so a count of one means
        // no holder and no waiter. A cancelled wait has already dropped its
        // clone along with the lock future.
        if entries
            .get(&self.key)
            .is_some_and(|entry| Arc::strong_count(entry) == 1)
        {
            entries.remove(&self.key);
        }
    }
}
