//! Per-collection lock registry.
//!
//! Two tiers of locking:
//!
//! - one short-lived registry lock guarding the name-to-lock map
//! - one lock per collection, held by writers and deleters for the whole
//!   filesystem operation
//!
//! The registry lock is released before the caller touches the filesystem,
//! so operations on different collections never contend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Shared handle to one collection's lock.
pub type CollectionLock = Arc<Mutex<()>>;

/// Maps collection names to their exclusive locks.
///
/// A given name is only ever associated with one lock for the lifetime of
/// the registry.
#[derive(Debug, Default)]
pub struct LockRegistry {
    locks: Mutex<HashMap<String, CollectionLock>>,
}

impl LockRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the lock dedicated to `collection`, registering one if absent.
    pub fn lock_for(&self, collection: &str) -> CollectionLock {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(lock) = locks.get(collection) {
            return Arc::clone(lock);
        }
        let lock = CollectionLock::default();
        locks.insert(collection.to_owned(), Arc::clone(&lock));
        lock
    }

    /// Number of collections that have a registered lock.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no lock has been registered yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Acquire a collection lock.
///
/// The lock guards `()`, so a panic in a previous holder cannot leave shared
/// state half-updated and poisoning is ignored.
pub(crate) fn acquire(lock: &Mutex<()>) -> MutexGuard<'_, ()> {
    lock.lock().unwrap_or_else(PoisonError::into_inner)
}
