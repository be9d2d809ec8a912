//! Activity primary-key allocation.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::ActivityId;

/// Monotonic counter handing out activity primary keys.
///
/// The allocator is owned by whoever bootstraps the activities (usually an
/// [`ActivityBook`](crate::ActivityBook)) and passed explicitly to
/// [`Activity::new`](crate::Activity::new). It is atomic, so one allocator can
/// be shared by reference between threads.
#[derive(Debug, Default)]
pub struct PrimaryKeyAllocator {
    next: AtomicU32,
}

impl PrimaryKeyAllocator {
    /// Creates an allocator whose next key is `start`.
    #[must_use]
    pub const fn new(start: ActivityId) -> Self {
        Self {
            next: AtomicU32::new(start),
        }
    }

    /// The key the next allocation will return.
    #[must_use]
    pub fn current(&self) -> ActivityId {
        self.next.load(Ordering::SeqCst)
    }

    /// Restores the counter, typically after loading persisted activities.
    pub fn set(&self, key: ActivityId) {
        self.next.store(key, Ordering::SeqCst);
    }

    /// Returns the current key and advances the counter.
    pub fn next(&self) -> ActivityId {
        self.next.fetch_add(1, Ordering::SeqCst)
    }

    /// Moves the counter past `key` if it is not already.
    pub fn reserve(&self, key: ActivityId) {
        self.next.fetch_max(key.saturating_add(1), Ordering::SeqCst);
    }
}

impl Clone for PrimaryKeyAllocator {
    fn clone(&self) -> Self {
        Self::new(self.current())
    }
}
