use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique sequential identifier for an entity. Assigned once at
/// construction, stable for the entity's lifetime, and used for equality,
/// ordering and indexing.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hands out [`EntityId`]s, starting at 1. Safe to share between threads:
/// the whole critical section is a single atomic fetch-add, so no lock is
/// needed.
#[derive(Debug)]
pub struct IdAllocator {
    next: AtomicU64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    pub fn generate(&self) -> EntityId {
        EntityId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Combine two integers into one unique number, order-independent: the
/// smaller value is always treated as the first argument.
pub fn cantor_pairing(x: i64, y: i64) -> i64 {
    let dx = x.min(y);
    let dy = x.max(y);
    (dx + dy) * (dx + dy + 1) / 2 + dy
}
