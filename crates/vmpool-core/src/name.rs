//! Worker names and registry keys

use core::fmt;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::error::{PoolError, PoolResult};

/// Registry key for a named worker
///
/// This is the cached 64-bit hash of the worker's name. The registry is
/// keyed by hash so lookups during enqueue/destroy don't re-compare full
/// strings; the name itself stays on the worker for display.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct WorkerKey(u64);

impl WorkerKey {
    /// Compute the key for a worker name
    pub fn of(name: &str) -> Self {
        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        WorkerKey(hasher.finish())
    }

    /// Create a key from a raw hash value
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        WorkerKey(raw)
    }

    /// Get the raw u64 value
    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl From<WorkerKey> for u64 {
    #[inline]
    fn from(key: WorkerKey) -> Self {
        key.0
    }
}

impl fmt::Debug for WorkerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WorkerKey({:#018x})", self.0)
    }
}

impl fmt::Display for WorkerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// Validate a worker name at creation time
///
/// Names must be non-empty; everything else is the caller's choice.
pub fn validate_name(name: &str) -> PoolResult<()> {
    if name.is_empty() {
        return Err(PoolError::InvalidName);
    }
    Ok(())
}
