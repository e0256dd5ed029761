//! Compile-time configuration defaults
//!
//! Overridable at runtime via `VMP_*` environment variables, see
//! [`PoolConfig::from_env`](super::PoolConfig::from_env).

/// Idle-gate wait per loop iteration when the pending queue is empty (ms)
pub const IDLE_WAIT_MS: u64 = 50;

/// OS stack size for worker threads (None = system default)
pub const OS_STACK_SIZE: Option<usize> = None;

/// Prefix for worker OS thread names ("<prefix>-<worker name>")
pub const THREAD_NAME_PREFIX: &str = "vmpool";

/// Finished jobs drained per worker by `process_all`
pub const DRAIN_LIMIT: usize = 16;

/// Debug logging off by default
pub const DEBUG_LOGGING: bool = false;
