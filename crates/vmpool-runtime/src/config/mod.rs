//! Pool configuration
//!
//! Provides compile-time defaults with runtime environment overrides.
//!
//! # Configuration Priority (highest wins)
//!
//! 1. Environment variables (runtime)
//! 2. Builder methods (programmatic)
//! 3. Library defaults
//!
//! # Example
//!
//! ```rust,ignore
//! use vmpool_runtime::config::PoolConfig;
//!
//! // Use defaults with env overrides
//! let config = PoolConfig::from_env();
//!
//! // Or customize programmatically
//! let config = PoolConfig::from_env()
//!     .idle_wait(Duration::from_millis(10))
//!     .os_stack_size(Some(512 * 1024));
//! ```

pub mod defaults;

use std::time::Duration;

use vmpool_core::env::{env_get, env_get_bool, env_get_opt, env_get_str};
use vmpool_core::error::PoolError;

/// Pool configuration with builder pattern.
///
/// Use `from_env()` to start with compile-time defaults and apply
/// any environment variable overrides.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Bounded wait on the idle gate when a worker's pending queue is empty
    pub idle_wait: Duration,
    /// OS stack size for worker threads (None = system default)
    ///
    /// Distinct from the per-worker interpreter stack size passed to
    /// `Registry::create`.
    pub os_stack_size: Option<usize>,
    /// Prefix for worker OS thread names
    pub thread_name_prefix: String,
    /// Finished jobs drained per worker by `process_all`
    pub drain_limit: usize,
    /// Enable debug logging
    pub debug_logging: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl PoolConfig {
    /// Create config from compile-time defaults with environment overrides.
    ///
    /// Environment variables (all optional):
    /// - `VMP_IDLE_WAIT_MS` - Idle-gate wait in milliseconds
    /// - `VMP_OS_STACK_SIZE` - OS stack bytes for worker threads
    /// - `VMP_THREAD_PREFIX` - Worker thread name prefix
    /// - `VMP_DRAIN_LIMIT` - Finished jobs drained per worker by `process_all`
    /// - `VMP_DEBUG` - Enable debug logging (0/1)
    pub fn from_env() -> Self {
        Self {
            idle_wait: Duration::from_millis(env_get("VMP_IDLE_WAIT_MS", defaults::IDLE_WAIT_MS)),
            os_stack_size: env_get_opt("VMP_OS_STACK_SIZE").or(defaults::OS_STACK_SIZE),
            thread_name_prefix: env_get_str("VMP_THREAD_PREFIX", defaults::THREAD_NAME_PREFIX),
            drain_limit: env_get("VMP_DRAIN_LIMIT", defaults::DRAIN_LIMIT),
            debug_logging: env_get_bool("VMP_DEBUG", defaults::DEBUG_LOGGING),
        }
    }

    /// Create config with explicit defaults (no env override).
    /// Useful for testing or when you want full control.
    pub fn new() -> Self {
        Self {
            idle_wait: Duration::from_millis(defaults::IDLE_WAIT_MS),
            os_stack_size: defaults::OS_STACK_SIZE,
            thread_name_prefix: defaults::THREAD_NAME_PREFIX.to_string(),
            drain_limit: defaults::DRAIN_LIMIT,
            debug_logging: defaults::DEBUG_LOGGING,
        }
    }

    // Builder methods

    pub fn idle_wait(mut self, d: Duration) -> Self {
        self.idle_wait = d;
        self
    }

    pub fn os_stack_size(mut self, size: Option<usize>) -> Self {
        self.os_stack_size = size;
        self
    }

    pub fn thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    pub fn drain_limit(mut self, limit: usize) -> Self {
        self.drain_limit = limit;
        self
    }

    pub fn debug_logging(mut self, enable: bool) -> Self {
        self.debug_logging = enable;
        self
    }

    /// Validate configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.idle_wait.is_zero() {
            return Err(ConfigError::InvalidValue("idle_wait must be > 0"));
        }
        if self.drain_limit == 0 {
            return Err(ConfigError::InvalidValue("drain_limit must be > 0"));
        }
        if self.thread_name_prefix.is_empty() {
            return Err(ConfigError::InvalidValue("thread_name_prefix must not be empty"));
        }
        if let Some(stack) = self.os_stack_size {
            if stack < 64 * 1024 {
                return Err(ConfigError::InvalidValue("os_stack_size must be >= 64KB"));
            }
        }
        Ok(())
    }

    /// Print configuration (for debugging)
    pub fn print(&self) {
        eprintln!("vmpool Configuration:");
        eprintln!("  idle_wait:           {:?}", self.idle_wait);
        eprintln!("  os_stack_size:       {:?}", self.os_stack_size);
        eprintln!("  thread_name_prefix:  {}", self.thread_name_prefix);
        eprintln!("  drain_limit:         {}", self.drain_limit);
        eprintln!("  debug_logging:       {}", self.debug_logging);
    }
}

/// Configuration error
#[derive(Debug, Clone)]
pub enum ConfigError {
    InvalidValue(&'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for PoolError {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::InvalidValue(msg) => PoolError::Config(msg),
        }
    }
}
