//! # vmpool - named workers with private interpreters
//!
//! A small pool of named worker threads where every worker owns one
//! exclusive script interpreter. Producers hand over two-phase jobs; the
//! worker phase runs against the interpreter on the worker's thread, the
//! controlling phase runs later on whichever thread drives the registry.
//!
//! ## Features
//!
//! - **Exclusive interpreters**: one engine per worker, created and
//!   destroyed on the worker's own thread, never shared or locked
//! - **Two-phase jobs**: heavy scripting off the controlling thread,
//!   results applied back on it at a moment the host chooses
//! - **Lock-free hand-off**: unbounded MPMC pending/finished queues;
//!   enqueuing never blocks the producer or the worker
//! - **Bounded idling**: an empty worker parks on its idle gate and wakes
//!   on enqueue, burning no measurable CPU between jobs
//! - **Diagnostics sinks**: interpreter output, errors and compile
//!   reports (message, source, line, column) routed per worker
//!
//! ## Quick Start
//!
//! ```ignore
//! use vmpool::{FnJob, JobContext, PoolConfig, Registry, ScratchInterpreter};
//!
//! fn main() -> vmpool::PoolResult<()> {
//!     let mut registry: Registry<ScratchInterpreter> =
//!         Registry::new(PoolConfig::default())?;
//!
//!     // One worker, one private interpreter
//!     let combat = registry.create(64, "combat")?;
//!
//!     // Worker phase evaluates on the worker thread; the value rides the
//!     // job back and the finish phase applies it on this thread.
//!     combat.enqueue(FnJob::new(
//!         |interp: &mut ScratchInterpreter, _ctx: &dyn JobContext<ScratchInterpreter>| {
//!             interp.eval("damage = 6*7\ndamage")
//!         },
//!         |result, _ctx: &dyn JobContext<ScratchInterpreter>| {
//!             println!("script said: {:?}", result);
//!         },
//!     ));
//!
//!     // Later, on the controlling thread:
//!     registry.process(16);
//!     registry.terminate();
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Controlling Thread                        │
//! │        Registry: create / enqueue / process / terminate     │
//! └─────────────────────────────────────────────────────────────┘
//!            │ pending.push                  ▲ finished.pop
//!            ▼                               │
//! ┌───────────────────┐   ┌───────────────────┐
//! │  Worker "combat"  │   │  Worker "market"  │   ...
//! │  pull-exec-push   │   │  pull-exec-push   │
//! │  ┌─────────────┐  │   │  ┌─────────────┐  │
//! │  │ Interpreter │  │   │  │ Interpreter │  │
//! │  │  (private)  │  │   │  │  (private)  │  │
//! │  └─────────────┘  │   │  └─────────────┘  │
//! └───────────────────┘   └───────────────────┘
//! ```

// Re-export core types
pub use vmpool_core::{
    BoxedJob,
    CaptureDiagnostics,
    CompileReport,
    DiagEvent,
    DiagnosticSink,
    Diagnostics,
    FnJob,
    InterpreterError,
    Job,
    JobContext,
    LogDiagnostics,
    PoolError,
    PoolResult,
    WorkerKey,
    WorkerPhase,
    validate_name,
};

// Re-export vlog macros for debug logging
pub use vmpool_core::{vprint, vprintln, verror, vwarn, vinfo, vdebug, vtrace};
pub use vmpool_core::vlog::{LogLevel, init as init_logging, set_flush_enabled, set_log_level};

// Re-export env utilities
pub use vmpool_core::{env_get, env_get_bool, env_get_opt, env_get_str};

// Re-export runtime types
pub use vmpool_runtime::{
    ConfigError,
    Interpreter,
    InterpreterSpec,
    PoolConfig,
    Registry,
    ScratchInterpreter,
    Thread,
    Worker,
    WorkerHandle,
    thread_cpu_time,
};

/// Registry with the default, environment-aware configuration
///
/// Shorthand for `Registry::new(PoolConfig::default())`.
pub fn pool<E>() -> PoolResult<Registry<E>> {
    Registry::new(PoolConfig::default())
}
