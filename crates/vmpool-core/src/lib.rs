//! # vmpool-core
//!
//! Core contracts and primitives for the vmpool named worker system.
//!
//! This crate is platform-agnostic and contains no OS-specific code.
//! Threads, queues, and the registry live in `vmpool-runtime`.
//!
//! ## Modules
//!
//! - `job` - Two-phase job contract and closure adapter
//! - `diag` - Diagnostics forwarding from embedded interpreters
//! - `name` - Worker names and registry keys
//! - `phase` - Worker lifecycle phases
//! - `vecmap` - Insertion-ordered flat map
//! - `error` - Error types
//! - `vlog` - Leveled print macros
//! - `env` - Environment variable utilities

#![allow(dead_code)]

pub mod diag;
pub mod env;
pub mod error;
pub mod job;
pub mod name;
pub mod phase;
pub mod vecmap;
pub mod vlog;

// Re-exports for convenience
pub use diag::{CaptureDiagnostics, CompileReport, DiagEvent, DiagnosticSink, Diagnostics, LogDiagnostics};
pub use env::{env_get, env_get_bool, env_get_opt, env_get_str};
pub use error::{InterpreterError, PoolError, PoolResult};
pub use job::{BoxedJob, FnJob, Job, JobContext};
pub use name::{validate_name, WorkerKey};
pub use phase::WorkerPhase;
pub use vecmap::VecMap;
