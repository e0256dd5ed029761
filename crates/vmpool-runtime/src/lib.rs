//! # vmpool-runtime
//!
//! Worker threads, the registry, and the built-in interpreter.
//!
//! This crate provides:
//! - Pool configuration (environment variables + builder) in `config`
//! - Per-thread CPU clock readings in `cputime`
//! - The `Interpreter` trait workers host in `interp`
//! - The controlling thread's worker table in `registry`
//! - The built-in line-calculator interpreter in `scratch`
//! - The OS-thread wrapper holding the worker keep-alive in `thread`
//! - The pull-execute-push loop and its queues in `worker`

#![allow(dead_code)]

pub mod config;
pub mod cputime;
pub mod interp;
pub mod registry;
pub mod scratch;
pub mod thread;
pub mod worker;

pub use config::{ConfigError, PoolConfig};
pub use cputime::thread_cpu_time;
pub use interp::{Interpreter, InterpreterSpec};
pub use registry::Registry;
pub use scratch::ScratchInterpreter;
pub use thread::Thread;
pub use worker::{Worker, WorkerHandle};
