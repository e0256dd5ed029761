//! OS-thread wrapper that keeps its worker alive until join
//!
//! `Thread` pairs a spawned worker thread with a strong reference to the
//! worker's shared state. The reference is released only after the thread
//! has been joined, so queues and flags outlive the loop no matter how
//! many producer handles have been dropped.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use vmpool_core::error::{PoolError, PoolResult};
use vmpool_core::vwarn;

use crate::config::PoolConfig;
use crate::interp::Interpreter;
use crate::worker::Worker;

/// A running worker thread and its keep-alive reference
pub struct Thread<E> {
    worker: Arc<Worker<E>>,
    handle: Option<JoinHandle<()>>,
}

impl<E: Interpreter + 'static> Thread<E> {
    /// Spawn the OS thread for `worker`
    ///
    /// The thread is named `{prefix}-{worker}` and gets the configured OS
    /// stack size when one is set. Spawn failures surface synchronously as
    /// [`PoolError::Spawn`]; nothing is left running on that path.
    pub fn spawn(worker: Arc<Worker<E>>, config: &PoolConfig) -> PoolResult<Self> {
        let mut builder = thread::Builder::new()
            .name(format!("{}-{}", config.thread_name_prefix, worker.name()));
        if let Some(stack) = config.os_stack_size {
            builder = builder.stack_size(stack);
        }

        let entry = Arc::clone(&worker);
        let handle = builder
            .spawn(move || entry.run())
            .map_err(|e| PoolError::Spawn(e.to_string()))?;

        Ok(Self {
            worker,
            handle: Some(handle),
        })
    }
}

impl<E> Thread<E> {
    /// Shared state of the worker this thread runs
    pub fn worker(&self) -> &Arc<Worker<E>> {
        &self.worker
    }

    /// Request a stop and block until the thread has exited
    ///
    /// Consumes the wrapper; the keep-alive reference drops only after the
    /// join returns, i.e. after the interpreter has been destroyed on the
    /// worker thread.
    pub fn stop_and_join(mut self) {
        self.worker.stop();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                vwarn!("worker '{}' thread panicked", self.worker.name());
            }
        }
    }
}

impl<E> Drop for Thread<E> {
    /// Backstop join for wrappers dropped without `stop_and_join`
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.worker.stop();
            let _ = handle.join();
        }
    }
}
