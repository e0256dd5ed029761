//! Insertion-ordered worker table, driven by one controlling thread
//!
//! The registry owns every worker thread it creates and is the only place
//! workers are added or removed. It is deliberately not shareable: create,
//! destroy, process and terminate all take `&mut self`, so the controlling
//! thread's exclusive role is a compile-time fact rather than a rule in a
//! comment. Producer threads interact through the cloneable
//! [`WorkerHandle`]s the registry hands out.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use vmpool_core::diag::{DiagnosticSink, LogDiagnostics};
use vmpool_core::error::{PoolError, PoolResult};
use vmpool_core::name::{validate_name, WorkerKey};
use vmpool_core::vecmap::VecMap;
use vmpool_core::vlog::{self, LogLevel};
use vmpool_core::{vdebug, vinfo};

use crate::config::PoolConfig;
use crate::interp::Interpreter;
use crate::thread::Thread;
use crate::worker::{describe_panic, Worker, WorkerHandle};

/// Worker registry and controlling-thread driver
///
/// Iteration order everywhere (names, process passes, terminate) is the
/// order workers were created in.
pub struct Registry<E> {
    table: VecMap<WorkerKey, Thread<E>>,
    config: PoolConfig,
    diag: DiagnosticSink,
}

impl<E> Registry<E> {
    /// Build a registry that reports diagnostics through the log macros
    pub fn new(config: PoolConfig) -> PoolResult<Self> {
        Self::with_diagnostics(config, Arc::new(LogDiagnostics))
    }

    /// Build a registry with a caller-supplied diagnostics sink
    ///
    /// The sink is shared with every interpreter this registry opens.
    pub fn with_diagnostics(config: PoolConfig, diag: DiagnosticSink) -> PoolResult<Self> {
        config.validate()?;
        vlog::init();
        if config.debug_logging {
            vlog::set_log_level(LogLevel::Debug);
        }
        Ok(Self {
            table: VecMap::new(),
            config,
            diag,
        })
    }

    /// Configuration this registry was built with
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Number of registered workers
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Whether a worker with this name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.table.contains_key(&WorkerKey::of(name))
    }

    /// Handle to a registered worker, if any
    pub fn get(&self, name: &str) -> Option<WorkerHandle<E>> {
        self.table
            .get(&WorkerKey::of(name))
            .map(|thread| WorkerHandle::new(Arc::clone(thread.worker())))
    }

    /// Worker names in creation order
    pub fn names(&self) -> Vec<String> {
        self.table
            .values()
            .map(|thread| thread.worker().name().to_string())
            .collect()
    }

    /// Stop one worker and block until its thread has exited
    ///
    /// The worker's interpreter is destroyed on its own thread before this
    /// returns. Finished jobs that were never processed are discarded.
    pub fn destroy(&mut self, name: &str) -> PoolResult<()> {
        match self.table.remove(&WorkerKey::of(name)) {
            Some(thread) => {
                thread.stop_and_join();
                vdebug!("destroyed worker '{}'", name);
                Ok(())
            }
            None => Err(PoolError::WorkerNotFound(name.to_string())),
        }
    }

    /// Run controlling phases for up to `max_jobs_per_worker` completed
    /// jobs on each worker, in creation order
    ///
    /// Runs on the calling thread; returns the number of jobs finished.
    /// Jobs completed beyond the per-worker bound stay queued for the next
    /// pass. A panicking controlling phase is reported to the worker's
    /// diagnostics sink and does not end the pass.
    pub fn process(&mut self, max_jobs_per_worker: usize) -> usize {
        if max_jobs_per_worker == 0 {
            return 0;
        }
        // One pass over the workers present at entry
        let workers: Vec<Arc<Worker<E>>> = self
            .table
            .values()
            .map(|thread| Arc::clone(thread.worker()))
            .collect();

        let mut finished = 0usize;
        for worker in workers {
            for _ in 0..max_jobs_per_worker {
                let Some(mut job) = worker.pop_finished() else {
                    break;
                };
                let outcome =
                    panic::catch_unwind(AssertUnwindSafe(|| job.finish(worker.as_ref())));
                if let Err(payload) = outcome {
                    worker.diag().error(
                        worker.name(),
                        &format!("finish panicked: {}", describe_panic(&payload)),
                    );
                }
                finished += 1;
            }
        }
        finished
    }

    /// Drain every completed job currently queued, in passes of the
    /// configured `drain_limit`
    ///
    /// Keeps going while passes make progress, so controlling phases that
    /// enqueue follow-up work can extend the drain.
    pub fn process_all(&mut self) -> usize {
        let limit = self.config.drain_limit;
        let mut total = 0usize;
        loop {
            let n = self.process(limit);
            if n == 0 {
                return total;
            }
            total += n;
        }
    }

    /// Stop and join every worker, clearing the registry
    ///
    /// Stops are requested up front so workers wind down concurrently,
    /// then each thread is joined in creation order. Safe to call any
    /// number of times; an empty registry is a no-op.
    pub fn terminate(&mut self) {
        if self.table.is_empty() {
            return;
        }
        vinfo!("terminating {} workers", self.table.len());
        for thread in self.table.values() {
            thread.worker().stop();
        }
        for (_key, thread) in self.table.drain() {
            thread.stop_and_join();
        }
    }
}

impl<E: Interpreter + 'static> Registry<E> {
    /// Create a named worker with its own thread and interpreter
    ///
    /// `stack_size` is the interpreter stack request recorded for
    /// [`Interpreter::open`]; the OS thread stack comes from the pool
    /// configuration. Fails with [`PoolError::InvalidName`] for an empty
    /// name, [`PoolError::InvalidStackSize`] for a zero stack and
    /// [`PoolError::DuplicateName`] when the name is taken; the registered
    /// worker is untouched on every error path.
    pub fn create(&mut self, stack_size: usize, name: &str) -> PoolResult<WorkerHandle<E>> {
        validate_name(name)?;
        if stack_size == 0 {
            return Err(PoolError::InvalidStackSize);
        }
        let key = WorkerKey::of(name);
        if self.table.contains_key(&key) {
            return Err(PoolError::DuplicateName(name.to_string()));
        }

        let worker = Arc::new(Worker::new(
            name,
            stack_size,
            self.config.idle_wait,
            Arc::clone(&self.diag),
        ));
        let thread = Thread::spawn(Arc::clone(&worker), &self.config)?;
        self.table.insert(key, thread);
        vdebug!("created worker '{}' (interpreter stack {})", name, stack_size);
        Ok(WorkerHandle::new(worker))
    }
}

impl<E> Drop for Registry<E> {
    /// Terminate on drop so no worker thread outlives the registry
    fn drop(&mut self) {
        self.terminate();
    }
}
