//! Worker: one named thread, one private interpreter, two queues
//!
//! A worker pulls jobs from its pending queue, runs their worker phase
//! against the private interpreter, and pushes them onto its finished
//! queue for the controlling thread to drain. Both queues are unbounded
//! lock-free MPMC (`SegQueue`), so producers never block and never block
//! the worker.
//!
//! The interpreter is a local of [`Worker::run`]: it is created on the
//! worker thread after spawn and dropped there on the way out. No other
//! thread can reach it.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use crossbeam_queue::SegQueue;

use vmpool_core::diag::DiagnosticSink;
use vmpool_core::error::PoolError;
use vmpool_core::job::{BoxedJob, Job, JobContext};
use vmpool_core::name::WorkerKey;
use vmpool_core::phase::WorkerPhase;
use vmpool_core::vlog;
use vmpool_core::{vdebug, vtrace};

use crate::interp::{Interpreter, InterpreterSpec};

/// A named worker and its shared state
///
/// Shared between the worker's own thread, the controlling thread, and any
/// producer holding a [`WorkerHandle`]. The interpreter itself is not in
/// here; only the worker thread ever holds it.
pub struct Worker<E> {
    /// Unique name, fixed at creation
    name: String,

    /// Cached hash of the name, the registry key
    key: WorkerKey,

    /// Requested interpreter stack size, passed to `Interpreter::open`
    stack_size: usize,

    /// Bounded idle-gate wait per empty iteration
    idle_wait: Duration,

    /// Jobs waiting for their worker phase
    pending: SegQueue<BoxedJob<E>>,

    /// Jobs whose worker phase completed, awaiting the controlling thread
    finished: SegQueue<BoxedJob<E>>,

    /// Liveness flag owned by the worker thread: set once at the end of
    /// init, cleared once at teardown
    running: AtomicBool,

    /// Stop request from stop/kill. Lives apart from `running` so a stop
    /// issued while the worker is still initializing cannot be overwritten
    /// by init.
    stop_requested: AtomicBool,

    /// Lifecycle phase, readable from any thread
    phase: AtomicU8,

    /// Held for construction, one loop iteration at a time, and teardown.
    /// Not a general execution lock.
    lifecycle: Mutex<()>,

    /// Idle gate: the worker waits here when the pending queue is empty
    gate: Mutex<()>,
    idle: Condvar,
    parked: AtomicBool,

    /// Diagnostics sink shared with the interpreter
    diag: DiagnosticSink,
}

impl<E> Worker<E> {
    pub(crate) fn new(
        name: &str,
        stack_size: usize,
        idle_wait: Duration,
        diag: DiagnosticSink,
    ) -> Self {
        Self {
            name: name.to_string(),
            key: WorkerKey::of(name),
            stack_size,
            idle_wait,
            pending: SegQueue::new(),
            finished: SegQueue::new(),
            running: AtomicBool::new(false),
            stop_requested: AtomicBool::new(false),
            phase: AtomicU8::new(WorkerPhase::Uninitialized as u8),
            lifecycle: Mutex::new(()),
            gate: Mutex::new(()),
            idle: Condvar::new(),
            parked: AtomicBool::new(false),
            diag,
        }
    }

    /// Worker name
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registry key (cached name hash)
    #[inline]
    pub fn key(&self) -> WorkerKey {
        self.key
    }

    /// Interpreter stack size requested at creation
    #[inline]
    pub fn stack_size(&self) -> usize {
        self.stack_size
    }

    /// Current lifecycle phase
    #[inline]
    pub fn phase(&self) -> WorkerPhase {
        WorkerPhase::from(self.phase.load(Ordering::Acquire))
    }

    /// Whether the loop is live (set by init, cleared at teardown)
    #[inline]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Jobs waiting for their worker phase (approximate under concurrency)
    #[inline]
    pub fn pending_jobs(&self) -> usize {
        self.pending.len()
    }

    /// Completed jobs awaiting the controlling thread (approximate)
    #[inline]
    pub fn finished_jobs(&self) -> usize {
        self.finished.len()
    }

    /// Hand a job to this worker
    ///
    /// Callable from any thread; never blocks producers or the worker. No
    /// bound is enforced, so backlog planning is the caller's job.
    pub fn enqueue<J: Job<E> + 'static>(&self, job: J) {
        self.enqueue_boxed(Box::new(job));
    }

    /// `enqueue` for an already-boxed job
    pub fn enqueue_boxed(&self, job: BoxedJob<E>) {
        self.pending.push(job);
        self.wake();
    }

    /// Request the loop to exit at its next iteration boundary
    ///
    /// Cooperative: a worker phase in progress runs to completion, and
    /// everything already pushed to the finished queue stays collectable.
    /// Pending jobs that never started survive but will not run. The
    /// request is never lost: one issued before or during initialization
    /// takes effect at the first loop-condition check.
    pub fn stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
        self.wake();
    }

    /// Hard stop: request exit and discard the pending backlog
    ///
    /// Takes the lifecycle mutex, so the discard synchronizes with the
    /// loop at an iteration boundary; no job is dropped mid-phase.
    /// Finished jobs stay collectable.
    pub fn kill(&self) {
        self.stop_requested.store(true, Ordering::Release);
        self.wake();
        let _guard = self.lifecycle.lock().unwrap();
        let mut discarded = 0usize;
        while self.pending.pop().is_some() {
            discarded += 1;
        }
        if discarded > 0 {
            vdebug!("kill '{}': discarded {} pending jobs", self.name, discarded);
        }
    }

    /// Pop one completed job, for the controlling thread's drain
    pub(crate) fn pop_finished(&self) -> Option<BoxedJob<E>> {
        self.finished.pop()
    }

    pub(crate) fn diag(&self) -> &DiagnosticSink {
        &self.diag
    }

    /// One loop iteration: pop-execute-push, or park when empty
    fn work(&self, interp: &mut E) {
        match self.pending.pop() {
            Some(mut job) => {
                vtrace!("job start ({} pending)", self.pending.len());
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| job.start(interp, self)));
                if let Err(payload) = outcome {
                    self.diag.error(
                        &self.name,
                        &format!("job panicked: {}", describe_panic(&payload)),
                    );
                }
                // Completion stays observable even after a panic
                self.finished.push(job);
            }
            None => self.park(),
        }
    }

    /// Wait on the idle gate for a bounded interval
    ///
    /// The pending re-check under the gate lock plus the bounded timeout
    /// keep the enqueue/park race harmless: a missed wakeup costs at most
    /// one `idle_wait`.
    fn park(&self) {
        self.parked.store(true, Ordering::Release);
        let guard = self.gate.lock().unwrap();
        if self.pending.is_empty() && !self.stop_requested.load(Ordering::Acquire) {
            let _ = self.idle.wait_timeout(guard, self.idle_wait);
        }
        self.parked.store(false, Ordering::Release);
    }

    fn wake(&self) {
        if self.parked.load(Ordering::Acquire) {
            // Lock ordering with park(): the notify cannot land between the
            // emptiness re-check and the wait, so a parked worker always
            // hears it. Non-parked workers skip the lock entirely.
            let _guard = self.gate.lock().unwrap();
            self.idle.notify_one();
        }
    }
}

impl<E: Interpreter + 'static> Worker<E> {
    /// Thread entry: initialize, loop, tear down
    ///
    /// Phases: Uninitialized -> Initializing -> Running -> Draining ->
    /// Terminated. The lifecycle mutex is held for the init block, for
    /// each loop iteration, and for the teardown block, so external
    /// lifecycle operations can synchronize at an iteration boundary.
    /// A stop requested at any point, including before this entry runs,
    /// is observed at the first loop-condition check.
    pub(crate) fn run(&self) {
        vlog::set_worker_label(&self.name);

        let mut interp = {
            let _guard = self.lifecycle.lock().unwrap();
            if self
                .phase
                .compare_exchange(
                    WorkerPhase::Uninitialized as u8,
                    WorkerPhase::Initializing as u8,
                    Ordering::AcqRel,
                    Ordering::Acquire,
                )
                .is_err()
            {
                self.diag
                    .error(&self.name, &PoolError::AlreadyRunning.to_string());
                vlog::clear_worker_label();
                return;
            }

            let spec = InterpreterSpec {
                name: self.name.clone(),
                stack_size: self.stack_size,
            };
            match E::open(&spec, Arc::clone(&self.diag)) {
                Ok(interp) => {
                    self.running.store(true, Ordering::Release);
                    self.phase
                        .store(WorkerPhase::Running as u8, Ordering::Release);
                    vdebug!("interpreter up, stack {}", self.stack_size);
                    interp
                }
                Err(e) => {
                    self.diag
                        .error(&self.name, &format!("interpreter open failed: {}", e));
                    self.phase
                        .store(WorkerPhase::Terminated as u8, Ordering::Release);
                    vlog::clear_worker_label();
                    return;
                }
            }
        };

        while !self.stop_requested.load(Ordering::Acquire) {
            let _guard = self.lifecycle.lock().unwrap();
            self.work(&mut interp);
        }

        {
            let _guard = self.lifecycle.lock().unwrap();
            self.running.store(false, Ordering::Release);
            self.phase
                .store(WorkerPhase::Draining as u8, Ordering::Release);
            drop(interp);
            self.phase
                .store(WorkerPhase::Terminated as u8, Ordering::Release);
        }
        vdebug!("worker down ({} pending left)", self.pending.len());
        vlog::clear_worker_label();
    }
}

impl<E> JobContext<E> for Worker<E> {
    fn name(&self) -> &str {
        &self.name
    }

    fn pending_jobs(&self) -> usize {
        self.pending.len()
    }

    fn finished_jobs(&self) -> usize {
        self.finished.len()
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn enqueue(&self, job: BoxedJob<E>) {
        self.enqueue_boxed(job);
    }
}

/// Cloneable producer-side handle to one worker
///
/// Returned by `Registry::create`; holds a strong reference so enqueuing
/// against a destroyed worker is safe (the jobs are simply never run).
pub struct WorkerHandle<E> {
    worker: Arc<Worker<E>>,
}

impl<E> WorkerHandle<E> {
    pub(crate) fn new(worker: Arc<Worker<E>>) -> Self {
        Self { worker }
    }

    /// Worker name
    pub fn name(&self) -> &str {
        self.worker.name()
    }

    /// Registry key
    pub fn key(&self) -> WorkerKey {
        self.worker.key()
    }

    /// Interpreter stack size requested at creation
    pub fn stack_size(&self) -> usize {
        self.worker.stack_size()
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> WorkerPhase {
        self.worker.phase()
    }

    /// Whether the worker's loop is accepting work
    pub fn is_running(&self) -> bool {
        self.worker.is_running()
    }

    /// Jobs waiting for their worker phase (approximate)
    pub fn pending_jobs(&self) -> usize {
        self.worker.pending_jobs()
    }

    /// Completed jobs awaiting `process` (approximate)
    pub fn finished_jobs(&self) -> usize {
        self.worker.finished_jobs()
    }

    /// Hand a job to this worker, from any thread
    pub fn enqueue<J: Job<E> + 'static>(&self, job: J) {
        self.worker.enqueue(job);
    }

    /// `enqueue` for an already-boxed job
    pub fn enqueue_boxed(&self, job: BoxedJob<E>) {
        self.worker.enqueue_boxed(job);
    }

    /// Request a cooperative stop (see [`Worker::stop`])
    pub fn stop(&self) {
        self.worker.stop();
    }

    /// Hard stop discarding pending jobs (see [`Worker::kill`])
    pub fn kill(&self) {
        self.worker.kill();
    }
}

impl<E> Clone for WorkerHandle<E> {
    fn clone(&self) -> Self {
        Self {
            worker: Arc::clone(&self.worker),
        }
    }
}

/// Render a panic payload for diagnostics
pub(crate) fn describe_panic(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "opaque panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;
    use std::thread;
    use std::time::Instant;
    use vmpool_core::diag::CaptureDiagnostics;
    use vmpool_core::error::InterpreterError;
    use vmpool_core::job::FnJob;

    struct Calc {
        total: i64,
    }

    impl Interpreter for Calc {
        fn open(_spec: &InterpreterSpec, _diag: DiagnosticSink) -> Result<Self, InterpreterError> {
            Ok(Calc { total: 0 })
        }
    }

    struct FailingInterp;

    impl Interpreter for FailingInterp {
        fn open(_spec: &InterpreterSpec, _diag: DiagnosticSink) -> Result<Self, InterpreterError> {
            Err(InterpreterError::new("out of memory"))
        }
    }

    fn capture_worker(name: &str) -> (Arc<Worker<Calc>>, Arc<CaptureDiagnostics>) {
        let capture = Arc::new(CaptureDiagnostics::new());
        let worker = Arc::new(Worker::new(
            name,
            64,
            Duration::from_millis(5),
            capture.clone() as DiagnosticSink,
        ));
        (worker, capture)
    }

    fn wait_until(limit: Duration, mut cond: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + limit;
        while Instant::now() < deadline {
            if cond() {
                return true;
            }
            thread::sleep(Duration::from_millis(2));
        }
        cond()
    }

    #[test]
    fn test_work_executes_and_forwards() {
        let (worker, _capture) = capture_worker("w");
        let mut interp = Calc { total: 0 };

        worker.enqueue(FnJob::new(
            |interp: &mut Calc, _ctx: &dyn JobContext<Calc>| {
                interp.total += 5;
            },
            |_out, _ctx: &dyn JobContext<Calc>| {},
        ));
        assert_eq!(worker.pending_jobs(), 1);

        worker.work(&mut interp);
        assert_eq!(interp.total, 5);
        assert_eq!(worker.pending_jobs(), 0);
        assert_eq!(worker.finished_jobs(), 1);
    }

    #[test]
    fn test_work_parks_bounded_when_empty() {
        let (worker, _capture) = capture_worker("w");
        let mut interp = Calc { total: 0 };

        let started = Instant::now();
        worker.work(&mut interp);
        // Bounded by idle_wait (5ms here); generous ceiling for slow CI
        assert!(started.elapsed() < Duration::from_millis(500));
        assert_eq!(worker.finished_jobs(), 0);
    }

    #[test]
    fn test_panicking_job_is_isolated() {
        let (worker, capture) = capture_worker("w");
        let mut interp = Calc { total: 1 };

        worker.enqueue(FnJob::new(
            |_interp: &mut Calc, _ctx: &dyn JobContext<Calc>| {
                panic!("scripted boom");
            },
            |_out, _ctx: &dyn JobContext<Calc>| {},
        ));
        worker.work(&mut interp);

        // Job still reaches the finished queue; panic is reported
        assert_eq!(worker.finished_jobs(), 1);
        let errors = capture.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("scripted boom"));
        // State before the panic is untouched
        assert_eq!(interp.total, 1);

        // The worker keeps serving: the next job runs normally
        worker.enqueue(FnJob::new(
            |interp: &mut Calc, _ctx: &dyn JobContext<Calc>| {
                interp.total += 10;
            },
            |_out, _ctx: &dyn JobContext<Calc>| {},
        ));
        worker.work(&mut interp);
        assert_eq!(interp.total, 11);
        assert_eq!(worker.finished_jobs(), 2);
        assert_eq!(capture.errors().len(), 1);
    }

    #[test]
    fn test_job_sees_worker_context() {
        let (worker, _capture) = capture_worker("combat");
        let mut interp = Calc { total: 0 };
        let seen = Arc::new(StdMutex::new(String::new()));
        let seen_clone = seen.clone();

        worker.enqueue(FnJob::new(
            move |_interp: &mut Calc, ctx: &dyn JobContext<Calc>| {
                *seen_clone.lock().unwrap() = ctx.name().to_string();
            },
            |_out, _ctx: &dyn JobContext<Calc>| {},
        ));
        worker.work(&mut interp);

        assert_eq!(seen.lock().unwrap().as_str(), "combat");
    }

    #[test]
    fn test_kill_discards_pending() {
        let (worker, _capture) = capture_worker("w");
        for _ in 0..3 {
            worker.enqueue(FnJob::new(
                |_interp: &mut Calc, _ctx: &dyn JobContext<Calc>| {},
                |_out, _ctx: &dyn JobContext<Calc>| {},
            ));
        }
        assert_eq!(worker.pending_jobs(), 3);

        worker.kill();
        assert_eq!(worker.pending_jobs(), 0);
        assert!(!worker.is_running());
    }

    #[test]
    fn test_run_loop_lifecycle() {
        let (worker, _capture) = capture_worker("w");
        assert_eq!(worker.phase(), WorkerPhase::Uninitialized);

        let thread_worker = worker.clone();
        let handle = thread::spawn(move || thread_worker.run());

        assert!(wait_until(Duration::from_secs(2), || worker.phase()
            == WorkerPhase::Running));

        let hits = Arc::new(StdMutex::new(0usize));
        let hits_clone = hits.clone();
        worker.enqueue(FnJob::new(
            move |interp: &mut Calc, _ctx: &dyn JobContext<Calc>| {
                interp.total += 1;
                *hits_clone.lock().unwrap() += 1;
            },
            |_out, _ctx: &dyn JobContext<Calc>| {},
        ));

        assert!(wait_until(Duration::from_secs(2), || worker.finished_jobs() == 1));
        assert_eq!(*hits.lock().unwrap(), 1);

        worker.stop();
        handle.join().unwrap();
        assert_eq!(worker.phase(), WorkerPhase::Terminated);
        assert!(!worker.is_running());
    }

    #[test]
    fn test_stop_before_run_is_honored() {
        let (worker, _capture) = capture_worker("w");
        worker.stop();

        // The stop predates the thread entry; run must still initialize,
        // observe it at the first loop check, and tear down
        worker.run();
        assert_eq!(worker.phase(), WorkerPhase::Terminated);
        assert!(!worker.is_running());
    }

    #[test]
    fn test_kill_stops_a_live_worker() {
        let (worker, _capture) = capture_worker("w");
        let thread_worker = worker.clone();
        let handle = thread::spawn(move || thread_worker.run());
        assert!(wait_until(Duration::from_secs(2), || worker.phase()
            == WorkerPhase::Running));

        worker.kill();
        handle.join().unwrap();
        assert_eq!(worker.phase(), WorkerPhase::Terminated);
        assert!(!worker.is_running());
        assert_eq!(worker.pending_jobs(), 0);
    }

    #[test]
    fn test_second_run_is_refused() {
        let (worker, capture) = capture_worker("w");

        let first = worker.clone();
        let handle = thread::spawn(move || first.run());
        assert!(wait_until(Duration::from_secs(2), || worker.phase()
            == WorkerPhase::Running));
        worker.stop();
        handle.join().unwrap();

        // Phase is Terminated now; a second run must refuse and report
        worker.run();
        assert!(capture
            .errors()
            .iter()
            .any(|e| e.contains("already started")));
    }

    #[test]
    fn test_open_failure_terminates() {
        let capture = Arc::new(CaptureDiagnostics::new());
        let worker: Arc<Worker<FailingInterp>> = Arc::new(Worker::new(
            "w",
            64,
            Duration::from_millis(5),
            capture.clone() as DiagnosticSink,
        ));

        let thread_worker = worker.clone();
        let handle = thread::spawn(move || thread_worker.run());
        handle.join().unwrap();

        assert_eq!(worker.phase(), WorkerPhase::Terminated);
        assert!(!worker.is_running());
        assert!(capture
            .errors()
            .iter()
            .any(|e| e.contains("open failed") && e.contains("out of memory")));
    }

    #[test]
    fn test_enqueue_wakes_parked_worker() {
        // Long idle wait so the test only passes via an actual wakeup
        let worker = Arc::new(Worker::<Calc>::new(
            "w",
            64,
            Duration::from_secs(5),
            Arc::new(CaptureDiagnostics::new()) as DiagnosticSink,
        ));

        let thread_worker = worker.clone();
        let handle = thread::spawn(move || thread_worker.run());
        assert!(wait_until(Duration::from_secs(2), || worker.phase()
            == WorkerPhase::Running));
        // Wait for the loop to actually reach the idle gate
        assert!(wait_until(Duration::from_secs(2), || worker
            .parked
            .load(Ordering::Acquire)));

        let started = Instant::now();
        worker.enqueue(FnJob::new(
            |_interp: &mut Calc, _ctx: &dyn JobContext<Calc>| {},
            |_out, _ctx: &dyn JobContext<Calc>| {},
        ));
        assert!(wait_until(Duration::from_secs(2), || worker.finished_jobs() == 1));
        // Far below the 5s idle wait proves the gate was signaled
        assert!(started.elapsed() < Duration::from_secs(2));

        worker.stop();
        handle.join().unwrap();
    }

    #[test]
    fn test_describe_panic_payloads() {
        let caught =
            panic::catch_unwind(|| panic!("plain str")).expect_err("must panic");
        assert_eq!(describe_panic(&*caught), "plain str");

        let caught = panic::catch_unwind(|| panic!("{} {}", "with", "format"))
            .expect_err("must panic");
        assert_eq!(describe_panic(&*caught), "with format");
    }
}
