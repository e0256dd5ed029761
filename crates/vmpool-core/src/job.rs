//! Two-phase job contract
//!
//! A job crosses the pool in two phases: a worker phase executed on the
//! owning worker's thread with exclusive access to that worker's private
//! interpreter, and a finish phase executed later on the controlling
//! thread when the host drains completed work. Anything the finish phase
//! needs from the worker phase travels as data inside the job itself; the
//! interpreter never leaves its worker's thread.

/// Worker surface visible to an executing job
///
/// Both phases receive this, letting a job read its worker's identity,
/// inspect queue depths, or hand follow-up work back to the worker (a job
/// that wants a retry re-enqueues itself from its finish phase).
pub trait JobContext<E> {
    /// Name of the worker this job belongs to
    fn name(&self) -> &str;

    /// Jobs waiting on the pending queue (approximate under concurrency)
    fn pending_jobs(&self) -> usize;

    /// Completed jobs awaiting the controlling thread (approximate)
    fn finished_jobs(&self) -> usize;

    /// Whether the worker's loop is still accepting work
    fn is_running(&self) -> bool;

    /// Push a follow-up job onto this worker's pending queue
    fn enqueue(&self, job: BoxedJob<E>);
}

/// A movable two-phase unit of work
///
/// `start` runs on the worker thread; `finish` runs later on the
/// controlling thread once the host drains the worker's finished queue.
/// Jobs transfer by move through the pool's queues, so exactly one thread
/// has the right to touch a given job at any instant. `start` must confine
/// itself to the interpreter and the job's own data.
pub trait Job<E>: Send {
    /// Worker-thread phase, with exclusive access to the private interpreter
    fn start(&mut self, interp: &mut E, ctx: &dyn JobContext<E>);

    /// Controlling-thread phase, run after the worker phase completed
    fn finish(&mut self, ctx: &dyn JobContext<E>);
}

/// Boxed job as carried by the pool's queues
pub type BoxedJob<E> = Box<dyn Job<E>>;

/// Closure adapter for the common job shape: compute something on the
/// worker thread, consume the result on the controlling thread
///
/// The worker-phase closure's return value is stored in the job and handed
/// to the finish closure. Hosts with richer job kinds implement [`Job`]
/// directly.
pub struct FnJob<S, F, T> {
    start: Option<S>,
    finish: Option<F>,
    output: Option<T>,
}

impl<S, F, T> FnJob<S, F, T> {
    pub fn new(start: S, finish: F) -> Self {
        Self {
            start: Some(start),
            finish: Some(finish),
            output: None,
        }
    }
}

impl<E, S, F, T> Job<E> for FnJob<S, F, T>
where
    S: FnOnce(&mut E, &dyn JobContext<E>) -> T + Send,
    F: FnOnce(T, &dyn JobContext<E>) + Send,
    T: Send,
{
    fn start(&mut self, interp: &mut E, ctx: &dyn JobContext<E>) {
        if let Some(start) = self.start.take() {
            self.output = Some(start(interp, ctx));
        }
    }

    fn finish(&mut self, ctx: &dyn JobContext<E>) {
        if let (Some(finish), Some(output)) = (self.finish.take(), self.output.take()) {
            finish(output, ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct Calc {
        total: i64,
    }

    struct TestContext {
        enqueued: AtomicUsize,
    }

    impl TestContext {
        fn new() -> Self {
            Self { enqueued: AtomicUsize::new(0) }
        }
    }

    impl JobContext<Calc> for TestContext {
        fn name(&self) -> &str {
            "test"
        }

        fn pending_jobs(&self) -> usize {
            0
        }

        fn finished_jobs(&self) -> usize {
            0
        }

        fn is_running(&self) -> bool {
            true
        }

        fn enqueue(&self, _job: BoxedJob<Calc>) {
            self.enqueued.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_fn_job_carries_output_to_finish() {
        let ctx = TestContext::new();
        let mut interp = Calc { total: 40 };
        let seen = Mutex::new(None);

        let mut job = FnJob::new(
            |interp: &mut Calc, _ctx: &dyn JobContext<Calc>| {
                interp.total += 2;
                interp.total
            },
            |result, _ctx: &dyn JobContext<Calc>| {
                *seen.lock().unwrap() = Some(result);
            },
        );

        job.start(&mut interp, &ctx);
        assert_eq!(interp.total, 42);

        job.finish(&ctx);
        assert_eq!(*seen.lock().unwrap(), Some(42));
    }

    #[test]
    fn test_fn_job_phases_run_at_most_once() {
        let ctx = TestContext::new();
        let mut interp = Calc { total: 0 };
        let runs = AtomicUsize::new(0);
        let finishes = AtomicUsize::new(0);

        let mut job = FnJob::new(
            |_interp: &mut Calc, _ctx: &dyn JobContext<Calc>| {
                runs.fetch_add(1, Ordering::SeqCst);
            },
            |_result, _ctx: &dyn JobContext<Calc>| {
                finishes.fetch_add(1, Ordering::SeqCst);
            },
        );

        job.start(&mut interp, &ctx);
        job.start(&mut interp, &ctx);
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        job.finish(&ctx);
        job.finish(&ctx);
        assert_eq!(finishes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_boxed_job_dispatch() {
        let ctx = TestContext::new();
        let mut interp = Calc { total: 1 };

        let mut job: BoxedJob<Calc> = Box::new(FnJob::new(
            |interp: &mut Calc, ctx: &dyn JobContext<Calc>| {
                interp.total *= 10;
                // Follow-up work goes back through the context
                ctx.enqueue(Box::new(FnJob::new(
                    |_: &mut Calc, _: &dyn JobContext<Calc>| {},
                    |_, _: &dyn JobContext<Calc>| {},
                )));
            },
            |_result, _ctx: &dyn JobContext<Calc>| {},
        ));

        job.start(&mut interp, &ctx);
        assert_eq!(interp.total, 10);
        assert_eq!(ctx.enqueued.load(Ordering::SeqCst), 1);
    }
}
