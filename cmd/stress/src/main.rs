//! Stress test - many jobs across many workers
//!
//! Floods the pool with two-phase jobs and measures enqueue rate and
//! end-to-end throughput, worker phases included.
//!
//! ```text
//! cargo run --release -p vmpool-stress -- [num_jobs] [num_workers]
//! ```

use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use vmpool::{FnJob, JobContext, Registry, ScratchInterpreter, thread_cpu_time};

fn main() {
    println!("=== vmpool Stress Test ===\n");

    let num_jobs: usize = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(100_000);
    let num_workers: usize = std::env::args()
        .nth(2)
        .and_then(|s| s.parse().ok())
        .unwrap_or(4);

    println!("Jobs: {}, workers: {}", num_jobs, num_workers);

    let mut registry: Registry<ScratchInterpreter> = vmpool::pool().expect("registry");

    let mut handles = Vec::with_capacity(num_workers);
    for i in 0..num_workers {
        let name = format!("stress-{}", i);
        handles.push(registry.create(64, &name).expect("create worker"));
    }

    let started = Arc::new(AtomicU64::new(0));
    let finished = Arc::new(AtomicU64::new(0));

    // Enqueue round-robin; every job touches its interpreter's state
    let start = Instant::now();
    for i in 0..num_jobs {
        let started = started.clone();
        let finished = finished.clone();
        handles[i % num_workers].enqueue(FnJob::new(
            move |interp: &mut ScratchInterpreter, _ctx: &dyn JobContext<ScratchInterpreter>| {
                started.fetch_add(1, Ordering::Relaxed);
                interp.eval("n = 1 + 2 * 3")
            },
            move |_result, _ctx: &dyn JobContext<ScratchInterpreter>| {
                finished.fetch_add(1, Ordering::Relaxed);
            },
        ));

        if (i + 1) % 10_000 == 0 {
            print!("\rEnqueued: {}/{}", i + 1, num_jobs);
            let _ = std::io::stdout().flush();
        }
    }
    let enqueue_time = start.elapsed();
    println!("\n\nEnqueue time: {:?}", enqueue_time);
    println!(
        "Enqueue rate: {:.0} jobs/sec",
        num_jobs as f64 / enqueue_time.as_secs_f64()
    );

    // Drain on this thread until every finish phase has run
    println!("\nDraining...");
    let drain_start = Instant::now();
    loop {
        registry.process_all();
        let done = finished.load(Ordering::Relaxed) as usize;
        if done >= num_jobs {
            break;
        }
        if drain_start.elapsed() > Duration::from_secs(60) {
            println!("Timeout! Only {}/{} finished", done, num_jobs);
            break;
        }
        print!("\rFinished: {}/{}", done, num_jobs);
        let _ = std::io::stdout().flush();
        std::thread::sleep(Duration::from_millis(20));
    }

    let total_time = start.elapsed();

    // One sampling job per worker: the worker phase reads its own thread's
    // CPU clock, the finish phase carries the value back to this thread
    let cpu_samples: Arc<Mutex<Vec<(String, Duration)>>> = Arc::new(Mutex::new(Vec::new()));
    for handle in &handles {
        let cpu_samples = cpu_samples.clone();
        handle.enqueue(FnJob::new(
            |_interp: &mut ScratchInterpreter, ctx: &dyn JobContext<ScratchInterpreter>| {
                (ctx.name().to_string(), thread_cpu_time())
            },
            move |sample, _ctx: &dyn JobContext<ScratchInterpreter>| {
                cpu_samples.lock().unwrap().push(sample);
            },
        ));
    }
    let sample_start = Instant::now();
    while cpu_samples.lock().unwrap().len() < num_workers
        && sample_start.elapsed() < Duration::from_secs(5)
    {
        registry.process_all();
        std::thread::sleep(Duration::from_millis(10));
    }

    println!("\n\n=== Results ===");
    println!("Jobs:          {}", num_jobs);
    println!("Worker phases: {}", started.load(Ordering::Relaxed));
    println!("Finish phases: {}", finished.load(Ordering::Relaxed));
    println!("Total time:    {:?}", total_time);
    println!(
        "Throughput:    {:.0} jobs/sec",
        num_jobs as f64 / total_time.as_secs_f64()
    );
    for (name, cpu) in cpu_samples.lock().unwrap().iter() {
        println!("CPU {}:  {:?}", name, cpu);
    }

    registry.terminate();
    println!("\n=== Stress Complete ===");
}
