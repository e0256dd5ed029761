//! Basic vmpool example
//!
//! Two named workers, each with a private calculator interpreter, fed
//! from the main thread and from a producer thread. Results ride the
//! jobs back and are applied in finish phases on the main thread.
//!
//! # Environment Variables
//!
//! - `VMP_FLUSH_LOG=1` - Flush debug output immediately
//! - `VMP_LOG_LEVEL=debug` - Set log level (off, error, warn, info, debug, trace)

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use vmpool::vinfo;
use vmpool::{FnJob, JobContext, PoolConfig, Registry, ScratchInterpreter};

// VMP_LOG_LEVEL=debug VMP_FLUSH_LOG=1 cargo run -p vmpool-basic
fn main() {
    println!("=== vmpool Basic Example ===\n");

    let config = PoolConfig::default().debug_logging(true);
    let mut registry: Registry<ScratchInterpreter> = Registry::new(config).expect("registry");

    let combat = registry.create(64, "combat").expect("create combat");
    let market = registry.create(64, "market").expect("create market");
    println!("Workers: {:?}", registry.names());

    // Counter bumped by finish phases, i.e. on this thread
    let completed = Arc::new(AtomicUsize::new(0));

    vinfo!("Enqueuing scripts...");
    for (handle, script) in [
        (&combat, "base = 12\nprint base * 3"),
        (&market, "price = 100\nprice = price - 100/4\nprint price"),
    ] {
        let completed = completed.clone();
        let script = script.to_string();
        handle.enqueue(FnJob::new(
            move |interp: &mut ScratchInterpreter, _ctx: &dyn JobContext<ScratchInterpreter>| {
                interp.eval(&script)
            },
            move |result, ctx: &dyn JobContext<ScratchInterpreter>| {
                match result {
                    Ok(last) => println!("[{}] last value: {:?}", ctx.name(), last),
                    Err(e) => println!("[{}] script failed: {}", ctx.name(), e),
                }
                completed.fetch_add(1, Ordering::SeqCst);
            },
        ));
    }

    // Producer threads enqueue through cheap handle clones
    let producer_handle = combat.clone();
    let producer_done = completed.clone();
    let producer = std::thread::spawn(move || {
        for i in 1..=3 {
            let done = producer_done.clone();
            let script = format!("print {} * 10", i);
            producer_handle.enqueue(FnJob::new(
                move |interp: &mut ScratchInterpreter, _ctx: &dyn JobContext<ScratchInterpreter>| {
                    interp.eval(&script)
                },
                move |_result, _ctx: &dyn JobContext<ScratchInterpreter>| {
                    done.fetch_add(1, Ordering::SeqCst);
                },
            ));
        }
    });
    producer.join().expect("producer thread");

    // Drain finished jobs on this thread until everything came back
    let expected = 5;
    println!("\nWaiting for {} jobs...\n", expected);
    let start = Instant::now();
    while completed.load(Ordering::SeqCst) < expected {
        registry.process(16);
        if start.elapsed() > Duration::from_secs(10) {
            println!("WARNING: Timeout!");
            break;
        }
        std::thread::sleep(Duration::from_millis(10));
    }

    vinfo!("{} job(s) completed", completed.load(Ordering::SeqCst));
    registry.terminate();
    println!("\n=== Example Complete ===");
}
