//! Interactive calculator on a vmpool worker
//!
//! A REPL where every line is shipped to a single worker as a job,
//! evaluated there, and echoed back through the finish phase. Variables
//! persist between lines because the worker keeps its interpreter.
//! Parse errors come back as compile reports with line and column.
//!
//! ```text
//! calc> x = 5
//! = 5
//! calc> print x * 8
//! 40
//! = 40
//! calc> x +
//! compile error: unexpected end of line in repl line 1 column 4
//! ```

use std::io::{self, BufRead, Write};
use std::time::{Duration, Instant};

use vmpool::{
    CompileReport, Diagnostics, FnJob, JobContext, PoolConfig, Registry, ScratchInterpreter,
};

/// Prints interpreter output and reports straight to the console
struct ConsoleDiagnostics;

impl Diagnostics for ConsoleDiagnostics {
    fn output(&self, _worker: &str, text: &str) {
        println!("{}", text);
    }

    fn error(&self, _worker: &str, text: &str) {
        println!("error: {}", text);
    }

    fn compile_error(&self, _worker: &str, report: &CompileReport) {
        println!("compile error: {}", report);
    }
}

fn main() {
    println!("vmpool calc - one worker, one interpreter. Ctrl-D or 'quit' to exit.");

    let mut registry: Registry<ScratchInterpreter> = Registry::with_diagnostics(
        PoolConfig::default(),
        std::sync::Arc::new(ConsoleDiagnostics),
    )
    .expect("registry");
    let repl = registry.create(256, "repl").expect("create worker");

    let stdin = io::stdin();
    loop {
        print!("calc> ");
        io::stdout().flush().expect("flush prompt");

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break, // EOF
            Ok(_) => {}
            Err(e) => {
                println!("read error: {}", e);
                break;
            }
        }
        let line = line.trim();
        if line == "quit" || line == "exit" {
            break;
        }
        if line.is_empty() {
            continue;
        }

        let script = line.to_string();
        repl.enqueue(FnJob::new(
            move |interp: &mut ScratchInterpreter, _ctx: &dyn JobContext<ScratchInterpreter>| {
                interp.eval(&script)
            },
            |result, _ctx: &dyn JobContext<ScratchInterpreter>| {
                // Errors were already reported through the sink
                if let Ok(Some(value)) = result {
                    println!("= {}", value);
                }
            },
        ));

        // One line in flight at a time; wait for it and run the finish phase
        let start = Instant::now();
        while registry.process(1) == 0 {
            if start.elapsed() > Duration::from_secs(5) {
                println!("worker did not answer in time");
                break;
            }
            std::thread::sleep(Duration::from_millis(2));
        }
    }

    println!("bye");
    registry.terminate();
}
