//! Diagnostics forwarding from embedded interpreters
//!
//! Each worker's interpreter is opened with a sink for the three output
//! shapes an engine produces: informational text (its print channel),
//! error text (runtime failures), and structured compile-error reports.
//! The pool never interprets these, it only routes them.

use core::fmt;
use std::sync::{Arc, Mutex};

/// Structured compile-error report from an interpreter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileReport {
    /// Engine-supplied description of the failure
    pub message: String,

    /// Source label (script name, chunk name, or similar)
    pub source: String,

    /// 1-based line of the failure
    pub line: u32,

    /// 1-based column of the failure
    pub column: u32,
}

impl fmt::Display for CompileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} in {} line {} column {}",
            self.message, self.source, self.line, self.column
        )
    }
}

/// Receiver for interpreter diagnostics
///
/// Implementations must be callable from worker threads; the pool shares
/// one sink across all workers.
pub trait Diagnostics: Send + Sync {
    /// Informational text from the interpreter (print output)
    fn output(&self, worker: &str, text: &str);

    /// Error text from the interpreter (runtime failures)
    fn error(&self, worker: &str, text: &str);

    /// Structured compile-error report
    fn compile_error(&self, worker: &str, report: &CompileReport);
}

/// Shared handle to a diagnostics sink
pub type DiagnosticSink = Arc<dyn Diagnostics>;

/// Default sink: forwards into the vlog macros
///
/// Interpreter print output lands at info level, runtime and compile
/// errors at error level, each tagged with the worker name.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn output(&self, worker: &str, text: &str) {
        crate::vinfo!("[{}] {}", worker, text);
    }

    fn error(&self, worker: &str, text: &str) {
        crate::verror!("[{}] {}", worker, text);
    }

    fn compile_error(&self, worker: &str, report: &CompileReport) {
        crate::verror!("[{}] compile error: {}", worker, report);
    }
}

/// One recorded diagnostic event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagEvent {
    Output { worker: String, text: String },
    Error { worker: String, text: String },
    CompileError { worker: String, report: CompileReport },
}

/// Capturing sink: records every event for later inspection
///
/// Used by hosts that collect script output instead of logging it, and by
/// tests asserting on what an interpreter reported.
#[derive(Debug, Default)]
pub struct CaptureDiagnostics {
    events: Mutex<Vec<DiagEvent>>,
}

impl CaptureDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take all recorded events, leaving the capture empty
    pub fn take(&self) -> Vec<DiagEvent> {
        std::mem::take(&mut self.events.lock().unwrap())
    }

    /// Snapshot of just the informational output texts, in arrival order
    pub fn outputs(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|ev| match ev {
                DiagEvent::Output { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Snapshot of just the error texts, in arrival order
    pub fn errors(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|ev| match ev {
                DiagEvent::Error { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: DiagEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl Diagnostics for CaptureDiagnostics {
    fn output(&self, worker: &str, text: &str) {
        self.push(DiagEvent::Output {
            worker: worker.to_string(),
            text: text.to_string(),
        });
    }

    fn error(&self, worker: &str, text: &str) {
        self.push(DiagEvent::Error {
            worker: worker.to_string(),
            text: text.to_string(),
        });
    }

    fn compile_error(&self, worker: &str, report: &CompileReport) {
        self.push(DiagEvent::CompileError {
            worker: worker.to_string(),
            report: report.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_report_display() {
        let report = CompileReport {
            message: "expected ')'".to_string(),
            source: "combat.nut".to_string(),
            line: 12,
            column: 7,
        };
        assert_eq!(
            format!("{}", report),
            "expected ')' in combat.nut line 12 column 7"
        );
    }

    #[test]
    fn test_capture_records_in_order() {
        let capture = CaptureDiagnostics::new();
        capture.output("combat", "hello");
        capture.error("combat", "boom");
        capture.output("combat", "world");

        assert_eq!(capture.outputs(), vec!["hello", "world"]);
        assert_eq!(capture.errors(), vec!["boom"]);

        let events = capture.take();
        assert_eq!(events.len(), 3);
        assert!(capture.take().is_empty());
    }

    #[test]
    fn test_capture_compile_error() {
        let capture = CaptureDiagnostics::new();
        let report = CompileReport {
            message: "bad token".to_string(),
            source: "line".to_string(),
            line: 1,
            column: 3,
        };
        capture.compile_error("economy", &report);

        match &capture.take()[..] {
            [DiagEvent::CompileError { worker, report: r }] => {
                assert_eq!(worker, "economy");
                assert_eq!(r, &report);
            }
            other => panic!("unexpected events: {:?}", other),
        }
    }
}
