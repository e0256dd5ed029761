//! Interpreter abstraction
//!
//! Each worker owns exactly one interpreter instance, opened on the worker
//! thread after spawn and dropped on the worker thread at shutdown. The
//! pool never moves or shares an interpreter; jobs reach it only through
//! their worker-phase `&mut` argument.
//!
//! # Implementations
//! - `ScratchInterpreter` - line-calculator engine (MVP)

use vmpool_core::diag::DiagnosticSink;
use vmpool_core::error::InterpreterError;

/// Per-worker parameters handed to [`Interpreter::open`]
#[derive(Debug, Clone)]
pub struct InterpreterSpec {
    /// Name of the owning worker
    pub name: String,

    /// Requested interpreter stack size, fixed at worker creation
    pub stack_size: usize,
}

/// Trait for embeddable interpreter engines
///
/// `open` runs on the worker thread; the returned instance stays confined
/// to that thread for its whole life and is dropped there when the worker
/// stops. Implementations install the diagnostics sink as their output,
/// error and compile-error channel.
///
/// No `Send` or `Sync` is required: the type system never lets an
/// interpreter cross a thread boundary.
pub trait Interpreter: Sized {
    /// Open a fresh private instance for one worker
    ///
    /// A failure here is fatal to the worker's thread; it is reported
    /// through the sink and the worker terminates without serving jobs.
    fn open(spec: &InterpreterSpec, diag: DiagnosticSink) -> Result<Self, InterpreterError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use vmpool_core::diag::CaptureDiagnostics;

    struct RecordingInterp {
        label: String,
        stack: usize,
    }

    impl Interpreter for RecordingInterp {
        fn open(spec: &InterpreterSpec, diag: DiagnosticSink) -> Result<Self, InterpreterError> {
            diag.output(&spec.name, "open");
            Ok(Self {
                label: spec.name.clone(),
                stack: spec.stack_size,
            })
        }
    }

    #[test]
    fn test_open_receives_spec_and_sink() {
        let capture = Arc::new(CaptureDiagnostics::new());
        let spec = InterpreterSpec {
            name: "combat".to_string(),
            stack_size: 1024,
        };

        let interp = RecordingInterp::open(&spec, capture.clone()).unwrap();
        assert_eq!(interp.label, "combat");
        assert_eq!(interp.stack, 1024);
        assert_eq!(capture.outputs(), vec!["open"]);
    }
}
