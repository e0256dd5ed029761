//! Error types for the worker pool

use core::fmt;

/// Result type for pool operations
pub type PoolResult<T> = Result<T, PoolError>;

/// Errors that can occur in pool operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// Worker name was empty
    InvalidName,

    /// Requested interpreter stack size was zero
    InvalidStackSize,

    /// A worker with this name already exists
    DuplicateName(String),

    /// Named worker does not exist
    WorkerNotFound(String),

    /// Worker was already started
    AlreadyRunning,

    /// Failed to spawn the worker's OS thread
    Spawn(String),

    /// Invalid pool configuration
    Config(&'static str),

    /// Interpreter error
    Interpreter(InterpreterError),
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolError::InvalidName => write!(f, "invalid or empty worker name"),
            PoolError::InvalidStackSize => write!(f, "interpreter stack size must be non-zero"),
            PoolError::DuplicateName(name) => write!(f, "worker already exists: {}", name),
            PoolError::WorkerNotFound(name) => write!(f, "worker not found: {}", name),
            PoolError::AlreadyRunning => write!(f, "worker was already started"),
            PoolError::Spawn(reason) => write!(f, "failed to spawn worker thread: {}", reason),
            PoolError::Config(msg) => write!(f, "invalid config: {}", msg),
            PoolError::Interpreter(e) => write!(f, "interpreter error: {}", e),
        }
    }
}

impl std::error::Error for PoolError {}

/// Error raised by an embedded interpreter (open or evaluation failure)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpreterError {
    /// Engine-supplied description
    pub message: String,
}

impl InterpreterError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl fmt::Display for InterpreterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for InterpreterError {}

impl From<InterpreterError> for PoolError {
    fn from(e: InterpreterError) -> Self {
        PoolError::Interpreter(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = PoolError::InvalidName;
        assert_eq!(format!("{}", e), "invalid or empty worker name");

        let e = PoolError::DuplicateName("combat".to_string());
        assert_eq!(format!("{}", e), "worker already exists: combat");

        let e = PoolError::Interpreter(InterpreterError::new("stack exhausted"));
        assert_eq!(format!("{}", e), "interpreter error: stack exhausted");
    }

    #[test]
    fn test_error_conversion() {
        let interp_err = InterpreterError::new("open failed");
        let pool_err: PoolError = interp_err.into();
        assert!(matches!(pool_err, PoolError::Interpreter(_)));
    }
}
