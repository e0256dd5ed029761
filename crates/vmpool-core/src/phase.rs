//! Worker lifecycle phases

use core::fmt;

/// Lifecycle phase of a worker
///
/// Stored in an atomic u8 on the worker so any thread can observe where a
/// worker is in its lifecycle without taking the lifecycle mutex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WorkerPhase {
    /// Constructed, thread not yet through initialization
    Uninitialized = 0,

    /// Worker thread is opening its private interpreter
    Initializing = 1,

    /// Pull-execute-push loop is live
    Running = 2,

    /// Stop observed, loop exited, interpreter being torn down
    Draining = 3,

    /// Interpreter dropped, thread exiting or exited
    Terminated = 4,
}

impl WorkerPhase {
    /// Check if the worker's loop is accepting and executing jobs
    #[inline]
    pub const fn is_running(&self) -> bool {
        matches!(self, WorkerPhase::Running)
    }

    /// Check if the worker has a live thread (anywhere between init and teardown)
    #[inline]
    pub const fn is_live(&self) -> bool {
        matches!(
            self,
            WorkerPhase::Initializing | WorkerPhase::Running | WorkerPhase::Draining
        )
    }

    /// Check if the worker has fully shut down
    #[inline]
    pub const fn is_terminated(&self) -> bool {
        matches!(self, WorkerPhase::Terminated)
    }
}

impl From<u8> for WorkerPhase {
    fn from(v: u8) -> Self {
        match v {
            0 => WorkerPhase::Uninitialized,
            1 => WorkerPhase::Initializing,
            2 => WorkerPhase::Running,
            3 => WorkerPhase::Draining,
            4 => WorkerPhase::Terminated,
            _ => WorkerPhase::Terminated, // Default for invalid values
        }
    }
}

impl From<WorkerPhase> for u8 {
    fn from(phase: WorkerPhase) -> u8 {
        phase as u8
    }
}

impl fmt::Display for WorkerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerPhase::Uninitialized => write!(f, "uninitialized"),
            WorkerPhase::Initializing => write!(f, "initializing"),
            WorkerPhase::Running => write!(f, "running"),
            WorkerPhase::Draining => write!(f, "draining"),
            WorkerPhase::Terminated => write!(f, "terminated"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_predicates() {
        assert!(WorkerPhase::Running.is_running());
        assert!(!WorkerPhase::Initializing.is_running());

        assert!(WorkerPhase::Initializing.is_live());
        assert!(WorkerPhase::Running.is_live());
        assert!(WorkerPhase::Draining.is_live());
        assert!(!WorkerPhase::Uninitialized.is_live());
        assert!(!WorkerPhase::Terminated.is_live());

        assert!(WorkerPhase::Terminated.is_terminated());
        assert!(!WorkerPhase::Draining.is_terminated());
    }

    #[test]
    fn test_phase_u8_roundtrip() {
        for phase in [
            WorkerPhase::Uninitialized,
            WorkerPhase::Initializing,
            WorkerPhase::Running,
            WorkerPhase::Draining,
            WorkerPhase::Terminated,
        ] {
            let raw: u8 = phase.into();
            assert_eq!(WorkerPhase::from(raw), phase);
        }
        // Out-of-range values decay to Terminated
        assert_eq!(WorkerPhase::from(99), WorkerPhase::Terminated);
    }
}
