/*!
 * Error Types
 * Centralized error handling with thiserror and miette
 */

use super::types::{Pid, Priority, TimeUnits, Units};
use crate::process::ProcessState;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Simulator operation result
pub type SimResult<T> = Result<T, SimError>;

/// Error taxonomy
///
/// Admission failures are not errors: they surface as Blocked transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Rejected input, no state change
    Validation,
    /// Unknown process id, no state change
    NotFound,
    /// Scheduling run ended without finishing every process
    Stall,
    /// Audit trail or configuration file I/O
    Io,
}

/// Simulator errors
#[derive(Error, Debug, Clone, PartialEq, Diagnostic)]
pub enum SimError {
    #[error("Invalid priority {0}: must be between 1 and 10")]
    #[diagnostic(
        code(process::invalid_priority),
        help("Lower values are more important. Use a priority in 1..=10.")
    )]
    InvalidPriority(Priority),

    #[error("Invalid time quantum {0}: must be greater than zero")]
    #[diagnostic(
        code(scheduler::invalid_quantum),
        help("Round-Robin needs a positive quantum.")
    )]
    InvalidQuantum(TimeUnits),

    #[error("Invalid {resource} capacity {value}: must be greater than zero")]
    #[diagnostic(code(config::invalid_capacity))]
    InvalidCapacity { resource: &'static str, value: Units },

    #[error("Invalid burst time for new process: must be greater than zero")]
    #[diagnostic(code(process::invalid_burst))]
    InvalidBurstTime,

    #[error("Invalid memory demand {0}: must be a finite, non-negative amount")]
    #[diagnostic(code(process::invalid_demand))]
    InvalidDemand(Units),

    #[error("Invalid state transition for {pid}: {from:?} -> {to:?}")]
    #[diagnostic(
        code(process::invalid_transition),
        help("Terminated is absorbing; other moves must follow the process state machine.")
    )]
    InvalidTransition {
        pid: Pid,
        from: ProcessState,
        to: ProcessState,
    },

    #[error("Invalid configuration: {0}")]
    #[diagnostic(
        code(config::invalid),
        help("Review configuration parameters and environment overrides.")
    )]
    InvalidConfig(String),

    #[error("Process {0} not found")]
    #[diagnostic(
        code(process::not_found),
        help("The process may have been deleted or never existed. Check the PID.")
    )]
    NotFound(Pid),

    #[error("Scheduling run stalled after {idle_cycles} idle cycles with {blocked} blocked process(es)")]
    #[diagnostic(
        code(scheduler::stalled),
        help("Terminate or delete a stuck process, or free resources, then run again.")
    )]
    Stalled { idle_cycles: u32, blocked: usize },

    #[error("Deadlock: {} blocked process(es) cannot be satisfied", .blocked.len())]
    #[diagnostic(
        code(scheduler::deadlock),
        help("No blocked process can obtain its resource. External intervention is required.")
    )]
    Deadlocked { blocked: Vec<Pid> },

    #[error("I/O error: {0}")]
    #[diagnostic(
        code(sim::io_error),
        help("Check file permissions and paths.")
    )]
    Io(String),
}

impl SimError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SimError::InvalidPriority(_)
            | SimError::InvalidQuantum(_)
            | SimError::InvalidCapacity { .. }
            | SimError::InvalidBurstTime
            | SimError::InvalidDemand(_)
            | SimError::InvalidTransition { .. }
            | SimError::InvalidConfig(_) => ErrorCategory::Validation,
            SimError::NotFound(_) => ErrorCategory::NotFound,
            SimError::Stalled { .. } | SimError::Deadlocked { .. } => ErrorCategory::Stall,
            SimError::Io(_) => ErrorCategory::Io,
        }
    }
}

impl From<std::io::Error> for SimError {
    fn from(err: std::io::Error) -> Self {
        SimError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for SimError {
    fn from(err: serde_json::Error) -> Self {
        SimError::InvalidConfig(err.to_string())
    }
}
