/*!
 * Process Scheduler Simulator Library
 * FIFO and Round-Robin scheduling over a memory pool and a bounded buffer
 */

pub mod config;
pub mod core;
pub mod ipc;
pub mod memory;
pub mod monitoring;
pub mod process;
pub mod scheduler;
pub mod sim;

// Re-exports
pub use config::SimConfig;
pub use crate::core::{ErrorCategory, Pid, SimError, SimResult};
pub use ipc::{BufferStats, SharedBuffer};
pub use memory::{MemoryAllocator, MemoryStats};
pub use monitoring::{init_tracing, AuditEvent, AuditKind, AuditSink, FileSink, MemorySink};
pub use process::{ProcessKind, ProcessRecord, ProcessSpec, ProcessState, Transition};
pub use scheduler::{
    DeadlockDetector, ResourceUnblocker, RunOutcome, RunReport, Scheduler, SchedulingPolicy,
    TimeQuantum,
};
pub use sim::{Simulator, SimulatorBuilder, Snapshot};
