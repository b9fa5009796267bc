/*!
 * Monitoring Module
 * Audit trail and structured logging
 */

pub mod collector;
pub mod events;
pub mod sink;
pub mod tracer;

// Re-export for convenience
pub use collector::Auditor;
pub use events::{AuditEvent, AuditKind, Severity};
pub use sink::{AuditSink, FanoutSink, FileSink, MemorySink, TracingSink};
pub use tracer::init_tracing;
