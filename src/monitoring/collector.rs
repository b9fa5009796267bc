/*!
 * Audit Collector
 * Stamps events and hands them to the configured sink
 */

use super::events::{AuditEvent, AuditKind};
use super::sink::AuditSink;
use crate::core::types::Pid;
use std::sync::Arc;

/// Emits audit events; a collector without a sink drops them
#[derive(Clone, Default)]
pub struct Auditor {
    sink: Option<Arc<dyn AuditSink>>,
}

impl Auditor {
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self { sink: Some(sink) }
    }

    /// Collector that discards everything
    pub fn disabled() -> Self {
        Self { sink: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    /// Event about one process
    #[inline]
    pub fn process(&self, pid: &Pid, event: AuditKind, detail: impl Into<String>) {
        if let Some(ref sink) = self.sink {
            sink.record(&AuditEvent::new(Some(pid.clone()), event, detail));
        }
    }

    /// System-wide event
    #[inline]
    pub fn system(&self, event: AuditKind, detail: impl Into<String>) {
        if let Some(ref sink) = self.sink {
            sink.record(&AuditEvent::new(None, event, detail));
        }
    }
}

impl std::fmt::Debug for Auditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Auditor")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
