/*!
 * Audit Sinks
 * Destinations for the audit trail
 *
 * The core only writes to a sink; nothing reads the trail back during a run.
 */

use super::events::{AuditEvent, Severity};
use crate::core::SimResult;
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Audit trail destination
pub trait AuditSink: Send + Sync {
    fn record(&self, event: &AuditEvent);
}

/// In-memory sink for tests and log queries
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl AuditSink for MemorySink {
    fn record(&self, event: &AuditEvent) {
        self.events.lock().push(event.clone());
    }
}

/// Append-only text log, one line per event
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileSink {
    /// Open (or create) `path` for appending
    pub fn open(path: impl AsRef<Path>) -> SimResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        info!(path = %path.display(), "audit log opened");
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Truncate `path` and start a fresh log
    pub fn create(path: impl AsRef<Path>) -> SimResult<Self> {
        File::create(path.as_ref())?;
        Self::open(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AuditSink for FileSink {
    fn record(&self, event: &AuditEvent) {
        let mut file = self.file.lock();
        if let Err(e) = writeln!(file, "{}", event.to_line()) {
            warn!(path = %self.path.display(), error = %e, "audit log write failed");
        }
    }
}

/// Forwards every event to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl AuditSink for TracingSink {
    fn record(&self, event: &AuditEvent) {
        let subject = event.subject.as_ref().map_or("-", |p| p.as_str());
        match event.severity() {
            Severity::Warn => warn!(subject, event = %event.event, detail = %event.detail, "audit"),
            Severity::Info | Severity::Debug => {
                debug!(subject, event = %event.event, detail = %event.detail, "audit")
            }
        }
    }
}

/// Forwards to several sinks in order
#[derive(Default, Clone)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn AuditSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn push(&mut self, sink: Arc<dyn AuditSink>) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl AuditSink for FanoutSink {
    fn record(&self, event: &AuditEvent) {
        for sink in &self.sinks {
            sink.record(event);
        }
    }
}
