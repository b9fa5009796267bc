/*!
 * Audit Events
 * Structured record of every transition, admission decision and run verdict
 */

use crate::core::types::Pid;
use serde::{Deserialize, Serialize};
use std::fmt;
use time::macros::format_description;
use time::OffsetDateTime;

/// Event severity for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Severity {
    Debug = 0,
    Info = 1,
    Warn = 2,
}

/// What happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditKind {
    SystemStarted,
    ProcessCreated,
    CreationRejected,
    Admitted,
    AdmissionFailed,
    StateChanged,
    TransitionRejected,
    Contention,
    Deposited,
    Withdrew,
    MemoryReleased,
    Unblocked,
    ProcessRemoved,
    TerminatedPurged,
    RunStarted,
    RunFinished,
    Stalled,
    Deadlock,
    ConfigChanged,
}

impl AuditKind {
    pub const fn severity(self) -> Severity {
        match self {
            AuditKind::CreationRejected
            | AuditKind::TransitionRejected
            | AuditKind::Contention
            | AuditKind::Stalled
            | AuditKind::Deadlock => Severity::Warn,
            AuditKind::Deposited | AuditKind::Withdrew | AuditKind::MemoryReleased => {
                Severity::Debug
            }
            _ => Severity::Info,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            AuditKind::SystemStarted => "system_started",
            AuditKind::ProcessCreated => "process_created",
            AuditKind::CreationRejected => "creation_rejected",
            AuditKind::Admitted => "admitted",
            AuditKind::AdmissionFailed => "admission_failed",
            AuditKind::StateChanged => "state_changed",
            AuditKind::TransitionRejected => "transition_rejected",
            AuditKind::Contention => "contention",
            AuditKind::Deposited => "deposited",
            AuditKind::Withdrew => "withdrew",
            AuditKind::MemoryReleased => "memory_released",
            AuditKind::Unblocked => "unblocked",
            AuditKind::ProcessRemoved => "process_removed",
            AuditKind::TerminatedPurged => "terminated_purged",
            AuditKind::RunStarted => "run_started",
            AuditKind::RunFinished => "run_finished",
            AuditKind::Stalled => "stalled",
            AuditKind::Deadlock => "deadlock",
            AuditKind::ConfigChanged => "config_changed",
        }
    }
}

impl fmt::Display for AuditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One audit trail entry
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// Process the event is about, `None` for system-wide events
    pub subject: Option<Pid>,
    pub event: AuditKind,
    pub detail: String,
}

impl AuditEvent {
    #[inline]
    pub fn new(subject: Option<Pid>, event: AuditKind, detail: impl Into<String>) -> Self {
        Self {
            timestamp: OffsetDateTime::now_utc(),
            subject,
            event,
            detail: detail.into(),
        }
    }

    #[inline]
    pub fn severity(&self) -> Severity {
        self.event.severity()
    }

    /// `[YYYY-MM-DD HH:MM:SS] <subject> <event>: <detail>`
    pub fn to_line(&self) -> String {
        let stamp = self
            .timestamp
            .format(format_description!(
                "[year]-[month]-[day] [hour]:[minute]:[second]"
            ))
            .unwrap_or_default();
        let subject = self.subject.as_ref().map_or("-", Pid::as_str);
        format!("[{}] {} {}: {}", stamp, subject, self.event, self.detail)
    }
}

impl fmt::Display for AuditEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_line())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_format() {
        let event = AuditEvent::new(
            Some(Pid::from("ab12cd34")),
            AuditKind::StateChanged,
            "ready -> running",
        );
        let line = event.to_line();
        assert!(line.starts_with('['));
        assert!(line.ends_with("ab12cd34 state_changed: ready -> running"));
    }

    #[test]
    fn test_system_event_has_dash_subject() {
        let event = AuditEvent::new(None, AuditKind::RunStarted, "policy=fifo");
        assert!(event.to_line().contains("] - run_started: policy=fifo"));
    }

    #[test]
    fn test_severity() {
        assert_eq!(AuditKind::Deadlock.severity(), Severity::Warn);
        assert_eq!(AuditKind::Deposited.severity(), Severity::Debug);
        assert_eq!(AuditKind::ProcessCreated.severity(), Severity::Info);
    }

    #[test]
    fn test_serializes_to_json() {
        let event = AuditEvent::new(None, AuditKind::SystemStarted, "boot");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "system_started");
        assert!(json["subject"].is_null());
        assert!(json["timestamp"].is_string());
    }
}
