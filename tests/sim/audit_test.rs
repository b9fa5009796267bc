/*!
 * Audit and Configuration Tests
 * File sink output and config-driven construction
 */

use pretty_assertions::assert_eq;
use process_sim::monitoring::{FanoutSink, Severity, TracingSink};
use process_sim::{
    AuditKind, FileSink, MemorySink, ProcessKind, ProcessSpec, SchedulingPolicy, SimConfig,
    Simulator,
};
use std::io::Write;
use std::sync::Arc;

#[test]
fn test_file_sink_writes_log_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("system_log.txt");

    let mut sim = Simulator::builder()
        .with_seed(5)
        .with_audit_file(&path)
        .build()
        .unwrap();
    let pid = sim.create_process(ProcessKind::Normal, 4).unwrap();
    sim.run_scheduler().unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert!(lines.len() >= 4);
    assert!(lines[0].starts_with('['));
    assert!(lines[0].contains("] - system_started: "));
    let created = format!("] {} process_created: ", pid);
    assert!(lines.iter().any(|line| line.contains(&created)));
    assert!(lines.iter().any(|line| line.contains("run_finished")));
}

#[test]
fn test_file_sink_appends_across_simulators() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("audit.log");

    for _ in 0..2 {
        Simulator::builder().with_audit_file(&path).build().unwrap();
    }
    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), 2);
}

#[test]
fn test_fanout_reaches_every_sink() {
    let a = Arc::new(MemorySink::new());
    let b = Arc::new(MemorySink::new());
    let fanout = FanoutSink::new()
        .with(a.clone())
        .with(b.clone())
        .with(Arc::new(TracingSink));

    let mut sim = Simulator::builder()
        .with_audit_sink(Arc::new(fanout))
        .build()
        .unwrap();
    sim.spawn(ProcessSpec::normal(1, 1, 10.0)).unwrap();

    assert_eq!(a.len(), 2);
    assert_eq!(b.len(), 2);
    assert_eq!(a.events()[1].event, AuditKind::ProcessCreated);
}

#[test]
fn test_warn_severity_for_verdicts() {
    let mut sim = Simulator::builder()
        .with_memory_capacity(100.0)
        .with_memory_sink()
        .build()
        .unwrap();
    sim.spawn(ProcessSpec::normal(1, 2, 500.0)).unwrap();
    sim.run_scheduler().unwrap();

    let deadlock = sim
        .audit_events()
        .into_iter()
        .find(|e| e.event == AuditKind::Deadlock)
        .unwrap();
    assert_eq!(deadlock.severity(), Severity::Warn);
    assert!(deadlock.subject.is_none());
}

#[test]
fn test_simulator_from_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "policy": "rr",
            "time_quantum": 4,
            "memory_capacity": 256,
            "buffer_capacity": 64,
            "seed": 17
        }}"#
    )
    .unwrap();

    let config = SimConfig::from_json_file(file.path()).unwrap();
    let sim = Simulator::new(config).unwrap();
    assert_eq!(sim.policy(), SchedulingPolicy::RoundRobin);
    assert_eq!(sim.quantum().units(), 4);
    assert_eq!(sim.memory_stats().capacity, 256.0);
    assert_eq!(sim.buffer_stats().capacity, 64.0);
}

#[test]
fn test_invalid_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"memory_capacity": 0}}"#).unwrap();
    let err = SimConfig::from_json_file(file.path()).unwrap_err();
    assert_eq!(err.category(), process_sim::ErrorCategory::Validation);
}
