/*!
 * Scenario Tests
 * End-to-end admission, buffer and deadlock scenarios
 */

use pretty_assertions::assert_eq;
use process_sim::{
    AuditKind, ProcessSpec, ProcessState, RunOutcome, SchedulingPolicy, SimError, Simulator,
};

fn simulator(memory: f64, buffer: f64) -> Simulator {
    Simulator::builder()
        .with_seed(11)
        .with_memory_capacity(memory)
        .with_buffer_capacity(buffer)
        .with_memory_sink()
        .build()
        .unwrap()
}

#[test]
fn test_oversized_normal_blocks_and_deadlocks() {
    let mut sim = simulator(1024.0, 500.0);
    let pid = sim.spawn(ProcessSpec::normal(1, 5, 2000.0)).unwrap();

    let report = sim.run_scheduler().unwrap();

    assert_eq!(sim.get(&pid).unwrap().state(), ProcessState::Blocked);
    assert!(sim.is_deadlocked());
    assert_eq!(report.outcome, RunOutcome::Deadlocked { blocked: vec![pid.clone()] });
    assert_eq!(report.blocked, vec![pid.clone()]);
    assert_eq!(sim.memory_stats().used, 0.0);

    let events = sim.audit_events();
    assert!(events
        .iter()
        .any(|e| e.event == AuditKind::AdmissionFailed && e.subject.as_ref() == Some(&pid)));
    assert!(events.iter().any(|e| e.event == AuditKind::Deadlock));

    assert!(matches!(
        report.into_result(),
        Err(SimError::Deadlocked { blocked }) if blocked == vec![pid.clone()]
    ));
}

#[test]
fn test_producer_then_consumer_both_terminate() {
    let mut sim = simulator(1024.0, 100.0);
    let producer = sim.spawn(ProcessSpec::producer(1, 3, 60.0)).unwrap();
    let consumer = sim.spawn(ProcessSpec::consumer(1, 3, 60.0)).unwrap();

    let report = sim.run_scheduler().unwrap();

    assert!(report.outcome.is_completed());
    assert_eq!(report.completed, vec![producer.clone(), consumer.clone()]);
    assert_eq!(sim.get(&producer).unwrap().state(), ProcessState::Terminated);
    assert_eq!(sim.get(&consumer).unwrap().state(), ProcessState::Terminated);
    assert_eq!(sim.buffer_stats().occupied, 0.0);

    let deposit = sim
        .audit_events()
        .into_iter()
        .find(|e| e.event == AuditKind::Deposited)
        .unwrap();
    assert_eq!(deposit.subject, Some(producer));
    assert!(deposit.detail.contains("occupied=60.00"));
}

#[test]
fn test_buffer_mismatch_deadlocks() {
    let mut sim = simulator(1024.0, 50.0);
    let consumer = sim.spawn(ProcessSpec::consumer(1, 2, 60.0)).unwrap();
    let producer = sim.spawn(ProcessSpec::producer(1, 2, 60.0)).unwrap();

    let report = sim.run_scheduler().unwrap();

    assert_eq!(sim.get(&consumer).unwrap().state(), ProcessState::Blocked);
    assert_eq!(sim.get(&producer).unwrap().state(), ProcessState::Blocked);
    assert!(sim.is_deadlocked());
    assert_eq!(
        report.outcome,
        RunOutcome::Deadlocked {
            blocked: vec![consumer, producer]
        }
    );
}

#[test]
fn test_removing_one_record_leaves_the_other() {
    let mut sim = simulator(1024.0, 100.0);
    let doomed = sim.spawn(ProcessSpec::normal(1, 4, 300.0)).unwrap();
    let survivor = sim.spawn(ProcessSpec::normal(2, 4, 200.0)).unwrap();

    assert_eq!(sim.admit_ready(), 2);
    sim.set_state(&doomed, ProcessState::Running).unwrap();
    assert_eq!(sim.memory_stats().used, 500.0);

    let removed = sim.remove(&doomed).unwrap();
    assert_eq!(removed.id(), &doomed);
    assert_eq!(sim.memory_stats().used, 200.0);
    assert!(sim.context().registry.running().is_none());

    let report = sim.run_scheduler().unwrap();
    assert!(report.outcome.is_completed());
    assert_eq!(report.completed, vec![survivor.clone()]);
    assert_eq!(sim.memory_stats().used, 0.0);

    let releases = sim
        .audit_events()
        .into_iter()
        .filter(|e| e.event == AuditKind::MemoryReleased && e.subject.as_ref() == Some(&doomed))
        .count();
    assert_eq!(releases, 1);
}

#[test]
fn test_fifo_holds_memory_until_termination() {
    let mut sim = simulator(500.0, 100.0);
    let first = sim.spawn(ProcessSpec::normal(1, 3, 400.0)).unwrap();
    let second = sim.spawn(ProcessSpec::normal(1, 3, 300.0)).unwrap();

    assert_eq!(sim.admit_ready(), 1);
    sim.set_state(&second, ProcessState::Blocked).unwrap();
    assert!(!sim.get(&second).unwrap().in_memory());

    let report = sim.run_scheduler().unwrap();

    // Second only fits once the first has terminated and released
    assert!(report.outcome.is_completed());
    assert_eq!(report.completed, vec![first, second.clone()]);
    assert!(sim
        .audit_events()
        .iter()
        .any(|e| e.event == AuditKind::Unblocked && e.subject.as_ref() == Some(&second)));
    assert_eq!(sim.memory_stats().used, 0.0);
}

#[test]
fn test_policy_switch_between_runs() {
    let mut sim = simulator(1024.0, 100.0);
    let pid = sim.spawn(ProcessSpec::normal(1, 6, 120.0)).unwrap();
    sim.set_policy(SchedulingPolicy::RoundRobin).unwrap();
    sim.set_quantum(3).unwrap();

    let report = sim.run_scheduler().unwrap();
    assert_eq!(report.policy, SchedulingPolicy::RoundRobin);
    assert_eq!(report.dispatches, 2);
    assert_eq!(sim.get(&pid).unwrap().state(), ProcessState::Terminated);
}

#[test]
fn test_run_on_empty_table_completes() {
    let mut sim = simulator(1024.0, 100.0);
    let report = sim.run_scheduler().unwrap();
    assert!(report.outcome.is_completed());
    assert_eq!(report.dispatches, 0);
}
