/*!
 * Round-Robin Tests
 * Quantum slicing, per-slice memory and priority order
 */

use pretty_assertions::assert_eq;
use process_sim::core::types::approx_eq;
use process_sim::{ProcessSpec, ProcessState, RunOutcome, SchedulingPolicy, Simulator};

fn round_robin(quantum: u32, max_cycles: u64) -> Simulator {
    Simulator::builder()
        .with_seed(3)
        .with_policy(SchedulingPolicy::RoundRobin)
        .with_quantum(quantum)
        .with_max_cycles(max_cycles)
        .build()
        .unwrap()
}

#[test]
fn test_quantum_sequence_five_three_one_zero() {
    // One cycle per run so each quantum can be observed
    let mut sim = round_robin(2, 1);
    let pid = sim.spawn(ProcessSpec::normal(1, 5, 100.0)).unwrap();

    let mut remaining = Vec::new();
    for _ in 0..3 {
        let report = sim.run_scheduler().unwrap();
        assert_eq!(report.dispatches, 1);
        remaining.push(sim.get(&pid).unwrap().remaining_time());
    }

    assert_eq!(remaining, vec![3, 1, 0]);
    assert_eq!(sim.get(&pid).unwrap().state(), ProcessState::Terminated);
}

#[test]
fn test_slices_sum_to_memory_demand() {
    let mut sim = round_robin(2, 100);
    let pid = sim.spawn(ProcessSpec::normal(1, 7, 210.0)).unwrap();

    let report = sim.run_scheduler().unwrap();
    assert!(report.outcome.is_completed());
    assert_eq!(report.dispatches, 4);

    let record = sim.get(&pid).unwrap();
    assert_eq!(record.remaining_time(), 0);
    assert!(approx_eq(record.consumed(), 210.0));
    // Nothing held between quanta
    assert_eq!(sim.memory_stats().used, 0.0);
}

#[test]
fn test_slice_larger_than_pool_blocks() {
    let mut sim = Simulator::builder()
        .with_policy(SchedulingPolicy::RoundRobin)
        .with_quantum(2)
        .with_memory_capacity(100.0)
        .build()
        .unwrap();
    // 2 of 4 units of a 400 demand is 200 per slice
    let pid = sim.spawn(ProcessSpec::normal(1, 4, 400.0)).unwrap();

    let report = sim.run_scheduler().unwrap();
    assert_eq!(report.outcome, RunOutcome::Deadlocked { blocked: vec![pid] });
}

#[test]
fn test_priority_then_arrival_order() {
    let mut sim = round_robin(10, 100);
    let low = sim.spawn(ProcessSpec::normal(7, 2, 10.0)).unwrap();
    let high_a = sim.spawn(ProcessSpec::normal(2, 2, 10.0)).unwrap();
    let high_b = sim.spawn(ProcessSpec::normal(2, 2, 10.0)).unwrap();

    let report = sim.run_scheduler().unwrap();
    assert_eq!(report.completed, vec![high_a, high_b, low]);
}

#[test]
fn test_producer_feeds_blocked_consumer() {
    let mut sim = round_robin(1, 100);
    let consumer = sim.spawn(ProcessSpec::consumer(1, 3, 30.0)).unwrap();
    let producer = sim.spawn(ProcessSpec::producer(5, 3, 30.0)).unwrap();

    let report = sim.run_scheduler().unwrap();
    assert!(report.outcome.is_completed());
    assert_eq!(sim.get(&consumer).unwrap().state(), ProcessState::Terminated);
    assert_eq!(sim.get(&producer).unwrap().state(), ProcessState::Terminated);
    assert!(approx_eq(sim.buffer_stats().occupied, 0.0));
}

#[test]
fn test_cycle_limit_reported() {
    let mut sim = round_robin(1, 3);
    sim.spawn(ProcessSpec::normal(1, 10, 10.0)).unwrap();

    let report = sim.run_scheduler().unwrap();
    assert_eq!(report.outcome, RunOutcome::CycleLimit { cycles: 3 });
    assert!(report.into_result().is_err());
}
