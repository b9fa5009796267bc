/*!
 * Invariant Tests
 * Property tests over random operation sequences
 */

use process_sim::core::types::{approx_eq, approx_le};
use process_sim::{ProcessKind, ProcessSpec, ProcessState, SchedulingPolicy, Simulator};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Spawn {
        kind: ProcessKind,
        priority: u8,
        burst: u32,
        demand: f64,
    },
    Run,
    Terminate(usize),
    Remove(usize),
    Start(usize),
    SwitchPolicy,
    RemoveTerminated,
}

fn kind_strategy() -> impl Strategy<Value = ProcessKind> {
    prop_oneof![
        Just(ProcessKind::Normal),
        Just(ProcessKind::Producer),
        Just(ProcessKind::Consumer),
    ]
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (kind_strategy(), 1u8..=10, 1u32..=15, 0.0f64..400.0).prop_map(
            |(kind, priority, burst, demand)| Op::Spawn {
                kind,
                priority,
                burst,
                demand,
            }
        ),
        3 => Just(Op::Run),
        1 => any::<usize>().prop_map(Op::Terminate),
        1 => any::<usize>().prop_map(Op::Remove),
        1 => any::<usize>().prop_map(Op::Start),
        1 => Just(Op::SwitchPolicy),
        1 => Just(Op::RemoveTerminated),
    ]
}

fn pick(sim: &Simulator, index: usize) -> Option<process_sim::Pid> {
    let ids: Vec<_> = sim.processes().map(|r| r.id().clone()).collect();
    if ids.is_empty() {
        None
    } else {
        Some(ids[index % ids.len()].clone())
    }
}

fn check_invariants(sim: &Simulator) -> Result<(), TestCaseError> {
    let memory = sim.memory_stats();
    let held: f64 = sim
        .processes()
        .filter(|r| r.in_memory())
        .map(|r| r.memory_demand())
        .sum();
    prop_assert!(approx_eq(memory.used, held), "used {} != held {}", memory.used, held);
    prop_assert!(approx_le(memory.used, memory.capacity));

    let buffer = sim.buffer_stats();
    prop_assert!(buffer.occupied >= 0.0);
    prop_assert!(approx_le(buffer.occupied, buffer.capacity));

    let running = sim
        .processes()
        .filter(|r| r.state() == ProcessState::Running)
        .count();
    prop_assert!(running <= 1);

    for record in sim.processes() {
        if record.is_terminated() {
            prop_assert!(!record.in_memory());
            prop_assert_eq!(record.remaining_time(), 0);
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_resource_invariants_hold(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let mut sim = Simulator::builder()
            .with_seed(99)
            .with_memory_capacity(1024.0)
            .with_buffer_capacity(300.0)
            .with_max_cycles(500)
            .build()
            .unwrap();

        for op in ops {
            match op {
                Op::Spawn { kind, priority, burst, demand } => {
                    sim.spawn(ProcessSpec::new(kind, priority, burst, demand)).unwrap();
                }
                Op::Run => {
                    sim.run_scheduler().unwrap();
                }
                Op::Terminate(i) => {
                    if let Some(pid) = pick(&sim, i) {
                        let _ = sim.terminate(&pid);
                    }
                }
                Op::Remove(i) => {
                    if let Some(pid) = pick(&sim, i) {
                        sim.remove(&pid).unwrap();
                    }
                }
                Op::Start(i) => {
                    if let Some(pid) = pick(&sim, i) {
                        let _ = sim.set_state(&pid, ProcessState::Running);
                    }
                }
                Op::SwitchPolicy => {
                    let next = match sim.policy() {
                        SchedulingPolicy::Fifo => SchedulingPolicy::RoundRobin,
                        SchedulingPolicy::RoundRobin => SchedulingPolicy::Fifo,
                    };
                    sim.set_policy(next).unwrap();
                }
                Op::RemoveTerminated => {
                    sim.remove_terminated();
                }
            }
            check_invariants(&sim)?;
        }
    }

    #[test]
    fn prop_round_robin_completes_normal_exactly(burst in 1u32..=15, demand in 1.0f64..256.0, quantum in 1u32..=5) {
        let mut sim = Simulator::builder()
            .with_policy(SchedulingPolicy::RoundRobin)
            .with_quantum(quantum)
            .build()
            .unwrap();
        let pid = sim.spawn(ProcessSpec::normal(1, burst, demand)).unwrap();

        let report = sim.run_scheduler().unwrap();
        prop_assert!(report.outcome.is_completed());

        let record = sim.get(&pid).unwrap();
        prop_assert_eq!(record.remaining_time(), 0);
        prop_assert!(approx_eq(record.consumed(), demand));
        prop_assert_eq!(report.dispatches, u64::from(burst.div_ceil(quantum)));
    }
}
