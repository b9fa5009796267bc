/*!
 * Scheduler Benchmarks
 *
 * Full scheduling runs under FIFO and Round-Robin for growing workloads
 */

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use process_sim::{ProcessKind, SchedulingPolicy, Simulator};

fn populated(policy: SchedulingPolicy, count: usize) -> Simulator {
    let mut sim = Simulator::builder()
        .with_seed(42)
        .with_policy(policy)
        .with_memory_capacity(4096.0)
        .with_buffer_capacity(2048.0)
        .build()
        .unwrap();

    let kinds = [ProcessKind::Normal, ProcessKind::Producer, ProcessKind::Consumer];
    for i in 0..count {
        let priority = (i % 10) as u8 + 1;
        sim.create_process(kinds[i % kinds.len()], priority).unwrap();
    }
    sim
}

fn bench_full_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_run");

    for policy in [SchedulingPolicy::Fifo, SchedulingPolicy::RoundRobin] {
        for count in [10usize, 100, 500] {
            group.bench_with_input(
                BenchmarkId::new(policy.as_str(), count),
                &count,
                |b, &count| {
                    b.iter_batched(
                        || populated(policy, count),
                        |mut sim| black_box(sim.run_scheduler().unwrap()),
                        criterion::BatchSize::SmallInput,
                    );
                },
            );
        }
    }

    group.finish();
}

fn bench_deadlock_check(c: &mut Criterion) {
    let mut sim = populated(SchedulingPolicy::Fifo, 200);
    sim.run_scheduler().unwrap();

    c.bench_function("is_deadlocked_after_run", |b| {
        b.iter(|| black_box(sim.is_deadlocked()));
    });
}

criterion_group!(benches, bench_full_run, bench_deadlock_check);
criterion_main!(benches);
