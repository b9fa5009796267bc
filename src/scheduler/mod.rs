/*!
 * Scheduler Module
 * Admission, policy runs and the unblock/deadlock fixed point
 */

pub mod deadlock;
pub(crate) mod dispatch;
pub mod fifo;
pub mod guards;
pub mod round_robin;
pub mod traits;
pub mod types;
pub mod unblock;

pub use deadlock::DeadlockDetector;
pub use fifo::FifoRunner;
pub use guards::{can_progress, is_satisfiable, pending_need, ResourceNeed};
pub use round_robin::RoundRobinRunner;
pub use traits::PolicyRunner;
pub use types::{
    DispatchOutcome, MemoryHolding, RunOutcome, RunReport, SchedulingPolicy, TimeQuantum,
};
pub use unblock::ResourceUnblocker;

use crate::core::limits::{DEFAULT_IDLE_THRESHOLD, DEFAULT_MAX_CYCLES};
use crate::core::SimResult;
use crate::monitoring::AuditKind;
use crate::process::{ProcessKind, ProcessState};
use crate::sim::SimContext;
use tracing::{info, warn};

/// Scheduler configuration for one or more runs
#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    policy: SchedulingPolicy,
    quantum: TimeQuantum,
    idle_threshold: u32,
    max_cycles: u64,
}

impl Scheduler {
    pub fn new(policy: SchedulingPolicy, quantum: TimeQuantum) -> Self {
        Self {
            policy,
            quantum,
            idle_threshold: DEFAULT_IDLE_THRESHOLD,
            max_cycles: DEFAULT_MAX_CYCLES,
        }
    }

    pub fn with_idle_threshold(mut self, idle_threshold: u32) -> Self {
        self.idle_threshold = idle_threshold.max(1);
        self
    }

    pub fn with_max_cycles(mut self, max_cycles: u64) -> Self {
        self.max_cycles = max_cycles;
        self
    }

    #[inline]
    pub fn policy(&self) -> SchedulingPolicy {
        self.policy
    }

    #[inline]
    pub fn quantum(&self) -> TimeQuantum {
        self.quantum
    }

    pub fn idle_threshold(&self) -> u32 {
        self.idle_threshold
    }

    pub fn max_cycles(&self) -> u64 {
        self.max_cycles
    }

    pub fn unblocker(&self) -> ResourceUnblocker {
        ResourceUnblocker::new(self.policy, self.quantum)
    }

    pub fn detector(&self) -> DeadlockDetector {
        DeadlockDetector::new(self.policy, self.quantum)
    }

    /// Try to admit every Ready Normal record into memory, in table order
    ///
    /// Only FIFO holds allocations across dispatches; under Round-Robin this
    /// is a no-op. Records that do not fit stay Ready and block on dispatch.
    pub fn admit(&self, ctx: &mut SimContext) -> usize {
        if self.policy.memory_holding() != MemoryHolding::FullAllocation {
            return 0;
        }

        let mut admitted = 0;
        for pid in ctx.registry.ready_in_table_order() {
            let SimContext {
                registry,
                memory,
                audit,
                ..
            } = &mut *ctx;
            let Some(record) = registry.get_mut(&pid) else {
                continue;
            };
            if record.kind() != ProcessKind::Normal || record.in_memory() {
                continue;
            }
            if memory.try_acquire(record) {
                admitted += 1;
                audit.process(
                    &pid,
                    AuditKind::Admitted,
                    format!("demand={:.2}", record.memory_demand()),
                );
            }
        }
        admitted
    }

    /// One complete scheduling run
    pub fn run(&self, ctx: &mut SimContext) -> SimResult<RunReport> {
        info!(policy = %self.policy, quantum = self.quantum.units(), "scheduling run started");
        ctx.audit.system(
            AuditKind::RunStarted,
            format!("policy={} quantum={}", self.policy, self.quantum.units()),
        );

        let admitted = self.admit(ctx);
        let promoted = self.unblocker().reevaluate(ctx)?;

        let mut report = RunReport::new(self.policy);
        report.outcome = match self.policy {
            SchedulingPolicy::Fifo => {
                FifoRunner::new(self.quantum, self.max_cycles).run(ctx, &mut report)?
            }
            SchedulingPolicy::RoundRobin => {
                RoundRobinRunner::new(self.quantum, self.idle_threshold, self.max_cycles)
                    .run(ctx, &mut report)?
            }
        };
        report.blocked = ctx.registry.ids_in_state(ProcessState::Blocked);

        match &report.outcome {
            RunOutcome::Completed => {}
            RunOutcome::Deadlocked { blocked } => {
                warn!(blocked = blocked.len(), "run ended in deadlock");
                ctx.audit.system(
                    AuditKind::Deadlock,
                    format!("{} blocked process(es) cannot be satisfied", blocked.len()),
                );
            }
            other => {
                warn!(outcome = ?other, blocked = report.blocked.len(), "run stalled");
                ctx.audit.system(AuditKind::Stalled, format!("{:?}", other));
            }
        }

        info!(
            policy = %self.policy,
            admitted,
            promoted,
            cycles = report.cycles,
            dispatches = report.dispatches,
            completed = report.completed.len(),
            "scheduling run finished"
        );
        ctx.audit.system(
            AuditKind::RunFinished,
            format!(
                "cycles={} dispatches={} completed={} blocked={}",
                report.cycles,
                report.dispatches,
                report.completed.len(),
                report.blocked.len()
            ),
        );
        Ok(report)
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(SchedulingPolicy::default(), TimeQuantum::default())
    }
}
