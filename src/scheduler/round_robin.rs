/*!
 * Round-Robin Policy
 *
 * One quantum per cycle to the running record, or else to the Ready record
 * with the lowest priority value (arrival order on ties).
 */

use super::deadlock::DeadlockDetector;
use super::dispatch::dispatch;
use super::traits::PolicyRunner;
use super::types::{RunOutcome, RunReport, SchedulingPolicy, TimeQuantum};
use super::unblock::ResourceUnblocker;
use crate::core::SimResult;
use crate::sim::SimContext;
use tracing::{debug, trace, warn};

#[derive(Debug, Clone, Copy)]
pub struct RoundRobinRunner {
    quantum: TimeQuantum,
    idle_threshold: u32,
    max_cycles: u64,
}

impl RoundRobinRunner {
    pub fn new(quantum: TimeQuantum, idle_threshold: u32, max_cycles: u64) -> Self {
        Self {
            quantum,
            idle_threshold,
            max_cycles,
        }
    }
}

impl PolicyRunner for RoundRobinRunner {
    fn policy(&self) -> SchedulingPolicy {
        SchedulingPolicy::RoundRobin
    }

    fn run(&self, ctx: &mut SimContext, report: &mut RunReport) -> SimResult<RunOutcome> {
        let policy = SchedulingPolicy::RoundRobin;
        let unblocker = ResourceUnblocker::new(policy, self.quantum);
        let detector = DeadlockDetector::new(policy, self.quantum);
        let mut idle_cycles = 0u32;

        loop {
            if report.cycles >= self.max_cycles {
                warn!(cycles = report.cycles, "cycle limit reached");
                return Ok(RunOutcome::CycleLimit {
                    cycles: report.cycles,
                });
            }
            report.cycles += 1;

            let purged = ctx.registry.purge_terminated();
            if purged > 0 {
                debug!(purged, "stale terminated ids dropped");
            }

            if !ctx.registry.has_active() {
                return Ok(RunOutcome::Completed);
            }

            if unblocker.reevaluate(ctx)? > 0 {
                idle_cycles = 0;
            }

            let next = ctx
                .registry
                .running()
                .cloned()
                .or_else(|| ctx.registry.lowest_priority_ready());

            let Some(pid) = next else {
                if let Some(blocked) = detector.diagnose(ctx) {
                    return Ok(RunOutcome::Deadlocked { blocked });
                }
                idle_cycles += 1;
                debug!(idle_cycles, threshold = self.idle_threshold, "idle cycle");
                if idle_cycles >= self.idle_threshold {
                    return Ok(RunOutcome::Stalled { idle_cycles });
                }
                continue;
            };

            let outcome = dispatch(ctx, &pid, policy, self.quantum)?;
            trace!(pid = %pid, ?outcome, cycle = report.cycles, "quantum dispatched");
            report.record(&pid, &outcome);
        }
    }
}
