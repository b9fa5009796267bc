/*!
 * FIFO Policy
 *
 * One sweep in table order, each record running to completion, followed by
 * unblock passes until two consecutive passes promote nothing.
 */

use super::deadlock::DeadlockDetector;
use super::dispatch::dispatch;
use super::guards::can_progress;
use super::traits::PolicyRunner;
use super::types::{RunOutcome, RunReport, SchedulingPolicy, TimeQuantum};
use super::unblock::ResourceUnblocker;
use crate::core::limits::FIFO_STALL_PASSES;
use crate::core::types::Pid;
use crate::core::SimResult;
use crate::process::{ProcessKind, ProcessState};
use crate::sim::SimContext;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy)]
pub struct FifoRunner {
    quantum: TimeQuantum,
    max_cycles: u64,
}

impl FifoRunner {
    pub fn new(quantum: TimeQuantum, max_cycles: u64) -> Self {
        Self { quantum, max_cycles }
    }

    /// Dispatch the running record, then every Ready record in table order
    fn sweep(&self, ctx: &mut SimContext, report: &mut RunReport) -> SimResult<()> {
        if let Some(pid) = ctx.registry.running().cloned() {
            let outcome = dispatch(ctx, &pid, SchedulingPolicy::Fifo, self.quantum)?;
            report.record(&pid, &outcome);
        }

        for pid in ctx.registry.ready_in_table_order() {
            // An earlier dispatch in this sweep may have changed the set
            if ctx.registry.state_of(&pid).ok() != Some(ProcessState::Ready) {
                continue;
            }
            let outcome = dispatch(ctx, &pid, SchedulingPolicy::Fifo, self.quantum)?;
            report.record(&pid, &outcome);
        }
        Ok(())
    }

    /// Sole Ready record that is a Producer or Consumer whose buffer guard fails
    fn structurally_unsatisfiable(&self, ctx: &SimContext) -> Option<Pid> {
        if ctx.registry.ready_len() != 1 || ctx.registry.running().is_some() {
            return None;
        }
        let pid = ctx.registry.ready_ids().pop()?;
        let record = ctx.registry.get(&pid)?;
        let buffer_bound = matches!(record.kind(), ProcessKind::Producer | ProcessKind::Consumer);
        let blocked = !can_progress(
            record,
            SchedulingPolicy::Fifo,
            self.quantum,
            &ctx.memory,
            &ctx.buffer,
        );
        (buffer_bound && blocked).then_some(pid)
    }
}

impl PolicyRunner for FifoRunner {
    fn policy(&self) -> SchedulingPolicy {
        SchedulingPolicy::Fifo
    }

    fn run(&self, ctx: &mut SimContext, report: &mut RunReport) -> SimResult<RunOutcome> {
        let unblocker = ResourceUnblocker::new(SchedulingPolicy::Fifo, self.quantum);
        let detector = DeadlockDetector::new(SchedulingPolicy::Fifo, self.quantum);

        self.sweep(ctx, report)?;

        let mut quiet_passes = 0u32;
        loop {
            if !ctx.registry.has_active() {
                return Ok(RunOutcome::Completed);
            }
            if report.cycles >= self.max_cycles {
                return Ok(RunOutcome::CycleLimit {
                    cycles: report.cycles,
                });
            }
            report.cycles += 1;

            let promoted = unblocker.reevaluate(ctx)?;
            if promoted == 0 && ctx.registry.ready_len() == 0 {
                quiet_passes += 1;
                debug!(quiet_passes, "unblock pass promoted nothing");
                if quiet_passes >= FIFO_STALL_PASSES {
                    break;
                }
                continue;
            }
            quiet_passes = 0;

            if let Some(pid) = self.structurally_unsatisfiable(ctx) {
                info!(pid = %pid, "sole ready process can never be dispatched");
                return Ok(RunOutcome::Unsatisfiable { pid });
            }

            self.sweep(ctx, report)?;
        }

        if !ctx.registry.has_active() {
            return Ok(RunOutcome::Completed);
        }
        match detector.diagnose(ctx) {
            Some(blocked) => Ok(RunOutcome::Deadlocked { blocked }),
            None => Ok(RunOutcome::Stalled {
                idle_cycles: quiet_passes,
            }),
        }
    }
}
