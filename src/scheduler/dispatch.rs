/*!
 * Dispatch
 * One unit of work for one record, shared by both policies
 *
 * A step is atomic: every resource check and mutation happens before it
 * returns, and the record leaves it Ready, Blocked or Terminated.
 */

use super::guards::{is_satisfiable, pending_need, ResourceNeed};
use super::types::{DispatchOutcome, MemoryHolding, SchedulingPolicy, TimeQuantum};
use crate::core::types::Pid;
use crate::core::SimResult;
use crate::monitoring::AuditKind;
use crate::process::{ProcessKind, ProcessState, Transition};
use crate::sim::SimContext;
use tracing::debug;

/// Dispatch `pid` for one step under `policy`
pub(crate) fn dispatch(
    ctx: &mut SimContext,
    pid: &Pid,
    policy: SchedulingPolicy,
    quantum: TimeQuantum,
) -> SimResult<DispatchOutcome> {
    match ctx.registry.get(pid).map(|r| r.state()) {
        Some(ProcessState::Ready) => {
            if let Transition::Contended { holder } = ctx.start(pid)? {
                return Ok(DispatchOutcome::Contended { holder });
            }
        }
        Some(ProcessState::Running) => {}
        Some(ProcessState::Blocked) | Some(ProcessState::Terminated) | None => {
            return Ok(DispatchOutcome::Skipped);
        }
    }

    let (kind, slice, share, need) = {
        let Some(record) = ctx.registry.get(pid) else {
            return Ok(DispatchOutcome::Skipped);
        };
        let budget = policy.budget(quantum, record.remaining_time());
        let slice = record.slice(budget);
        (record.kind(), slice, record.share(slice), pending_need(record, policy, quantum))
    };

    debug!(pid = %pid, kind = %kind, slice, share, policy = %policy, "dispatching");

    if !is_satisfiable(need, &ctx.memory, &ctx.buffer) {
        let reason = match kind {
            ProcessKind::Normal => {
                ctx.audit.process(
                    pid,
                    AuditKind::AdmissionFailed,
                    format!("need={:.2} available={:.2}", need.amount(), ctx.memory.available()),
                );
                "insufficient memory"
            }
            ProcessKind::Producer => "insufficient buffer space",
            ProcessKind::Consumer => "insufficient buffer content",
        };
        ctx.block(pid, reason)?;
        return Ok(DispatchOutcome::Blocked { need: need.amount() });
    }

    let applied = {
        let SimContext {
            registry,
            memory,
            buffer,
            audit,
        } = &mut *ctx;
        let Some(record) = registry.get_mut(pid) else {
            return Ok(DispatchOutcome::Skipped);
        };

        match kind {
            ProcessKind::Normal => match policy.memory_holding() {
                MemoryHolding::FullAllocation => {
                    if !record.in_memory() {
                        if !memory.try_acquire(record) {
                            false
                        } else {
                            audit.process(
                                pid,
                                AuditKind::Admitted,
                                format!("demand={:.2}", record.memory_demand()),
                            );
                            record.consume(slice, share);
                            true
                        }
                    } else {
                        record.consume(slice, share);
                        true
                    }
                }
                MemoryHolding::PerSlice => {
                    if record.in_memory() || matches!(need, ResourceNeed::Nothing) {
                        record.consume(slice, share);
                        true
                    } else if memory.try_charge(share) {
                        record.consume(slice, share);
                        memory.discharge(share);
                        true
                    } else {
                        false
                    }
                }
            },
            ProcessKind::Producer => {
                if buffer.try_deposit(share) {
                    audit.process(
                        pid,
                        AuditKind::Deposited,
                        format!("amount={:.2} occupied={:.2}", share, buffer.occupied()),
                    );
                    record.consume(slice, share);
                    true
                } else {
                    false
                }
            }
            ProcessKind::Consumer => {
                if buffer.try_withdraw(share) {
                    audit.process(
                        pid,
                        AuditKind::Withdrew,
                        format!("amount={:.2} occupied={:.2}", share, buffer.occupied()),
                    );
                    record.consume(slice, share);
                    true
                } else {
                    false
                }
            }
        }
    };

    if !applied {
        ctx.block(pid, need.label())?;
        return Ok(DispatchOutcome::Blocked { need: need.amount() });
    }

    let remaining = ctx
        .registry
        .get(pid)
        .map_or(0, |record| record.remaining_time());
    if remaining == 0 {
        ctx.terminate(pid)?;
        Ok(DispatchOutcome::Completed)
    } else {
        ctx.make_ready(pid)?;
        Ok(DispatchOutcome::Preempted { remaining })
    }
}
