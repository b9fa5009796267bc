/*!
 * Resource Unblocker
 * Promotes satisfiable Blocked records back to Ready
 */

use super::guards::can_progress;
use super::types::{SchedulingPolicy, TimeQuantum};
use crate::core::types::Pid;
use crate::core::SimResult;
use crate::monitoring::AuditKind;
use crate::sim::SimContext;
use tracing::debug;

/// Re-evaluates the blocked set against current resource levels
#[derive(Debug, Clone, Copy)]
pub struct ResourceUnblocker {
    policy: SchedulingPolicy,
    quantum: TimeQuantum,
}

impl ResourceUnblocker {
    pub fn new(policy: SchedulingPolicy, quantum: TimeQuantum) -> Self {
        Self { policy, quantum }
    }

    /// Ids that would be promoted right now
    ///
    /// Every record is tested against the same levels; no promotion affects
    /// the check of another.
    pub fn satisfiable(&self, ctx: &SimContext) -> Vec<Pid> {
        ctx.registry
            .blocked_ids()
            .into_iter()
            .filter(|pid| {
                ctx.registry.get(pid).is_some_and(|record| {
                    can_progress(record, self.policy, self.quantum, &ctx.memory, &ctx.buffer)
                })
            })
            .collect()
    }

    /// Blocked -> Ready for every satisfiable record; returns the count
    pub fn reevaluate(&self, ctx: &mut SimContext) -> SimResult<usize> {
        let promoted = self.satisfiable(ctx);
        for pid in &promoted {
            ctx.make_ready(pid)?;
            ctx.audit
                .process(pid, AuditKind::Unblocked, "resource need satisfiable");
        }
        if !promoted.is_empty() {
            debug!(count = promoted.len(), "blocked processes promoted");
        }
        Ok(promoted.len())
    }
}
