/*!
 * Deadlock Detector
 *
 * Terminal diagnostic, meaningful only once Ready and Running are empty:
 * deadlocked iff no Blocked record's need is satisfiable.
 */

use super::guards::can_progress;
use super::types::{SchedulingPolicy, TimeQuantum};
use crate::core::types::Pid;
use crate::sim::SimContext;
use tracing::warn;

#[derive(Debug, Clone, Copy)]
pub struct DeadlockDetector {
    policy: SchedulingPolicy,
    quantum: TimeQuantum,
}

impl DeadlockDetector {
    pub fn new(policy: SchedulingPolicy, quantum: TimeQuantum) -> Self {
        Self { policy, quantum }
    }

    pub fn is_deadlocked(&self, ctx: &SimContext) -> bool {
        self.diagnose(ctx).is_some()
    }

    /// Blocked ids when deadlocked, `None` when progress is still possible
    pub fn diagnose(&self, ctx: &SimContext) -> Option<Vec<Pid>> {
        let registry = &ctx.registry;
        if registry.running().is_some() || registry.ready_len() > 0 {
            return None;
        }

        let blocked = registry.blocked_ids();
        if blocked.is_empty() {
            return None;
        }

        let any_satisfiable = blocked.iter().any(|pid| {
            registry.get(pid).is_some_and(|record| {
                can_progress(record, self.policy, self.quantum, &ctx.memory, &ctx.buffer)
            })
        });
        if any_satisfiable {
            return None;
        }

        warn!(blocked = blocked.len(), policy = %self.policy, "deadlock detected");
        Some(blocked)
    }
}
