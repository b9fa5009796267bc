/*!
 * Resource Guards
 *
 * One predicate per kind, shared by dispatch, the unblocker and the
 * deadlock detector so all three agree on what "satisfiable" means.
 */

use super::types::{MemoryHolding, SchedulingPolicy, TimeQuantum};
use crate::core::types::Units;
use crate::ipc::SharedBuffer;
use crate::memory::MemoryAllocator;
use crate::process::{ProcessKind, ProcessRecord};

/// What the next dispatch of a record will ask for
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResourceNeed {
    /// Already holds what it needs
    Nothing,
    /// Free memory units
    Memory(Units),
    /// Free buffer space
    BufferSpace(Units),
    /// Buffer content
    BufferContent(Units),
}

impl ResourceNeed {
    /// Amount requested, zero for [`ResourceNeed::Nothing`]
    #[inline]
    pub fn amount(&self) -> Units {
        match *self {
            ResourceNeed::Nothing => 0.0,
            ResourceNeed::Memory(a) | ResourceNeed::BufferSpace(a) | ResourceNeed::BufferContent(a) => a,
        }
    }

    /// Short label for logs and audit details
    pub fn label(&self) -> &'static str {
        match self {
            ResourceNeed::Nothing => "none",
            ResourceNeed::Memory(_) => "memory",
            ResourceNeed::BufferSpace(_) => "buffer space",
            ResourceNeed::BufferContent(_) => "buffer content",
        }
    }
}

/// Need of `record`'s next dispatch under `policy`
///
/// Slice share is `memory_demand * min(budget, remaining) / burst_time`,
/// where FIFO's budget is the whole remaining time.
pub fn pending_need(record: &ProcessRecord, policy: SchedulingPolicy, quantum: TimeQuantum) -> ResourceNeed {
    let budget = policy.budget(quantum, record.remaining_time());
    let share = record.share(record.slice(budget));

    match record.kind() {
        ProcessKind::Normal => {
            if record.in_memory() {
                return ResourceNeed::Nothing;
            }
            match policy.memory_holding() {
                MemoryHolding::FullAllocation => ResourceNeed::Memory(record.memory_demand()),
                MemoryHolding::PerSlice => ResourceNeed::Memory(share),
            }
        }
        ProcessKind::Producer => ResourceNeed::BufferSpace(share),
        ProcessKind::Consumer => ResourceNeed::BufferContent(share),
    }
}

/// Whether `need` can be met with the current resource levels
pub fn is_satisfiable(need: ResourceNeed, memory: &MemoryAllocator, buffer: &SharedBuffer) -> bool {
    match need {
        ResourceNeed::Nothing => true,
        ResourceNeed::Memory(amount) => memory.can_fit(amount),
        ResourceNeed::BufferSpace(amount) => buffer.can_deposit(amount),
        ResourceNeed::BufferContent(amount) => buffer.can_withdraw(amount),
    }
}

/// [`pending_need`] followed by [`is_satisfiable`]
#[inline]
pub fn can_progress(
    record: &ProcessRecord,
    policy: SchedulingPolicy,
    quantum: TimeQuantum,
    memory: &MemoryAllocator,
    buffer: &SharedBuffer,
) -> bool {
    is_satisfiable(pending_need(record, policy, quantum), memory, buffer)
}
