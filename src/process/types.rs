/*!
 * Process Types
 * Process record, kinds, states and creation parameters
 */

use crate::core::types::{Pid, Priority, TimeUnits, Units};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Process kind, fixed at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessKind {
    /// Holds memory while it runs
    Normal,
    /// Deposits its demand into the shared buffer
    Producer,
    /// Withdraws its demand from the shared buffer
    Consumer,
}

impl fmt::Display for ProcessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessKind::Normal => write!(f, "normal"),
            ProcessKind::Producer => write!(f, "producer"),
            ProcessKind::Consumer => write!(f, "consumer"),
        }
    }
}

/// Process state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessState {
    /// Waiting in the ready set
    Ready,
    /// Holding the single execution slot
    Running,
    /// Waiting for memory or buffer space/content
    Blocked,
    /// Finished or killed; absorbing
    Terminated,
}

impl ProcessState {
    /// Whether the state machine has an edge `self -> to`
    ///
    /// Ready -> Blocked is the admission-failure edge taken before dispatch.
    pub const fn can_transition(self, to: ProcessState) -> bool {
        use ProcessState::*;
        matches!(
            (self, to),
            (Ready, Running)
                | (Running, Ready)
                | (Running, Blocked)
                | (Ready, Blocked)
                | (Blocked, Ready)
                | (Ready, Terminated)
                | (Running, Terminated)
                | (Blocked, Terminated)
        )
    }

    #[inline]
    pub const fn is_active(self) -> bool {
        !matches!(self, ProcessState::Terminated)
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessState::Ready => write!(f, "ready"),
            ProcessState::Running => write!(f, "running"),
            ProcessState::Blocked => write!(f, "blocked"),
            ProcessState::Terminated => write!(f, "terminated"),
        }
    }
}

/// Result of a guarded transition that may lose the execution slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Applied,
    /// Ready -> Running refused, another record holds the slot
    Contended { holder: Pid },
}

impl Transition {
    pub fn is_applied(&self) -> bool {
        matches!(self, Transition::Applied)
    }
}

/// Explicit creation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessSpec {
    pub kind: ProcessKind,
    pub priority: Priority,
    pub burst_time: TimeUnits,
    pub memory_demand: Units,
}

impl ProcessSpec {
    pub fn new(kind: ProcessKind, priority: Priority, burst_time: TimeUnits, memory_demand: Units) -> Self {
        Self {
            kind,
            priority,
            burst_time,
            memory_demand,
        }
    }

    pub fn normal(priority: Priority, burst_time: TimeUnits, memory_demand: Units) -> Self {
        Self::new(ProcessKind::Normal, priority, burst_time, memory_demand)
    }

    pub fn producer(priority: Priority, burst_time: TimeUnits, memory_demand: Units) -> Self {
        Self::new(ProcessKind::Producer, priority, burst_time, memory_demand)
    }

    pub fn consumer(priority: Priority, burst_time: TimeUnits, memory_demand: Units) -> Self {
        Self::new(ProcessKind::Consumer, priority, burst_time, memory_demand)
    }
}

/// Process record
///
/// State is private to the `process` module: every change goes through
/// [`ProcessRegistry`](super::ProcessRegistry) so queue membership and
/// `state` never disagree.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessRecord {
    id: Pid,
    kind: ProcessKind,
    pub(super) state: ProcessState,
    priority: Priority,
    burst_time: TimeUnits,
    pub(super) remaining_time: TimeUnits,
    memory_demand: Units,
    in_memory: bool,
    /// Resource units moved or charged so far (memory slices, deposits, withdrawals)
    consumed: Units,
    /// Arrival order, used for table order and priority tie-breaks
    #[serde(skip)]
    pub(super) seq: u64,
}

impl ProcessRecord {
    pub(crate) fn new(id: Pid, spec: &ProcessSpec) -> Self {
        Self {
            id,
            kind: spec.kind,
            state: ProcessState::Ready,
            priority: spec.priority,
            burst_time: spec.burst_time,
            remaining_time: spec.burst_time,
            memory_demand: spec.memory_demand,
            in_memory: false,
            consumed: 0.0,
            seq: 0,
        }
    }

    #[inline]
    pub fn id(&self) -> &Pid {
        &self.id
    }

    #[inline]
    pub fn kind(&self) -> ProcessKind {
        self.kind
    }

    #[inline]
    pub fn state(&self) -> ProcessState {
        self.state
    }

    #[inline]
    pub fn priority(&self) -> Priority {
        self.priority
    }

    #[inline]
    pub fn burst_time(&self) -> TimeUnits {
        self.burst_time
    }

    #[inline]
    pub fn remaining_time(&self) -> TimeUnits {
        self.remaining_time
    }

    #[inline]
    pub fn memory_demand(&self) -> Units {
        self.memory_demand
    }

    #[inline]
    pub fn in_memory(&self) -> bool {
        self.in_memory
    }

    #[inline]
    pub fn consumed(&self) -> Units {
        self.consumed
    }

    #[inline]
    pub fn arrival(&self) -> u64 {
        self.seq
    }

    #[inline]
    pub fn is_terminated(&self) -> bool {
        matches!(self.state, ProcessState::Terminated)
    }

    /// Time this record would run for given a budget
    #[inline]
    pub fn slice(&self, budget: TimeUnits) -> TimeUnits {
        budget.min(self.remaining_time)
    }

    /// Proportional share of `memory_demand` for a slice of `units` time
    pub fn share(&self, units: TimeUnits) -> Units {
        if self.burst_time == 0 {
            return self.memory_demand;
        }
        self.memory_demand * (Units::from(units) / Units::from(self.burst_time))
    }

    /// Only the memory allocator flips residency
    pub(crate) fn set_in_memory(&mut self, in_memory: bool) {
        self.in_memory = in_memory;
    }

    /// Consume `units` of remaining time and account `amount` resource units
    pub(crate) fn consume(&mut self, units: TimeUnits, amount: Units) {
        self.remaining_time = self.remaining_time.saturating_sub(units);
        self.consumed += amount;
    }
}
