/*!
 * Scheduler Types
 * Policies, quanta, dispatch outcomes and run reports
 */

use crate::core::types::{Pid, TimeUnits, Units};
use crate::core::{SimError, SimResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Dispatch policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SchedulingPolicy {
    /// Run each ready record to completion in arrival order
    #[default]
    Fifo,
    /// One quantum per cycle, lowest priority value first
    RoundRobin,
}

impl SchedulingPolicy {
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Fifo => "fifo",
            Self::RoundRobin => "round_robin",
        }
    }

    /// How Normal records hold memory under this policy
    #[inline]
    pub const fn memory_holding(&self) -> MemoryHolding {
        match self {
            Self::Fifo => MemoryHolding::FullAllocation,
            Self::RoundRobin => MemoryHolding::PerSlice,
        }
    }

    /// Time budget a dispatch of a record with `remaining` time gets
    #[inline]
    pub fn budget(&self, quantum: TimeQuantum, remaining: TimeUnits) -> TimeUnits {
        match self {
            Self::Fifo => remaining,
            Self::RoundRobin => quantum.units(),
        }
    }
}

impl FromStr for SchedulingPolicy {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fifo" | "fcfs" => Ok(Self::Fifo),
            "round_robin" | "roundrobin" | "round-robin" | "rr" => Ok(Self::RoundRobin),
            _ => Err(SimError::InvalidConfig(format!(
                "invalid policy '{}', valid: fifo, round_robin",
                s
            ))),
        }
    }
}

impl fmt::Display for SchedulingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SchedulingPolicy {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SchedulingPolicy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Memory-holding rule for Normal records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryHolding {
    /// Whole demand held from admission until termination
    FullAllocation,
    /// Proportional slice charged inside each dispatch step only
    PerSlice,
}

/// Round-Robin time quantum, always > 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TimeQuantum(TimeUnits);

impl TimeQuantum {
    pub fn new(units: TimeUnits) -> SimResult<Self> {
        if units == 0 {
            return Err(SimError::InvalidQuantum(units));
        }
        Ok(Self(units))
    }

    #[inline]
    pub const fn units(&self) -> TimeUnits {
        self.0
    }
}

impl Default for TimeQuantum {
    fn default() -> Self {
        Self(crate::core::limits::DEFAULT_TIME_QUANTUM)
    }
}

impl<'de> Deserialize<'de> for TimeQuantum {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let units = TimeUnits::deserialize(deserializer)?;
        Self::new(units).map_err(serde::de::Error::custom)
    }
}

/// What one dispatch step did to a record
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// Remaining time reached zero
    Completed,
    /// Slice consumed, back to Ready
    Preempted { remaining: TimeUnits },
    /// Resource unavailable, moved to Blocked
    Blocked { need: Units },
    /// Execution slot held by another record
    Contended { holder: Pid },
    /// Record was not dispatchable (gone, terminated or blocked)
    Skipped,
}

impl DispatchOutcome {
    #[inline]
    pub fn made_progress(&self) -> bool {
        matches!(self, Self::Completed | Self::Preempted { .. })
    }
}

/// How a scheduling run ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunOutcome {
    /// No Ready, Running or Blocked record remains
    Completed,
    /// No progress for the configured number of passes/cycles
    Stalled { idle_cycles: u32 },
    /// Every blocked record's need is unsatisfiable
    Deadlocked { blocked: Vec<Pid> },
    /// The sole ready record can never be dispatched successfully
    Unsatisfiable { pid: Pid },
    /// Safety bound on cycles reached
    CycleLimit { cycles: u64 },
}

impl RunOutcome {
    #[inline]
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Summary of one scheduling run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub policy: SchedulingPolicy,
    /// FIFO: unblock passes; Round-Robin: loop cycles
    pub cycles: u64,
    pub dispatches: u64,
    /// Ids terminated during this run, in completion order
    pub completed: Vec<Pid>,
    /// Ids still Blocked when the run ended
    pub blocked: Vec<Pid>,
    pub outcome: RunOutcome,
}

impl RunReport {
    pub(crate) fn new(policy: SchedulingPolicy) -> Self {
        Self {
            policy,
            cycles: 0,
            dispatches: 0,
            completed: Vec::new(),
            blocked: Vec::new(),
            outcome: RunOutcome::Completed,
        }
    }

    pub(crate) fn record(&mut self, pid: &Pid, outcome: &DispatchOutcome) {
        self.dispatches += 1;
        if matches!(outcome, DispatchOutcome::Completed) {
            self.completed.push(pid.clone());
        }
    }

    /// Map stall outcomes onto errors
    pub fn into_result(self) -> SimResult<Self> {
        match &self.outcome {
            RunOutcome::Deadlocked { blocked } => Err(SimError::Deadlocked {
                blocked: blocked.clone(),
            }),
            RunOutcome::Stalled { idle_cycles } => Err(SimError::Stalled {
                idle_cycles: *idle_cycles,
                blocked: self.blocked.len(),
            }),
            RunOutcome::Unsatisfiable { .. } | RunOutcome::CycleLimit { .. } => {
                Err(SimError::Stalled {
                    idle_cycles: 0,
                    blocked: self.blocked.len(),
                })
            }
            RunOutcome::Completed => Ok(self),
        }
    }
}
