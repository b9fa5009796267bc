/*!
 * Snapshot
 * Serializable view of the process table and both resources
 */

use crate::core::types::{Pid, TimeUnits};
use crate::ipc::BufferStats;
use crate::memory::MemoryStats;
use crate::process::ProcessRecord;
use crate::scheduler::SchedulingPolicy;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub policy: SchedulingPolicy,
    pub time_quantum: TimeUnits,
    /// Every record in table order, Terminated included
    pub processes: Vec<ProcessRecord>,
    pub running: Option<Pid>,
    pub ready: Vec<Pid>,
    pub blocked: Vec<Pid>,
    pub memory: MemoryStats,
    pub buffer: BufferStats,
}

impl Snapshot {
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
