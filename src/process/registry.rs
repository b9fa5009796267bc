/*!
 * Process Registry
 * Owns the process table and the ready / blocked / running sets
 *
 * Indexed storage: id -> record map plus ordered id sequences. Set
 * membership is answered from the record's state (O(1)); the sequences only
 * carry order. Every mutation of `state` happens here, together with the
 * matching set move.
 */

use super::types::{ProcessRecord, ProcessState, Transition};
use crate::core::types::{Pid, Units};
use crate::core::{SimError, SimResult};
use crate::memory::MemoryAllocator;
use ahash::RandomState;
use std::collections::{HashMap, VecDeque};
use tracing::{debug, warn};

/// Process table with explicit movement queues
#[derive(Debug, Default)]
pub struct ProcessRegistry {
    table: HashMap<Pid, ProcessRecord, RandomState>,
    // Creation order
    order: Vec<Pid>,
    ready: VecDeque<Pid>,
    blocked: VecDeque<Pid>,
    running: Option<Pid>,
    next_seq: u64,
}

impl ProcessRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a freshly created record as Ready at the back of the ready set
    pub fn insert(&mut self, mut record: ProcessRecord) -> SimResult<&ProcessRecord> {
        if self.table.contains_key(record.id()) {
            return Err(SimError::InvalidConfig(format!(
                "duplicate process id {}",
                record.id()
            )));
        }

        let pid = record.id().clone();
        record.state = ProcessState::Ready;
        record.seq = self.next_seq;
        self.next_seq += 1;

        self.order.push(pid.clone());
        self.ready.push_back(pid.clone());
        debug!(pid = %pid, kind = %record.kind(), "process registered");
        Ok(self.table.entry(pid).or_insert(record))
    }

    #[inline]
    pub fn contains(&self, pid: &Pid) -> bool {
        self.table.contains_key(pid)
    }

    #[inline]
    pub fn get(&self, pid: &Pid) -> Option<&ProcessRecord> {
        self.table.get(pid)
    }

    /// Mutable access for resource accounting; `state` stays private
    #[inline]
    pub(crate) fn get_mut(&mut self, pid: &Pid) -> Option<&mut ProcessRecord> {
        self.table.get_mut(pid)
    }

    pub fn state_of(&self, pid: &Pid) -> SimResult<ProcessState> {
        self.table
            .get(pid)
            .map(ProcessRecord::state)
            .ok_or_else(|| SimError::NotFound(pid.clone()))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Records in table (creation) order
    pub fn records(&self) -> impl Iterator<Item = &ProcessRecord> + '_ {
        self.order.iter().filter_map(move |pid| self.table.get(pid))
    }

    #[inline]
    pub fn running(&self) -> Option<&Pid> {
        self.running.as_ref()
    }

    /// Ready ids in queue order
    pub fn ready_ids(&self) -> Vec<Pid> {
        self.ready.iter().cloned().collect()
    }

    /// Blocked ids in queue order
    pub fn blocked_ids(&self) -> Vec<Pid> {
        self.blocked.iter().cloned().collect()
    }

    /// Ready ids in table order (oldest created first)
    pub fn ready_in_table_order(&self) -> Vec<Pid> {
        self.ids_in_state(ProcessState::Ready)
    }

    pub fn ids_in_state(&self, state: ProcessState) -> Vec<Pid> {
        self.records()
            .filter(|r| r.state() == state)
            .map(|r| r.id().clone())
            .collect()
    }

    #[inline]
    pub fn ready_len(&self) -> usize {
        self.ready.len()
    }

    #[inline]
    pub fn blocked_len(&self) -> usize {
        self.blocked.len()
    }

    /// Whether any record is Ready, Running or Blocked
    pub fn has_active(&self) -> bool {
        self.running.is_some() || !self.ready.is_empty() || !self.blocked.is_empty()
    }

    /// Ready record with the lowest priority value, earliest arrival on ties
    pub fn lowest_priority_ready(&self) -> Option<Pid> {
        self.ready
            .iter()
            .filter_map(|pid| self.table.get(pid))
            .min_by_key(|r| (r.priority(), r.seq))
            .map(|r| r.id().clone())
    }

    // =========================================================================
    // Guarded transitions
    // =========================================================================

    /// Running|Blocked -> Ready, appended to the back of the ready set
    pub fn enqueue_ready(&mut self, pid: &Pid) -> SimResult<ProcessState> {
        let from = self.guard(pid, ProcessState::Ready)?;
        self.detach(pid, from);
        self.ready.push_back(pid.clone());
        self.set_state(pid, ProcessState::Ready);
        Ok(from)
    }

    /// Ready -> Running, only while the execution slot is free
    pub fn mark_running(&mut self, pid: &Pid) -> SimResult<Transition> {
        let from = self.guard(pid, ProcessState::Running)?;
        if let Some(holder) = self.running.as_ref() {
            warn!(pid = %pid, holder = %holder, "execution slot occupied, process stays ready");
            return Ok(Transition::Contended {
                holder: holder.clone(),
            });
        }

        self.detach(pid, from);
        self.running = Some(pid.clone());
        self.set_state(pid, ProcessState::Running);
        Ok(Transition::Applied)
    }

    /// Running|Ready -> Blocked
    pub fn mark_blocked(&mut self, pid: &Pid) -> SimResult<ProcessState> {
        let from = self.guard(pid, ProcessState::Blocked)?;
        self.detach(pid, from);
        self.blocked.push_back(pid.clone());
        self.set_state(pid, ProcessState::Blocked);
        Ok(from)
    }

    /// Any active state -> Terminated
    ///
    /// Zeroes the remaining time and releases the record's memory.
    /// Returns the previous state and the units freed, if any.
    pub fn mark_terminated(
        &mut self,
        pid: &Pid,
        memory: &mut MemoryAllocator,
    ) -> SimResult<(ProcessState, Option<Units>)> {
        let from = self.guard(pid, ProcessState::Terminated)?;
        self.detach(pid, from);

        let freed = match self.table.get_mut(pid) {
            Some(record) => {
                record.state = ProcessState::Terminated;
                record.remaining_time = 0;
                memory.release(record)
            }
            None => None,
        };
        Ok((from, freed))
    }

    /// Delete a record unconditionally, releasing its memory first
    pub fn remove(
        &mut self,
        pid: &Pid,
        memory: &mut MemoryAllocator,
    ) -> SimResult<(ProcessRecord, Option<Units>)> {
        let state = self.state_of(pid)?;
        self.detach(pid, state);

        let freed = match self.table.get_mut(pid) {
            Some(record) => memory.release(record),
            None => None,
        };
        self.order.retain(|p| p != pid);
        let record = self
            .table
            .remove(pid)
            .ok_or_else(|| SimError::NotFound(pid.clone()))?;
        Ok((record, freed))
    }

    /// Batch-delete every Terminated record
    pub fn remove_all_terminated(&mut self, memory: &mut MemoryAllocator) -> Vec<Pid> {
        let terminated = self.ids_in_state(ProcessState::Terminated);
        for pid in &terminated {
            // Terminated records hold nothing; release is a no-op safety net
            let _ = self.remove(pid, memory);
        }
        terminated
    }

    /// Delete every record
    pub fn clear(&mut self, memory: &mut MemoryAllocator) -> usize {
        let count = self.table.len();
        for record in self.table.values_mut() {
            memory.release(record);
        }
        self.table.clear();
        self.order.clear();
        self.ready.clear();
        self.blocked.clear();
        self.running = None;
        count
    }

    /// Drop any Terminated id still referenced by a set
    ///
    /// Returns how many stale entries were removed; always zero while the
    /// transition functions are the only writers.
    pub fn purge_terminated(&mut self) -> usize {
        let table = &self.table;
        let is_live = |pid: &Pid| table.get(pid).is_some_and(|r| r.state().is_active());

        let before = self.ready.len() + self.blocked.len() + usize::from(self.running.is_some());
        self.ready.retain(|pid| is_live(pid));
        self.blocked.retain(|pid| is_live(pid));
        if self.running.as_ref().is_some_and(|pid| !is_live(pid)) {
            self.running = None;
        }
        let after = self.ready.len() + self.blocked.len() + usize::from(self.running.is_some());
        before - after
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn guard(&self, pid: &Pid, to: ProcessState) -> SimResult<ProcessState> {
        let from = self.state_of(pid)?;
        if !from.can_transition(to) {
            return Err(SimError::InvalidTransition {
                pid: pid.clone(),
                from,
                to,
            });
        }
        Ok(from)
    }

    /// Remove `pid` from the set matching its current state
    fn detach(&mut self, pid: &Pid, state: ProcessState) {
        match state {
            ProcessState::Ready => remove_from(&mut self.ready, pid),
            ProcessState::Blocked => remove_from(&mut self.blocked, pid),
            ProcessState::Running => {
                if self.running.as_ref() == Some(pid) {
                    self.running = None;
                }
            }
            ProcessState::Terminated => {}
        }
    }

    fn set_state(&mut self, pid: &Pid, state: ProcessState) {
        if let Some(record) = self.table.get_mut(pid) {
            record.state = state;
        }
    }
}

fn remove_from(queue: &mut VecDeque<Pid>, pid: &Pid) {
    if let Some(pos) = queue.iter().position(|p| p == pid) {
        queue.remove(pos);
    }
}
