/*!
 * Memory Allocator
 *
 * Fixed-capacity pool of memory units. Two kinds of accounting:
 *
 * - **Held allocations**: `try_acquire` / `release` move a record's whole
 *   `memory_demand` in and out of the pool and flip its `in_memory` flag.
 *   Between dispatch steps `used` equals the sum of held allocations.
 * - **Slice charges**: `try_charge` / `discharge` reserve a proportional
 *   amount for the duration of one dispatch step and must be paired within
 *   that step.
 */

use super::types::MemoryStats;
use crate::core::types::{approx_le, clamp_level, Pid, Units};
use crate::process::ProcessRecord;
use ahash::RandomState;
use std::collections::HashMap;
use tracing::{debug, info};

/// Memory pool
#[derive(Debug, Clone)]
pub struct MemoryAllocator {
    capacity: Units,
    used: Units,
    holdings: HashMap<Pid, Units, RandomState>,
}

impl MemoryAllocator {
    pub fn new(capacity: Units) -> Self {
        info!(capacity, "memory allocator initialized");
        Self {
            capacity,
            used: 0.0,
            holdings: HashMap::default(),
        }
    }

    #[inline]
    pub fn capacity(&self) -> Units {
        self.capacity
    }

    #[inline]
    pub fn used(&self) -> Units {
        self.used
    }

    #[inline]
    pub fn available(&self) -> Units {
        (self.capacity - self.used).max(0.0)
    }

    /// Whether `amount` fits in the free part of the pool
    #[inline]
    pub fn can_fit(&self, amount: Units) -> bool {
        approx_le(amount, self.available())
    }

    /// Sum of held allocations
    pub fn held(&self) -> Units {
        self.holdings.values().sum()
    }

    pub fn holds(&self, pid: &Pid) -> bool {
        self.holdings.contains_key(pid)
    }

    /// Grant `record` its full demand
    ///
    /// No-op success if the record is already resident; no side effects on
    /// failure.
    pub fn try_acquire(&mut self, record: &mut ProcessRecord) -> bool {
        if record.in_memory() {
            return true;
        }

        let demand = record.memory_demand();
        if !self.can_fit(demand) {
            debug!(
                pid = %record.id(),
                demand,
                available = self.available(),
                "memory admission refused"
            );
            return false;
        }

        self.used = clamp_level(self.used + demand, self.capacity);
        self.holdings.insert(record.id().clone(), demand);
        record.set_in_memory(true);
        debug!(pid = %record.id(), demand, used = self.used, "memory acquired");
        true
    }

    /// Return `record`'s allocation to the pool
    ///
    /// Returns the units freed, `None` if nothing was held.
    pub fn release(&mut self, record: &mut ProcessRecord) -> Option<Units> {
        if !record.in_memory() {
            return None;
        }

        record.set_in_memory(false);
        let amount = self
            .holdings
            .remove(record.id())
            .unwrap_or_else(|| record.memory_demand());
        self.used = clamp_level(self.used - amount, self.capacity);
        debug!(pid = %record.id(), amount, used = self.used, "memory released");
        Some(amount)
    }

    /// Reserve `amount` for the current dispatch step
    pub fn try_charge(&mut self, amount: Units) -> bool {
        if !self.can_fit(amount) {
            return false;
        }
        self.used = clamp_level(self.used + amount, self.capacity);
        true
    }

    /// Return a slice reserved with [`try_charge`](Self::try_charge)
    pub fn discharge(&mut self, amount: Units) {
        self.used = clamp_level(self.used - amount, self.capacity);
    }

    /// Forget every allocation; callers must clear residency flags themselves
    pub(crate) fn reset(&mut self) {
        self.holdings.clear();
        self.used = 0.0;
    }

    pub fn stats(&self) -> MemoryStats {
        let mut resident: Vec<Pid> = self.holdings.keys().cloned().collect();
        resident.sort();
        let usage_percentage = if self.capacity > 0.0 {
            (self.used / self.capacity) * 100.0
        } else {
            0.0
        };

        MemoryStats {
            capacity: self.capacity,
            used: self.used,
            available: self.available(),
            usage_percentage,
            resident,
        }
    }
}
