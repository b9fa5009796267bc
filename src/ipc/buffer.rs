/*!
 * Shared Buffer
 * Bounded producer/consumer buffer modelled as a capacity counter
 *
 * `occupied` only moves through an admitted deposit or withdrawal and stays
 * within `[0, capacity]`. Item identity is not tracked: a withdrawal of part
 * of what one producer deposited leaves the remainder in the counter.
 */

use super::types::BufferStats;
use crate::core::types::{approx_le, clamp_level, Units, EPSILON};
use tracing::{debug, info};

/// Shared data buffer
#[derive(Debug, Clone)]
pub struct SharedBuffer {
    capacity: Units,
    occupied: Units,
}

impl SharedBuffer {
    pub fn new(capacity: Units) -> Self {
        info!(capacity, "shared buffer initialized");
        Self {
            capacity,
            occupied: 0.0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> Units {
        self.capacity
    }

    #[inline]
    pub fn occupied(&self) -> Units {
        self.occupied
    }

    #[inline]
    pub fn free(&self) -> Units {
        (self.capacity - self.occupied).max(0.0)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.occupied <= EPSILON
    }

    /// Producer guard: `occupied + amount <= capacity`
    #[inline]
    pub fn can_deposit(&self, amount: Units) -> bool {
        approx_le(self.occupied + amount, self.capacity)
    }

    /// Consumer guard: buffer not empty and `occupied >= amount`
    #[inline]
    pub fn can_withdraw(&self, amount: Units) -> bool {
        !self.is_empty() && approx_le(amount, self.occupied)
    }

    /// Deposit `amount` if it fits; all-or-nothing
    pub fn try_deposit(&mut self, amount: Units) -> bool {
        if !self.can_deposit(amount) {
            return false;
        }
        self.occupied = clamp_level(self.occupied + amount, self.capacity);
        debug!(amount, occupied = self.occupied, "buffer deposit");
        true
    }

    /// Withdraw `amount` if present; all-or-nothing
    pub fn try_withdraw(&mut self, amount: Units) -> bool {
        if !self.can_withdraw(amount) {
            return false;
        }
        self.occupied = clamp_level(self.occupied - amount, self.capacity);
        debug!(amount, occupied = self.occupied, "buffer withdrawal");
        true
    }

    /// Empty the buffer
    pub(crate) fn clear(&mut self) {
        self.occupied = 0.0;
    }

    pub fn stats(&self) -> BufferStats {
        let usage_percentage = if self.capacity > 0.0 {
            (self.occupied / self.capacity) * 100.0
        } else {
            0.0
        };
        BufferStats {
            capacity: self.capacity,
            occupied: self.occupied,
            free: self.free(),
            usage_percentage,
        }
    }
}
