/*!
 * System Limits and Constants
 *
 * Centralized location for simulator-wide defaults and generation ranges.
 * Grouped by domain; ranges marked [COMPAT] must not change or
 * generated workloads stop being comparable across seeds.
 */

use super::types::{Priority, TimeUnits, Units};
use std::ops::RangeInclusive;

// =============================================================================
// RESOURCE CAPACITIES
// =============================================================================

/// Default memory pool size (units)
pub const DEFAULT_MEMORY_CAPACITY: Units = 1024.0;

/// Default shared buffer size (units)
pub const DEFAULT_BUFFER_CAPACITY: Units = 500.0;

// =============================================================================
// SCHEDULER
// =============================================================================

/// Default Round-Robin time quantum
pub const DEFAULT_TIME_QUANTUM: TimeUnits = 2;

/// Round-Robin cycles without progress before a run is declared stalled
pub const DEFAULT_IDLE_THRESHOLD: u32 = 3;

/// Consecutive zero-promotion unblock passes that end a FIFO run
pub const FIFO_STALL_PASSES: u32 = 2;

/// Hard bound on cycles in a single scheduling run
pub const DEFAULT_MAX_CYCLES: u64 = 10_000;

// =============================================================================
// PROCESS GENERATION
// =============================================================================

/// Valid priorities, lower is more important
pub const PRIORITY_RANGE: RangeInclusive<Priority> = 1..=10;

/// Generated burst time [COMPAT]
pub const BURST_TIME_RANGE: RangeInclusive<TimeUnits> = 1..=15;

/// Generated memory demand [COMPAT]
pub const MEMORY_DEMAND_RANGE: RangeInclusive<u32> = 64..=256;

/// Hex characters kept from a generated UUID for the process id
pub const PID_LENGTH: usize = 8;

/// Attempts at generating a non-colliding id before widening to the full UUID
pub const PID_RETRIES: usize = 16;
