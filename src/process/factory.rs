/*!
 * Process Factory
 * Id assignment and random workload generation
 *
 * Ids and generated parameters come from one seedable RNG so a run can be
 * replayed from its seed.
 */

use super::registry::ProcessRegistry;
use super::types::{ProcessKind, ProcessRecord, ProcessSpec};
use super::validation::{validate_priority, validate_spec};
use crate::core::limits::{BURST_TIME_RANGE, MEMORY_DEMAND_RANGE, PID_LENGTH, PID_RETRIES};
use crate::core::types::{Pid, Priority, Units};
use crate::core::SimResult;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

/// Builds new process records
#[derive(Debug)]
pub struct ProcessFactory {
    rng: StdRng,
}

impl ProcessFactory {
    /// Factory seeded from OS entropy
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic factory
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Random burst time and memory demand for `kind`
    pub fn generate_spec(&mut self, kind: ProcessKind, priority: Priority) -> SimResult<ProcessSpec> {
        validate_priority(priority)?;
        let burst_time = self.rng.gen_range(BURST_TIME_RANGE);
        let memory_demand = Units::from(self.rng.gen_range(MEMORY_DEMAND_RANGE));
        Ok(ProcessSpec::new(kind, priority, burst_time, memory_demand))
    }

    /// Validated record with a fresh id unique within `registry`
    pub fn build(&mut self, spec: &ProcessSpec, registry: &ProcessRegistry) -> SimResult<ProcessRecord> {
        validate_spec(spec)?;
        let pid = self.next_pid(registry);
        Ok(ProcessRecord::new(pid, spec))
    }

    /// Short UUID-derived id; falls back to the full UUID after repeated collisions
    pub fn next_pid(&mut self, registry: &ProcessRegistry) -> Pid {
        for _ in 0..PID_RETRIES {
            let uuid = self.next_uuid();
            let simple = uuid.simple().to_string();
            let pid = Pid::new(&simple[..PID_LENGTH]);
            if !registry.contains(&pid) {
                return pid;
            }
        }

        loop {
            let pid = Pid::new(self.next_uuid().simple().to_string());
            if !registry.contains(&pid) {
                return pid;
            }
        }
    }

    fn next_uuid(&mut self) -> Uuid {
        let bytes: [u8; 16] = self.rng.gen();
        uuid::Builder::from_random_bytes(bytes).into_uuid()
    }
}

impl Default for ProcessFactory {
    fn default() -> Self {
        Self::new()
    }
}
