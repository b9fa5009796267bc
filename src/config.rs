/*!
 * Simulator Configuration
 *
 * Defaults, JSON file loading and `PROCSIM_*` environment overrides.
 */

use crate::core::limits::{
    DEFAULT_BUFFER_CAPACITY, DEFAULT_IDLE_THRESHOLD, DEFAULT_MAX_CYCLES, DEFAULT_MEMORY_CAPACITY,
    DEFAULT_TIME_QUANTUM,
};
use crate::core::types::{TimeUnits, Units};
use crate::core::{SimError, SimResult};
use crate::scheduler::{SchedulingPolicy, TimeQuantum};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

pub const POLICY_ENV: &str = "PROCSIM_POLICY";
pub const QUANTUM_ENV: &str = "PROCSIM_QUANTUM";
pub const MEMORY_ENV: &str = "PROCSIM_MEMORY";
pub const BUFFER_ENV: &str = "PROCSIM_BUFFER";
pub const IDLE_THRESHOLD_ENV: &str = "PROCSIM_IDLE_THRESHOLD";
pub const MAX_CYCLES_ENV: &str = "PROCSIM_MAX_CYCLES";
pub const SEED_ENV: &str = "PROCSIM_SEED";
pub const AUDIT_LOG_ENV: &str = "PROCSIM_AUDIT_LOG";

/// Settings applied before a scheduling run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub policy: SchedulingPolicy,
    pub time_quantum: TimeUnits,
    pub memory_capacity: Units,
    pub buffer_capacity: Units,
    /// Round-Robin cycles without progress before the run stalls
    pub idle_threshold: u32,
    /// Safety bound on cycles per run
    pub max_cycles: u64,
    /// RNG seed for ids and generated workloads; entropy when absent
    pub seed: Option<u64>,
    /// Append-only audit log file
    pub audit_log: Option<PathBuf>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            policy: SchedulingPolicy::default(),
            time_quantum: DEFAULT_TIME_QUANTUM,
            memory_capacity: DEFAULT_MEMORY_CAPACITY,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            idle_threshold: DEFAULT_IDLE_THRESHOLD,
            max_cycles: DEFAULT_MAX_CYCLES,
            seed: None,
            audit_log: None,
        }
    }
}

impl SimConfig {
    /// Defaults overlaid with the process environment
    pub fn from_env() -> SimResult<Self> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Parse a JSON file; missing fields take their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> SimResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        debug!(path = %path.display(), "configuration loaded");
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from `lookup` (keyed by the `PROCSIM_*` names)
    pub fn with_overrides<F>(mut self, lookup: F) -> SimResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(POLICY_ENV) {
            self.policy = value.parse()?;
        }
        if let Some(value) = lookup(QUANTUM_ENV) {
            self.time_quantum = parse_var(QUANTUM_ENV, &value)?;
        }
        if let Some(value) = lookup(MEMORY_ENV) {
            self.memory_capacity = parse_var(MEMORY_ENV, &value)?;
        }
        if let Some(value) = lookup(BUFFER_ENV) {
            self.buffer_capacity = parse_var(BUFFER_ENV, &value)?;
        }
        if let Some(value) = lookup(IDLE_THRESHOLD_ENV) {
            self.idle_threshold = parse_var(IDLE_THRESHOLD_ENV, &value)?;
        }
        if let Some(value) = lookup(MAX_CYCLES_ENV) {
            self.max_cycles = parse_var(MAX_CYCLES_ENV, &value)?;
        }
        if let Some(value) = lookup(SEED_ENV) {
            self.seed = Some(parse_var(SEED_ENV, &value)?);
        }
        if let Some(value) = lookup(AUDIT_LOG_ENV) {
            if !value.trim().is_empty() {
                self.audit_log = Some(PathBuf::from(value));
            }
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> SimResult<()> {
        TimeQuantum::new(self.time_quantum)?;
        validate_capacity("memory", self.memory_capacity)?;
        validate_capacity("buffer", self.buffer_capacity)?;
        if self.idle_threshold == 0 {
            return Err(SimError::InvalidConfig(
                "idle_threshold must be greater than zero".into(),
            ));
        }
        if self.max_cycles == 0 {
            return Err(SimError::InvalidConfig(
                "max_cycles must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Validated quantum
    pub fn quantum(&self) -> SimResult<TimeQuantum> {
        TimeQuantum::new(self.time_quantum)
    }
}

fn validate_capacity(resource: &'static str, value: Units) -> SimResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(SimError::InvalidCapacity { resource, value });
    }
    Ok(())
}

fn parse_var<T: FromStr>(key: &str, value: &str) -> SimResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| SimError::InvalidConfig(format!("{} has invalid value '{}'", key, value)))
}
