/*!
 * Simulator Builder
 * Builder pattern for Simulator construction
 */

use super::context::SimContext;
use super::Simulator;
use crate::config::SimConfig;
use crate::core::types::{TimeUnits, Units};
use crate::core::SimResult;
use crate::monitoring::{AuditKind, AuditSink, Auditor, FanoutSink, FileSink, MemorySink};
use crate::process::ProcessFactory;
use crate::scheduler::{Scheduler, SchedulingPolicy};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Builder for [`Simulator`]
#[derive(Default)]
pub struct SimulatorBuilder {
    config: SimConfig,
    sinks: Vec<Arc<dyn AuditSink>>,
    memory_sink: Option<Arc<MemorySink>>,
}

impl SimulatorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every setting with `config`
    pub fn with_config(mut self, config: SimConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_policy(mut self, policy: SchedulingPolicy) -> Self {
        self.config.policy = policy;
        self
    }

    /// Validated at [`build`](Self::build)
    pub fn with_quantum(mut self, units: TimeUnits) -> Self {
        self.config.time_quantum = units;
        self
    }

    pub fn with_memory_capacity(mut self, capacity: Units) -> Self {
        self.config.memory_capacity = capacity;
        self
    }

    pub fn with_buffer_capacity(mut self, capacity: Units) -> Self {
        self.config.buffer_capacity = capacity;
        self
    }

    pub fn with_idle_threshold(mut self, idle_threshold: u32) -> Self {
        self.config.idle_threshold = idle_threshold;
        self
    }

    pub fn with_max_cycles(mut self, max_cycles: u64) -> Self {
        self.config.max_cycles = max_cycles;
        self
    }

    /// Deterministic ids and generated workloads
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Add an audit sink; several sinks are fanned out
    pub fn with_audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Keep the audit trail in memory so it can be queried
    pub fn with_memory_sink(mut self) -> Self {
        let sink = Arc::new(MemorySink::new());
        self.sinks.push(sink.clone());
        self.memory_sink = Some(sink);
        self
    }

    /// Append the audit trail to a text file
    pub fn with_audit_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.audit_log = Some(path.into());
        self
    }

    pub fn build(self) -> SimResult<Simulator> {
        let Self {
            config,
            mut sinks,
            memory_sink,
        } = self;
        config.validate()?;

        if let Some(path) = &config.audit_log {
            sinks.push(Arc::new(FileSink::open(path)?));
        }

        let audit = match sinks.len() {
            0 => Auditor::disabled(),
            1 => Auditor::new(sinks.remove(0)),
            _ => Auditor::new(Arc::new(
                sinks
                    .into_iter()
                    .fold(FanoutSink::new(), |fanout, sink| fanout.with(sink)),
            )),
        };

        let factory = match config.seed {
            Some(seed) => ProcessFactory::with_seed(seed),
            None => ProcessFactory::new(),
        };
        let scheduler = Scheduler::new(config.policy, config.quantum()?)
            .with_idle_threshold(config.idle_threshold)
            .with_max_cycles(config.max_cycles);
        let ctx = SimContext::new(config.memory_capacity, config.buffer_capacity, audit);

        info!(
            policy = %config.policy,
            quantum = config.time_quantum,
            memory = config.memory_capacity,
            buffer = config.buffer_capacity,
            seed = ?config.seed,
            "simulator initialized"
        );
        ctx.audit.system(
            AuditKind::SystemStarted,
            format!(
                "policy={} quantum={} memory={:.2} buffer={:.2}",
                config.policy, config.time_quantum, config.memory_capacity, config.buffer_capacity
            ),
        );

        Ok(Simulator {
            ctx,
            factory,
            scheduler,
            memory_sink,
        })
    }
}
