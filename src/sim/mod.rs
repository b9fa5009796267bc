/*!
 * Simulator
 *
 * Facade over the process table, both resources and the scheduler. All
 * external operations go through here so every mutation is audited and
 * memory releases trigger an unblock pass.
 */

pub mod builder;
pub mod context;
pub mod snapshot;

pub use builder::SimulatorBuilder;
pub use context::SimContext;
pub use snapshot::Snapshot;

use crate::config::SimConfig;
use crate::core::types::{Pid, Priority, TimeUnits, Units};
use crate::core::{SimError, SimResult};
use crate::ipc::BufferStats;
use crate::memory::MemoryStats;
use crate::monitoring::{AuditEvent, AuditKind, MemorySink};
use crate::process::{ProcessFactory, ProcessKind, ProcessRecord, ProcessSpec, ProcessState, Transition};
use crate::scheduler::{RunReport, Scheduler, SchedulingPolicy, TimeQuantum};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Single-host process scheduling simulator
pub struct Simulator {
    ctx: SimContext,
    factory: ProcessFactory,
    scheduler: Scheduler,
    memory_sink: Option<Arc<MemorySink>>,
}

impl Simulator {
    pub fn builder() -> SimulatorBuilder {
        SimulatorBuilder::new()
    }

    pub fn new(config: SimConfig) -> SimResult<Self> {
        SimulatorBuilder::new().with_config(config).build()
    }

    // =========================================================================
    // Process table
    // =========================================================================

    /// Create a record with random burst time and memory demand
    pub fn create_process(&mut self, kind: ProcessKind, priority: Priority) -> SimResult<Pid> {
        let spec = self.generate_spec(kind, priority)?;
        self.spawn(spec)
    }

    /// Random parameters from the simulator's RNG, without creating a record
    pub fn generate_spec(&mut self, kind: ProcessKind, priority: Priority) -> SimResult<ProcessSpec> {
        self.factory
            .generate_spec(kind, priority)
            .inspect_err(|err| self.creation_rejected(err))
    }

    /// Create a record with explicit parameters
    pub fn spawn(&mut self, spec: ProcessSpec) -> SimResult<Pid> {
        let record = self
            .factory
            .build(&spec, &self.ctx.registry)
            .inspect_err(|err| self.creation_rejected(err))?;
        let pid = self.ctx.registry.insert(record)?.id().clone();

        info!(pid = %pid, kind = %spec.kind, priority = spec.priority, "process created");
        self.ctx.audit.process(
            &pid,
            AuditKind::ProcessCreated,
            format!(
                "kind={} priority={} burst={} memory={:.2}",
                spec.kind, spec.priority, spec.burst_time, spec.memory_demand
            ),
        );
        Ok(pid)
    }

    pub fn get(&self, pid: &Pid) -> Option<&ProcessRecord> {
        self.ctx.registry.get(pid)
    }

    /// Every record in table order
    pub fn processes(&self) -> impl Iterator<Item = &ProcessRecord> + '_ {
        self.ctx.registry.records()
    }

    pub fn len(&self) -> usize {
        self.ctx.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ctx.registry.is_empty()
    }

    /// External transition request, routed through the state machine guards
    ///
    /// Ready -> Running while the slot is occupied is reported as
    /// [`Transition::Contended`], not as an error.
    pub fn set_state(&mut self, pid: &Pid, target: ProcessState) -> SimResult<Transition> {
        let result = match target {
            ProcessState::Running => self.ctx.start(pid),
            ProcessState::Ready => self.ctx.make_ready(pid).map(|_| Transition::Applied),
            ProcessState::Blocked => self
                .ctx
                .block(pid, "external request")
                .map(|_| Transition::Applied),
            ProcessState::Terminated => self.terminate(pid).map(|_| Transition::Applied),
        };

        if let Err(err @ SimError::InvalidTransition { .. }) = &result {
            warn!(pid = %pid, target = %target, "transition rejected");
            self.ctx
                .audit
                .process(pid, AuditKind::TransitionRejected, err.to_string());
        }
        result
    }

    /// Explicit termination; returns the memory freed, if any
    pub fn terminate(&mut self, pid: &Pid) -> SimResult<Option<Units>> {
        let freed = self.ctx.terminate(pid)?;
        info!(pid = %pid, "process terminated");
        if freed.is_some() {
            self.on_release()?;
        }
        Ok(freed)
    }

    /// Delete one record, releasing its memory first
    pub fn remove(&mut self, pid: &Pid) -> SimResult<ProcessRecord> {
        let (record, freed) = self.ctx.registry.remove(pid, &mut self.ctx.memory)?;
        info!(pid = %pid, state = %record.state(), "process removed");
        self.ctx.audit.process(
            pid,
            AuditKind::ProcessRemoved,
            format!("state={}", record.state()),
        );
        if let Some(amount) = freed {
            self.ctx
                .audit
                .process(pid, AuditKind::MemoryReleased, format!("freed={:.2}", amount));
            self.on_release()?;
        }
        Ok(record)
    }

    /// Delete every Terminated record
    pub fn remove_terminated(&mut self) -> Vec<Pid> {
        let removed = self.ctx.registry.remove_all_terminated(&mut self.ctx.memory);
        if !removed.is_empty() {
            info!(count = removed.len(), "terminated processes removed");
            self.ctx.audit.system(
                AuditKind::TerminatedPurged,
                format!("removed={}", removed.len()),
            );
        }
        removed
    }

    /// Delete every record, empty the buffer and return the pool to full capacity
    pub fn remove_all(&mut self) -> usize {
        let removed = self.ctx.registry.clear(&mut self.ctx.memory);
        self.ctx.reset_resources();
        info!(count = removed, "all processes removed");
        self.ctx
            .audit
            .system(AuditKind::ProcessRemoved, format!("removed={} (all)", removed));
        removed
    }

    // =========================================================================
    // Scheduling
    // =========================================================================

    /// One scheduling run under the current policy
    pub fn run_scheduler(&mut self) -> SimResult<RunReport> {
        self.scheduler.run(&mut self.ctx)
    }

    /// FIFO memory admission of Ready Normal records without dispatching
    pub fn admit_ready(&mut self) -> usize {
        self.scheduler.admit(&mut self.ctx)
    }

    pub fn is_deadlocked(&self) -> bool {
        self.scheduler.detector().is_deadlocked(&self.ctx)
    }

    /// Switch policy between runs
    ///
    /// A Running record goes back to Ready. Moving to a per-slice policy
    /// releases every held allocation.
    pub fn set_policy(&mut self, policy: SchedulingPolicy) -> SimResult<()> {
        let previous = self.scheduler.policy();
        if previous == policy {
            return Ok(());
        }

        if let Some(pid) = self.ctx.registry.running().cloned() {
            self.ctx.make_ready(&pid)?;
        }
        self.scheduler = self.rebuild_scheduler(policy, self.scheduler.quantum());
        if policy.memory_holding() != previous.memory_holding() {
            let released = self.ctx.release_all_memory();
            debug!(released, "held allocations released on policy change");
        }

        info!(from = %previous, to = %policy, "scheduling policy changed");
        self.ctx.audit.system(
            AuditKind::ConfigChanged,
            format!("policy {} -> {}", previous, policy),
        );
        Ok(())
    }

    pub fn set_quantum(&mut self, units: TimeUnits) -> SimResult<()> {
        let quantum = TimeQuantum::new(units)?;
        self.scheduler = self.rebuild_scheduler(self.scheduler.policy(), quantum);
        info!(quantum = units, "time quantum changed");
        self.ctx
            .audit
            .system(AuditKind::ConfigChanged, format!("quantum={}", units));
        Ok(())
    }

    #[inline]
    pub fn policy(&self) -> SchedulingPolicy {
        self.scheduler.policy()
    }

    #[inline]
    pub fn quantum(&self) -> TimeQuantum {
        self.scheduler.quantum()
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    pub fn memory_stats(&self) -> MemoryStats {
        self.ctx.memory.stats()
    }

    pub fn buffer_stats(&self) -> BufferStats {
        self.ctx.buffer.stats()
    }

    pub fn snapshot(&self) -> Snapshot {
        let registry = &self.ctx.registry;
        Snapshot {
            policy: self.policy(),
            time_quantum: self.quantum().units(),
            processes: registry.records().cloned().collect(),
            running: registry.running().cloned(),
            ready: registry.ready_ids(),
            blocked: registry.blocked_ids(),
            memory: self.memory_stats(),
            buffer: self.buffer_stats(),
        }
    }

    /// Recorded audit trail; empty unless built with a memory sink
    pub fn audit_events(&self) -> Vec<AuditEvent> {
        self.memory_sink
            .as_ref()
            .map(|sink| sink.events())
            .unwrap_or_default()
    }

    pub fn context(&self) -> &SimContext {
        &self.ctx
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn rebuild_scheduler(&self, policy: SchedulingPolicy, quantum: TimeQuantum) -> Scheduler {
        let current = self.scheduler;
        Scheduler::new(policy, quantum)
            .with_idle_threshold(current.idle_threshold())
            .with_max_cycles(current.max_cycles())
    }

    /// Freed memory may satisfy blocked Normal records
    fn on_release(&mut self) -> SimResult<usize> {
        let promoted = self.scheduler.unblocker().reevaluate(&mut self.ctx)?;
        if promoted > 0 {
            debug!(promoted, "release unblocked processes");
        }
        Ok(promoted)
    }

    fn creation_rejected(&self, err: &SimError) {
        warn!(error = %err, "process creation rejected");
        self.ctx
            .audit
            .system(AuditKind::CreationRejected, err.to_string());
    }
}

impl std::fmt::Debug for Simulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulator")
            .field("policy", &self.policy())
            .field("quantum", &self.quantum().units())
            .field("processes", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sim() -> Simulator {
        Simulator::builder()
            .with_seed(7)
            .with_memory_capacity(1024.0)
            .with_buffer_capacity(100.0)
            .with_memory_sink()
            .build()
            .unwrap()
    }

    #[test]
    fn test_create_random_process() {
        let mut sim = sim();
        let pid = sim.create_process(ProcessKind::Normal, 5).unwrap();
        let record = sim.get(&pid).unwrap();
        assert_eq!(record.state(), ProcessState::Ready);
        assert!((1..=15).contains(&record.burst_time()));
        assert!((64.0..=256.0).contains(&record.memory_demand()));
        assert_eq!(pid.as_str().len(), 8);
    }

    #[test]
    fn test_invalid_priority_rejected_and_audited() {
        let mut sim = sim();
        assert_eq!(
            sim.create_process(ProcessKind::Normal, 0),
            Err(SimError::InvalidPriority(0))
        );
        assert!(sim.is_empty());
        assert!(sim
            .audit_events()
            .iter()
            .any(|e| e.event == AuditKind::CreationRejected));
    }

    #[test]
    fn test_seeded_ids_replay() {
        let mut a = sim();
        let mut b = sim();
        let pa = a.create_process(ProcessKind::Producer, 3).unwrap();
        let pb = b.create_process(ProcessKind::Producer, 3).unwrap();
        assert_eq!(pa, pb);
        assert_eq!(a.get(&pa).unwrap().burst_time(), b.get(&pb).unwrap().burst_time());
    }

    #[test]
    fn test_set_state_contention_and_rejection() {
        let mut sim = sim();
        let a = sim.spawn(ProcessSpec::normal(1, 3, 10.0)).unwrap();
        let b = sim.spawn(ProcessSpec::normal(1, 3, 10.0)).unwrap();

        assert!(sim.set_state(&a, ProcessState::Running).unwrap().is_applied());
        assert_eq!(
            sim.set_state(&b, ProcessState::Running).unwrap(),
            Transition::Contended { holder: a.clone() }
        );
        assert_eq!(sim.get(&b).unwrap().state(), ProcessState::Ready);

        sim.set_state(&a, ProcessState::Terminated).unwrap();
        assert!(matches!(
            sim.set_state(&a, ProcessState::Ready),
            Err(SimError::InvalidTransition { .. })
        ));
        assert!(sim
            .audit_events()
            .iter()
            .any(|e| e.event == AuditKind::TransitionRejected));
    }

    #[test]
    fn test_unknown_pid() {
        let mut sim = sim();
        let ghost = Pid::from("deadbeef");
        assert_eq!(sim.terminate(&ghost), Err(SimError::NotFound(ghost.clone())));
        assert!(matches!(sim.remove(&ghost), Err(SimError::NotFound(_))));
    }

    #[test]
    fn test_terminate_releases_and_unblocks() {
        let mut sim = Simulator::builder()
            .with_seed(1)
            .with_memory_capacity(100.0)
            .build()
            .unwrap();
        let holder = sim.spawn(ProcessSpec::normal(1, 5, 80.0)).unwrap();
        let waiter = sim.spawn(ProcessSpec::normal(1, 5, 50.0)).unwrap();

        assert_eq!(sim.admit_ready(), 1);
        sim.set_state(&waiter, ProcessState::Blocked).unwrap();

        assert_eq!(sim.terminate(&holder).unwrap(), Some(80.0));
        assert_eq!(sim.get(&holder).unwrap().remaining_time(), 0);
        assert_eq!(sim.memory_stats().used, 0.0);
        assert_eq!(sim.get(&waiter).unwrap().state(), ProcessState::Ready);
    }

    #[test]
    fn test_remove_terminated_and_all() {
        let mut sim = sim();
        let done = sim.spawn(ProcessSpec::normal(1, 1, 10.0)).unwrap();
        let live = sim.spawn(ProcessSpec::producer(1, 4, 40.0)).unwrap();
        sim.terminate(&done).unwrap();

        assert_eq!(sim.remove_terminated(), vec![done.clone()]);
        assert!(sim.get(&done).is_none());
        assert!(sim.get(&live).is_some());

        sim.run_scheduler().unwrap();
        assert_eq!(sim.remove_all(), 1);
        assert!(sim.is_empty());
        assert_eq!(sim.buffer_stats().occupied, 0.0);
        assert_eq!(sim.memory_stats().available, 1024.0);
    }

    #[test]
    fn test_set_policy_releases_fifo_holdings() {
        let mut sim = sim();
        let pid = sim.spawn(ProcessSpec::normal(1, 4, 200.0)).unwrap();
        sim.admit_ready();
        sim.set_state(&pid, ProcessState::Running).unwrap();
        assert_eq!(sim.memory_stats().used, 200.0);

        sim.set_policy(SchedulingPolicy::RoundRobin).unwrap();
        assert_eq!(sim.policy(), SchedulingPolicy::RoundRobin);
        assert_eq!(sim.memory_stats().used, 0.0);
        let record = sim.get(&pid).unwrap();
        assert_eq!(record.state(), ProcessState::Ready);
        assert!(!record.in_memory());
    }

    #[test]
    fn test_set_quantum_validated() {
        let mut sim = sim();
        assert_eq!(sim.set_quantum(0), Err(SimError::InvalidQuantum(0)));
        sim.set_quantum(5).unwrap();
        assert_eq!(sim.quantum().units(), 5);
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut sim = sim();
        let pid = sim.spawn(ProcessSpec::consumer(2, 3, 30.0)).unwrap();
        let snapshot = sim.snapshot();
        assert_eq!(snapshot.ready, vec![pid]);
        assert_eq!(snapshot.processes.len(), 1);

        let json = snapshot.to_json_pretty().unwrap();
        assert!(json.contains("\"policy\": \"fifo\""));
        assert!(json.contains("\"kind\": \"consumer\""));
    }
}
