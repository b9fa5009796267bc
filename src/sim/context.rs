/*!
 * Simulation Context
 * Registry, resources and audit trail for one simulator instance
 *
 * Passed explicitly to the scheduler; every transition helper here updates
 * the registry and records the audit event in one step.
 */

use crate::core::types::{Pid, Units};
use crate::core::SimResult;
use crate::ipc::SharedBuffer;
use crate::memory::MemoryAllocator;
use crate::monitoring::{AuditKind, Auditor};
use crate::process::{ProcessRegistry, ProcessState, Transition};
use tracing::{debug, warn};

/// Mutable simulation state
#[derive(Debug)]
pub struct SimContext {
    pub registry: ProcessRegistry,
    pub memory: MemoryAllocator,
    pub buffer: SharedBuffer,
    pub audit: Auditor,
}

impl SimContext {
    pub fn new(memory_capacity: Units, buffer_capacity: Units, audit: Auditor) -> Self {
        Self {
            registry: ProcessRegistry::new(),
            memory: MemoryAllocator::new(memory_capacity),
            buffer: SharedBuffer::new(buffer_capacity),
            audit,
        }
    }

    /// Ready -> Running; contention is logged and audited, not an error
    pub fn start(&mut self, pid: &Pid) -> SimResult<Transition> {
        let transition = self.registry.mark_running(pid)?;
        match &transition {
            Transition::Applied => self.state_changed(pid, ProcessState::Ready, ProcessState::Running),
            Transition::Contended { holder } => {
                self.audit.process(
                    pid,
                    AuditKind::Contention,
                    format!("execution slot held by {}", holder),
                );
            }
        }
        Ok(transition)
    }

    /// Running|Blocked -> Ready
    pub fn make_ready(&mut self, pid: &Pid) -> SimResult<()> {
        let from = self.registry.enqueue_ready(pid)?;
        self.state_changed(pid, from, ProcessState::Ready);
        Ok(())
    }

    /// Running|Ready -> Blocked
    pub fn block(&mut self, pid: &Pid, reason: &str) -> SimResult<()> {
        let from = self.registry.mark_blocked(pid)?;
        debug!(pid = %pid, reason, "process blocked");
        self.audit.process(
            pid,
            AuditKind::StateChanged,
            format!("{} -> {} ({})", from, ProcessState::Blocked, reason),
        );
        Ok(())
    }

    /// Any active state -> Terminated, releasing memory
    pub fn terminate(&mut self, pid: &Pid) -> SimResult<Option<Units>> {
        let (from, freed) = self.registry.mark_terminated(pid, &mut self.memory)?;
        self.state_changed(pid, from, ProcessState::Terminated);
        if let Some(amount) = freed {
            self.audit
                .process(pid, AuditKind::MemoryReleased, format!("freed={:.2}", amount));
        }
        Ok(freed)
    }

    /// Return the whole pool and buffer to their initial levels
    pub(crate) fn reset_resources(&mut self) {
        self.memory.reset();
        self.buffer.clear();
    }

    /// Release every held allocation of a non-terminated record
    pub(crate) fn release_all_memory(&mut self) -> usize {
        let resident: Vec<Pid> = self.memory.stats().resident;
        let mut released = 0;
        for pid in &resident {
            if let Some(record) = self.registry.get_mut(pid) {
                if let Some(amount) = self.memory.release(record) {
                    released += 1;
                    self.audit
                        .process(pid, AuditKind::MemoryReleased, format!("freed={:.2}", amount));
                }
            } else {
                warn!(pid = %pid, "allocation held by unknown process");
            }
        }
        released
    }

    fn state_changed(&self, pid: &Pid, from: ProcessState, to: ProcessState) {
        debug!(pid = %pid, from = %from, to = %to, "state transition");
        self.audit
            .process(pid, AuditKind::StateChanged, format!("{} -> {}", from, to));
    }
}
