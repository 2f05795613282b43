//! Registry of provisioned agent handles.
//!
//! Owns exactly one handle per specialist role, the coordinator handle, and
//! the active conversation thread. Populated once during setup; drained
//! during teardown.

use std::collections::HashMap;

use crate::hosted::ThreadId;

use super::{AgentHandle, Role, SetupError};

#[derive(Debug, Default)]
pub struct AgentRegistry {
    specialists: HashMap<Role, AgentHandle>,
    coordinator: Option<AgentHandle>,
    thread: Option<ThreadId>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a specialist handle. The second registration for a role fails
    /// and never overwrites the first.
    pub fn register(&mut self, role: Role, handle: AgentHandle) -> Result<(), SetupError> {
        if self.specialists.contains_key(&role) {
            return Err(SetupError::DuplicateRole(role));
        }
        self.specialists.insert(role, handle);
        Ok(())
    }

    pub fn get(&self, role: Role) -> Result<&AgentHandle, SetupError> {
        if role == Role::Coordinator {
            return self.coordinator();
        }
        self.specialists
            .get(&role)
            .ok_or_else(|| SetupError::MissingAgents(vec![role]))
    }

    /// Validation gate before delegation wiring: reports every absent role
    /// in one pass, not just the first.
    pub fn require_all(&self, roles: &[Role]) -> Result<(), SetupError> {
        let missing: Vec<Role> = roles
            .iter()
            .copied()
            .filter(|role| !self.specialists.contains_key(role))
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(SetupError::MissingAgents(missing))
        }
    }

    pub fn set_coordinator(&mut self, handle: AgentHandle) -> Result<(), SetupError> {
        if self.coordinator.is_some() {
            return Err(SetupError::DuplicateRole(Role::Coordinator));
        }
        self.coordinator = Some(handle);
        Ok(())
    }

    pub fn coordinator(&self) -> Result<&AgentHandle, SetupError> {
        self.coordinator
            .as_ref()
            .ok_or_else(|| SetupError::MissingAgents(vec![Role::Coordinator]))
    }

    pub fn set_thread(&mut self, thread: ThreadId) {
        self.thread = Some(thread);
    }

    pub fn thread(&self) -> Result<&ThreadId, SetupError> {
        self.thread.as_ref().ok_or(SetupError::MissingThread)
    }

    pub fn specialists(&self) -> impl Iterator<Item = (&Role, &AgentHandle)> {
        self.specialists.iter()
    }

    /// Take ownership of everything for teardown. A second call yields
    /// nothing, which makes repeated teardown a no-op.
    pub fn drain(&mut self) -> (Option<AgentHandle>, Vec<AgentHandle>, Option<ThreadId>) {
        let coordinator = self.coordinator.take();
        let specialists = self.specialists.drain().map(|(_, h)| h).collect();
        let thread = self.thread.take();
        (coordinator, specialists, thread)
    }
}
