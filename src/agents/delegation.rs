//! Delegation wiring for the coordinator.
//!
//! A delegation tells the coordinator what a specialist does and how to
//! address it. Built once before the coordinator agent is created; the
//! coordinator's tool set is fixed for its lifetime.

use crate::hosted::{AgentId, ToolConfig};

use super::{AgentHandle, SetupError};

/// Immutable description of one specialist available to the coordinator.
#[derive(Debug, Clone)]
pub struct Delegation {
    pub agent: AgentId,
    pub name: String,
    pub description: String,
}

impl Delegation {
    /// Pure constructor; no service calls, no validation beyond ownership.
    pub fn new(
        handle: &AgentHandle,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            agent: handle.id.clone(),
            name: name.into(),
            description: description.into(),
        }
    }

    pub fn into_tool(self) -> ToolConfig {
        ToolConfig::ConnectedAgent {
            agent_id: self.agent,
            name: self.name,
            description: self.description,
        }
    }
}

/// The set of delegations attached to one coordinator. Invocation names
/// must be unique within the set.
#[derive(Debug, Default)]
pub struct DelegationSet {
    items: Vec<Delegation>,
}

impl DelegationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, delegation: Delegation) -> Result<(), SetupError> {
        if self.items.iter().any(|d| d.name == delegation.name) {
            return Err(SetupError::DuplicateDelegationName(delegation.name));
        }
        self.items.push(delegation);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_tools(self) -> Vec<ToolConfig> {
        self.items.into_iter().map(Delegation::into_tool).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::Role;

    fn handle(id: &str) -> AgentHandle {
        AgentHandle::new(AgentId(id.to_string()), "Sales Analyst", Role::SalesAnalyst)
    }

    #[test]
    fn duplicate_invocation_name_is_rejected() {
        let mut set = DelegationSet::new();
        set.push(Delegation::new(&handle("a1"), "sales_analyst", "queries sales data"))
            .unwrap();

        let err = set
            .push(Delegation::new(&handle("a2"), "sales_analyst", "another"))
            .unwrap_err();
        assert!(matches!(err, SetupError::DuplicateDelegationName(name) if name == "sales_analyst"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn delegations_convert_to_connected_agent_tools() {
        let mut set = DelegationSet::new();
        set.push(Delegation::new(&handle("a1"), "sales_analyst", "queries sales data"))
            .unwrap();

        let tools = set.into_tools();
        assert_eq!(tools.len(), 1);
        match &tools[0] {
            ToolConfig::ConnectedAgent { agent_id, name, .. } => {
                assert_eq!(agent_id.0, "a1");
                assert_eq!(name, "sales_analyst");
            }
            other => panic!("unexpected tool: {other:?}"),
        }
    }
}
