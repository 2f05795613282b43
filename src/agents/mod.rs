//! Agent roles, the registry that owns their handles, and the delegation
//! wiring that exposes specialists to the coordinator.

pub mod delegation;
pub mod provision;
pub mod registry;

pub use delegation::{Delegation, DelegationSet};
pub use provision::Provisioner;
pub use registry::AgentRegistry;

use std::fmt;

use thiserror::Error;

use crate::hosted::{AgentId, AgentsServiceError};

/// Specialization of an agent. Immutable once assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    SalesAnalyst,
    MarketResearcher,
    ReportGenerator,
    Coordinator,
}

impl Role {
    /// The three roles the coordinator delegates to.
    pub const SPECIALISTS: [Role; 3] = [
        Role::SalesAnalyst,
        Role::MarketResearcher,
        Role::ReportGenerator,
    ];

    /// Stable snake_case name used for delegation tool names and logging.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Role::SalesAnalyst => "sales_analyst",
            Role::MarketResearcher => "market_researcher",
            Role::ReportGenerator => "report_generator",
            Role::Coordinator => "coordinator",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Role::SalesAnalyst => "Sales Analyst",
            Role::MarketResearcher => "Market Researcher",
            Role::ReportGenerator => "Report Generator",
            Role::Coordinator => "Coordinator",
        }
    }

    /// File under the instructions directory holding this role's prompt.
    pub fn instructions_file(&self) -> &'static str {
        match self {
            Role::SalesAnalyst => "sales_analyst.txt",
            Role::MarketResearcher => "market_researcher.txt",
            Role::ReportGenerator => "report_generator.txt",
            Role::Coordinator => "coordinator.txt",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Handle to a provisioned agent. Created once during setup, revoked during
/// teardown, never mutated.
#[derive(Debug, Clone)]
pub struct AgentHandle {
    pub id: AgentId,
    pub name: String,
    pub role: Role,
}

impl AgentHandle {
    pub fn new(id: AgentId, name: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            name: name.into(),
            role,
        }
    }
}

/// Fatal initialization errors. Setup fails fast; nothing is silently
/// skipped.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("role {0} is already registered")]
    DuplicateRole(Role),

    #[error("missing agents for roles: {}", join_roles(.0))]
    MissingAgents(Vec<Role>),

    #[error("duplicate delegation name: {0}")]
    DuplicateDelegationName(String),

    #[error("conversation thread has not been created")]
    MissingThread,

    #[error("failed to read {path}: {source}")]
    AssetRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid sales API spec at {path}: {reason}")]
    InvalidApiSpec { path: String, reason: String },

    #[error(transparent)]
    Service(#[from] AgentsServiceError),
}

fn join_roles(roles: &[Role]) -> String {
    roles
        .iter()
        .map(Role::wire_name)
        .collect::<Vec<_>>()
        .join(", ")
}
