//! Hosted agents-service abstraction.
//!
//! All agent state (agent definitions, conversation threads, run execution,
//! tool invocation) lives in an external managed service. This module defines
//! the minimal client surface the orchestrator needs — provisioning, message
//! append/list, run-to-terminal wait, step listing — plus the wire types it
//! exchanges. The HTTP implementation lives in [`http`].

mod http;

pub use http::HttpAgentsService;

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque agent identifier assigned by the hosted service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub String);

/// Opaque conversation-thread identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadId(pub String);

/// Opaque run identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub String);

/// Opaque vector-store identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VectorStoreId(pub String);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Who authored a thread message.
///
/// The hosted service labels agent turns either `agent` or `assistant`
/// depending on API version; both map to [`MessageAuthor::Agent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageAuthor {
    User,
    #[serde(alias = "assistant")]
    Agent,
}

/// One content block inside a thread message.
///
/// Only text blocks carry the answer; the service can also attach images or
/// file references, which the result extractor skips.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessagePart {
    Text { text: String },
    #[serde(other)]
    Other,
}

/// A message in a conversation thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadMessage {
    pub id: String,
    #[serde(rename = "role")]
    pub author: MessageAuthor,
    #[serde(rename = "content", default)]
    pub parts: Vec<MessagePart>,
    /// Unix seconds; the service orders messages by creation time.
    #[serde(default)]
    pub created_at: Option<i64>,
}

/// Run status vocabulary of the hosted service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    Completed,
    Failed,
    RequiresAction,
    Cancelled,
    Expired,
}

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunStatus::Completed
                | RunStatus::Failed
                | RunStatus::RequiresAction
                | RunStatus::Cancelled
                | RunStatus::Expired
        )
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunStatus::Queued => "queued",
            RunStatus::InProgress => "in_progress",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
            RunStatus::RequiresAction => "requires_action",
            RunStatus::Cancelled => "cancelled",
            RunStatus::Expired => "expired",
        };
        f.write_str(s)
    }
}

/// Error detail attached by the service to a failed run or step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunError {
    #[serde(default)]
    pub code: Option<String>,
    pub message: String,
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{}: {}", code, self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// One execution of an agent against a thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub id: RunId,
    pub status: RunStatus,
    #[serde(default)]
    pub last_error: Option<RunError>,
}

/// Kind of work a run step performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    ToolCalls,
    MessageCreation,
    #[serde(other)]
    Other,
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StepKind::ToolCalls => "tool_calls",
            StepKind::MessageCreation => "message_creation",
            StepKind::Other => "other",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    InProgress,
    Completed,
    Failed,
    Cancelled,
    Expired,
}

/// Diagnostic record of one step inside a run. Read-only; fetched only when
/// a run ends in a non-success state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStep {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: StepKind,
    pub status: StepStatus,
    #[serde(default)]
    pub last_error: Option<RunError>,
}

/// Tool configuration passed to `create_agent`.
///
/// Closed set of variants rather than trait objects: the service only
/// understands these shapes, and new kinds require a wire-format change
/// anyway.
#[derive(Debug, Clone)]
pub enum ToolConfig {
    /// Schema-driven HTTP tool; the service calls the described API itself.
    OpenApi {
        name: String,
        description: String,
        spec: serde_json::Value,
    },
    /// Retrieval over a previously indexed vector store.
    FileSearch { vector_store_ids: Vec<VectorStoreId> },
    /// Web search grounding through a service-side connection.
    WebGrounding { connection_id: String },
    /// Service-side code execution in an isolated interpreter.
    CodeInterpreter,
    /// Lets a coordinator invoke another agent as if it were a tool.
    ConnectedAgent {
        agent_id: AgentId,
        name: String,
        description: String,
    },
}

/// Outcome of waiting on a run with an explicit deadline.
///
/// Timing out is a distinguished outcome, not an error: the underlying run
/// is abandoned to the service, and the caller reports it as such.
#[derive(Debug)]
pub enum RunOutcome {
    Terminal(Run),
    DeadlineExceeded,
}

#[derive(Debug, Error)]
pub enum AgentsServiceError {
    #[error("network error: {0}")]
    Network(String),
    #[error("service returned HTTP {status}: {body}")]
    Api { status: u16, body: String },
    #[error("failed to parse service response: {0}")]
    Parse(String),
}

/// Client surface of the hosted agents service.
///
/// Implementations must return messages newest-first from `list_messages`;
/// the result extractor depends on that order.
#[async_trait]
pub trait AgentsService: Send + Sync {
    async fn create_agent(
        &self,
        model: &str,
        name: &str,
        instructions: &str,
        tools: &[ToolConfig],
    ) -> Result<AgentId, AgentsServiceError>;

    /// Best-effort teardown target; deleting an already-deleted agent is a
    /// service-side no-op and must not be treated as fatal by callers.
    async fn delete_agent(&self, id: &AgentId) -> Result<(), AgentsServiceError>;

    async fn create_thread(&self) -> Result<ThreadId, AgentsServiceError>;

    async fn delete_thread(&self, id: &ThreadId) -> Result<(), AgentsServiceError>;

    /// Upload the given files and index them into a named vector store.
    async fn create_vector_store(
        &self,
        name: &str,
        files: &[PathBuf],
    ) -> Result<VectorStoreId, AgentsServiceError>;

    async fn append_user_message(
        &self,
        thread: &ThreadId,
        text: &str,
    ) -> Result<(), AgentsServiceError>;

    /// List the thread's messages, newest first.
    async fn list_messages(
        &self,
        thread: &ThreadId,
    ) -> Result<Vec<ThreadMessage>, AgentsServiceError>;

    /// Start a run of `agent` against `thread` and wait until the service
    /// reports a terminal status or `deadline` passes, whichever is first.
    async fn run_to_terminal(
        &self,
        thread: &ThreadId,
        agent: &AgentId,
        deadline: Duration,
    ) -> Result<RunOutcome, AgentsServiceError>;

    async fn list_run_steps(
        &self,
        thread: &ThreadId,
        run: &RunId,
    ) -> Result<Vec<RunStep>, AgentsServiceError>;
}
