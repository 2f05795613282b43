//! Task execution protocol.
//!
//! One call submits a user message, waits on the coordinator run with a
//! wall-clock ceiling, classifies the terminal state, and renders a single
//! human-readable result string. These results go straight to an end user
//! waiting on a multi-minute operation, so every branch must produce a
//! usable message even when diagnostics fail: step retrieval is
//! best-effort and never escalates, and no raw transport fault leaks out.

use std::time::Duration;

use uuid::Uuid;

use crate::hosted::{AgentId, AgentsService, Run, RunOutcome, RunStatus, StepStatus, ThreadId};

use super::extract::extract_final_reply;

/// Terminal classification of one task, used as a log tag; the caller-facing
/// contract is a plain string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TaskOutcome {
    Completed,
    Failed,
    RequiresAction,
    Cancelled,
    Expired,
    TimedOut,
    SubmissionFailed,
}

impl TaskOutcome {
    fn tag(&self) -> &'static str {
        match self {
            TaskOutcome::Completed => "completed",
            TaskOutcome::Failed => "failed",
            TaskOutcome::RequiresAction => "requires_action",
            TaskOutcome::Cancelled => "cancelled",
            TaskOutcome::Expired => "expired",
            TaskOutcome::TimedOut => "timed_out",
            TaskOutcome::SubmissionFailed => "submission_failed",
        }
    }
}

/// Run one task end-to-end against the coordinator and render the outcome.
pub(crate) async fn execute(
    service: &dyn AgentsService,
    thread: &ThreadId,
    coordinator: &AgentId,
    ceiling: Duration,
    user_text: &str,
) -> String {
    let task_id = Uuid::new_v4();
    tracing::info!(%task_id, "processing task: {}", preview(user_text));

    // Submitted: the user turn goes onto the thread first.
    if let Err(e) = service.append_user_message(thread, user_text).await {
        tracing::error!(%task_id, outcome = TaskOutcome::SubmissionFailed.tag(), "could not submit user message: {}", e);
        return format!("Could not submit the request to the coordinator: {}", e);
    }

    // Running: the hosted service drives delegation; we only observe.
    tracing::info!(%task_id, "coordinator is orchestrating specialist agents");
    let run = match service.run_to_terminal(thread, coordinator, ceiling).await {
        Ok(RunOutcome::Terminal(run)) => run,
        Ok(RunOutcome::DeadlineExceeded) => {
            // The run is abandoned, not cancelled; the service cleans it up.
            tracing::warn!(%task_id, outcome = TaskOutcome::TimedOut.tag(), "run exceeded the {}s ceiling", ceiling.as_secs());
            return format!(
                "Task timed out after {} seconds - a specialist agent took too long to respond",
                ceiling.as_secs()
            );
        }
        Err(e) => {
            tracing::error!(%task_id, outcome = TaskOutcome::Failed.tag(), "error while waiting on run: {}", e);
            return format!("Error during task execution: {}", e);
        }
    };

    match run.status {
        RunStatus::Completed => {
            tracing::info!(%task_id, outcome = TaskOutcome::Completed.tag(), run = %run.id, "task completed");
            render_completed(service, thread, &task_id).await
        }
        RunStatus::Failed => {
            let run_error = run
                .last_error
                .as_ref()
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown error".to_string());
            tracing::error!(%task_id, outcome = TaskOutcome::Failed.tag(), run = %run.id, "task failed: {}", run_error);
            let mut message = format!("Task failed: {}", run_error);
            if let Some(step_error) = step_diagnostics(service, thread, &run).await {
                message.push_str(&format!(" ({})", step_error));
            }
            message
        }
        RunStatus::RequiresAction => {
            // A stuck or unapproved tool invocation. This client has no
            // approval path, so report and give up in one shot rather than
            // blocking past the ceiling.
            tracing::warn!(%task_id, outcome = TaskOutcome::RequiresAction.tag(), run = %run.id, "run requires an action this client cannot supply");
            let mut message = String::from(
                "Task is stuck waiting on a tool action that requires approval; \
                 this client cannot supply it and gave up",
            );
            if let Some(step_error) = step_diagnostics(service, thread, &run).await {
                message.push_str(&format!(" ({})", step_error));
            }
            message
        }
        RunStatus::Cancelled | RunStatus::Expired => {
            let outcome = if run.status == RunStatus::Cancelled {
                TaskOutcome::Cancelled
            } else {
                TaskOutcome::Expired
            };
            tracing::warn!(%task_id, outcome = outcome.tag(), run = %run.id, "task did not complete");
            format!("Task was {}", run.status)
        }
        // A non-terminal status from a terminal wait is a service contract
        // violation; report it the same way as an unknown terminal state.
        other => {
            tracing::warn!(%task_id, run = %run.id, "task ended with unexpected status {}", other);
            format!("Task ended with status: {}", other)
        }
    }
}

async fn render_completed(
    service: &dyn AgentsService,
    thread: &ThreadId,
    task_id: &Uuid,
) -> String {
    let messages = match service.list_messages(thread).await {
        Ok(messages) => messages,
        Err(e) => {
            tracing::error!(%task_id, "error retrieving thread messages: {}", e);
            return format!("Error retrieving final response: {}", e);
        }
    };
    tracing::debug!(%task_id, "found {} messages in thread", messages.len());

    let reply = extract_final_reply(&messages);
    if !reply.found {
        tracing::warn!(%task_id, "run completed but the thread holds no agent reply");
        return "The task completed but no agent response was found in the conversation"
            .to_string();
    }
    reply.text
}

/// Best-effort step diagnostics for a non-success run: the first failed
/// step's error, if any. Retrieval failures degrade to `None` and never
/// escalate past this function.
async fn step_diagnostics(
    service: &dyn AgentsService,
    thread: &ThreadId,
    run: &Run,
) -> Option<String> {
    let steps = match service.list_run_steps(thread, &run.id).await {
        Ok(steps) => steps,
        Err(e) => {
            tracing::warn!(run = %run.id, "could not retrieve run steps: {}", e);
            return None;
        }
    };
    steps
        .iter()
        .find(|step| step.status == StepStatus::Failed)
        .and_then(|step| {
            step.last_error
                .as_ref()
                .map(|error| format!("first failed step was {}: {}", step.kind, error))
        })
}

fn preview(text: &str) -> String {
    const MAX: usize = 80;
    if text.chars().count() <= MAX {
        text.to_string()
    } else {
        let cut: String = text.chars().take(MAX).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::PathBuf;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::hosted::{
        AgentsServiceError, MessageAuthor, MessagePart, RunError, RunId, RunStep, StepKind,
        ThreadMessage, VectorStoreId,
    };

    /// Scripted hosted service: answers the run wait from a queue and
    /// records submitted messages.
    struct ScriptedService {
        run_results: Mutex<Vec<Result<RunOutcome, AgentsServiceError>>>,
        steps: Mutex<Result<Vec<RunStep>, AgentsServiceError>>,
        messages: Mutex<Vec<ThreadMessage>>,
        fail_submission: bool,
    }

    impl ScriptedService {
        fn new(run_results: Vec<Result<RunOutcome, AgentsServiceError>>) -> Self {
            Self {
                run_results: Mutex::new(run_results),
                steps: Mutex::new(Ok(Vec::new())),
                messages: Mutex::new(Vec::new()),
                fail_submission: false,
            }
        }

        fn with_steps(self, steps: Result<Vec<RunStep>, AgentsServiceError>) -> Self {
            *self.steps.lock().unwrap() = steps;
            self
        }

        fn with_agent_reply(self, text: &str) -> Self {
            self.messages.lock().unwrap().insert(
                0,
                ThreadMessage {
                    id: "m_agent".to_string(),
                    author: MessageAuthor::Agent,
                    parts: vec![MessagePart::Text {
                        text: text.to_string(),
                    }],
                    created_at: None,
                },
            );
            self
        }
    }

    #[async_trait]
    impl AgentsService for ScriptedService {
        async fn create_agent(
            &self,
            _model: &str,
            _name: &str,
            _instructions: &str,
            _tools: &[crate::hosted::ToolConfig],
        ) -> Result<AgentId, AgentsServiceError> {
            Ok(AgentId("agt".to_string()))
        }

        async fn delete_agent(&self, _id: &AgentId) -> Result<(), AgentsServiceError> {
            Ok(())
        }

        async fn create_thread(&self) -> Result<ThreadId, AgentsServiceError> {
            Ok(ThreadId("thr".to_string()))
        }

        async fn delete_thread(&self, _id: &ThreadId) -> Result<(), AgentsServiceError> {
            Ok(())
        }

        async fn create_vector_store(
            &self,
            _name: &str,
            _files: &[PathBuf],
        ) -> Result<VectorStoreId, AgentsServiceError> {
            Ok(VectorStoreId("vs".to_string()))
        }

        async fn append_user_message(
            &self,
            _thread: &ThreadId,
            text: &str,
        ) -> Result<(), AgentsServiceError> {
            if self.fail_submission {
                return Err(AgentsServiceError::Api {
                    status: 404,
                    body: "thread deleted".to_string(),
                });
            }
            self.messages.lock().unwrap().insert(
                0,
                ThreadMessage {
                    id: "m_user".to_string(),
                    author: MessageAuthor::User,
                    parts: vec![MessagePart::Text {
                        text: text.to_string(),
                    }],
                    created_at: None,
                },
            );
            Ok(())
        }

        async fn list_messages(
            &self,
            _thread: &ThreadId,
        ) -> Result<Vec<ThreadMessage>, AgentsServiceError> {
            Ok(self.messages.lock().unwrap().clone())
        }

        async fn run_to_terminal(
            &self,
            _thread: &ThreadId,
            _agent: &AgentId,
            _deadline: Duration,
        ) -> Result<RunOutcome, AgentsServiceError> {
            self.run_results
                .lock()
                .unwrap()
                .remove(0)
        }

        async fn list_run_steps(
            &self,
            _thread: &ThreadId,
            _run: &RunId,
        ) -> Result<Vec<RunStep>, AgentsServiceError> {
            match &*self.steps.lock().unwrap() {
                Ok(steps) => Ok(steps.clone()),
                Err(_) => Err(AgentsServiceError::Network("steps unavailable".to_string())),
            }
        }
    }

    fn terminal(status: RunStatus, last_error: Option<RunError>) -> Result<RunOutcome, AgentsServiceError> {
        Ok(RunOutcome::Terminal(Run {
            id: RunId("run_1".to_string()),
            status,
            last_error,
        }))
    }

    fn failed_step(message: &str) -> RunStep {
        RunStep {
            id: "step_1".to_string(),
            kind: StepKind::ToolCalls,
            status: StepStatus::Failed,
            last_error: Some(RunError {
                code: Some("tool_error".to_string()),
                message: message.to_string(),
            }),
        }
    }

    #[tokio::test]
    async fn completed_run_returns_the_agent_reply() {
        let service = ScriptedService::new(vec![terminal(RunStatus::Completed, None)])
            .with_agent_reply("Q3 tent sales in Europe were 1.2M");

        let result = execute(
            &service,
            &ThreadId("thr".into()),
            &AgentId("agt".into()),
            Duration::from_secs(300),
            "What were Q3 tent sales in Europe?",
        )
        .await;
        assert_eq!(result, "Q3 tent sales in Europe were 1.2M");
    }

    #[tokio::test]
    async fn timeout_reports_and_orchestrator_stays_usable() {
        let service = ScriptedService::new(vec![
            Ok(RunOutcome::DeadlineExceeded),
            terminal(RunStatus::Completed, None),
        ])
        .with_agent_reply("late answer");

        let thread = ThreadId("thr".into());
        let agent = AgentId("agt".into());

        let first = execute(&service, &thread, &agent, Duration::from_secs(1), "slow question").await;
        assert!(first.contains("timed out"));

        // A subsequent task on the same orchestrator still works.
        let second = execute(&service, &thread, &agent, Duration::from_secs(1), "retry").await;
        assert_eq!(second, "late answer");
    }

    #[tokio::test]
    async fn failed_run_surfaces_step_error() {
        let service = ScriptedService::new(vec![terminal(
            RunStatus::Failed,
            Some(RunError {
                code: None,
                message: "delegation crashed".to_string(),
            }),
        )])
        .with_steps(Ok(vec![failed_step("sales API returned 500")]));

        let result = execute(
            &service,
            &ThreadId("thr".into()),
            &AgentId("agt".into()),
            Duration::from_secs(300),
            "q",
        )
        .await;
        assert!(result.contains("Task failed: delegation crashed"));
        assert!(result.contains("sales API returned 500"));
    }

    #[tokio::test]
    async fn step_retrieval_failure_degrades_to_run_error_only() {
        let service = ScriptedService::new(vec![terminal(
            RunStatus::Failed,
            Some(RunError {
                code: None,
                message: "delegation crashed".to_string(),
            }),
        )])
        .with_steps(Err(AgentsServiceError::Network("down".to_string())));

        let result = execute(
            &service,
            &ThreadId("thr".into()),
            &AgentId("agt".into()),
            Duration::from_secs(300),
            "q",
        )
        .await;
        assert!(result.contains("Task failed: delegation crashed"));
        assert!(!result.contains("first failed step"));
    }

    #[tokio::test]
    async fn requires_action_reports_without_blocking() {
        let service = ScriptedService::new(vec![terminal(RunStatus::RequiresAction, None)])
            .with_steps(Ok(vec![failed_step("unapproved tool call")]));

        let result = execute(
            &service,
            &ThreadId("thr".into()),
            &AgentId("agt".into()),
            Duration::from_secs(300),
            "q",
        )
        .await;
        assert!(result.contains("stuck waiting on a tool action"));
        assert!(result.contains("unapproved tool call"));
    }

    #[tokio::test]
    async fn cancelled_and_expired_report_status_verbatim() {
        for (status, expected) in [
            (RunStatus::Cancelled, "Task was cancelled"),
            (RunStatus::Expired, "Task was expired"),
        ] {
            let service = ScriptedService::new(vec![terminal(status, None)]);
            let result = execute(
                &service,
                &ThreadId("thr".into()),
                &AgentId("agt".into()),
                Duration::from_secs(300),
                "q",
            )
            .await;
            assert_eq!(result, expected);
        }
    }

    #[tokio::test]
    async fn transport_error_during_wait_is_rendered_not_raised() {
        let service = ScriptedService::new(vec![Err(AgentsServiceError::Network(
            "connection reset".to_string(),
        ))]);

        let result = execute(
            &service,
            &ThreadId("thr".into()),
            &AgentId("agt".into()),
            Duration::from_secs(300),
            "q",
        )
        .await;
        assert!(result.contains("Error during task execution"));
        assert!(result.contains("connection reset"));
    }

    #[tokio::test]
    async fn submission_failure_is_rendered() {
        let mut service = ScriptedService::new(vec![]);
        service.fail_submission = true;

        let result = execute(
            &service,
            &ThreadId("thr".into()),
            &AgentId("agt".into()),
            Duration::from_secs(300),
            "q",
        )
        .await;
        assert!(result.contains("Could not submit the request"));
    }

    #[tokio::test]
    async fn completed_run_with_no_agent_reply_is_reported_not_raised() {
        let service = ScriptedService::new(vec![terminal(RunStatus::Completed, None)]);

        let result = execute(
            &service,
            &ThreadId("thr".into()),
            &AgentId("agt".into()),
            Duration::from_secs(300),
            "q",
        )
        .await;
        assert!(result.contains("no agent response"));
    }
}
