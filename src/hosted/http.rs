//! HTTP client for the hosted agents service.
//!
//! Thin REST adapter: typed serde bodies, non-2xx responses surfaced with
//! status and body, and a poll loop for the run-to-terminal wait. The service
//! owns all execution; this client only observes state.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::time::Instant;

use super::{
    AgentId, AgentsService, AgentsServiceError, Run, RunId, RunOutcome, RunStep, ThreadId,
    ThreadMessage, ToolConfig, VectorStoreId,
};

pub struct HttpAgentsService {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
    poll_interval: Duration,
}

impl HttpAgentsService {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        poll_interval: Duration,
    ) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            api_key: api_key.into(),
            client: reqwest::Client::new(),
            poll_interval,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn network_error(e: reqwest::Error) -> AgentsServiceError {
        if e.is_timeout() {
            AgentsServiceError::Network(format!("request timeout: {}", e))
        } else if e.is_connect() {
            AgentsServiceError::Network(format!("connection failed: {}", e))
        } else {
            AgentsServiceError::Network(format!("request failed: {}", e))
        }
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, AgentsServiceError> {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(AgentsServiceError::Api {
                status: status.as_u16(),
                body,
            });
        }
        serde_json::from_str(&body)
            .map_err(|e| AgentsServiceError::Parse(format!("{} (body: {})", e, body)))
    }

    async fn check(response: reqwest::Response) -> Result<(), AgentsServiceError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AgentsServiceError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, AgentsServiceError> {
        let response = self
            .client
            .post(self.url(path))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(Self::network_error)?;
        Self::decode(response).await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, AgentsServiceError> {
        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(Self::network_error)?;
        Self::decode(response).await
    }

    async fn delete(&self, path: &str) -> Result<(), AgentsServiceError> {
        let response = self
            .client
            .delete(self.url(path))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(Self::network_error)?;
        Self::check(response).await
    }

    async fn upload_file(&self, path: &std::path::Path) -> Result<String, AgentsServiceError> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| AgentsServiceError::Network(format!("cannot read {:?}: {}", path, e)))?;
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
        let form = reqwest::multipart::Form::new()
            .text("purpose", "agents")
            .part("file", part);
        let response = self
            .client
            .post(self.url("/files"))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(Self::network_error)?;
        let uploaded: UploadedFile = Self::decode(response).await?;
        Ok(uploaded.id)
    }
}

#[async_trait]
impl AgentsService for HttpAgentsService {
    async fn create_agent(
        &self,
        model: &str,
        name: &str,
        instructions: &str,
        tools: &[ToolConfig],
    ) -> Result<AgentId, AgentsServiceError> {
        let body = json!({
            "model": model,
            "name": name,
            "instructions": instructions,
            "tools": tools.iter().map(tool_to_wire).collect::<Vec<_>>(),
        });
        let created: CreatedResource = self.post_json("/agents", &body).await?;
        tracing::debug!("created agent '{}' with id {}", name, created.id);
        Ok(AgentId(created.id))
    }

    async fn delete_agent(&self, id: &AgentId) -> Result<(), AgentsServiceError> {
        self.delete(&format!("/agents/{}", id)).await
    }

    async fn create_thread(&self) -> Result<ThreadId, AgentsServiceError> {
        let created: CreatedResource = self.post_json("/threads", &json!({})).await?;
        Ok(ThreadId(created.id))
    }

    async fn delete_thread(&self, id: &ThreadId) -> Result<(), AgentsServiceError> {
        self.delete(&format!("/threads/{}", id)).await
    }

    async fn create_vector_store(
        &self,
        name: &str,
        files: &[PathBuf],
    ) -> Result<VectorStoreId, AgentsServiceError> {
        let mut file_ids = Vec::with_capacity(files.len());
        for file in files {
            file_ids.push(self.upload_file(file).await?);
        }
        let body = json!({ "name": name, "file_ids": file_ids });
        let created: CreatedResource = self.post_json("/vector_stores", &body).await?;
        tracing::debug!(
            "created vector store '{}' ({} files) with id {}",
            name,
            files.len(),
            created.id
        );
        Ok(VectorStoreId(created.id))
    }

    async fn append_user_message(
        &self,
        thread: &ThreadId,
        text: &str,
    ) -> Result<(), AgentsServiceError> {
        let body = json!({ "role": "user", "content": text });
        let response = self
            .client
            .post(self.url(&format!("/threads/{}/messages", thread)))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(Self::network_error)?;
        Self::check(response).await
    }

    async fn list_messages(
        &self,
        thread: &ThreadId,
    ) -> Result<Vec<ThreadMessage>, AgentsServiceError> {
        let page: Page<ThreadMessage> = self
            .get_json(&format!("/threads/{}/messages?order=desc", thread))
            .await?;
        Ok(page.data)
    }

    async fn run_to_terminal(
        &self,
        thread: &ThreadId,
        agent: &AgentId,
        deadline: Duration,
    ) -> Result<RunOutcome, AgentsServiceError> {
        // The ceiling bounds the whole wait, including requests that never
        // come back, so the poll body runs under an outer timeout. A stalled
        // response or a run that never turns terminal both surface as
        // `DeadlineExceeded`.
        let wait = async {
            let started = Instant::now();
            let body = json!({ "agent_id": agent });
            let mut run: Run = self
                .post_json(&format!("/threads/{}/runs", thread), &body)
                .await?;

            while !run.status.is_terminal() {
                tokio::time::sleep(self.poll_interval).await;
                run = self
                    .get_json(&format!("/threads/{}/runs/{}", thread, run.id))
                    .await?;
            }

            tracing::debug!(
                "run {} reached terminal status {} after {:?}",
                run.id,
                run.status,
                started.elapsed()
            );
            Ok(RunOutcome::Terminal(run))
        };

        match tokio::time::timeout(deadline, wait).await {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::warn!(
                    "no terminal status on thread {} within {:?}, abandoning wait",
                    thread,
                    deadline
                );
                Ok(RunOutcome::DeadlineExceeded)
            }
        }
    }

    async fn list_run_steps(
        &self,
        thread: &ThreadId,
        run: &RunId,
    ) -> Result<Vec<RunStep>, AgentsServiceError> {
        let page: Page<RunStep> = self
            .get_json(&format!("/threads/{}/runs/{}/steps", thread, run))
            .await?;
        Ok(page.data)
    }
}

fn tool_to_wire(tool: &ToolConfig) -> serde_json::Value {
    match tool {
        ToolConfig::OpenApi {
            name,
            description,
            spec,
        } => json!({
            "type": "openapi",
            "openapi": { "name": name, "description": description, "spec": spec },
        }),
        ToolConfig::FileSearch { vector_store_ids } => json!({
            "type": "file_search",
            "file_search": { "vector_store_ids": vector_store_ids },
        }),
        ToolConfig::WebGrounding { connection_id } => json!({
            "type": "web_grounding",
            "web_grounding": { "connection_id": connection_id },
        }),
        ToolConfig::CodeInterpreter => json!({ "type": "code_interpreter" }),
        ToolConfig::ConnectedAgent {
            agent_id,
            name,
            description,
        } => json!({
            "type": "connected_agent",
            "connected_agent": { "id": agent_id, "name": name, "description": description },
        }),
    }
}

#[derive(Debug, Deserialize)]
struct CreatedResource {
    id: String,
}

#[derive(Debug, Deserialize)]
struct UploadedFile {
    id: String,
}

/// Paginated list envelope used by the service's list endpoints.
#[derive(Debug, Serialize, Deserialize)]
struct Page<T> {
    data: Vec<T>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_trailing_slashes_from_base_url() {
        let svc = HttpAgentsService::new("http://localhost:9000///", "key", Duration::from_secs(1));
        assert_eq!(svc.url("/threads"), "http://localhost:9000/threads");
    }

    #[test]
    fn connected_agent_wire_shape() {
        let tool = ToolConfig::ConnectedAgent {
            agent_id: AgentId("agt_1".into()),
            name: "sales_analyst".into(),
            description: "Analyzes sales data".into(),
        };
        let wire = tool_to_wire(&tool);
        assert_eq!(wire["type"], "connected_agent");
        assert_eq!(wire["connected_agent"]["id"], "agt_1");
        assert_eq!(wire["connected_agent"]["name"], "sales_analyst");
    }

    #[test]
    fn page_envelope_decodes_messages() {
        let raw = r#"{"data":[{"id":"m1","role":"agent","content":[{"type":"text","text":"A"}]}]}"#;
        let page: Page<ThreadMessage> = serde_json::from_str(raw).unwrap();
        assert_eq!(page.data.len(), 1);
    }

    #[tokio::test]
    async fn run_wait_gives_up_when_the_service_stalls() {
        // Accepts connections but never writes a byte, so the run-creation
        // request itself hangs.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let svc = HttpAgentsService::new(
            format!("http://{}", addr),
            "key",
            Duration::from_millis(10),
        );
        let started = std::time::Instant::now();
        let outcome = svc
            .run_to_terminal(
                &ThreadId("thr".into()),
                &AgentId("agt".into()),
                Duration::from_millis(250),
            )
            .await
            .unwrap();
        assert!(matches!(outcome, RunOutcome::DeadlineExceeded));
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
