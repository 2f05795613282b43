//! Multi-agent orchestrator.
//!
//! Owns the provisioned crew for one session: initialization builds the
//! specialists, the coordinator, and the conversation thread; each call to
//! [`Orchestrator::execute_complex_task`] runs the task execution protocol
//! end-to-end; teardown revokes everything best-effort.
//!
//! One task is in flight at a time. Running two tasks concurrently against
//! the same thread interleaves messages in undefined order, so the
//! orchestrator takes `&mut self` for execution.

mod extract;
mod protocol;

pub use extract::{extract_final_reply, FinalReply};

use std::sync::Arc;

use futures::future::join_all;

use crate::agents::{AgentRegistry, Provisioner, SetupError};
use crate::config::Config;
use crate::hosted::AgentsService;

pub struct Orchestrator {
    service: Arc<dyn AgentsService>,
    config: Config,
    registry: AgentRegistry,
}

impl Orchestrator {
    /// Provision the crew and open the conversation thread.
    ///
    /// Fails fast: any provisioning error aborts initialization before a
    /// run is ever attempted.
    pub async fn initialize(
        service: Arc<dyn AgentsService>,
        config: Config,
    ) -> Result<Self, SetupError> {
        let registry = Provisioner::new(service.as_ref(), &config).provision().await?;
        tracing::info!("all agents initialized");
        Ok(Self {
            service,
            config,
            registry,
        })
    }

    /// Execute one complex task through the coordinator and return a single
    /// human-readable result. Never fails: every terminal state, including
    /// timeouts and transport errors, is rendered as a descriptive string.
    pub async fn execute_complex_task(&mut self, user_text: &str) -> String {
        let (thread, coordinator) = match (self.registry.thread(), self.registry.coordinator()) {
            (Ok(thread), Ok(coordinator)) => (thread.clone(), coordinator.id.clone()),
            (thread, coordinator) => {
                let error = thread.err().or(coordinator.err()).map(|e| e.to_string());
                tracing::error!(
                    "task rejected, orchestrator is not initialized: {}",
                    error.as_deref().unwrap_or("unknown")
                );
                return "The orchestrator is not initialized; no coordinator is available"
                    .to_string();
            }
        };

        protocol::execute(
            self.service.as_ref(),
            &thread,
            &coordinator,
            self.config.run_timeout,
            user_text,
        )
        .await
    }

    /// Delete every owned resource, best-effort.
    ///
    /// Must only be called once any in-flight run is terminal (guaranteed by
    /// `&mut self` on execution). Each failed deletion is logged and does
    /// not prevent the remaining deletions; a second call finds nothing left
    /// to delete and is a no-op.
    pub async fn teardown(&mut self) {
        let (coordinator, specialists, thread) = self.registry.drain();

        if let Some(coordinator) = coordinator {
            match self.service.delete_agent(&coordinator.id).await {
                Ok(()) => tracing::info!("coordinator agent deleted"),
                Err(e) => tracing::warn!("failed to delete coordinator agent: {}", e),
            }
        }

        let deletions = specialists.iter().map(|handle| {
            let service = Arc::clone(&self.service);
            async move {
                match service.delete_agent(&handle.id).await {
                    Ok(()) => tracing::info!("{} agent deleted", handle.role),
                    Err(e) => tracing::warn!("failed to delete {} agent: {}", handle.role, e),
                }
            }
        });
        join_all(deletions).await;

        if let Some(thread) = thread {
            match self.service.delete_thread(&thread).await {
                Ok(()) => tracing::info!("thread deleted"),
                Err(e) => tracing::warn!("failed to delete thread {}: {}", thread, e),
            }
        }
    }
}
