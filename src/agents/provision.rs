//! Declarative crew setup.
//!
//! Creates the three specialist agents, wires their delegations into a
//! coordinator, and opens the conversation thread. Runs exactly once per
//! orchestrator lifetime; any failure aborts initialization.

use std::path::Path;

use crate::config::Config;
use crate::hosted::{AgentsService, ToolConfig};
use crate::instructions;

use super::{AgentHandle, AgentRegistry, Delegation, DelegationSet, Role, SetupError};

const SALES_ANALYST_DESCRIPTION: &str = "Analyzes sales data, calculates metrics, and identifies \
     trends. Queries the sales database and prepares figures for charts.";
const MARKET_RESEARCHER_DESCRIPTION: &str = "Researches competitors, market trends, and external \
     data using web search and indexed product documentation.";
const REPORT_GENERATOR_DESCRIPTION: &str = "Synthesizes findings from multiple sources into \
     formatted professional reports and summaries.";

pub struct Provisioner<'a> {
    service: &'a dyn AgentsService,
    config: &'a Config,
}

impl<'a> Provisioner<'a> {
    pub fn new(service: &'a dyn AgentsService, config: &'a Config) -> Self {
        Self { service, config }
    }

    /// Build the full crew: specialists first, then the coordinator with its
    /// connected-agent tools, then the single conversation thread.
    pub async fn provision(&self) -> Result<AgentRegistry, SetupError> {
        let mut registry = AgentRegistry::new();
        self.create_specialists(&mut registry).await?;
        self.create_coordinator(&mut registry).await?;

        let thread = self.service.create_thread().await?;
        tracing::info!("created conversation thread {}", thread);
        registry.set_thread(thread);

        Ok(registry)
    }

    async fn create_specialists(&self, registry: &mut AgentRegistry) -> Result<(), SetupError> {
        self.create_sales_analyst(registry).await?;
        self.create_market_researcher(registry).await?;
        self.create_report_generator(registry).await?;
        Ok(())
    }

    async fn create_sales_analyst(&self, registry: &mut AgentRegistry) -> Result<(), SetupError> {
        let spec_path = self.config.assets_dir.join("sales_api_spec.json");
        let spec = load_sales_api_spec(&spec_path, &self.config.sales_api_endpoint)?;
        let tools = vec![ToolConfig::OpenApi {
            name: "sales_data_api".to_string(),
            description: "API for querying sales data with SQL and reading database schema \
                 information"
                .to_string(),
            spec,
        }];
        self.create_specialist(registry, Role::SalesAnalyst, tools)
            .await
    }

    async fn create_market_researcher(
        &self,
        registry: &mut AgentRegistry,
    ) -> Result<(), SetupError> {
        let mut tools = Vec::new();

        if let Some(connection_id) = &self.config.web_grounding_connection_id {
            tools.push(ToolConfig::WebGrounding {
                connection_id: connection_id.clone(),
            });
        }

        match &self.config.datasheet_path {
            Some(datasheet) => {
                let store = self
                    .service
                    .create_vector_store("Product Documentation", &[datasheet.clone()])
                    .await?;
                tools.push(ToolConfig::FileSearch {
                    vector_store_ids: vec![store],
                });
            }
            None => {
                tracing::info!(
                    "no product datasheet configured, market researcher runs without file search"
                );
            }
        }

        self.create_specialist(registry, Role::MarketResearcher, tools)
            .await
    }

    async fn create_report_generator(
        &self,
        registry: &mut AgentRegistry,
    ) -> Result<(), SetupError> {
        self.create_specialist(registry, Role::ReportGenerator, vec![ToolConfig::CodeInterpreter])
            .await
    }

    async fn create_specialist(
        &self,
        registry: &mut AgentRegistry,
        role: Role,
        tools: Vec<ToolConfig>,
    ) -> Result<(), SetupError> {
        let instructions = instructions::load(
            &self.config.assets_dir.join("instructions"),
            role.instructions_file(),
        )?;
        let id = self
            .service
            .create_agent(&self.config.model, role.display_name(), &instructions, &tools)
            .await?;
        tracing::info!("created {} agent ({})", role, id);
        registry.register(role, AgentHandle::new(id, role.display_name(), role))
    }

    async fn create_coordinator(&self, registry: &mut AgentRegistry) -> Result<(), SetupError> {
        // Every specialist must exist before any delegation is wired.
        registry.require_all(&Role::SPECIALISTS)?;

        let mut delegations = DelegationSet::new();
        for (role, description) in [
            (Role::SalesAnalyst, SALES_ANALYST_DESCRIPTION),
            (Role::MarketResearcher, MARKET_RESEARCHER_DESCRIPTION),
            (Role::ReportGenerator, REPORT_GENERATOR_DESCRIPTION),
        ] {
            let handle = registry.get(role)?;
            delegations.push(Delegation::new(handle, role.wire_name(), description))?;
        }

        let instructions = instructions::load(
            &self.config.assets_dir.join("instructions"),
            Role::Coordinator.instructions_file(),
        )?;
        let tools = delegations.into_tools();
        let id = self
            .service
            .create_agent(
                &self.config.model,
                Role::Coordinator.display_name(),
                &instructions,
                &tools,
            )
            .await?;
        tracing::info!("created coordinator agent ({}) with {} delegations", id, tools.len());
        registry.set_coordinator(AgentHandle::new(id, Role::Coordinator.display_name(), Role::Coordinator))
    }
}

/// Load the sales API OpenAPI description and substitute the configured
/// endpoint for the `{sales_api_endpoint}` placeholder.
pub fn load_sales_api_spec(path: &Path, endpoint: &str) -> Result<serde_json::Value, SetupError> {
    let raw = std::fs::read_to_string(path).map_err(|source| SetupError::AssetRead {
        path: path.display().to_string(),
        source,
    })?;
    let substituted = raw.replace("{sales_api_endpoint}", endpoint);
    serde_json::from_str(&substituted).map_err(|e| SetupError::InvalidApiSpec {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}
