//! crewhub - interactive multi-agent orchestration CLI.
//!
//! Provisions the crew against the hosted agents service, reads complex
//! queries from stdin, runs each one through the coordinator, and tears
//! everything down on exit.

use std::sync::Arc;

use crewhub::hosted::HttpAgentsService;
use crewhub::{Config, Orchestrator};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crewhub=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    info!(
        "Loaded configuration: endpoint={} model={}",
        config.agents_endpoint, config.model
    );

    // The sales analyst depends on the query API being reachable; warn early
    // instead of failing on the first delegated question.
    let sales_api = crewhub::query::SalesApiClient::new(config.sales_api_endpoint.clone());
    if let Err(e) = sales_api.health().await {
        warn!("sales API is not reachable: {}", e);
    }

    let service = Arc::new(HttpAgentsService::new(
        config.agents_endpoint.clone(),
        config.api_key.clone(),
        config.poll_interval,
    ));

    info!("Initializing multi-agent system...");
    let mut orchestrator = Orchestrator::initialize(service, config).await?;

    let result = input_loop(&mut orchestrator).await;

    info!("Cleaning up agents...");
    orchestrator.teardown().await;
    result
}

async fn input_loop(orchestrator: &mut Orchestrator) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout
            .write_all(b"\nEnter your complex query (or 'exit' to quit):\n> ")
            .await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            break;
        }
        if input.is_empty() {
            continue;
        }

        let result = orchestrator.execute_complex_task(input).await;

        let report = format!("\nFinal Report:\n{}\n{}\n{}\n", "=".repeat(60), result, "=".repeat(60));
        stdout.write_all(report.as_bytes()).await?;
        stdout.flush().await?;
    }

    Ok(())
}
