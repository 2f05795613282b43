//! sales-api - HTTP server entry point for the sales data query service.

use std::sync::Arc;

use crewhub::query::{service, SalesDb};
use tracing::info;
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

    // Only the serving-related variables matter here; agents-service
    // settings are irrelevant to this binary, so read the bind address and
    // database path directly instead of requiring the full config.
    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "8100".to_string())
        .parse()?;
    let db_path = std::env::var("SALES_DB_PATH").ok().map(std::path::PathBuf::from);

    let db = Arc::new(SalesDb::open(db_path.as_deref())?);
    info!("sales database ready");

    service::serve(&host, port, db).await
}
