//! HTTP surface for the sales store.
//!
//! Contract: input errors (bad JSON, missing or empty query) are HTTP 400;
//! everything the database itself says, including query failures, is HTTP
//! 200 with a structured body. Unexpected server-side failures are 500.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::SalesDb;

pub fn router(db: Arc<SalesDb>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/database-info", get(database_info))
        .route("/query-sales-data", post(query_sales_data))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(db)
}

/// Bind and serve until shutdown.
pub async fn serve(host: &str, port: u16, db: Arc<SalesDb>) -> anyhow::Result<()> {
    let addr = format!("{}:{}", host, port);
    tracing::info!("sales API listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router(db)).await?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    message: &'static str,
    timestamp: chrono::DateTime<chrono::Utc>,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        message: "Sales API is running",
        timestamp: chrono::Utc::now(),
    })
}

async fn database_info(State(db): State<Arc<SalesDb>>) -> Response {
    match db.database_info() {
        Ok(info) => (StatusCode::OK, Json(info)).into_response(),
        Err(e) => {
            tracing::error!("database info failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
struct QueryRequest {
    query: String,
}

async fn query_sales_data(
    State(db): State<Arc<SalesDb>>,
    body: Result<Json<QueryRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(json) => json,
        Err(rejection) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": format!("Invalid request body: {}", rejection.body_text()) })),
            )
                .into_response();
        }
    };

    if request.query.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Query cannot be empty" })),
        )
            .into_response();
    }

    // Query-level failures are part of the 200 contract.
    (StatusCode::OK, Json(db.execute_query(&request.query))).into_response()
}
