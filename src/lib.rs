//! # crewhub
//!
//! Client-side orchestration of a crew of hosted AI agents that answer
//! complex business questions: a sales analyst, a market researcher, a
//! report generator, and a coordinator that delegates to them.
//!
//! Almost all state lives in an external managed agents service; this crate
//! configures the agents, wires the delegations, submits requests, waits on
//! run completion with a bounded timeout, and extracts the final answer.
//!
//! ## Architecture
//!
//! ```text
//!  user request
//!       │
//!       ▼
//!  ┌──────────────┐     delegations      ┌──────────────────┐
//!  │ Coordinator  │ ───────────────────▶ │ Sales Analyst    │──▶ sales API
//!  │   (hosted)   │                      │ Market Researcher│──▶ web / docs
//!  └──────┬───────┘                      │ Report Generator │──▶ code interp
//!         │                              └──────────────────┘
//!         ▼
//!  final agent message on the thread ──▶ result extraction
//! ```
//!
//! ## Modules
//! - `agents`: roles, handle registry, delegation wiring, provisioning
//! - `hosted`: hosted agents-service types, trait, and HTTP client
//! - `orchestrator`: task execution protocol and result extraction
//! - `query`: the sales data API (SQLite store, axum service, client)

pub mod agents;
pub mod config;
pub mod hosted;
pub mod instructions;
pub mod orchestrator;
pub mod query;

pub use config::Config;
pub use orchestrator::Orchestrator;
