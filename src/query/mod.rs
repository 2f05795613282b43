//! Sales data query service.
//!
//! A small HTTP API in front of the SQLite sales store. The sales analyst
//! agent reaches it indirectly: the hosted service performs the HTTP calls
//! described by the OpenAPI spec on the client's behalf.

pub mod client;
pub mod db;
pub mod service;

pub use client::SalesApiClient;
pub use db::{DatabaseInfo, QueryDbError, SalesDb};

use serde::{Deserialize, Serialize};

/// Wire response for `/query-sales-data`.
///
/// A malformed query never produces a transport fault: query-level failures
/// come back as `Error` with HTTP 200 so the calling agent can read them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryResponse {
    Rows {
        data: Vec<serde_json::Map<String, serde_json::Value>>,
        columns: Vec<String>,
        row_count: usize,
    },
    Write {
        message: String,
        rows_affected: usize,
    },
    Error {
        error: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_response_variants_decode_by_shape() {
        let rows: QueryResponse =
            serde_json::from_str(r#"{"data":[],"columns":["region"],"row_count":0}"#).unwrap();
        assert!(matches!(rows, QueryResponse::Rows { .. }));

        let write: QueryResponse =
            serde_json::from_str(r#"{"message":"Query executed successfully","rows_affected":2}"#)
                .unwrap();
        assert!(matches!(write, QueryResponse::Write { .. }));

        let error: QueryResponse = serde_json::from_str(r#"{"error":"no such table"}"#).unwrap();
        assert!(matches!(error, QueryResponse::Error { .. }));
    }
}
