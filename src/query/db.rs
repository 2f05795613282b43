//! SQLite sales store.
//!
//! The connection is owned by [`SalesDb`] and initialized explicitly at
//! startup rather than lazily through ambient module state. When no database
//! file is configured (or the configured file is absent), an in-memory store
//! seeded with sample rows keeps the service usable for demos and tests.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;

use rusqlite::types::ValueRef;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::QueryResponse;

#[derive(Debug, Error)]
pub enum QueryDbError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("database connection is unavailable")]
    Unavailable,
}

pub struct SalesDb {
    conn: Mutex<Connection>,
}

impl SalesDb {
    /// Open the sales database.
    ///
    /// With `Some(path)` pointing at an existing file, that file is used.
    /// Otherwise an in-memory database is created and seeded with sample
    /// sales rows.
    pub fn open(path: Option<&Path>) -> Result<Self, QueryDbError> {
        let conn = match path {
            Some(p) if p.exists() => {
                tracing::info!("using sales database at {}", p.display());
                Connection::open(p)?
            }
            Some(p) => {
                tracing::warn!(
                    "sales database {} not found, seeding sample data in memory",
                    p.display()
                );
                Self::sample_connection()?
            }
            None => {
                tracing::info!("no sales database configured, seeding sample data in memory");
                Self::sample_connection()?
            }
        };
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn sample_connection() -> Result<Connection, QueryDbError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS sales_data (
                 id INTEGER PRIMARY KEY,
                 region TEXT,
                 product_type TEXT,
                 revenue REAL,
                 year INTEGER
             );",
        )?;
        let sample = [
            (1, "NORTH AMERICA", "Tent", 1_500_000.0, 2023),
            (2, "EUROPE", "Tent", 1_200_000.0, 2023),
            (3, "ASIA", "Tent", 900_000.0, 2023),
            (4, "NORTH AMERICA", "Sleeping Bag", 800_000.0, 2023),
            (5, "EUROPE", "Sleeping Bag", 600_000.0, 2023),
        ];
        for (id, region, product_type, revenue, year) in sample {
            conn.execute(
                "INSERT OR REPLACE INTO sales_data (id, region, product_type, revenue, year)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![id, region, product_type, revenue, year],
            )?;
        }
        Ok(conn)
    }

    /// Execute one query. Query-level failures become a structured
    /// [`QueryResponse::Error`], never an `Err`.
    pub fn execute_query(&self, query: &str) -> QueryResponse {
        let conn = match self.conn.lock() {
            Ok(conn) => conn,
            Err(_) => {
                return QueryResponse::Error {
                    error: QueryDbError::Unavailable.to_string(),
                }
            }
        };

        let result = if query.trim_start().to_uppercase().starts_with("SELECT") {
            Self::run_select(&conn, query)
        } else {
            Self::run_write(&conn, query)
        };
        result.unwrap_or_else(|e| {
            tracing::error!("query failed: {}", e);
            QueryResponse::Error {
                error: e.to_string(),
            }
        })
    }

    fn run_select(conn: &Connection, query: &str) -> Result<QueryResponse, rusqlite::Error> {
        let mut stmt = conn.prepare(query)?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();

        let mut data = Vec::new();
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let mut object = serde_json::Map::new();
            for (i, column) in columns.iter().enumerate() {
                object.insert(column.clone(), json_value(row.get_ref(i)?));
            }
            data.push(object);
        }

        let row_count = data.len();
        Ok(QueryResponse::Rows {
            data,
            columns,
            row_count,
        })
    }

    fn run_write(conn: &Connection, query: &str) -> Result<QueryResponse, rusqlite::Error> {
        let rows_affected = conn.execute(query, [])?;
        Ok(QueryResponse::Write {
            message: "Query executed successfully".to_string(),
            rows_affected,
        })
    }

    /// Schema summary: tables with their columns and row counts.
    pub fn database_info(&self) -> Result<DatabaseInfo, QueryDbError> {
        let conn = self.conn.lock().map_err(|_| QueryDbError::Unavailable)?;

        let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type='table'")?;
        let tables: Vec<String> = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<_, _>>()?;

        let mut table_info = BTreeMap::new();
        for table in &tables {
            let ident = quote_ident(table);
            let mut columns = Vec::new();
            let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", ident))?;
            let mut rows = stmt.query([])?;
            while let Some(row) = rows.next()? {
                columns.push(ColumnInfo {
                    name: row.get(1)?,
                    col_type: row.get(2)?,
                });
            }

            let row_count: usize =
                conn.query_row(&format!("SELECT COUNT(*) FROM {}", ident), [], |row| {
                    row.get(0)
                })?;

            table_info.insert(table.clone(), TableInfo { columns, row_count });
        }

        Ok(DatabaseInfo {
            total_tables: table_info.len(),
            tables: table_info,
        })
    }
}

/// Quote an identifier for interpolation into SQL text. Table names come
/// from `sqlite_master` and may contain anything, including double quotes.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn json_value(value: ValueRef<'_>) -> serde_json::Value {
    match value {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Integer(i) => serde_json::Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Text(t) => serde_json::Value::String(String::from_utf8_lossy(t).into_owned()),
        // Blobs carry no meaning for the analyst; don't round-trip them.
        ValueRef::Blob(_) => serde_json::Value::Null,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseInfo {
    pub tables: BTreeMap<String, TableInfo>,
    pub total_tables: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableInfo {
    pub columns: Vec<ColumnInfo>,
    pub row_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub col_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_returns_rows_and_columns() {
        let db = SalesDb::open(None).unwrap();
        let response = db.execute_query(
            "SELECT region, revenue FROM sales_data WHERE product_type = 'Tent' AND region = 'EUROPE'",
        );
        match response {
            QueryResponse::Rows {
                data,
                columns,
                row_count,
            } => {
                assert_eq!(row_count, 1);
                assert_eq!(columns, vec!["region", "revenue"]);
                assert_eq!(data[0]["region"], "EUROPE");
                assert_eq!(data[0]["revenue"], 1_200_000.0);
            }
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[test]
    fn write_reports_rows_affected() {
        let db = SalesDb::open(None).unwrap();
        let response =
            db.execute_query("UPDATE sales_data SET revenue = revenue + 1 WHERE year = 2023");
        match response {
            QueryResponse::Write {
                message,
                rows_affected,
            } => {
                assert_eq!(message, "Query executed successfully");
                assert_eq!(rows_affected, 5);
            }
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[test]
    fn malformed_query_returns_structured_error() {
        let db = SalesDb::open(None).unwrap();
        let response = db.execute_query("SELECT * FROM missing_table");
        assert!(matches!(response, QueryResponse::Error { .. }));
    }

    #[test]
    fn database_info_lists_tables_and_counts() {
        let db = SalesDb::open(None).unwrap();
        let info = db.database_info().unwrap();
        assert_eq!(info.total_tables, 1);
        let table = &info.tables["sales_data"];
        assert_eq!(table.row_count, 5);
        assert!(table.columns.iter().any(|c| c.name == "region"));
    }

    #[test]
    fn database_info_handles_quotes_in_table_names() {
        let db = SalesDb::open(None).unwrap();
        let response = db.execute_query(r#"CREATE TABLE "odd""name" (x INTEGER)"#);
        assert!(matches!(response, QueryResponse::Write { .. }));

        let info = db.database_info().unwrap();
        assert_eq!(info.total_tables, 2);
        let table = &info.tables["odd\"name"];
        assert_eq!(table.row_count, 0);
        assert!(table.columns.iter().any(|c| c.name == "x"));
    }

    #[test]
    fn missing_db_file_falls_back_to_sample_data() {
        let dir = tempfile::tempdir().unwrap();
        let db = SalesDb::open(Some(&dir.path().join("absent.db"))).unwrap();
        let info = db.database_info().unwrap();
        assert_eq!(info.tables["sales_data"].row_count, 5);
    }
}
