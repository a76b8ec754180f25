//! HTTP query client for ClickHouse nodes.
//!
//! Queries are sent as raw text in a POST body to the node's HTTP interface
//! on port 8123. Queries suffixed with `FORMAT JSON` come back as a JSON
//! object whose `data` field holds the rows; the liveness probe sends a bare
//! `SELECT 1;` and only checks that the transport and status succeed.
//!
//! The topology query is the one exception to the per-node addressing: it
//! goes to the base URL the user entered for the session.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::data::row::RowSet;
use crate::error::QueryError;

/// Port of the ClickHouse HTTP interface.
const HTTP_PORT: u16 = 8123;

/// Probe query used for health checks; success is judged purely by the
/// absence of a transport or HTTP error, the body is not parsed.
pub const PROBE_QUERY: &str = "SELECT 1;";

/// Topology query yielding `host_name` / `host_address` rows.
pub const TOPOLOGY_QUERY: &str = "SELECT * FROM system.clusters FORMAT JSON;";

/// Endpoint URL for a node, by address. The CORS query parameter is part of
/// the node's HTTP contract for browser-facing dashboards and is kept for
/// parity with them.
pub fn node_endpoint(host: &str) -> String {
    format!("http://{}:{}/?add_http_cors_header=1", host, HTTP_PORT)
}

/// Endpoint URL for the user-supplied session base URL.
pub fn base_endpoint(base_url: &str) -> String {
    format!("{}/?add_http_cors_header=1", base_url.trim_end_matches('/'))
}

/// Boundary trait for executing queries against the cluster.
///
/// [`QueryClient`] is the production implementation; feeds depend on this
/// trait so tests can substitute a scripted endpoint.
#[async_trait]
pub trait QueryExecutor: Send + Sync + std::fmt::Debug {
    /// Execute a `FORMAT JSON` query against a full endpoint URL.
    async fn execute_url(&self, url: &str, query: &str) -> Result<RowSet, QueryError>;

    /// Fire the liveness probe at a node; `Ok(())` means it answered.
    async fn probe(&self, host: &str) -> Result<(), QueryError>;

    /// Execute a `FORMAT JSON` query against a node, by address.
    async fn execute(&self, host: &str, query: &str) -> Result<RowSet, QueryError> {
        self.execute_url(&node_endpoint(host), query).await
    }
}

/// Query client over reqwest.
///
/// Stateless beyond the connection pool; retry policy belongs to callers.
#[derive(Debug, Clone, Default)]
pub struct QueryClient {
    client: Client,
}

impl QueryClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    async fn send(&self, url: &str, query: &str) -> Result<reqwest::Response, QueryError> {
        let response = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(query.to_string())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(QueryError::Protocol(format!(
                "endpoint returned status {}",
                response.status()
            )));
        }

        Ok(response)
    }
}

#[async_trait]
impl QueryExecutor for QueryClient {
    async fn execute_url(&self, url: &str, query: &str) -> Result<RowSet, QueryError> {
        let response = self.send(url, query).await?;
        let body = response
            .text()
            .await
            .map_err(|e| QueryError::Network(e.to_string()))?;
        parse_rows(&body)
    }

    async fn probe(&self, host: &str) -> Result<(), QueryError> {
        self.send(&node_endpoint(host), PROBE_QUERY).await?;
        Ok(())
    }
}

/// Parse a `FORMAT JSON` response body into rows.
///
/// Anything that is not a JSON object with a `data` array of flat records
/// is a protocol error.
pub fn parse_rows(body: &str) -> Result<RowSet, QueryError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| QueryError::Protocol(format!("body is not JSON: {}", e)))?;

    let data = value
        .get("data")
        .ok_or_else(|| QueryError::Protocol("response has no `data` field".to_string()))?;

    serde_json::from_value(data.clone())
        .map_err(|e| QueryError::Protocol(format!("`data` is not a row set: {}", e)))
}
