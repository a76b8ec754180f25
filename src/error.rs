//! Error types for the query client and feeds.

use thiserror::Error;

/// Errors that can occur when executing a query against a cluster node.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Transport-level failure: DNS, refused connection, timeout.
    #[error("network error: {0}")]
    Network(String),

    /// The endpoint answered, but not with the shape we expect
    /// (non-JSON body, missing `data` field, non-success status).
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl From<reqwest::Error> for QueryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() || err.is_request() {
            QueryError::Network(err.to_string())
        } else if err.is_decode() {
            QueryError::Protocol(err.to_string())
        } else {
            QueryError::Network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_cause() {
        let err = QueryError::Network("connection refused".to_string());
        assert_eq!(err.to_string(), "network error: connection refused");

        let err = QueryError::Protocol("missing `data` field".to_string());
        assert_eq!(err.to_string(), "protocol error: missing `data` field");
    }
}
