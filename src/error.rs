//! Error types for the planner, exporter and gateway.

use std::path::PathBuf;

/// Failure writing a value to the durable store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to create data directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {key}: {source}")]
    Write {
        key: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize {key}: {source}")]
    Serialize {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure producing a PDF snapshot.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("document has no pages")]
    EmptyDocument,

    #[error("pdf rendering failed: {0}")]
    Render(String),
}

/// Failure handling a gateway request.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("missing required configuration: {}", .missing.join(", "))]
    MissingConfig {
        missing: Vec<&'static str>,
        configured: Vec<(&'static str, bool)>,
    },

    #[error("{0}")]
    BadRequest(String),

    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("received an HTML page from the access layer instead of JSON (status {status})")]
    HtmlResponse { status: u16 },

    #[error("upstream returned {status}")]
    Upstream {
        status: u16,
        details: serde_json::Value,
    },

    #[error("unexpected upstream response: {0}")]
    Malformed(String),
}
