use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Document '{id}' not found")]
    NotFound { id: String },

    /// Ids become file names in the file store, so only `[A-Za-z0-9_-]` is accepted.
    #[error("Invalid document id '{id}': use letters, digits, '-' or '_'")]
    InvalidId { id: String },

    #[error("Aggregate '{aggregate}' does not list its root '{root}' among its entities")]
    InvalidAggregate { aggregate: String, root: String },

    #[error("Export format '{format}' is not supported (use mermaid, markdown or json)")]
    UnsupportedExport { format: String },
}

pub type Result<T> = std::result::Result<T, Error>;
