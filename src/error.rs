//! Error taxonomy, one enum per layer.
//!
//! Per-item failures (`HashError`, `ExportError`) are recovered locally by the
//! caller. `PipelineError` is what a whole operation returns; precondition
//! violations and cancellation have their own variants so a caller never has to
//! parse messages to tell them apart from internal failures.

use thiserror::Error;

/// Result type for whole operations (discovery, analysis, export).
pub type Result<T> = std::result::Result<T, PipelineError>;

// ============================================================================
// Document ingestion
// ============================================================================

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to read document '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("document contains no node tree")]
    NoNodes,
}

// ============================================================================
// Per-node structural hashing
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HashError {
    #[error("{node_type} node has no id")]
    MissingId { node_type: String },
}

// ============================================================================
// Preconditions (rejected before any work starts)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreconditionError {
    #[error("Please select at least one frame to analyze")]
    NoScreensSelected,

    #[error("Please select no more than {max} frames ({selected} selected)")]
    TooManyScreens { max: usize, selected: usize },

    #[error("Please select valid frames to analyze")]
    NoFramesSelected,

    #[error("Node '{0}' does not exist in the document")]
    UnknownNode(String),

    #[error("Nothing to export: discover components or analyze screens first")]
    NothingToExport,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

// ============================================================================
// Text enrichment (external, fallible, optional)
// ============================================================================

#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("enrichment request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("enrichment service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed enrichment response: {0}")]
    MalformedResponse(String),

    #[error("enrichment is not configured")]
    NotConfigured,
}

// ============================================================================
// Asset export (per asset, never fatal for the bundle)
// ============================================================================

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("{exporter} cannot export {format}")]
    UnsupportedFormat {
        exporter: &'static str,
        format: String,
    },

    #[error("no exported asset for node '{node_id}' as {format}")]
    Missing { node_id: String, format: String },

    #[error("export of node '{node_id}' timed out")]
    TimedOut { node_id: String },

    #[error("export task for node '{node_id}' failed: {message}")]
    Task { node_id: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// ============================================================================
// Operation level
// ============================================================================

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    #[error("Another operation is in progress")]
    OperationInProgress,

    #[error("Operation cancelled")]
    Cancelled,

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("worker task failed: {0}")]
    Task(String),
}

impl PipelineError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, PipelineError::Cancelled)
    }

    /// True for errors that should be shown to the user as-is rather than
    /// reported as an internal failure.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            PipelineError::Precondition(_) | PipelineError::OperationInProgress
        )
    }
}
