use thiserror::Error;

/// Main error type for crashgraph
#[derive(Error, Debug)]
pub enum CrashGraphError {
    /// The graph endpoint could not be reached or answered with an error status
    #[error("Graph source unavailable: {0}")]
    SourceUnavailable(String),

    /// The graph payload is not valid Turtle
    #[error("Parse error: {0}")]
    Parse(String),

    /// A query template could not be rendered or evaluated
    #[error("Query error in template '{template}': {message}")]
    Query { template: String, message: String },

    /// Rule evaluation failed; derived facts are discarded
    #[error("Inference error: {0}")]
    Inference(String),

    /// No operation with this name exists in the catalog
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// In-memory snapshot storage errors
    #[error("Store error: {0}")]
    Store(#[from] oxigraph::store::StorageError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CrashGraphError {
    /// Build a query error tagged with the failing template name.
    pub fn query(template: impl Into<String>, message: impl ToString) -> Self {
        Self::Query {
            template: template.into(),
            message: message.to_string(),
        }
    }

    /// Stable machine-readable kind, used in structured error payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SourceUnavailable(_) => "source_unavailable",
            Self::Parse(_) => "parse_error",
            Self::Query { .. } => "query_error",
            Self::Inference(_) => "inference_error",
            Self::UnknownOperation(_) => "unknown_operation",
            Self::InvalidInput(_) => "invalid_input",
            Self::Store(_) => "store_error",
            Self::Config(_) => "config_error",
            Self::Io(_) => "io_error",
        }
    }
}

/// Convenient Result type using CrashGraphError
pub type Result<T> = std::result::Result<T, CrashGraphError>;
