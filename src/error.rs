// Core error type. The driver decides per variant whether to skip a file or abort the run.

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// Invalid sampling rate or filter parameters. Raised before any record is touched.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Input table lacks a required column.
    #[error("input is missing required column '{column}'")]
    Schema { column: String },

    #[error("line {line}: column '{column}' has non-numeric or non-finite value '{value}'")]
    Parse {
        line: usize,
        column: String,
        value: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PipelineError {
    /// True for errors caused by the contents of one input file (the run can continue).
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::Schema { .. } | Self::Parse { .. })
    }
}
