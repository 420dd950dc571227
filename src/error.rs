//! Error types for element response handling

use thiserror::Error;

/// Main error type for response buffering and commit
#[derive(Error, Debug)]
pub enum ResponseError {
    /// Raised while sizing the response buffer; the run cannot continue.
    #[error("Element attribute '{attribute}' referenced by element {element} not found")]
    AttributeNotFound { element: usize, attribute: String },

    #[error("Element {0} not found in mesh")]
    ElementNotFound(usize),

    #[error("Integration point {point} out of range (1..={available})")]
    IntegrationPointOutOfRange { point: usize, available: usize },

    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("Response buffer not allocated for this mesh")]
    BufferNotAllocated,

    #[error("Invalid integration scheme: {0}")]
    InvalidIntegrationScheme(String),

    #[error("Duplicate name '{0}' already exists")]
    DuplicateName(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Result type for response operations
pub type ResponseResult<T> = Result<T, ResponseError>;
