//! Error types for tfplug

/// Error type for tfplug operations
#[derive(Debug, thiserror::Error)]
pub enum TfplugError {
    #[error("Resource type not found: {0}")]
    ResourceNotFound(String),

    #[error("Provider not configured")]
    ProviderNotConfigured,

    #[error("Attribute '{0}' not found")]
    AttributeNotFound(String),

    #[error("List index {0} out of bounds")]
    IndexOutOfBounds(i64),

    #[error("Invalid path navigation: {0}")]
    InvalidPath(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Decoding error: {0}")]
    DecodingError(String),

    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },
}

/// Result type alias for tfplug operations
pub type Result<T> = std::result::Result<T, TfplugError>;
