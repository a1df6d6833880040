//! Runtime error types.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors from URL encoding and decoding.
#[derive(Debug, Clone, Error)]
pub enum MapperError {
    /// The URL does not match the application mount or basic shape.
    #[error("malformed url: {0}")]
    Malformed(String),

    /// A required reserved parameter is missing.
    #[error("missing required parameter '{0}'")]
    MissingParameter(&'static str),

    /// The listener name does not match any registered interface.
    #[error("unknown listener interface '{name}' in url")]
    UnknownListener {
        /// The unregistered name.
        name: String,
    },

    /// The behavior index is not a valid integer.
    #[error("invalid behavior index '{value}'")]
    InvalidBehaviorIndex {
        /// The rejected value.
        value: String,
    },

    /// A page parameter collides with the reserved `trellis:` namespace.
    #[error("page parameter '{name}' collides with the reserved parameter namespace")]
    ReservedParameter {
        /// The colliding name.
        name: String,
    },
}

/// Errors that can occur during runtime operations.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Configuration loading or validation failed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// URL encoding/decoding failed.
    #[error(transparent)]
    Mapper(#[from] MapperError),

    /// Listener registry operation failed.
    #[error(transparent)]
    Listener(#[from] trellis_core::ListenerError),

    /// A request handler failed in a non-recoverable way.
    #[error(transparent)]
    Handler(#[from] trellis_framework::HandlerError),
}

/// Result type for mapper operations.
pub type MapperResult<T> = Result<T, MapperError>;

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
