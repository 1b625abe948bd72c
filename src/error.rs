//! Error types for pipeline configuration and buffer management.
//!
//! Per-pixel math never fails. Errors only surface while validating
//! parameters, building pass graphs, or binding buffers to a graph, and
//! in every case the frame being processed is left untouched.

/// Centralized error type for all pipeline operations.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PostFxError {
    /// A parameter lies outside its valid domain, or a graph is malformed.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A buffer does not match the dimensions or format a pass expects.
    #[error("Resource error: {0}")]
    Resource(String),
}

impl PostFxError {
    pub fn configuration<T: ToString>(msg: T) -> Self {
        PostFxError::Configuration(msg.to_string())
    }

    pub fn resource<T: ToString>(msg: T) -> Self {
        PostFxError::Resource(msg.to_string())
    }
}

#[cfg(feature = "python")]
impl From<PostFxError> for pyo3::PyErr {
    fn from(err: PostFxError) -> Self {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}

/// Result type alias for pipeline operations.
pub type PostFxResult<T> = Result<T, PostFxError>;
