//! Matrix error types

use thiserror::Error;

/// Errors that can occur while building, resolving or classifying a matrix
#[derive(Error, Debug)]
pub enum MatrixError {
    /// Hostname the hierarchy utilities cannot decompose
    #[error("Invalid hostname: {0}")]
    InvalidHostname(String),

    /// URL that cannot be parsed
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Unknown request type name
    #[error("Invalid request type: {0}")]
    InvalidRequestType(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl MatrixError {
    /// Create an invalid hostname error
    pub fn invalid_hostname(hostname: impl Into<String>) -> Self {
        MatrixError::InvalidHostname(hostname.into())
    }
}

/// Result type alias for matrix operations
pub type MatrixResult<T> = Result<T, MatrixError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MatrixError::InvalidHostname("bad..host".into());
        assert_eq!(err.to_string(), "Invalid hostname: bad..host");

        let err = MatrixError::InvalidRequestType("font".into());
        assert_eq!(err.to_string(), "Invalid request type: font");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let matrix_err: MatrixError = io_err.into();
        assert!(matches!(matrix_err, MatrixError::Io(_)));
    }
}
