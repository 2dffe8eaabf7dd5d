//! Error module for the Rusty Ephys library.
use std::error::Error;
use std::fmt;

/// Error types for the library.
#[derive(Debug, PartialEq, Clone)]
pub enum EphysError {
    /// Error for a missing or invalid analysis parameter, raised before any computation.
    ConfigurationError(String),
    /// Error for an invalid parameter of a data structure, e.g., a non-positive sampling period.
    InvalidParameter(String),
    /// Error for a degenerate numeric case, e.g., a zero-magnitude vector average.
    DomainError(String),
    /// Error for a query that requires data but received none, e.g., an empty trial group.
    EmptyInput(String),
    /// Error for a violated internal invariant, e.g., an empty collapse group.
    LogicError(String),
    /// Error for I/O operations.
    IOError(String),
}

impl fmt::Display for EphysError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EphysError::ConfigurationError(e) => write!(f, "Configuration error: {}", e),
            EphysError::InvalidParameter(e) => write!(f, "Invalid parameter: {}", e),
            EphysError::DomainError(e) => write!(f, "Domain error: {}", e),
            EphysError::EmptyInput(e) => write!(f, "Empty input: {}", e),
            EphysError::LogicError(e) => write!(f, "Logic error: {}", e),
            EphysError::IOError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl Error for EphysError {}
