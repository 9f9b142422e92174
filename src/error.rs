//! Custom error types for the Outpost application
//!
//! This module defines the application-wide error type and implements the
//! necessary traits to propagate errors consistently through the crate.

use std::fmt;

/// Main error type for the Outpost application
#[derive(Debug)]
pub enum OutpostError {
    /// Error occurred during filesystem or network I/O
    Io(std::io::Error),

    /// Error occurred while rendering a template
    Render(askama::Error),

    /// A required environment variable is absent or empty
    MissingEnv(String),

    /// Generic error with a message
    Generic(String),
}

impl fmt::Display for OutpostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutpostError::Io(e) => {
                write!(f, "I/O error: {e}")
            }
            OutpostError::Render(e) => {
                write!(f, "Template rendering error: {e}")
            }
            OutpostError::MissingEnv(key) => {
                write!(f, "Missing required environment variable: {key}")
            }
            OutpostError::Generic(msg) => {
                write!(f, "Error: {msg}")
            }
        }
    }
}

impl std::error::Error for OutpostError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OutpostError::Io(e) => Some(e),
            OutpostError::Render(e) => Some(e),
            OutpostError::MissingEnv(_) => None,
            OutpostError::Generic(_) => None,
        }
    }
}

impl From<std::io::Error> for OutpostError {
    fn from(error: std::io::Error) -> Self {
        OutpostError::Io(error)
    }
}

impl From<askama::Error> for OutpostError {
    fn from(error: askama::Error) -> Self {
        OutpostError::Render(error)
    }
}

impl From<String> for OutpostError {
    fn from(message: String) -> Self {
        OutpostError::Generic(message)
    }
}

impl From<&str> for OutpostError {
    fn from(message: &str) -> Self {
        OutpostError::Generic(message.to_string())
    }
}

/// Result type alias using our custom error type
pub type Result<T> = std::result::Result<T, OutpostError>;
