//! Common error types for the Time Leak Audit crates

use thiserror::Error;

/// Common result type for audit operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the audit service and its library code
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
