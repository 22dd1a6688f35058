use thiserror::Error;

use crate::ast::AstError;
use crate::config::ConfigError;
use crate::regalloc::AllocationError;

/// Result type for jmmc operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the jmmc compiler core
///
/// Semantic problems in the analyzed program are never reported through this
/// type; they travel as [`crate::report::Report`] values. `Error` covers the
/// cases where the pipeline itself cannot proceed.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed AST: {0}")]
    Ast(#[from] AstError),

    #[error("Invalid AST JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Register allocation failed: {0}")]
    Allocation(#[from] AllocationError),

    #[error("Lowering error in method '{method}': {message}")]
    Lowering { method: String, message: String },

    #[error("Internal compiler error: {message}")]
    Internal { message: String },
}

impl Error {
    /// Create a lowering error for the given method
    pub fn lowering_error(method: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Lowering {
            method: method.into(),
            message: message.into(),
        }
    }

    /// Create an internal compiler error
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }
}
