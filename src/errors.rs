//! Shared error types for servicemap

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for servicemap operations
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or inconsistent dependency graph
    #[error("Graph error: {0}")]
    Graph(String),

    /// Configuration errors (bounds, unknown optimizer, bad weights)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Validation errors on values passed between components
    #[error("Validation error: {0}")]
    Validation(String),

    /// Solver execution errors
    #[error("Solver error: {0}")]
    Solver(String),

    /// Solution store errors
    #[error("Store error: {message}")]
    Store {
        message: String,
        path: Option<PathBuf>,
    },

    /// Generic errors with context
    #[error("{context}: {message}")]
    WithContext { context: String, message: String },

    /// IO errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// TOML errors
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

impl Error {
    pub fn graph(message: impl Into<String>) -> Self {
        Self::Graph(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn solver(message: impl Into<String>) -> Self {
        Self::Solver(message.into())
    }

    /// Create a store error with path context
    pub fn store(message: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self::Store {
            message: message.into(),
            path,
        }
    }

    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            message: self.to_string(),
        }
    }
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}
