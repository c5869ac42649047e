//! Error handling for propbind-rs
//!
//! This module defines the crate-level error type and a Result alias used
//! outside the per-tick pipeline path (configuration, binding setup).

use crate::pipeline::error::{PipelineError, WiringError};
use crate::pipeline::id::BindingId;
use thiserror::Error;

/// Main error type for propbind-rs operations
#[derive(Error, Debug)]
pub enum BindError {
    /// Errors raised by a binding pipeline
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// A binding id that was never issued or has been unbound
    #[error("Unknown binding: {0}")]
    UnknownBinding(BindingId),

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<BindError>,
    },
}

impl BindError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        BindError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

impl From<WiringError> for BindError {
    fn from(err: WiringError) -> Self {
        BindError::Pipeline(PipelineError::Wiring(err))
    }
}

/// Result type alias for propbind-rs operations
pub type Result<T> = std::result::Result<T, BindError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<BindError>,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.into().with_context(f()))
    }
}
