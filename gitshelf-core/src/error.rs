//! Unified error handling system
//!
//! Provides the typed error taxonomy shared by the engine and the HTTP layer,
//! with context for tracking and recovery suggestions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

pub type ShelfResult<T> = Result<T, ShelfError>;

/// Error context providing additional information for debugging and recovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Timestamp when error occurred
    pub timestamp: DateTime<Utc>,
    /// Component where error originated
    pub component: String,
    /// Operation being performed when error occurred
    pub operation: Option<String>,
    /// Additional metadata
    pub metadata: std::collections::HashMap<String, String>,
    /// Recovery suggestions
    pub recovery_suggestions: Vec<String>,
}

impl ErrorContext {
    pub fn new(component: &str) -> Self {
        Self {
            error_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            component: component.to_string(),
            operation: None,
            metadata: std::collections::HashMap::new(),
            recovery_suggestions: Vec::new(),
        }
    }

    pub fn with_operation(mut self, operation: &str) -> Self {
        self.operation = Some(operation.to_string());
        self
    }

    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.recovery_suggestions.push(suggestion.to_string());
        self
    }
}

/// Main error type for gitshelf
#[derive(Error, Debug)]
pub enum ShelfError {
    /// A request path could not be split into its group/name/path parts
    #[error("Malformed path: {message}")]
    MalformedPath {
        message: String,
        context: ErrorContext,
    },

    /// The store root could not be scanned
    #[error("Catalog unavailable: {message}")]
    CatalogUnavailable {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Resource not found: {resource}")]
    NotFound {
        resource: String,
        context: ErrorContext,
    },

    /// A caller-supplied sub-path resolved outside its repository
    #[error("Path escapes repository root: {path}")]
    PathEscape { path: String, context: ErrorContext },

    /// The path exists but is neither a bare nor a worktree repository
    #[error("Not a repository: {path}")]
    NotInitialized { path: String, context: ErrorContext },

    #[error("Content unavailable for '{path}': {message}")]
    ContentUnavailable {
        path: String,
        message: String,
        context: ErrorContext,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
        context: ErrorContext,
    },

    /// Create or quarantine failed
    #[error("Lifecycle error: {message}")]
    Lifecycle {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    /// The version-control tool could not be run or failed unexpectedly
    #[error("Git error: {message}")]
    Git {
        message: String,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ShelfError {
    /// Get the error context
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            ShelfError::MalformedPath { context, .. } => Some(context),
            ShelfError::CatalogUnavailable { context, .. } => Some(context),
            ShelfError::NotFound { context, .. } => Some(context),
            ShelfError::PathEscape { context, .. } => Some(context),
            ShelfError::NotInitialized { context, .. } => Some(context),
            ShelfError::ContentUnavailable { context, .. } => Some(context),
            ShelfError::Validation { context, .. } => Some(context),
            ShelfError::Lifecycle { context, .. } => Some(context),
            ShelfError::Git { context, .. } => Some(context),
            ShelfError::Config { context, .. } => Some(context),
            ShelfError::Io(_) => None,
        }
    }

    /// Whether the error was caused by the request rather than by the server
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ShelfError::MalformedPath { .. }
                | ShelfError::NotFound { .. }
                | ShelfError::PathEscape { .. }
                | ShelfError::NotInitialized { .. }
                | ShelfError::ContentUnavailable { .. }
                | ShelfError::Validation { .. }
        )
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        let error_id = self.context().map(|c| c.error_id.as_str());
        match self {
            ShelfError::PathEscape { .. } => {
                warn!(error_id = ?error_id, error = %self, "Rejected path escape attempt");
            }
            _ if self.is_client_error() => {
                warn!(error_id = ?error_id, error = %self, "Request rejected");
            }
            _ => {
                error!(error_id = ?error_id, error = %self, "Error occurred");
            }
        }
    }
}

/// Convenience macros for creating errors with context
#[macro_export]
macro_rules! malformed_path_error {
    ($msg:expr, $component:expr) => {
        $crate::ShelfError::MalformedPath {
            message: $msg.to_string(),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Percent-encode group, repository name and sub-path separately"),
        }
    };
}

#[macro_export]
macro_rules! validation_error {
    ($msg:expr, $field:expr, $component:expr) => {
        $crate::ShelfError::Validation {
            message: $msg.to_string(),
            field: Some($field.to_string()),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check the field value and format"),
        }
    };
}

#[macro_export]
macro_rules! not_found_error {
    ($resource:expr, $component:expr) => {
        $crate::ShelfError::NotFound {
            resource: $resource.to_string(),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check if the group and repository exist"),
        }
    };
}

#[macro_export]
macro_rules! lifecycle_error {
    ($msg:expr, $component:expr) => {
        $crate::ShelfError::Lifecycle {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component),
        }
    };
    ($msg:expr, $component:expr, $source:expr) => {
        $crate::ShelfError::Lifecycle {
            message: $msg.to_string(),
            source: Some(Box::new($source)),
            context: $crate::ErrorContext::new($component),
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_classification() {
        let err = not_found_error!("git/proj", "test");
        assert!(err.is_client_error());

        let err = ShelfError::Git {
            message: "git exited with 128".to_string(),
            context: ErrorContext::new("test"),
        };
        assert!(!err.is_client_error());

        let err = lifecycle_error!("rename failed", "test");
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_context_builder() {
        let context = ErrorContext::new("tree_reader")
            .with_operation("list")
            .with_metadata("path", "src")
            .with_suggestion("retry");

        assert_eq!(context.component, "tree_reader");
        assert_eq!(context.operation.as_deref(), Some("list"));
        assert_eq!(context.metadata.get("path").map(String::as_str), Some("src"));
        assert_eq!(context.recovery_suggestions.len(), 1);
        assert!(!context.error_id.is_empty());
    }

    #[test]
    fn test_io_error_has_no_context() {
        let err: ShelfError = std::io::Error::new(std::io::ErrorKind::Other, "boom").into();
        assert!(err.context().is_none());
        err.log();
    }
}
