// Allow unused assignments for diagnostic fields - they're used by the macros
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

/// Scorer error type
#[derive(Error, Debug, Diagnostic)]
pub enum ScorerError {
    /// Nodes or workloads could not be listed
    #[error("Snapshot unavailable from {source_name}: {message}")]
    #[diagnostic(
        code(scorer::snapshot_unavailable),
        help("Retry the scoring pass once the cluster API or manifest is reachable again")
    )]
    SnapshotUnavailable {
        source_name: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Scoring configuration could not be loaded
    #[error("Invalid scoring configuration: {message}")]
    #[diagnostic(code(scorer::invalid_config), help("{suggestion}"))]
    InvalidConfig {
        message: String,
        suggestion: String,
    },
}

/// Result type for scorer operations
pub type Result<T> = std::result::Result<T, ScorerError>;

impl ScorerError {
    /// Create a SnapshotUnavailable error
    pub fn snapshot_unavailable(
        source_name: impl Into<String>,
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::SnapshotUnavailable {
            source_name: source_name.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an InvalidConfig error
    pub fn invalid_config(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }
}
