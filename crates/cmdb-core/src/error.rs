//! Error types for cmdb-core

use std::path::PathBuf;

/// Result type for cmdb-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring or running a synchronization
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A configuration key is missing, malformed or cannot be evaluated
    #[error("Configuration error on '{key}': {message}")]
    Configuration { key: String, message: String },

    /// Configuration file not found
    #[error("Configuration not found at {path}")]
    ConfigNotFound { path: PathBuf },

    /// Configuration file larger than the accepted size
    #[error("Configuration file {path} is too large ({size} bytes)")]
    ConfigTooLarge { path: PathBuf, size: u64 },

    /// Unknown import mode
    #[error("Invalid import mode: {mode}")]
    InvalidMode { mode: String },

    /// A mandatory field needed a reference link that could not be followed
    #[error("Cannot evaluate '{key}': {source}")]
    Dereference {
        key: String,
        #[source]
        source: cmdb_expr::Error,
    },

    /// The identifier belongs to an object of another kind
    #[error("{id} is a {found}, expected {expected}")]
    TypeMismatch {
        id: String,
        expected: &'static str,
        found: &'static str,
    },

    /// The relationship type cannot link the two endpoint types
    #[error("{relationship} is not allowed from {source_type} to {target_type}")]
    InvalidRelationship {
        source_type: String,
        target_type: String,
        relationship: String,
    },

    /// The relationship references an element that is not in the model
    #[error("Relationship {id} references unknown {end} {endpoint}")]
    UnresolvedEndpoint {
        id: String,
        end: &'static str,
        endpoint: String,
    },

    /// The progress collaborator asked to stop
    #[error("Synchronization cancelled")]
    Cancelled,

    // Transparent wrappers for underlying crate errors
    /// Batch fetch failed or returned an error envelope
    #[error(transparent)]
    RemoteService(#[from] cmdb_remote::Error),

    /// Malformed expression in the mapping
    #[error(transparent)]
    Expression(#[from] cmdb_expr::Error),

    /// Target model refused a mutation
    #[error(transparent)]
    Model(#[from] cmdb_model::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// TOML deserialization error
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),
}

impl Error {
    pub(crate) fn configuration(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Configuration {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Whether this error stops the whole batch rather than one record
    pub fn aborts_batch(&self) -> bool {
        !matches!(
            self,
            Error::TypeMismatch { .. }
                | Error::InvalidRelationship { .. }
                | Error::UnresolvedEndpoint { .. }
                | Error::Model(_)
        )
    }
}
