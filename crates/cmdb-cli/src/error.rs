//! Error types for cmdb-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from cmdb-core
    #[error(transparent)]
    Core(#[from] cmdb_core::Error),

    /// Error from cmdb-model
    #[error(transparent)]
    Model(#[from] cmdb_model::Error),

    /// Error from cmdb-remote
    #[error(transparent)]
    Remote(#[from] cmdb_remote::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}
