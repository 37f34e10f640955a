//! Error types for cmdb-model

use std::path::PathBuf;

/// Result type for cmdb-model operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading or mutating a model
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested type name is not a known element or relationship type
    #[error("Unknown type: {name}")]
    UnknownType { name: String },

    /// The requested type exists but is of the other kind
    #[error("{name} is not {expected} type")]
    WrongKind { name: String, expected: &'static str },

    /// An object with this identifier already lives in the model
    #[error("Duplicate identifier: {id}")]
    DuplicateId { id: String },

    /// Folder, view, node or concept not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Model file could not be parsed
    #[error("Invalid model file {path}: {message}")]
    InvalidModel { path: PathBuf, message: String },

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
