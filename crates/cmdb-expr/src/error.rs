//! Error types for cmdb-expr

/// Result type for cmdb-expr operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while parsing or evaluating expressions
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Malformed variable syntax
    #[error("Malformed expression \"{expression}\": {message}")]
    Format { expression: String, message: String },

    /// A reference link could not be followed
    #[error("Cannot follow reference link {url}: {message}")]
    Dereference { url: String, message: String },
}

impl Error {
    pub(crate) fn format(expression: &str, message: impl Into<String>) -> Self {
        Error::Format {
            expression: expression.to_string(),
            message: message.into(),
        }
    }
}
