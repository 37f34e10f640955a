//! Error types for cmdb-remote

/// Result type for cmdb-remote operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while talking to the inventory service
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The service answered with a non-success status
    #[error("HTTP {status} from {url}: {message}")]
    Status {
        status: u16,
        url: String,
        message: String,
    },

    /// The service answered with an error envelope or an unknown payload
    #[error("Remote service error: {0}")]
    RemoteService(String),

    /// A request URL could not be built
    #[error("Invalid URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    /// Connection, TLS or timeout failure
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// Response body is not JSON
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether the failure was reported by the service itself rather than
    /// by the transport
    pub fn is_service_error(&self) -> bool {
        matches!(self, Error::Status { .. } | Error::RemoteService(_) | Error::Json(_))
    }
}
