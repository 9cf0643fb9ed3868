//! Remote Access Error Types
//!
//! Errors raised while talking to the remote graph store. The service layer
//! wraps these with the object and operation they concern.

use thiserror::Error;

/// Credential fetch or validation failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No credential configured at all
    #[error("No credentials configured: {0}")]
    MissingCredentials(String),

    /// Token endpoint rejected the credential
    #[error("Token request rejected with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    /// Token endpoint unreachable or returned garbage
    #[error("Token request failed: {0}")]
    RequestFailed(String),
}

/// Remote store failures
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Could not obtain a bearer token
    #[error("Authentication failed: {0}")]
    Authentication(#[from] AuthError),

    /// The store answered with a non-success status
    #[error("{operation} failed with HTTP {status}: {body}")]
    Status {
        operation: String,
        status: u16,
        body: String,
    },

    /// Network-level failure
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The store answered 2xx with a body we could not decode
    #[error("Invalid response from {operation}: {message}")]
    Decode { operation: String, message: String },

    /// The outbound request queue is no longer running
    #[error("Request queue closed")]
    QueueClosed,
}

impl RemoteError {
    /// Create a status error
    pub fn status(operation: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            operation: operation.into(),
            status,
            body: body.into(),
        }
    }

    /// Create a decode error
    pub fn decode(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// HTTP status carried by this error, if any
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Authentication(AuthError::Rejected { status, .. }) => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Raw response body carried by this error, if any
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Status { body, .. } => Some(body),
            Self::Authentication(AuthError::Rejected { body, .. }) => Some(body),
            _ => None,
        }
    }
}

/// Convenience alias for remote results
pub type RemoteResult<T> = Result<T, RemoteError>;
