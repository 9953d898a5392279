//! Error types for ipfs-shell.
//!
//! Every failure is returned to the caller as a `ShellError`; nothing is
//! retried or recovered internally.

use thiserror::Error;

/// Result type alias using `ShellError`.
pub type Result<T> = std::result::Result<T, ShellError>;

/// Main error type for all client operations.
#[derive(Debug, Error)]
pub enum ShellError {
    // ═══════════════════════════════════════════════════════════════════════════
    // TRANSPORT ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// HTTP request failed before a response was received.
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// The configured client timeout elapsed.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The daemon answered with a redirect; redirects are never followed.
    #[error("unexpected redirect to {}", location.as_deref().unwrap_or("<unknown>"))]
    UnexpectedRedirect {
        /// Value of the `Location` header, if any.
        location: Option<String>,
    },

    // ═══════════════════════════════════════════════════════════════════════════
    // DAEMON ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Non-2xx response carrying the daemon's error message.
    #[error("{command}: {message}")]
    Daemon {
        /// Command that failed (e.g. `pin/add`).
        command: String,
        /// Message reported by the daemon.
        message: String,
        /// Daemon error code (0 when absent).
        code: i64,
    },

    // ═══════════════════════════════════════════════════════════════════════════
    // DECODING ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Response body could not be decoded into the requested shape.
    #[error("Decode error: {0}")]
    DecodeError(String),

    /// A multi-result command produced zero results.
    #[error("no results received")]
    NoResults,

    /// The response decoded but did not contain what the command promises.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// The subscription was cancelled or its stream ended.
    #[error("Subscription closed")]
    SubscriptionClosed,

    /// `dht/findpeer` returned no addresses for the peer.
    #[error("Peer not found: {0}")]
    PeerNotFound(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // LOCAL ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// File I/O error (e.g. reading a path passed to `add_file`).
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The API address could not be parsed.
    #[error("Invalid API address '{address}': {reason}")]
    InvalidAddress {
        /// Address as given.
        address: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ShellError {
    /// Creates a daemon error for `command`.
    pub fn daemon(command: impl Into<String>, message: impl Into<String>, code: i64) -> Self {
        ShellError::Daemon {
            command: command.into(),
            message: message.into(),
            code,
        }
    }

    /// Returns true if the request never produced a usable response.
    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            ShellError::HttpError(_) | ShellError::Timeout(_) | ShellError::UnexpectedRedirect { .. }
        )
    }

    /// Returns true if the daemon rejected the command.
    pub fn is_daemon_error(&self) -> bool {
        matches!(self, ShellError::Daemon { .. })
    }

    /// Returns true if the response body was not in the expected shape.
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            ShellError::JsonError(_)
                | ShellError::DecodeError(_)
                | ShellError::NoResults
                | ShellError::UnexpectedResponse(_)
        )
    }
}
