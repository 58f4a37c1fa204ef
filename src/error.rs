//! Error types for background removal requests

use crate::service::ServiceId;
use thiserror::Error;

/// Result type alias for background removal operations
pub type Result<T> = std::result::Result<T, BgRemovalError>;

/// Longest upstream message carried into an error, in characters
const MAX_UPSTREAM_MESSAGE_CHARS: usize = 300;

/// Error taxonomy for dispatching images to removal services
#[derive(Error, Debug)]
pub enum BgRemovalError {
    /// Missing credential or invalid local configuration; never reaches the network
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Network failure, non-2xx status, or a response body that is not an image
    #[error("Transport error: {message}")]
    Transport {
        /// Upstream HTTP status, when a response was received
        status: Option<u16>,
        /// Description including upstream detail where available
        message: String,
    },

    /// Identifier outside the closed set of supported services
    #[error("Unsupported service: {0}")]
    UnsupportedService(String),

    /// Payload rejected before sending (empty, or not an image)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Image handle used after it was released
    #[error("Image handle released: {0}")]
    HandleReleased(String),

    /// Input/output errors (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error for unexpected conditions
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BgRemovalError {
    /// Create a new configuration error
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a new transport error without an upstream status
    pub fn transport<S: Into<String>>(msg: S) -> Self {
        Self::Transport {
            status: None,
            message: msg.into(),
        }
    }

    /// Create a new unsupported service error
    pub fn unsupported_service<S: Into<String>>(id: S) -> Self {
        Self::UnsupportedService(id.into())
    }

    /// Create a new invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// Credential for `service` is empty; names the variable that supplies it
    pub fn missing_credential(service: ServiceId) -> Self {
        Self::Configuration(format!(
            "credential missing for service {} (set {})",
            service,
            service.credential_env()
        ))
    }

    /// Non-success HTTP status from the service, with whatever the body explained
    pub fn upstream_status(service: ServiceId, status: u16, upstream: Option<&str>) -> Self {
        let reason = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|code| code.canonical_reason())
            .unwrap_or("Unknown Status");
        let detail = match upstream {
            Some(text) if !text.trim().is_empty() => format!(": {}", truncate(text.trim())),
            _ => String::new(),
        };

        Self::Transport {
            status: Some(status),
            message: format!("{service} returned HTTP {status} {reason}{detail}"),
        }
    }

    /// Create network error with operation context
    pub fn network_error(context: &str, error: &reqwest::Error) -> Self {
        let message = if error.is_timeout() {
            format!("{context}: request timed out ({error})")
        } else if error.is_connect() {
            format!("{context}: connection failed ({error})")
        } else {
            format!("{context}: {error}")
        };

        Self::Transport {
            status: error.status().map(|s| s.as_u16()),
            message,
        }
    }

    /// Create file I/O error with operation context
    pub fn file_io_error<P: AsRef<std::path::Path>>(
        operation: &str,
        path: P,
        error: &std::io::Error,
    ) -> Self {
        let path_display = path.as_ref().display();
        Self::Io(std::io::Error::new(
            error.kind(),
            format!("Failed to {} '{}': {}", operation, path_display, error),
        ))
    }

    /// Upstream HTTP status, if this error came from a service response
    #[must_use]
    pub fn upstream_status_code(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            _ => None,
        }
    }

    /// Short category label, stable across message wording changes
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::Transport { .. } => "transport",
            Self::UnsupportedService(_) => "unsupported_service",
            Self::InvalidInput(_) => "invalid_input",
            Self::HandleReleased(_) => "handle_released",
            Self::Io(_) => "io",
            Self::Internal(_) => "internal",
        }
    }
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_UPSTREAM_MESSAGE_CHARS {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(MAX_UPSTREAM_MESSAGE_CHARS).collect();
    cut.push('…');
    cut
}
