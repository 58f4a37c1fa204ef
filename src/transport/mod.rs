//! Transports that carry prepared requests to the services
//!
//! - HTTP transport (reqwest, multipart/form-data)
//! - Recording mock for tests

pub mod http;

// Test utilities for transport testing
#[cfg(test)]
pub mod test_utils;

pub use self::http::HttpTransport;

use crate::error::Result;
use crate::request::PreparedRequest;
use async_trait::async_trait;

/// Raw reply from a service; the body is fully buffered
#[derive(Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,
    /// Value of the `Content-Type` header, if any
    pub content_type: Option<String>,
    /// Response body
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Whether the status is in the 2xx range
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl std::fmt::Debug for TransportResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportResponse")
            .field("status", &self.status)
            .field("content_type", &self.content_type)
            .field("len", &self.body.len())
            .finish()
    }
}

/// Sends one prepared request and returns the buffered reply
///
/// Implementations report any received HTTP response as `Ok`, whatever its
/// status; `Err` is reserved for failures where no response arrived
/// (connection, TLS, timeout, body read).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a single POST described by `request`
    ///
    /// # Errors
    /// - Network failures, timeouts, unreadable response bodies
    async fn send(&self, request: &PreparedRequest<'_>) -> Result<TransportResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_range() {
        let response = |status| TransportResponse {
            status,
            content_type: None,
            body: Vec::new(),
        };
        assert!(response(200).is_success());
        assert!(response(204).is_success());
        assert!(!response(199).is_success());
        assert!(!response(302).is_success());
        assert!(!response(403).is_success());
    }
}
