//! Test utilities and a mock transport for dispatcher testing
//!
//! [`MockTransport`] answers every request with a canned response (or
//! failure) and records an owned copy of each request it saw, so tests can
//! assert on headers and form fields without any network.

use super::{Transport, TransportResponse};
use crate::error::{BgRemovalError, Result};
use crate::request::PreparedRequest;
use crate::service::ServiceId;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Owned snapshot of a [`PreparedRequest`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub service: ServiceId,
    pub endpoint: String,
    pub auth_header: String,
    pub auth_value: String,
    pub fields: Vec<(String, String)>,
    pub file_field: String,
    pub file_name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl From<&PreparedRequest<'_>> for RecordedRequest {
    fn from(request: &PreparedRequest<'_>) -> Self {
        Self {
            service: request.service,
            endpoint: request.endpoint.to_string(),
            auth_header: request.auth_header.to_string(),
            auth_value: request.auth_value.clone(),
            fields: request
                .fields
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            file_field: request.file.field.to_string(),
            file_name: request.file.file_name.to_string(),
            mime_type: request.file.mime_type.to_string(),
            data: request.file.data.to_vec(),
        }
    }
}

#[derive(Debug, Clone)]
enum Reply {
    Respond(TransportResponse),
    Fail(String),
}

/// Mock transport for testing
#[derive(Debug, Clone)]
pub struct MockTransport {
    reply: Reply,
    calls: Arc<AtomicUsize>,
    history: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockTransport {
    /// Reply with `status`, `content_type` and `body` to every request
    #[must_use]
    pub fn responding(status: u16, content_type: Option<&str>, body: Vec<u8>) -> Self {
        Self::with_reply(Reply::Respond(TransportResponse {
            status,
            content_type: content_type.map(str::to_owned),
            body,
        }))
    }

    /// Reply 200 with a PNG content type and `body`
    #[must_use]
    pub fn png(body: Vec<u8>) -> Self {
        Self::responding(200, Some("image/png"), body)
    }

    /// Fail every request as if the connection broke
    #[must_use]
    pub fn failing<S: Into<String>>(message: S) -> Self {
        Self::with_reply(Reply::Fail(message.into()))
    }

    fn with_reply(reply: Reply) -> Self {
        Self {
            reply,
            calls: Arc::new(AtomicUsize::new(0)),
            history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Number of requests sent so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Requests seen so far, oldest first
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.history.lock().unwrap().clone()
    }

    /// The most recent request
    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.history.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: &PreparedRequest<'_>) -> Result<TransportResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut history) = self.history.lock() {
            history.push(RecordedRequest::from(request));
        }

        match &self.reply {
            Reply::Respond(response) => Ok(response.clone()),
            Reply::Fail(message) => Err(BgRemovalError::transport(message.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ServiceRegistry;
    use crate::types::ImagePayload;

    #[tokio::test]
    async fn test_mock_records_requests() {
        let registry = ServiceRegistry::with_credentials([(ServiceId::WithoutBg, "wb")]);
        let payload = ImagePayload::new(vec![5; 4], "image/png");
        let request = PreparedRequest::build(registry.get_config(ServiceId::WithoutBg), &payload);

        let mock = MockTransport::png(vec![1, 2, 3]);
        let response = mock.send(&request).await.unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(mock.call_count(), 1);
        let recorded = mock.last_request().unwrap();
        assert_eq!(recorded.auth_value, "Bearer wb");
        assert_eq!(recorded.fields, vec![("model".to_string(), "focus".to_string())]);
        assert_eq!(recorded.data, vec![5; 4]);
    }

    #[tokio::test]
    async fn test_failing_mock() {
        let registry = ServiceRegistry::with_credentials([(ServiceId::Pixian, "px")]);
        let payload = ImagePayload::new(vec![5], "image/png");
        let request = PreparedRequest::build(registry.get_config(ServiceId::Pixian), &payload);

        let mock = MockTransport::failing("connection reset");
        let err = mock.send(&request).await.unwrap_err();
        assert!(err.to_string().contains("connection reset"));
        assert_eq!(mock.call_count(), 1);
    }
}
