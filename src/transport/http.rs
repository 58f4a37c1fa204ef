//! HTTP transport built on reqwest

use super::{Transport, TransportResponse};
use crate::config::DispatcherConfig;
use crate::error::{BgRemovalError, Result};
use crate::request::PreparedRequest;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::Client;

/// Sends prepared requests as multipart/form-data POSTs
///
/// Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a transport honouring the timeouts in `config`
    ///
    /// # Errors
    /// - Failed to create HTTP client
    pub fn new(config: &DispatcherConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.as_str());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| BgRemovalError::network_error("Failed to create HTTP client", &e))?;

        Ok(Self { client })
    }

    fn build_form(request: &PreparedRequest<'_>) -> Result<Form> {
        let file = Part::bytes(request.file.data.to_vec())
            .file_name(request.file.file_name.to_string())
            .mime_str(request.file.mime_type)
            .map_err(|e| {
                BgRemovalError::invalid_input(format!(
                    "invalid MIME type '{}': {}",
                    request.file.mime_type, e
                ))
            })?;

        let form = request
            .fields
            .iter()
            .fold(Form::new().part(request.file.field, file), |form, (name, value)| {
                form.text(*name, *value)
            });
        Ok(form)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &PreparedRequest<'_>) -> Result<TransportResponse> {
        let form = Self::build_form(request)?;
        let context = format!("POST {} for {}", request.endpoint, request.service);

        tracing::debug!(
            endpoint = %request.endpoint,
            file_field = request.file.field,
            bytes = request.file.data.len(),
            "Sending removal request"
        );

        let response = self
            .client
            .post(request.endpoint)
            .header(request.auth_header, request.auth_value.as_str())
            .multipart(form)
            .send()
            .await
            .map_err(|e| BgRemovalError::network_error(&context, &e))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        let body = response
            .bytes()
            .await
            .map_err(|e| BgRemovalError::network_error(&format!("{context}: reading body"), &e))?
            .to_vec();

        tracing::debug!(status, content_type = ?content_type, bytes = body.len(), "Received response");

        Ok(TransportResponse {
            status,
            content_type,
            body,
        })
    }
}
