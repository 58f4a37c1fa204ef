//! Background removal dispatcher
//!
//! One parametrized routine serves every provider: resolve the service's
//! configuration, fail fast without a credential, lay the request out from
//! the shape table, send it, and turn the reply into an [`ImageHandle`]. Every
//! failure comes back inside the [`RemovalResult`]; nothing is raised to the
//! caller.

use crate::config::DispatcherConfig;
use crate::error::{BgRemovalError, Result};
use crate::handle::ImageHandle;
use crate::registry::ServiceRegistry;
use crate::request::PreparedRequest;
use crate::service::ServiceId;
use crate::transport::{HttpTransport, Transport, TransportResponse};
use crate::types::{ImagePayload, RemovalResult};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument};

/// JSON locations where providers put a human-readable error
const UPSTREAM_MESSAGE_POINTERS: &[&str] = &[
    "/errors/0/title",
    "/errors/0/detail",
    "/error/message",
    "/error",
    "/message",
    "/detail",
];

/// Sends images to the configured services
///
/// Holds no per-call state: concurrent calls, for the same or different
/// services, are independent. Cloning is cheap.
#[derive(Clone)]
pub struct BackgroundRemovalDispatcher {
    registry: Arc<ServiceRegistry>,
    transport: Arc<dyn Transport>,
}

impl BackgroundRemovalDispatcher {
    /// Dispatcher sending over HTTP with the given settings
    ///
    /// # Errors
    /// - Invalid configuration
    /// - Failed to create HTTP client
    pub fn new(registry: Arc<ServiceRegistry>, config: &DispatcherConfig) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::new(config)?;
        Ok(Self::with_transport(registry, Arc::new(transport)))
    }

    /// Dispatcher sending through `transport`
    #[must_use]
    pub fn with_transport(registry: Arc<ServiceRegistry>, transport: Arc<dyn Transport>) -> Self {
        Self {
            registry,
            transport,
        }
    }

    /// Registry this dispatcher resolves services from
    #[must_use]
    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    /// Remove the background of `payload` using `service`
    ///
    /// Never fails outright: configuration problems, invalid payloads,
    /// network faults and upstream errors are all reported through the
    /// returned [`RemovalResult`]. A service without a credential fails
    /// before anything is sent.
    #[instrument(skip(self, payload), fields(service = %service, bytes = payload.len()))]
    pub async fn remove_background(&self, service: ServiceId, payload: &ImagePayload) -> RemovalResult {
        let started = Instant::now();
        let outcome = self.dispatch(service, payload).await;
        let elapsed = started.elapsed();

        match outcome {
            Ok(image) => {
                info!(
                    handle = %image.id(),
                    mime_type = image.mime_type(),
                    bytes = image.len(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Background removed"
                );
                RemovalResult::succeeded(service, image, elapsed)
            },
            Err(error) => {
                debug!(kind = error.kind(), error = %error, "Background removal failed");
                RemovalResult::failed(Some(service), error, elapsed)
            },
        }
    }

    /// Remove the background using the registry's selected service
    pub async fn remove_background_selected(&self, payload: &ImagePayload) -> RemovalResult {
        self.remove_background(self.registry.selected_service(), payload)
            .await
    }

    /// Remove the background using a service named by external input
    ///
    /// An unknown name yields a failed result with
    /// [`BgRemovalError::UnsupportedService`]; it never falls back to a default.
    pub async fn remove_background_by_name(&self, service: &str, payload: &ImagePayload) -> RemovalResult {
        match service.parse::<ServiceId>() {
            Ok(id) => self.remove_background(id, payload).await,
            Err(error) => {
                debug!(requested = service, "Unsupported service requested");
                RemovalResult::failed(None, error, std::time::Duration::ZERO)
            },
        }
    }

    async fn dispatch(&self, service: ServiceId, payload: &ImagePayload) -> Result<ImageHandle> {
        let config = self.registry.get_config(service);
        if !config.is_configured() {
            return Err(BgRemovalError::missing_credential(service));
        }
        payload.validate()?;

        let request = PreparedRequest::build(config, payload);
        debug!(?request, "Prepared request");

        let response = self.transport.send(&request).await?;
        decode_response(service, response)
    }
}

impl std::fmt::Debug for BackgroundRemovalDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackgroundRemovalDispatcher")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

/// Turn a buffered reply into an image handle, or a transport error
fn decode_response(service: ServiceId, response: TransportResponse) -> Result<ImageHandle> {
    if !response.is_success() {
        let upstream = upstream_message(&response.body);
        return Err(BgRemovalError::upstream_status(
            service,
            response.status,
            upstream.as_deref(),
        ));
    }

    if response.body.is_empty() {
        return Err(BgRemovalError::transport(format!(
            "{service} returned HTTP {} with an empty body",
            response.status
        )));
    }

    let declared = response
        .content_type
        .as_deref()
        .and_then(|value| value.split(';').next())
        .map(|mime| mime.trim().to_ascii_lowercase());

    let sniffed = image::guess_format(&response.body)
        .ok()
        .map(|format| format.to_mime_type().to_string());

    // A declared image type is kept unless the body is plainly text (HTML, JSON).
    let mime_type = match (declared, sniffed) {
        (Some(mime), _) if mime.starts_with("image/") && !looks_like_text(&response.body) => mime,
        (_, Some(sniffed)) => sniffed,
        (declared, None) => {
            let detail = upstream_message(&response.body)
                .map(|text| format!(": {}", text.chars().take(200).collect::<String>()))
                .unwrap_or_default();
            return Err(BgRemovalError::transport(format!(
                "{service} returned a non-image response ({}){detail}",
                declared.as_deref().unwrap_or("no content type")
            )));
        },
    };

    Ok(ImageHandle::new(response.body, mime_type))
}

/// UTF-8 made only of printable characters and whitespace
fn looks_like_text(body: &[u8]) -> bool {
    std::str::from_utf8(body).is_ok_and(|text| text.chars().all(|c| !c.is_control() || c.is_whitespace()))
}

/// Best-effort human message from an error body
fn upstream_message(body: &[u8]) -> Option<String> {
    if body.is_empty() {
        return None;
    }

    if let Ok(json) = serde_json::from_slice::<Value>(body) {
        let found = UPSTREAM_MESSAGE_POINTERS
            .iter()
            .filter_map(|pointer| json.pointer(pointer))
            .find_map(|value| value.as_str());
        if let Some(text) = found {
            return Some(text.to_string());
        }
    }

    std::str::from_utf8(body)
        .ok()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}
