//! Payload and result types exchanged with the dispatcher

use crate::error::{BgRemovalError, Result};
use crate::handle::ImageHandle;
use crate::service::ServiceId;
use std::time::Duration;

/// Caller-owned image submitted for background removal
///
/// The dispatcher only borrows a payload while it builds the outgoing
/// request; it never keeps a copy.
#[derive(Clone, PartialEq, Eq)]
pub struct ImagePayload {
    data: Vec<u8>,
    mime_type: String,
    file_name: String,
}

impl ImagePayload {
    /// Create a payload with an explicit MIME type
    pub fn new<S: Into<String>>(data: Vec<u8>, mime_type: S) -> Self {
        let mime_type = mime_type.into();
        let extension = image::ImageFormat::from_mime_type(&mime_type)
            .and_then(|format| format.extensions_str().first().copied())
            .unwrap_or("bin");
        Self {
            data,
            file_name: format!("image.{extension}"),
            mime_type,
        }
    }

    /// Create a payload, detecting the MIME type from the image's magic bytes
    ///
    /// # Errors
    /// - The data is empty or not in a recognised image format
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        if data.is_empty() {
            return Err(BgRemovalError::invalid_input("image data is empty"));
        }
        let format = image::guess_format(&data).map_err(|e| {
            BgRemovalError::invalid_input(format!("unrecognised image format: {e}"))
        })?;
        Ok(Self::new(data, format.to_mime_type()))
    }

    /// Override the file name sent with the multipart part
    #[must_use]
    pub fn with_file_name<S: Into<String>>(mut self, file_name: S) -> Self {
        self.file_name = file_name.into();
        self
    }

    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Reject payloads no service would accept
    ///
    /// # Errors
    /// - Empty data
    /// - MIME type outside `image/*`
    pub fn validate(&self) -> Result<()> {
        if self.data.is_empty() {
            return Err(BgRemovalError::invalid_input("image data is empty"));
        }
        if !self.mime_type.to_ascii_lowercase().starts_with("image/") {
            return Err(BgRemovalError::invalid_input(format!(
                "'{}' is not an image MIME type",
                self.mime_type
            )));
        }
        Ok(())
    }
}

impl std::fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImagePayload")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.data.len())
            .finish()
    }
}

/// Normalized outcome of one removal attempt
///
/// Exactly one of `image` and `error` is populated. The caller owns the
/// image handle and must [`release`](ImageHandle::release) it once it is no
/// longer displayed.
#[derive(Debug)]
pub struct RemovalResult {
    /// Whether the service returned an image
    pub success: bool,
    /// Result image, on success
    pub image: Option<ImageHandle>,
    /// Failure, otherwise
    pub error: Option<BgRemovalError>,
    /// Service attempted; `None` only when the identifier could not be parsed
    pub service: Option<ServiceId>,
    /// Wall time spent on the attempt
    pub elapsed: Duration,
}

impl RemovalResult {
    pub(crate) fn succeeded(service: ServiceId, image: ImageHandle, elapsed: Duration) -> Self {
        Self {
            success: true,
            image: Some(image),
            error: None,
            service: Some(service),
            elapsed,
        }
    }

    pub(crate) fn failed(service: Option<ServiceId>, error: BgRemovalError, elapsed: Duration) -> Self {
        Self {
            success: false,
            image: None,
            error: Some(error),
            service,
            elapsed,
        }
    }

    /// Human-readable failure description, if the attempt failed
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }

    /// Convert into a `Result` for `?`-style callers
    ///
    /// # Errors
    /// - The attempt failed; returns its error
    pub fn into_result(self) -> Result<ImageHandle> {
        match (self.image, self.error) {
            (Some(image), _) => Ok(image),
            (None, Some(error)) => Err(error),
            (None, None) => Err(BgRemovalError::internal("removal result carried neither image nor error")),
        }
    }
}
