//! Displayable, explicitly revocable references to result images
//!
//! An [`ImageHandle`] plays the role a browser object URL plays for a web
//! client: it names the bytes a service returned, can be displayed or saved,
//! and must be released by its owner once it is no longer shown. Releasing is
//! idempotent; reading after release fails with
//! [`BgRemovalError::HandleReleased`].

use crate::error::{BgRemovalError, Result};
use std::path::Path;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// File stem used when a result is downloaded without an explicit name
pub const DEFAULT_DOWNLOAD_STEM: &str = "removed-background";

/// Reference-counted handle to a result image
///
/// Clones share the same underlying bytes; releasing through any clone
/// releases them for all.
#[derive(Clone)]
pub struct ImageHandle {
    inner: Arc<HandleInner>,
}

struct HandleInner {
    id: Uuid,
    mime_type: String,
    size: usize,
    data: RwLock<Option<Arc<[u8]>>>,
}

impl ImageHandle {
    /// Wrap `data` as a new live handle
    #[must_use]
    pub fn new<S: Into<String>>(data: Vec<u8>, mime_type: S) -> Self {
        let size = data.len();
        Self {
            inner: Arc::new(HandleInner {
                id: Uuid::new_v4(),
                mime_type: mime_type.into(),
                size,
                data: RwLock::new(Some(Arc::from(data))),
            }),
        }
    }

    /// Unique identifier of this handle
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// Opaque reference suitable for display layers, e.g. `blob:bgremove/<uuid>`
    #[must_use]
    pub fn url(&self) -> String {
        format!("blob:bgremove/{}", self.inner.id)
    }

    /// MIME type reported for the image
    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.inner.mime_type
    }

    /// Length in bytes of the image (still reported after release)
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.size
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.size == 0
    }

    /// The image bytes
    ///
    /// # Errors
    /// - The handle was released
    pub fn bytes(&self) -> Result<Arc<[u8]>> {
        let guard = self
            .inner
            .data
            .read()
            .map_err(|_| BgRemovalError::internal("image handle lock poisoned"))?;
        guard
            .as_ref()
            .map(Arc::clone)
            .ok_or_else(|| BgRemovalError::HandleReleased(self.url()))
    }

    /// Drop the bytes behind this handle
    ///
    /// Returns `true` if this call released them, `false` if they were
    /// already gone. Never fails.
    pub fn release(&self) -> bool {
        let released = match self.inner.data.write() {
            Ok(mut guard) => guard.take().is_some(),
            Err(poisoned) => poisoned.into_inner().take().is_some(),
        };
        if released {
            tracing::trace!(handle = %self.inner.id, bytes = self.inner.size, "Image handle released");
        }
        released
    }

    #[must_use]
    pub fn is_released(&self) -> bool {
        match self.inner.data.read() {
            Ok(guard) => guard.is_none(),
            Err(poisoned) => poisoned.into_inner().is_none(),
        }
    }

    /// File extension matching the MIME type (`png` when unknown)
    #[must_use]
    pub fn extension(&self) -> &'static str {
        image::ImageFormat::from_mime_type(&self.inner.mime_type)
            .and_then(|format| format.extensions_str().first().copied())
            .unwrap_or("png")
    }

    /// Name offered when the image is downloaded, e.g. `removed-background.png`
    #[must_use]
    pub fn suggested_file_name(&self) -> String {
        format!("{}.{}", DEFAULT_DOWNLOAD_STEM, self.extension())
    }

    /// Write the image to `path`
    ///
    /// # Errors
    /// - The handle was released
    /// - The file could not be written
    pub async fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let data = self.bytes()?;
        tokio::fs::write(path, &data[..])
            .await
            .map_err(|e| BgRemovalError::file_io_error("write image", path, &e))?;
        tracing::debug!(handle = %self.inner.id, path = %path.display(), bytes = data.len(), "Image saved");
        Ok(())
    }
}

impl std::fmt::Debug for ImageHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageHandle")
            .field("url", &self.url())
            .field("mime_type", &self.inner.mime_type)
            .field("size", &self.inner.size)
            .field("released", &self.is_released())
            .finish()
    }
}

impl PartialEq for ImageHandle {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for ImageHandle {}
