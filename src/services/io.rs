//! Image I/O operations service
//!
//! This module keeps file and stream handling out of the dispatcher: it turns
//! files and readers into [`ImagePayload`]s and writes [`ImageHandle`]s back
//! out.

use crate::{
    error::{BgRemovalError, Result},
    handle::ImageHandle,
    types::ImagePayload,
};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Path meaning standard input (for inputs) or standard output (for outputs)
pub const STDIO_MARKER: &str = "-";

/// Image formats the services accept but the `image` crate cannot sniff
const EXTRA_IMAGE_EXTENSIONS: &[(&str, &str)] = &[("heic", "image/heic"), ("heif", "image/heif")];

/// Service for handling image file input/output operations
pub struct ImageIOService;

impl ImageIOService {
    /// Load an image file as a payload
    ///
    /// The MIME type is taken from the file content when recognisable,
    /// otherwise from the extension.
    ///
    /// # Errors
    /// - File missing or unreadable
    /// - Neither content nor extension identifies an image
    ///
    /// # Examples
    /// ```rust,no_run
    /// use bgremove_api::services::ImageIOService;
    ///
    /// # async fn example() -> anyhow::Result<()> {
    /// let payload = ImageIOService::load_payload("portrait.jpg").await?;
    /// assert!(payload.mime_type().starts_with("image/"));
    /// # Ok(())
    /// # }
    /// ```
    pub async fn load_payload<P: AsRef<Path>>(path: P) -> Result<ImagePayload> {
        let path_ref = path.as_ref();

        if !path_ref.exists() {
            return Err(BgRemovalError::file_io_error(
                "read image file",
                path_ref,
                &std::io::Error::new(std::io::ErrorKind::NotFound, "file does not exist"),
            ));
        }

        let data = tokio::fs::read(path_ref)
            .await
            .map_err(|e| BgRemovalError::file_io_error("read image file", path_ref, &e))?;

        if data.is_empty() {
            return Err(BgRemovalError::invalid_input(format!(
                "'{}' is empty",
                path_ref.display()
            )));
        }

        let mime_type = match image::guess_format(&data) {
            Ok(format) => format.to_mime_type().to_string(),
            Err(e) => {
                tracing::debug!(
                    path = %path_ref.display(),
                    error = %e,
                    "Content-based detection failed, falling back to extension"
                );
                Self::mime_from_extension(path_ref).ok_or_else(|| {
                    BgRemovalError::invalid_input(format!(
                        "'{}' is not a recognised image",
                        path_ref.display()
                    ))
                })?
            },
        };

        let payload = ImagePayload::new(data, mime_type);
        Ok(match path_ref.file_name().and_then(|n| n.to_str()) {
            Some(name) => payload.with_file_name(name),
            None => payload,
        })
    }

    /// Load a payload from an async reader such as stdin
    ///
    /// # Errors
    /// - Read failure
    /// - Data is empty or not a recognised image
    pub async fn load_payload_from_reader<R: AsyncRead + Unpin>(mut reader: R) -> Result<ImagePayload> {
        let mut buffer = Vec::new();
        reader
            .read_to_end(&mut buffer)
            .await
            .map_err(|e| BgRemovalError::invalid_input(format!("Failed to read from stream: {e}")))?;

        ImagePayload::from_bytes(buffer)
    }

    /// MIME type implied by a file extension
    #[must_use]
    pub fn mime_from_extension<P: AsRef<Path>>(path: P) -> Option<String> {
        let path_ref = path.as_ref();
        if let Ok(format) = image::ImageFormat::from_path(path_ref) {
            return Some(format.to_mime_type().to_string());
        }

        let ext = path_ref.extension()?.to_str()?.to_ascii_lowercase();
        EXTRA_IMAGE_EXTENSIONS
            .iter()
            .find(|(known, _)| *known == ext)
            .map(|(_, mime)| (*mime).to_string())
    }

    /// Destination for a result: the explicit output, or the handle's suggested name
    #[must_use]
    pub fn resolve_output(output: Option<&str>, handle: &ImageHandle) -> String {
        match output {
            Some(dest) if !dest.trim().is_empty() => dest.to_string(),
            _ => handle.suggested_file_name(),
        }
    }

    /// Write a result image to `destination` ([`STDIO_MARKER`] means stdout)
    ///
    /// Parent directories are created as needed.
    ///
    /// # Errors
    /// - Handle already released
    /// - Write failure
    pub async fn write_output(handle: &ImageHandle, destination: &str) -> Result<()> {
        if destination == STDIO_MARKER {
            let mut stdout = tokio::io::stdout();
            Self::write_to_writer(handle, &mut stdout).await?;
            return Ok(());
        }

        let path = PathBuf::from(destination);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| BgRemovalError::file_io_error("create output directory", parent, &e))?;
        }
        handle.save(&path).await
    }

    /// Write a result image to any async writer, returning the byte count
    ///
    /// # Errors
    /// - Handle already released
    /// - Write failure
    pub async fn write_to_writer<W: AsyncWrite + Unpin>(handle: &ImageHandle, writer: &mut W) -> Result<u64> {
        let data = handle.bytes()?;
        writer.write_all(&data).await?;
        writer.flush().await?;
        Ok(data.len() as u64)
    }
}
