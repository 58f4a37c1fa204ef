#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]

//! # Background Removal Service Dispatcher
//!
//! One uniform call that removes the background of an image through any of
//! several third-party web services (remove.bg, PhotoRoom, withoutBG, Pixian
//! and removebgapi). Each service expects a different endpoint, credential
//! header and multipart layout; the dispatcher hides those differences and
//! returns either an [`ImageHandle`] to the processed image or a
//! human-readable error.
//!
//! ## Features
//!
//! - **Five services**: request shapes for every supported provider in one table
//! - **Environment configuration**: credentials from `*_API_KEY` variables, with
//!   `VITE_`-prefixed fallbacks and a `SELECTED_SERVICE` default
//! - **Uniform results**: every failure becomes a [`RemovalResult`] with a message,
//!   never a panic
//! - **Releasable handles**: result images are held in memory until released
//! - **CLI Integration**: optional command-line interface (enable with `cli` feature)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bgremove_api::{
//!     BackgroundRemovalDispatcher, DispatcherConfig, ImagePayload, ServiceId, ServiceRegistry,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let registry = Arc::new(ServiceRegistry::from_env()?);
//! let dispatcher = BackgroundRemovalDispatcher::new(registry, &DispatcherConfig::default())?;
//!
//! let payload = ImagePayload::new(std::fs::read("portrait.jpg")?, "image/jpeg");
//! let result = dispatcher.remove_background(ServiceId::PhotoRoom, &payload).await;
//!
//! match result.into_result() {
//!     Ok(image) => {
//!         image.save("portrait-cutout.png").await?;
//!         image.release();
//!     },
//!     Err(e) => eprintln!("Background removal failed: {e}"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Feature Flags
//!
//! - `cli` (default): Command-line interface, progress spinner and `.env` loading
//! - `webp-support` (default): WebP recognition for inputs and results
//! - `tracing-json`: JSON log output for the CLI
//!
//! ### Library-Only Usage
//!
//! ```toml
//! [dependencies]
//! bgremove-api = { version = "0.1", default-features = false }
//! ```

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod handle;
pub mod registry;
pub mod request;
pub mod service;
pub mod services;
#[cfg(feature = "cli")]
pub mod tracing_config;
pub mod transport;
pub mod types;

// Public API exports
pub use config::{DispatcherConfig, DispatcherConfigBuilder};
pub use dispatcher::BackgroundRemovalDispatcher;
pub use error::{BgRemovalError, Result};
pub use handle::ImageHandle;
pub use registry::{ServiceConfig, ServiceRegistry};
pub use request::{AuthScheme, PreparedRequest, RequestShape, REQUEST_SHAPES};
pub use service::ServiceId;
pub use services::ImageIOService;
pub use transport::{HttpTransport, Transport, TransportResponse};
pub use types::{ImagePayload, RemovalResult};

#[cfg(feature = "cli")]
pub use tracing_config::{init_cli_tracing, spans, TracingConfig, TracingFormat};
