//! Background Removal CLI Tool
//!
//! Command-line front end: picks a service, sends one image, saves the result.

use super::config::CliConfigBuilder;
use crate::{
    dispatcher::BackgroundRemovalDispatcher,
    registry::ServiceRegistry,
    service::ServiceId,
    services::{io::STDIO_MARKER, ImageIOService},
    tracing_config::{init_cli_tracing, spans, TracingFormat},
    types::ImagePayload,
};
use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Remove image backgrounds through third-party web services
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "bgremove-api")]
pub struct Cli {
    /// Input image file (use "-" for stdin)
    #[arg(value_name = "INPUT", required_unless_present = "list_services")]
    pub input: Option<String>,

    /// Output file. Use "-" for stdout [default: removed-background.<ext>]
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: Option<String>,

    /// Service to use (removebg, photoroom, withoutbg, pixian, removebgapi) [default: $SELECTED_SERVICE or removebg]
    #[arg(short, long, value_name = "SERVICE")]
    pub service: Option<ServiceId>,

    /// Request timeout in seconds (0 = wait indefinitely) [default: $BGREMOVE_TIMEOUT_SECS or 60]
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Load credentials from this .env file instead of ./.env
    #[arg(long, value_name = "PATH")]
    pub env_file: Option<PathBuf>,

    /// List services with their quota, pricing and credential status, then exit
    #[arg(long)]
    pub list_services: bool,

    /// Print the service list as JSON (with --list-services)
    #[arg(long, requires = "list_services")]
    pub json: bool,

    /// Log output format: console, compact or json (json needs the tracing-json feature)
    #[arg(long, value_name = "FORMAT", default_value = "console")]
    pub log_format: TracingFormat,

    /// Enable verbose logging (-v: INFO, -vv: DEBUG, -vvv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

pub async fn main() -> Result<()> {
    let cli = Cli::parse();

    load_env_file(cli.env_file.as_deref())?;
    let session_id = init_cli_tracing(cli.verbose, cli.log_format).context("Failed to initialize tracing")?;

    let registry = ServiceRegistry::from_env().context("Failed to read service configuration")?;

    if cli.list_services {
        return list_services(&registry, cli.json);
    }

    let Some(input) = cli.input.as_deref() else {
        anyhow::bail!("An input image is required");
    };

    let config = CliConfigBuilder::from_cli(&cli).context("Invalid configuration")?;
    let service = CliConfigBuilder::resolve_service(&cli, &registry);
    let _session = spans::session(&session_id, service.as_str()).entered();

    let payload = read_input(input).await?;
    info!(
        input = %input,
        mime_type = payload.mime_type(),
        bytes = payload.len(),
        "Loaded input"
    );

    let dispatcher = BackgroundRemovalDispatcher::new(Arc::new(registry), &config)
        .context("Failed to create dispatcher")?;
    let display_name = dispatcher.registry().get_config(service).name.clone();

    let spinner = create_spinner(&display_name);
    let result = dispatcher.remove_background(service, &payload).await;
    spinner.finish_and_clear();

    let elapsed = result.elapsed;
    let image = result
        .into_result()
        .with_context(|| format!("{display_name} could not remove the background"))?;

    let destination = ImageIOService::resolve_output(cli.output.as_deref(), &image);
    let written = {
        let _io = spans::file_io("write", &destination).entered();
        ImageIOService::write_output(&image, &destination).await
    };
    // The handle is no longer displayed once written, whatever the outcome.
    image.release();
    written.with_context(|| format!("Failed to write result to {destination}"))?;

    if destination != STDIO_MARKER {
        eprintln!(
            "✅ Background removed with {} in {:.2}s → {}",
            display_name,
            elapsed.as_secs_f64(),
            destination
        );
    }

    Ok(())
}

/// Load `.env`-style variables before the registry reads the environment
fn load_env_file(path: Option<&std::path::Path>) -> Result<()> {
    match path {
        Some(path) => {
            dotenvy::from_path(path)
                .with_context(|| format!("Failed to load env file {}", path.display()))?;
        },
        None => {
            // A missing ./.env is normal; variables may come from the shell.
            if let Err(e) = dotenvy::dotenv() {
                if !e.not_found() {
                    return Err(e).context("Failed to load .env");
                }
            }
        },
    }
    Ok(())
}

async fn read_input(input: &str) -> Result<ImagePayload> {
    let _io = spans::file_io("read", input).entered();
    if input == STDIO_MARKER {
        debug!("Reading image from stdin");
        return ImageIOService::load_payload_from_reader(tokio::io::stdin())
            .await
            .context("Failed to read image from stdin");
    }

    ImageIOService::load_payload(input)
        .await
        .with_context(|| format!("Failed to load image {input}"))
}

fn create_spinner(service_name: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed}] {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(format!("Removing background with {service_name}..."));
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Print every service with its credential status
fn list_services(registry: &ServiceRegistry, json: bool) -> Result<()> {
    if json {
        let entries: Vec<_> = registry.iter().collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&entries).context("Failed to serialize services")?
        );
        return Ok(());
    }

    println!("🔌 Background Removal Services");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    for config in registry.iter() {
        let selected = if config.service == registry.selected_service() {
            " (selected)"
        } else {
            ""
        };
        let status = if config.is_configured() {
            "✅ Configured".to_string()
        } else {
            format!("❌ Missing {}", config.credential_env)
        };

        println!("📦 {} [{}]{}", config.name, config.service, selected);
        println!("  └─ Credential: {status}");
        println!("  └─ Free quota: {}", config.quota);
        println!("  └─ Pricing: {}", config.pricing);
        println!("  └─ Docs: {}", config.docs);
        println!("  └─ Sign up: {}", config.signup);
        println!();
    }

    println!("💡 Select a service with --service ID or the SELECTED_SERVICE variable.");
    Ok(())
}
