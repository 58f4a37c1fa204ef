//! Configuration conversion utilities for CLI arguments

use crate::cli::main_impl::Cli;
use crate::{config::DispatcherConfig, registry::ServiceRegistry, service::ServiceId};
use anyhow::{Context, Result};

/// Convert CLI arguments to a `DispatcherConfig`
pub(crate) struct CliConfigBuilder;

impl CliConfigBuilder {
    /// Build the dispatcher configuration from CLI arguments and the process environment
    pub(crate) fn from_cli(cli: &Cli) -> Result<DispatcherConfig> {
        Self::from_cli_with_lookup(cli, |key| std::env::var(key).ok())
    }

    /// Build from CLI arguments; `--timeout` beats the environment, which beats the default
    pub(crate) fn from_cli_with_lookup<F>(cli: &Cli, lookup: F) -> Result<DispatcherConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = DispatcherConfig::builder()
            .apply_env(lookup)
            .context("Invalid timeout in environment")?;

        if let Some(secs) = cli.timeout {
            builder = builder.timeout_secs(secs);
        }

        builder.build().context("Invalid dispatcher configuration")
    }

    /// Service named on the command line, else the registry's selection
    pub(crate) fn resolve_service(cli: &Cli, registry: &ServiceRegistry) -> ServiceId {
        cli.service.unwrap_or_else(|| registry.selected_service())
    }
}
