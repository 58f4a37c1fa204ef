//! Service registry: connection metadata for every supported provider
//!
//! The registry is built once at startup, either from the process environment
//! or from an injected lookup, and is read-only afterwards. Nothing here reads
//! the environment after construction.

use crate::error::Result;
use crate::service::ServiceId;
use serde::{Serialize, Serializer};

/// Environment variable selecting the active service
pub const SELECTED_SERVICE_ENV: &str = "SELECTED_SERVICE";

/// Legacy prefix (`VITE_`) from web builds; accepted as a fallback
pub const LEGACY_ENV_PREFIX: &str = "VITE_";

/// Static, credential-free description of a provider
struct CatalogueEntry {
    service: ServiceId,
    name: &'static str,
    endpoint: &'static str,
    quota: &'static str,
    pricing: &'static str,
    docs: &'static str,
    signup: &'static str,
}

static CATALOGUE: [CatalogueEntry; ServiceId::COUNT] = [
    CatalogueEntry {
        service: ServiceId::RemoveBg,
        name: "Remove.bg",
        endpoint: "https://api.remove.bg/v1.0/removebg",
        quota: "50 images per month",
        pricing: "From $0.05 per image",
        docs: "https://www.remove.bg/api",
        signup: "https://www.remove.bg/users/sign_up",
    },
    CatalogueEntry {
        service: ServiceId::PhotoRoom,
        name: "PhotoRoom",
        endpoint: "https://sdk.photoroom.com/v1/segment",
        quota: "25 images per month",
        pricing: "$0.02 per image (1000+ images)",
        docs: "https://www.photoroom.com/api",
        signup: "https://www.photoroom.com/api",
    },
    CatalogueEntry {
        service: ServiceId::WithoutBg,
        name: "WithoutBG",
        endpoint: "https://api.withoutbg.com/v1/remove",
        quota: "Unlimited with local model",
        pricing: "€0.05 per image (Pro API)",
        docs: "https://withoutbg.com",
        signup: "https://withoutbg.com",
    },
    CatalogueEntry {
        service: ServiceId::Pixian,
        name: "Pixian.AI",
        endpoint: "https://api.pixian.ai/api/v2/remove-background",
        quota: "0.25mpx unlimited use",
        pricing: "Paid for 25mpx images",
        docs: "https://pixian.ai/api",
        signup: "https://pixian.ai/api",
    },
    CatalogueEntry {
        service: ServiceId::RemoveBgApi,
        name: "RemovebgAPI",
        endpoint: "https://removebgapi.com/api/v1/remove",
        quota: "100 free credits",
        pricing: "From $0.001 per image",
        docs: "https://removebgapi.com",
        signup: "https://removebgapi.com",
    },
];

/// Connection metadata for one service
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct ServiceConfig {
    /// Service this entry describes
    pub service: ServiceId,
    /// Display name
    pub name: String,
    /// POST endpoint
    pub endpoint: String,
    /// API key or bearer token; empty means "configured but disabled"
    #[serde(rename = "configured", serialize_with = "serialize_configured")]
    pub credential: String,
    /// Free quota, descriptive text
    pub quota: String,
    /// Pricing, descriptive text
    pub pricing: String,
    /// Documentation link
    pub docs: String,
    /// Where to obtain a key
    pub signup: String,
    /// Environment variable the credential is read from
    pub credential_env: &'static str,
}

impl ServiceConfig {
    fn from_catalogue(entry: &CatalogueEntry, credential: String) -> Self {
        Self {
            service: entry.service,
            name: entry.name.to_string(),
            endpoint: entry.endpoint.to_string(),
            credential,
            quota: entry.quota.to_string(),
            pricing: entry.pricing.to_string(),
            docs: entry.docs.to_string(),
            signup: entry.signup.to_string(),
            credential_env: entry.service.credential_env(),
        }
    }

    /// Whether a non-empty credential is present
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.credential.trim().is_empty()
    }
}

impl std::fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("service", &self.service)
            .field("name", &self.name)
            .field("endpoint", &self.endpoint)
            .field("credential", &if self.is_configured() { "<redacted>" } else { "<empty>" })
            .field("quota", &self.quota)
            .field("pricing", &self.pricing)
            .field("docs", &self.docs)
            .finish_non_exhaustive()
    }
}

#[allow(clippy::ptr_arg)]
fn serialize_configured<S: Serializer>(credential: &String, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_bool(!credential.trim().is_empty())
}

/// Immutable mapping from [`ServiceId`] to [`ServiceConfig`]
#[derive(Debug, Clone)]
pub struct ServiceRegistry {
    configs: [ServiceConfig; ServiceId::COUNT],
    selected: ServiceId,
}

impl ServiceRegistry {
    /// Build the registry from the process environment
    ///
    /// # Errors
    /// - `SELECTED_SERVICE` names an unknown service
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the registry from an arbitrary variable lookup
    ///
    /// Each variable is looked up by its plain name first, then with the
    /// legacy `VITE_` prefix.
    ///
    /// # Errors
    /// - The selected-service variable names an unknown service
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .or_else(|| lookup(&format!("{LEGACY_ENV_PREFIX}{key}")))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let selected = match read(SELECTED_SERVICE_ENV) {
            Some(value) => value.parse()?,
            None => ServiceId::default(),
        };

        let configs = std::array::from_fn(|i| {
            let entry = &CATALOGUE[i];
            let credential = read(entry.service.credential_env()).unwrap_or_default();
            ServiceConfig::from_catalogue(entry, credential)
        });

        let registry = Self { configs, selected };
        tracing::debug!(
            selected = %registry.selected,
            configured = ?registry.configured_services(),
            "Service registry initialized"
        );
        Ok(registry)
    }

    /// Registry with explicit credentials; services not listed stay disabled
    #[must_use]
    pub fn with_credentials<I, S>(credentials: I) -> Self
    where
        I: IntoIterator<Item = (ServiceId, S)>,
        S: Into<String>,
    {
        let mut registry = Self::empty();
        for (service, credential) in credentials {
            registry.config_mut(service).credential = credential.into().trim().to_string();
        }
        registry
    }

    /// Registry with no credentials at all
    #[must_use]
    pub fn empty() -> Self {
        Self {
            configs: std::array::from_fn(|i| ServiceConfig::from_catalogue(&CATALOGUE[i], String::new())),
            selected: ServiceId::default(),
        }
    }

    /// Redirect a service to another endpoint (proxies, test servers)
    #[must_use]
    pub fn with_endpoint<S: Into<String>>(mut self, service: ServiceId, endpoint: S) -> Self {
        self.config_mut(service).endpoint = endpoint.into();
        self
    }

    /// Change the active service
    #[must_use]
    pub fn with_selected(mut self, service: ServiceId) -> Self {
        self.selected = service;
        self
    }

    /// Connection metadata for `service`; total over the closed id set
    #[must_use]
    pub fn get_config(&self, service: ServiceId) -> &ServiceConfig {
        &self.configs[service.index()]
    }

    /// Service chosen by configuration as the default
    #[must_use]
    pub fn selected_service(&self) -> ServiceId {
        self.selected
    }

    /// All entries in catalogue order
    pub fn iter(&self) -> impl Iterator<Item = &ServiceConfig> {
        self.configs.iter()
    }

    /// Services that currently have a credential
    #[must_use]
    pub fn configured_services(&self) -> Vec<ServiceId> {
        self.configs
            .iter()
            .filter(|c| c.is_configured())
            .map(|c| c.service)
            .collect()
    }

    fn config_mut(&mut self, service: ServiceId) -> &mut ServiceConfig {
        &mut self.configs[service.index()]
    }
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::empty()
    }
}
