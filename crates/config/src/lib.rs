//! Saletrack configuration structures to map the saletrack.toml configuration.

#![deny(missing_docs)]

mod loader;

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use duration_str::deserialize_option_duration;
use serde::Deserialize;
use url::Url;

/// Main configuration structure for the saletrack client.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Backend API settings.
    pub api: ApiConfig,
    /// Authentication endpoint settings.
    pub auth: AuthConfig,
    /// Local identity store settings.
    pub identity: IdentityStoreConfig,
}

impl Config {
    /// Load configuration from a file path.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Config> {
        loader::load(path)
    }

    /// Validates the configured addresses and paths.
    pub fn validate(&self) -> anyhow::Result<()> {
        loader::validate(self)
    }

    /// The absolute address of the authentication status endpoint.
    pub fn auth_status_url(&self) -> Result<Url, url::ParseError> {
        self.api.base_url.join(&self.auth.status_path)
    }

    /// The navigable login address of the external provider.
    pub fn login_url(&self) -> Result<Url, url::ParseError> {
        self.api.base_url.join(&self.auth.login_path)
    }

    /// The navigable logout address of the external provider.
    pub fn logout_url(&self) -> Result<Url, url::ParseError> {
        self.api.base_url.join(&self.auth.logout_path)
    }
}

/// Backend API settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiConfig {
    /// Base address of the backend. In development this points at the local
    /// emulator; in production it is the origin of the gateway that fronts
    /// the API.
    pub base_url: Url,
    /// Optional hard timeout for outbound requests, e.g. "30s". When unset,
    /// requests wait indefinitely and cancellation belongs to the caller.
    #[serde(deserialize_with = "deserialize_option_duration")]
    pub timeout: Option<Duration>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            timeout: None,
        }
    }
}

/// Default backend address, matching the local Static Web Apps emulator.
pub const DEFAULT_BASE_URL: &str = "http://localhost:4280";

/// Authentication endpoint settings.
///
/// These are paths on the API origin. The status endpoint reports the
/// current principal; login and logout are plain navigable addresses
/// handled by the provider, with no JSON payload in either direction.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// Path of the authentication status endpoint.
    pub status_path: String,
    /// Path of the provider login redirect.
    pub login_path: String,
    /// Path of the provider logout redirect.
    pub logout_path: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            status_path: "/.auth/me".to_string(),
            login_path: "/.auth/login/github".to_string(),
            logout_path: "/.auth/logout".to_string(),
        }
    }
}

/// Local identity store settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IdentityStoreConfig {
    /// Path of the file holding the single synthesized test identity.
    pub store_path: PathBuf,
}

impl Default for IdentityStoreConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from(".saletrack/identity.json"),
        }
    }
}
