//! Runtime settings.
//!
//! Loaded from an optional TOML file layered with `STOREFRONT_*` environment
//! variables, where `__` separates nesting levels
//! (`STOREFRONT_REMOTE__TIMEOUT_MS=500`). Every key has a default, so both
//! sources are optional.

use std::path::Path;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

use crate::catalog::MAX_PAGE_SIZE;
use crate::transport::RetryPolicy;

const ENV_PREFIX: &str = "STOREFRONT";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub catalog: CatalogSettings,
    pub remote: RemoteSettings,
    pub startup: StartupSettings,
    pub actors: ActorSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    pub max_page_size: u64,
}

/// Per-call policy for service clients.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RemoteSettings {
    pub timeout_ms: u64,
    /// Attempts for idempotent reads. Writes are always sent once.
    pub read_attempts: u32,
    pub backoff_ms: u64,
}

/// Fixed backoff between attempts to reach a store at boot.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StartupSettings {
    pub backoff_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ActorSettings {
    pub buffer_size: usize,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            timeout_ms: 2_000,
            read_attempts: 3,
            backoff_ms: 50,
        }
    }
}

impl Default for StartupSettings {
    fn default() -> Self {
        Self { backoff_ms: 2_000 }
    }
}

impl Default for ActorSettings {
    fn default() -> Self {
        Self { buffer_size: 32 }
    }
}

impl Settings {
    /// Reads `path` (if given and present) and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }
        let settings: Settings = builder
            .add_source(environment())
            .build()?
            .try_deserialize()?;
        settings.validate()
    }

    /// Parses settings from TOML text, ignoring the environment.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let settings: Settings = Config::builder()
            .add_source(File::from_str(text, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        settings.validate()
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.catalog.max_page_size == 0 {
            return Err(ConfigError::Message("catalog.max_page_size must be at least 1".into()));
        }
        if self.actors.buffer_size == 0 {
            return Err(ConfigError::Message("actors.buffer_size must be at least 1".into()));
        }
        Ok(self)
    }

    pub fn remote_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.remote.read_attempts,
            Duration::from_millis(self.remote.backoff_ms),
            Duration::from_millis(self.remote.timeout_ms),
        )
    }

    pub fn startup_backoff(&self) -> Duration {
        Duration::from_millis(self.startup.backoff_ms)
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}
