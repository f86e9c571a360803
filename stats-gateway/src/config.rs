use indexmap::IndexMap;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Port cannot be 0")]
    InvalidPort,

    #[error("Timeout for {0} cannot be 0")]
    ZeroTimeout(&'static str),

    #[error("Match batch size cannot be 0")]
    EmptyMatchBatch,

    #[error("No region platforms configured")]
    NoPlatforms,

    #[error("Region {0} maps to an empty platform")]
    EmptyPlatform(String),

    #[error("Default region {0} has no platform")]
    UnknownDefaultRegion(String),

    #[error("Invalid backend URL in {variable}: {reason}")]
    InvalidBackendUrl { variable: String, reason: String },
}

/// Runtime mode. Development responses carry error diagnostics.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[serde(alias = "dev")]
    Development,
    #[default]
    #[serde(alias = "prod")]
    Production,
}

impl Environment {
    pub fn is_development(self) -> bool {
        self == Environment::Development
    }
}

/// Gateway configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    /// Listener for client-facing API requests
    #[serde(default = "Listener::default_api")]
    pub listener: Listener,
    /// Listener for health and readiness probes
    #[serde(default = "Listener::default_admin")]
    pub admin_listener: Listener,
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub regions: RegionsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listener: Listener::default_api(),
            admin_listener: Listener::default_admin(),
            environment: Environment::default(),
            backend: BackendConfig::default(),
            regions: RegionsConfig::default(),
        }
    }
}

impl Config {
    /// Validates the gateway configuration.
    ///
    /// A missing backend URL is not a validation error: the gateway still
    /// starts and answers every API route with a 500.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.listener.validate()?;
        self.admin_listener.validate()?;
        self.backend.validate()?;
        self.regions.validate()?;
        Ok(())
    }
}

/// Network listener configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Listener {
    /// Host address to bind to (e.g., "0.0.0.0" or "127.0.0.1")
    pub host: String,
    /// Port number to listen on
    pub port: u16,
}

impl Listener {
    fn default_api() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
        }
    }

    fn default_admin() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 3001,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        Ok(())
    }
}

/// How the delay between two attempts grows.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BackoffKind {
    /// `base_delay * attempt`
    #[default]
    Linear,
    /// `base_delay * 2^(attempt - 1)`
    Exponential,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetryConfig {
    /// Attempts made after the first one fails
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub backoff: BackoffKind,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay_ms: 1000,
            backoff: BackoffKind::Linear,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct MatchBatchConfig {
    /// Match details fetched concurrently per batch
    pub size: usize,
    /// Pause between two batches
    pub delay_ms: u64,
}

impl Default for MatchBatchConfig {
    fn default() -> Self {
        Self {
            size: 5,
            delay_ms: 100,
        }
    }
}

/// Upstream backend configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the backend service.
    ///
    /// Uses `url::Url`, so malformed URLs are rejected during deserialization.
    pub url: Option<Url>,
    /// Per-attempt timeout for data calls
    pub data_timeout_secs: u64,
    /// Timeout for AI-backed calls
    pub ai_timeout_secs: u64,
    pub retry: RetryConfig,
    pub match_batch: MatchBatchConfig,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: None,
            data_timeout_secs: 30,
            ai_timeout_secs: 60,
            retry: RetryConfig::default(),
            match_batch: MatchBatchConfig::default(),
        }
    }
}

impl BackendConfig {
    /// Environment variables that override `url`, in priority order.
    pub const URL_VARIABLES: &[&str] = &["BACKEND_URL", "NEXT_PUBLIC_BACKEND_URL"];

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.data_timeout_secs == 0 {
            return Err(ValidationError::ZeroTimeout("data calls"));
        }
        if self.ai_timeout_secs == 0 {
            return Err(ValidationError::ZeroTimeout("AI calls"));
        }
        if self.match_batch.size == 0 {
            return Err(ValidationError::EmptyMatchBatch);
        }
        Ok(())
    }

    /// Replaces `url` with the first non-empty override variable.
    ///
    /// `lookup` is usually `|name| std::env::var(name).ok()`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ValidationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        for variable in Self::URL_VARIABLES {
            let Some(value) = lookup(variable).filter(|v| !v.trim().is_empty()) else {
                continue;
            };
            let url = Url::parse(value.trim()).map_err(|e| ValidationError::InvalidBackendUrl {
                variable: variable.to_string(),
                reason: e.to_string(),
            })?;
            self.url = Some(url);
            break;
        }
        Ok(())
    }

    pub fn data_timeout(&self) -> Duration {
        Duration::from_secs(self.data_timeout_secs)
    }

    pub fn ai_timeout(&self) -> Duration {
        Duration::from_secs(self.ai_timeout_secs)
    }
}

/// Routing region to platform mapping
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct RegionsConfig {
    /// Region used when a request names none, or an unknown one
    pub default: String,
    /// Routing region (americas, asia, europe) to platform (na1, kr, euw1).
    /// Order is preserved for listing.
    pub platforms: IndexMap<String, String>,
}

impl Default for RegionsConfig {
    fn default() -> Self {
        Self {
            default: "americas".into(),
            platforms: IndexMap::from([
                ("americas".to_string(), "na1".to_string()),
                ("asia".to_string(), "kr".to_string()),
                ("europe".to_string(), "euw1".to_string()),
            ]),
        }
    }
}

impl RegionsConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.platforms.is_empty() {
            return Err(ValidationError::NoPlatforms);
        }
        if let Some((region, _)) = self.platforms.iter().find(|(_, p)| p.trim().is_empty()) {
            return Err(ValidationError::EmptyPlatform(region.clone()));
        }
        if !self.platforms.keys().any(|k| k.eq_ignore_ascii_case(&self.default)) {
            return Err(ValidationError::UnknownDefaultRegion(self.default.clone()));
        }
        Ok(())
    }
}
