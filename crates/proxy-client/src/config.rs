//! Configuration loading and validation for the `proxy-client` binary.
//!
//! All values are read from environment variables at startup. The process
//! exits with a clear error message if any required variable is missing or
//! invalid. The library layer takes all of these as plain arguments and has
//! no configuration of its own.

use anyhow::{Context, Result};
use reqwest::Url;
use serde::Deserialize;

/// Validated client configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// URL of the remote query proxy. **Required.**
    pub proxy_endpoint: String,

    /// Company identifier sent in plaintext and used for key derivation.
    /// **Required.**
    pub company_ref: String,

    /// Connection selector encrypted into the envelope.
    #[serde(default = "default_connection_type")]
    pub connection_type: String,

    /// Per-request timeout in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_connection_type() -> String {
    "live".into()
}
fn default_request_timeout_ms() -> u64 {
    30_000
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any required variable is absent or cannot be
    /// parsed.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first
    /// failure.
    fn validate(&self) -> Result<()> {
        ensure_non_empty(&self.proxy_endpoint, "PROXY_ENDPOINT")?;
        ensure_non_empty(&self.company_ref, "COMPANY_REF")?;
        ensure_non_empty(&self.connection_type, "CONNECTION_TYPE")?;

        Url::parse(&self.proxy_endpoint)
            .with_context(|| format!("PROXY_ENDPOINT is not a valid URL: {}", self.proxy_endpoint))?;

        if self.request_timeout_ms == 0 {
            anyhow::bail!("REQUEST_TIMEOUT_MS must be > 0");
        }
        Ok(())
    }

    /// The proxy endpoint as a parsed [`Url`].
    pub fn endpoint(&self) -> Result<Url> {
        Url::parse(&self.proxy_endpoint).context("PROXY_ENDPOINT is not a valid URL")
    }
}

fn ensure_non_empty(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} is required and must not be empty");
    }
    Ok(())
}
