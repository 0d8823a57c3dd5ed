//! Tracing subscriber setup for the binary.
//!
//! # Telemetry invariants
//!
//! - **No key material or plaintext payloads** must appear in any span
//!   attribute or log field, at any level.
//! - Log level is configurable via `LOG_LEVEL` (default: `info`) or the
//!   standard `RUST_LOG` filter syntax.

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialise the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured `log_level` when set.
///
/// # Errors
///
/// Returns an error if a subscriber has already been installed.
pub fn init_telemetry(log_level: &str) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .context("failed to initialise tracing subscriber")?;

    Ok(())
}
