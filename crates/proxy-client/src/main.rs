//! `proxy-client` — command-line entry point.
//!
//! Reads a JSON request payload from stdin, wraps it in the secure envelope,
//! sends it to the configured proxy, and writes the raw response body to
//! stdout. Exit status is zero only for a 2xx proxy response.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise the tracing subscriber.
//! 3. Read and parse the payload from stdin.
//! 4. Build the client and send one secure request.
//! 5. Print the response body verbatim.

use std::io::Read;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use proxy_client::config::Config;
use proxy_client::{telemetry, SecureRequestClient};

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init_telemetry(&cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        endpoint = %cfg.proxy_endpoint,
        "proxy-client starting"
    );

    // -----------------------------------------------------------------------
    // 3. Payload
    // -----------------------------------------------------------------------
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("failed to read payload from stdin")?;
    let payload: serde_json::Value =
        serde_json::from_str(&input).context("stdin is not valid JSON")?;

    // -----------------------------------------------------------------------
    // 4. Request
    // -----------------------------------------------------------------------
    let endpoint = cfg.endpoint()?;
    let client = SecureRequestClient::new();
    let response = client
        .request(
            &cfg.company_ref,
            &cfg.connection_type,
            &payload,
            &endpoint,
            Duration::from_millis(cfg.request_timeout_ms),
        )
        .await
        .context("secure request failed")?;

    // -----------------------------------------------------------------------
    // 5. Output
    // -----------------------------------------------------------------------
    info!(status = response.status, "request complete");
    println!("{}", String::from_utf8_lossy(&response.body));

    if !(200..300).contains(&response.status) {
        anyhow::bail!("proxy returned status {}", response.status);
    }
    Ok(())
}
