//! Log subscriber setup.
//!
//! Filter: `TXP_LOG_LEVEL`, else `RUST_LOG`, else `info`.
//! `TXP_JSON_LOGS=1` switches to JSON lines. Logs go to stderr so stdout
//! carries only command output.

use anyhow::{Context, Result};
use std::env;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LEVEL: &str = "info";

/// Install the global subscriber.
pub fn init() -> Result<()> {
    let directive = filter_directive(
        env::var("TXP_LOG_LEVEL").ok(),
        env::var("RUST_LOG").ok(),
    );
    let filter = EnvFilter::try_new(&directive)
        .with_context(|| format!("Invalid log filter '{}'", directive))?;

    if json_enabled(env::var("TXP_JSON_LOGS").ok().as_deref()) {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    }
    Ok(())
}

fn filter_directive(log_level: Option<String>, rust_log: Option<String>) -> String {
    log_level
        .filter(|v| !v.trim().is_empty())
        .or_else(|| rust_log.filter(|v| !v.trim().is_empty()))
        .unwrap_or_else(|| DEFAULT_LEVEL.to_string())
}

fn json_enabled(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("1" | "true" | "yes")
    )
}
