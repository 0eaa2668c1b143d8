//! Logging initialization for canwatch-daemon.
//!
//! Configures `tracing-subscriber` from the `[general]` section of
//! `CanwatchConfig`. Detector stdout/stderr lines are emitted under the
//! `canwatch::detector` target, so they can be filtered separately with
//! `RUST_LOG` (e.g. `info,canwatch::detector=warn`).

use anyhow::Result;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use canwatch_core::config::GeneralConfig;

/// Build the filter used by the subscriber.
///
/// `RUST_LOG` wins when set. Otherwise the configured level applies to
/// everything, with HTTP request traces kept one notch quieter at `info`.
pub fn build_env_filter(config: &GeneralConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    let directives = if config.log_level == "trace" || config.log_level == "debug" {
        config.log_level.clone()
    } else {
        format!("{},tower_http=warn", config.log_level)
    };

    EnvFilter::try_new(&directives)
        .map_err(|e| anyhow::anyhow!("invalid log filter '{}': {}", directives, e))
}

/// Initialize the global tracing subscriber.
///
/// Must be called exactly once, before any tracing macros are used.
///
/// # Formats
///
/// * `"json"` - Machine-parseable JSON lines (default)
/// * `"pretty"` - Human-readable output for local runs
pub fn init_tracing(config: &GeneralConfig) -> Result<()> {
    let env_filter = build_env_filter(config)?;
    let registry = tracing_subscriber::registry().with(env_filter);

    match config.log_format.as_str() {
        "json" => registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to initialize JSON tracing subscriber: {}", e))?,
        "pretty" => registry
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init()
            .map_err(|e| {
                anyhow::anyhow!("failed to initialize pretty tracing subscriber: {}", e)
            })?,
        other => {
            return Err(anyhow::anyhow!(
                "unknown log format '{}', expected 'json' or 'pretty'",
                other
            ));
        }
    }

    Ok(())
}
