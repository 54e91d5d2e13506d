// Path: crates/telemetry/src/init.rs
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

/// Initializes the global `tracing` subscriber.
///
/// The filter is read from `RUST_LOG` and falls back to `default_level`. With `json`
/// set, every event is emitted as a structured JSON line with an RFC 3339 UTC
/// timestamp; otherwise a compact human-readable format is used. Records emitted
/// through the `log` facade are bridged into `tracing`.
///
/// Fails if a global subscriber has already been installed.
pub fn init_tracing(
    default_level: &str,
    json: bool,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_log::LogTracer::init()?;
    if json {
        let fmt_layer = fmt::layer()
            .json()
            .with_target(true)
            .with_timer(fmt::time::UtcTime::rfc_3339());
        let subscriber = Registry::default().with(filter).with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let fmt_layer = fmt::layer().compact().with_target(false);
        let subscriber = Registry::default().with(filter).with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber)?;
    }
    Ok(())
}
