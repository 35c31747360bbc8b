//! Tracing setup for hosts embedding the query engine.

/// Install a global `tracing` subscriber.
///
/// `LOG_FORMAT=json` selects JSON output; `RUST_LOG` controls filtering and
/// defaults to `info`.
pub fn init_tracing() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();

    let result = if log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .try_init()
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).try_init()
    };

    result.map_err(|e| anyhow::anyhow!("tracing init: {e}"))
}
