use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter directives for `level`, used when `RUST_LOG` is unset
pub fn default_filter(level: &str) -> String {
    format!("wealthplan_server={level},wealthplan_core={level},tower_http=info")
}

/// Initialize logging to stdout.
///
/// `RUST_LOG` takes precedence over `level` when it is set and parses.
pub fn init_logging(level: &str) -> color_eyre::Result<()> {
    let default_filter = default_filter(level);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .try_init()?;

    tracing::info!("wealthplan logging initialized (filter={default_filter})");
    Ok(())
}
