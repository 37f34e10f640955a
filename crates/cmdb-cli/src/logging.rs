use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install the tracing subscriber.
///
/// Logs go to stderr in the compact format. The filter comes from
/// `RUST_LOG`, else from `configured` (the `log.level` setting), else
/// `info`; `verbose` forces `debug`.
pub fn init(verbose: bool, configured: Option<&str>) {
    let filter_layer = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(configured.unwrap_or("info")))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact();

    // A second call in the same process keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init();
}
