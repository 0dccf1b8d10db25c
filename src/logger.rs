//! Logging setup for the `buildseq` binary.
//!
//! Library code logs through `tracing` macros and never installs a
//! subscriber itself. The binary calls [`init_logger`] once at startup.
//! Logs go to stderr so that orders and reports written to stdout stay
//! machine-readable.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when neither a flag nor `RUST_LOG` says otherwise.
pub const DEFAULT_FILTER: &str = "buildseq=info";

/// Picks the log filter for the given flags.
///
/// `verbose` wins over `quiet`; without either, `RUST_LOG` is honored and
/// [`DEFAULT_FILTER`] is the fallback.
pub fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("buildseq=debug")
    } else if quiet {
        EnvFilter::new("buildseq=error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Initialize the tracing subscriber.
///
/// Must be called at most once per process.
///
/// ```rust,no_run
/// use buildseq::logger::init_logger;
///
/// init_logger(false, false, false);
/// tracing::info!("starting analysis");
/// ```
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .compact();

    tracing_subscriber::registry()
        .with(filter_for(verbose, quiet))
        .with(fmt_layer)
        .init();
}
