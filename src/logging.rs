//! Tracing subscriber setup shared by the binaries

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install a stderr `fmt` subscriber.
///
/// `debug` forces debug output for this crate and `bin_target`; otherwise
/// `RUST_LOG` wins, falling back to `info`.
pub fn init(bin_target: &str, debug: bool) {
    let directives = |level: &str| {
        format!("{}={},{}={}", env!("CARGO_CRATE_NAME"), level, bin_target, level)
    };

    let filter = if debug {
        tracing_subscriber::EnvFilter::new(directives("debug"))
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| directives("info").into())
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
