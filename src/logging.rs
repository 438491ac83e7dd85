//! Tracing setup for the command-line tool.
//!
//! The library only emits events; installing a subscriber is up to the
//! binary. `RUST_LOG=sutra_fmt=trace` shows every dispatch.

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Installs a stderr subscriber, once.
///
/// Does nothing unless `RUST_LOG` is set or `verbose` is true; `verbose`
/// without `RUST_LOG` means `sutra_fmt=debug`. Safe to call repeatedly.
pub fn init(verbose: bool) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let from_env = std::env::var("RUST_LOG").is_ok();
        if !from_env && !verbose {
            return;
        }
        let filter = if from_env {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new("sutra_fmt=debug")
        };
        // Another subscriber may already be installed by an embedding program.
        let _ = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true),
            )
            .with(filter)
            .try_init();
    });
}
