//! Logging and tracing utilities
//!
//! Diagnostics always go to stderr. Stdout is reserved for the analysis run
//! itself, which the batch harness filters line by line.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Options for [`init_tracing_with`]
#[derive(Debug, Clone, Copy, Default)]
pub struct LogOptions {
    /// Default to `debug` instead of `info` when `RUST_LOG` is unset
    pub verbose: bool,
    /// Emit JSON lines instead of the human-readable format
    pub json: bool,
}

impl LogOptions {
    fn default_directive(self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}

/// Initialize tracing subscriber with default configuration
pub fn init_tracing() {
    init_tracing_with(LogOptions::default());
}

/// Initialize tracing subscriber writing to stderr
pub fn init_tracing_with(options: LogOptions) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(options.default_directive()));

    let json_layer = options.json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
    });
    let text_layer = (!options.json).then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}
