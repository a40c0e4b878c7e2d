// src/logging.rs
// =============================================================================
// tracing-subscriber setup.
//
// Log lines go to stderr so that stdout stays clean for `report --json` and
// `check` output. RUST_LOG wins when set; otherwise the level is "info", or
// "debug" with --verbose (which also shows every page the pipeline drops and
// why).
// =============================================================================

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .with_filter(env_filter);

    // try_init: a second call (tests) is a no-op instead of a panic
    let _ = tracing_subscriber::registry().with(stderr_layer).try_init();
}
