//! tracing subscriber setup for the host binary.

use crate::config::RuntimeConfig;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Logs go to stderr so stdout stays machine-readable.
/// Safe to call more than once; later calls are ignored.
pub fn init(runtime: &RuntimeConfig) {
    let filter = EnvFilter::try_new(&runtime.log_level)
        .unwrap_or_else(|_| EnvFilter::new("guest_signal=info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let result = if runtime.log_json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
