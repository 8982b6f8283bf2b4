use tracing_subscriber::EnvFilter;

use crate::config::Settings;

/// Default directive when `RUST_LOG` is unset.
#[must_use]
pub fn default_directive(settings: &Settings) -> &'static str {
    if settings.debug { "debug" } else { "info" }
}

/// Install the global subscriber. Logs go to stderr so command output on
/// stdout stays machine-readable.
///
/// Production settings emit JSON lines; development settings emit compact
/// human-readable lines. A subscriber installed earlier (tests) wins.
pub fn init_tracing(settings: &Settings) {
    if tracing::dispatcher::has_been_set() {
        return;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(settings)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    let installed = if settings.development {
        builder.compact().try_init()
    } else {
        builder.json().flatten_event(true).try_init()
    };
    if installed.is_err() {
        tracing::debug!("tracing subscriber already initialized, skipping");
    }
}
