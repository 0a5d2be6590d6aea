//! Tracing subscriber setup
//!
//! Every crate in the workspace emits `tracing` events with dotted names
//! (`session.boot.completed`, `refresh_lock.acquired`, ...). Nothing is
//! printed until the embedding application installs a subscriber, either its
//! own or the one from [`init_tracing`].

use once_cell::sync::OnceCell;
use tabauth_domain::impl_selector_conversions;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

static INSTALLED: OnceCell<bool> = OnceCell::new();

/// Output format of the fmt layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl_selector_conversions!(LogFormat {
    Text => "text" | "pretty",
    Json => "json",
});

/// Install a global fmt subscriber filtered by `RUST_LOG` (default `info`)
///
/// Idempotent: only the first call in a process does anything. Returns
/// whether a subscriber from this function is active, which is `false` when
/// another global subscriber was installed first.
pub fn init_tracing(format: LogFormat) -> bool {
    *INSTALLED.get_or_init(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
        let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

        let result = match format {
            LogFormat::Text => builder.try_init(),
            LogFormat::Json => builder.json().flatten_event(true).try_init(),
        };
        result.is_ok()
    })
}
