//! Tracing setup

use once_cell::sync::OnceCell;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is not set
pub const DEFAULT_FILTER: &str = "info";

static INIT: OnceCell<()> = OnceCell::new();

/// Install the global subscriber with the default filter
pub fn init_tracing() {
    init_tracing_with(DEFAULT_FILTER);
}

/// Install the global subscriber; `RUST_LOG` wins over `default_filter`
///
/// Only the first call has an effect. A subscriber installed by someone
/// else is left in place.
pub fn init_tracing_with(default_filter: &str) {
    INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_filter));
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init();
    });
}
