#![forbid(unsafe_code)]

//! Logging facade.
//!
//! The engine logs through `tracing`; the macros are re-exported here so
//! downstream crates do not need their own `tracing` dependency to match
//! levels. Installing a subscriber is left to the host application unless the
//! `tracing-subscriber` feature is enabled, in which case [`init_tracing`]
//! installs a formatter filtered by the `PERCH_LOG` environment variable.

pub use tracing::{debug, debug_span, error, info, trace, trace_span, warn};

/// Environment variable holding the `EnvFilter` directive string.
pub const LOG_ENV_VAR: &str = "PERCH_LOG";

/// Default directive when `PERCH_LOG` is unset or invalid.
pub const DEFAULT_DIRECTIVE: &str = "warn";

/// Install a global subscriber.
///
/// Reads [`LOG_ENV_VAR`] (e.g. `PERCH_LOG=perch_overlay=debug`). With the
/// `tracing-json` feature the output is one JSON object per line.
///
/// Returns an error if a global subscriber is already installed.
#[cfg(feature = "tracing-subscriber")]
pub fn init_tracing() -> Result<(), tracing_subscriber::util::TryInitError> {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    #[cfg(feature = "tracing-json")]
    let fmt = tracing_subscriber::fmt::layer().json();
    #[cfg(not(feature = "tracing-json"))]
    let fmt = tracing_subscriber::fmt::layer().compact();

    tracing_subscriber::registry().with(filter).with(fmt).try_init()
}
