//! Logging setup
//!
//! Structured logging via `tracing`. A host embedding this crate calls
//! [`init`] once at startup; `RUST_LOG` overrides the fallback directives.

use crate::error::DeckError;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber with an `info` fallback filter.
pub fn init() -> Result<(), DeckError> {
    init_with_filter("info")
}

/// Install the global subscriber with explicit fallback directives.
///
/// Fails with [`DeckError::Logging`] if a global subscriber is already
/// installed (for example by the host's own setup).
pub fn init_with_filter(directives: &str) -> Result<(), DeckError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| DeckError::Logging(e.to_string()))
}
