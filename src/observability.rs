//! # Observability
//!
//! Process-level setup shared by the binary and the live integration test:
//! rustls crypto provider and the tracing subscriber.

use crate::constants::DEFAULT_LOG_FILTER;
use tracing::warn;

/// Install the ring crypto provider for rustls
///
/// Must run before any TLS client (Kubernetes or MongoDB) is built.
/// Installing twice is harmless; the second call is ignored.
pub fn install_crypto_provider() {
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        tracing::debug!("rustls crypto provider already installed");
    }
}

/// Initialize the tracing subscriber
///
/// Honors `RUST_LOG`, defaulting to `mongodb_sanity_test=info`. Safe to call
/// from several tests in the same process.
pub fn init_tracing() {
    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .try_init()
    {
        warn!("Tracing subscriber init returned error (may already be initialized): {}", e);
    }
}
