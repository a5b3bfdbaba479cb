//! Process-wide cryptographic provider registration
//!
//! jsonwebtoken dispatches signing and verification through a process-level
//! `CryptoProvider`. This crate selects the RustCrypto provider, which works
//! directly with the `p256` keys used everywhere else.

use std::sync::Once;

use jsonwebtoken::crypto::rust_crypto::DEFAULT_PROVIDER;

static INSTALL: Once = Once::new();

/// Install the RustCrypto provider for jsonwebtoken
///
/// Idempotent. Called implicitly before every sign and verify operation;
/// applications may call it once at startup instead.
pub fn install_crypto_provider() {
    INSTALL.call_once(|| match DEFAULT_PROVIDER.install_default() {
        Ok(()) => tracing::debug!("Installed RustCrypto provider for jsonwebtoken"),
        // Another component installed a provider first; keep it
        Err(_) => tracing::debug!("jsonwebtoken crypto provider already installed"),
    });
}
