//! Test utilities for token processing
//!
//! Fresh key material and ready-made processors for tests in this crate and in
//! downstream crates. Enabled with the `test-utils` feature; never use these
//! in production code.

use p256::{PublicKey, SecretKey};
use rand::rngs::OsRng;

use crate::keys::{SigningIdentity, SymmetricKey};
use crate::processor::JwtProcessor;

/// Key id attached to generated identities
pub const TEST_KEY_ID: &str = "puk_idp_sig";

/// DER bytes standing in for a leaf certificate
pub const TEST_CERTIFICATE: &[u8] = &[0x30, 0x82, 0x01, 0x0a];

/// Random P-256 identity with [`TEST_KEY_ID`] and a one-element chain
pub fn generate_identity() -> SigningIdentity {
    SigningIdentity::new(SecretKey::random(&mut OsRng))
        .with_key_id(TEST_KEY_ID)
        .with_certificate_chain(vec![TEST_CERTIFICATE.to_vec()])
}

/// Random brainpoolP256r1 identity, signing `BP256R1`
pub fn generate_brainpool_identity() -> SigningIdentity {
    SigningIdentity::new(<bp256::r1::SecretKey as bp256::elliptic_curve::Generate>::generate())
        .with_key_id(TEST_KEY_ID)
        .with_certificate_chain(vec![TEST_CERTIFICATE.to_vec()])
}

pub fn generate_processor() -> JwtProcessor {
    JwtProcessor::new(generate_identity())
}

pub fn generate_symmetric_key() -> SymmetricKey {
    SymmetricKey::generate()
}

/// Recipient key pair for `ECDH-ES` encryption
pub fn generate_ec_key_pair() -> (SecretKey, PublicKey) {
    let secret = SecretKey::random(&mut OsRng);
    let public = secret.public_key();
    (secret, public)
}
