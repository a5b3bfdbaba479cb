//! JWS signature backends
//!
//! `ES256` goes through `jsonwebtoken`'s crypto provider. `jsonwebtoken` has
//! no Brainpool support, so `BP256R1` signs and verifies with RustCrypto's
//! `ecdsa` over `bp256`. Both produce the fixed-size `r || s` encoding of
//! RFC 7518 section 3.4.

use bp256::r1::BrainpoolP256r1;
use ecdsa::signature::{Signer as _, Verifier as _};

use crate::Result;
use crate::errors::JoseError;
use crate::helpers::{
    b64_decode, b64_encode, public_key_to_decoding_key, secret_key_to_encoding_key,
};
use crate::keys::{SigningKey, VerificationKey};
use crate::provider::install_crypto_provider;
use crate::types::SigningAlgorithm;

type BrainpoolSignature = ecdsa::Signature<BrainpoolP256r1>;

/// Sign `signing_input` and return the base64url signature segment
pub(crate) fn sign(key: &SigningKey, signing_input: &str) -> Result<String> {
    match key {
        SigningKey::P256(secret) => {
            install_crypto_provider();
            let encoding_key = secret_key_to_encoding_key(secret)?;
            jsonwebtoken::crypto::sign(
                signing_input.as_bytes(),
                &encoding_key,
                jsonwebtoken::Algorithm::ES256,
            )
            .map_err(|e| JoseError::SigningFailed {
                reason: format!("JWT signing failed: {}", e),
            })
        }
        SigningKey::BrainpoolP256r1(secret) => {
            let signing_key = ecdsa::SigningKey::<BrainpoolP256r1>::from(secret);
            let signature: BrainpoolSignature = signing_key
                .try_sign(signing_input.as_bytes())
                .map_err(|e| JoseError::SigningFailed {
                    reason: format!("JWT signing failed: {}", e),
                })?;
            Ok(b64_encode(signature.to_bytes()))
        }
    }
}

/// Check `signature` over `signing_input`
///
/// Returns `Ok(false)` for a well-formed signature that does not match.
pub(crate) fn verify(
    algorithm: SigningAlgorithm,
    key: &VerificationKey,
    signing_input: &str,
    signature: &str,
) -> Result<bool> {
    match (algorithm, key) {
        (SigningAlgorithm::Es256, VerificationKey::P256(public)) => {
            install_crypto_provider();
            jsonwebtoken::crypto::verify(
                signature,
                signing_input.as_bytes(),
                &public_key_to_decoding_key(public),
                jsonwebtoken::Algorithm::ES256,
            )
            .map_err(|e| JoseError::InvalidEncoding {
                segment: "signature",
                reason: e.to_string(),
            })
        }
        (SigningAlgorithm::Bp256r1, VerificationKey::BrainpoolP256r1(public)) => {
            let bytes = b64_decode("signature", signature)?;
            let signature =
                BrainpoolSignature::from_slice(&bytes).map_err(|e| JoseError::InvalidEncoding {
                    segment: "signature",
                    reason: e.to_string(),
                })?;
            let verifying_key = ecdsa::VerifyingKey::<BrainpoolP256r1>::from(public);
            Ok(verifying_key
                .verify(signing_input.as_bytes(), &signature)
                .is_ok())
        }
        (algorithm, key) => Err(JoseError::InvalidKey {
            reason: format!(
                "{} signature cannot be checked with a {} key",
                algorithm,
                key.curve().jwk_name()
            ),
        }),
    }
}
