//! # JSON Web Encryption for nested JWTs
//!
//! Wraps a compact JWT as the plaintext of a compact JWE ([RFC7516]) and
//! unwraps it again. Two key management modes are supported:
//!
//! - `dir`: a shared AES-256 key is the content encryption key (CEK)
//! - `ECDH-ES`: the CEK is derived with Concat KDF from an ephemeral-static
//!   ECDH agreement on P-256 ([RFC7518] section 4.6)
//!
//! Content is always encrypted with `A256GCM`. The protected header carries
//! `cty: NJWT` and the inner token's `exp`, so expiry can be checked without
//! decrypting.
//!
//! The plaintext is the JSON document `{"njwt": "<inner compact token>"}`.
//!
//! [RFC7516]: https://www.rfc-editor.org/rfc/rfc7516
//! [RFC7518]: https://www.rfc-editor.org/rfc/rfc7518

use aes_gcm::aead::{AeadCore, AeadInPlace, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce, Tag};
use jsonwebtoken::jwk::Jwk;
use p256::ecdh::EphemeralSecret;
use p256::{PublicKey, SecretKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use zeroize::Zeroizing;

use crate::Result;
use crate::claims::{ClaimMap, ClaimName};
use crate::errors::JoseError;
use crate::helpers::{b64_decode, b64_encode, jwk_to_public_key, public_key_to_jwk};
use crate::keys::{DecryptionKey, EncryptionKey};
use crate::types::{ContentEncryptionAlgorithm, KeyManagementAlgorithm};
use crate::NESTED_JWT_CONTENT_TYPE;

const IV_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// JWE protected header as produced by [`encrypt_nested`]
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct JweHeader {
    pub alg: String,
    pub enc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cty: Option<String>,
    /// Expiry copied from the nested token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<Value>,
    /// Ephemeral public key for `ECDH-ES`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epk: Option<Jwk>,
}

impl JweHeader {
    fn from_claims(claims: &ClaimMap) -> Result<Self> {
        serde_json::from_value(Value::Object(claims.clone())).map_err(|e| {
            JoseError::DecryptionFailed {
                reason: format!("invalid JWE header: {}", e),
            }
        })
    }
}

/// Encrypt `nested` (a compact token) into a compact JWE
pub(crate) fn encrypt_nested(
    nested: &str,
    exp: Option<Value>,
    key: EncryptionKey<'_>,
) -> Result<String> {
    let enc = ContentEncryptionAlgorithm::A256Gcm;

    // 1. Key Management Mode determines the Content Encryption Key (CEK)
    let (alg, cek, epk) = match key {
        EncryptionKey::Symmetric(key) => {
            let mut cek = Zeroizing::new([0u8; 32]);
            cek.copy_from_slice(key.as_bytes());
            (KeyManagementAlgorithm::Direct, cek, None)
        }
        EncryptionKey::EcPublic(recipient) => {
            // 2. Agree on a shared secret with a fresh ephemeral key
            let ephemeral = EphemeralSecret::random(&mut OsRng);
            let shared = ephemeral.diffie_hellman(recipient);
            let cek = derive_cek(shared.raw_secret_bytes(), enc)?;
            let epk = public_key_to_jwk(&ephemeral.public_key())?;
            (KeyManagementAlgorithm::EcdhEs, cek, Some(epk))
        }
    };

    // 3. Create the JWE Protected Header and its encoded form, which is also the AAD
    let header = JweHeader {
        alg: alg.as_str().to_string(),
        enc: enc.as_str().to_string(),
        cty: Some(NESTED_JWT_CONTENT_TYPE.to_string()),
        exp,
        epk,
    };
    let header_json = serde_json::to_vec(&header)
        .map_err(|e| JoseError::serialization("JWE header serialization failed", e))?;
    let encoded_header = b64_encode(header_json);

    // 4. Generate a random 96-bit IV
    let iv = Aes256Gcm::generate_nonce(&mut OsRng);

    // 5. Encrypt the plaintext, detaching the authentication tag
    let mut plaintext = ClaimMap::new();
    plaintext.insert(
        ClaimName::NestedJwt.jose_name().to_string(),
        Value::String(nested.to_string()),
    );
    let mut buffer = serde_json::to_vec(&plaintext)
        .map_err(|e| JoseError::serialization("JWE plaintext serialization failed", e))?;

    let cipher =
        Aes256Gcm::new_from_slice(cek.as_slice()).map_err(|e| JoseError::EncryptionFailed {
            reason: format!("invalid content encryption key: {}", e),
        })?;
    let tag = cipher
        .encrypt_in_place_detached(&iv, encoded_header.as_bytes(), &mut buffer)
        .map_err(|e| JoseError::EncryptionFailed {
            reason: format!("AES-GCM encryption failed: {}", e),
        })?;

    tracing::debug!(alg = %alg, enc = %enc, "Encrypted nested JWT");

    // 6. Compact serialization; direct key agreement leaves the encrypted key empty
    Ok(format!(
        "{}..{}.{}.{}",
        encoded_header,
        b64_encode(iv),
        b64_encode(&buffer),
        b64_encode(tag)
    ))
}

/// Decrypt a five-segment JWE and return the nested compact token
pub(crate) fn decrypt_nested(
    segments: &[&str],
    header: &ClaimMap,
    key: DecryptionKey<'_>,
) -> Result<String> {
    let [encoded_header, encrypted_key, iv, ciphertext, tag] = segments else {
        return Err(JoseError::malformed(segments.len()));
    };

    // 1. Determine the Key Management Mode and content encryption from the header
    let header = JweHeader::from_claims(header)?;
    let alg: KeyManagementAlgorithm = header.alg.parse().map_err(unsupported)?;
    let enc: ContentEncryptionAlgorithm = header.enc.parse().map_err(unsupported)?;

    if !encrypted_key.is_empty() {
        return Err(JoseError::DecryptionFailed {
            reason: format!("{} does not use an encrypted key", alg),
        });
    }

    // 2. Recover the CEK
    let cek = match (alg, key) {
        (KeyManagementAlgorithm::Direct, DecryptionKey::Symmetric(key)) => {
            let mut cek = Zeroizing::new([0u8; 32]);
            cek.copy_from_slice(key.as_bytes());
            cek
        }
        (KeyManagementAlgorithm::EcdhEs, DecryptionKey::EcPrivate(secret)) => {
            let epk = header.epk.as_ref().ok_or_else(|| JoseError::DecryptionFailed {
                reason: "ECDH-ES header has no epk".to_string(),
            })?;
            let epk = jwk_to_public_key(epk).map_err(|e| JoseError::DecryptionFailed {
                reason: format!("invalid epk: {}", e),
            })?;
            agree_cek(secret, &epk, enc)?
        }
        (alg, _) => {
            return Err(JoseError::InvalidKey {
                reason: format!("key type does not match JWE algorithm {}", alg),
            });
        }
    };

    // 3. Decode IV, ciphertext and tag
    let iv = b64_decode("JWE iv", iv)?;
    let mut buffer = b64_decode("JWE ciphertext", ciphertext)?;
    let tag = b64_decode("JWE tag", tag)?;
    if iv.len() != IV_LEN {
        return Err(JoseError::DecryptionFailed {
            reason: format!("IV must be {} bytes, got {}", IV_LEN, iv.len()),
        });
    }
    if tag.len() != TAG_LEN {
        return Err(JoseError::DecryptionFailed {
            reason: format!(
                "authentication tag must be {} bytes, got {}",
                TAG_LEN,
                tag.len()
            ),
        });
    }

    // 4. Decrypt with AAD = encoded protected header
    let cipher =
        Aes256Gcm::new_from_slice(cek.as_slice()).map_err(|e| JoseError::DecryptionFailed {
            reason: format!("invalid content encryption key: {}", e),
        })?;
    cipher
        .decrypt_in_place_detached(
            Nonce::from_slice(&iv),
            encoded_header.as_bytes(),
            &mut buffer,
            Tag::from_slice(&tag),
        )
        .map_err(|_| {
            tracing::warn!(alg = %alg, enc = %enc, "JWE authentication tag mismatch");
            JoseError::DecryptionFailed {
                reason: "authentication tag mismatch".to_string(),
            }
        })?;

    tracing::debug!(alg = %alg, enc = %enc, "Decrypted nested JWT");
    unwrap_plaintext(buffer)
}

/// Extract the nested token from a decrypted payload
///
/// `{"njwt": "..."}` yields the string; any other payload is taken verbatim.
fn unwrap_plaintext(plaintext: Vec<u8>) -> Result<String> {
    let plaintext = String::from_utf8(plaintext).map_err(|e| JoseError::DecryptionFailed {
        reason: format!("plaintext is not UTF-8: {}", e),
    })?;

    if let Ok(Value::Object(mut claims)) = serde_json::from_str::<Value>(&plaintext) {
        if let Some(Value::String(nested)) = claims.remove(ClaimName::NestedJwt.jose_name()) {
            return Ok(nested);
        }
    }
    Ok(plaintext)
}

fn unsupported(error: JoseError) -> JoseError {
    JoseError::DecryptionFailed {
        reason: error.to_string(),
    }
}

fn agree_cek(
    secret: &SecretKey,
    ephemeral: &PublicKey,
    enc: ContentEncryptionAlgorithm,
) -> Result<Zeroizing<[u8; 32]>> {
    let shared = p256::ecdh::diffie_hellman(secret.to_nonzero_scalar(), ephemeral.as_affine());
    derive_cek(shared.raw_secret_bytes(), enc)
}

/// Concat KDF (NIST SP 800-56A) over the ECDH output, as ECDH-ES direct agreement requires
///
/// OtherInfo = AlgorithmID || PartyUInfo || PartyVInfo || SuppPubInfo, each
/// datum prefixed with its 32-bit big-endian length. PartyUInfo and PartyVInfo
/// are empty.
fn derive_cek(
    shared_secret: &[u8],
    enc: ContentEncryptionAlgorithm,
) -> Result<Zeroizing<[u8; 32]>> {
    let algorithm_id = enc.as_str().as_bytes();
    let key_bits = (enc.key_len() * 8) as u32;

    let mut other_info = Vec::with_capacity(4 + algorithm_id.len() + 4 + 4 + 4);
    other_info.extend_from_slice(&(algorithm_id.len() as u32).to_be_bytes());
    other_info.extend_from_slice(algorithm_id);
    other_info.extend_from_slice(&0u32.to_be_bytes());
    other_info.extend_from_slice(&0u32.to_be_bytes());
    other_info.extend_from_slice(&key_bits.to_be_bytes());

    let mut cek = Zeroizing::new([0u8; 32]);
    concat_kdf::derive_key_into::<sha2::Sha256>(shared_secret, &other_info, cek.as_mut_slice())
        .map_err(|e| JoseError::InvalidKey {
            reason: format!("key derivation failed: {}", e),
        })?;
    Ok(cek)
}
