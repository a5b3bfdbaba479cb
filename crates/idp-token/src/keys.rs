//! Key material for signing, encryption and decryption
//!
//! Keys are supplied by the caller and borrowed for the duration of a single
//! operation. The crate never persists key material.

use std::fmt;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use bp256::pkcs8::DecodePrivateKey as _;
use bp256::r1::{BrainpoolP256r1, SecretKey as BrainpoolSecretKey};
use p256::pkcs8::DecodePrivateKey;
use p256::{PublicKey, SecretKey};
use rand::RngCore;
use rand::rngs::OsRng;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::Result;
use crate::errors::JoseError;
use crate::types::{EcCurve, SigningAlgorithm};

type BrainpoolPublicKey = bp256::elliptic_curve::PublicKey<BrainpoolP256r1>;

/// Length of an A256GCM content encryption key
pub const SYMMETRIC_KEY_LEN: usize = 32;

/// Shared AES-256 key for direct (`dir`) JWE encryption
///
/// Key bytes are zeroed when the key is dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey([u8; SYMMETRIC_KEY_LEN]);

impl SymmetricKey {
    #[must_use]
    pub fn from_bytes(bytes: [u8; SYMMETRIC_KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Create a key from a slice that must be exactly 32 bytes long
    ///
    /// # Errors
    ///
    /// Returns [`JoseError::InvalidKey`] for any other length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let key: [u8; SYMMETRIC_KEY_LEN] =
            bytes.try_into().map_err(|_| JoseError::InvalidKey {
                reason: format!(
                    "AES-256 key must be {} bytes, got {}",
                    SYMMETRIC_KEY_LEN,
                    bytes.len()
                ),
            })?;
        Ok(Self(key))
    }

    /// Generate a fresh random key from the OS RNG
    #[must_use]
    pub fn generate() -> Self {
        let mut key = [0u8; SYMMETRIC_KEY_LEN];
        OsRng.fill_bytes(&mut key);
        Self(key)
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymmetricKey")
            .field("len", &SYMMETRIC_KEY_LEN)
            .finish_non_exhaustive()
    }
}

/// Key used to encrypt a token into a JWE
///
/// The variant selects the key management algorithm: `dir` for a symmetric
/// key, `ECDH-ES` for a recipient's EC public key.
#[derive(Debug, Clone, Copy)]
pub enum EncryptionKey<'a> {
    Symmetric(&'a SymmetricKey),
    EcPublic(&'a PublicKey),
}

impl<'a> From<&'a SymmetricKey> for EncryptionKey<'a> {
    fn from(key: &'a SymmetricKey) -> Self {
        Self::Symmetric(key)
    }
}

impl<'a> From<&'a PublicKey> for EncryptionKey<'a> {
    fn from(key: &'a PublicKey) -> Self {
        Self::EcPublic(key)
    }
}

/// Key used to decrypt a JWE
#[derive(Clone, Copy)]
pub enum DecryptionKey<'a> {
    Symmetric(&'a SymmetricKey),
    EcPrivate(&'a SecretKey),
}

impl fmt::Debug for DecryptionKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Symmetric(_) => f.write_str("DecryptionKey::Symmetric(..)"),
            Self::EcPrivate(_) => f.write_str("DecryptionKey::EcPrivate(..)"),
        }
    }
}

impl<'a> From<&'a SymmetricKey> for DecryptionKey<'a> {
    fn from(key: &'a SymmetricKey) -> Self {
        Self::Symmetric(key)
    }
}

impl<'a> From<&'a SecretKey> for DecryptionKey<'a> {
    fn from(key: &'a SecretKey) -> Self {
        Self::EcPrivate(key)
    }
}

/// Owned copy of a decryption key, stored inside a JWE-backed token
#[derive(Clone)]
pub(crate) enum StoredDecryptionKey {
    Symmetric(SymmetricKey),
    EcPrivate(SecretKey),
}

impl StoredDecryptionKey {
    pub(crate) fn as_key(&self) -> DecryptionKey<'_> {
        match self {
            Self::Symmetric(key) => DecryptionKey::Symmetric(key),
            Self::EcPrivate(key) => DecryptionKey::EcPrivate(key),
        }
    }
}

impl From<DecryptionKey<'_>> for StoredDecryptionKey {
    fn from(key: DecryptionKey<'_>) -> Self {
        match key {
            DecryptionKey::Symmetric(key) => Self::Symmetric(key.clone()),
            DecryptionKey::EcPrivate(key) => Self::EcPrivate(key.clone()),
        }
    }
}

/// Private key of a signing identity
#[derive(Clone)]
pub enum SigningKey {
    P256(SecretKey),
    BrainpoolP256r1(BrainpoolSecretKey),
}

impl SigningKey {
    #[must_use]
    pub fn curve(&self) -> EcCurve {
        match self {
            Self::P256(_) => EcCurve::P256,
            Self::BrainpoolP256r1(_) => EcCurve::BrainpoolP256r1,
        }
    }

    #[must_use]
    pub fn verification_key(&self) -> VerificationKey {
        match self {
            Self::P256(key) => VerificationKey::P256(key.public_key()),
            Self::BrainpoolP256r1(key) => VerificationKey::BrainpoolP256r1(key.public_key()),
        }
    }
}

impl From<SecretKey> for SigningKey {
    fn from(key: SecretKey) -> Self {
        Self::P256(key)
    }
}

impl From<BrainpoolSecretKey> for SigningKey {
    fn from(key: BrainpoolSecretKey) -> Self {
        Self::BrainpoolP256r1(key)
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SigningKey({})", self.curve().jwk_name())
    }
}

/// Public key that checks JWS signatures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationKey {
    P256(PublicKey),
    BrainpoolP256r1(BrainpoolPublicKey),
}

impl VerificationKey {
    #[must_use]
    pub fn curve(&self) -> EcCurve {
        match self {
            Self::P256(_) => EcCurve::P256,
            Self::BrainpoolP256r1(_) => EcCurve::BrainpoolP256r1,
        }
    }
}

impl From<PublicKey> for VerificationKey {
    fn from(key: PublicKey) -> Self {
        Self::P256(key)
    }
}

impl From<&PublicKey> for VerificationKey {
    fn from(key: &PublicKey) -> Self {
        Self::P256(*key)
    }
}

impl From<BrainpoolPublicKey> for VerificationKey {
    fn from(key: BrainpoolPublicKey) -> Self {
        Self::BrainpoolP256r1(key)
    }
}

impl From<&BrainpoolPublicKey> for VerificationKey {
    fn from(key: &BrainpoolPublicKey) -> Self {
        Self::BrainpoolP256r1(*key)
    }
}

impl From<&VerificationKey> for VerificationKey {
    fn from(key: &VerificationKey) -> Self {
        key.clone()
    }
}

/// Elliptic-curve key pair plus certificate chain used to sign tokens
///
/// The key's curve selects the signature algorithm: P-256 signs `ES256`,
/// brainpoolP256r1 signs `BP256R1`. Owned by one
/// [`JwtProcessor`](crate::JwtProcessor) and never mutated after construction.
#[derive(Clone)]
pub struct SigningIdentity {
    signing_key: SigningKey,
    certificate_chain: Vec<Vec<u8>>,
    key_id: Option<String>,
}

impl SigningIdentity {
    #[must_use]
    pub fn new(signing_key: impl Into<SigningKey>) -> Self {
        Self {
            signing_key: signing_key.into(),
            certificate_chain: Vec::new(),
            key_id: None,
        }
    }

    /// Load the private key from a PKCS#8 PEM document
    ///
    /// P-256 is tried first, then brainpoolP256r1.
    ///
    /// # Errors
    ///
    /// Returns [`JoseError::InvalidKey`] if the PEM holds neither curve's key.
    pub fn from_pkcs8_pem(pem: &str) -> Result<Self> {
        if let Ok(key) = SecretKey::from_pkcs8_pem(pem) {
            return Ok(Self::new(key));
        }
        let key = BrainpoolSecretKey::from_pkcs8_pem(pem).map_err(|e| JoseError::InvalidKey {
            reason: format!("Invalid PKCS#8 EC private key: {}", e),
        })?;
        Ok(Self::new(key))
    }

    /// Attach the DER certificate chain, leaf first
    pub fn with_certificate_chain(mut self, chain: Vec<Vec<u8>>) -> Self {
        self.certificate_chain = chain;
        self
    }

    pub fn with_key_id(mut self, key_id: impl Into<String>) -> Self {
        self.key_id = Some(key_id.into());
        self
    }

    #[must_use]
    pub fn curve(&self) -> EcCurve {
        self.signing_key.curve()
    }

    /// Signature algorithm derived from the key's curve
    #[must_use]
    pub fn algorithm(&self) -> SigningAlgorithm {
        SigningAlgorithm::for_curve(self.curve())
    }

    #[must_use]
    pub fn verification_key(&self) -> VerificationKey {
        self.signing_key.verification_key()
    }

    #[must_use]
    pub fn key_id(&self) -> Option<&str> {
        self.key_id.as_deref()
    }

    #[must_use]
    pub fn certificate_chain(&self) -> &[Vec<u8>] {
        &self.certificate_chain
    }

    /// Certificate chain as the `x5c` header expects it (standard base64, not url-safe)
    pub(crate) fn x5c(&self) -> Vec<String> {
        self.certificate_chain
            .iter()
            .map(|der| STANDARD.encode(der))
            .collect()
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }
}

impl fmt::Debug for SigningIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningIdentity")
            .field("curve", &self.curve())
            .field("key_id", &self.key_id)
            .field("certificates", &self.certificate_chain.len())
            .finish_non_exhaustive()
    }
}
