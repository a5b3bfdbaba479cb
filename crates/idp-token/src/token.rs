//! JSON Web Token: typed claim access, verification, nested encryption

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::Result;
use crate::claims::{ClaimMap, ClaimName, ClaimSource};
use crate::errors::JoseError;
use crate::jose::{JoseClaims, JoseObject};
use crate::jwe;
use crate::keys::{DecryptionKey, EncryptionKey, StoredDecryptionKey, VerificationKey};
use crate::signing;
use crate::types::{ContentEncryptionAlgorithm, SigningAlgorithm};

/// A compact JWS or JWE
///
/// Construction never fails; header and body are decoded lazily on first
/// access. Two tokens are equal when their compact serializations are equal.
///
/// Serializes as its compact string.
#[derive(Debug, Clone)]
pub struct JsonWebToken {
    jose: JoseObject,
}

impl JsonWebToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self {
            jose: JoseObject::parse(raw),
        }
    }

    /// Compact serialization
    pub fn raw_string(&self) -> &str {
        self.jose.raw()
    }

    pub fn jose_object(&self) -> &JoseObject {
        &self.jose
    }

    pub fn is_encrypted(&self) -> bool {
        matches!(self.jose, JoseObject::Jwe(_))
    }

    /// # Errors
    ///
    /// See [`JoseClaims::extract_header_claims`].
    pub fn header_claims(&self) -> Result<&ClaimMap> {
        self.jose.extract_header_claims()
    }

    /// Body claims; for a JWE with an attached decryption key this is the single
    /// `njwt` claim holding the nested token
    ///
    /// # Errors
    ///
    /// See [`JoseClaims::extract_body_claims`].
    pub fn body_claims(&self) -> Result<&ClaimMap> {
        self.jose.extract_body_claims()
    }

    /// Look up a header claim; `Ok(None)` if absent
    ///
    /// # Errors
    ///
    /// Fails only when the header itself cannot be decoded.
    pub fn get_header_claim(&self, name: ClaimName) -> Result<Option<&Value>> {
        self.get_claim(name, ClaimSource::Header)
    }

    /// Look up a body claim; `Ok(None)` if absent
    ///
    /// # Errors
    ///
    /// Fails only when the body cannot be decoded or decrypted.
    pub fn get_body_claim(&self, name: ClaimName) -> Result<Option<&Value>> {
        self.get_claim(name, ClaimSource::Body)
    }

    /// # Errors
    ///
    /// Fails when the selected claim map cannot be decoded.
    pub fn get_claim(&self, name: ClaimName, source: ClaimSource) -> Result<Option<&Value>> {
        let claims = match source {
            ClaimSource::Header => self.header_claims()?,
            ClaimSource::Body => self.body_claims()?,
        };
        Ok(claims.get(name.jose_name()))
    }

    /// String-valued claim
    ///
    /// # Errors
    ///
    /// Returns [`JoseError::InvalidClaim`] when the claim is present but not a string.
    pub fn string_claim(&self, name: ClaimName, source: ClaimSource) -> Result<Option<&str>> {
        match self.get_claim(name, source)? {
            None => Ok(None),
            Some(Value::String(value)) => Ok(Some(value)),
            Some(other) => Err(invalid_claim(name, "string", other)),
        }
    }

    /// Object-valued claim
    ///
    /// # Errors
    ///
    /// Returns [`JoseError::InvalidClaim`] when the claim is present but not an object.
    pub fn map_claim(&self, name: ClaimName, source: ClaimSource) -> Result<Option<&ClaimMap>> {
        match self.get_claim(name, source)? {
            None => Ok(None),
            Some(Value::Object(map)) => Ok(Some(map)),
            Some(other) => Err(invalid_claim(name, "object", other)),
        }
    }

    /// Interpret a numeric claim as seconds since the Unix epoch
    ///
    /// # Errors
    ///
    /// Returns [`JoseError::InvalidClaim`] when the value is not an integer or is
    /// outside the representable time range.
    pub fn get_date_time_claim(
        &self,
        name: ClaimName,
        source: ClaimSource,
    ) -> Result<Option<DateTime<Utc>>> {
        let Some(value) = self.get_claim(name, source)? else {
            return Ok(None);
        };
        let seconds = value
            .as_i64()
            .ok_or_else(|| invalid_claim(name, "integer epoch seconds", value))?;
        Utc.timestamp_opt(seconds, 0)
            .single()
            .map(Some)
            .ok_or_else(|| JoseError::InvalidClaim {
                claim: name.jose_name().to_string(),
                reason: format!("{} is out of range for a timestamp", seconds),
            })
    }

    /// Expiry of the token
    ///
    /// Read from the body of a JWS and from the protected header of a JWE, where
    /// it is readable without decryption.
    ///
    /// # Errors
    ///
    /// See [`JsonWebToken::get_date_time_claim`].
    pub fn expires_at(&self) -> Result<Option<DateTime<Utc>>> {
        let source = if self.is_encrypted() {
            ClaimSource::Header
        } else {
            ClaimSource::Body
        };
        self.get_date_time_claim(ClaimName::ExpiresAt, source)
    }

    /// Content encryption algorithm from the `enc` header, if any
    ///
    /// # Errors
    ///
    /// Returns [`JoseError::UnsupportedAlgorithm`] for an unknown `enc` value.
    pub fn encryption_algorithm(&self) -> Result<Option<ContentEncryptionAlgorithm>> {
        self.string_claim(ClaimName::EncryptionAlgorithm, ClaimSource::Header)?
            .map(ContentEncryptionAlgorithm::from_str)
            .transpose()
    }

    /// Verify the signature against `key` using the header's `alg`
    ///
    /// `ES256` needs a P-256 key, `BP256R1` a brainpoolP256r1 key.
    ///
    /// # Errors
    ///
    /// - [`JoseError::InvalidSignature`] when the signature does not match
    /// - [`JoseError::InvalidKey`] when the key's curve does not fit `alg`
    /// - [`JoseError::UnsupportedAlgorithm`] for an unknown `alg` and for
    ///   encrypted tokens
    pub fn verify(&self, key: impl Into<VerificationKey>) -> Result<()> {
        self.verify_signature(&key.into()).inspect_err(|e| {
            tracing::warn!(category = e.category(), error = %e, "JWT verification failed");
        })
    }

    fn verify_signature(&self, key: &VerificationKey) -> Result<()> {
        let header = self.header_claims()?;
        let algorithm = header
            .get(ClaimName::Algorithm.jose_name())
            .and_then(Value::as_str)
            .ok_or_else(|| JoseError::InvalidClaim {
                claim: ClaimName::Algorithm.jose_name().to_string(),
                reason: "missing or not a string".to_string(),
            })?;

        let JoseObject::Jws(jws) = &self.jose else {
            return Err(JoseError::UnsupportedAlgorithm {
                algorithm: algorithm.to_string(),
            });
        };
        let signing_algorithm = SigningAlgorithm::from_str(algorithm)?;

        let (signing_input, signature) = jws.signing_input()?;
        if !signing::verify(signing_algorithm, key, signing_input, signature)? {
            return Err(JoseError::InvalidSignature {
                algorithm: algorithm.to_string(),
            });
        }
        Ok(())
    }

    /// Encrypt this token as the nested payload of a new JWE
    ///
    /// A [`SymmetricKey`](crate::SymmetricKey) selects `dir`, an EC public key
    /// selects `ECDH-ES`. The outer header carries `enc: A256GCM`,
    /// `cty: NJWT` and this token's `exp`.
    ///
    /// # Errors
    ///
    /// Fails when this token's claims cannot be decoded to find `exp`, or when
    /// encryption fails.
    pub fn encrypt<'k>(&self, key: impl Into<EncryptionKey<'k>>) -> Result<JsonWebToken> {
        let expiry = self.expiry_claim()?;
        let compact = jwe::encrypt_nested(self.raw_string(), expiry, key.into())?;
        Ok(JsonWebToken::new(compact))
    }

    /// Attach a decryption key so that [`JsonWebToken::body_claims`] can decrypt
    ///
    /// Has no effect on a JWS.
    pub fn with_decryption_key<'k>(self, key: impl Into<DecryptionKey<'k>>) -> Self {
        match self.jose {
            JoseObject::Jwe(jwe) => {
                let key = StoredDecryptionKey::from(key.into());
                Self {
                    jose: JoseObject::Jwe(jwe.with_decryption_key(key)),
                }
            }
            jose @ JoseObject::Jws(_) => Self { jose },
        }
    }

    /// Whether a JWE token carries a decryption key
    pub fn has_decryption_key(&self) -> bool {
        match &self.jose {
            JoseObject::Jwe(jwe) => jwe.has_decryption_key(),
            JoseObject::Jws(_) => false,
        }
    }

    /// Decrypt this JWE and return the nested token
    ///
    /// # Errors
    ///
    /// - [`JoseError::DecryptionFailed`] on tag mismatch or unsupported `alg`/`enc`
    /// - [`JoseError::InvalidKey`] when the key kind does not match `alg`
    /// - [`JoseError::UnsupportedAlgorithm`] naming the missing `enc` when this
    ///   token is not encrypted
    pub fn decrypt_nested_jwt<'k>(
        &self,
        key: impl Into<DecryptionKey<'k>>,
    ) -> Result<JsonWebToken> {
        let JoseObject::Jwe(jwe) = &self.jose else {
            return Err(JoseError::UnsupportedAlgorithm {
                algorithm: format!(
                    "missing '{}' header",
                    ClaimName::EncryptionAlgorithm.jose_name()
                ),
            });
        };

        let nested = jwe.decrypt(key.into()).inspect_err(|e| {
            tracing::warn!(category = e.category(), error = %e, "JWE decryption failed");
        })?;
        tracing::debug!(parts = nested.split('.').count(), "Unwrapped nested JWT");
        Ok(JsonWebToken::new(nested))
    }

    /// `exp` to propagate into an enclosing JWE header
    ///
    /// A JWS without its own `exp` falls back to its header, then to the token
    /// nested in its `njwt` claim.
    fn expiry_claim(&self) -> Result<Option<Value>> {
        let key = ClaimName::ExpiresAt.jose_name();
        if self.is_encrypted() {
            return Ok(self.header_claims()?.get(key).cloned());
        }

        let body = self.body_claims()?;
        if let Some(exp) = body.get(key) {
            return Ok(Some(exp.clone()));
        }
        if let Some(exp) = self.header_claims()?.get(key) {
            return Ok(Some(exp.clone()));
        }
        match body.get(ClaimName::NestedJwt.jose_name()).and_then(Value::as_str) {
            Some(nested) => JsonWebToken::new(nested).expiry_claim(),
            None => Ok(None),
        }
    }
}

fn invalid_claim(name: ClaimName, expected: &str, found: &Value) -> JoseError {
    JoseError::InvalidClaim {
        claim: name.jose_name().to_string(),
        reason: format!("expected {}, found {}", expected, found),
    }
}

impl PartialEq for JsonWebToken {
    fn eq(&self, other: &Self) -> bool {
        self.raw_string() == other.raw_string()
    }
}

impl Eq for JsonWebToken {}

impl fmt::Display for JsonWebToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.raw_string())
    }
}

impl From<String> for JsonWebToken {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<&str> for JsonWebToken {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl Serialize for JsonWebToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.raw_string())
    }
}

impl<'de> Deserialize<'de> for JsonWebToken {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}
