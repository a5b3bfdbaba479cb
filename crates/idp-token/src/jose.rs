//! Compact JOSE objects with lazy, memoized claim decoding
//!
//! A raw compact string is split on `.` at construction; nothing is decoded
//! until a claim map is requested. Each map is decoded at most once and cached
//! for the object's lifetime.
//!
//! Five segments select the JWE variant; anything else is treated as a JWS and
//! rejected on first decode unless it has exactly three segments.

use once_cell::sync::OnceCell;
use serde_json::Value;

use crate::Result;
use crate::claims::{ClaimMap, ClaimName};
use crate::errors::JoseError;
use crate::helpers::decode_json_segment;
use crate::jwe;
use crate::keys::{DecryptionKey, StoredDecryptionKey};

const JWS_PARTS: usize = 3;
const JWE_PARTS: usize = 5;

/// Claim extraction capability shared by every JOSE variant
pub trait JoseClaims {
    /// Decoded protected header
    ///
    /// # Errors
    ///
    /// Returns [`JoseError::MalformedToken`] when the token has too few segments
    /// and [`JoseError::InvalidEncoding`] when the header is not base64url JSON.
    fn extract_header_claims(&self) -> Result<&ClaimMap>;

    /// Decoded body claims
    ///
    /// # Errors
    ///
    /// Same as [`JoseClaims::extract_header_claims`]; encrypted variants also fail
    /// when no decryption key is available or decryption fails.
    fn extract_body_claims(&self) -> Result<&ClaimMap>;
}

/// Raw compact serialization and its segment boundaries
#[derive(Debug, Clone)]
struct CompactParts {
    raw: String,
    parts: usize,
}

impl CompactParts {
    fn new(raw: String) -> Self {
        let parts = raw.split('.').count();
        Self { raw, parts }
    }

    fn segments(&self) -> Vec<&str> {
        self.raw.split('.').collect()
    }

    /// Check the segment count against what the variant needs
    fn expect_parts(&self, expected: usize) -> Result<Vec<&str>> {
        if self.parts < JWS_PARTS {
            return Err(JoseError::malformed(self.parts));
        }
        if self.parts != expected {
            return Err(JoseError::MalformedToken {
                parts: self.parts,
                reason: format!(
                    "expected {} parts but found {} parts",
                    expected, self.parts
                ),
            });
        }
        Ok(self.segments())
    }
}

/// Signed token: `header.body.signature`
#[derive(Debug, Clone)]
pub struct JwsObject {
    compact: CompactParts,
    header: OnceCell<ClaimMap>,
    body: OnceCell<ClaimMap>,
}

impl JwsObject {
    fn new(compact: CompactParts) -> Self {
        Self {
            compact,
            header: OnceCell::new(),
            body: OnceCell::new(),
        }
    }

    /// Bytes covered by the signature (`header.body`) and the encoded signature
    pub(crate) fn signing_input(&self) -> Result<(&str, &str)> {
        self.compact.expect_parts(JWS_PARTS)?;
        match self.compact.raw.rsplit_once('.') {
            Some((input, signature)) => Ok((input, signature)),
            None => Err(JoseError::malformed(self.compact.parts)),
        }
    }
}

impl JoseClaims for JwsObject {
    fn extract_header_claims(&self) -> Result<&ClaimMap> {
        self.header.get_or_try_init(|| {
            let segments = self.compact.expect_parts(JWS_PARTS)?;
            tracing::trace!(parts = self.compact.parts, "Decoding JWS header");
            decode_json_segment("header", segments[0])
        })
    }

    fn extract_body_claims(&self) -> Result<&ClaimMap> {
        self.body.get_or_try_init(|| {
            let segments = self.compact.expect_parts(JWS_PARTS)?;
            tracing::trace!(parts = self.compact.parts, "Decoding JWS body");
            decode_json_segment("body", segments[1])
        })
    }
}

/// Encrypted token: `header.encrypted_key.iv.ciphertext.tag`
///
/// Body claims are only available once a decryption key is attached. They
/// then consist of the single `njwt` claim holding the nested token as a raw
/// string; parsing the nested token is a separate step.
#[derive(Clone)]
pub struct JweObject {
    compact: CompactParts,
    header: OnceCell<ClaimMap>,
    body: OnceCell<ClaimMap>,
    decryption_key: Option<StoredDecryptionKey>,
}

impl JweObject {
    fn new(compact: CompactParts) -> Self {
        Self {
            compact,
            header: OnceCell::new(),
            body: OnceCell::new(),
            decryption_key: None,
        }
    }

    pub(crate) fn with_decryption_key(mut self, key: StoredDecryptionKey) -> Self {
        self.decryption_key = Some(key);
        self.body = OnceCell::new();
        self
    }

    pub(crate) fn has_decryption_key(&self) -> bool {
        self.decryption_key.is_some()
    }

    /// Decrypt with `key` and return the nested compact token
    pub(crate) fn decrypt(&self, key: DecryptionKey<'_>) -> Result<String> {
        let header = self.extract_header_claims()?;
        let segments = self.compact.expect_parts(JWE_PARTS)?;
        jwe::decrypt_nested(&segments, header, key)
    }
}

impl std::fmt::Debug for JweObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JweObject")
            .field("parts", &self.compact.parts)
            .field("header", &self.header.get())
            .field("has_decryption_key", &self.decryption_key.is_some())
            .finish_non_exhaustive()
    }
}

impl JoseClaims for JweObject {
    fn extract_header_claims(&self) -> Result<&ClaimMap> {
        self.header.get_or_try_init(|| {
            let segments = self.compact.expect_parts(JWE_PARTS)?;
            tracing::trace!(parts = self.compact.parts, "Decoding JWE header");
            decode_json_segment("header", segments[0])
        })
    }

    fn extract_body_claims(&self) -> Result<&ClaimMap> {
        self.body.get_or_try_init(|| {
            let key = self
                .decryption_key
                .as_ref()
                .ok_or(JoseError::MissingDecryptionKey)?;
            let nested = self.decrypt(key.as_key())?;

            let mut claims = ClaimMap::new();
            claims.insert(
                ClaimName::NestedJwt.jose_name().to_string(),
                Value::String(nested),
            );
            Ok(claims)
        })
    }
}

/// A parsed compact token, dispatched on segment count
#[derive(Debug, Clone)]
pub enum JoseObject {
    Jws(JwsObject),
    Jwe(JweObject),
}

impl JoseObject {
    /// Wrap a compact string; never fails, decoding happens on first access
    pub fn parse(raw: impl Into<String>) -> Self {
        let compact = CompactParts::new(raw.into());
        if compact.parts == JWE_PARTS {
            Self::Jwe(JweObject::new(compact))
        } else {
            Self::Jws(JwsObject::new(compact))
        }
    }

    pub fn raw(&self) -> &str {
        match self {
            Self::Jws(jws) => &jws.compact.raw,
            Self::Jwe(jwe) => &jwe.compact.raw,
        }
    }

    /// Number of `.`-separated segments
    pub fn parts(&self) -> usize {
        match self {
            Self::Jws(jws) => jws.compact.parts,
            Self::Jwe(jwe) => jwe.compact.parts,
        }
    }
}

impl JoseClaims for JoseObject {
    fn extract_header_claims(&self) -> Result<&ClaimMap> {
        match self {
            Self::Jws(jws) => jws.extract_header_claims(),
            Self::Jwe(jwe) => jwe.extract_header_claims(),
        }
    }

    fn extract_body_claims(&self) -> Result<&ClaimMap> {
        match self {
            Self::Jws(jws) => jws.extract_body_claims(),
            Self::Jwe(jwe) => jwe.extract_body_claims(),
        }
    }
}
