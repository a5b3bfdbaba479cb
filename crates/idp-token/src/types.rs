//! Algorithm identifiers used in JOSE headers
//!
//! Each enum maps to the exact `alg` / `enc` strings of RFC 7518 and the
//! health-sector profile. Parsing an unknown identifier yields
//! [`JoseError::UnsupportedAlgorithm`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::JoseError;

/// Elliptic curves a signing identity may live on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EcCurve {
    #[serde(rename = "P-256")]
    P256,
    #[serde(rename = "BP-256")]
    BrainpoolP256r1,
}

impl EcCurve {
    /// Curve name as used in the `crv` member of an EC JWK
    #[must_use]
    pub fn jwk_name(self) -> &'static str {
        match self {
            Self::P256 => "P-256",
            Self::BrainpoolP256r1 => "BP-256",
        }
    }
}

/// Signature algorithms for JWS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SigningAlgorithm {
    /// ECDSA over P-256 with SHA-256 (RFC 7518)
    #[serde(rename = "ES256")]
    Es256,

    /// ECDSA over brainpoolP256r1 with SHA-256
    #[serde(rename = "BP256R1")]
    Bp256r1,
}

impl SigningAlgorithm {
    /// Select the signature algorithm for a key's curve
    #[must_use]
    pub fn for_curve(curve: EcCurve) -> Self {
        match curve {
            EcCurve::P256 => Self::Es256,
            EcCurve::BrainpoolP256r1 => Self::Bp256r1,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Es256 => "ES256",
            Self::Bp256r1 => "BP256R1",
        }
    }
}

/// Key management algorithms for JWE (`alg` header)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyManagementAlgorithm {
    /// Shared symmetric key used directly as the content encryption key
    #[serde(rename = "dir")]
    Direct,

    /// Ephemeral-static ECDH with Concat KDF, key used directly
    #[serde(rename = "ECDH-ES")]
    EcdhEs,
}

impl KeyManagementAlgorithm {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Direct => "dir",
            Self::EcdhEs => "ECDH-ES",
        }
    }
}

/// Content encryption algorithms for JWE (`enc` header)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentEncryptionAlgorithm {
    /// AES-256 in Galois/Counter Mode
    #[serde(rename = "A256GCM")]
    A256Gcm,
}

impl ContentEncryptionAlgorithm {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A256Gcm => "A256GCM",
        }
    }

    /// Content encryption key length in bytes
    #[must_use]
    pub fn key_len(self) -> usize {
        match self {
            Self::A256Gcm => 32,
        }
    }
}

macro_rules! impl_wire_name {
    ($ty:ty, [$($variant:path),+]) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = JoseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $(
                    if s == $variant.as_str() {
                        return Ok($variant);
                    }
                )+
                Err(JoseError::UnsupportedAlgorithm {
                    algorithm: s.to_string(),
                })
            }
        }
    };
}

impl_wire_name!(
    SigningAlgorithm,
    [SigningAlgorithm::Es256, SigningAlgorithm::Bp256r1]
);
impl_wire_name!(
    KeyManagementAlgorithm,
    [KeyManagementAlgorithm::Direct, KeyManagementAlgorithm::EcdhEs]
);
impl_wire_name!(
    ContentEncryptionAlgorithm,
    [ContentEncryptionAlgorithm::A256Gcm]
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curve_selects_algorithm() {
        assert_eq!(
            SigningAlgorithm::for_curve(EcCurve::BrainpoolP256r1).as_str(),
            "BP256R1"
        );
        assert_eq!(SigningAlgorithm::for_curve(EcCurve::P256).as_str(), "ES256");
    }

    #[test]
    fn test_parse_header_values() {
        assert_eq!(
            "dir".parse::<KeyManagementAlgorithm>().unwrap(),
            KeyManagementAlgorithm::Direct
        );
        assert_eq!(
            "ECDH-ES".parse::<KeyManagementAlgorithm>().unwrap(),
            KeyManagementAlgorithm::EcdhEs
        );
        assert_eq!(
            "A256GCM".parse::<ContentEncryptionAlgorithm>().unwrap(),
            ContentEncryptionAlgorithm::A256Gcm
        );
    }

    #[test]
    fn test_unknown_algorithm_is_named() {
        let error = "RSA-OAEP".parse::<KeyManagementAlgorithm>().unwrap_err();
        assert_eq!(error.to_string(), "Unsupported algorithm: RSA-OAEP");

        // Matching is case-sensitive
        assert!("es256".parse::<SigningAlgorithm>().is_err());
    }

    #[test]
    fn test_serde_uses_wire_names() {
        assert_eq!(
            serde_json::to_string(&SigningAlgorithm::Bp256r1).unwrap(),
            "\"BP256R1\""
        );
        assert_eq!(
            serde_json::to_string(&ContentEncryptionAlgorithm::A256Gcm).unwrap(),
            "\"A256GCM\""
        );
    }
}
