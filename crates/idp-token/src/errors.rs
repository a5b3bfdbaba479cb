//! Error types for JOSE token processing

use thiserror::Error;

/// Errors raised while parsing, signing, encrypting or decrypting JOSE objects
#[derive(Error, Debug)]
pub enum JoseError {
    /// Compact serialization does not have a usable number of segments
    #[error("Malformed token: {reason}")]
    MalformedToken { parts: usize, reason: String },

    /// A segment is not valid base64url or not valid JSON
    #[error("Invalid {segment} encoding: {reason}")]
    InvalidEncoding {
        segment: &'static str,
        reason: String,
    },

    /// A claim is present but its value has the wrong shape
    #[error("Invalid claim '{claim}': {reason}")]
    InvalidClaim { claim: String, reason: String },

    /// Signature does not match the signing input
    #[error("Invalid signature for algorithm {algorithm}")]
    InvalidSignature { algorithm: String },

    /// The `alg` or `enc` header names something this crate cannot process
    #[error("Unsupported algorithm: {algorithm}")]
    UnsupportedAlgorithm { algorithm: String },

    /// Authentication tag, key agreement or header check failed on decryption
    #[error("Decryption failed: {reason}")]
    DecryptionFailed { reason: String },

    #[error("Encryption failed: {reason}")]
    EncryptionFailed { reason: String },

    /// Body claims of a JWE were requested before a decryption key was supplied
    #[error("Encrypted token has no decryption key")]
    MissingDecryptionKey,

    #[error("Signing failed: {reason}")]
    SigningFailed { reason: String },

    /// Key material is malformed or does not fit the requested operation
    #[error("Invalid key: {reason}")]
    InvalidKey { reason: String },

    /// The JSON encoder rejected a claim value or document
    #[error("{context}")]
    SerializationFailed {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl JoseError {
    /// Wrap a JSON encoder failure with a description of what was being serialized
    pub fn serialization(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::SerializationFailed {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn malformed(parts: usize) -> Self {
        Self::MalformedToken {
            parts,
            reason: format!("only found {} parts", parts),
        }
    }

    /// Check if this error indicates tampering or a wrong key rather than bad input
    pub fn is_security_failure(&self) -> bool {
        matches!(
            self,
            Self::InvalidSignature { .. } | Self::DecryptionFailed { .. }
        )
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::MalformedToken { .. }
            | Self::InvalidEncoding { .. }
            | Self::InvalidClaim { .. } => "format",
            Self::InvalidSignature { .. } | Self::UnsupportedAlgorithm { .. } => "signature",
            Self::DecryptionFailed { .. }
            | Self::EncryptionFailed { .. }
            | Self::MissingDecryptionKey
            | Self::SigningFailed { .. } => "crypto",
            Self::InvalidKey { .. } => "key",
            Self::SerializationFailed { .. } => "serialization",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_malformed_reports_part_count() {
        let error = JoseError::malformed(1);
        assert_eq!(error.to_string(), "Malformed token: only found 1 parts");
        assert_eq!(error.category(), "format");
        assert!(!error.is_security_failure());
    }

    #[test]
    fn test_serialization_keeps_cause() {
        let cause = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error = JoseError::serialization("Error during Claim serialization", cause);

        assert_eq!(error.to_string(), "Error during Claim serialization");
        assert!(error.source().is_some());
        assert_eq!(error.category(), "serialization");
    }

    #[test]
    fn test_security_failures() {
        let error = JoseError::InvalidSignature {
            algorithm: "ES256".to_string(),
        };
        assert!(error.is_security_failure());
        assert_eq!(error.category(), "signature");

        let error = JoseError::DecryptionFailed {
            reason: "tag mismatch".to_string(),
        };
        assert!(error.is_security_failure());
        assert_eq!(error.to_string(), "Decryption failed: tag mismatch");
    }
}
