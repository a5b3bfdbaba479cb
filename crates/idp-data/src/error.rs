//! Error types for IdP data models

use idp_token::JoseError;
use thiserror::Error;

/// Errors raised while validating, reading or writing IdP wire documents
#[derive(Error, Debug)]
pub enum DataError {
    /// A field holds a value the model does not accept
    #[error("Validation failed for '{field}': {reason}")]
    ValidationFailed { field: String, reason: String },

    /// Strict deserialization found a property the model does not declare
    #[error("Unknown field: {path}")]
    UnknownField { path: String },

    /// The JSON encoder or decoder rejected a document
    #[error("{context}")]
    Serialization {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Token(#[from] JoseError),
}

impl DataError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ValidationFailed {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn serialization(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            context: context.into(),
            source,
        }
    }
}

/// Data model result type
pub type DataResult<T> = std::result::Result<T, DataError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_serialization_keeps_cause() {
        let cause = serde_json::from_str::<u8>("x").unwrap_err();
        let error = DataError::serialization("Error during Claim serialization", cause);

        assert_eq!(error.to_string(), "Error during Claim serialization");
        assert!(error.source().is_some());
    }

    #[test]
    fn test_token_errors_convert() {
        let error: DataError = JoseError::MissingDecryptionKey.into();
        assert!(matches!(error, DataError::Token(JoseError::MissingDecryptionKey)));
        assert_eq!(error.to_string(), "Encrypted token has no decryption key");
    }
}
