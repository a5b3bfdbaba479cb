//! JWT claim accumulation
//!
//! [`JwtBuilder`] collects header and body claims for a
//! [`JwtProcessor`](crate::JwtProcessor) to sign. It does not validate claim
//! semantics.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::Result;
use crate::claims::{ClaimMap, ClaimName};
use crate::helpers::to_claim_value;

/// Unsigned claim set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JwtBuilder {
    header: ClaimMap,
    body: ClaimMap,
    expires_at: Option<DateTime<Utc>>,
}

impl JwtBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_header_claim(self, name: ClaimName, value: impl Into<Value>) -> Self {
        self.add_raw_header_claim(name.jose_name(), value)
    }

    pub fn add_body_claim(self, name: ClaimName, value: impl Into<Value>) -> Self {
        self.add_raw_body_claim(name.jose_name(), value)
    }

    /// Add a header claim outside the registry
    pub fn add_raw_header_claim(
        mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.header.insert(name.into(), value.into());
        self
    }

    /// Add a body claim outside the registry
    pub fn add_raw_body_claim(
        mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.body.insert(name.into(), value.into());
        self
    }

    pub fn add_all_header_claims(mut self, claims: ClaimMap) -> Self {
        self.header.extend(claims);
        self
    }

    pub fn add_all_body_claims(mut self, claims: ClaimMap) -> Self {
        self.body.extend(claims);
        self
    }

    /// Add a body claim from any serializable value
    ///
    /// # Errors
    ///
    /// Returns [`JoseError::SerializationFailed`](crate::JoseError::SerializationFailed)
    /// with the encoder error as source when `value` fails to serialize.
    pub fn add_serializable_body_claim<T: Serialize + ?Sized>(
        self,
        name: ClaimName,
        value: &T,
    ) -> Result<Self> {
        let value = to_claim_value(value, "Error during Claim serialization")?;
        Ok(self.add_body_claim(name, value))
    }

    /// Explicit expiry; written as `exp` in whole seconds, replacing any `exp` body claim
    pub fn expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn header_claims(&self) -> &ClaimMap {
        &self.header
    }

    pub fn body_claims(&self) -> &ClaimMap {
        &self.body
    }

    /// Split into header and body with the explicit expiry applied
    pub(crate) fn into_claims(self) -> (ClaimMap, ClaimMap) {
        let Self {
            header,
            mut body,
            expires_at,
        } = self;
        if let Some(expires_at) = expires_at {
            body.insert(
                ClaimName::ExpiresAt.jose_name().to_string(),
                Value::from(expires_at.timestamp()),
            );
        }
        (header, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::JoseError;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde::Serializer;
    use serde::ser::Error as _;
    use serde_json::json;

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: Serializer>(
            &self,
            _serializer: S,
        ) -> std::result::Result<S::Ok, S::Error> {
            Err(S::Error::custom("forced"))
        }
    }

    #[test]
    fn test_accumulates_claims() {
        let builder = JwtBuilder::new()
            .add_header_claim(ClaimName::KeyId, "puk_idp_sig")
            .add_body_claim(ClaimName::Confirmation, "foobarschmar")
            .add_raw_body_claim("custom", json!({"nested": true}));

        assert_eq!(builder.header_claims()["kid"], "puk_idp_sig");
        assert_eq!(builder.body_claims()["cnf"], "foobarschmar");
        assert_eq!(builder.body_claims()["custom"]["nested"], true);
    }

    #[test]
    fn test_explicit_expiry_overrides_body_claim() {
        let expiry = Utc.timestamp_opt(1234567, 0).unwrap();
        let (_, body) = JwtBuilder::new()
            .add_body_claim(ClaimName::ExpiresAt, 1)
            .expires_at(expiry)
            .into_claims();

        assert_eq!(body["exp"], json!(1234567));
    }

    #[test]
    fn test_add_all_merges_maps() {
        let mut extra = ClaimMap::new();
        extra.insert("iss".into(), json!("https://idp.example"));
        extra.insert("sub".into(), json!("subject"));

        let builder = JwtBuilder::new()
            .add_body_claim(ClaimName::Subject, "replaced")
            .add_all_body_claims(extra);
        assert_eq!(builder.body_claims()["sub"], "subject");
        assert_eq!(builder.body_claims().len(), 2);
    }

    #[test]
    fn test_serialization_failure_is_wrapped() {
        let error = JwtBuilder::new()
            .add_serializable_body_claim(ClaimName::Confirmation, &Unserializable)
            .unwrap_err();

        assert!(matches!(error, JoseError::SerializationFailed { .. }));
        assert_eq!(error.to_string(), "Error during Claim serialization");
        assert_eq!(
            std::error::Error::source(&error).unwrap().to_string(),
            "forced"
        );
    }
}
