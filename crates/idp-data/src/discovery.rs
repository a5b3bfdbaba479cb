//! Signed OpenID Connect discovery document
//!
//! The IdP publishes its metadata as a JWS signed with the discovery key, so
//! clients can pin the document to a certificate. Field names follow OpenID
//! Connect Discovery 1.0 plus the IdP's `uri_*` key locations.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use idp_token::helpers::to_claim_value;
use idp_token::{JoseError, JsonWebToken, JwtBuilder, JwtProcessor};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DataResult;

/// Serialization context of the discovery document body
pub const DISCOVERY_DOCUMENT_CONTEXT: &str = "discovery document";

/// OpenID Connect provider metadata as published by the IdP
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiscoveryDocument {
    /// Issuer identifier, matches the `iss` of every issued token
    pub issuer: String,

    pub authorization_endpoint: String,

    /// Single sign-on endpoint for returning users
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub sso_endpoint: Option<String>,

    pub token_endpoint: String,

    /// Endpoint for alternative (device-bound) authentication
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub auth_pair_endpoint: Option<String>,

    /// Location of this document
    pub uri_disc: String,

    /// Location of the IdP's encryption key
    pub uri_puk_idp_enc: String,

    /// Location of the IdP's signature key
    pub uri_puk_idp_sig: String,

    pub jwks_uri: String,

    #[serde(with = "chrono::serde::ts_seconds")]
    pub exp: DateTime<Utc>,

    #[serde(with = "chrono::serde::ts_seconds")]
    pub iat: DateTime<Utc>,

    #[serde(default)]
    pub subject_types_supported: Vec<String>,

    #[serde(default)]
    pub id_token_signing_alg_values_supported: Vec<String>,

    #[serde(default)]
    pub response_types_supported: Vec<String>,

    #[serde(default)]
    pub scopes_supported: Vec<String>,

    #[serde(default)]
    pub response_modes_supported: Vec<String>,

    #[serde(default)]
    pub grant_types_supported: Vec<String>,

    #[serde(default)]
    pub acr_values_supported: Vec<String>,

    #[serde(default)]
    pub token_endpoint_auth_methods_supported: Vec<String>,

    #[serde(default)]
    pub code_challenge_methods_supported: Vec<String>,

    /// Additional metadata fields
    #[serde(flatten)]
    pub additional_fields: HashMap<String, Value>,
}

/// Sign a discovery document with the processor's identity
///
/// The document's fields become the body claims; the header carries the
/// identity's `kid` and certificate chain.
///
/// # Errors
///
/// - [`DataError::Token`](crate::DataError::Token) wrapping
///   [`JoseError::SerializationFailed`] with context `"discovery document"`
///   when the document cannot be encoded
/// - [`DataError::Token`](crate::DataError::Token) when signing fails
pub fn sign_discovery_document(
    processor: &JwtProcessor,
    document: &DiscoveryDocument,
) -> DataResult<JsonWebToken> {
    let token = sign_document(processor, document, DISCOVERY_DOCUMENT_CONTEXT)?;
    tracing::debug!(issuer = %document.issuer, "Signed discovery document");
    Ok(token)
}

pub(crate) fn sign_document<T: Serialize + ?Sized>(
    processor: &JwtProcessor,
    document: &T,
    context: &str,
) -> DataResult<JsonWebToken> {
    let Value::Object(claims) = to_claim_value(document, context)? else {
        return Err(JoseError::InvalidClaim {
            claim: context.to_string(),
            reason: "expected a JSON object".to_string(),
        }
        .into());
    };

    Ok(processor.build_jwt(JwtBuilder::new().add_all_body_claims(claims))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DataError;
    use chrono::TimeZone;
    use idp_token::ClaimName;
    use idp_token::test_utils::{TEST_KEY_ID, generate_processor};
    use pretty_assertions::assert_eq;
    use serde::Serializer;
    use std::error::Error as _;

    fn document() -> DiscoveryDocument {
        let server = "https://idp.example.org";
        DiscoveryDocument {
            issuer: server.to_string(),
            authorization_endpoint: format!("{server}/sign_response"),
            sso_endpoint: Some(format!("{server}/sso_response")),
            token_endpoint: format!("{server}/token"),
            auth_pair_endpoint: None,
            uri_disc: format!("{server}/.well-known/openid-configuration"),
            uri_puk_idp_enc: format!("{server}/idpEnc/jwk.json"),
            uri_puk_idp_sig: format!("{server}/idpSig/jwk.json"),
            jwks_uri: format!("{server}/jwks"),
            exp: Utc.timestamp_opt(1_900_086_400, 0).unwrap(),
            iat: Utc.timestamp_opt(1_900_000_000, 0).unwrap(),
            subject_types_supported: vec!["pairwise".to_string()],
            id_token_signing_alg_values_supported: vec!["BP256R1".to_string()],
            response_types_supported: vec!["code".to_string()],
            scopes_supported: vec!["openid".to_string(), "profile".to_string()],
            response_modes_supported: vec!["query".to_string()],
            grant_types_supported: vec!["authorization_code".to_string()],
            acr_values_supported: vec!["gematik-ehealth-loa-high".to_string()],
            token_endpoint_auth_methods_supported: vec!["none".to_string()],
            code_challenge_methods_supported: vec!["S256".to_string()],
            additional_fields: HashMap::new(),
        }
    }

    #[test]
    fn test_signed_document_carries_fields_and_kid() {
        let processor = generate_processor();
        let token = sign_discovery_document(&processor, &document()).unwrap();

        processor.verify(&token).unwrap();
        assert_eq!(
            token.get_header_claim(ClaimName::KeyId).unwrap(),
            Some(&Value::from(TEST_KEY_ID))
        );
        assert_eq!(
            token.get_body_claim(ClaimName::Issuer).unwrap(),
            Some(&Value::from("https://idp.example.org"))
        );
        assert_eq!(
            token.expires_at().unwrap(),
            Utc.timestamp_opt(1_900_086_400, 0).single()
        );

        let body = token.body_claims().unwrap();
        assert!(body.get("auth_pair_endpoint").is_none());
        assert_eq!(body["scopes_supported"], serde_json::json!(["openid", "profile"]));
    }

    #[test]
    fn test_additional_fields_are_flattened() {
        let mut document = document();
        document
            .additional_fields
            .insert("fed_idp_list_uri".to_string(), Value::from("https://fed"));

        let token = sign_discovery_document(&generate_processor(), &document).unwrap();
        assert_eq!(token.body_claims().unwrap()["fed_idp_list_uri"], "https://fed");
    }

    #[test]
    fn test_encoder_failure_is_wrapped_with_cause() {
        struct Forced;

        impl Serialize for Forced {
            fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
                Err(serde::ser::Error::custom("Serialization failed"))
            }
        }

        let error =
            sign_document(&generate_processor(), &Forced, DISCOVERY_DOCUMENT_CONTEXT).unwrap_err();

        let DataError::Token(JoseError::SerializationFailed { context, source }) = &error else {
            panic!("unexpected error: {error:?}");
        };
        assert_eq!(context, "discovery document");
        assert!(source.to_string().contains("Serialization failed"));
        assert!(error.source().is_some());
    }

    #[test]
    fn test_non_object_document_is_rejected() {
        let error = sign_document(&generate_processor(), "text", "document").unwrap_err();
        assert!(matches!(error, DataError::Token(JoseError::InvalidClaim { .. })));
    }
}
