//! OAuth2 error responses
//!
//! Error codes from RFC 6749 section 5.2, RFC 6750 section 3.1 and RFC 7591
//! section 3.2.2, plus the IdP's extended body carrying a `gematik_*` trace.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DataError;

/// OAuth2 `error` values, matched case-sensitively
///
/// An unrecognized value is a [`DataError::ValidationFailed`] both from
/// [`FromStr`] and from [`from_json_str`](crate::from_json_str).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Oauth2ErrorCode {
    InvalidRequest,
    InvalidClient,
    InvalidGrant,
    UnauthorizedClient,
    UnsupportedGrantType,
    InvalidScope,
    AccessDenied,
    UnsupportedResponseType,
    ServerError,
    TemporarilyUnavailable,
    InvalidToken,
    InsufficientScope,
    InvalidRedirectUri,
    InvalidClientMetadata,
}

impl Oauth2ErrorCode {
    pub const ALL: [Self; 14] = [
        Self::InvalidRequest,
        Self::InvalidClient,
        Self::InvalidGrant,
        Self::UnauthorizedClient,
        Self::UnsupportedGrantType,
        Self::InvalidScope,
        Self::AccessDenied,
        Self::UnsupportedResponseType,
        Self::ServerError,
        Self::TemporarilyUnavailable,
        Self::InvalidToken,
        Self::InsufficientScope,
        Self::InvalidRedirectUri,
        Self::InvalidClientMetadata,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::InvalidClient => "invalid_client",
            Self::InvalidGrant => "invalid_grant",
            Self::UnauthorizedClient => "unauthorized_client",
            Self::UnsupportedGrantType => "unsupported_grant_type",
            Self::InvalidScope => "invalid_scope",
            Self::AccessDenied => "access_denied",
            Self::UnsupportedResponseType => "unsupported_response_type",
            Self::ServerError => "server_error",
            Self::TemporarilyUnavailable => "temporarily_unavailable",
            Self::InvalidToken => "invalid_token",
            Self::InsufficientScope => "insufficient_scope",
            Self::InvalidRedirectUri => "invalid_redirect_uri",
            Self::InvalidClientMetadata => "invalid_client_metadata",
        }
    }
}

impl fmt::Display for Oauth2ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Oauth2ErrorCode {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| {
                DataError::validation("error", format!("unknown OAuth2 error code '{s}'"))
            })
    }
}

/// Plain OAuth2 error body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Oauth2ErrorResponse {
    pub error: Oauth2ErrorCode,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error_description: Option<String>,
}

impl Oauth2ErrorResponse {
    #[must_use]
    pub fn new(error: Oauth2ErrorCode) -> Self {
        Self {
            error,
            error_description: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.error_description = Some(description.into());
        self
    }
}

/// IdP error body with an internal error code and a traceable incident id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdpErrorResponse {
    pub error: Oauth2ErrorCode,
    /// Internal error code, e.g. `"3000"`
    pub gematik_code: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub gematik_timestamp: DateTime<Utc>,
    /// Incident id for log correlation
    pub gematik_uuid: String,
    pub gematik_error_text: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error_description: Option<String>,
}

impl From<&IdpErrorResponse> for Oauth2ErrorResponse {
    fn from(response: &IdpErrorResponse) -> Self {
        Self {
            error: response.error,
            error_description: response.error_description.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json::{DeserializationPolicy, from_json_str, to_json_string};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_wire_names_match_serde() {
        for code in Oauth2ErrorCode::ALL {
            let json = serde_json::to_string(&code).unwrap();
            assert_eq!(json, format!("\"{}\"", code.as_str()));
            assert_eq!(code.as_str().parse::<Oauth2ErrorCode>().unwrap(), code);
        }
    }

    #[test]
    fn test_code_is_case_sensitive() {
        let error = "invalid_Grant".parse::<Oauth2ErrorCode>().unwrap_err();
        assert!(matches!(error, DataError::ValidationFailed { .. }));
        assert!(serde_json::from_str::<Oauth2ErrorCode>("\"invalid_Grant\"").is_err());
    }

    #[test]
    fn test_oauth2_response_reads_valid_bodies() {
        let plain: Oauth2ErrorResponse =
            from_json_str(r#"{"error":"invalid_grant"}"#, DeserializationPolicy::lenient())
                .unwrap();
        assert_eq!(plain, Oauth2ErrorResponse::new(Oauth2ErrorCode::InvalidGrant));

        let described: Oauth2ErrorResponse = from_json_str(
            r#"{"error":"invalid_client","error_description":"something strange happened"}"#,
            DeserializationPolicy::lenient(),
        )
        .unwrap();
        assert_eq!(
            described.error_description.as_deref(),
            Some("something strange happened")
        );
    }

    #[test]
    fn test_oauth2_response_rejects_unknown_codes() {
        let result = from_json_str::<Oauth2ErrorResponse>(
            r#"{"timestamp":"2023-02-16T11:26:09.900+00:00","status":"400",
                "error":"Bad Request","path":"/auth"}"#,
            DeserializationPolicy::lenient(),
        );
        assert!(matches!(result, Err(DataError::ValidationFailed { .. })));

        let error = from_json_str::<Oauth2ErrorResponse>(
            r#"{"error":"invalid_Grant"}"#,
            DeserializationPolicy::lenient(),
        )
        .unwrap_err();
        match error {
            DataError::ValidationFailed { reason, .. } => {
                assert!(reason.contains("invalid_Grant"), "{reason}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_strict_policy_rejects_unknown_property() {
        let error = from_json_str::<Oauth2ErrorResponse>(
            r#"{"error":"invalid_grant","unknown_field":"some_value"}"#,
            DeserializationPolicy::strict(),
        )
        .unwrap_err();
        assert!(matches!(error, DataError::UnknownField { ref path } if path == "unknown_field"));
    }

    #[test]
    fn test_description_is_omitted_when_absent() {
        let json = to_json_string(
            &Oauth2ErrorResponse::new(Oauth2ErrorCode::AccessDenied),
            "error response",
        )
        .unwrap();
        assert_eq!(json, r#"{"error":"access_denied"}"#);
    }

    #[test]
    fn test_idp_error_response_reads_gematik_fields() {
        let json = r#"{
            "error": "invalid_grant",
            "gematik_code": "3000",
            "gematik_timestamp": 1764757439,
            "gematik_uuid": "885f677b-a2c7-4fe4-b15a-b200b71c70d2",
            "gematik_error_text": "code_verifier stimmt nicht mit code_challenge überein"
        }"#;

        let response: IdpErrorResponse =
            from_json_str(json, DeserializationPolicy::strict()).unwrap();

        assert_eq!(response.error, Oauth2ErrorCode::InvalidGrant);
        assert_eq!(response.gematik_code, "3000");
        assert_eq!(
            response.gematik_timestamp,
            Utc.timestamp_opt(1_764_757_439, 0).unwrap()
        );
        assert_eq!(response.gematik_uuid, "885f677b-a2c7-4fe4-b15a-b200b71c70d2");
        assert_eq!(
            response.gematik_error_text,
            "code_verifier stimmt nicht mit code_challenge überein"
        );
        assert!(response.error_description.is_none());

        let written = to_json_string(&response, "error response").unwrap();
        assert!(written.contains(r#""gematik_timestamp":1764757439"#));
        assert_eq!(
            Oauth2ErrorResponse::from(&response),
            Oauth2ErrorResponse::new(Oauth2ErrorCode::InvalidGrant)
        );
    }
}
