//! Integration tests for challenge documents carrying signed tokens
//!
//! Tests cover:
//! - Challenge tokens survive a JSON round trip and still verify
//! - Consent maps are read from snake_case wire names
//! - Strict reads reject undeclared properties

use idp_data::{
    AuthenticationChallenge, DataError, DeserializationPolicy, UserConsent, from_json_str,
    to_json_string,
};
use idp_token::test_utils::{
    generate_brainpool_identity, generate_ec_key_pair, generate_processor,
};
use idp_token::{ClaimName, JwtBuilder, JwtProcessor};
use pretty_assertions::assert_eq;

#[test]
fn test_signed_challenge_verifies_after_round_trip() {
    // GIVEN: A challenge token signed by the IdP
    let processor = generate_processor();
    let token = processor
        .build_jwt(
            JwtBuilder::new()
                .add_body_claim(ClaimName::ResponseType, "code")
                .add_body_claim(ClaimName::CodeChallengeMethod, "S256"),
        )
        .unwrap();
    let consent = UserConsent::new()
        .with_requested_scopes([("openid", "read"), ("profile", "read")])
        .with_requested_claims([("sub", "required"), ("name", "optional")]);
    let challenge = AuthenticationChallenge::new()
        .with_challenge(token.clone())
        .with_user_consent(consent);

    // WHEN: The document is written and read back
    let json = to_json_string(&challenge, "challenge").unwrap();
    let parsed: AuthenticationChallenge =
        from_json_str(&json, DeserializationPolicy::strict()).unwrap();

    // THEN: The token is identical and verifies against the IdP key
    assert_eq!(parsed.challenge.as_ref(), Some(&token));
    parsed
        .verify_challenge(processor.identity().verification_key())
        .unwrap();
    let consent = parsed.user_consent.unwrap();
    assert_eq!(consent.requested_scopes.unwrap().len(), 2);
    assert_eq!(consent.requested_claims.unwrap()["sub"], "required");
}

#[test]
fn test_brainpool_signed_challenge_verifies() {
    let processor = JwtProcessor::new(generate_brainpool_identity());
    let token = processor
        .build_jwt(JwtBuilder::new().add_body_claim(ClaimName::ResponseType, "code"))
        .unwrap();
    let challenge = AuthenticationChallenge::new().with_challenge(token);

    let json = to_json_string(&challenge, "challenge").unwrap();
    let parsed: AuthenticationChallenge =
        from_json_str(&json, DeserializationPolicy::strict()).unwrap();

    let alg = parsed.challenge.as_ref().unwrap().header_claims().unwrap()["alg"].clone();
    assert_eq!(alg, "BP256R1");
    parsed
        .verify_challenge(processor.identity().verification_key())
        .unwrap();
}

#[test]
fn test_challenge_fails_verification_with_foreign_key() {
    let token = generate_processor().build_jwt(JwtBuilder::new()).unwrap();
    let (_, foreign) = generate_ec_key_pair();

    let error = AuthenticationChallenge::new()
        .with_challenge(token)
        .verify_challenge(&foreign)
        .unwrap_err();
    assert!(matches!(error, DataError::Token(_)));
}

#[test]
fn test_consent_reads_snake_case_names() {
    let parsed: AuthenticationChallenge = from_json_str(
        r#"{
            "user_consent": {
                "requested_scopes": {"profile": "read", "openid": "read"},
                "requested_claims": {"email": "optional", "sub": "required"}
            }
        }"#,
        DeserializationPolicy::lenient(),
    )
    .unwrap();

    let consent = parsed.user_consent.unwrap();
    assert_eq!(consent.requested_scopes.unwrap()["profile"], "read");
    assert_eq!(consent.requested_claims.unwrap()["email"], "optional");
}

#[test]
fn test_strict_read_rejects_camel_case_names() {
    let error = from_json_str::<AuthenticationChallenge>(
        r#"{"userConsent":{"requestedScopes":{}}}"#,
        DeserializationPolicy::strict(),
    )
    .unwrap_err();
    assert!(matches!(error, DataError::UnknownField { ref path } if path == "userConsent"));

    let lenient: AuthenticationChallenge = from_json_str(
        r#"{"userConsent":{"requestedScopes":{}}}"#,
        DeserializationPolicy::lenient(),
    )
    .unwrap();
    assert!(lenient.user_consent.is_none());
}
