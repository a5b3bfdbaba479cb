//! Claim registry
//!
//! Maps the claims this crate interprets to their on-wire JOSE names. Claims
//! outside the registry are never rejected; they travel through header and body
//! maps as opaque key/value pairs.

use std::fmt;

use serde_json::{Map, Value};

/// Decoded header or body of a JOSE object
pub type ClaimMap = Map<String, Value>;

/// Expected JSON shape of a claim value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClaimKind {
    String,
    /// Integer seconds since the Unix epoch
    Timestamp,
    Map,
    StringList,
    /// Any JSON value
    Json,
}

/// Where a typed getter should look for a claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClaimSource {
    Header,
    Body,
}

macro_rules! claim_registry {
    ($( $(#[$doc:meta])* $variant:ident => $wire:literal, $kind:ident; )+) => {
        /// Claims understood by the token engine
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum ClaimName {
            $( $(#[$doc])* $variant, )+
        }

        impl ClaimName {
            /// Every registered claim, in declaration order
            pub const ALL: &'static [ClaimName] = &[ $( ClaimName::$variant, )+ ];

            /// Wire name used inside JOSE headers and bodies
            #[must_use]
            pub fn jose_name(self) -> &'static str {
                match self {
                    $( ClaimName::$variant => $wire, )+
                }
            }

            /// Expected value shape
            #[must_use]
            pub fn kind(self) -> ClaimKind {
                match self {
                    $( ClaimName::$variant => ClaimKind::$kind, )+
                }
            }

            /// Reverse lookup; `None` for wire names outside the registry
            #[must_use]
            pub fn from_jose_name(name: &str) -> Option<ClaimName> {
                match name {
                    $( $wire => Some(ClaimName::$variant), )+
                    _ => None,
                }
            }
        }
    };
}

claim_registry! {
    // JOSE header parameters (RFC 7515, RFC 7516)
    Algorithm => "alg", String;
    Type => "typ", String;
    /// `NJWT` marks a nested JWT inside a JWE
    ContentType => "cty", String;
    KeyId => "kid", String;
    X509CertificateChain => "x5c", StringList;
    EncryptionAlgorithm => "enc", String;
    EphemeralPublicKey => "epk", Map;
    JsonWebKey => "jwk", Map;

    // Registered claims (RFC 7519)
    Issuer => "iss", String;
    Subject => "sub", String;
    Audience => "aud", Json;
    ExpiresAt => "exp", Timestamp;
    NotBefore => "nbf", Timestamp;
    IssuedAt => "iat", Timestamp;
    JwtId => "jti", String;

    // OpenID Connect and OAuth2 request parameters
    Nonce => "nonce", String;
    AuthenticationTime => "auth_time", Timestamp;
    AuthenticationClassReference => "acr", String;
    AuthenticationMethodsReference => "amr", StringList;
    AuthorizedParty => "azp", String;
    AccessTokenHash => "at_hash", String;
    ClientId => "client_id", String;
    Scope => "scope", String;
    RedirectUri => "redirect_uri", String;
    State => "state", String;
    CodeChallenge => "code_challenge", String;
    CodeChallengeMethod => "code_challenge_method", String;
    ResponseType => "response_type", String;

    /// Proof-of-possession binding (RFC 7800)
    Confirmation => "cnf", Json;
    /// Compact serialization of a token carried inside a JWE
    NestedJwt => "njwt", String;

    // Health-sector identity claims
    GivenName => "given_name", String;
    FamilyName => "family_name", String;
    OrganizationName => "organizationName", String;
    ProfessionOid => "professionOID", String;
    IdNumber => "idNummer", String;
    ServerNonce => "snc", String;
    ChallengeToken => "challenge_token", String;
    AuthCertificate => "auth_certificate", String;
    TokenType => "token_type", String;
    KeyVerifier => "key_verifier", String;
    TokenKey => "token_key", String;
}

impl fmt::Display for ClaimName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.jose_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_registry_is_a_bijection() {
        let mut seen = HashSet::new();
        for claim in ClaimName::ALL {
            assert!(seen.insert(claim.jose_name()), "duplicate wire name {}", claim);
            assert_eq!(ClaimName::from_jose_name(claim.jose_name()), Some(*claim));
        }
        assert_eq!(seen.len(), ClaimName::ALL.len());
    }

    #[test]
    fn test_engine_claims_are_registered() {
        for wire in ["exp", "cnf", "njwt", "cty", "enc", "kid", "alg", "x5c", "typ"] {
            assert!(ClaimName::from_jose_name(wire).is_some(), "{wire} missing");
        }
    }

    #[test]
    fn test_unknown_wire_name() {
        assert_eq!(ClaimName::from_jose_name("EXP"), None);
        assert_eq!(ClaimName::from_jose_name("custom_claim"), None);
    }

    #[test]
    fn test_kinds_and_display() {
        assert_eq!(ClaimName::ExpiresAt.kind(), ClaimKind::Timestamp);
        assert_eq!(ClaimName::EphemeralPublicKey.kind(), ClaimKind::Map);
        assert_eq!(ClaimName::NestedJwt.to_string(), "njwt");
        assert_eq!(ClaimName::ProfessionOid.to_string(), "professionOID");
    }
}
