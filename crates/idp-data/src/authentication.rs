//! Authentication challenge sent to the authenticator
//!
//! The challenge is a signed JWT; the consent lists the scopes and claims the
//! user is asked to release.

use std::collections::HashMap;

use idp_token::{JsonWebToken, VerificationKey};
use serde::{Deserialize, Serialize};

use crate::error::{DataError, DataResult};

/// Scopes and claims presented to the user for consent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConsent {
    /// Scope name to its description
    pub requested_scopes: Option<HashMap<String, String>>,
    /// Claim name to its description
    pub requested_claims: Option<HashMap<String, String>>,
}

impl UserConsent {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_requested_scopes<K, V>(mut self, scopes: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.requested_scopes = Some(collect_entries(scopes));
        self
    }

    #[must_use]
    pub fn with_requested_claims<K, V>(mut self, claims: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.requested_claims = Some(collect_entries(claims));
        self
    }
}

fn collect_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> HashMap<String, String>
where
    K: Into<String>,
    V: Into<String>,
{
    entries
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Challenge response body of the authorization endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthenticationChallenge {
    pub challenge: Option<JsonWebToken>,
    pub user_consent: Option<UserConsent>,
}

impl AuthenticationChallenge {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_challenge(mut self, challenge: impl Into<JsonWebToken>) -> Self {
        self.challenge = Some(challenge.into());
        self
    }

    #[must_use]
    pub fn with_user_consent(mut self, consent: UserConsent) -> Self {
        self.user_consent = Some(consent);
        self
    }

    /// Verify the challenge token's signature against the IdP key
    ///
    /// Accepts a P-256 or brainpoolP256r1 public key.
    ///
    /// # Errors
    ///
    /// - [`DataError::ValidationFailed`] when no challenge is present
    /// - [`DataError::Token`] when the signature check fails
    pub fn verify_challenge(&self, key: impl Into<VerificationKey>) -> DataResult<()> {
        let challenge = self
            .challenge
            .as_ref()
            .ok_or_else(|| DataError::validation("challenge", "no challenge token present"))?;
        challenge.verify(key)?;
        Ok(())
    }
}
