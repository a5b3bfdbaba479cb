//! JWT signing
//!
//! [`JwtProcessor`] owns a [`SigningIdentity`] and turns a [`JwtBuilder`]'s
//! claim set into a signed compact JWS. The processor is immutable after
//! construction and can be shared across threads for concurrent signing.

use serde_json::Value;

use crate::Result;
use crate::builder::JwtBuilder;
use crate::claims::{ClaimMap, ClaimName};
use crate::config::ProcessorConfig;
use crate::helpers::encode_json_segment;
use crate::keys::SigningIdentity;
use crate::provider::install_crypto_provider;
use crate::signing;
use crate::token::JsonWebToken;

/// Signs claim sets with one identity
#[derive(Debug, Clone)]
pub struct JwtProcessor {
    identity: SigningIdentity,
    config: ProcessorConfig,
}

impl JwtProcessor {
    #[must_use]
    pub fn new(identity: SigningIdentity) -> Self {
        Self::with_config(identity, ProcessorConfig::default())
    }

    #[must_use]
    pub fn with_config(identity: SigningIdentity, config: ProcessorConfig) -> Self {
        install_crypto_provider();
        Self { identity, config }
    }

    pub fn identity(&self) -> &SigningIdentity {
        &self.identity
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Sign the builder's claims
    ///
    /// `alg` is always set from the identity's curve (`ES256` for P-256,
    /// `BP256R1` for brainpoolP256r1), overriding any caller value. `typ`,
    /// `x5c` and `kid` are added from the identity and config unless the
    /// caller supplied them.
    ///
    /// # Errors
    ///
    /// - [`JoseError::SerializationFailed`](crate::JoseError::SerializationFailed)
    ///   when a claim map cannot be encoded
    /// - [`JoseError::SigningFailed`](crate::JoseError::SigningFailed) when the
    ///   signature operation fails
    pub fn build_jwt(&self, builder: JwtBuilder) -> Result<JsonWebToken> {
        let algorithm = self.identity.algorithm();
        let (caller_header, body) = builder.into_claims();
        let header = self.merge_header(algorithm.as_str(), caller_header);

        let signing_input = format!(
            "{}.{}",
            encode_json_segment("JWT header serialization failed", &header)?,
            encode_json_segment("JWT body serialization failed", &body)?
        );

        let signature = signing::sign(self.identity.signing_key(), &signing_input)?;

        tracing::debug!(
            alg = %algorithm,
            kid = ?header.get(ClaimName::KeyId.jose_name()),
            claims = body.len(),
            "Signed JWT"
        );

        Ok(JsonWebToken::new(format!("{}.{}", signing_input, signature)))
    }

    /// Verify a token against this processor's own public key
    ///
    /// # Errors
    ///
    /// See [`JsonWebToken::verify`].
    pub fn verify(&self, token: &JsonWebToken) -> Result<()> {
        token.verify(self.identity.verification_key())
    }

    fn merge_header(&self, algorithm: &str, caller: ClaimMap) -> ClaimMap {
        let alg = ClaimName::Algorithm.jose_name();

        let mut header = ClaimMap::new();
        header.insert(alg.to_string(), Value::from(algorithm));
        header.extend(caller.into_iter().filter(|(name, _)| name != alg));

        header
            .entry(ClaimName::Type.jose_name())
            .or_insert_with(|| Value::from(self.config.token_type.clone()));

        if self.config.include_certificate_chain && !self.identity.certificate_chain().is_empty() {
            header
                .entry(ClaimName::X509CertificateChain.jose_name())
                .or_insert_with(|| Value::from(self.identity.x5c()));
        }

        if self.config.include_key_id {
            if let Some(kid) = self.identity.key_id() {
                header
                    .entry(ClaimName::KeyId.jose_name())
                    .or_insert_with(|| Value::from(kid));
            }
        }

        header
    }
}
