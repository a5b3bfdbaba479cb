//! # IdP Token - JOSE processing core
//!
//! Builds, signs, encrypts, decrypts and reads the JOSE structures used by a
//! health-sector OAuth2/OpenID Connect identity provider: authentication
//! challenges, proof-of-possession tokens, nested JWT confirmation claims and
//! signed discovery documents.
//!
//! ## Data flow
//!
//! ```text
//! JwtBuilder -> JwtProcessor (sign) -> JsonWebToken (JWS)
//!     -> encrypt -> JsonWebToken (JWE, cty NJWT)
//!     -> decrypt_nested_jwt -> JsonWebToken (JWS) -> claims
//! ```
//!
//! ## Architecture
//!
//! - `claims` - Claim registry mapping claim names to JOSE wire names
//! - `jose` - Compact serialization with lazy, memoized header/body decoding
//! - `token` - `JsonWebToken`: typed claim access, verification, nested encryption
//! - `jwe` - `dir` and `ECDH-ES` key management with `A256GCM` content encryption
//! - `builder` - Claim accumulation
//! - `processor` - Signing with an elliptic-curve identity
//! - `signing` - `ES256` via jsonwebtoken, `BP256R1` via RustCrypto `ecdsa`
//! - `keys` - Symmetric keys, encryption/decryption keys, signing identities
//! - `types` - Algorithm identifiers
//! - `config` - Processor defaults
//! - `provider` - One-time crypto provider registration
//!
//! ## Feature Flags
//!
//! - `test-utils` - Key and processor generators for tests
//!
//! ## Example
//!
//! ```rust
//! use idp_token::{ClaimName, JwtBuilder, JwtProcessor, SigningIdentity, SymmetricKey};
//! use p256::SecretKey;
//! use rand::rngs::OsRng;
//!
//! # fn main() -> idp_token::Result<()> {
//! let processor = JwtProcessor::new(SigningIdentity::new(SecretKey::random(&mut OsRng)));
//! let token = processor.build_jwt(
//!     JwtBuilder::new().add_body_claim(ClaimName::Confirmation, "foobarschmar"),
//! )?;
//!
//! let key = SymmetricKey::generate();
//! let encrypted = token.encrypt(&key)?;
//! let decrypted = encrypted.decrypt_nested_jwt(&key)?;
//! assert_eq!(
//!     decrypted.get_body_claim(ClaimName::Confirmation)?,
//!     Some(&serde_json::json!("foobarschmar"))
//! );
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod claims;
pub mod config;
pub mod errors;
pub mod helpers;
pub mod jose;
pub mod jwe;
pub mod keys;
pub mod processor;
pub mod provider;
mod signing;
pub mod token;
pub mod types;

#[cfg(feature = "test-utils")]
pub mod test_utils;

// Re-export core types for convenience
pub use builder::JwtBuilder;
pub use claims::{ClaimKind, ClaimMap, ClaimName, ClaimSource};
pub use config::ProcessorConfig;
pub use errors::JoseError;
pub use jose::{JoseClaims, JoseObject};
pub use keys::{
    DecryptionKey, EncryptionKey, SigningIdentity, SigningKey, SymmetricKey, VerificationKey,
};
pub use processor::JwtProcessor;
pub use provider::install_crypto_provider;
pub use token::JsonWebToken;
pub use types::{ContentEncryptionAlgorithm, EcCurve, KeyManagementAlgorithm, SigningAlgorithm};

/// Token processing result type
pub type Result<T> = std::result::Result<T, JoseError>;

/// `cty` value marking a JWT nested inside a JWE
pub const NESTED_JWT_CONTENT_TYPE: &str = "NJWT";

/// `typ` value written when the caller supplies none
pub const DEFAULT_TOKEN_TYPE: &str = "JWT";
