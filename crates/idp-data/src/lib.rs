//! # IdP Data - wire models
//!
//! JSON documents exchanged by the identity provider, built on the token
//! types from `idp-token`.
//!
//! ## Architecture
//!
//! - `authentication` - Authentication challenge and user consent
//! - `error_response` - OAuth2 error codes and error bodies
//! - `registration` - Device registration payload
//! - `discovery` - Discovery document and its signing
//! - `json` - Deserialization policy for unknown properties
//!
//! ## Example
//!
//! ```rust
//! use idp_data::{DeserializationPolicy, Oauth2ErrorCode, Oauth2ErrorResponse, from_json_str};
//!
//! # fn main() -> idp_data::DataResult<()> {
//! let response: Oauth2ErrorResponse =
//!     from_json_str(r#"{"error":"invalid_grant"}"#, DeserializationPolicy::strict())?;
//! assert_eq!(response.error, Oauth2ErrorCode::InvalidGrant);
//! # Ok(())
//! # }
//! ```

pub mod authentication;
pub mod discovery;
pub mod error;
pub mod error_response;
pub mod json;
pub mod registration;

pub use authentication::{AuthenticationChallenge, UserConsent};
pub use discovery::{DiscoveryDocument, sign_discovery_document};
pub use error::{DataError, DataResult};
pub use error_response::{IdpErrorResponse, Oauth2ErrorCode, Oauth2ErrorResponse};
pub use json::{DeserializationPolicy, from_json_str, to_json_string};
pub use registration::{DataVersion, DeviceInformation, DeviceType, RegistrationData};
