//! Helper functions for jsonwebtoken and p256 integration
//!
//! Conversions between p256 keys, jsonwebtoken key types and the JSON forms
//! carried in JOSE headers, plus the base64url/JSON codec for compact segments.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::jwk::{AlgorithmParameters, CommonParameters, Jwk};
use jsonwebtoken::jwk::{EllipticCurve, EllipticCurveKeyParameters, EllipticCurveKeyType};
use jsonwebtoken::{DecodingKey, EncodingKey};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::pkcs8::EncodePrivateKey;
use p256::{PublicKey, SecretKey};
use serde::Serialize;
use serde_json::Value;

use crate::Result;
use crate::claims::ClaimMap;
use crate::errors::JoseError;

/// Base64url-encode without padding, as every compact segment is
pub fn b64_encode(bytes: impl AsRef<[u8]>) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode one base64url segment, naming the segment on failure
pub fn b64_decode(segment: &'static str, input: &str) -> Result<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(input)
        .map_err(|e| JoseError::InvalidEncoding {
            segment,
            reason: e.to_string(),
        })
}

/// Decode a base64url segment that holds a JSON object
pub(crate) fn decode_json_segment(segment: &'static str, input: &str) -> Result<ClaimMap> {
    let bytes = b64_decode(segment, input)?;
    serde_json::from_slice(&bytes).map_err(|e| JoseError::InvalidEncoding {
        segment,
        reason: e.to_string(),
    })
}

/// Serialize claims and base64url-encode the resulting JSON
pub(crate) fn encode_json_segment(context: &str, claims: &ClaimMap) -> Result<String> {
    let json = serde_json::to_vec(claims).map_err(|e| JoseError::serialization(context, e))?;
    Ok(b64_encode(json))
}

/// Convert any serializable value into a claim value
///
/// # Errors
///
/// Returns [`JoseError::SerializationFailed`] with `context` as message when the
/// value's `Serialize` impl fails; the encoder error is kept as the source.
pub fn to_claim_value<T: Serialize + ?Sized>(value: &T, context: &str) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| JoseError::serialization(context, e))
}

/// Convert a P-256 secret key to a jsonwebtoken EncodingKey
///
/// jsonwebtoken expects EC signing keys in PKCS#8 DER form.
pub fn secret_key_to_encoding_key(key: &SecretKey) -> Result<EncodingKey> {
    let pkcs8_der = key.to_pkcs8_der().map_err(|e| JoseError::InvalidKey {
        reason: format!("Failed to convert EC key to PKCS#8: {}", e),
    })?;
    Ok(EncodingKey::from_ec_der(pkcs8_der.as_bytes()))
}

/// Convert a P-256 public key to a jsonwebtoken DecodingKey (SEC1 uncompressed point)
pub fn public_key_to_decoding_key(key: &PublicKey) -> DecodingKey {
    DecodingKey::from_ec_der(key.to_encoded_point(false).as_bytes())
}

/// Convert a P-256 public key to an RFC 7517 JWK
pub fn public_key_to_jwk(key: &PublicKey) -> Result<Jwk> {
    let point = key.to_encoded_point(false);
    let (Some(x), Some(y)) = (point.x(), point.y()) else {
        return Err(JoseError::InvalidKey {
            reason: "EC public key is the identity point".to_string(),
        });
    };

    Ok(Jwk {
        common: CommonParameters::default(),
        algorithm: AlgorithmParameters::EllipticCurve(EllipticCurveKeyParameters {
            key_type: EllipticCurveKeyType::EC,
            curve: EllipticCurve::P256,
            x: b64_encode(x),
            y: b64_encode(y),
        }),
    })
}

/// Rebuild a P-256 public key from its JWK form
pub fn jwk_to_public_key(jwk: &Jwk) -> Result<PublicKey> {
    let AlgorithmParameters::EllipticCurve(params) = &jwk.algorithm else {
        return Err(JoseError::InvalidKey {
            reason: "JWK is not an EC key".to_string(),
        });
    };
    if params.curve != EllipticCurve::P256 {
        return Err(JoseError::InvalidKey {
            reason: format!("Unsupported JWK curve: {:?}", params.curve),
        });
    }

    let x = b64_decode("jwk x", &params.x)?;
    let y = b64_decode("jwk y", &params.y)?;
    if x.len() != 32 || y.len() != 32 {
        return Err(JoseError::InvalidKey {
            reason: format!("Invalid EC key coordinates: x={}, y={}", x.len(), y.len()),
        });
    }

    let mut sec1 = Vec::with_capacity(65);
    sec1.push(0x04);
    sec1.extend_from_slice(&x);
    sec1.extend_from_slice(&y);
    PublicKey::from_sec1_bytes(&sec1).map_err(|e| JoseError::InvalidKey {
        reason: format!("JWK point is not on P-256: {}", e),
    })
}
