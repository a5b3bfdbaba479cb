//! JSON reading and writing with a configurable unknown-field policy
//!
//! Models in this crate accept unknown properties by default. Callers that
//! need the stricter behavior pick [`DeserializationPolicy::strict`], which
//! rejects the first unknown property with its full path.

use idp_token::ProcessorConfig;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::error::Category;

use crate::error::{DataError, DataResult};

/// How unknown JSON properties are treated on read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeserializationPolicy {
    pub fail_on_unknown_fields: bool,
}

impl DeserializationPolicy {
    #[must_use]
    pub const fn lenient() -> Self {
        Self {
            fail_on_unknown_fields: false,
        }
    }

    #[must_use]
    pub const fn strict() -> Self {
        Self {
            fail_on_unknown_fields: true,
        }
    }
}

impl From<&ProcessorConfig> for DeserializationPolicy {
    fn from(config: &ProcessorConfig) -> Self {
        Self {
            fail_on_unknown_fields: config.fail_on_unknown_fields,
        }
    }
}

/// Deserialize `json` into `T` under `policy`
///
/// # Errors
///
/// - [`DataError::Serialization`] when the input is not well-formed JSON
/// - [`DataError::ValidationFailed`] when well-formed JSON does not fit `T`,
///   e.g. an unrecognized enum value; `field` holds the input position
/// - [`DataError::UnknownField`] in strict mode when a property is not declared by `T`
pub fn from_json_str<T: DeserializeOwned>(
    json: &str,
    policy: DeserializationPolicy,
) -> DataResult<T> {
    let mut unknown = Vec::new();
    let mut deserializer = serde_json::Deserializer::from_str(json);

    let value: T = serde_ignored::deserialize(&mut deserializer, |path| {
        unknown.push(path.to_string());
    })
    .map_err(read_error)?;
    deserializer.end().map_err(read_error)?;

    if let Some(path) = unknown.into_iter().next() {
        if policy.fail_on_unknown_fields {
            return Err(DataError::UnknownField { path });
        }
        tracing::trace!(path = %path, "Ignoring unknown JSON property");
    }

    Ok(value)
}

fn read_error(error: serde_json::Error) -> DataError {
    match error.classify() {
        Category::Data => DataError::validation(
            format!("line {} column {}", error.line(), error.column()),
            error.to_string(),
        ),
        _ => DataError::serialization("JSON deserialization failed", error),
    }
}

/// Serialize `value`, reporting failures under `context`
///
/// # Errors
///
/// [`DataError::Serialization`] when the encoder rejects the value.
pub fn to_json_string<T: Serialize + ?Sized>(value: &T, context: &str) -> DataResult<String> {
    serde_json::to_string(value).map_err(|e| DataError::serialization(context, e))
}
