//! Device registration payload for alternative authentication

use serde::{Deserialize, Serialize};

use crate::error::{DataError, DataResult};
use crate::json::to_json_string;

/// Context reported when a claim document cannot be encoded
pub const CLAIM_SERIALIZATION_CONTEXT: &str = "Error during Claim serialization";

/// Documents that carry a format version
pub trait DataVersion {
    fn data_version(&self) -> &str;
}

/// Hardware and software description of a registered device
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceType {
    pub product_version: String,
    pub manufacturer: String,
    pub product: String,
    pub model: String,
    pub os: String,
    pub os_version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceInformation {
    /// User-chosen device name
    pub name: String,
    pub device_type: DeviceType,
}

/// Pairing data submitted when a device is registered
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrationData {
    /// Compact JWS over the pairing data
    pub signed_pairing_data: String,
    /// Base64 DER authentication certificate
    pub auth_cert: String,
    pub device_information: DeviceInformation,
    pub registration_data_version: String,
}

impl RegistrationData {
    /// # Errors
    ///
    /// [`DataError::Serialization`] with [`CLAIM_SERIALIZATION_CONTEXT`].
    pub fn to_json_string(&self) -> DataResult<String> {
        to_json_string(self, CLAIM_SERIALIZATION_CONTEXT)
    }

    /// # Errors
    ///
    /// [`DataError::ValidationFailed`] when the version is empty.
    pub fn validate(&self) -> DataResult<()> {
        if self.registration_data_version.is_empty() {
            return Err(DataError::validation(
                "registration_data_version",
                "must not be empty",
            ));
        }
        Ok(())
    }
}

impl DataVersion for RegistrationData {
    fn data_version(&self) -> &str {
        &self.registration_data_version
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json::{DeserializationPolicy, from_json_str};
    use pretty_assertions::assert_eq;
    use serde::Serializer;
    use std::error::Error as _;

    fn registration() -> RegistrationData {
        RegistrationData {
            signed_pairing_data: "pairing".to_string(),
            auth_cert: "cert".to_string(),
            device_information: DeviceInformation {
                name: "Pixel".to_string(),
                device_type: DeviceType {
                    product_version: "1.0".to_string(),
                    manufacturer: "Google".to_string(),
                    product: "sailfish".to_string(),
                    model: "Pixel".to_string(),
                    os: "Android".to_string(),
                    os_version: "14".to_string(),
                },
            },
            registration_data_version: "1".to_string(),
        }
    }

    #[test]
    fn test_writes_snake_case_names() {
        let json = registration().to_json_string().unwrap();

        for name in [
            "signed_pairing_data",
            "auth_cert",
            "device_information",
            "registration_data_version",
            "device_type",
            "product_version",
            "os_version",
        ] {
            assert!(json.contains(&format!("\"{name}\"")), "missing {name}");
        }
    }

    #[test]
    fn test_round_trip() {
        let original = registration();
        let parsed: RegistrationData = from_json_str(
            &original.to_json_string().unwrap(),
            DeserializationPolicy::strict(),
        )
        .unwrap();
        assert_eq!(parsed, original);
        assert_eq!(parsed.data_version(), "1");
    }

    #[test]
    fn test_empty_version_fails_validation() {
        let mut data = registration();
        data.validate().unwrap();

        data.registration_data_version.clear();
        let error = data.validate().unwrap_err();
        assert!(matches!(error, DataError::ValidationFailed { ref field, .. }
            if field == "registration_data_version"));
    }

    #[test]
    fn test_encoder_failure_keeps_cause() {
        struct Forced;

        impl Serialize for Forced {
            fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
                Err(serde::ser::Error::custom("forced"))
            }
        }

        let error = to_json_string(&Forced, CLAIM_SERIALIZATION_CONTEXT).unwrap_err();
        assert_eq!(error.to_string(), "Error during Claim serialization");
        assert!(error.source().unwrap().to_string().contains("forced"));
    }
}
