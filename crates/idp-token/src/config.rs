//! Processor configuration

use serde::{Deserialize, Serialize};

use crate::DEFAULT_TOKEN_TYPE;

/// Defaults a [`JwtProcessor`](crate::JwtProcessor) merges into every token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProcessorConfig {
    /// `typ` header written when the caller supplies none
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Emit the identity's certificate chain as `x5c`
    #[serde(default = "default_true")]
    pub include_certificate_chain: bool,
    /// Emit the identity's key id as `kid`
    #[serde(default = "default_true")]
    pub include_key_id: bool,
    /// Reject unknown fields when deserializing data models
    #[serde(default)]
    pub fail_on_unknown_fields: bool,
}

fn default_token_type() -> String {
    DEFAULT_TOKEN_TYPE.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            token_type: default_token_type(),
            include_certificate_chain: true,
            include_key_id: true,
            fail_on_unknown_fields: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: ProcessorConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ProcessorConfig::default());
        assert_eq!(config.token_type, "JWT");
    }

    #[test]
    fn test_partial_override() {
        let config: ProcessorConfig =
            serde_json::from_str(r#"{"token_type":"at+jwt","include_certificate_chain":false}"#)
                .unwrap();
        assert_eq!(config.token_type, "at+jwt");
        assert!(!config.include_certificate_chain);
        assert!(config.include_key_id);
    }
}
