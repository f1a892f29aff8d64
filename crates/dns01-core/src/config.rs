//! Configuration types for the DNS-01 solver
//!
//! [`SolverConfig`] is decoded from each challenge's opaque payload and is
//! never persisted. [`EngineConfig`] is built once at startup.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-request solver configuration
///
/// Decoded from the `config` field of a challenge request:
///
/// ```json
/// {
///   "email": "ops@example.com",
///   "apiKeySecretRef": {"name": "alidns-credentials"},
///   "accessKeyID": "",
///   "accessKeySecret": "",
///   "regionID": "cn-hangzhou"
/// }
/// ```
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Contact address, not used by the solver
    #[serde(default)]
    pub email: String,

    /// Reference to a secret holding the access keys
    #[serde(rename = "apiKeySecretRef", default)]
    pub api_key_secret_ref: SecretKeySelector,

    /// Inline access key ID
    #[serde(rename = "accessKeyID", default)]
    pub access_key_id: String,

    /// Inline access key secret
    /// ⚠️ NEVER log this value
    #[serde(rename = "accessKeySecret", default)]
    pub access_key_secret: String,

    /// Provider region
    #[serde(rename = "regionID", default)]
    pub region_id: String,
}

// Custom Debug implementation that hides the access key secret
impl fmt::Debug for SolverConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolverConfig")
            .field("email", &self.email)
            .field("api_key_secret_ref", &self.api_key_secret_ref)
            .field("access_key_id", &self.access_key_id)
            .field("access_key_secret", &"<REDACTED>")
            .field("region_id", &self.region_id)
            .finish()
    }
}

impl SolverConfig {
    /// Access keys carried by this configuration
    pub fn credentials(&self) -> Credentials {
        Credentials {
            access_key_id: self.access_key_id.clone(),
            access_key_secret: self.access_key_secret.clone(),
        }
    }

    /// Check that both access key fields are set
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.access_key_id.is_empty() || self.access_key_secret.is_empty() {
            return Err(crate::Error::config("accessKeySecret or accessKeyID is empty"));
        }
        Ok(())
    }
}

/// Selects a secret by name, optionally a single key inside it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretKeySelector {
    /// Secret name; empty means "no reference"
    #[serde(default)]
    pub name: String,

    /// Key inside the secret, informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl SecretKeySelector {
    /// Whether a secret is referenced at all
    pub fn is_set(&self) -> bool {
        !self.name.is_empty()
    }
}

/// Provider access keys
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Access key ID
    pub access_key_id: String,
    /// Access key secret
    pub access_key_secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("access_key_secret", &"<REDACTED>")
            .finish()
    }
}

/// Reconcile engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Records requested per list page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Maximum number of non-empty pages fetched before giving up
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
}

impl EngineConfig {
    /// Validate the engine configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.page_size == 0 || self.page_size > 500 {
            return Err(crate::Error::config("page_size must be between 1 and 500"));
        }
        if self.max_pages == 0 {
            return Err(crate::Error::config("max_pages must be > 0"));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            max_pages: default_max_pages(),
        }
    }
}

fn default_page_size() -> u32 {
    100
}

fn default_max_pages() -> u32 {
    100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_full_payload() {
        let json = r#"{
            "email": "ops@example.com",
            "apiKeySecretRef": {"name": "alidns-credentials", "key": "access-key"},
            "accessKeyID": "AKID",
            "accessKeySecret": "s3cr3t",
            "regionID": "cn-hangzhou"
        }"#;

        let config: SolverConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.email, "ops@example.com");
        assert!(config.api_key_secret_ref.is_set());
        assert_eq!(config.api_key_secret_ref.key.as_deref(), Some("access-key"));
        assert_eq!(config.access_key_id, "AKID");
        assert_eq!(config.region_id, "cn-hangzhou");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_decode_empty_payload() {
        let config: SolverConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, SolverConfig::default());
        assert!(!config.api_key_secret_ref.is_set());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_secret_not_exposed_in_debug() {
        let config = SolverConfig {
            access_key_id: "AKID".to_string(),
            access_key_secret: "super_secret_value".to_string(),
            ..Default::default()
        };

        let debug_str = format!("{:?}", config);
        assert!(!debug_str.contains("super_secret_value"));
        assert!(debug_str.contains("AKID"));

        let creds_debug = format!("{:?}", config.credentials());
        assert!(!creds_debug.contains("super_secret_value"));
    }

    #[test]
    fn test_engine_config_defaults() {
        let config: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.page_size, 100);
        assert_eq!(config.max_pages, 100);
        assert!(config.validate().is_ok());

        let invalid = EngineConfig {
            page_size: 100,
            max_pages: 0,
        };
        assert!(invalid.validate().is_err());
    }
}
