//! Per-request configuration resolution
//!
//! Decodes the challenge's opaque config payload and, when it references a
//! secret, overlays the access keys found in that secret.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::challenge::ChallengeRequest;
use crate::config::SolverConfig;
use crate::error::{Error, Result};
use crate::traits::SecretStore;
use crate::traits::secret_store::first_value;

/// Secret keys probed for the access key ID, first present wins
pub const ACCESS_KEY_ID_KEYS: [&str; 2] = ["access-key", "accessKeyID"];

/// Secret keys probed for the access key secret, first present wins
pub const ACCESS_KEY_SECRET_KEYS: [&str; 2] = ["secret-key", "accessKeySecret"];

/// Resolves [`SolverConfig`] for one challenge
#[derive(Clone, Default)]
pub struct ConfigResolver {
    secrets: Option<Arc<dyn SecretStore>>,
}

impl ConfigResolver {
    /// Resolver backed by `secrets`
    pub fn new(secrets: Arc<dyn SecretStore>) -> Self {
        Self {
            secrets: Some(secrets),
        }
    }

    /// Resolver without a secret store; secret references become errors
    pub fn without_secrets() -> Self {
        Self::default()
    }

    /// Decode and complete the configuration of `request`
    ///
    /// An absent payload yields the zero-value config. Empty credentials are
    /// not an error here.
    pub async fn load_config(&self, request: &ChallengeRequest) -> Result<SolverConfig> {
        let raw = match &request.config {
            None | Some(serde_json::Value::Null) => return Ok(SolverConfig::default()),
            Some(raw) => raw,
        };

        let mut config: SolverConfig = serde_json::from_value(raw.clone())
            .map_err(|e| Error::config(format!("error decoding solver config: {}", e)))?;

        if !config.api_key_secret_ref.is_set() {
            return Ok(config);
        }

        let namespace = request.resource_namespace.as_str();
        let name = config.api_key_secret_ref.name.clone();

        let store = self.secrets.as_ref().ok_or_else(|| {
            Error::config(format!(
                "secret {}/{} referenced but no secret store is configured",
                namespace, name
            ))
        })?;

        info!(
            "Loading config from secret {}/{} ({})",
            namespace,
            name,
            store.store_name()
        );

        let data = store.get_secret(namespace, &name).await.map_err(|e| {
            warn!("Failed to load secret {}/{}: {}", namespace, name, e);
            match e {
                err @ Error::Secret { .. } => err,
                other => Error::secret(namespace, name.as_str(), other.to_string()),
            }
        })?;

        if let Some(id) = first_value(&data, &ACCESS_KEY_ID_KEYS) {
            config.access_key_id = id;
        }
        if let Some(secret) = first_value(&data, &ACCESS_KEY_SECRET_KEYS) {
            config.access_key_secret = secret;
        }

        debug!("Resolved config from secret {}/{}: {:?}", namespace, name, config);
        Ok(config)
    }
}

impl std::fmt::Debug for ConfigResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigResolver")
            .field(
                "secrets",
                &self.secrets.as_ref().map(|store| store.store_name()),
            )
            .finish()
    }
}
