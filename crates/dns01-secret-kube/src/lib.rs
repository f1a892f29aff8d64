// # Kubernetes Secret Store
//
// SecretStore backed by core/v1 Secrets, read through the Kubernetes API.
//
// ## Behaviour
//
// - One GET per lookup, nothing cached (rotated keys apply to the next challenge)
// - Lookups are scoped to the namespace the challenge came from
// - `data` values are returned as raw bytes; `stringData` is write-only in
//   the API and never appears on reads
//
// ## RBAC
//
// The service account needs `get` on `secrets` in every namespace that
// issues challenges.

use async_trait::async_trait;
use dns01_core::traits::{SecretData, SecretStore};
use dns01_core::{Error, Result};
use k8s_openapi::api::core::v1::Secret;
use kube::{Api, Client};

/// Secret store reading core/v1 Secrets
#[derive(Clone)]
pub struct KubeSecretStore {
    client: Client,
}

impl std::fmt::Debug for KubeSecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeSecretStore").finish_non_exhaustive()
    }
}

impl KubeSecretStore {
    /// Wrap an existing client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Connect using the in-cluster service account or the local kubeconfig
    pub async fn try_default() -> Result<Self> {
        let client = Client::try_default()
            .await
            .map_err(|e| Error::config(format!("Failed to create Kubernetes client: {}", e)))?;
        Ok(Self::new(client))
    }
}

/// Flatten a Secret's `data` into [`SecretData`]
fn secret_data(secret: Secret) -> SecretData {
    secret
        .data
        .unwrap_or_default()
        .into_iter()
        .map(|(key, value)| (key, value.0))
        .collect()
}

fn describe_error(err: &kube::Error) -> String {
    match err {
        kube::Error::Api(resp) if resp.code == 404 => "secret not found".to_string(),
        kube::Error::Api(resp) => format!("{} ({})", resp.message, resp.reason),
        other => other.to_string(),
    }
}

#[async_trait]
impl SecretStore for KubeSecretStore {
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<SecretData> {
        let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);

        let secret = api.get(name).await.map_err(|e| {
            tracing::debug!("Secret lookup {}/{} failed: {}", namespace, name, e);
            Error::secret(namespace, name, describe_error(&e))
        })?;

        Ok(secret_data(secret))
    }

    fn store_name(&self) -> &'static str {
        "kubernetes"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::ByteString;
    use std::collections::BTreeMap;

    #[test]
    fn test_secret_data_keeps_raw_bytes() {
        let mut data = BTreeMap::new();
        data.insert("access-key".to_string(), ByteString(b"AKID".to_vec()));
        data.insert("secret-key".to_string(), ByteString(vec![0xff, 0x00]));

        let secret = Secret {
            data: Some(data),
            ..Default::default()
        };

        let out = secret_data(secret);
        assert_eq!(out.len(), 2);
        assert_eq!(out["access-key"], b"AKID".to_vec());
        assert_eq!(out["secret-key"], vec![0xff, 0x00]);
    }

    #[test]
    fn test_secret_without_data_is_empty() {
        assert!(secret_data(Secret::default()).is_empty());
    }

    #[test]
    fn test_not_found_message() {
        let err = kube::Error::Api(kube::error::ErrorResponse {
            status: "Failure".to_string(),
            message: "secrets \"alidns\" not found".to_string(),
            reason: "NotFound".to_string(),
            code: 404,
        });
        assert_eq!(describe_error(&err), "secret not found");

        let err = kube::Error::Api(kube::error::ErrorResponse {
            status: "Failure".to_string(),
            message: "secrets is forbidden".to_string(),
            reason: "Forbidden".to_string(),
            code: 403,
        });
        assert_eq!(describe_error(&err), "secrets is forbidden (Forbidden)");
    }
}
