// # Memory Secret Store
//
// In-memory implementation of SecretStore.
//
// ## When to Use
//
// - Testing environments
// - Embedding the engine with credentials supplied programmatically

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::Error;
use crate::traits::secret_store::{SecretData, SecretStore};

/// In-memory secret store keyed by `(namespace, name)`
///
/// # Example
///
/// ```rust,no_run
/// use dns01_core::secrets::MemorySecretStore;
/// use dns01_core::traits::SecretStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemorySecretStore::new();
///     store
///         .insert("cert-manager", "alidns", [("access-key", "AKID"), ("secret-key", "s3cr3t")])
///         .await;
///
///     let data = store.get_secret("cert-manager", "alidns").await?;
///     assert_eq!(data["access-key"], b"AKID".to_vec());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySecretStore {
    inner: Arc<RwLock<HashMap<(String, String), SecretData>>>,
}

impl MemorySecretStore {
    /// Create a new empty memory secret store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a secret
    pub async fn insert<I, K, V>(&self, namespace: &str, name: &str, data: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<[u8]>,
    {
        let data: SecretData = data
            .into_iter()
            .map(|(k, v)| (k.into(), v.as_ref().to_vec()))
            .collect();

        let mut guard = self.inner.write().await;
        guard.insert((namespace.to_string(), name.to_string()), data);
    }

    /// Remove a secret, returning whether it existed
    pub async fn remove(&self, namespace: &str, name: &str) -> bool {
        let mut guard = self.inner.write().await;
        guard
            .remove(&(namespace.to_string(), name.to_string()))
            .is_some()
    }

    /// Get the number of secrets in the store
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Check if the store is empty
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<SecretData, Error> {
        let guard = self.inner.read().await;
        guard
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| Error::secret(namespace, name, "secret not found"))
    }

    fn store_name(&self) -> &'static str {
        "memory"
    }
}
