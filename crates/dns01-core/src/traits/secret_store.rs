// # Secret Store Trait
//
// Resolves a secret reference from the solver configuration into raw
// key/value data. Backends live in this crate (`secrets` module) and in
// `dns01-secret-kube`.

use async_trait::async_trait;
use std::collections::BTreeMap;

/// Key/value content of one secret
pub type SecretData = BTreeMap<String, Vec<u8>>;

/// Trait for secret lookup backends
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetch the secret `name` in `namespace`
    ///
    /// # Returns
    ///
    /// - `Ok(SecretData)`: the secret's data, possibly empty
    /// - `Err(Error)`: if the secret is missing or the backend failed
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<SecretData, crate::Error>;

    /// Backend name (for logging/debugging)
    fn store_name(&self) -> &'static str;
}

/// First value present under any of `keys`, decoded as UTF-8
///
/// Non-UTF-8 bytes are replaced rather than rejected.
pub fn first_value(data: &SecretData, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| data.get(*key))
        .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
}
