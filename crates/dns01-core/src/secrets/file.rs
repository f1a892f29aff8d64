// # File Secret Store
//
// Directory-backed implementation of SecretStore.
//
// ## Layout
//
// Secrets are read from a directory tree shaped like mounted secret volumes,
// one file per key:
//
// ```text
// <root>/
//   cert-manager/            <- namespace
//     alidns-credentials/    <- secret name
//       access-key           <- key, file content is the value
//       secret-key
// ```
//
// Hidden entries (names starting with `.`) are skipped, which ignores the
// `..data` symlinks that volume mounts create.
//
// Nothing is cached: every lookup re-reads the directory, so rotated
// credentials are picked up by the next challenge.

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

use crate::Error;
use crate::traits::secret_store::{SecretData, SecretStore};

/// Directory-backed secret store
///
/// # Example
///
/// ```rust,no_run
/// use dns01_core::secrets::FileSecretStore;
/// use dns01_core::traits::SecretStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileSecretStore::new("/var/run/dns01/secrets")?;
///     let data = store.get_secret("cert-manager", "alidns-credentials").await?;
///     println!("{} keys", data.len());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FileSecretStore {
    root: PathBuf,
}

impl FileSecretStore {
    /// Create a store rooted at `root`
    ///
    /// Fails if `root` is not an existing directory.
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self, Error> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(Error::config(format!(
                "Secret directory does not exist: {}",
                root.display()
            )));
        }
        Ok(Self { root })
    }

    /// Directory holding the keys of `namespace/name`
    fn secret_dir(&self, namespace: &str, name: &str) -> Result<PathBuf, Error> {
        for part in [namespace, name] {
            if !is_single_component(part) {
                return Err(Error::secret(namespace, name, "invalid secret path component"));
            }
        }
        Ok(self.root.join(namespace).join(name))
    }
}

/// Whether `part` is exactly one normal path component
fn is_single_component(part: &str) -> bool {
    let mut components = Path::new(part).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

#[async_trait]
impl SecretStore for FileSecretStore {
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<SecretData, Error> {
        let dir = self.secret_dir(namespace, name)?;

        let mut entries = fs::read_dir(&dir).await.map_err(|e| {
            Error::secret(
                namespace,
                name,
                format!("failed to read {}: {}", dir.display(), e),
            )
        })?;

        let mut data = SecretData::new();
        while let Some(entry) = entries.next_entry().await? {
            let key = entry.file_name().to_string_lossy().into_owned();
            if key.starts_with('.') {
                continue;
            }

            // metadata() follows symlinks, so mounted key links resolve to files
            let path = entry.path();
            if !fs::metadata(&path).await?.is_file() {
                continue;
            }

            let value = fs::read(&path).await.map_err(|e| {
                Error::secret(
                    namespace,
                    name,
                    format!("failed to read key {}: {}", key, e),
                )
            })?;
            data.insert(key, value);
        }

        tracing::debug!(
            "Loaded {} key(s) for secret {}/{} from {}",
            data.len(),
            namespace,
            name,
            dir.display()
        );
        Ok(data)
    }

    fn store_name(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_file_store_reads_keys() {
        let dir = tempdir().unwrap();
        let secret_dir = dir.path().join("cert-manager").join("alidns");
        std::fs::create_dir_all(&secret_dir).unwrap();
        std::fs::write(secret_dir.join("access-key"), b"AKID").unwrap();
        std::fs::write(secret_dir.join("secret-key"), b"s3cr3t").unwrap();
        std::fs::write(secret_dir.join(".hidden"), b"ignored").unwrap();

        let store = FileSecretStore::new(dir.path()).unwrap();
        let data = store.get_secret("cert-manager", "alidns").await.unwrap();

        assert_eq!(data.len(), 2);
        assert_eq!(data["access-key"], b"AKID".to_vec());
        assert_eq!(data["secret-key"], b"s3cr3t".to_vec());
    }

    #[tokio::test]
    async fn test_file_store_missing_secret() {
        let dir = tempdir().unwrap();
        let store = FileSecretStore::new(dir.path()).unwrap();

        let err = store.get_secret("cert-manager", "absent").await.unwrap_err();
        assert!(err.to_string().contains("cert-manager/absent"));
    }

    #[tokio::test]
    async fn test_file_store_rejects_traversal() {
        let dir = tempdir().unwrap();
        let store = FileSecretStore::new(dir.path()).unwrap();

        assert!(store.get_secret("..", "etc").await.is_err());
        assert!(store.get_secret("ns", "a/b").await.is_err());
        assert!(store.get_secret("", "creds").await.is_err());
    }

    #[test]
    fn test_file_store_requires_directory() {
        let dir = tempdir().unwrap();
        assert!(FileSecretStore::new(dir.path().join("missing")).is_err());
    }
}
