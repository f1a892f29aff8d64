//! Daemon settings, read once from the environment

use anyhow::Result;
use dns01_core::EngineConfig;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Where `apiKeySecretRef` references are resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretBackend {
    /// Kubernetes API (needs the `kube` feature)
    Kube,
    /// Mounted directory tree, `<dir>/<namespace>/<name>/<key>`
    File(PathBuf),
    /// Inline credentials only
    None,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Settings {
    pub group_name: String,
    pub listen_addr: String,
    pub log_level: String,
    pub secret_store: String,
    pub secret_dir: Option<String>,
    pub alidns_endpoint: Option<String>,
    pub max_pages: Option<String>,
}

fn default_secret_store() -> &'static str {
    if cfg!(feature = "kube") { "kube" } else { "none" }
}

impl Settings {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its value
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            group_name: lookup("GROUP_NAME").unwrap_or_default(),
            listen_addr: lookup("DNS01_LISTEN_ADDR").unwrap_or_else(|| "0.0.0.0:8443".to_string()),
            log_level: lookup("DNS01_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            secret_store: lookup("DNS01_SECRET_STORE")
                .unwrap_or_else(|| default_secret_store().to_string()),
            secret_dir: lookup("DNS01_SECRET_DIR"),
            alidns_endpoint: lookup("DNS01_ALIDNS_ENDPOINT").filter(|s| !s.is_empty()),
            max_pages: lookup("DNS01_MAX_PAGES"),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.group_name.trim().is_empty() {
            anyhow::bail!(
                "GROUP_NAME must be specified. \
                Set it via: export GROUP_NAME=acme.example.com"
            );
        }

        self.listen_addr()?;
        self.secret_backend()?;
        self.engine_config()?;

        if let Some(ref endpoint) = self.alidns_endpoint
            && !endpoint.starts_with("https://")
            && !endpoint.starts_with("http://")
        {
            anyhow::bail!(
                "DNS01_ALIDNS_ENDPOINT must use HTTP or HTTPS scheme. Got: {}",
                endpoint
            );
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "DNS01_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen_addr.parse().map_err(|e| {
            anyhow::anyhow!(
                "DNS01_LISTEN_ADDR '{}' is not a socket address: {}",
                self.listen_addr,
                e
            )
        })
    }

    pub fn secret_backend(&self) -> Result<SecretBackend> {
        match self.secret_store.as_str() {
            "kube" if cfg!(feature = "kube") => Ok(SecretBackend::Kube),
            "kube" => anyhow::bail!(
                "DNS01_SECRET_STORE=kube requires dns01d built with the `kube` feature"
            ),
            "file" => match self.secret_dir.as_deref() {
                Some(dir) if !dir.is_empty() => {
                    let path = PathBuf::from(dir);
                    if !path.is_dir() {
                        anyhow::bail!("DNS01_SECRET_DIR is not a directory: {}", dir);
                    }
                    Ok(SecretBackend::File(path))
                }
                _ => anyhow::bail!(
                    "DNS01_SECRET_DIR is required when DNS01_SECRET_STORE=file. \
                    Set it via: export DNS01_SECRET_DIR=/var/run/dns01/secrets"
                ),
            },
            "none" => Ok(SecretBackend::None),
            other => anyhow::bail!(
                "DNS01_SECRET_STORE '{}' is not supported. \
                Supported stores: kube, file, none",
                other
            ),
        }
    }

    pub fn engine_config(&self) -> Result<EngineConfig> {
        let mut config = EngineConfig::default();

        if let Some(ref raw) = self.max_pages {
            let max_pages: u32 = raw
                .parse()
                .map_err(|_| anyhow::anyhow!("DNS01_MAX_PAGES must be a number. Got: {}", raw))?;
            if !(1..=10_000).contains(&max_pages) {
                anyhow::bail!(
                    "DNS01_MAX_PAGES must be between 1 and 10000. Got: {}",
                    max_pages
                );
            }
            config.max_pages = max_pages;
        }

        config.validate()?;
        Ok(config)
    }

    /// Filter directive for the subscriber; `RUST_LOG` wins when set
    pub fn log_filter(&self) -> String {
        self.log_level.to_lowercase()
    }
}
