// # DNS Provider Trait
//
// Defines the RPC surface of a DNS provider as seen by the reconcile engine:
// a paged record search plus add, update and delete of single records.
//
// ## Implementations
//
// - Alibaba Cloud DNS: `dns01-provider-alidns` crate
//
// ## Usage
//
// ```rust,ignore
// use dns01_core::traits::{DnsProvider, RecordQuery};
//
// let provider = /* DnsProvider implementation */;
// let page = provider
//     .describe_records(&RecordQuery::exact("example.com", "TXT", "_acme-challenge", 1, 100))
//     .await?;
// ```

use async_trait::async_trait;

/// One record as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsRecord {
    /// Provider-assigned identifier
    pub record_id: String,
    /// Name relative to the domain (the "RR")
    pub rr: String,
    /// Record type (e.g. `TXT`)
    pub record_type: String,
    /// Record value
    pub value: String,
    /// Owning domain
    pub domain_name: String,
    /// Time-to-live, when the provider reports it
    pub ttl: Option<u32>,
}

/// Parameters of one record search page
///
/// Searches are always exact-match on `keyword`, which the provider may
/// still answer with near-matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordQuery {
    /// Domain to search in
    pub domain: String,
    /// Record type filter
    pub record_type: String,
    /// Relative name to match
    pub keyword: String,
    /// 1-based page number
    pub page_number: u32,
    /// Records per page
    pub page_size: u32,
}

impl RecordQuery {
    /// Build an exact-match query for one page
    pub fn exact(
        domain: impl Into<String>,
        record_type: impl Into<String>,
        keyword: impl Into<String>,
        page_number: u32,
        page_size: u32,
    ) -> Self {
        Self {
            domain: domain.into(),
            record_type: record_type.into(),
            keyword: keyword.into(),
            page_number,
            page_size,
        }
    }
}

/// One page of search results
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordPage {
    /// Records on this page, in provider order
    pub records: Vec<DnsRecord>,
}

/// Trait for DNS provider implementations
///
/// # Trust Level: Untrusted
///
/// Providers are single-shot RPC handles:
/// - one remote call per method invocation
/// - no retry, backoff or caching (the host retries whole challenges)
/// - errors are returned verbatim as [`crate::Error::Provider`]
///
/// # Thread Safety
///
/// Implementations must be usable from concurrent reconciles.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Fetch one page of records matching `query`
    async fn describe_records(&self, query: &RecordQuery) -> Result<RecordPage, crate::Error>;

    /// Add a record and return its provider-assigned identifier
    async fn add_record(
        &self,
        domain: &str,
        rr: &str,
        record_type: &str,
        value: &str,
    ) -> Result<String, crate::Error>;

    /// Overwrite the record identified by `record_id`
    async fn update_record(
        &self,
        record_id: &str,
        rr: &str,
        record_type: &str,
        value: &str,
    ) -> Result<(), crate::Error>;

    /// Delete the record identified by `record_id`
    async fn delete_record(&self, record_id: &str) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Builds a provider client from per-request configuration
///
/// Credentials differ per challenge, so the engine asks the factory for a
/// fresh client on every reconcile. Factories may share a connection pool
/// between the clients they build.
pub trait DnsProviderFactory: Send + Sync {
    /// Create a DnsProvider from resolved configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn DnsProvider>)`: client bound to the config's credentials
    /// - `Err(Error::Config)`: if the credentials are unusable
    fn create(
        &self,
        config: &crate::config::SolverConfig,
    ) -> Result<Box<dyn DnsProvider>, crate::Error>;
}
