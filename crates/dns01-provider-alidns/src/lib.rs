// # Alibaba Cloud DNS Provider
//
// This crate provides the Alibaba Cloud DNS (AliDNS) provider for the DNS-01
// solver, plus a helper that registers it as `alidns-solver`.
//
// ## Behaviour
//
// - One signed HTTP request per trait method call
// - Errors are returned verbatim as `Error::Provider("alidns", ...)`
// - HTTP timeout of 30 seconds
// - No retry, backoff or caching (the host retries whole challenges)
//
// ## Security Requirements
//
// - The access key secret NEVER appears in logs or Debug output
// - The factory fails fast if either access key is empty
//
// ## API Reference
//
// All calls are `POST https://alidns.<region>.aliyuncs.com/?<params>` with an
// empty body, authenticated with the ACS3-HMAC-SHA256 signature:
//
// - DescribeDomainRecords: `DomainName`, `PageNumber`, `PageSize`, `KeyWord`, `SearchMode`, `Type`
// - AddDomainRecord: `DomainName`, `RR`, `Type`, `Value`
// - UpdateDomainRecord: `RecordId`, `RR`, `Type`, `Value`
// - DeleteDomainRecord: `RecordId`

pub mod api;
pub mod signer;

use async_trait::async_trait;
use dns01_core::config::{EngineConfig, SolverConfig};
use dns01_core::traits::{DnsProvider, DnsProviderFactory, RecordPage, RecordQuery};
use dns01_core::{ConfigResolver, Credentials, DnsSolver, Error, Result, SolverRegistry};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// Name the host addresses this solver by
pub const SOLVER_NAME: &str = "alidns-solver";

const PROVIDER_NAME: &str = "alidns";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Endpoint serving `region`; the empty region selects the global endpoint
pub fn endpoint_for_region(region: &str) -> String {
    if region.is_empty() {
        "https://alidns.aliyuncs.com".to_string()
    } else {
        format!("https://alidns.{}.aliyuncs.com", region)
    }
}

/// Alibaba Cloud DNS client bound to one set of access keys
///
/// Built per challenge by [`AliDnsFactory`]; holds no state beyond the
/// credentials and a handle on the shared connection pool.
pub struct AliDnsProvider {
    /// ⚠️ NEVER log the secret half
    credentials: Credentials,

    /// Base URL, without trailing slash
    endpoint: String,

    /// `Host` header value covered by the signature
    host: String,

    client: reqwest::Client,
}

// Custom Debug implementation that hides the access key secret
impl std::fmt::Debug for AliDnsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AliDnsProvider")
            .field("access_key_id", &self.credentials.access_key_id)
            .field("access_key_secret", &"<REDACTED>")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl AliDnsProvider {
    /// Create a provider talking to `endpoint`
    ///
    /// # Errors
    ///
    /// `Error::Config` if either access key is empty or `endpoint` is not a
    /// valid URL with a host.
    pub fn new(
        client: reqwest::Client,
        credentials: Credentials,
        endpoint: &str,
    ) -> Result<Self> {
        if credentials.access_key_id.is_empty() || credentials.access_key_secret.is_empty() {
            return Err(Error::config("accessKeySecret or accessKeyID is empty"));
        }

        let url = reqwest::Url::parse(endpoint)
            .map_err(|e| Error::config(format!("Invalid AliDNS endpoint {}: {}", endpoint, e)))?;
        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => {
                return Err(Error::config(format!(
                    "Invalid AliDNS endpoint {}: missing host",
                    endpoint
                )));
            }
        };

        Ok(Self {
            credentials,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            host,
            client,
        })
    }

    /// Base URL this provider sends requests to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sign and send one RPC call, decoding the JSON response as `T`
    async fn call<T: DeserializeOwned>(
        &self,
        action: &str,
        params: BTreeMap<String, String>,
    ) -> Result<T> {
        let date = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
        let nonce = uuid::Uuid::new_v4().simple().to_string();

        let signed = signer::sign(
            &signer::RpcRequest {
                method: "POST",
                host: &self.host,
                action,
                version: api::API_VERSION,
                params: &params,
                date: &date,
                nonce: &nonce,
            },
            &self.credentials,
        )?;

        let url = format!("{}/?{}", self.endpoint, signed.query);
        tracing::debug!("AliDNS {} request to {}", action, self.endpoint);

        let mut request = self.client.post(&url);
        for (name, value) in &signed.headers {
            // reqwest derives Host from the URL
            if name != "host" {
                request = request.header(name.as_str(), value.as_str());
            }
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::provider(PROVIDER_NAME, format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());

            let message = match serde_json::from_str::<api::ErrorResponse>(&body) {
                Ok(err) if !err.code.is_empty() => format!(
                    "{} failed: {}: {} (RequestId: {}, status: {})",
                    action, err.code, err.message, err.request_id, status
                ),
                _ => format!("{} failed: {} - {}", action, status, body),
            };
            tracing::debug!("AliDNS {} rejected with status {}", action, status);
            return Err(Error::provider(PROVIDER_NAME, message));
        }

        response.json::<T>().await.map_err(|e| {
            Error::provider(
                PROVIDER_NAME,
                format!("Failed to parse {} response: {}", action, e),
            )
        })
    }
}

fn params<const N: usize>(pairs: [(&str, &str); N]) -> BTreeMap<String, String> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[async_trait]
impl DnsProvider for AliDnsProvider {
    async fn describe_records(&self, query: &RecordQuery) -> Result<RecordPage> {
        let page_number = query.page_number.to_string();
        let page_size = query.page_size.to_string();

        let resp: api::DescribeDomainRecordsResponse = self
            .call(
                api::ACTION_DESCRIBE,
                params([
                    ("DomainName", query.domain.as_str()),
                    ("PageNumber", page_number.as_str()),
                    ("PageSize", page_size.as_str()),
                    ("KeyWord", query.keyword.as_str()),
                    ("SearchMode", "EXACT"),
                    ("Type", query.record_type.as_str()),
                ]),
            )
            .await?;

        tracing::debug!(
            "DescribeDomainRecords page {} returned {} records (RequestId: {})",
            query.page_number,
            resp.domain_records.record.len(),
            resp.request_id
        );
        Ok(resp.into())
    }

    async fn add_record(
        &self,
        domain: &str,
        rr: &str,
        record_type: &str,
        value: &str,
    ) -> Result<String> {
        let resp: api::RecordMutationResponse = self
            .call(
                api::ACTION_ADD,
                params([
                    ("DomainName", domain),
                    ("RR", rr),
                    ("Type", record_type),
                    ("Value", value),
                ]),
            )
            .await?;

        if resp.record_id.is_empty() {
            return Err(Error::provider(
                PROVIDER_NAME,
                format!("AddDomainRecord returned no RecordId (RequestId: {})", resp.request_id),
            ));
        }
        Ok(resp.record_id)
    }

    async fn update_record(
        &self,
        record_id: &str,
        rr: &str,
        record_type: &str,
        value: &str,
    ) -> Result<()> {
        let _: api::RecordMutationResponse = self
            .call(
                api::ACTION_UPDATE,
                params([
                    ("RecordId", record_id),
                    ("RR", rr),
                    ("Type", record_type),
                    ("Value", value),
                ]),
            )
            .await?;
        Ok(())
    }

    async fn delete_record(&self, record_id: &str) -> Result<()> {
        let _: api::RecordMutationResponse = self
            .call(api::ACTION_DELETE, params([("RecordId", record_id)]))
            .await?;
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

/// Factory for creating AliDNS providers
///
/// Every provider it builds shares one `reqwest::Client` connection pool.
#[derive(Debug, Clone)]
pub struct AliDnsFactory {
    client: reqwest::Client,

    /// Fixed endpoint overriding the region-derived one
    endpoint: Option<String>,
}

impl AliDnsFactory {
    /// Create a factory with a 30 second HTTP timeout
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: None,
        })
    }

    /// Send every request to `endpoint` regardless of `regionID`
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }
}

impl DnsProviderFactory for AliDnsFactory {
    fn create(&self, config: &SolverConfig) -> Result<Box<dyn DnsProvider>> {
        config.validate()?;

        let endpoint = self
            .endpoint
            .clone()
            .unwrap_or_else(|| endpoint_for_region(&config.region_id));

        Ok(Box::new(AliDnsProvider::new(
            self.client.clone(),
            config.credentials(),
            &endpoint,
        )?))
    }
}

/// Register the AliDNS solver with a registry
///
/// # Example
///
/// ```rust,ignore
/// use dns01_core::{ConfigResolver, EngineConfig, SolverRegistry};
///
/// let registry = SolverRegistry::new();
/// dns01_provider_alidns::register(
///     &registry,
///     AliDnsFactory::new()?,
///     ConfigResolver::without_secrets(),
///     EngineConfig::default(),
/// )?;
/// ```
pub fn register(
    registry: &SolverRegistry,
    factory: AliDnsFactory,
    resolver: ConfigResolver,
    config: EngineConfig,
) -> Result<()> {
    let solver = DnsSolver::new(SOLVER_NAME, Arc::new(factory), resolver, config)?;
    registry.register(Arc::new(solver))
}
