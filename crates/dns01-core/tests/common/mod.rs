//! Test doubles and common utilities for reconcile contract tests
//!
//! The mock provider keeps an in-memory zone and records every call so the
//! tests can assert on exactly which RPCs a reconcile issued.

#![allow(dead_code)]

use dns01_core::challenge::{ChallengeAction, ChallengeRequest};
use dns01_core::config::{EngineConfig, SolverConfig};
use dns01_core::error::{Error, Result};
use dns01_core::traits::{DnsProvider, DnsProviderFactory, DnsRecord, RecordPage, RecordQuery};
use dns01_core::{ConfigResolver, DnsSolver};
use std::sync::{Arc, Mutex};

/// One provider call as observed by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Describe(RecordQuery),
    Add {
        domain: String,
        rr: String,
        record_type: String,
        value: String,
    },
    Update {
        record_id: String,
        rr: String,
        record_type: String,
        value: String,
    },
    Delete {
        record_id: String,
    },
}

impl Call {
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Call::Describe(_))
    }
}

/// Which operation the mock should fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    Describe,
    Add,
    Update,
    Delete,
}

#[derive(Debug, Default)]
struct ZoneState {
    records: Vec<DnsRecord>,
    calls: Vec<Call>,
    next_id: u64,
    fail_on: Option<FailOn>,
    /// Keep returning the first page forever
    never_ending: bool,
}

/// In-memory provider that tracks calls
///
/// Search matches on substring to mimic providers that answer exact-mode
/// searches with near-matches. The type filter ignores case, so a record
/// stored as `txt` is returned for a `TXT` query.
#[derive(Debug, Clone, Default)]
pub struct MockDnsProvider {
    state: Arc<Mutex<ZoneState>>,
}

impl MockDnsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the zone with a record, returning its identifier
    pub fn seed(&self, domain: &str, rr: &str, record_type: &str, value: &str) -> String {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let record_id = format!("rec-{}", state.next_id);
        state.records.push(DnsRecord {
            record_id: record_id.clone(),
            rr: rr.to_string(),
            record_type: record_type.to_string(),
            value: value.to_string(),
            domain_name: domain.to_string(),
            ttl: Some(600),
        });
        record_id
    }

    pub fn fail_on(&self, op: FailOn) {
        self.state.lock().unwrap().fail_on = Some(op);
    }

    pub fn never_ending(&self) {
        self.state.lock().unwrap().never_ending = true;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn describe_call_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Describe(_)))
            .count()
    }

    pub fn mutation_calls(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }

    /// Records currently in the zone matching `rr` and `record_type` exactly
    pub fn records_named(&self, rr: &str, record_type: &str) -> Vec<DnsRecord> {
        self.state
            .lock()
            .unwrap()
            .records
            .iter()
            .filter(|r| r.rr == rr && r.record_type == record_type)
            .cloned()
            .collect()
    }

    fn should_fail(&self, op: FailOn) -> Result<()> {
        if self.state.lock().unwrap().fail_on == Some(op) {
            return Err(Error::provider(
                "mock",
                format!("InternalError: injected {:?} failure", op),
            ));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn describe_records(&self, query: &RecordQuery) -> Result<RecordPage> {
        self.state
            .lock()
            .unwrap()
            .calls
            .push(Call::Describe(query.clone()));
        self.should_fail(FailOn::Describe)?;

        let state = self.state.lock().unwrap();
        let matching: Vec<DnsRecord> = state
            .records
            .iter()
            .filter(|r| {
                r.domain_name == query.domain
                    && r.record_type.eq_ignore_ascii_case(&query.record_type)
                    && r.rr.contains(&query.keyword)
            })
            .cloned()
            .collect();

        let page_number = if state.never_ending { 1 } else { query.page_number };
        let start = ((page_number - 1) * query.page_size) as usize;
        let records: Vec<DnsRecord> = matching
            .iter()
            .skip(start)
            .take(query.page_size as usize)
            .cloned()
            .collect();

        Ok(RecordPage { records })
    }

    async fn add_record(
        &self,
        domain: &str,
        rr: &str,
        record_type: &str,
        value: &str,
    ) -> Result<String> {
        self.state.lock().unwrap().calls.push(Call::Add {
            domain: domain.to_string(),
            rr: rr.to_string(),
            record_type: record_type.to_string(),
            value: value.to_string(),
        });
        self.should_fail(FailOn::Add)?;

        Ok(self.seed(domain, rr, record_type, value))
    }

    async fn update_record(
        &self,
        record_id: &str,
        rr: &str,
        record_type: &str,
        value: &str,
    ) -> Result<()> {
        self.state.lock().unwrap().calls.push(Call::Update {
            record_id: record_id.to_string(),
            rr: rr.to_string(),
            record_type: record_type.to_string(),
            value: value.to_string(),
        });
        self.should_fail(FailOn::Update)?;

        let mut state = self.state.lock().unwrap();
        let record = state
            .records
            .iter_mut()
            .find(|r| r.record_id == record_id)
            .ok_or_else(|| Error::provider("mock", "DomainRecordNotBelongToUser"))?;
        record.rr = rr.to_string();
        record.record_type = record_type.to_string();
        record.value = value.to_string();
        Ok(())
    }

    async fn delete_record(&self, record_id: &str) -> Result<()> {
        self.state.lock().unwrap().calls.push(Call::Delete {
            record_id: record_id.to_string(),
        });
        self.should_fail(FailOn::Delete)?;

        let mut state = self.state.lock().unwrap();
        state.records.retain(|r| r.record_id != record_id);
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Factory handing out clients that share one mock zone
#[derive(Debug, Clone, Default)]
pub struct MockProviderFactory {
    pub provider: MockDnsProvider,
    seen_configs: Arc<Mutex<Vec<SolverConfig>>>,
}

impl MockProviderFactory {
    pub fn new(provider: MockDnsProvider) -> Self {
        Self {
            provider,
            seen_configs: Arc::default(),
        }
    }

    /// Configurations the factory was asked to build clients for
    pub fn seen_configs(&self) -> Vec<SolverConfig> {
        self.seen_configs.lock().unwrap().clone()
    }
}

impl DnsProviderFactory for MockProviderFactory {
    fn create(&self, config: &SolverConfig) -> Result<Box<dyn DnsProvider>> {
        self.seen_configs.lock().unwrap().push(config.clone());
        Ok(Box::new(self.provider.clone()))
    }
}

/// Inline credentials accepted by the mock factory
pub fn inline_config() -> serde_json::Value {
    serde_json::json!({
        "accessKeyID": "test-access-key",
        "accessKeySecret": "test-access-secret",
        "regionID": "cn-hangzhou"
    })
}

/// Challenge request for `_acme-challenge.example.com.`
pub fn challenge(action: ChallengeAction, key: &str) -> ChallengeRequest {
    challenge_for("_acme-challenge.example.com.", "example.com.", action, key)
}

pub fn challenge_for(
    fqdn: &str,
    zone: &str,
    action: ChallengeAction,
    key: &str,
) -> ChallengeRequest {
    ChallengeRequest {
        uid: "test-uid".to_string(),
        action,
        challenge_type: "dns-01".to_string(),
        dns_name: zone.trim_end_matches('.').to_string(),
        key: key.to_string(),
        resource_namespace: "cert-manager".to_string(),
        resolved_fqdn: fqdn.to_string(),
        resolved_zone: zone.to_string(),
        allow_ambient_credentials: false,
        config: Some(inline_config()),
    }
}

/// Solver over `factory` with default engine settings and no secret store
pub fn solver(factory: &MockProviderFactory) -> DnsSolver {
    solver_with(factory, ConfigResolver::without_secrets(), EngineConfig::default())
}

pub fn solver_with(
    factory: &MockProviderFactory,
    resolver: ConfigResolver,
    config: EngineConfig,
) -> DnsSolver {
    DnsSolver::new("mock-solver", Arc::new(factory.clone()), resolver, config)
        .expect("solver construction succeeds")
}
