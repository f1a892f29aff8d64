//! Core reconcile engine
//!
//! The DnsSolver is responsible for:
//! - Resolving per-challenge configuration and credentials
//! - Looking up the current TXT record via the provider
//! - Issuing the single mutation (or none) that converges the zone
//!
//! ## Architecture
//!
//! ```text
//! ChallengeRequest
//!        │
//!        ▼
//! ┌────────────────┐   SolverConfig   ┌────────────────────┐
//! │ ConfigResolver │ ───────────────▶ │ DnsProviderFactory │
//! └────────────────┘                  └────────────────────┘
//!                                              │ DnsProvider
//!                          ┌───────────────────┴───────────────────┐
//!                          ▼                                       ▼
//!                  ┌───────────────┐    decision    ┌────────────────┐
//!                  │ RecordLocator │ ─────────────▶ │ RecordMutator  │
//!                  └───────────────┘                └────────────────┘
//! ```
//!
//! ## Decision Table
//!
//! | action  | current record          | mutation |
//! |---------|-------------------------|----------|
//! | Present | none                    | create   |
//! | Present | value or type differs   | update   |
//! | Present | identical               | none     |
//! | CleanUp | none                    | none     |
//! | CleanUp | any                     | delete   |
//!
//! Only the first exact relative-name match is acted upon.

pub mod locator;
pub mod mutator;

pub use locator::RecordLocator;
pub use mutator::RecordMutator;

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{Instrument, debug, error, info, info_span};

use crate::challenge::{ChallengeAction, ChallengeRequest, TXT};
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::resolver::ConfigResolver;
use crate::traits::{DnsProvider, DnsProviderFactory, Solver};

/// What a reconcile call did to the zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Record did not exist and was created
    Created {
        /// Identifier of the new record
        record_id: String,
    },
    /// Record existed with another value or type and was overwritten
    Updated {
        /// Identifier of the updated record
        record_id: String,
    },
    /// Record already had the desired value (no-op)
    Unchanged {
        /// Identifier of the matching record
        record_id: String,
    },
    /// Record existed and was deleted
    Deleted {
        /// Identifier of the deleted record
        record_id: String,
    },
    /// Nothing to clean up (no-op)
    AlreadyAbsent,
}

/// DNS-01 solver driving one provider
///
/// ## Lifecycle
///
/// 1. Create with [`DnsSolver::new()`], injecting the provider factory and
///    the config resolver
/// 2. The host calls [`Solver::initialize`] once
/// 3. The host calls [`Solver::present`] / [`Solver::cleanup`] per challenge
///
/// ## Threading
///
/// Each call runs sequentially on the calling task. Concurrent calls share
/// only the factory and resolver, which are immutable.
pub struct DnsSolver {
    /// Solver name
    name: String,

    /// Builds provider clients from resolved credentials
    factory: Arc<dyn DnsProviderFactory>,

    /// Resolves per-request configuration
    resolver: ConfigResolver,

    /// Paging settings
    config: EngineConfig,
}

impl DnsSolver {
    /// Create a new solver
    ///
    /// # Parameters
    ///
    /// - `name`: Name the host addresses this solver by
    /// - `factory`: Provider factory
    /// - `resolver`: Config resolver (with or without a secret store)
    /// - `config`: Engine settings
    pub fn new(
        name: impl Into<String>,
        factory: Arc<dyn DnsProviderFactory>,
        resolver: ConfigResolver,
        config: EngineConfig,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            name: name.into(),
            factory,
            resolver,
            config,
        })
    }

    /// Converge the zone to the state `request.action` asks for
    ///
    /// # Returns
    ///
    /// - `Ok(ReconcileOutcome)`: the mutation performed, if any
    /// - `Err(Error)`: configuration, unsupported action or provider failure
    pub async fn reconcile(&self, request: &ChallengeRequest) -> Result<ReconcileOutcome> {
        let span = info_span!(
            "reconcile",
            uid = %request.uid,
            action = %request.action,
            fqdn = %request.resolved_fqdn,
            zone = %request.resolved_zone,
        );

        self.reconcile_inner(request).instrument(span).await
    }

    async fn reconcile_inner(&self, request: &ChallengeRequest) -> Result<ReconcileOutcome> {
        info!("Starting reconcile");

        let config = self.resolver.load_config(request).await.map_err(|e| {
            error!("Failed to load config: {}", e);
            e
        })?;

        if let Err(e) = config.validate() {
            error!("Invalid config: {}", e);
            return Err(e);
        }

        let provider = self.factory.create(&config)?;

        let rr = request.relative_name();
        let domain = request.domain();

        match &request.action {
            ChallengeAction::Present => {
                self.create_or_update(provider.as_ref(), TXT, rr, domain, &request.key)
                    .await
            }
            ChallengeAction::CleanUp => self.remove(provider.as_ref(), TXT, rr, domain).await,
            ChallengeAction::Other(action) => Err(Error::unsupported_action(action.as_str())),
        }
    }

    /// Make `rr` exist as a `record_type` record holding `value`
    pub async fn create_or_update(
        &self,
        provider: &dyn DnsProvider,
        record_type: &str,
        rr: &str,
        domain: &str,
        value: &str,
    ) -> Result<ReconcileOutcome> {
        info!("Creating or updating record: type={} rr={} domain={}", record_type, rr, domain);

        let locator = RecordLocator::new(provider, &self.config);
        let mutator = RecordMutator::new(provider);

        match locator.get_record(record_type, rr, domain).await {
            Ok(record) if record.value != value || record.record_type != record_type => {
                mutator
                    .update_record(&record.record_id, record_type, rr, value)
                    .await?;
                Ok(ReconcileOutcome::Updated {
                    record_id: record.record_id,
                })
            }
            Ok(record) => {
                info!("Record {} already up to date", record.record_id);
                Ok(ReconcileOutcome::Unchanged {
                    record_id: record.record_id,
                })
            }
            Err(e) if e.is_not_found() => {
                let record_id = mutator.create_record(record_type, rr, domain, value).await?;
                Ok(ReconcileOutcome::Created { record_id })
            }
            Err(e) => Err(e),
        }
    }

    /// Make sure no `record_type` record named `rr` exists
    pub async fn remove(
        &self,
        provider: &dyn DnsProvider,
        record_type: &str,
        rr: &str,
        domain: &str,
    ) -> Result<ReconcileOutcome> {
        info!("Removing record: type={} rr={} domain={}", record_type, rr, domain);

        let locator = RecordLocator::new(provider, &self.config);

        match locator.get_record(record_type, rr, domain).await {
            Ok(record) => {
                RecordMutator::new(provider)
                    .delete_record(&record.record_id)
                    .await?;
                Ok(ReconcileOutcome::Deleted {
                    record_id: record.record_id,
                })
            }
            Err(e) if e.is_not_found() => {
                info!("Record not found, nothing to remove");
                Ok(ReconcileOutcome::AlreadyAbsent)
            }
            Err(e) => {
                error!("Record remove failed: {}", e);
                Err(e)
            }
        }
    }
}

#[async_trait]
impl Solver for DnsSolver {
    fn name(&self) -> &str {
        &self.name
    }

    async fn initialize(&self, stop: watch::Receiver<bool>) -> Result<()> {
        if *stop.borrow() {
            return Err(Error::Other(format!(
                "solver {} stopped before initialization",
                self.name
            )));
        }

        debug!("Solver {} initialized with {:?}", self.name, self.resolver);
        Ok(())
    }

    async fn present(&self, request: &ChallengeRequest) -> Result<()> {
        let mut request = request.clone();
        request.action = ChallengeAction::Present;
        self.reconcile(&request).await.map(|_| ())
    }

    async fn cleanup(&self, request: &ChallengeRequest) -> Result<()> {
        let mut request = request.clone();
        request.action = ChallengeAction::CleanUp;
        self.reconcile(&request).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_equality() {
        let outcome = ReconcileOutcome::Created {
            record_id: "1".to_string(),
        };

        assert_eq!(outcome.clone(), outcome);
        assert_ne!(outcome, ReconcileOutcome::AlreadyAbsent);
    }
}
