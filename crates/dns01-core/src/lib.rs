// # dns01-core
//
// Core library for ACME DNS-01 TXT record solvers.
//
// ## Architecture Overview
//
// - **DnsProvider**: Trait for searching and mutating records via provider APIs
// - **SecretStore**: Trait for resolving credential secrets
// - **Solver**: Host-facing Present/CleanUp contract
// - **DnsSolver**: Reconcile engine implementing `Solver` for any provider
// - **ConfigResolver**: Decodes per-challenge config and fills in credentials
// - **SolverRegistry**: Name-keyed registry of solvers
//
// ## Design Principles
//
// 1. **Stateless**: Every reconcile re-reads the zone; nothing is cached
// 2. **Minimal mutation**: At most one create, update or delete per call
// 3. **Idempotent**: Presenting the same value twice is a no-op the second time
// 4. **Injected dependencies**: Providers and secret stores are constructor parameters
// 5. **Library-First**: The daemon is a thin adapter over this crate

pub mod challenge;
pub mod config;
pub mod engine;
pub mod error;
pub mod registry;
pub mod resolver;
pub mod secrets;
pub mod traits;

// Re-export core types for convenience
pub use challenge::{ChallengeAction, ChallengeRequest};
pub use config::{Credentials, EngineConfig, SecretKeySelector, SolverConfig};
pub use engine::{DnsSolver, ReconcileOutcome};
pub use error::{Error, Result};
pub use registry::SolverRegistry;
pub use resolver::ConfigResolver;
pub use secrets::{FileSecretStore, MemorySecretStore};
pub use traits::{DnsProvider, DnsProviderFactory, SecretStore, Solver};
