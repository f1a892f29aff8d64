//! Core traits for the DNS-01 solver
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`DnsProvider`]: Search and mutate records via a provider API
//! - [`SecretStore`]: Resolve credential secrets
//! - [`Solver`]: Host-facing challenge contract

pub mod dns_provider;
pub mod secret_store;
pub mod solver;

pub use dns_provider::{DnsProvider, DnsProviderFactory, DnsRecord, RecordPage, RecordQuery};
pub use secret_store::{SecretData, SecretStore};
pub use solver::Solver;
