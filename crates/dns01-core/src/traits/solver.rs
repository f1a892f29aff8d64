// # Solver Trait
//
// The contract between the host framework and a DNS-01 solver. The host
// calls `initialize` once at startup, then `present`/`cleanup` per
// challenge, possibly concurrently for different challenges.

use async_trait::async_trait;
use tokio::sync::watch;

use crate::challenge::ChallengeRequest;

/// Trait for challenge solvers
#[async_trait]
pub trait Solver: Send + Sync {
    /// Stable solver name, unique within one group
    fn name(&self) -> &str;

    /// Prepare the solver before any challenge is served
    ///
    /// `stop` flips to `true` when the process is asked to terminate. It
    /// only gates startup; in-flight challenges are not cancelled by it.
    async fn initialize(&self, stop: watch::Receiver<bool>) -> Result<(), crate::Error>;

    /// Make the TXT record exist with `request.key` as its value
    ///
    /// Must tolerate being called multiple times with the same value.
    async fn present(&self, request: &ChallengeRequest) -> Result<(), crate::Error>;

    /// Remove the TXT record; an already-absent record is a success
    async fn cleanup(&self, request: &ChallengeRequest) -> Result<(), crate::Error>;
}
