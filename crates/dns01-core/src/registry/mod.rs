//! Solver registry
//!
//! Several solvers can be served from one process; the host disambiguates
//! them by [`Solver::name`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dns01_core::registry::SolverRegistry;
//!
//! let registry = SolverRegistry::new();
//! registry.register(std::sync::Arc::new(solver))?;
//!
//! let solver = registry.get("alidns-solver")?;
//! solver.present(&request).await?;
//! ```
//!
//! ## Registration
//!
//! Provider crates expose a helper that builds and registers their solver:
//!
//! ```rust,ignore
//! // In dns01-provider-alidns
//! pub fn register(
//!     registry: &SolverRegistry,
//!     factory: AliDnsFactory,
//!     resolver: ConfigResolver,
//!     config: EngineConfig,
//! ) -> Result<()> {
//!     let solver = DnsSolver::new(SOLVER_NAME, Arc::new(factory), resolver, config)?;
//!     registry.register(Arc::new(solver))
//! }
//! ```

use crate::error::{Error, Result};
use crate::traits::Solver;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::watch;
use tracing::info;

/// Registry of named solvers
///
/// ## Thread Safety
///
/// The registry uses interior mutability with RwLock, allowing concurrent
/// reads and exclusive writes.
#[derive(Default)]
pub struct SolverRegistry {
    solvers: RwLock<HashMap<String, Arc<dyn Solver>>>,
}

impl SolverRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a solver under its own name
    ///
    /// # Errors
    ///
    /// `Error::Config` if a solver with the same name is already registered.
    pub fn register(&self, solver: Arc<dyn Solver>) -> Result<()> {
        let name = solver.name().to_string();
        let mut solvers = self
            .solvers
            .write()
            .map_err(|_| Error::Other("solver registry lock poisoned".to_string()))?;

        if solvers.contains_key(&name) {
            return Err(Error::config(format!("Solver already registered: {}", name)));
        }

        info!("Registered solver {}", name);
        solvers.insert(name, solver);
        Ok(())
    }

    /// Look up a solver by name
    pub fn get(&self, name: &str) -> Result<Arc<dyn Solver>> {
        let solvers = self
            .solvers
            .read()
            .map_err(|_| Error::Other("solver registry lock poisoned".to_string()))?;

        solvers
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownSolver(name.to_string()))
    }

    /// Initialize every registered solver
    ///
    /// Stops at the first failure.
    pub async fn initialize_all(&self, stop: &watch::Receiver<bool>) -> Result<()> {
        let solvers: Vec<Arc<dyn Solver>> = {
            let guard = self
                .solvers
                .read()
                .map_err(|_| Error::Other("solver registry lock poisoned".to_string()))?;
            guard.values().cloned().collect()
        };

        for solver in solvers {
            solver.initialize(stop.clone()).await?;
            info!("Initialized solver {}", solver.name());
        }
        Ok(())
    }

    /// List all registered solver names, sorted
    pub fn list_solvers(&self) -> Vec<String> {
        let solvers = match self.solvers.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mut names: Vec<String> = solvers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check if a solver is registered
    pub fn has_solver(&self, name: &str) -> bool {
        self.list_solvers().iter().any(|n| n == name)
    }
}
