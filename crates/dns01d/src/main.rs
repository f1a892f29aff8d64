// # dns01d - DNS-01 Solver Daemon
//
// Thin integration layer: all challenge logic lives in dns01-core and the
// provider crates. The daemon is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Registering solvers and their secret store
// 4. Serving the webhook endpoint until SIGTERM/SIGINT
//
// ## Configuration
//
// - `GROUP_NAME`: API group the solvers are served under (required)
// - `DNS01_LISTEN_ADDR`: Listen address (default `0.0.0.0:8443`)
// - `DNS01_LOG_LEVEL`: trace, debug, info, warn, error (default `info`; `RUST_LOG` overrides)
// - `DNS01_SECRET_STORE`: kube, file, none (default `kube`)
// - `DNS01_SECRET_DIR`: Secret root for the file store
// - `DNS01_ALIDNS_ENDPOINT`: Fixed AliDNS endpoint instead of the region-derived one
// - `DNS01_MAX_PAGES`: Record listing page ceiling, 1-10000 (default 100)
//
// ## Example
//
// ```bash
// export GROUP_NAME=acme.example.com
// export DNS01_SECRET_STORE=kube
//
// dns01d
// ```

mod server;
mod settings;

use anyhow::Result;
use dns01_core::{ConfigResolver, FileSecretStore, SolverRegistry};
use settings::{SecretBackend, Settings};
use std::future::Future;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum Dns01ExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<Dns01ExitCode> for ExitCode {
    fn from(code: Dns01ExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn main() -> ExitCode {
    let settings = Settings::from_env();

    if let Err(e) = settings.validate() {
        eprintln!("Configuration validation error: {}", e);
        return Dns01ExitCode::ConfigError.into();
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_filter()));

    if let Err(e) = tracing_subscriber::fmt().with_env_filter(filter).try_init() {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return Dns01ExitCode::ConfigError.into();
    }

    info!("Starting dns01d for group {}", settings.group_name);

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return Dns01ExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        if let Err(e) = run_daemon(settings).await {
            error!("Daemon error: {:#}", e);
            Dns01ExitCode::RuntimeError
        } else {
            Dns01ExitCode::CleanShutdown
        }
    })
    .into()
}

/// Build the config resolver for the selected secret backend
async fn build_resolver(settings: &Settings) -> Result<ConfigResolver> {
    let resolver = match settings.secret_backend()? {
        #[cfg(feature = "kube")]
        SecretBackend::Kube => {
            let store = dns01_secret_kube::KubeSecretStore::try_default().await?;
            info!("Resolving secret references through the Kubernetes API");
            ConfigResolver::new(Arc::new(store))
        }
        #[cfg(not(feature = "kube"))]
        SecretBackend::Kube => anyhow::bail!("kube secret store not compiled in"),
        SecretBackend::File(dir) => {
            info!("Resolving secret references from {}", dir.display());
            ConfigResolver::new(Arc::new(FileSecretStore::new(dir)?))
        }
        SecretBackend::None => {
            warn!("No secret store configured; only inline credentials are accepted");
            ConfigResolver::without_secrets()
        }
    };
    Ok(resolver)
}

/// Register every solver compiled into this binary
#[allow(unused_variables)]
fn register_solvers(
    registry: &SolverRegistry,
    settings: &Settings,
    resolver: ConfigResolver,
) -> Result<()> {
    #[cfg(feature = "alidns")]
    {
        let mut factory = dns01_provider_alidns::AliDnsFactory::new()?;
        if let Some(ref endpoint) = settings.alidns_endpoint {
            info!("Using fixed AliDNS endpoint {}", endpoint);
            factory = factory.with_endpoint(endpoint.clone());
        }

        dns01_provider_alidns::register(
            registry,
            factory,
            resolver,
            settings.engine_config()?,
        )?;
        info!("Registered solver {}", dns01_provider_alidns::SOLVER_NAME);
    }

    if registry.list_solvers().is_empty() {
        anyhow::bail!("No solvers compiled in; enable the `alidns` feature");
    }
    Ok(())
}

/// Run the daemon
async fn run_daemon(settings: Settings) -> Result<()> {
    let registry = Arc::new(SolverRegistry::new());
    let resolver = build_resolver(&settings).await?;
    register_solvers(&registry, &settings, resolver)?;

    // Handlers are installed here so a setup failure aborts startup
    let shutdown = shutdown_signal()?;
    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        let signal = shutdown.await;
        info!("Received shutdown signal: {}", signal);
        let _ = stop_tx.send(true);
    });

    // Solvers refuse to initialize once stop is set; that is a clean exit
    if let Err(e) = registry.initialize_all(&stop_rx).await {
        if *stop_rx.borrow() {
            info!("Stop requested during startup: {}", e);
            return Ok(());
        }
        return Err(e.into());
    }
    if *stop_rx.borrow() {
        info!("Stop requested during startup");
        return Ok(());
    }

    let addr = settings.listen_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        "Serving {} on {} for group {}",
        registry.list_solvers().join(", "),
        addr,
        settings.group_name
    );

    let app = server::router(server::AppState {
        group: settings.group_name.clone(),
        registry: registry.clone(),
    });

    let mut stop = stop_rx.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = stop.wait_for(|stopped| *stopped).await;
            info!("Draining in-flight challenges");
        })
        .await?;

    info!("Shutting down daemon");
    Ok(())
}

/// Install the SIGTERM/SIGINT handlers
///
/// # Returns
///
/// A future that resolves to the name of the first signal received.
///
/// # Errors
///
/// Fails if either handler cannot be registered.
#[cfg(unix)]
fn shutdown_signal() -> Result<impl Future<Output = &'static str>> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    Ok(async move {
        tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        }
    })
}

/// Install the CTRL-C handler
///
/// Fallback implementation for non-Unix platforms. A listener error is
/// logged and never treated as a stop request.
#[cfg(not(unix))]
fn shutdown_signal() -> Result<impl Future<Output = &'static str>> {
    Ok(async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => "SIGINT",
            Err(e) => {
                error!("Failed to wait for CTRL-C: {}", e);
                std::future::pending().await
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn shutdown_signal_installs_and_stays_pending() {
        let shutdown = shutdown_signal().unwrap();

        // No signal was sent, so the future must not resolve on its own
        let waited = tokio::time::timeout(Duration::from_millis(50), shutdown).await;
        assert!(waited.is_err());
    }
}
