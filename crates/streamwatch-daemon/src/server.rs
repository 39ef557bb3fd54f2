//! Server setup and lifecycle management

use crate::api::create_router;
use crate::api::rest::state::AppState;
use crate::clients::{CouchRegistry, HlsMonitorClient, StaticToken};
use crate::config::DaemonConfig;
use crate::error::{DaemonError, DaemonResult};
use crate::scheduler::{Reconciler, Scheduler};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// streamwatch daemon server
pub struct Server {
    config: DaemonConfig,
    scheduler: Arc<Scheduler>,
    reconcile_rx: mpsc::Receiver<()>,
}

impl Server {
    /// Create a new server talking to the configured registry and monitor
    pub fn new(config: DaemonConfig) -> DaemonResult<Self> {
        config.validate().map_err(DaemonError::Config)?;

        let registry = CouchRegistry::new(&config.registry)
            .map_err(|e| DaemonError::Config(e.to_string()))?;
        let monitor = HlsMonitorClient::new(&config.monitor)
            .map_err(|e| DaemonError::Config(e.to_string()))?;
        let tokens = StaticToken::new(config.monitor.token.clone());

        if config.monitor.token.is_none() {
            tracing::warn!("No monitor token configured; passes will fail until one is set");
        }

        let reconciler = Reconciler::new(Arc::new(registry), Arc::new(monitor), Arc::new(tokens))
            .with_timeouts(
                config.scheduler.fetch_timeout(),
                config.scheduler.register_timeout(),
            );

        Ok(Self::with_reconciler(config, Arc::new(reconciler)))
    }

    /// Create a server around an existing reconciler
    pub fn with_reconciler(config: DaemonConfig, reconciler: Arc<Reconciler>) -> Self {
        let (scheduler, reconcile_rx) = Scheduler::new(config.scheduler.clone(), reconciler);

        Self {
            config,
            scheduler,
            reconcile_rx,
        }
    }

    /// Scheduler handle
    pub fn scheduler(&self) -> Arc<Scheduler> {
        self.scheduler.clone()
    }

    /// Run the server
    pub async fn run(self) -> DaemonResult<()> {
        let addr = self.config.server.listen_addr;

        let app = create_router(AppState::new());

        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening at {}", addr);
        tracing::info!(
            registry = %self.config.registry.url,
            database = %self.config.registry.database,
            monitor = %self.config.monitor.url,
            "Synchronizing registry streams into monitor"
        );

        // Start scheduler in background
        let scheduler = self.scheduler.clone();
        let scheduler_handle = tokio::spawn(scheduler.start(self.reconcile_rx));

        // Run server with graceful shutdown
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| DaemonError::Server(e.to_string()))?;

        tracing::info!("streamwatch daemon shutting down");

        // Stop scheduler, letting an in-flight pass finish
        self.scheduler.stop();
        if let Err(e) = scheduler_handle.await {
            tracing::warn!(error = %e, "Scheduler task ended abnormally");
        }

        Ok(())
    }
}

/// Resolves on Ctrl+C, or SIGTERM on unix
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c() => tracing::info!(signal = "SIGINT", "Shutdown requested"),
                    _ = sigterm.recv() => tracing::info!(signal = "SIGTERM", "Shutdown requested"),
                }
                return;
            }
            Err(e) => tracing::warn!(error = %e, "Cannot listen for SIGTERM"),
        }
    }

    ctrl_c().await;
    tracing::info!(signal = "SIGINT", "Shutdown requested");
}

/// Ctrl+C, or never if the handler cannot be installed
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Cannot listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}
