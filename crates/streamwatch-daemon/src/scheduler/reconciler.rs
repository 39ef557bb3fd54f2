//! Registry to monitor reconciliation

use crate::clients::{MonitorService, StreamRegistry, TokenSource};
use crate::error::{SyncError, SyncResult};
use std::sync::Arc;
use std::time::Duration;
use streamwatch_types::{MonitorMap, StreamRecord};

const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_REGISTER_TIMEOUT: Duration = Duration::from_secs(15);

/// Outcome of one reconciliation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Streams listed by the registry
    pub registry_streams: usize,
    /// Distinct URLs tracked by the monitor before the pass
    pub tracked_urls: usize,
    /// Registry streams not tracked by any monitor entry
    pub missing: usize,
    /// Registrations the monitor accepted
    pub registered: usize,
    /// Registrations that failed
    pub failed: usize,
}

impl PassReport {
    pub fn is_converged(&self) -> bool {
        self.missing == self.registered
    }
}

/// Converges monitor state towards the registry.
///
/// Stateless between passes; everything it knows comes from the two
/// snapshots fetched at the start of a pass.
pub struct Reconciler {
    registry: Arc<dyn StreamRegistry>,
    monitor: Arc<dyn MonitorService>,
    tokens: Arc<dyn TokenSource>,
    fetch_timeout: Duration,
    register_timeout: Duration,
}

impl Reconciler {
    pub fn new(
        registry: Arc<dyn StreamRegistry>,
        monitor: Arc<dyn MonitorService>,
        tokens: Arc<dyn TokenSource>,
    ) -> Self {
        Self {
            registry,
            monitor,
            tokens,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            register_timeout: DEFAULT_REGISTER_TIMEOUT,
        }
    }

    /// Bound the token-and-snapshot phase and each registration separately
    pub fn with_timeouts(mut self, fetch: Duration, register: Duration) -> Self {
        self.fetch_timeout = fetch;
        self.register_timeout = register;
        self
    }

    /// Run one read-diff-apply pass.
    ///
    /// Fetch and credential failures end the pass with an error, as does
    /// the fetch phase outliving its deadline. A failed or timed-out
    /// registration is logged and counted; the remaining streams are still
    /// attempted.
    pub async fn reconcile_once(&self) -> SyncResult<PassReport> {
        let (token, streams, monitors) = tokio::time::timeout(self.fetch_timeout, self.fetch())
            .await
            .map_err(|_| SyncError::Timeout(self.fetch_timeout))??;

        let tracked = monitors.tracked_urls();
        let missing: Vec<&StreamRecord> = streams
            .iter()
            .filter(|stream| !tracked.contains(stream.url.as_str()))
            .collect();

        tracing::debug!(
            registry_streams = streams.len(),
            monitors = monitors.len(),
            tracked_urls = tracked.len(),
            missing = missing.len(),
            "Computed missing streams"
        );

        let mut report = PassReport {
            registry_streams: streams.len(),
            tracked_urls: tracked.len(),
            missing: missing.len(),
            ..PassReport::default()
        };

        for stream in missing {
            tracing::info!(%stream, "Adding stream to monitor");

            let registration = tokio::time::timeout(
                self.register_timeout,
                self.monitor.register_stream(&token, &stream.url),
            );
            match registration.await {
                Ok(Ok(())) => report.registered += 1,
                Ok(Err(e)) => {
                    report.failed += 1;
                    tracing::error!(%stream, error = %e, "Failed to add stream to monitor");
                }
                Err(_) => {
                    report.failed += 1;
                    tracing::error!(
                        %stream,
                        timeout_secs = self.register_timeout.as_secs(),
                        "Timed out adding stream to monitor"
                    );
                }
            }
        }

        Ok(report)
    }

    /// Token plus both snapshots, fetched concurrently
    async fn fetch(&self) -> SyncResult<(String, Vec<StreamRecord>, MonitorMap)> {
        let token = self.tokens.token().await?;

        let (streams, monitors) = tokio::try_join!(
            async { self.registry.list_streams().await.map_err(SyncError::from) },
            async { self.monitor.list_monitors(&token).await.map_err(SyncError::from) },
        )?;

        Ok((token, streams, monitors))
    }
}
