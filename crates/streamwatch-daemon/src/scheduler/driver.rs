//! Periodic driver for reconciliation passes

use super::reconciler::{PassReport, Reconciler};
use crate::config::SchedulerConfig;
use crate::error::SyncError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, watch};
use tokio::time::{interval, MissedTickBehavior};

/// Result of asking the scheduler for a pass
#[derive(Debug)]
pub enum PassOutcome {
    /// The pass ran to completion
    Completed(PassReport),
    /// The pass ended early; the next trigger starts over
    Failed(SyncError),
    /// Another pass was already in flight
    Skipped,
}

/// Releases the busy flag when a pass resolves or is dropped
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Scheduler state
pub struct Scheduler {
    config: SchedulerConfig,
    reconciler: Arc<Reconciler>,
    busy: AtomicBool,
    reconcile_tx: mpsc::Sender<()>,
    shutdown_tx: watch::Sender<bool>,
}

impl Scheduler {
    /// Create a new scheduler
    pub fn new(
        config: SchedulerConfig,
        reconciler: Arc<Reconciler>,
    ) -> (Arc<Self>, mpsc::Receiver<()>) {
        let (reconcile_tx, reconcile_rx) = mpsc::channel(1);
        let (shutdown_tx, _) = watch::channel(false);

        let scheduler = Arc::new(Self {
            config,
            reconciler,
            busy: AtomicBool::new(false),
            reconcile_tx,
            shutdown_tx,
        });

        (scheduler, reconcile_rx)
    }

    /// Request a pass outside the regular cadence.
    ///
    /// Dropped if a request is already queued.
    pub fn trigger_reconcile(&self) {
        if self.reconcile_tx.try_send(()).is_err() {
            tracing::debug!("Reconciliation already requested");
        }
    }

    /// Whether a pass is currently in flight
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Run the scheduling loop until [`Scheduler::stop`] is called
    pub async fn start(self: Arc<Self>, mut reconcile_rx: mpsc::Receiver<()>) {
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        if *shutdown_rx.borrow() {
            return;
        }

        let mut ticker = interval(self.config.interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        // The first tick completes immediately
        if !self.config.run_on_start {
            ticker.tick().await;
        }

        tracing::info!(
            interval_secs = self.config.interval().as_secs(),
            "Scheduler started"
        );

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => break,
                _ = ticker.tick() => {
                    self.run_pass().await;
                }
                Some(()) = reconcile_rx.recv() => {
                    tracing::debug!("Running requested reconciliation");
                    self.run_pass().await;
                }
            }

            if *shutdown_rx.borrow() {
                break;
            }
        }

        tracing::info!("Scheduler stopped");
    }

    /// Stop the scheduler
    pub fn stop(&self) {
        self.shutdown_tx.send_replace(true);
    }

    /// Run a single pass unless one is already in flight.
    ///
    /// Failures are logged here and never propagate further.
    pub async fn run_pass(&self) -> PassOutcome {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("Reconciliation pass still in flight, skipping trigger");
            return PassOutcome::Skipped;
        }
        let _guard = BusyGuard(&self.busy);

        let started = Instant::now();
        let result = self.reconciler.reconcile_once().await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(report) => {
                if report.missing > 0 {
                    tracing::info!(
                        missing = report.missing,
                        registered = report.registered,
                        failed = report.failed,
                        elapsed_ms,
                        "Reconciliation pass finished"
                    );
                } else {
                    tracing::debug!(
                        registry_streams = report.registry_streams,
                        elapsed_ms,
                        "Monitor already in sync with registry"
                    );
                }
                PassOutcome::Completed(report)
            }
            Err(e) => {
                tracing::error!(error = %e, elapsed_ms, "Reconciliation failed");
                PassOutcome::Failed(e)
            }
        }
    }
}
