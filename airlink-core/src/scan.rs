//! Scan coordination.
//!
//! One scan cycle: register a one-shot results listener, trigger the
//! platform scan, wait for the results-ready signal, pull the result
//! set, filter it, emit the survivors, and tear the listener down.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::{Mutex, mpsc};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, warn};

use airlink_model::{FilterChain, ScanRecord};

use crate::broker::ScanBroker;
use crate::config::CoordinatorConfig;
use crate::error::{NetError, Result};
use crate::release::ReleaseGuard;

/// Stream of filtered scan records for one scan cycle.
///
/// Ends after the cycle's records are drained. Dropping it early
/// unregisters the results listener.
pub struct ScanStream {
    inner: ReceiverStream<ScanRecord>,
    guard: Arc<ReleaseGuard>,
}

impl Stream for ScanStream {
    type Item = ScanRecord;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<ScanRecord>> {
        Pin::new(&mut self.get_mut().inner).poll_next(cx)
    }
}

impl Drop for ScanStream {
    fn drop(&mut self) {
        self.guard.release();
    }
}

impl std::fmt::Debug for ScanStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanStream")
            .field("guard", &self.guard)
            .finish_non_exhaustive()
    }
}

/// Coordinates scan cycles against the platform scan broker.
///
/// At most one cycle is in flight per coordinator; a new `scan` call
/// stops the previous cycle first. The `active` slot lock is held
/// across stop, listener registration, trigger, and install, so
/// concurrent calls serialize and the broker never holds two listeners
/// from one coordinator.
pub struct ScanCoordinator {
    broker: Arc<dyn ScanBroker>,
    filters: Arc<FilterChain>,
    config: CoordinatorConfig,
    active: Mutex<Option<Arc<ReleaseGuard>>>,
}

impl ScanCoordinator {
    pub fn new(
        broker: Arc<dyn ScanBroker>,
        filters: FilterChain,
        config: CoordinatorConfig,
    ) -> Self {
        Self {
            broker,
            filters: Arc::new(filters),
            config,
            active: Mutex::new(None),
        }
    }

    /// Run one scan cycle. Fails only when the platform rejects the
    /// trigger; a stale-results signal still delivers whatever results
    /// the platform holds (with a warning), since the platform contract
    /// is that a failed refresh leaves previous results readable.
    pub async fn scan(&self) -> Result<ScanStream> {
        let (signal_tx, mut signal_rx) = mpsc::channel(1);

        let mut slot = self.active.lock().await;
        if let Some(prior) = slot.take() {
            prior.release_now().await;
        }

        let listener = self.broker.register_results_listener(signal_tx).await;
        if !self.broker.trigger_scan().await {
            self.broker.unregister_results_listener(listener).await;
            return Err(NetError::ScanRejected(
                "platform refused to start a scan".into(),
            ));
        }
        debug!(listener = %listener.0, "scan triggered");

        let release_broker = Arc::clone(&self.broker);
        let guard = Arc::new(ReleaseGuard::new(Box::pin(async move {
            release_broker.unregister_results_listener(listener).await;
        })));
        *slot = Some(Arc::clone(&guard));
        drop(slot);

        let (out_tx, out_rx) = mpsc::channel(self.config.scan_buffer);
        let broker = Arc::clone(&self.broker);
        let filters = Arc::clone(&self.filters);
        let task_guard = Arc::clone(&guard);
        tokio::spawn(async move {
            match signal_rx.recv().await {
                Some(signal) => {
                    if task_guard.is_released() {
                        return;
                    }
                    if !signal.fresh {
                        warn!("scan refresh failed; delivering possibly stale results");
                    }
                    let records = broker.scan_results().await;
                    debug!(total = records.len(), "scan results ready");
                    for record in records {
                        if !filters.keep(&record.ssid) {
                            continue;
                        }
                        if out_tx.send(record).await.is_err() {
                            // Subscriber went away mid-emission.
                            break;
                        }
                    }
                }
                None => {
                    if !task_guard.is_released() {
                        warn!("scan signal channel closed before results were ready");
                    }
                }
            }
            task_guard.release();
        });

        Ok(ScanStream {
            inner: ReceiverStream::new(out_rx),
            guard,
        })
    }

    /// Stop the in-flight cycle, if any. Idempotent; waits for the
    /// listener to be unregistered at the broker. The slot lock is held
    /// while releasing so a concurrent `scan` cannot register before the
    /// old listener is gone.
    pub async fn stop(&self) {
        let mut slot = self.active.lock().await;
        if let Some(prior) = slot.take() {
            prior.release_now().await;
        }
    }
}

impl std::fmt::Debug for ScanCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanCoordinator")
            .field("filters", &self.filters)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
