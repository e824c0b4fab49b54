//! Network attach coordination.
//!
//! [`AttachCoordinator`] issues an attach request to the platform
//! broker, translates the broker's asynchronous lifecycle events into a
//! single boolean outcome, and guarantees the underlying registration is
//! released exactly once on completion, cancellation, or supersession.

use std::net::IpAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::Stream;
use tokio::sync::{Mutex, mpsc};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, warn};

use airlink_model::{ConfigId, FilterChain, NetworkDescriptor, SavedNetwork};

use crate::broker::{
    AttachSpecifier, BrokerEvent, ConfigStore, NetworkBroker, NetworkHandle,
};
use crate::config::CoordinatorConfig;
use crate::error::{NetError, Result};
use crate::release::ReleaseGuard;

/// Which of the two structurally different attach implementations the
/// coordinator uses. Chosen once at construction, never per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachStrategy {
    /// Asynchronous platform request with lifecycle events and gateway
    /// resolution.
    Request,
    /// Legacy path: enable a saved configuration by id, no event wait.
    SavedConfig,
}

/// Capabilities probed from the runtime environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformCapabilities {
    pub supports_request_api: bool,
}

impl PlatformCapabilities {
    pub fn strategy(&self) -> AttachStrategy {
        if self.supports_request_api {
            AttachStrategy::Request
        } else {
            AttachStrategy::SavedConfig
        }
    }
}

/// Cancellable outcome stream of one attach attempt.
///
/// Yields at most one `bool` and then ends. Dropping it before the
/// terminal event releases the platform registration.
pub struct AttachStream {
    inner: ReceiverStream<bool>,
    guard: Arc<ReleaseGuard>,
}

impl Stream for AttachStream {
    type Item = bool;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<bool>> {
        Pin::new(&mut self.get_mut().inner).poll_next(cx)
    }
}

impl Drop for AttachStream {
    fn drop(&mut self) {
        self.guard.release();
    }
}

impl std::fmt::Debug for AttachStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttachStream")
            .field("guard", &self.guard)
            .finish_non_exhaustive()
    }
}

/// Coordinates attach attempts against the platform brokers.
///
/// Holds at most one live registration; a new `connect` call retires the
/// previous registration before installing its own. The `active` slot
/// lock is held across the whole retire/register/install sequence, so
/// concurrent calls serialize and the broker never sees two live
/// registrations from one coordinator.
pub struct AttachCoordinator {
    broker: Arc<dyn NetworkBroker>,
    store: Arc<dyn ConfigStore>,
    strategy: AttachStrategy,
    config: CoordinatorConfig,
    active: Mutex<Option<Arc<ReleaseGuard>>>,
}

impl AttachCoordinator {
    pub fn new(
        broker: Arc<dyn NetworkBroker>,
        store: Arc<dyn ConfigStore>,
        capabilities: PlatformCapabilities,
        config: CoordinatorConfig,
    ) -> Self {
        Self {
            broker,
            store,
            strategy: capabilities.strategy(),
            config,
            active: Mutex::new(None),
        }
    }

    pub fn strategy(&self) -> AttachStrategy {
        self.strategy
    }

    /// Attach to `descriptor` using the configured default timeout.
    pub async fn connect(&self, descriptor: &NetworkDescriptor) -> Result<AttachStream> {
        self.connect_with_timeout(descriptor, self.config.attach_timeout)
            .await
    }

    /// Attach to `descriptor`, handing `timeout` to the broker at
    /// registration time. The broker enforces it; expiry surfaces as an
    /// `Unavailable` event or a closed event channel.
    pub async fn connect_with_timeout(
        &self,
        descriptor: &NetworkDescriptor,
        timeout: Duration,
    ) -> Result<AttachStream> {
        if timeout.is_zero() {
            return Err(NetError::InvalidTimeout);
        }
        match self.strategy {
            AttachStrategy::Request => self.attach_request(descriptor, timeout).await,
            AttachStrategy::SavedConfig => self.attach_saved(descriptor).await,
        }
    }

    async fn attach_request(
        &self,
        descriptor: &NetworkDescriptor,
        timeout: Duration,
    ) -> Result<AttachStream> {
        let spec = AttachSpecifier::from_descriptor(descriptor);
        let (event_tx, mut event_rx) = mpsc::channel(self.config.event_buffer);

        // Hold the slot lock from retire through install: the old
        // registration must be fully gone before the broker sees the new
        // one, and a concurrent connect must not slip in between and
        // register a second one.
        let mut slot = self.active.lock().await;
        if let Some(prior) = slot.take() {
            debug!("superseding outstanding attach registration");
            prior.release_now().await;
        }

        let registration = self
            .broker
            .request_attach(&spec, event_tx, timeout)
            .await?;
        debug!(
            ssid = %spec.ssid(),
            registration = %registration.0,
            timeout_ms = timeout.as_millis() as u64,
            "attach request registered"
        );

        let release_broker = Arc::clone(&self.broker);
        let guard = Arc::new(ReleaseGuard::new(Box::pin(async move {
            release_broker.release_attach(registration).await;
        })));
        *slot = Some(Arc::clone(&guard));
        drop(slot);

        let (out_tx, out_rx) = mpsc::channel(1);
        let broker = Arc::clone(&self.broker);
        let task_guard = Arc::clone(&guard);
        tokio::spawn(async move {
            let outcome = match event_rx.recv().await {
                Some(BrokerEvent::Available(handle)) => {
                    resolve_available(broker.as_ref(), handle).await
                }
                Some(BrokerEvent::Lost) => {
                    warn!("attached network was lost");
                    false
                }
                Some(BrokerEvent::Unavailable) => {
                    warn!("requested network is unavailable");
                    false
                }
                None => {
                    if task_guard.is_released() {
                        // Cancelled or superseded; end without a value.
                        return;
                    }
                    warn!("broker closed the event channel without a terminal event");
                    false
                }
            };
            // Only the winner of the release race may emit.
            if task_guard.release() {
                let _ = out_tx.send(outcome).await;
            }
        });

        Ok(AttachStream {
            inner: ReceiverStream::new(out_rx),
            guard,
        })
    }

    async fn attach_saved(&self, descriptor: &NetworkDescriptor) -> Result<AttachStream> {
        let id = match self.store.find(descriptor.ssid()).await {
            Some(id) => id,
            None => self.store.add(descriptor).await?,
        };
        Ok(self.connect_by_id(id).await)
    }

    /// Enable a previously stored configuration by id and emit the
    /// enable result immediately; no event wait, no gateway resolution.
    /// Dropping the returned stream disables the configuration.
    pub async fn connect_by_id(&self, id: ConfigId) -> AttachStream {
        let mut slot = self.active.lock().await;
        if let Some(prior) = slot.take() {
            debug!("superseding outstanding attach registration");
            prior.release_now().await;
        }

        let enabled = self.store.enable(id).await;
        debug!(%id, enabled, "saved configuration enabled");

        // No asynchronous wait on this path: the enable result is the
        // outcome, emitted before the stream is even polled.
        let (out_tx, out_rx) = mpsc::channel(1);
        let _ = out_tx.try_send(enabled);
        drop(out_tx);

        let store = Arc::clone(&self.store);
        let guard = Arc::new(ReleaseGuard::new(Box::pin(async move {
            store.disable(id).await;
        })));
        *slot = Some(Arc::clone(&guard));
        drop(slot);

        AttachStream {
            inner: ReceiverStream::new(out_rx),
            guard,
        }
    }

    /// Resolve the default-route gateway of an attached network from its
    /// link properties. `None` when the platform no longer knows the
    /// link or no default route exists.
    pub async fn gateway(&self, handle: NetworkHandle) -> Option<IpAddr> {
        self.broker
            .link_properties(handle)
            .await
            .and_then(|link| link.gateway)
    }

    /// Saved configurations whose SSIDs pass `filters`. Like scan
    /// filtering, an empty chain keeps everything.
    pub async fn connect_history(&self, filters: &FilterChain) -> Vec<SavedNetwork> {
        self.store
            .list()
            .await
            .into_iter()
            .filter(|network| filters.keep(&network.ssid))
            .collect()
    }
}

impl std::fmt::Debug for AttachCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttachCoordinator")
            .field("strategy", &self.strategy)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// The network is up; it only counts as connected once it is the process
/// default and its gateway resolves. A network without a usable gateway
/// is reported as a failure, not an error.
async fn resolve_available(broker: &dyn NetworkBroker, handle: NetworkHandle) -> bool {
    if !broker.set_default_network(handle).await {
        warn!("failed to bind the process default network");
        return false;
    }
    let Some(link) = broker.link_properties(handle).await else {
        warn!("no link properties for attached network");
        return false;
    };
    match link.gateway {
        Some(gateway) => {
            debug!(%gateway, "attached network gateway resolved");
            true
        }
        None => {
            warn!("cannot resolve gateway address for attached network");
            false
        }
    }
}
