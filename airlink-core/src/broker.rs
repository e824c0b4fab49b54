//! Port traits over the platform network and scan brokers.
//!
//! The platform owns radios, DHCP, and credential negotiation. These
//! traits model only the registration surface the coordinators drive:
//! asynchronous events come back through an `mpsc` sender handed over at
//! registration time, replacing the platform's inheritance-based
//! callback objects.

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

use airlink_model::{ConfigId, NetworkDescriptor, SavedNetwork, ScanRecord, SecurityKind};

use crate::error::Result;

/// Opaque handle to a platform network that became available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NetworkHandle(pub Uuid);

impl NetworkHandle {
    pub fn generate() -> Self {
        NetworkHandle(Uuid::now_v7())
    }
}

/// Identifier of a live attach registration held by the broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegistrationId(pub Uuid);

impl RegistrationId {
    pub fn generate() -> Self {
        RegistrationId(Uuid::now_v7())
    }
}

/// Identifier of a registered scan-results listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListenerId(pub Uuid);

impl ListenerId {
    pub fn generate() -> Self {
        ListenerId(Uuid::now_v7())
    }
}

/// Descriptor translated into the security-specific shape the platform
/// request API expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttachSpecifier {
    Open { ssid: String },
    WepEnterprise { ssid: String, password: String },
    WpaPassphrase { ssid: String, passphrase: String },
}

impl AttachSpecifier {
    pub fn from_descriptor(descriptor: &NetworkDescriptor) -> Self {
        let ssid = descriptor.ssid().to_owned();
        let secret = descriptor
            .credential()
            .map(|c| c.expose().to_owned())
            .unwrap_or_default();
        match descriptor.security() {
            SecurityKind::Open => AttachSpecifier::Open { ssid },
            SecurityKind::Wep => AttachSpecifier::WepEnterprise {
                ssid,
                password: secret,
            },
            SecurityKind::Wpa => AttachSpecifier::WpaPassphrase {
                ssid,
                passphrase: secret,
            },
        }
    }

    pub fn ssid(&self) -> &str {
        match self {
            AttachSpecifier::Open { ssid }
            | AttachSpecifier::WepEnterprise { ssid, .. }
            | AttachSpecifier::WpaPassphrase { ssid, .. } => ssid,
        }
    }
}

/// Lifecycle event delivered by the broker for one attach registration.
///
/// `Lost` and `Unavailable` are terminal. `Available` is non-terminal on
/// the platform side but the coordinator treats it as terminal once the
/// gateway question is settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BrokerEvent {
    Available(NetworkHandle),
    Lost,
    Unavailable,
}

/// "Results ready" signal for one scan cycle. `fresh == false` means the
/// platform could not refresh and the readable results may be stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSignal {
    pub fresh: bool,
}

/// Link-layer properties of an attached network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkProperties {
    pub gateway: Option<IpAddr>,
}

/// Platform subsystem owning network requests.
#[async_trait]
pub trait NetworkBroker: Send + Sync {
    /// Register an attach request. Events for this registration flow
    /// through `events`; dropping the sender ends the registration's
    /// event stream. Errors mean the broker refused to register at all.
    async fn request_attach(
        &self,
        spec: &AttachSpecifier,
        events: mpsc::Sender<BrokerEvent>,
        timeout: Duration,
    ) -> Result<RegistrationId>;

    /// Release a registration. Must be idempotent; releasing an unknown
    /// id is a no-op.
    async fn release_attach(&self, id: RegistrationId);

    /// Make `handle` the process-wide default for outbound traffic.
    async fn set_default_network(&self, handle: NetworkHandle) -> bool;

    /// Link properties of an attached network, if still known.
    async fn link_properties(&self, handle: NetworkHandle) -> Option<LinkProperties>;
}

/// Platform subsystem owning scan triggering and result storage.
#[async_trait]
pub trait ScanBroker: Send + Sync {
    /// Ask the platform to start a scan. `false` means the trigger was
    /// rejected (throttled, radio off).
    async fn trigger_scan(&self) -> bool;

    /// Register a one-shot listener for the next results-ready signal.
    async fn register_results_listener(&self, signal: mpsc::Sender<ScanSignal>) -> ListenerId;

    /// Unregister a listener. Idempotent.
    async fn unregister_results_listener(&self, id: ListenerId);

    /// Current result set. May be stale; see [`ScanSignal`].
    async fn scan_results(&self) -> Vec<ScanRecord>;
}

/// Saved-configuration store backing the legacy attach path.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn find(&self, ssid: &str) -> Option<ConfigId>;

    async fn add(&self, descriptor: &NetworkDescriptor) -> Result<ConfigId>;

    /// Enable the configuration and report whether the platform accepted.
    async fn enable(&self, id: ConfigId) -> bool;

    async fn disable(&self, id: ConfigId);

    /// Every configuration currently saved in the store.
    async fn list(&self) -> Vec<SavedNetwork>;
}
