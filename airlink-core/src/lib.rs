//! Coordination layer over platform Wi-Fi brokers.
//!
//! Bridges callback-style attach and scan notifications from a platform
//! network stack into cancellable streams. The platform, modeled by the
//! [`broker`] port traits, does the heavy lifting of radio scanning,
//! credential negotiation, and DHCP; this crate owns the
//! request/event/release choreography:
//!
//! - [`AttachCoordinator`] turns one attach request into a stream that
//!   yields a single success/failure boolean and deterministically
//!   releases the platform registration.
//! - [`ScanCoordinator`] runs one-shot scan cycles and emits filtered
//!   scan records.
#![allow(missing_docs)]

pub mod attach;
pub mod broker;
pub mod config;
pub mod error;
pub mod gateway;
mod release;
pub mod scan;

pub use attach::{AttachCoordinator, AttachStrategy, AttachStream, PlatformCapabilities};
pub use broker::{
    AttachSpecifier, BrokerEvent, ConfigStore, LinkProperties, ListenerId, NetworkBroker,
    NetworkHandle, RegistrationId, ScanBroker, ScanSignal,
};
pub use config::CoordinatorConfig;
pub use error::{NetError, Result};
pub use gateway::gateway_from_dhcp;
pub use scan::{ScanCoordinator, ScanStream};

// Model types most callers need alongside the coordinators.
pub use airlink_model::{
    ConfigId, Credential, FilterChain, NetworkDescriptor, SavedNetwork, ScanRecord, SecurityKind,
    SsidFilter,
};
